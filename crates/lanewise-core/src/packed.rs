//! 128-bit packed vector of native scalars
//!
//! [`Packed128<T>`] is a 16-byte aligned block holding exactly `16 /
//! size_of::<T>()` lanes. It is the unit a thread reads or writes in a single
//! maximal-width memory transaction; see [`crate::memory`] for the load and
//! store variants.
//!
//! ```
//! use half::f16;
//! use lanewise_core::Packed128;
//!
//! let mut block = Packed128::<f16>::constant(f16::ONE);
//! assert_eq!(Packed128::<f16>::LANES, 8);
//! block[3] = f16::from_f32(2.0);
//! assert_eq!(block.iter().filter(|x| **x == f16::ONE).count(), 7);
//! ```

use std::fmt;
use std::ops::{Index, IndexMut};

use bytemuck::{Pod, Zeroable};
use half::{bf16, f16};

use crate::constants::VECTOR_BYTES;
use crate::dtype::Int32x4;

/// Scalar that can occupy a lane of a [`Packed128`].
///
/// Implemented for every native float and integer whose size divides 16.
/// `Lanes` is the fixed-size array filling exactly 128 bits.
pub trait PackedElement: Pod + Send + Sync {
    /// `[Self; LANES]`
    type Lanes: Pod + AsRef<[Self]> + AsMut<[Self]> + Send + Sync;

    /// Lanes per 128-bit vector
    const LANES: usize;

    /// Additive identity
    const ZERO: Self;

    /// Multiplicative identity
    const ONE: Self;

    fn splat(value: Self) -> Self::Lanes;
}

macro_rules! impl_packed_element {
    ($($ty:ty => $lanes:literal, $zero:expr, $one:expr);* $(;)?) => {
        $(
            const _: () = assert!(core::mem::size_of::<[$ty; $lanes]>() == VECTOR_BYTES);

            impl PackedElement for $ty {
                type Lanes = [$ty; $lanes];
                const LANES: usize = $lanes;
                const ZERO: Self = $zero;
                const ONE: Self = $one;

                #[inline(always)]
                fn splat(value: Self) -> Self::Lanes {
                    [value; $lanes]
                }
            }
        )*
    };
}

impl_packed_element! {
    f16 => 8, f16::ZERO, f16::ONE;
    bf16 => 8, bf16::ZERO, bf16::ONE;
    f32 => 4, 0.0, 1.0;
    f64 => 2, 0.0, 1.0;
    u8 => 16, 0, 1;
    i8 => 16, 0, 1;
    u16 => 8, 0, 1;
    i16 => 8, 0, 1;
    u32 => 4, 0, 1;
    i32 => 4, 0, 1;
    u64 => 2, 0, 1;
    i64 => 2, 0, 1;
}

/// Number of `T` lanes moved by one 128-bit transaction
#[inline(always)]
pub const fn lanes_per_vector<T: PackedElement>() -> usize {
    T::LANES
}

/// Sixteen bytes of `T` lanes with 16-byte alignment
#[derive(Clone, Copy)]
#[repr(C, align(16))]
pub struct Packed128<T: PackedElement> {
    payload: T::Lanes,
}

// SAFETY: `payload` is a `Pod` array of exactly 16 bytes (checked for every
// `PackedElement` impl) and the alignment is 16, so there is no padding.
unsafe impl<T: PackedElement> Zeroable for Packed128<T> {}
unsafe impl<T: PackedElement> Pod for Packed128<T> {}

impl<T: PackedElement> Packed128<T> {
    /// Lanes held by this vector
    pub const LANES: usize = T::LANES;

    /// Vector from an explicit lane array
    #[inline(always)]
    pub fn new(lanes: T::Lanes) -> Self {
        Self { payload: lanes }
    }

    /// Every lane set to `value`
    #[inline(always)]
    pub fn constant(value: T) -> Self {
        Self::new(T::splat(value))
    }

    #[inline(always)]
    pub fn zeros() -> Self {
        Self::constant(T::ZERO)
    }

    #[inline(always)]
    pub fn ones() -> Self {
        Self::constant(T::ONE)
    }

    /// Reinterpret a raw 128-bit pattern as lanes
    #[inline(always)]
    pub fn from_bits(bits: Int32x4) -> Self {
        bytemuck::cast(bits)
    }

    /// Raw 128-bit pattern of the lanes
    #[inline(always)]
    pub fn to_bits(self) -> Int32x4 {
        bytemuck::cast(self)
    }

    #[inline(always)]
    pub fn into_lanes(self) -> T::Lanes {
        self.payload
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        self.payload.as_ref()
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.payload.as_mut()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

impl<T: PackedElement> Default for Packed128<T> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: PackedElement> Index<usize> for Packed128<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T: PackedElement> IndexMut<usize> for Packed128<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<'a, T: PackedElement> IntoIterator for &'a Packed128<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: PackedElement> IntoIterator for &'a mut Packed128<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: PackedElement + PartialEq> PartialEq for Packed128<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PackedElement + fmt::Debug> fmt::Debug for Packed128<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Packed128").field(&self.as_slice()).finish()
    }
}
