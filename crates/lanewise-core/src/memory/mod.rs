//! 128-bit loads and stores with cache-residency hints
//!
//! Every access moves one whole [`Packed128`] in a single transaction. The
//! variants differ only in the hint attached to the transaction:
//!
//! | operation                  | hint                                        |
//! |----------------------------|---------------------------------------------|
//! | [`load128`]                | default caching                             |
//! | [`load128_streaming`]      | data is read once, do not keep it resident  |
//! | [`store128`]               | default caching                             |
//! | [`store128_streaming`]     | data is written once, bypass the caches     |
//! | [`store128_cached_global`] | cache at the shared level only              |
//!
//! Hints never change the bytes moved. Streaming stores are weakly ordered;
//! call [`streaming_fence`] before another thread reads what they wrote.
//!
//! The hardware mapping lives behind [`CacheHintBackend`]. [`NativeBackend`]
//! is chosen at compile time for the build target.

#[cfg(target_arch = "x86_64")]
mod x86;
mod portable;

use lanewise_tracing::debug;

use crate::dtype::Int32x4;
use crate::error::{Error, Result};
use crate::packed::{PackedElement, Packed128};

pub use portable::Portable;
#[cfg(target_arch = "x86_64")]
pub use x86::X86Sse;

/// Backend selected for the build target
#[cfg(target_arch = "x86_64")]
pub type NativeBackend = X86Sse;

/// Backend selected for the build target
#[cfg(not(target_arch = "x86_64"))]
pub type NativeBackend = Portable;

/// Raw 128-bit moves for one target.
///
/// # Safety
///
/// Every pointer argument must be non-null, 16-byte aligned and valid for a
/// 16-byte read (loads) or write (stores) for the duration of the call.
pub trait CacheHintBackend {
    /// Short name reported in logs and benches
    const NAME: &'static str;

    unsafe fn load(src: *const Int32x4) -> Int32x4;

    unsafe fn load_streaming(src: *const Int32x4) -> Int32x4;

    unsafe fn store(dst: *mut Int32x4, value: Int32x4);

    unsafe fn store_streaming(dst: *mut Int32x4, value: Int32x4);

    unsafe fn store_cached_global(dst: *mut Int32x4, value: Int32x4);

    /// Order every preceding streaming store before later memory operations
    fn fence();
}

#[inline(always)]
fn debug_check_aligned<T>(ptr: *const T) {
    debug_assert!(
        (ptr as usize) % core::mem::align_of::<Int32x4>() == 0,
        "128-bit access at unaligned address {:p}",
        ptr
    );
}

/// Read one vector with default caching.
///
/// # Safety
///
/// `src` must be non-null, 16-byte aligned and valid for reads of 16 bytes.
#[inline(always)]
pub unsafe fn load128<T: PackedElement>(src: *const Packed128<T>) -> Packed128<T> {
    debug_check_aligned(src);
    Packed128::from_bits(NativeBackend::load(src.cast()))
}

/// Read one vector with a read-once hint.
///
/// # Safety
///
/// Same contract as [`load128`].
#[inline(always)]
pub unsafe fn load128_streaming<T: PackedElement>(src: *const Packed128<T>) -> Packed128<T> {
    debug_check_aligned(src);
    Packed128::from_bits(NativeBackend::load_streaming(src.cast()))
}

/// Write one vector with default caching.
///
/// # Safety
///
/// `dst` must be non-null, 16-byte aligned and valid for writes of 16 bytes.
#[inline(always)]
pub unsafe fn store128<T: PackedElement>(dst: *mut Packed128<T>, value: Packed128<T>) {
    debug_check_aligned(dst);
    NativeBackend::store(dst.cast(), value.to_bits())
}

/// Write one vector with a write-once hint.
///
/// # Safety
///
/// Same contract as [`store128`].
#[inline(always)]
pub unsafe fn store128_streaming<T: PackedElement>(dst: *mut Packed128<T>, value: Packed128<T>) {
    debug_check_aligned(dst);
    NativeBackend::store_streaming(dst.cast(), value.to_bits())
}

/// Write one vector, caching it at the shared level only.
///
/// # Safety
///
/// Same contract as [`store128`].
#[inline(always)]
pub unsafe fn store128_cached_global<T: PackedElement>(dst: *mut Packed128<T>, value: Packed128<T>) {
    debug_check_aligned(dst);
    NativeBackend::store_cached_global(dst.cast(), value.to_bits())
}

/// Order streaming stores before any later memory operation
#[inline(always)]
pub fn streaming_fence() {
    NativeBackend::fence()
}

// References are always aligned and valid, so the safe wrappers cannot violate
// the raw contract.
impl<T: PackedElement> Packed128<T> {
    #[inline(always)]
    pub fn load(src: &Self) -> Self {
        unsafe { load128(src) }
    }

    #[inline(always)]
    pub fn load_streaming(src: &Self) -> Self {
        unsafe { load128_streaming(src) }
    }

    #[inline(always)]
    pub fn store(self, dst: &mut Self) {
        unsafe { store128(dst, self) }
    }

    #[inline(always)]
    pub fn store_streaming(self, dst: &mut Self) {
        unsafe { store128_streaming(dst, self) }
    }

    #[inline(always)]
    pub fn store_cached_global(self, dst: &mut Self) {
        unsafe { store128_cached_global(dst, self) }
    }
}

fn map_cast_error(err: bytemuck::PodCastError, address: usize, len: usize, lanes: usize) -> Error {
    debug!(?err, address, len, lanes, "element slice is not a packed vector slice");
    match err {
        bytemuck::PodCastError::TargetAlignmentGreaterAndInputNotAligned => Error::Misaligned {
            address,
            alignment: core::mem::align_of::<Int32x4>(),
        },
        _ => Error::RaggedLength { len, lanes },
    }
}

/// View an element slice as whole 128-bit vectors.
///
/// Fails with [`Error::Misaligned`] when the slice does not start on a 16-byte
/// boundary and [`Error::RaggedLength`] when its length is not a multiple of
/// the lane count. Vector `i` covers elements `i * LANES .. (i + 1) * LANES`.
/// An empty slice is an empty view wherever it points.
pub fn as_packed<T: PackedElement>(elements: &[T]) -> Result<&[Packed128<T>]> {
    if elements.is_empty() {
        return Ok(&[]);
    }
    let (address, len) = (elements.as_ptr() as usize, elements.len());
    bytemuck::try_cast_slice(elements).map_err(|err| map_cast_error(err, address, len, T::LANES))
}

/// Mutable counterpart of [`as_packed`]
pub fn as_packed_mut<T: PackedElement>(elements: &mut [T]) -> Result<&mut [Packed128<T>]> {
    if elements.is_empty() {
        return Ok(&mut []);
    }
    let (address, len) = (elements.as_ptr() as usize, elements.len());
    bytemuck::try_cast_slice_mut(elements).map_err(|err| map_cast_error(err, address, len, T::LANES))
}

/// Flatten vectors back into their elements
pub fn as_elements<T: PackedElement>(vectors: &[Packed128<T>]) -> &[T] {
    bytemuck::cast_slice(vectors)
}

/// Mutable counterpart of [`as_elements`]
pub fn as_elements_mut<T: PackedElement>(vectors: &mut [Packed128<T>]) -> &mut [T] {
    bytemuck::cast_slice_mut(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    fn sample() -> Packed128<f32> {
        Packed128::new([1.0, -2.0, f32::INFINITY, 0.5])
    }

    #[test]
    fn test_store_then_load_every_hint() {
        let value = sample();
        let mut slot = Packed128::<f32>::zeros();

        value.store(&mut slot);
        assert_eq!(Packed128::load(&slot), value);

        Packed128::zeros().store(&mut slot);
        value.store_streaming(&mut slot);
        streaming_fence();
        assert_eq!(Packed128::load_streaming(&slot), value);

        Packed128::zeros().store(&mut slot);
        value.store_cached_global(&mut slot);
        assert_eq!(Packed128::load(&slot), value);
    }

    #[test]
    fn test_raw_pointer_access() {
        let mut buffer = [Packed128::<f16>::zeros(); 4];
        let value = Packed128::constant(f16::from_f32(3.0));
        unsafe {
            store128(buffer.as_mut_ptr().add(2), value);
            assert_eq!(load128(buffer.as_ptr().add(2)), value);
            assert_eq!(load128(buffer.as_ptr()), Packed128::zeros());
        }
    }

    #[test]
    fn test_as_packed_groups_consecutive_elements() {
        let mut storage = [Packed128::<f32>::zeros(); 2];
        let elements = as_elements_mut(&mut storage);
        for (i, x) in elements.iter_mut().enumerate() {
            *x = i as f32;
        }

        let vectors = as_packed(elements).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1].as_slice(), &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_as_packed_rejects_ragged_length() {
        let storage = [Packed128::<f32>::zeros(); 2];
        let elements = &as_elements(&storage)[..6];
        assert_eq!(
            as_packed(elements).unwrap_err(),
            Error::RaggedLength { len: 6, lanes: 4 }
        );
    }

    #[test]
    fn test_as_packed_rejects_misaligned_start() {
        let mut storage = [Packed128::<f32>::zeros(); 3];
        let elements = &mut as_elements_mut(&mut storage)[1..9];
        let err = as_packed_mut(elements).unwrap_err();
        assert!(matches!(err, Error::Misaligned { alignment: 16, .. }));
    }

    #[test]
    fn test_as_packed_accepts_empty_slices() {
        // An empty Vec's dangling pointer is only element-aligned.
        let elements: Vec<f32> = Vec::new();
        assert!(as_packed(&elements).unwrap().is_empty());

        let mut halves: Vec<f16> = Vec::new();
        assert!(as_packed_mut(&mut halves).unwrap().is_empty());

        let mut storage = [Packed128::<f32>::zeros(); 1];
        let tail = &mut as_elements_mut(&mut storage)[1..1];
        assert!(as_packed_mut(tail).unwrap().is_empty());
    }

    #[test]
    fn test_backend_name() {
        assert!(!NativeBackend::NAME.is_empty());
    }
}
