//! Per-precision type traits
//!
//! Each supported logical precision is a zero-sized marker type ([`Fp16`],
//! [`Bf16`], [`Fp32`]) implementing [`DType`]. Kernels are written generically
//! over `D: DType` and the precision is fixed at monomorphization time, so no
//! runtime type dispatch ever reaches a per-element code path.
//!
//! ```text
//!  logical type   Scalar   Pair        Quad     split/combine width
//!  ────────────   ──────   ─────────   ──────   ───────────────────
//!  Fp16           f16      Half2       -        f32 ⇄ 2 × 16 bits
//!  Bf16           bf16     BFloat162   -        f32 ⇄ 2 × 16 bits
//!  Fp32           f32      Float2      Float4   f64 ⇄ 2 × 32 bits
//! ```
//!
//! All arithmetic happens at the canonical width ([`Canonical`], `f32`).
//! `upcast` is exact, `downcast` rounds to nearest even.
//!
//! ```
//! use lanewise_core::dtype::{DType, Fp16};
//!
//! fn scale<D: DType>(x: D::Scalar, factor: f32) -> D::Scalar {
//!     D::downcast(D::upcast(x) * factor)
//! }
//!
//! let x = Fp16::downcast(1.5);
//! assert_eq!(Fp16::upcast(scale::<Fp16>(x, 2.0)), 3.0);
//! ```

pub mod bits;
mod bf16;
mod fp16;
mod fp32;
mod vector;

use std::fmt;
use std::str::FromStr;

use bytemuck::Pod;
use serde::{Deserialize, Serialize};

use crate::constants::VECTOR_BYTES;
use crate::error::{Error, Result};
use crate::packed::PackedElement;

pub use vector::{BFloat162, Float2, Float4, Half2, Int32x4};

/// Canonical computation width shared by every logical type
pub type Canonical = f32;

/// Canonical-width pair
pub type Canonical2 = Float2;

/// Canonical-width quad
pub type Canonical4 = Float4;

/// Half precision (IEEE 754 binary16)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fp16;

/// Brain floating point (8-bit exponent, 7-bit mantissa)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bf16;

/// Single precision (IEEE 754 binary32), the canonical width
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fp32;

/// Mapping from a logical precision to its native representations.
///
/// Invariants every implementation upholds:
/// - `size_of::<Pair>() == 2 * size_of::<Scalar>()`
/// - `downcast(upcast(x))` reproduces `x` bit for bit for every non-NaN `x`
/// - `make2`, `splat2` and `load2` agree with packing the lanes by hand
pub trait DType: Copy + Send + Sync + 'static {
    /// Runtime tag for host-side metadata
    const LOGICAL: LogicalType;

    /// Native scalar representation
    type Scalar: PackedElement + PartialEq + fmt::Debug;

    /// Native two-lane representation
    type Pair: Pod + PartialEq + fmt::Debug;

    /// Widen to canonical width (exact)
    fn upcast(value: Self::Scalar) -> Canonical;

    /// Widen both lanes to canonical width (exact)
    fn upcast2(value: Self::Pair) -> Canonical2;

    /// Narrow from canonical width, rounding to nearest even
    fn downcast(value: Canonical) -> Self::Scalar;

    /// Narrow both lanes from canonical width, rounding to nearest even
    fn downcast2(value: Canonical2) -> Self::Pair;

    /// Pack two scalars into a pair (`x` is the first lane)
    fn make2(x: Self::Scalar, y: Self::Scalar) -> Self::Pair;

    /// Broadcast one scalar into both lanes
    #[inline(always)]
    fn splat2(value: Self::Scalar) -> Self::Pair {
        Self::make2(value, value)
    }

    /// Pack the first two contiguous scalars of `array`
    ///
    /// # Panics
    ///
    /// Panics if `array` holds fewer than two elements.
    #[inline(always)]
    fn load2(array: &[Self::Scalar]) -> Self::Pair {
        Self::make2(array[0], array[1])
    }
}

/// Four-lane representation, only available for the canonical width
pub trait QuadDType: DType {
    /// Native four-lane representation
    type Quad: Pod + PartialEq + fmt::Debug;

    fn upcast4(value: Self::Quad) -> Canonical4;

    fn downcast4(value: Canonical4) -> Self::Quad;

    fn make4(x: Self::Scalar, y: Self::Scalar, z: Self::Scalar, w: Self::Scalar) -> Self::Quad;

    /// Pack the first four contiguous scalars of `array`
    ///
    /// # Panics
    ///
    /// Panics if `array` holds fewer than four elements.
    #[inline(always)]
    fn load4(array: &[Self::Scalar]) -> Self::Quad {
        Self::make4(array[0], array[1], array[2], array[3])
    }
}

/// Pure bit reinterpretation between one wide value and a pair of native lanes.
///
/// `Wide` is twice the width of `Scalar` (`f32` for 16-bit types, `f64` for
/// `Fp32`). The left lane (`x`) receives the high half of the wide bit
/// pattern and the right lane (`y`) the low half; see [`bits`]. Nothing is
/// rounded or canonicalized, so NaN payloads and signed zeros survive.
///
/// The lanes are only meaningful to hardware whose register layout follows the
/// same high/low convention; moving them through memory on a little-endian
/// host stores the low half first.
pub trait SplitBits: DType {
    /// Value occupying the bits of two lanes
    type Wide: Copy;

    /// `reinterpret_N_bits_as_2xM`
    fn split_bits(value: Self::Wide) -> Self::Pair;

    /// `reinterpret_2xM_as_N_bits`
    fn combine_bits(value: Self::Pair) -> Self::Wide;

    /// `reinterpret_2xM_as_N_bits` from two loose lanes
    fn combine_lanes(left: Self::Scalar, right: Self::Scalar) -> Self::Wide;
}

/// Runtime tag for the closed set of logical precisions.
///
/// Used by host-side glue (dtype names, sizes, tuning tables). Kernels select
/// their precision through the marker types instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    Fp16,
    Bf16,
    Fp32,
}

impl LogicalType {
    /// Every supported logical type, narrowest first
    pub const ALL: [LogicalType; 3] = [LogicalType::Fp16, LogicalType::Bf16, LogicalType::Fp32];

    /// Size of one scalar in bytes
    pub const fn size_bytes(self) -> usize {
        match self {
            LogicalType::Fp16 | LogicalType::Bf16 => 2,
            LogicalType::Fp32 => 4,
        }
    }

    /// Name used by tensor libraries (`float16`, `bfloat16`, `float32`)
    pub const fn dtype_name(self) -> &'static str {
        match self {
            LogicalType::Fp16 => "float16",
            LogicalType::Bf16 => "bfloat16",
            LogicalType::Fp32 => "float32",
        }
    }

    /// Whether this type is already at canonical width
    pub const fn is_canonical(self) -> bool {
        matches!(self, LogicalType::Fp32)
    }

    /// Elements moved by one 128-bit transaction
    pub const fn lanes_per_vector(self) -> usize {
        VECTOR_BYTES / self.size_bytes()
    }

    /// Per-thread vector instruction widths usable with this type.
    ///
    /// A width is usable when its byte span fits one 128-bit transaction.
    pub const fn supported_vector_widths(self) -> &'static [u32] {
        match self {
            LogicalType::Fp16 | LogicalType::Bf16 => &[1, 2, 4, 8],
            LogicalType::Fp32 => &[1, 2, 4],
        }
    }

    pub fn supports_vector_width(self, width: u32) -> bool {
        self.supported_vector_widths().contains(&width)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Fp16 => write!(f, "fp16"),
            LogicalType::Bf16 => write!(f, "bf16"),
            LogicalType::Fp32 => write!(f, "fp32"),
        }
    }
}

impl FromStr for LogicalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_prefix("torch.").unwrap_or(&name);
        match name {
            "fp16" | "float16" | "half" => Ok(LogicalType::Fp16),
            "bf16" | "bfloat16" => Ok(LogicalType::Bf16),
            "fp32" | "float32" | "float" => Ok(LogicalType::Fp32),
            _ => Err(Error::UnknownLogicalType(s.to_string())),
        }
    }
}
