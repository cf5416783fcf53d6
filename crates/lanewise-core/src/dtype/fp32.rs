use super::bits::{combine_32_bits_into_fp64, split_fp64_into_32_bits};
use super::{
    Canonical, Canonical2, Canonical4, DType, Float2, Float4, Fp32, LogicalType, QuadDType,
    SplitBits,
};

// Fp32 is the canonical width, so every conversion is the identity.
impl DType for Fp32 {
    const LOGICAL: LogicalType = LogicalType::Fp32;

    type Scalar = f32;
    type Pair = Float2;

    #[inline(always)]
    fn upcast(value: f32) -> Canonical {
        value
    }

    #[inline(always)]
    fn upcast2(value: Float2) -> Canonical2 {
        value
    }

    #[inline(always)]
    fn downcast(value: Canonical) -> f32 {
        value
    }

    #[inline(always)]
    fn downcast2(value: Canonical2) -> Float2 {
        value
    }

    #[inline(always)]
    fn make2(x: f32, y: f32) -> Float2 {
        Float2::new(x, y)
    }
}

impl QuadDType for Fp32 {
    type Quad = Float4;

    #[inline(always)]
    fn upcast4(value: Float4) -> Canonical4 {
        value
    }

    #[inline(always)]
    fn downcast4(value: Canonical4) -> Float4 {
        value
    }

    #[inline(always)]
    fn make4(x: f32, y: f32, z: f32, w: f32) -> Float4 {
        Float4::new(x, y, z, w)
    }
}

impl SplitBits for Fp32 {
    type Wide = f64;

    #[inline(always)]
    fn split_bits(value: f64) -> Float2 {
        let (left, right) = split_fp64_into_32_bits(value);
        Float2::new(f32::from_bits(left), f32::from_bits(right))
    }

    #[inline(always)]
    fn combine_bits(value: Float2) -> f64 {
        Self::combine_lanes(value.x, value.y)
    }

    #[inline(always)]
    fn combine_lanes(left: f32, right: f32) -> f64 {
        combine_32_bits_into_fp64(left.to_bits(), right.to_bits())
    }
}
