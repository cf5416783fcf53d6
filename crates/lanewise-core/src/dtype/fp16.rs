use half::f16;

use super::bits::{combine_16_bits_into_fp32, split_fp32_into_16_bits};
use super::{Canonical, Canonical2, DType, Fp16, Half2, LogicalType, SplitBits};

impl DType for Fp16 {
    const LOGICAL: LogicalType = LogicalType::Fp16;

    type Scalar = f16;
    type Pair = Half2;

    #[inline(always)]
    fn upcast(value: f16) -> Canonical {
        value.to_f32()
    }

    #[inline(always)]
    fn upcast2(value: Half2) -> Canonical2 {
        Canonical2::new(value.x.to_f32(), value.y.to_f32())
    }

    #[inline(always)]
    fn downcast(value: Canonical) -> f16 {
        f16::from_f32(value)
    }

    #[inline(always)]
    fn downcast2(value: Canonical2) -> Half2 {
        Half2::new(f16::from_f32(value.x), f16::from_f32(value.y))
    }

    #[inline(always)]
    fn make2(x: f16, y: f16) -> Half2 {
        Half2::new(x, y)
    }
}

impl SplitBits for Fp16 {
    type Wide = f32;

    #[inline(always)]
    fn split_bits(value: f32) -> Half2 {
        let (left, right) = split_fp32_into_16_bits(value);
        Half2::new(f16::from_bits(left), f16::from_bits(right))
    }

    #[inline(always)]
    fn combine_bits(value: Half2) -> f32 {
        Self::combine_lanes(value.x, value.y)
    }

    #[inline(always)]
    fn combine_lanes(left: f16, right: f16) -> f32 {
        combine_16_bits_into_fp32(left.to_bits(), right.to_bits())
    }
}
