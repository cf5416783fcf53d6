use half::bf16;

use super::bits::{combine_16_bits_into_fp32, split_fp32_into_16_bits};
use super::{BFloat162, Bf16, Canonical, Canonical2, DType, LogicalType, SplitBits};

impl DType for Bf16 {
    const LOGICAL: LogicalType = LogicalType::Bf16;

    type Scalar = bf16;
    type Pair = BFloat162;

    #[inline(always)]
    fn upcast(value: bf16) -> Canonical {
        value.to_f32()
    }

    #[inline(always)]
    fn upcast2(value: BFloat162) -> Canonical2 {
        Canonical2::new(value.x.to_f32(), value.y.to_f32())
    }

    #[inline(always)]
    fn downcast(value: Canonical) -> bf16 {
        bf16::from_f32(value)
    }

    #[inline(always)]
    fn downcast2(value: Canonical2) -> BFloat162 {
        BFloat162::new(bf16::from_f32(value.x), bf16::from_f32(value.y))
    }

    #[inline(always)]
    fn make2(x: bf16, y: bf16) -> BFloat162 {
        BFloat162::new(x, y)
    }
}

impl SplitBits for Bf16 {
    type Wide = f32;

    #[inline(always)]
    fn split_bits(value: f32) -> BFloat162 {
        let (left, right) = split_fp32_into_16_bits(value);
        BFloat162::new(bf16::from_bits(left), bf16::from_bits(right))
    }

    #[inline(always)]
    fn combine_bits(value: BFloat162) -> f32 {
        Self::combine_lanes(value.x, value.y)
    }

    #[inline(always)]
    fn combine_lanes(left: bf16, right: bf16) -> f32 {
        combine_16_bits_into_fp32(left.to_bits(), right.to_bits())
    }
}
