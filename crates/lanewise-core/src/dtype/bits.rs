//! Bit-level split and recombination of wide floating-point patterns
//!
//! A wide value is treated as a `left:right` pair of halves where `left` holds
//! the most significant bits. No numeric conversion happens; the helpers only
//! move bits. The `left = high half` convention is what the device intrinsics
//! expect when the halves are reassembled into lanes, and it holds regardless
//! of host endianness because it is expressed through `to_bits`/`from_bits`
//! rather than through memory aliasing.

/// Split the bit pattern of an `f32` into its `(high, low)` 16-bit halves
#[inline(always)]
pub fn split_fp32_into_16_bits(value: f32) -> (u16, u16) {
    let bits = value.to_bits();
    ((bits >> 16) as u16, (bits & 0xFFFF) as u16)
}

/// Reassemble an `f32` from `(high, low)` 16-bit halves
#[inline(always)]
pub fn combine_16_bits_into_fp32(left: u16, right: u16) -> f32 {
    f32::from_bits(((left as u32) << 16) | right as u32)
}

/// Split the bit pattern of an `f64` into its `(high, low)` 32-bit halves
#[inline(always)]
pub fn split_fp64_into_32_bits(value: f64) -> (u32, u32) {
    let bits = value.to_bits();
    ((bits >> 32) as u32, (bits & 0xFFFF_FFFF) as u32)
}

/// Reassemble an `f64` from `(high, low)` 32-bit halves
#[inline(always)]
pub fn combine_32_bits_into_fp64(left: u32, right: u32) -> f64 {
    f64::from_bits(((left as u64) << 32) | right as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_fp32_high_half_first() {
        let (left, right) = split_fp32_into_16_bits(f32::from_bits(0xDEAD_BEEF));
        assert_eq!(left, 0xDEAD);
        assert_eq!(right, 0xBEEF);
    }

    #[test]
    fn test_split_fp64_high_half_first() {
        let (left, right) = split_fp64_into_32_bits(f64::from_bits(0x0123_4567_89AB_CDEF));
        assert_eq!(left, 0x0123_4567);
        assert_eq!(right, 0x89AB_CDEF);
    }

    #[test]
    fn test_nan_payload_survives() {
        // Signalling NaN with a payload; arithmetic would quiet it, bit moves must not.
        let snan = f32::from_bits(0x7F80_0001);
        let (left, right) = split_fp32_into_16_bits(snan);
        assert_eq!(combine_16_bits_into_fp32(left, right).to_bits(), 0x7F80_0001);
    }

    proptest! {
        #[test]
        fn fp32_split_combine_is_identity(bits in any::<u32>()) {
            let (left, right) = split_fp32_into_16_bits(f32::from_bits(bits));
            prop_assert_eq!(combine_16_bits_into_fp32(left, right).to_bits(), bits);
        }

        #[test]
        fn fp64_split_combine_is_identity(bits in any::<u64>()) {
            let (left, right) = split_fp64_into_32_bits(f64::from_bits(bits));
            prop_assert_eq!(combine_32_bits_into_fp64(left, right).to_bits(), bits);
        }
    }
}
