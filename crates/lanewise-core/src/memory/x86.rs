//! SSE backend for x86_64
//!
//! SSE2 is part of the x86_64 baseline, so aligned and non-temporal 128-bit
//! moves are always available. The streaming load needs SSE4.1
//! (`movntdqa`); without it the streaming load degrades to a normal load.

use std::arch::is_x86_feature_detected;
use std::arch::x86_64::*;
use std::sync::OnceLock;

use super::CacheHintBackend;
use crate::dtype::Int32x4;

static HAS_SSE41: OnceLock<bool> = OnceLock::new();

fn has_sse41() -> bool {
    *HAS_SSE41.get_or_init(|| is_x86_feature_detected!("sse4.1"))
}

/// 128-bit moves through SSE registers with non-temporal hints
#[derive(Debug, Clone, Copy, Default)]
pub struct X86Sse;

#[inline(always)]
fn from_register(value: __m128i) -> Int32x4 {
    // SAFETY: both types are 16 bytes with no invalid bit patterns.
    unsafe { std::mem::transmute::<__m128i, Int32x4>(value) }
}

#[inline(always)]
fn to_register(value: Int32x4) -> __m128i {
    // SAFETY: see `from_register`.
    unsafe { std::mem::transmute::<Int32x4, __m128i>(value) }
}

#[target_feature(enable = "sse4.1")]
unsafe fn stream_load_sse41(src: *const Int32x4) -> Int32x4 {
    from_register(_mm_stream_load_si128(src as *mut __m128i))
}

impl CacheHintBackend for X86Sse {
    const NAME: &'static str = "x86_64-sse";

    #[inline(always)]
    unsafe fn load(src: *const Int32x4) -> Int32x4 {
        from_register(_mm_load_si128(src as *const __m128i))
    }

    #[inline(always)]
    unsafe fn load_streaming(src: *const Int32x4) -> Int32x4 {
        if has_sse41() {
            stream_load_sse41(src)
        } else {
            Self::load(src)
        }
    }

    #[inline(always)]
    unsafe fn store(dst: *mut Int32x4, value: Int32x4) {
        _mm_store_si128(dst as *mut __m128i, to_register(value))
    }

    #[inline(always)]
    unsafe fn store_streaming(dst: *mut Int32x4, value: Int32x4) {
        _mm_stream_si128(dst as *mut __m128i, to_register(value))
    }

    // Host caches have no L2-only write policy; a regular store is the closest match.
    #[inline(always)]
    unsafe fn store_cached_global(dst: *mut Int32x4, value: Int32x4) {
        Self::store(dst, value)
    }

    #[inline(always)]
    fn fence() {
        // SAFETY: `sfence` is part of the SSE baseline on x86_64.
        unsafe { _mm_sfence() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_moves_the_same_bits() {
        let value = Int32x4::new(-1, 0x1234_5678, i32::MIN, 42);
        let mut slots = [Int32x4::default(); 3];

        unsafe {
            X86Sse::store(&mut slots[0], value);
            X86Sse::store_streaming(&mut slots[1], value);
            X86Sse::store_cached_global(&mut slots[2], value);
        }
        X86Sse::fence();

        for slot in &slots {
            assert_eq!(unsafe { X86Sse::load(slot) }, value);
            assert_eq!(unsafe { X86Sse::load_streaming(slot) }, value);
        }
    }
}
