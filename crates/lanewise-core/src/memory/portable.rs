//! Target-independent backend
//!
//! Cache hints have no portable spelling, so every variant is a plain aligned
//! move. Ordering for the streaming stores is provided by [`Portable::fence`].

use std::sync::atomic::{fence, Ordering};

use super::CacheHintBackend;
use crate::dtype::Int32x4;

#[derive(Debug, Clone, Copy, Default)]
pub struct Portable;

impl CacheHintBackend for Portable {
    const NAME: &'static str = "portable";

    #[inline(always)]
    unsafe fn load(src: *const Int32x4) -> Int32x4 {
        src.read()
    }

    #[inline(always)]
    unsafe fn load_streaming(src: *const Int32x4) -> Int32x4 {
        src.read()
    }

    #[inline(always)]
    unsafe fn store(dst: *mut Int32x4, value: Int32x4) {
        dst.write(value)
    }

    #[inline(always)]
    unsafe fn store_streaming(dst: *mut Int32x4, value: Int32x4) {
        dst.write(value)
    }

    #[inline(always)]
    unsafe fn store_cached_global(dst: *mut Int32x4, value: Int32x4) {
        dst.write(value)
    }

    #[inline(always)]
    fn fence() {
        fence(Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portable_moves() {
        let value = Int32x4::new(1, 2, 3, 4);
        let mut slot = Int32x4::default();
        unsafe {
            Portable::store_streaming(&mut slot, value);
            Portable::fence();
            assert_eq!(Portable::load_streaming(&slot), value);
            Portable::store_cached_global(&mut slot, Int32x4::default());
            assert_eq!(Portable::load(&slot), Int32x4::default());
        }
    }
}
