//! Native paired and quad vector representations
//!
//! These mirror the device vector types (`half2`, `float2`, `float4`, `int4`):
//! `#[repr(C)]` lanes with the alignment of the whole vector, so a pair or quad
//! can be moved with a single load or store of its full width.

use bytemuck::{Pod, Zeroable};
use half::{bf16, f16};

/// Two half-precision lanes (`half2`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C, align(4))]
pub struct Half2 {
    pub x: f16,
    pub y: f16,
}

/// Two bfloat16 lanes (`nv_bfloat162`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C, align(4))]
pub struct BFloat162 {
    pub x: bf16,
    pub y: bf16,
}

/// Two single-precision lanes (`float2`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C, align(8))]
pub struct Float2 {
    pub x: f32,
    pub y: f32,
}

/// Four single-precision lanes (`float4`)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C, align(16))]
pub struct Float4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// Raw 128-bit pattern (`int4`), the unit every packed load and store moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(C, align(16))]
pub struct Int32x4 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub w: i32,
}

impl Half2 {
    pub const fn new(x: f16, y: f16) -> Self {
        Self { x, y }
    }
}

impl BFloat162 {
    pub const fn new(x: bf16, y: bf16) -> Self {
        Self { x, y }
    }
}

impl Float2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Float4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Int32x4 {
    pub const fn new(x: i32, y: i32, z: i32, w: i32) -> Self {
        Self { x, y, z, w }
    }
}

// SAFETY: every type below is `#[repr(C)]` over `Pod` lanes whose combined size
// equals the declared alignment, so there are no padding bytes and any bit
// pattern is a valid value.
macro_rules! impl_pod_vector {
    ($($ty:ty => $bytes:expr),* $(,)?) => {
        $(
            const _: () = assert!(core::mem::size_of::<$ty>() == $bytes);
            unsafe impl Zeroable for $ty {}
            unsafe impl Pod for $ty {}
        )*
    };
}

impl_pod_vector! {
    Half2 => 4,
    BFloat162 => 4,
    Float2 => 8,
    Float4 => 16,
    Int32x4 => 16,
}
