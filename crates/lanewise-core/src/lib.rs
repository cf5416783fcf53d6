//! # lanewise-core - Building Blocks for Data-Parallel Kernels
//!
//! Three independent layers that elementwise kernels are assembled from:
//!
//! - [`dtype`] - per-precision type traits. Marker types [`Fp16`], [`Bf16`]
//!   and [`Fp32`] map a logical precision to its native scalar, pair and quad
//!   representations, with exact widening to `f32`, round-to-nearest-even
//!   narrowing and bit-level split/recombine helpers.
//! - [`packed`] and [`memory`] - the 16-byte aligned [`Packed128`] block and
//!   128-bit loads/stores carrying cache-residency hints (default, streaming,
//!   cached-global).
//! - [`launch`] - global thread indices and grid sizing ([`plan_launch`])
//!   bounded by multiprocessor count and thread block cluster size.
//!
//! Nothing here allocates or blocks, and only configuration-time paths
//! (planning, slice reinterpretation, parsing) can fail.
//!
//! ## Example
//!
//! ```
//! use half::f16;
//! use lanewise_core::{plan_launch, BlockSize, DType, Fp16, Packed128};
//! use lanewise_core::launch::ThreadContext;
//!
//! let n = 4096;
//! let x = vec![Packed128::<f16>::constant(f16::from_f32(1.5)); n / 8];
//! let mut y = vec![Packed128::<f16>::zeros(); n / 8];
//!
//! let block_size = BlockSize::new(128)?;
//! let vectors = (n / 8) as u64;
//! let config = plan_launch(vectors, block_size, 2, 1)?.into_config(block_size);
//!
//! for block in 0..config.grid.x {
//!     for thread in 0..config.block.x {
//!         for i in ThreadContext::linear(block, thread, &config).grid_stride(vectors) {
//!             let mut v = Packed128::load_streaming(&x[i as usize]);
//!             for lane in v.iter_mut() {
//!                 *lane = Fp16::downcast(Fp16::upcast(*lane) * 2.0);
//!             }
//!             v.store(&mut y[i as usize]);
//!         }
//!     }
//! }
//!
//! assert!(y.iter().all(|v| *v == Packed128::constant(f16::from_f32(3.0))));
//! # Ok::<(), lanewise_core::Error>(())
//! ```

pub mod config;
pub mod constants;
pub mod dtype;
pub mod error;
pub mod launch;
pub mod memory;
pub mod packed;

// Re-export primary types
pub use config::LaunchLimits;
pub use constants::{LOG_WARP_SIZE, VECTOR_BYTES, WARP_SIZE};
pub use dtype::{Bf16, DType, Fp16, Fp32, LogicalType, QuadDType, SplitBits};
pub use error::{Error, Result};
pub use launch::{global_index, max_blocks_for_cluster, plan_launch, BlockSize, LaunchConfig, LaunchPlan, VectorWidth};
pub use memory::{
    as_elements, as_elements_mut, as_packed, as_packed_mut, load128, load128_streaming, store128,
    store128_cached_global, store128_streaming, streaming_fence,
};
pub use packed::{lanes_per_vector, Packed128, PackedElement};
