//! Launch geometry: global indices and grid sizing
//!
//! A launch is sized by [`plan_launch`]: enough blocks to cover the problem,
//! clamped to the number of streaming multiprocessors when one is given, then
//! snapped down to a whole number of thread block clusters.
//!
//! ```text
//!  num_elements ──ceil/block_size──► raw blocks ──min(sm_count)──► clamped
//!                                                                     │
//!        num_blocks = cluster * (clamped / cluster)  ◄── cluster = min(max_cluster, clamped)
//! ```
//!
//! Snapping down can leave the grid smaller than the problem
//! (`num_blocks * block_size < num_elements`). Kernels launched from a plan
//! must therefore walk their elements with a grid-stride loop; see
//! [`ThreadContext::grid_stride`].

mod dims;

use std::fmt;

use lanewise_tracing::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_THREADS_PER_BLOCK, VECTOR_BYTES, WARP_SIZE};
use crate::dtype::{DType, LogicalType};
use crate::error::{Error, Result};

pub use dims::{BlockDim, GridDim, LaunchConfig, ThreadContext};

/// `ceil(x / d)`
///
/// Both operands must be positive; a zero divisor is a caller error.
#[inline(always)]
pub const fn ceil_divide(x: u64, d: u64) -> u64 {
    debug_assert!(x > 0 && d > 0);
    x.div_ceil(d)
}

/// Global linear index of a thread along one axis
///
/// `block_size * block_id + thread_id`, computed in 64 bits so that large
/// grids never wrap.
#[inline(always)]
pub const fn global_index(block_size: u32, block_id: u32, thread_id: u32) -> u64 {
    block_size as u64 * block_id as u64 + thread_id as u64
}

/// Threads per block, validated at construction.
///
/// A block size is a non-zero multiple of [`WARP_SIZE`] no larger than
/// [`MAX_THREADS_PER_BLOCK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BlockSize(u32);

impl BlockSize {
    pub fn new(threads: u32) -> Result<Self> {
        if threads == 0 || threads % WARP_SIZE != 0 || threads > MAX_THREADS_PER_BLOCK {
            return Err(Error::invalid_block_size(threads));
        }
        Ok(Self(threads))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Warps per block
    pub const fn warps(self) -> u32 {
        self.0 / WARP_SIZE
    }
}

impl TryFrom<u32> for BlockSize {
    type Error = Error;

    fn try_from(threads: u32) -> Result<Self> {
        Self::new(threads)
    }
}

impl From<BlockSize> for u32 {
    fn from(block_size: BlockSize) -> Self {
        block_size.0
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of [`plan_launch`]
///
/// Invariants: `num_blocks % cluster_size == 0`, `cluster_size <= num_blocks`,
/// and `num_blocks <= sm_count` whenever an SM count was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchPlan {
    pub num_blocks: u32,
    pub cluster_size: u32,
}

impl LaunchPlan {
    /// Elements covered when every thread handles exactly one
    pub const fn covered_elements(&self, block_size: BlockSize) -> u64 {
        self.num_blocks as u64 * block_size.get() as u64
    }

    /// Whether a single pass (no grid-stride loop) reaches every element
    pub const fn covers(&self, num_elements: u64, block_size: BlockSize) -> bool {
        self.covered_elements(block_size) >= num_elements
    }

    /// Clusters in the grid, 0 for a hand-built plan with `cluster_size == 0`
    pub const fn num_clusters(&self) -> u32 {
        match self.num_blocks.checked_div(self.cluster_size) {
            Some(clusters) => clusters,
            None => 0,
        }
    }

    /// 1D launch configuration for this plan
    pub const fn into_config(self, block_size: BlockSize) -> LaunchConfig {
        LaunchConfig::new(GridDim::linear(self.num_blocks), BlockDim::linear(block_size.get()), self.cluster_size)
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} blocks in clusters of {}", self.num_blocks, self.cluster_size)
    }
}

/// Size a 1D launch over `num_elements`.
///
/// `sm_count == 0` disables the clamp to the number of streaming
/// multiprocessors. `max_cluster_size == 1` disables clustering.
///
/// # Errors
///
/// - [`Error::EmptyLaunch`] when `num_elements == 0`
/// - [`Error::InvalidClusterSize`] when `max_cluster_size == 0`
/// - [`Error::GridTooLarge`] when no SM count is given and the block count
///   exceeds `u32::MAX`
///
/// # Example
///
/// ```
/// use lanewise_core::launch::{plan_launch, BlockSize, LaunchPlan};
///
/// let block_size = BlockSize::new(256)?;
/// assert_eq!(plan_launch(1000, block_size, 0, 1)?, LaunchPlan { num_blocks: 4, cluster_size: 1 });
/// assert_eq!(plan_launch(1000, block_size, 3, 2)?, LaunchPlan { num_blocks: 2, cluster_size: 2 });
/// # Ok::<(), lanewise_core::Error>(())
/// ```
pub fn plan_launch(num_elements: u64, block_size: BlockSize, sm_count: u32, max_cluster_size: u32) -> Result<LaunchPlan> {
    if num_elements == 0 {
        return Err(Error::EmptyLaunch);
    }
    if max_cluster_size == 0 {
        return Err(Error::InvalidClusterSize(max_cluster_size));
    }

    let mut blocks = ceil_divide(num_elements, block_size.get() as u64);
    if sm_count != 0 && blocks > sm_count as u64 {
        debug!(requested = blocks, sm_count, "clamping grid to SM count");
        blocks = sm_count as u64;
    }
    let num_blocks = u32::try_from(blocks).map_err(|_| Error::GridTooLarge { blocks })?;

    let cluster_size = max_cluster_size.min(num_blocks);
    let plan = LaunchPlan {
        num_blocks: cluster_size * (num_blocks / cluster_size),
        cluster_size,
    };

    debug!(
        num_elements,
        block_size = block_size.get(),
        num_blocks = plan.num_blocks,
        cluster_size = plan.cluster_size,
        "planned launch"
    );
    Ok(plan)
}

/// Largest block count not above `sm_count` that is a whole number of clusters.
///
/// Returns 0 when `sm_count < cluster_size`.
///
/// # Errors
///
/// [`Error::InvalidClusterSize`] when `cluster_size == 0`.
pub fn max_blocks_for_cluster(sm_count: u32, cluster_size: u32) -> Result<u32> {
    if cluster_size == 0 {
        return Err(Error::InvalidClusterSize(cluster_size));
    }
    Ok(cluster_size * (sm_count / cluster_size))
}

/// Elements each thread moves per vector instruction.
///
/// A width is valid for a logical type when `width * size_of(scalar)` fits a
/// single 128-bit transaction: 1, 2, 4 for every type and 8 for 16-bit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VectorWidth {
    dtype: LogicalType,
    width: u32,
}

impl VectorWidth {
    pub fn new(dtype: LogicalType, width: u32) -> Result<Self> {
        if !dtype.supports_vector_width(width) {
            return Err(Error::UnsupportedVectorWidth {
                width,
                dtype: dtype.to_string(),
            });
        }
        Ok(Self { dtype, width })
    }

    /// Width for the compile-time logical type `D`
    pub fn of<D: DType>(width: u32) -> Result<Self> {
        Self::new(D::LOGICAL, width)
    }

    /// Widest instruction for `dtype`, one full 128-bit transaction
    pub const fn widest(dtype: LogicalType) -> Self {
        Self {
            dtype,
            width: (VECTOR_BYTES / dtype.size_bytes()) as u32,
        }
    }

    pub const fn get(self) -> u32 {
        self.width
    }

    pub const fn dtype(self) -> LogicalType {
        self.dtype
    }

    /// Bytes moved per vector instruction
    pub const fn bytes(self) -> usize {
        self.width as usize * self.dtype.size_bytes()
    }

    /// Threads needed to cover `num_elements` at this width
    pub const fn work_items(self, num_elements: u64) -> u64 {
        ceil_divide(num_elements, self.width as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BLOCK_SIZES_POWERS_OF_2;
    use crate::dtype::{Bf16, Fp32};
    use proptest::prelude::*;

    fn block(threads: u32) -> BlockSize {
        BlockSize::new(threads).unwrap()
    }

    #[test]
    fn test_global_index() {
        assert_eq!(global_index(256, 3, 10), 778);
        assert_eq!(global_index(1024, u32::MAX, 1023), 1024 * u32::MAX as u64 + 1023);
    }

    #[test]
    fn test_ceil_divide() {
        assert_eq!(ceil_divide(1000, 256), 4);
        assert_eq!(ceil_divide(1024, 256), 4);
        assert_eq!(ceil_divide(1, 256), 1);
    }

    #[test]
    fn test_block_size_validation() {
        assert_eq!(block(256).get(), 256);
        assert_eq!(block(96).warps(), 3);
        assert_eq!(BlockSize::new(0), Err(Error::invalid_block_size(0)));
        assert_eq!(BlockSize::new(100), Err(Error::invalid_block_size(100)));
        assert_eq!(BlockSize::new(2048), Err(Error::invalid_block_size(2048)));
        for threads in BLOCK_SIZES_POWERS_OF_2 {
            assert!(BlockSize::new(threads).is_ok());
        }
    }

    #[test]
    fn test_block_size_serde() {
        let parsed: BlockSize = serde_json::from_str("128").unwrap();
        assert_eq!(parsed, block(128));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "128");
        assert!(serde_json::from_str::<BlockSize>("100").is_err());
    }

    #[test]
    fn test_plan_without_limits() {
        let plan = plan_launch(1000, block(256), 0, 1).unwrap();
        assert_eq!(plan, LaunchPlan { num_blocks: 4, cluster_size: 1 });
        assert!(plan.covers(1000, block(256)));
    }

    #[test]
    fn test_plan_clamps_and_snaps() {
        let plan = plan_launch(1000, block(256), 3, 2).unwrap();
        assert_eq!(plan, LaunchPlan { num_blocks: 2, cluster_size: 2 });
        assert_eq!(plan.covered_elements(block(256)), 512);
        assert!(!plan.covers(1000, block(256)));
    }

    #[test]
    fn test_plan_cluster_shrinks_to_grid() {
        let plan = plan_launch(100, block(32), 0, 8).unwrap();
        assert_eq!(plan, LaunchPlan { num_blocks: 4, cluster_size: 4 });
        assert_eq!(plan.num_clusters(), 1);
    }

    #[test]
    fn test_plan_rejects_invalid_input() {
        assert_eq!(plan_launch(0, block(256), 0, 1), Err(Error::EmptyLaunch));
        assert_eq!(plan_launch(10, block(256), 0, 0), Err(Error::InvalidClusterSize(0)));

        let huge = (u32::MAX as u64 + 1) * 32;
        assert_eq!(
            plan_launch(huge, block(32), 0, 1),
            Err(Error::GridTooLarge { blocks: u32::MAX as u64 + 1 })
        );
    }

    #[test]
    fn test_plan_clamps_grids_beyond_u32() {
        let huge = (u32::MAX as u64 + 1) * 32;
        assert_eq!(
            plan_launch(huge, block(32), 132, 1),
            Ok(LaunchPlan { num_blocks: 132, cluster_size: 1 })
        );
        assert_eq!(
            plan_launch(u64::MAX, block(1024), 132, 8),
            Ok(LaunchPlan { num_blocks: 128, cluster_size: 8 })
        );
    }

    #[test]
    fn test_num_clusters_of_degenerate_plan() {
        let plan: LaunchPlan = serde_json::from_str(r#"{"num_blocks":0,"cluster_size":0}"#).unwrap();
        assert_eq!(plan.num_clusters(), 0);
        assert_eq!(LaunchPlan { num_blocks: 128, cluster_size: 8 }.num_clusters(), 16);
    }

    #[test]
    fn test_into_config() {
        let config = plan_launch(1000, block(256), 3, 2).unwrap().into_config(block(256));
        assert_eq!(config.grid, GridDim::linear(2));
        assert_eq!(config.block, BlockDim::linear(256));
        assert_eq!(config.cluster_size, 2);
    }

    #[test]
    fn test_max_blocks_for_cluster() {
        assert_eq!(max_blocks_for_cluster(132, 8), Ok(128));
        assert_eq!(max_blocks_for_cluster(132, 4), Ok(132));
        assert_eq!(max_blocks_for_cluster(3, 4), Ok(0));
        assert_eq!(max_blocks_for_cluster(132, 0), Err(Error::InvalidClusterSize(0)));
    }

    #[test]
    fn test_vector_width() {
        let width = VectorWidth::of::<Bf16>(8).unwrap();
        assert_eq!(width.bytes(), 16);
        assert_eq!(width.work_items(1001), 126);

        assert_eq!(
            VectorWidth::of::<Fp32>(8),
            Err(Error::UnsupportedVectorWidth {
                width: 8,
                dtype: "fp32".to_string()
            })
        );
        assert_eq!(VectorWidth::widest(LogicalType::Fp32).get(), 4);
        assert_eq!(VectorWidth::widest(LogicalType::Fp16).get(), 8);
    }

    proptest! {
        #[test]
        fn plan_invariants(
            num_elements in 1u64..1 << 36,
            warps in 1u32..=32,
            sm_count in 0u32..512,
            max_cluster_size in 1u32..=16,
        ) {
            let block_size = block(warps * WARP_SIZE);
            let plan = plan_launch(num_elements, block_size, sm_count, max_cluster_size).unwrap();

            prop_assert!(plan.cluster_size >= 1);
            prop_assert_eq!(plan.num_blocks % plan.cluster_size, 0);
            prop_assert!(plan.cluster_size <= plan.num_blocks);
            prop_assert!(plan.cluster_size <= max_cluster_size);
            if sm_count != 0 {
                prop_assert!(plan.num_blocks <= sm_count);
            }
            let unclamped = ceil_divide(num_elements, block_size.get() as u64);
            prop_assert!(plan.num_blocks as u64 <= unclamped);
        }

        #[test]
        fn max_blocks_is_whole_clusters(sm_count in any::<u32>(), cluster_size in 1u32..=16) {
            let blocks = max_blocks_for_cluster(sm_count, cluster_size).unwrap();
            prop_assert_eq!(blocks % cluster_size, 0);
            prop_assert!(blocks <= sm_count);
            prop_assert!(sm_count - blocks < cluster_size);
        }
    }
}
