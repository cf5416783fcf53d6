use std::fmt;

use serde::{Deserialize, Serialize};

/// Grid dimensions for kernel launch
///
/// Defines the 3D iteration space of blocks that execute the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GridDim {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Create 1D grid
    pub const fn linear(blocks: u32) -> Self {
        Self { x: blocks, y: 1, z: 1 }
    }

    /// Total number of blocks
    pub const fn total_blocks(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }
}

impl Default for GridDim {
    fn default() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }
}

impl fmt::Display for GridDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Block dimensions
///
/// Defines the 3D arrangement of threads within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl BlockDim {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Create 1D block
    pub const fn linear(threads: u32) -> Self {
        Self { x: threads, y: 1, z: 1 }
    }

    /// Total number of threads per block
    pub const fn total_threads(&self) -> u32 {
        self.x * self.y * self.z
    }
}

impl Default for BlockDim {
    fn default() -> Self {
        Self { x: 1, y: 1, z: 1 }
    }
}

impl fmt::Display for BlockDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Launch configuration handed to the device runtime
///
/// Built from a [`super::LaunchPlan`] via [`super::LaunchPlan::into_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaunchConfig {
    pub grid: GridDim,

    pub block: BlockDim,

    /// Blocks per thread block cluster along x (1 disables clustering)
    pub cluster_size: u32,

    /// Dynamic shared memory per block
    pub shared_memory_bytes: usize,
}

impl LaunchConfig {
    pub const fn new(grid: GridDim, block: BlockDim, cluster_size: u32) -> Self {
        Self {
            grid,
            block,
            cluster_size,
            shared_memory_bytes: 0,
        }
    }

    pub const fn with_shared_memory(mut self, bytes: usize) -> Self {
        self.shared_memory_bytes = bytes;
        self
    }

    pub const fn total_blocks(&self) -> u64 {
        self.grid.total_blocks()
    }

    /// Total number of threads across all blocks
    pub const fn total_threads(&self) -> u64 {
        self.grid.total_blocks() * self.block.total_threads() as u64
    }
}

impl fmt::Display for LaunchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grid={}, block={}, cluster={}, shared_mem={}B",
            self.grid, self.block, self.cluster_size, self.shared_memory_bytes
        )
    }
}

/// Position of one thread within a launch
///
/// Mirrors the built-in `blockIdx`/`threadIdx`/`gridDim`/`blockDim` registers
/// so index arithmetic can run (and be tested) on the host.
#[derive(Debug, Clone, Copy)]
pub struct ThreadContext {
    pub block_idx: (u32, u32, u32),

    pub thread_idx: (u32, u32, u32),

    pub grid_dim: GridDim,

    pub block_dim: BlockDim,
}

impl ThreadContext {
    pub const fn new(
        block_idx: (u32, u32, u32),
        thread_idx: (u32, u32, u32),
        grid_dim: GridDim,
        block_dim: BlockDim,
    ) -> Self {
        Self {
            block_idx,
            thread_idx,
            grid_dim,
            block_dim,
        }
    }

    /// Thread `thread` of block `block` in a 1D launch
    pub const fn linear(block: u32, thread: u32, config: &LaunchConfig) -> Self {
        Self::new((block, 0, 0), (thread, 0, 0), config.grid, config.block)
    }

    pub const fn threads_per_block(&self) -> u32 {
        self.block_dim.total_threads()
    }

    pub const fn num_blocks(&self) -> u64 {
        self.grid_dim.total_blocks()
    }

    /// Linear block id, x fastest: `grid.x * (grid.y * z + y) + x`
    pub const fn block_id(&self) -> u64 {
        let (bx, by, bz) = self.block_idx;
        self.grid_dim.x as u64 * (self.grid_dim.y as u64 * bz as u64 + by as u64) + bx as u64
    }

    /// Linear thread id within the block, x fastest
    pub const fn thread_id(&self) -> u32 {
        let (tx, ty, tz) = self.thread_idx;
        self.block_dim.x * (self.block_dim.y * tz + ty) + tx
    }

    /// Global index along x: `block_dim.x * block_idx.x + thread_idx.x`
    pub const fn global_index_x(&self) -> u64 {
        super::global_index(self.block_dim.x, self.block_idx.0, self.thread_idx.0)
    }

    /// Global index across every axis of the launch
    pub const fn global_linear_index(&self) -> u64 {
        self.block_id() * self.threads_per_block() as u64 + self.thread_id() as u64
    }

    /// Indices below `num_elements` this thread visits in a 1D grid-stride loop
    ///
    /// Starts at [`Self::global_index_x`] and advances by the total number of
    /// threads along x, so a grid smaller than the problem still covers it.
    pub fn grid_stride(&self, num_elements: u64) -> std::iter::StepBy<std::ops::Range<u64>> {
        let stride = (self.grid_dim.x as u64 * self.block_dim.x as u64).max(1);
        (self.global_index_x()..num_elements.max(self.global_index_x())).step_by(stride as usize)
    }
}
