//! Hardware constants shared by the vectorized access and launch geometry layers

/// Number of threads executing in lock-step (one warp)
pub const WARP_SIZE: u32 = 32;

/// `log2(WARP_SIZE)`
pub const LOG_WARP_SIZE: u32 = 5;

/// Width in bytes of one maximal memory transaction (128 bits)
pub const VECTOR_BYTES: usize = 16;

/// Upper bound on threads per block accepted by [`crate::BlockSize`]
pub const MAX_THREADS_PER_BLOCK: u32 = 1024;

/// Largest thread block cluster that every cluster-capable device supports
pub const MAX_PORTABLE_CLUSTER_SIZE: u32 = 8;

/// Block sizes swept when tuning vectorized kernels
pub const BLOCK_SIZES_POWERS_OF_2: [u32; 6] = [32, 64, 128, 256, 512, 1024];

/// Cluster sizes swept when tuning cluster-aware kernels
pub const CLUSTER_SIZES: [u32; 4] = [1, 2, 4, 8];
