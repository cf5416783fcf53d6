//! Error types for lanewise-core configuration-time checks
//!
//! Only setup paths return these errors. Conversions, packed loads/stores and
//! index arithmetic have no failure mode.

/// Result type for lanewise-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring a launch or a vectorized memory layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A launch was planned for zero elements
    #[error("cannot plan a launch for zero elements")]
    EmptyLaunch,

    /// Block size is zero, not a multiple of the warp size, or too large
    #[error("invalid block size {threads}: must be a non-zero multiple of {warp_size} and at most {max}")]
    InvalidBlockSize { threads: u32, warp_size: u32, max: u32 },

    /// Cluster size of zero
    #[error("invalid thread block cluster size: {0}")]
    InvalidClusterSize(u32),

    /// Unclamped block count does not fit the grid dimension
    #[error("grid too large: {blocks} blocks exceed u32::MAX")]
    GridTooLarge { blocks: u64 },

    /// Element slice is not aligned for 128-bit access
    #[error("address {address:#x} is not aligned to {alignment} bytes")]
    Misaligned { address: usize, alignment: usize },

    /// Element slice length is not a whole number of 128-bit vectors
    #[error("slice of {len} elements is not a multiple of {lanes} lanes")]
    RaggedLength { len: usize, lanes: usize },

    /// Vector instruction width not usable with the logical type
    #[error("vector width {width} is not supported for {dtype}")]
    UnsupportedVectorWidth { width: u32, dtype: String },

    /// Unrecognized dtype name
    #[error("unknown logical type: {0}")]
    UnknownLogicalType(String),
}

impl Error {
    /// Create an invalid block size error
    pub fn invalid_block_size(threads: u32) -> Self {
        Self::InvalidBlockSize {
            threads,
            warp_size: crate::constants::WARP_SIZE,
            max: crate::constants::MAX_THREADS_PER_BLOCK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_block_size(100);
        let msg = err.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("32"));

        let err = Error::Misaligned {
            address: 0x1004,
            alignment: 16,
        };
        assert!(err.to_string().contains("0x1004"));

        let err = Error::GridTooLarge { blocks: 1 << 40 };
        assert!(err.to_string().contains(&(1u64 << 40).to_string()));
    }
}
