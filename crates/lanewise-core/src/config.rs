//! Device limits used when planning launches
//!
//! ```
//! use lanewise_core::{BlockSize, LaunchLimits};
//!
//! let limits = LaunchLimits::for_device(132).with_max_cluster_size(8);
//! let plan = limits.plan(1 << 30, BlockSize::new(1024)?)?;
//! assert_eq!(plan.num_blocks, 128);
//! # Ok::<(), lanewise_core::Error>(())
//! ```

use std::env;

use lanewise_tracing::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::launch::{max_blocks_for_cluster, plan_launch, BlockSize, LaunchPlan};

/// Environment variable overriding [`LaunchLimits::sm_count`]
pub const SM_COUNT_ENV: &str = "LANEWISE_SM_COUNT";

/// Environment variable overriding [`LaunchLimits::max_cluster_size`]
pub const MAX_CLUSTER_SIZE_ENV: &str = "LANEWISE_MAX_CLUSTER_SIZE";

/// Parallelism limits of the target device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchLimits {
    /// Streaming multiprocessors to fill; 0 leaves the grid unclamped
    pub sm_count: u32,

    /// Largest thread block cluster to form; 1 disables clustering
    pub max_cluster_size: u32,
}

impl Default for LaunchLimits {
    fn default() -> Self {
        Self {
            sm_count: 0,
            max_cluster_size: 1,
        }
    }
}

impl LaunchLimits {
    /// Limits for a device with `sm_count` multiprocessors and no clustering
    pub const fn for_device(sm_count: u32) -> Self {
        Self {
            sm_count,
            max_cluster_size: 1,
        }
    }

    pub const fn with_max_cluster_size(mut self, max_cluster_size: u32) -> Self {
        self.max_cluster_size = max_cluster_size;
        self
    }

    /// Start from the defaults and apply any environment overrides.
    ///
    /// Values that do not parse (or a zero cluster size) are reported with a
    /// warning and ignored.
    pub fn from_env() -> Self {
        let mut limits = Self::default();

        if let Some(sm_count) = read_env_u32(SM_COUNT_ENV) {
            limits.sm_count = sm_count;
        }

        if let Some(max_cluster_size) = read_env_u32(MAX_CLUSTER_SIZE_ENV) {
            if max_cluster_size == 0 {
                warn!(var = MAX_CLUSTER_SIZE_ENV, "ignoring zero cluster size");
            } else {
                limits.max_cluster_size = max_cluster_size;
            }
        }

        debug!(sm_count = limits.sm_count, max_cluster_size = limits.max_cluster_size, "launch limits");
        limits
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cluster_size == 0 {
            return Err(Error::InvalidClusterSize(self.max_cluster_size));
        }
        Ok(())
    }

    /// [`plan_launch`] under these limits
    pub fn plan(&self, num_elements: u64, block_size: BlockSize) -> Result<LaunchPlan> {
        plan_launch(num_elements, block_size, self.sm_count, self.max_cluster_size)
    }

    /// [`max_blocks_for_cluster`] under these limits
    pub fn max_blocks(&self) -> Result<u32> {
        max_blocks_for_cluster(self.sm_count, self.max_cluster_size)
    }
}

fn read_env_u32(key: &str) -> Option<u32> {
    let value = env::var(key).ok()?;
    match value.trim().parse::<u32>() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(var = key, value = %value, error = %err, "ignoring unparsable override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn reset_env() {
        env::remove_var(SM_COUNT_ENV);
        env::remove_var(MAX_CLUSTER_SIZE_ENV);
    }

    #[test]
    fn defaults_disable_clamping_and_clustering() {
        let limits = LaunchLimits::default();
        assert_eq!(limits.sm_count, 0);
        assert_eq!(limits.max_cluster_size, 1);
        assert!(limits.validate().is_ok());

        let plan = limits.plan(1000, BlockSize::new(256).unwrap()).unwrap();
        assert_eq!(plan, LaunchPlan { num_blocks: 4, cluster_size: 1 });
    }

    #[test]
    fn device_limits_plan() {
        let limits = LaunchLimits::for_device(3).with_max_cluster_size(2);
        let plan = limits.plan(1000, BlockSize::new(256).unwrap()).unwrap();
        assert_eq!(plan, LaunchPlan { num_blocks: 2, cluster_size: 2 });
        assert_eq!(limits.max_blocks(), Ok(2));
    }

    #[test]
    fn zero_cluster_size_is_rejected() {
        let limits = LaunchLimits::for_device(132).with_max_cluster_size(0);
        assert_eq!(limits.validate(), Err(Error::InvalidClusterSize(0)));
        assert!(limits.plan(10, BlockSize::new(32).unwrap()).is_err());
    }

    #[test]
    fn from_env_reads_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        reset_env();

        env::set_var(SM_COUNT_ENV, " 132 ");
        env::set_var(MAX_CLUSTER_SIZE_ENV, "8");
        let limits = LaunchLimits::from_env();
        assert_eq!(limits, LaunchLimits::for_device(132).with_max_cluster_size(8));

        reset_env();
    }

    #[test]
    fn from_env_ignores_invalid_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        reset_env();

        env::set_var(SM_COUNT_ENV, "lots");
        env::set_var(MAX_CLUSTER_SIZE_ENV, "0");
        assert_eq!(LaunchLimits::from_env(), LaunchLimits::default());

        reset_env();
        assert_eq!(LaunchLimits::from_env(), LaunchLimits::default());
    }

    #[test]
    fn serde_fills_missing_fields() {
        let limits: LaunchLimits = serde_json::from_str(r#"{"sm_count": 108}"#).unwrap();
        assert_eq!(limits, LaunchLimits::for_device(108));

        let json = serde_json::to_string(&limits).unwrap();
        assert_eq!(json, r#"{"sm_count":108,"max_cluster_size":1}"#);
    }
}
