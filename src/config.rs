use serde::{Deserialize, Serialize};

use crate::types::Kind;

/// Per-pool configuration.
///
/// All fields are set once at pool creation; `pool_limit` is the only
/// field the subsystem itself rewrites afterwards (limit adaptation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// The ideal limit of members in the pool. A soft target: pools grow
    /// past it under demand and are trimmed back by culling.
    pub pool_limit: usize,

    /// How many members to preemptively add to the pool
    pub prefill_amount: usize,

    /// Whether the pool should periodically cull members over its limit
    pub cull_excess_members: bool,

    /// Whether the pool's limit should change periodically to reflect its usage
    pub adaptive_pool_limits: bool,

    /// How many past intervals are recorded to calculate the adaptive limit.
    /// Values below 1 are treated as 1.
    pub interval_memory: usize,

    /// The minimum pool limit. The adaptive limit never goes below this point.
    pub minimum_limit: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            pool_limit: 0,
            prefill_amount: 0,
            cull_excess_members: false,
            adaptive_pool_limits: false,
            interval_memory: 1,
            minimum_limit: 0,
        }
    }
}

/// Manager-wide configuration.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    /// How frequently pools cull excess members, in seconds
    pub cull_interval_secs: u64,

    /// How frequently pools adapt their limit, in seconds
    pub adapt_interval_secs: u64,

    /// Settings used when a pool is created implicitly by `request`.
    /// When absent, requesting an unseen kind fails.
    pub default_settings: Option<PoolSettings>,

    /// Pools to preemptively create at manager construction
    pub default_pools: Vec<(Kind, PoolSettings)>,
}

impl ManagerConfig {
    /// Default maintenance interval in seconds.
    pub const DEFAULT_INTERVAL_SECS: u64 = 40;

    /// Create a config with the default maintenance intervals and no
    /// implicit-creation settings.
    pub fn new() -> Self {
        Self {
            cull_interval_secs: Self::DEFAULT_INTERVAL_SECS,
            adapt_interval_secs: Self::DEFAULT_INTERVAL_SECS,
            default_settings: None,
            default_pools: Vec::new(),
        }
    }
}
