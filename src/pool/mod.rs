//! Reusable-member pools with usage-driven soft limits.
//!
//! A [`Pool`] owns an ordered registry of [`PoolMember`] handles for one
//! object kind. Members are taken (emerged) and released (submerged)
//! rather than created and destroyed; the pool grows under demand and is
//! trimmed back toward a soft limit by periodic culling, while limit
//! adaptation resizes that target from a rolling window of peak usage.

mod member;
mod pool;

pub use member::{PoolMember, PoolObject, Poolable};
pub use pool::{Pool, PoolFactory};

#[cfg(test)]
pub(crate) mod test_support;
