//! PoolManager - owns the pool registry and drives periodic maintenance.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{ManagerConfig, PoolSettings};
use crate::error::{Error, Result};
use crate::metrics::METRICS;
use crate::pool::{Pool, PoolFactory, PoolMember};
use crate::types::Kind;

/// Manages and provides pools and pooled members, one pool per kind.
///
/// Pools are created eagerly from the configured default table and
/// lazily on first [`request`](Self::request) for an unseen kind. Two
/// background loops periodically cull overgrown pools and adapt the
/// limits of adaptive ones; they run until the manager is dropped or
/// [`shutdown`](Self::shutdown).
///
/// The manager is constructed once by the owning application and passed
/// around by reference; it holds no global state of its own.
pub struct PoolManager<F: PoolFactory> {
    factory: Arc<F>,
    config: ManagerConfig,
    pools: RwLock<FxHashMap<Kind, Arc<Pool<F>>>>,
    maintenance: Mutex<Vec<JoinHandle<()>>>,
}

impl<F: PoolFactory> PoolManager<F> {
    /// Create a manager and eagerly build its default pools.
    ///
    /// Fails if the factory fails while prefilling a default pool.
    pub fn new(factory: Arc<F>, config: ManagerConfig) -> Result<Arc<Self>> {
        METRICS.init_start_time();

        let manager = Arc::new(Self {
            factory,
            config,
            pools: RwLock::new(FxHashMap::default()),
            maintenance: Mutex::new(Vec::new()),
        });

        for (kind, settings) in manager.config.default_pools.clone() {
            manager.create_pool(kind, settings)?;
        }
        if !manager.config.default_pools.is_empty() {
            info!(
                "Created {} default pools",
                manager.config.default_pools.len()
            );
        }

        Ok(manager)
    }

    /// Spawn the cull and adapt loops. Idempotent.
    ///
    /// Each loop waits one full interval before its first pass, then
    /// runs for the manager's lifetime. Must be called within a Tokio
    /// runtime.
    pub fn start_maintenance(self: &Arc<Self>) {
        let mut maintenance = self.maintenance.lock();
        if !maintenance.is_empty() {
            return;
        }

        let cull_interval = Duration::from_secs(self.config.cull_interval_secs.max(1));
        let adapt_interval = Duration::from_secs(self.config.adapt_interval_secs.max(1));

        maintenance.push(spawn_maintenance_loop(
            Arc::downgrade(self),
            cull_interval,
            Self::cull_pass,
        ));
        maintenance.push(spawn_maintenance_loop(
            Arc::downgrade(self),
            adapt_interval,
            Self::adapt_pass,
        ));

        info!(
            "Pool maintenance started (cull every {}s, adapt every {}s)",
            cull_interval.as_secs(),
            adapt_interval.as_secs()
        );
    }

    /// Create and register a new pool for a kind.
    ///
    /// An existing pool for the kind is silently replaced; the displaced
    /// pool is detached, not destroyed, since callers may still hold its
    /// emerged members.
    pub fn create_pool(&self, kind: Kind, settings: PoolSettings) -> Result<Arc<Pool<F>>> {
        let pool = Pool::new(kind.clone(), self.factory.clone(), settings)?;

        if self.pools.write().insert(kind.clone(), pool.clone()).is_some() {
            warn!("Replaced existing pool for kind '{}'", kind);
        }
        METRICS.inc(&METRICS.pools_created);
        debug!("Created pool for kind '{}'", kind);

        Ok(pool)
    }

    /// Destroy a pool, disposing every member regardless of submersion
    /// state. No-op if no pool exists for the kind.
    pub fn destroy_pool(&self, kind: &Kind) -> Result<()> {
        let Some(pool) = self.pools.write().remove(kind) else {
            return Ok(());
        };

        pool.wipe(true)?;
        METRICS.inc(&METRICS.pools_destroyed);
        info!("Destroyed pool for kind '{}'", kind);
        Ok(())
    }

    /// Request a submerged member of a kind.
    ///
    /// Looks up the existing pool or lazily creates one with the
    /// manager's default settings. Fails with [`Error::UnknownKind`]
    /// when the kind has no pool and no default settings are configured.
    pub fn request(&self, kind: &Kind) -> Result<Arc<PoolMember<F>>> {
        let existing = self.pools.read().get(kind).cloned();
        if let Some(pool) = existing {
            return pool.submerged_member();
        }

        let Some(default_settings) = self.config.default_settings else {
            return Err(Error::UnknownKind(kind.clone()));
        };

        debug!("Implicitly creating pool for kind '{}'", kind);
        self.create_pool(kind.clone(), default_settings)?
            .submerged_member()
    }

    /// Look up the pool for a kind.
    pub fn pool(&self, kind: &Kind) -> Option<Arc<Pool<F>>> {
        self.pools.read().get(kind).cloned()
    }

    /// Number of registered pools.
    pub fn pool_count(&self) -> usize {
        self.pools.read().len()
    }

    /// Stop maintenance and wipe every pool.
    ///
    /// With `destroy` set, instances are routed through the disposer;
    /// otherwise only the bookkeeping is torn down (e.g. when the host
    /// is unloading the instances wholesale anyway).
    pub fn shutdown(&self, destroy: bool) -> Result<()> {
        self.stop_maintenance();

        let drained: Vec<_> = {
            let mut pools = self.pools.write();
            pools.drain().collect()
        };
        info!("Pool manager shutting down ({} pools)", drained.len());

        for (_, pool) in drained {
            pool.wipe(destroy)?;
        }
        Ok(())
    }

    /// Cull every culling-enabled pool currently over its limit.
    /// A failing pool is logged and skipped so the others still run.
    fn cull_pass(&self) {
        METRICS.inc(&METRICS.cull_passes);

        for pool in self.snapshot_pools() {
            if !pool.settings().cull_excess_members || !pool.is_over_member_limit() {
                continue;
            }
            match pool.cull_excess_members() {
                Ok(culled) if culled > 0 => {
                    debug!("Culled {} members from pool '{}'", culled, pool.kind());
                }
                Ok(_) => {}
                Err(e) => warn!("Cull failed for pool '{}': {}", pool.kind(), e),
            }
        }
    }

    /// Resample usage and adapt the limit of every adaptive pool.
    fn adapt_pass(&self) {
        METRICS.inc(&METRICS.adapt_passes);

        for pool in self.snapshot_pools() {
            if pool.settings().adaptive_pool_limits {
                pool.adapt_member_limit();
                debug!(
                    "Adapted pool '{}' limit to {}",
                    pool.kind(),
                    pool.settings().pool_limit
                );
            }
        }
    }

    fn snapshot_pools(&self) -> Vec<Arc<Pool<F>>> {
        self.pools.read().values().cloned().collect()
    }

    fn stop_maintenance(&self) {
        for task in self.maintenance.lock().drain(..) {
            task.abort();
        }
    }
}

impl<F: PoolFactory> Drop for PoolManager<F> {
    fn drop(&mut self) {
        self.stop_maintenance();
    }
}

/// Tick at a fixed interval, invoking one maintenance pass per tick,
/// until the manager is gone.
fn spawn_maintenance_loop<F: PoolFactory>(
    manager: Weak<PoolManager<F>>,
    period: Duration,
    pass: fn(&PoolManager<F>),
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately; consume it so the first
        // pass happens one full interval from now.
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(manager) = manager.upgrade() else { break };
            pass(&manager);
        }
    })
}
