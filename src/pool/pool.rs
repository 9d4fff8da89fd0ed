use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::PoolSettings;
use crate::error::Result;
use crate::metrics::METRICS;
use crate::pool::member::{PoolMember, PoolObject};
use crate::types::Kind;

/// Produces and releases the underlying instances of a pool.
///
/// Instances are opaque to the pool: creation and destruction go through
/// this trait, placement goes through [`PoolObject`]. Failures propagate
/// to whoever triggered the operation; nothing is retried.
pub trait PoolFactory: Send + Sync + 'static {
    /// The instance type this factory produces.
    type Object: PoolObject;

    /// Produce one new instance of the given kind.
    fn create(&self, kind: &Kind) -> Result<Self::Object>;

    /// Release an instance for good (culled, wiped, or pool destroyed).
    fn dispose(&self, kind: &Kind, object: Self::Object) -> Result<()>;
}

/// A pool of members of one kind that can be reused.
///
/// Membership is ordered by creation: submerged-member lookup scans from
/// the front, culling scans from the back. The member limit is a soft
/// target; the pool grows unboundedly under sustained demand and is
/// trimmed back by [`cull_excess_members`](Self::cull_excess_members).
pub struct Pool<F: PoolFactory> {
    kind: Kind,
    factory: Arc<F>,
    settings: Mutex<PoolSettings>,
    members: Mutex<Vec<Arc<PoolMember<F>>>>,

    /// Members currently taken.
    current_emerged: AtomicUsize,

    /// High-water mark of `current_emerged`. Monotonic for the pool's
    /// lifetime; adaptation samples it but never resets it.
    peak_emerged: AtomicUsize,

    /// Rolling window of peak-usage samples, one per adaptation pass.
    usage_history: Mutex<VecDeque<usize>>,
}

impl<F: PoolFactory> Pool<F> {
    /// Create a new pool and prefill it.
    ///
    /// Fails only if the factory fails while prefilling.
    pub fn new(kind: Kind, factory: Arc<F>, settings: PoolSettings) -> Result<Arc<Self>> {
        let interval_memory = settings.interval_memory.max(1);
        let mut usage_history = VecDeque::with_capacity(interval_memory);
        usage_history.resize(interval_memory, settings.pool_limit);

        let pool = Arc::new(Self {
            kind,
            factory,
            settings: Mutex::new(settings),
            members: Mutex::new(Vec::new()),
            current_emerged: AtomicUsize::new(0),
            peak_emerged: AtomicUsize::new(0),
            usage_history: Mutex::new(usage_history),
        });

        pool.add(settings.prefill_amount)?;
        Ok(pool)
    }

    /// The kind of object this pool holds.
    #[inline]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// Snapshot of the pool's settings.
    pub fn settings(&self) -> PoolSettings {
        *self.settings.lock()
    }

    /// Number of members currently registered, submerged or not.
    pub fn member_count(&self) -> usize {
        self.members.lock().len()
    }

    /// Number of members currently taken.
    #[inline]
    pub fn current_emerged(&self) -> usize {
        self.current_emerged.load(Ordering::Relaxed)
    }

    /// High-water mark of concurrently taken members.
    #[inline]
    pub fn peak_emerged(&self) -> usize {
        self.peak_emerged.load(Ordering::Relaxed)
    }

    /// Mass-add members to the pool, returning the last one created.
    ///
    /// Factory failure propagates; members created before the failure
    /// stay in the pool.
    pub fn add(self: &Arc<Self>, amount: usize) -> Result<Option<Arc<PoolMember<F>>>> {
        let mut latest = None;
        for _ in 0..amount {
            latest = Some(self.spawn_member()?);
        }
        Ok(latest)
    }

    /// Get a submerged member, growing the pool by one if none is free.
    ///
    /// Scans members in creation order and returns the earliest
    /// submerged one, still submerged; the caller emerges it with
    /// [`PoolMember::take`].
    pub fn submerged_member(self: &Arc<Self>) -> Result<Arc<PoolMember<F>>> {
        {
            let members = self.members.lock();
            for member in members.iter() {
                if member.is_submerged() {
                    return Ok(member.clone());
                }
            }
        }

        self.spawn_member()
    }

    /// Whether the pool currently holds more members than its soft limit.
    pub fn is_over_member_limit(&self) -> bool {
        self.members.lock().len() > self.settings.lock().pool_limit
    }

    /// Remove and dispose submerged members until the pool is back at
    /// or under its limit.
    ///
    /// Scans from the newest member backward and never touches emerged
    /// members; if emerged members occupy the tail exclusively, the pool
    /// may stay over its limit. Returns the number of members culled.
    pub fn cull_excess_members(&self) -> Result<usize> {
        let mut removed = Vec::new();
        {
            let mut members = self.members.lock();
            let limit = self.settings.lock().pool_limit;

            let mut index = members.len();
            while index > 0 {
                index -= 1;
                if members[index].is_submerged() {
                    removed.push(members.remove(index));
                }
                if members.len() <= limit {
                    break;
                }
            }
        }

        let culled = removed.len();
        METRICS.add(&METRICS.members_culled, culled as u64);

        for member in removed {
            if let Some(object) = member.detach() {
                self.factory.dispose(&self.kind, object)?;
            }
        }

        Ok(culled)
    }

    /// Remove all members from the pool, newest first.
    ///
    /// With `destroy` set, each instance is routed through the factory's
    /// disposer; otherwise only the bookkeeping is detached (used when
    /// the owner is torn down without wanting instance destruction).
    /// Pending delayed releases are cancelled either way.
    pub fn wipe(&self, destroy: bool) -> Result<usize> {
        let mut drained: Vec<_> = self.members.lock().drain(..).collect();

        let wiped = drained.len();
        METRICS.add(&METRICS.members_wiped, wiped as u64);

        while let Some(member) = drained.pop() {
            let object = member.detach();
            if destroy {
                if let Some(object) = object {
                    self.factory.dispose(&self.kind, object)?;
                }
            }
        }

        Ok(wiped)
    }

    /// Recompute the soft limit from the rolling usage window.
    ///
    /// Shifts the oldest sample out of the history, appends the current
    /// emergence peak, and sets the limit to the ceiling of the window
    /// average, clamped to the configured minimum. The peak itself is
    /// not reset: it keeps accumulating across passes.
    pub fn adapt_member_limit(&self) {
        let peak = self.peak_emerged.load(Ordering::Relaxed);

        let average = {
            let mut history = self.usage_history.lock();
            history.pop_front();
            history.push_back(peak);
            history.iter().sum::<usize>() as f64 / history.len() as f64
        };

        let mut settings = self.settings.lock();
        settings.pool_limit = (average.ceil() as usize).max(settings.minimum_limit);
    }

    /// Create one member and register it.
    fn spawn_member(self: &Arc<Self>) -> Result<Arc<PoolMember<F>>> {
        let object = self.factory.create(&self.kind)?;
        let member = Arc::new(PoolMember::new(object, Arc::downgrade(self)));
        self.members.lock().push(member.clone());
        METRICS.inc(&METRICS.members_created);
        Ok(member)
    }

    pub(crate) fn note_taken(&self) {
        let emerged = self.current_emerged.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_emerged.fetch_max(emerged, Ordering::AcqRel);
    }

    pub(crate) fn note_released(&self) {
        self.current_emerged.fetch_sub(1, Ordering::AcqRel);
    }
}
