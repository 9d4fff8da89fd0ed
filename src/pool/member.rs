use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use smallvec::SmallVec;
use tokio::task::JoinHandle;

use crate::metrics::METRICS;
use crate::pool::{Pool, PoolFactory};
use crate::types::Placement;

/// Receives lifecycle notifications when its member is taken or released.
///
/// Observers are registered explicitly on a member and notified in
/// registration order. The pool layer does not catch failures raised
/// here; a panicking observer unwinds into whoever triggered the
/// transition.
pub trait Poolable: Send + Sync {
    /// Called once the member has been taken from its mother pool
    fn on_take(&self);

    /// Called once the member has been released back into its mother pool
    fn on_release(&self);
}

/// A pooled instance, as produced by a [`PoolFactory`](crate::pool::PoolFactory).
pub trait PoolObject: Send + Sync + 'static {
    /// Move the instance into place before it re-enters service.
    ///
    /// The placement is whatever the taker passed in; the pool layer
    /// attaches no meaning to it.
    fn reposition(&mut self, placement: Placement);
}

/// A handle wrapping one pooled instance.
///
/// Members start submerged (available in the pool). [`take`](Self::take)
/// emerges a member for active use and [`release`](Self::release) puts
/// it back; both notify attached [`Poolable`] observers. A member is
/// only destroyed when its owning pool culls, wipes, or is destroyed.
pub struct PoolMember<F: PoolFactory> {
    /// Wrapped instance; taken out when the member is detached for disposal.
    object: Mutex<Option<F::Object>>,
    submerged: AtomicBool,
    mother: Weak<Pool<F>>,
    poolables: Mutex<SmallVec<[Arc<dyn Poolable>; 4]>>,
    pending_release: Mutex<Option<JoinHandle<()>>>,
}

impl<F: PoolFactory> PoolMember<F> {
    pub(crate) fn new(object: F::Object, mother: Weak<Pool<F>>) -> Self {
        Self {
            object: Mutex::new(Some(object)),
            submerged: AtomicBool::new(true),
            mother,
            poolables: Mutex::new(SmallVec::new()),
            pending_release: Mutex::new(None),
        }
    }

    /// Whether the member is currently available for reuse.
    #[inline]
    pub fn is_submerged(&self) -> bool {
        self.submerged.load(Ordering::Acquire)
    }

    /// The pool this member belongs to, if it is still alive.
    pub fn mother_pool(&self) -> Option<Arc<Pool<F>>> {
        self.mother.upgrade()
    }

    /// Register an observer. Observers are notified in registration order.
    pub fn attach_poolable(&self, poolable: Arc<dyn Poolable>) {
        self.poolables.lock().push(poolable);
    }

    /// Run a closure against the wrapped instance.
    ///
    /// Returns `None` if the member has already been detached from its
    /// pool for disposal.
    pub fn with_object<R>(&self, f: impl FnOnce(&mut F::Object) -> R) -> Option<R> {
        self.object.lock().as_mut().map(f)
    }

    /// Emerge the member from the pool for active use.
    ///
    /// Repositions the instance, marks the member emerged, bumps the
    /// mother pool's usage counters, and notifies observers. No-op if
    /// the member is already emerged.
    pub fn take(&self, placement: Placement) {
        if !self.submerged.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(object) = self.object.lock().as_mut() {
            object.reposition(placement);
        }
        if let Some(pool) = self.mother.upgrade() {
            pool.note_taken();
        }
        METRICS.inc(&METRICS.takes);

        for poolable in self.snapshot_poolables() {
            poolable.on_take();
        }
    }

    /// Release the member back into the pool.
    ///
    /// Marks the member submerged, decrements the mother pool's emerged
    /// count, and notifies observers. No-op if the member is already
    /// submerged.
    pub fn release(&self) {
        if self.submerged.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(pool) = self.mother.upgrade() {
            pool.note_released();
        }
        METRICS.inc(&METRICS.releases);

        for poolable in self.snapshot_poolables() {
            poolable.on_release();
        }
    }

    /// Release the member back into the pool after a delay.
    ///
    /// Scheduling again before the delay elapses replaces the earlier
    /// timer, so at most one delayed release is pending per member. A
    /// pending timer is cancelled silently when the member is torn down.
    ///
    /// Must be called within a Tokio runtime.
    pub fn release_after(self: &Arc<Self>, delay: Duration) {
        let member = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(member) = member.upgrade() {
                member.release();
            }
        });

        if let Some(previous) = self.pending_release.lock().replace(task) {
            if !previous.is_finished() {
                previous.abort();
                METRICS.inc(&METRICS.delayed_releases_cancelled);
            }
        }
        METRICS.inc(&METRICS.delayed_releases_scheduled);
    }

    /// Whether a delayed release is currently scheduled.
    pub fn has_pending_release(&self) -> bool {
        self.pending_release
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Remove the member from service: cancel any pending delayed
    /// release and surrender the wrapped instance for disposal.
    pub(crate) fn detach(&self) -> Option<F::Object> {
        self.cancel_pending_release();
        self.object.lock().take()
    }

    fn cancel_pending_release(&self) {
        if let Some(task) = self.pending_release.lock().take() {
            if !task.is_finished() {
                task.abort();
                METRICS.inc(&METRICS.delayed_releases_cancelled);
            }
        }
    }

    fn snapshot_poolables(&self) -> SmallVec<[Arc<dyn Poolable>; 4]> {
        self.poolables.lock().clone()
    }
}

impl<F: PoolFactory> Drop for PoolMember<F> {
    fn drop(&mut self) {
        self.cancel_pending_release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolSettings;
    use crate::pool::test_support::{RecordingPoolable, TestFactory};
    use crate::pool::Pool;
    use crate::types::Kind;

    fn create_pool(prefill: usize) -> Arc<Pool<TestFactory>> {
        Pool::new(
            Kind::from("member_test"),
            TestFactory::new(),
            PoolSettings {
                pool_limit: 4,
                prefill_amount: prefill,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_take_release_round_trip() {
        let pool = create_pool(1);
        let member = pool.submerged_member().unwrap();
        let emerged_before = pool.current_emerged();

        member.take(Placement::at([1.0, 0.0, 0.0]));
        assert!(!member.is_submerged());
        assert_eq!(pool.current_emerged(), emerged_before + 1);

        member.release();
        assert!(member.is_submerged());
        assert_eq!(pool.current_emerged(), emerged_before);
    }

    #[test]
    fn test_take_repositions_object() {
        let pool = create_pool(1);
        let member = pool.submerged_member().unwrap();

        let placement = Placement::at([3.0, 2.0, 1.0]);
        member.take(placement);

        let seen = member.with_object(|object| object.placement).unwrap();
        assert_eq!(seen, placement);
    }

    #[test]
    fn test_take_is_idempotent() {
        let pool = create_pool(1);
        let member = pool.submerged_member().unwrap();

        member.take(Placement::default());
        member.take(Placement::default());
        assert_eq!(pool.current_emerged(), 1);

        member.release();
        member.release();
        assert_eq!(pool.current_emerged(), 0);
    }

    #[test]
    fn test_poolables_notified_in_registration_order() {
        let pool = create_pool(1);
        let member = pool.submerged_member().unwrap();

        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        member.attach_poolable(RecordingPoolable::new("first", events.clone()));
        member.attach_poolable(RecordingPoolable::new("second", events.clone()));

        member.take(Placement::default());
        member.release();

        assert_eq!(
            *events.lock(),
            vec!["first:take", "second:take", "first:release", "second:release"]
        );
    }

    #[test]
    fn test_mother_pool_backref() {
        let pool = create_pool(1);
        let member = pool.submerged_member().unwrap();
        assert!(member.mother_pool().is_some());

        drop(pool);
        assert!(member.mother_pool().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_release_fires() {
        let pool = create_pool(1);
        let member = pool.submerged_member().unwrap();
        member.take(Placement::default());

        member.release_after(Duration::from_secs(5));
        assert!(member.has_pending_release());

        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        assert!(member.is_submerged());
        assert_eq!(pool.current_emerged(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_release_cancelled_by_teardown() {
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let member = Arc::new(PoolMember::<TestFactory>::new(
            crate::pool::test_support::TestObject {
                id: 0,
                placement: Placement::default(),
            },
            Weak::new(),
        ));
        member.attach_poolable(RecordingPoolable::new("watcher", events.clone()));
        member.take(Placement::default());

        member.release_after(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(member);

        tokio::time::sleep(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;

        // No release event fired after the member was torn down
        assert_eq!(*events.lock(), vec!["watcher:take"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_release_cancel_and_replace() {
        let pool = create_pool(1);
        let member = pool.submerged_member().unwrap();

        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        member.attach_poolable(RecordingPoolable::new("watcher", events.clone()));
        member.take(Placement::default());

        member.release_after(Duration::from_secs(2));
        member.release_after(Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;

        // The 2s timer was replaced; nothing has fired yet
        assert!(!member.is_submerged());

        tokio::time::sleep(Duration::from_secs(25)).await;
        tokio::task::yield_now().await;

        assert!(member.is_submerged());
        let releases = events
            .lock()
            .iter()
            .filter(|e| e.ends_with(":release"))
            .count();
        assert_eq!(releases, 1);
    }
}
