//! Shared factory and observer doubles for pool tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::pool::{PoolFactory, PoolObject, Poolable};
use crate::types::{Kind, Placement};

pub(crate) struct TestObject {
    pub id: usize,
    pub placement: Placement,
}

impl PoolObject for TestObject {
    fn reposition(&mut self, placement: Placement) {
        self.placement = placement;
    }
}

pub(crate) struct TestFactory {
    pub created: AtomicUsize,
    pub disposed: AtomicUsize,
    pub fail_creation: AtomicBool,
    pub fail_disposal: AtomicBool,
}

impl TestFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            created: AtomicUsize::new(0),
            disposed: AtomicUsize::new(0),
            fail_creation: AtomicBool::new(false),
            fail_disposal: AtomicBool::new(false),
        })
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn disposed(&self) -> usize {
        self.disposed.load(Ordering::Relaxed)
    }
}

impl PoolFactory for TestFactory {
    type Object = TestObject;

    fn create(&self, _kind: &Kind) -> Result<TestObject> {
        if self.fail_creation.load(Ordering::Relaxed) {
            return Err(Error::factory("factory rigged to fail"));
        }
        let id = self.created.fetch_add(1, Ordering::Relaxed);
        Ok(TestObject {
            id,
            placement: Placement::default(),
        })
    }

    fn dispose(&self, _kind: &Kind, _object: TestObject) -> Result<()> {
        if self.fail_disposal.load(Ordering::Relaxed) {
            return Err(Error::disposer("disposer rigged to fail"));
        }
        self.disposed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

pub(crate) struct RecordingPoolable {
    label: &'static str,
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingPoolable {
    pub fn new(label: &'static str, events: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self { label, events })
    }
}

impl Poolable for RecordingPoolable {
    fn on_take(&self) {
        self.events.lock().push(format!("{}:take", self.label));
    }

    fn on_release(&self) {
        self.events.lock().push(format!("{}:release", self.label));
    }
}
