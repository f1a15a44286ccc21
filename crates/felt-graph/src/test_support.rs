//! Minimal fiber records for unit tests.

use crate::{Dependency, FiberRecord, Status};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

static CLOCK: AtomicI64 = AtomicI64::new(0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TestFiber {
    pub id: String,
    pub status: Option<Status>,
    pub dependencies: Vec<Dependency>,
    pub created_at: DateTime<Utc>,
}

impl FiberRecord for TestFiber {
    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> Option<Status> {
        self.status
    }

    fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Strictly increasing timestamps, so fibers built later in a test sort later.
fn tick() -> DateTime<Utc> {
    let offset = CLOCK.fetch_add(1, Ordering::Relaxed);
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(offset)
}

pub(crate) fn fiber(id: &str, status: Status, deps: &[&str]) -> TestFiber {
    fiber_with_labels(id, status, deps.iter().map(|d| Dependency::new(*d)).collect())
}

pub(crate) fn fiber_with_labels(id: &str, status: Status, deps: Vec<Dependency>) -> TestFiber {
    TestFiber {
        id: id.to_string(),
        status: Some(status),
        dependencies: deps,
        created_at: tick(),
    }
}

pub(crate) fn untracked(id: &str, deps: &[&str]) -> TestFiber {
    TestFiber {
        status: None,
        ..fiber(id, Status::Open, deps)
    }
}

/// Open fibers where each depends on the one before it.
pub(crate) fn chain(ids: &[&str]) -> Vec<TestFiber> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| {
            let deps: Vec<&str> = i.checked_sub(1).map(|prev| ids[prev]).into_iter().collect();
            fiber(id, Status::Open, &deps)
        })
        .collect()
}
