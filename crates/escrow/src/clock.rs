use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Time source for embedders. The engine itself takes explicit `now`
/// parameters; a clock only exists at the edge that produces them.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Wall-clock seconds since the unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Hand-cranked clock for tests.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn at(now: u64) -> Self {
        let clock = Self::default();
        clock.set(now);
        clock
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::Release);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}
