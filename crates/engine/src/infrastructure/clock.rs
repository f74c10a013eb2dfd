//! Clock and id generator implementations.

use crate::infrastructure::ports::{ClockPort, IdPort};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random v4 UUIDs.
pub struct SystemIds;

impl SystemIds {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdPort for SystemIds {
    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Counting id generator for testing: 1, 2, 3, ...
#[cfg(test)]
#[derive(Default)]
pub struct SequentialIds(std::sync::atomic::AtomicU64);

#[cfg(test)]
impl IdPort for SequentialIds {
    fn gen_uuid(&self) -> Uuid {
        let next = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        Uuid::from_u128(u128::from(next))
    }
}
