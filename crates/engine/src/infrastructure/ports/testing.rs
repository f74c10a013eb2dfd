//! Testability ports for injecting time and identifiers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of new field ids.
#[cfg_attr(test, mockall::automock)]
pub trait IdPort: Send + Sync {
    fn gen_uuid(&self) -> Uuid;
}
