//! Clock port used to stamp snapshots.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Snapshots carry a capture time; the builder itself stays pure and the
/// pipeline asks this port for the stamp.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
