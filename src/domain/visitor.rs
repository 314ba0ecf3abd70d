//! The visitor record and its user-settable fields.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::VisitorId;

/// A persisted visitor row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Visitor {
    /// Store-assigned identity.
    pub id: VisitorId,
    /// Counter value. `None` when never set.
    pub counter: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

/// The subset of [`Visitor`] a client may write.
///
/// Values have already been coerced to column types by the time one of
/// these exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitorChanges {
    /// New counter value.
    pub counter: Option<i32>,
}

impl VisitorChanges {
    /// Changes that set `counter` to `value`.
    #[must_use]
    pub const fn counter(value: Option<i32>) -> Self {
        Self { counter: value }
    }
}

/// Returns a timestamp strictly after `previous`, preferring `now`.
///
/// Wall clocks can stall or step backwards; `updated_at` must still move
/// forward on every update.
#[must_use]
pub fn next_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + chrono::Duration::microseconds(1);
    if now > floor { now } else { floor }
}
