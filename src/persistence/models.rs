//! Database row models.

use chrono::{DateTime, Utc};

use crate::domain::{Visitor, VisitorId};

/// Column list selected for every visitor query, in [`VisitorRow`] order.
pub const VISITOR_COLUMNS: &str = "id, counter, created_at, updated_at";

/// A raw row from the `visitors` table.
pub type VisitorRow = (i64, Option<i32>, DateTime<Utc>, DateTime<Utc>);

/// Converts a raw row into the domain type.
#[must_use]
pub fn visitor_from_row((id, counter, created_at, updated_at): VisitorRow) -> Visitor {
    Visitor {
        id: VisitorId::new(id),
        counter,
        created_at,
        updated_at,
    }
}
