//! Type-safe visitor identifier.
//!
//! [`VisitorId`] is a newtype wrapper around the `BIGSERIAL` primary key so
//! that visitor identities cannot be confused with other integers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a visitor record.
///
/// Assigned by the store at creation time and immutable thereafter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct VisitorId(i64);

impl VisitorId {
    /// Wraps a raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VisitorId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for VisitorId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<VisitorId> for i64 {
    fn from(id: VisitorId) -> Self {
        id.0
    }
}
