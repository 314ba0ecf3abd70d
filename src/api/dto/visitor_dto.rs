//! Visitor DTOs for responses, request bodies, and form descriptors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Visitor, VisitorId};

/// Path of the visitor collection.
pub const VISITORS_PATH: &str = "/visitors";

/// Path of a single visitor.
#[must_use]
pub fn visitor_path(id: VisitorId) -> String {
    format!("{VISITORS_PATH}/{id}")
}

/// A visitor as rendered by every read and write endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisitorDto {
    /// Visitor identifier.
    pub id: VisitorId,
    /// Counter value, `null` when unset.
    pub counter: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Canonical path of this record.
    pub url: String,
}

impl From<Visitor> for VisitorDto {
    fn from(visitor: Visitor) -> Self {
        Self {
            url: visitor_path(visitor.id),
            id: visitor.id,
            counter: visitor.counter,
            created_at: visitor.created_at,
            updated_at: visitor.updated_at,
        }
    }
}

/// Request body for `POST /visitors` and `PATCH /visitors/{id}`.
///
/// Only documents the accepted shape; decoding and coercion happen in
/// [`crate::api::params::VisitorParams`].
#[derive(Debug, Deserialize, ToSchema)]
pub struct VisitorParamsBody {
    /// Permitted visitor fields.
    pub visitor: VisitorFieldsBody,
}

/// Fields accepted inside the `visitor` envelope.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VisitorFieldsBody {
    /// Integer, numeric string, empty string or `null`.
    pub counter: Option<serde_json::Value>,
}

/// Descriptor a client needs to render a create or edit form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisitorFormDto {
    /// Path the form submits to.
    pub action: String,
    /// HTTP method the form submits with.
    pub method: String,
    /// Current field values.
    pub visitor: VisitorFormFields,
}

/// Field values pre-filled in a form.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisitorFormFields {
    /// Counter value, `null` when empty.
    pub counter: Option<i32>,
}

impl VisitorFormDto {
    /// Blank form for a new visitor.
    #[must_use]
    pub fn for_new() -> Self {
        Self {
            action: VISITORS_PATH.to_string(),
            method: "POST".to_string(),
            visitor: VisitorFormFields { counter: None },
        }
    }

    /// Form pre-filled with an existing visitor.
    #[must_use]
    pub fn for_edit(visitor: &Visitor) -> Self {
        Self {
            action: visitor_path(visitor.id),
            method: "PATCH".to_string(),
            visitor: VisitorFormFields {
                counter: visitor.counter,
            },
        }
    }
}
