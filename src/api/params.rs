//! Request decoding: the `visitor` parameter envelope, counter coercion,
//! path ids, and response format negotiation.
//!
//! All input is validated here, before any store call.

use axum::Form;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::request::Parts;
use serde_json::Value;

use crate::domain::{VisitorChanges, VisitorId};
use crate::error::AppError;

/// Name of the parameter envelope.
const ENVELOPE: &str = "visitor";

/// Name of the only permitted field.
const COUNTER: &str = "counter";

/// Validated visitor fields from a JSON or form-encoded body.
///
/// JSON bodies look like `{"visitor": {"counter": 5}}`; form bodies like
/// `visitor[counter]=5`. Unpermitted keys are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitorParams(pub VisitorChanges);

impl<S> FromRequest<S> for VisitorParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        let changes = if is_form {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|e| AppError::MalformedBody(e.body_text()))?;
            changes_from_form(&pairs)?
        } else {
            let body = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::MalformedBody(e.body_text()))?;
            let value: Value = serde_json::from_slice(&body)
                .map_err(|e| AppError::MalformedBody(e.to_string()))?;
            changes_from_json(&value)?
        };
        Ok(Self(changes))
    }
}

/// Extracts changes from a decoded JSON body.
///
/// # Errors
///
/// Returns [`AppError::ParameterMissing`] if the `visitor` envelope is
/// absent or empty, or [`AppError::Validation`] if `counter` cannot be
/// coerced.
pub fn changes_from_json(body: &Value) -> Result<VisitorChanges, AppError> {
    let fields = body
        .get(ENVELOPE)
        .and_then(Value::as_object)
        .filter(|fields| !fields.is_empty())
        .ok_or(AppError::ParameterMissing(ENVELOPE))?;

    let counter = match fields.get(COUNTER) {
        Some(value) => coerce_counter(value)?,
        None => None,
    };
    Ok(VisitorChanges::counter(counter))
}

/// Extracts changes from form pairs such as `visitor[counter]=5`.
///
/// # Errors
///
/// Returns [`AppError::ParameterMissing`] if no `visitor[...]` key is
/// present, or [`AppError::Validation`] if `counter` cannot be coerced.
pub fn changes_from_form(pairs: &[(String, String)]) -> Result<VisitorChanges, AppError> {
    let prefix = format!("{ENVELOPE}[");
    let mut seen_envelope = false;
    let mut counter = None;
    for (key, value) in pairs {
        let Some(field) = key
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_suffix(']'))
        else {
            continue;
        };
        seen_envelope = true;
        if field == COUNTER {
            counter = coerce_counter_str(value)?;
        }
    }
    if !seen_envelope {
        return Err(AppError::ParameterMissing(ENVELOPE));
    }
    Ok(VisitorChanges::counter(counter))
}

/// Coerces a JSON value to the `counter` column type.
///
/// `null` and blank strings mean "unset". Integers must fit in `i32`;
/// floats and numeric strings are accepted only when integral.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for any other value.
pub fn coerce_counter(value: &Value) -> Result<Option<i32>, AppError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).map(Some).map_err(|_| out_of_range()),
            None if n.is_u64() => Err(out_of_range()),
            None => n.as_f64().map_or(Err(not_a_number()), coerce_float),
        },
        Value::String(s) => coerce_counter_str(s),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Err(not_a_number()),
    }
}

/// Coerces a form or JSON string to the `counter` column type.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the string is not integral.
pub fn coerce_counter_str(raw: &str) -> Result<Option<i32>, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<i32>() {
        Ok(n) => Ok(Some(n)),
        Err(e)
            if matches!(
                e.kind(),
                std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow
            ) =>
        {
            Err(out_of_range())
        }
        Err(_) => trimmed
            .parse::<f64>()
            .map_or(Err(not_a_number()), coerce_float),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_float(f: f64) -> Result<Option<i32>, AppError> {
    if !f.is_finite() {
        return Err(not_a_number());
    }
    if f.fract() != 0.0 {
        return Err(AppError::validation(COUNTER, "must be an integer"));
    }
    if f < f64::from(i32::MIN) || f > f64::from(i32::MAX) {
        return Err(out_of_range());
    }
    Ok(Some(f as i32))
}

fn not_a_number() -> AppError {
    AppError::validation(COUNTER, "is not a number")
}

fn out_of_range() -> AppError {
    AppError::validation(COUNTER, "is out of range")
}

/// Parses a `{id}` path segment.
///
/// A segment that is not an integer cannot name any record, so it is a
/// not-found rather than a validation failure.
///
/// # Errors
///
/// Returns [`AppError::RouteNotFound`] if `raw` is not an integer.
pub fn parse_visitor_id(raw: &str) -> Result<VisitorId, AppError> {
    raw.parse()
        .map_err(|_| AppError::RouteNotFound(format!("/visitors/{raw}")))
}

/// How the client wants write responses rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Redirect after writes (form-style clients).
    Redirect,
    /// Return the record or an empty body (API clients).
    Json,
}

impl ResponseFormat {
    /// Picks the format from an `Accept` header value.
    #[must_use]
    pub fn from_accept(accept: Option<&str>) -> Self {
        match accept {
            Some(accept) if accept.contains("application/json") => Self::Json,
            _ => Self::Redirect,
        }
    }
}

impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_accept(
            parts.headers.get(ACCEPT).and_then(|v| v.to_str().ok()),
        ))
    }
}
