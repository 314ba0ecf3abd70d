//! Visitor CRUD handlers: index, new, create, show, edit, update, destroy.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    VISITORS_PATH, VisitorDto, VisitorFormDto, VisitorParamsBody, visitor_path,
};
use crate::api::params::{ResponseFormat, VisitorParams, parse_visitor_id};
use crate::app_state::AppState;
use crate::error::{AppError, ErrorResponse};

/// Header carrying the flash notice on redirects.
pub const FLASH_NOTICE_HEADER: &str = "x-flash-notice";

fn redirect_with_notice(to: &str, notice: &'static str) -> Response {
    ([(FLASH_NOTICE_HEADER, notice)], Redirect::to(to)).into_response()
}

/// `GET /visitors` — List all visitors.
///
/// # Errors
///
/// Returns [`AppError::Persistence`] if the store is unavailable.
#[utoipa::path(
    get,
    path = "/visitors",
    tag = "Visitors",
    summary = "List visitors",
    description = "Returns every visitor ordered by id.",
    responses(
        (status = 200, description = "All visitors", body = Vec<VisitorDto>),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<VisitorDto>>, AppError> {
    let visitors = state.visitor_service.list_visitors().await?;
    Ok(Json(visitors.into_iter().map(VisitorDto::from).collect()))
}

/// `GET /visitors/new` — Blank form descriptor.
#[utoipa::path(
    get,
    path = "/visitors/new",
    tag = "Visitors",
    summary = "New visitor form",
    responses(
        (status = 200, description = "Form descriptor", body = VisitorFormDto),
    )
)]
pub async fn new_form() -> Json<VisitorFormDto> {
    Json(VisitorFormDto::for_new())
}

/// `POST /visitors` — Create a visitor.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if `counter` cannot be coerced, or
/// [`AppError::ParameterMissing`] without a `visitor` envelope.
#[utoipa::path(
    post,
    path = "/visitors",
    tag = "Visitors",
    summary = "Create a visitor",
    description = "Redirects to the new record, or returns it with 201 when the client accepts JSON.",
    request_body = VisitorParamsBody,
    responses(
        (status = 201, description = "Visitor created", body = VisitorDto),
        (status = 303, description = "Redirect to the new visitor"),
        (status = 400, description = "Missing visitor envelope", body = ErrorResponse),
        (status = 422, description = "Counter is not an integer", body = ErrorResponse),
    )
)]
pub async fn create(
    State(state): State<AppState>,
    format: ResponseFormat,
    VisitorParams(changes): VisitorParams,
) -> Result<Response, AppError> {
    let visitor = state.visitor_service.create_visitor(changes).await?;
    let location = visitor_path(visitor.id);

    Ok(match format {
        ResponseFormat::Json => (
            StatusCode::CREATED,
            [(LOCATION, location)],
            Json(VisitorDto::from(visitor)),
        )
            .into_response(),
        ResponseFormat::Redirect => {
            redirect_with_notice(&location, "Visitor was successfully created.")
        }
    })
}

/// `GET /visitors/{id}` — Show a visitor.
///
/// # Errors
///
/// Returns [`AppError::VisitorNotFound`] if the visitor does not exist.
#[utoipa::path(
    get,
    path = "/visitors/{id}",
    tag = "Visitors",
    summary = "Show a visitor",
    params(
        ("id" = i64, Path, description = "Visitor id"),
    ),
    responses(
        (status = 200, description = "Visitor", body = VisitorDto),
        (status = 404, description = "Visitor not found", body = ErrorResponse),
    )
)]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VisitorDto>, AppError> {
    let id = parse_visitor_id(&id)?;
    let visitor = state.visitor_service.get_visitor(id).await?;
    Ok(Json(VisitorDto::from(visitor)))
}

/// `GET /visitors/{id}/edit` — Form descriptor pre-filled with a visitor.
///
/// # Errors
///
/// Returns [`AppError::VisitorNotFound`] if the visitor does not exist.
#[utoipa::path(
    get,
    path = "/visitors/{id}/edit",
    tag = "Visitors",
    summary = "Edit visitor form",
    params(
        ("id" = i64, Path, description = "Visitor id"),
    ),
    responses(
        (status = 200, description = "Form descriptor", body = VisitorFormDto),
        (status = 404, description = "Visitor not found", body = ErrorResponse),
    )
)]
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VisitorFormDto>, AppError> {
    let id = parse_visitor_id(&id)?;
    let visitor = state.visitor_service.get_visitor(id).await?;
    Ok(Json(VisitorFormDto::for_edit(&visitor)))
}

/// `PATCH|PUT /visitors/{id}` — Overwrite a visitor's counter.
///
/// # Errors
///
/// Returns [`AppError::VisitorNotFound`] if the visitor does not exist,
/// or [`AppError::Validation`] if `counter` cannot be coerced. The record
/// is looked up first, so a missing record is reported as not found even
/// when the body is also invalid.
#[utoipa::path(
    patch,
    path = "/visitors/{id}",
    tag = "Visitors",
    summary = "Update a visitor",
    description = "Also routed for PUT. Redirects to the record, or returns it when the client accepts JSON.",
    params(
        ("id" = i64, Path, description = "Visitor id"),
    ),
    request_body = VisitorParamsBody,
    responses(
        (status = 200, description = "Visitor updated", body = VisitorDto),
        (status = 303, description = "Redirect to the visitor"),
        (status = 404, description = "Visitor not found", body = ErrorResponse),
        (status = 422, description = "Counter is not an integer", body = ErrorResponse),
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    format: ResponseFormat,
    params: Result<VisitorParams, AppError>,
) -> Result<Response, AppError> {
    let id = parse_visitor_id(&id)?;
    state.visitor_service.get_visitor(id).await?;
    let VisitorParams(changes) = params?;
    let visitor = state.visitor_service.update_visitor(id, changes).await?;

    Ok(match format {
        ResponseFormat::Json => Json(VisitorDto::from(visitor)).into_response(),
        ResponseFormat::Redirect => {
            redirect_with_notice(&visitor_path(id), "Visitor was successfully updated.")
        }
    })
}

/// `DELETE /visitors/{id}` — Destroy a visitor.
///
/// # Errors
///
/// Returns [`AppError::VisitorNotFound`] if the visitor does not exist.
#[utoipa::path(
    delete,
    path = "/visitors/{id}",
    tag = "Visitors",
    summary = "Destroy a visitor",
    params(
        ("id" = i64, Path, description = "Visitor id"),
    ),
    responses(
        (status = 204, description = "Visitor destroyed"),
        (status = 303, description = "Redirect to the visitor list"),
        (status = 404, description = "Visitor not found", body = ErrorResponse),
    )
)]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    format: ResponseFormat,
) -> Result<Response, AppError> {
    let id = parse_visitor_id(&id)?;
    state.visitor_service.delete_visitor(id).await?;

    Ok(match format {
        ResponseFormat::Json => StatusCode::NO_CONTENT.into_response(),
        ResponseFormat::Redirect => {
            redirect_with_notice(VISITORS_PATH, "Visitor was successfully destroyed.")
        }
    })
}

/// Visitor resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/visitors", get(index).post(create))
        .route("/visitors/new", get(new_form))
        .route(
            "/visitors/{id}",
            get(show).patch(update).put(update).delete(destroy),
        )
        .route("/visitors/{id}/edit", get(edit_form))
}
