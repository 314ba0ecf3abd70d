//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    PublishResponse, VisitorDto, VisitorFieldsBody, VisitorFormDto, VisitorFormFields,
    VisitorParamsBody,
};
use super::handlers::{broadcast, system, visitor};
use crate::error::{ErrorBody, ErrorResponse};

/// Aggregated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "visitor-counter", description = "Visitor CRUD and counter broadcasts"),
    paths(
        visitor::index,
        visitor::new_form,
        visitor::create,
        visitor::show,
        visitor::edit_form,
        visitor::update,
        visitor::destroy,
        broadcast::publish,
        system::health_handler,
    ),
    components(schemas(
        VisitorDto,
        VisitorParamsBody,
        VisitorFieldsBody,
        VisitorFormDto,
        VisitorFormFields,
        PublishResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Visitors", description = "Visitor CRUD"),
        (name = "Broadcasts", description = "Pub/sub publishing"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_visitor_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/visitors",
            "/visitors/new",
            "/visitors/{id}",
            "/visitors/{id}/edit",
            "/broadcasts/{stream}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
