//! Service layer: business logic orchestration.
//!
//! [`VisitorService`] fronts the [`crate::persistence::VisitorStore`] and
//! is the only path handlers use to reach it.

pub mod visitor_service;

pub use visitor_service::VisitorService;
