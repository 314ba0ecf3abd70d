//! Data Transfer Objects for REST request/response serialization.

pub mod broadcast_dto;
pub mod visitor_dto;

pub use broadcast_dto::*;
pub use visitor_dto::*;
