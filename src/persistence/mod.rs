//! Persistence layer: the `visitors` table.
//!
//! [`VisitorStore`] dispatches to either a PostgreSQL table (via
//! `sqlx::PgPool`) or an in-process table. Both backends expose the same
//! five operations with the same error semantics.

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryVisitorStore;
pub use postgres::PostgresVisitorStore;

use crate::config::AppConfig;
use crate::domain::{Visitor, VisitorChanges, VisitorId};
use crate::error::AppError;

/// The visitor table, backed by one of the supported stores.
#[derive(Debug)]
pub enum VisitorStore {
    /// PostgreSQL-backed table.
    Postgres(PostgresVisitorStore),
    /// In-process table.
    Memory(MemoryVisitorStore),
}

impl VisitorStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::Memory(MemoryVisitorStore::new())
    }

    /// Builds the store selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if PostgreSQL is enabled and the
    /// connection or migrations fail.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        if config.persistence_enabled {
            tracing::info!("using postgres visitor store");
            Ok(Self::Postgres(PostgresVisitorStore::connect(config).await?))
        } else {
            tracing::info!("persistence disabled, using in-memory visitor store");
            Ok(Self::in_memory())
        }
    }

    /// Returns all visitors ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the store is unavailable.
    pub async fn list(&self) -> Result<Vec<Visitor>, AppError> {
        match self {
            Self::Postgres(store) => store.list().await,
            Self::Memory(store) => Ok(store.list().await),
        }
    }

    /// Inserts a visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the store is unavailable.
    pub async fn create(&self, changes: VisitorChanges) -> Result<Visitor, AppError> {
        match self {
            Self::Postgres(store) => store.create(changes).await,
            Self::Memory(store) => store.create(changes).await,
        }
    }

    /// Fetches one visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if `id` is absent.
    pub async fn find(&self, id: VisitorId) -> Result<Visitor, AppError> {
        match self {
            Self::Postgres(store) => store.find(id).await,
            Self::Memory(store) => store.find(id).await,
        }
    }

    /// Overwrites the writable columns of a visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if `id` is absent.
    pub async fn update(
        &self,
        id: VisitorId,
        changes: VisitorChanges,
    ) -> Result<Visitor, AppError> {
        match self {
            Self::Postgres(store) => store.update(id, changes).await,
            Self::Memory(store) => store.update(id, changes).await,
        }
    }

    /// Deletes a visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if `id` is absent.
    pub async fn delete(&self, id: VisitorId) -> Result<(), AppError> {
        match self {
            Self::Postgres(store) => store.delete(id).await,
            Self::Memory(store) => store.delete(id).await,
        }
    }
}
