//! PostgreSQL implementation of the visitor store.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{VISITOR_COLUMNS, VisitorRow, visitor_from_row};
use crate::config::AppConfig;
use crate::domain::{Visitor, VisitorChanges, VisitorId};
use crate::error::AppError;

/// PostgreSQL-backed visitor store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresVisitorStore {
    pool: PgPool,
}

impl PostgresVisitorStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from `config` and applies pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the database is unreachable or
    /// a migration fails.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        tracing::info!("database migrations applied");
        Ok(Self::new(pool))
    }

    /// Returns all visitors ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn list(&self) -> Result<Vec<Visitor>, AppError> {
        let rows = sqlx::query_as::<_, VisitorRow>(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(visitor_from_row).collect())
    }

    /// Inserts a visitor and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn create(&self, changes: VisitorChanges) -> Result<Visitor, AppError> {
        let row = sqlx::query_as::<_, VisitorRow>(&format!(
            "INSERT INTO visitors (counter) VALUES ($1) RETURNING {VISITOR_COLUMNS}"
        ))
        .bind(changes.counter)
        .fetch_one(&self.pool)
        .await?;

        Ok(visitor_from_row(row))
    }

    /// Fetches a single visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if no row has `id`, or
    /// [`AppError::Persistence`] on database failure.
    pub async fn find(&self, id: VisitorId) -> Result<Visitor, AppError> {
        sqlx::query_as::<_, VisitorRow>(&format!(
            "SELECT {VISITOR_COLUMNS} FROM visitors WHERE id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .map(visitor_from_row)
        .ok_or(AppError::VisitorNotFound(id))
    }

    /// Overwrites the writable columns of a visitor.
    ///
    /// `updated_at` always advances by at least one microsecond, even if
    /// the server clock has not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if no row has `id`, or
    /// [`AppError::Persistence`] on database failure.
    pub async fn update(
        &self,
        id: VisitorId,
        changes: VisitorChanges,
    ) -> Result<Visitor, AppError> {
        sqlx::query_as::<_, VisitorRow>(&format!(
            "UPDATE visitors \
             SET counter = $2, \
                 updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond') \
             WHERE id = $1 RETURNING {VISITOR_COLUMNS}"
        ))
        .bind(id.get())
        .bind(changes.counter)
        .fetch_optional(&self.pool)
        .await?
        .map(visitor_from_row)
        .ok_or(AppError::VisitorNotFound(id))
    }

    /// Deletes a visitor permanently.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if no row has `id`, or
    /// [`AppError::Persistence`] on database failure.
    pub async fn delete(&self, id: VisitorId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM visitors WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::VisitorNotFound(id));
        }
        Ok(())
    }
}
