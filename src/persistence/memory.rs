//! In-process visitor store.
//!
//! Used when persistence is disabled and throughout the test-suite. Rows
//! live in a `BTreeMap` keyed by id, so listing is naturally id-ordered.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::visitor::next_timestamp;
use crate::domain::{Visitor, VisitorChanges, VisitorId};
use crate::error::AppError;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<VisitorId, Visitor>,
    last_id: i64,
}

/// Visitor table held in memory behind a single [`RwLock`].
///
/// Reads run concurrently; every mutation takes the write lock, so each
/// operation is atomic with respect to the others.
#[derive(Debug, Default)]
pub struct MemoryVisitorStore {
    table: RwLock<Table>,
}

impl MemoryVisitorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all visitors ordered by id.
    pub async fn list(&self) -> Vec<Visitor> {
        self.table.read().await.rows.values().cloned().collect()
    }

    /// Inserts a visitor with the next id in sequence.
    ///
    /// Ids are never reused, even after deletes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] once the id sequence is exhausted.
    pub async fn create(&self, changes: VisitorChanges) -> Result<Visitor, AppError> {
        let mut table = self.table.write().await;
        let id = table
            .last_id
            .checked_add(1)
            .ok_or_else(|| AppError::Persistence("visitor id sequence exhausted".to_string()))?;
        table.last_id = id;
        let now = Utc::now();
        let visitor = Visitor {
            id: VisitorId::new(id),
            counter: changes.counter,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(visitor.id, visitor.clone());
        Ok(visitor)
    }

    /// Fetches a single visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if `id` is absent.
    pub async fn find(&self, id: VisitorId) -> Result<Visitor, AppError> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(AppError::VisitorNotFound(id))
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
        let mut table = self.table.write().await;
        let visitor = table
            .rows
            .get_mut(&id)
            .ok_or(AppError::VisitorNotFound(id))?;
        visitor.counter = changes.counter;
        visitor.updated_at = next_timestamp(visitor.updated_at, Utc::now());
        Ok(visitor.clone())
    }

    /// Deletes a visitor permanently.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if `id` is absent.
    pub async fn delete(&self, id: VisitorId) -> Result<(), AppError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::VisitorNotFound(id))
    }
}
