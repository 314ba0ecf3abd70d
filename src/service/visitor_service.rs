//! Visitor service: CRUD orchestration over the visitor store.

use std::sync::Arc;

use crate::domain::{Visitor, VisitorChanges, VisitorId};
use crate::error::AppError;
use crate::persistence::VisitorStore;

/// Orchestration layer for visitor CRUD.
///
/// Every operation is a single store call. Nothing is published to the
/// channel hub; counter changes and broadcasts are independent.
#[derive(Debug, Clone)]
pub struct VisitorService {
    store: Arc<VisitorStore>,
}

impl VisitorService {
    /// Creates a new `VisitorService`.
    #[must_use]
    pub fn new(store: Arc<VisitorStore>) -> Self {
        Self { store }
    }

    /// Returns all visitors ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the store is unavailable.
    pub async fn list_visitors(&self) -> Result<Vec<Visitor>, AppError> {
        self.store.list().await
    }

    /// Creates a visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the store is unavailable.
    pub async fn create_visitor(&self, changes: VisitorChanges) -> Result<Visitor, AppError> {
        let visitor = self.store.create(changes).await?;
        tracing::info!(visitor_id = %visitor.id, counter = ?visitor.counter, "visitor created");
        Ok(visitor)
    }

    /// Returns a single visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if `id` does not exist.
    pub async fn get_visitor(&self, id: VisitorId) -> Result<Visitor, AppError> {
        self.store.find(id).await
    }

    /// Overwrites a visitor's counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if `id` does not exist.
    pub async fn update_visitor(
        &self,
        id: VisitorId,
        changes: VisitorChanges,
    ) -> Result<Visitor, AppError> {
        let visitor = self.store.update(id, changes).await?;
        tracing::info!(visitor_id = %id, counter = ?visitor.counter, "visitor updated");
        Ok(visitor)
    }

    /// Deletes a visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::VisitorNotFound`] if `id` does not exist.
    pub async fn delete_visitor(&self, id: VisitorId) -> Result<(), AppError> {
        self.store.delete(id).await?;
        tracing::info!(visitor_id = %id, "visitor destroyed");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_service() -> VisitorService {
        VisitorService::new(Arc::new(VisitorStore::in_memory()))
    }

    #[tokio::test]
    async fn create_then_get_returns_same_counter() {
        let service = make_service();
        for value in [Some(0), Some(-3), Some(i32::MAX), None] {
            let Ok(created) = service
                .create_visitor(VisitorChanges::counter(value))
                .await
            else {
                panic!("create failed");
            };
            let Ok(found) = service.get_visitor(created.id).await else {
                panic!("get failed");
            };
            assert_eq!(found.counter, value);
        }
    }

    #[tokio::test]
    async fn list_grows_by_created_count() {
        let service = make_service();
        let Ok(_) = service.create_visitor(VisitorChanges::counter(Some(1))).await else {
            panic!("seed failed");
        };
        let before = service.list_visitors().await.map(|v| v.len()).unwrap_or_default();

        for n in 0..3 {
            let _ = service.create_visitor(VisitorChanges::counter(Some(n))).await;
        }

        let Ok(after) = service.list_visitors().await else {
            panic!("list failed");
        };
        assert_eq!(after.len(), before + 3);
        assert!(after.iter().any(|v| v.counter == Some(1)));
    }

    #[tokio::test]
    async fn create_update_delete_scenario() {
        let service = make_service();

        let Ok(created) = service.create_visitor(VisitorChanges::counter(Some(5))).await else {
            panic!("create failed");
        };
        let Ok(read) = service.get_visitor(created.id).await else {
            panic!("read failed");
        };
        assert_eq!(read.counter, Some(5));

        let Ok(updated) = service
            .update_visitor(created.id, VisitorChanges::counter(Some(10)))
            .await
        else {
            panic!("update failed");
        };
        assert!(updated.updated_at > read.updated_at);
        let Ok(read) = service.get_visitor(created.id).await else {
            panic!("read failed");
        };
        assert_eq!(read.counter, Some(10));

        assert!(service.delete_visitor(created.id).await.is_ok());
        let result = service.get_visitor(created.id).await;
        assert!(matches!(result, Err(AppError::VisitorNotFound(_))));
    }

    #[tokio::test]
    async fn mutations_on_missing_ids_are_not_found() {
        let service = make_service();
        let id = VisitorId::new(404);
        assert!(matches!(
            service.update_visitor(id, VisitorChanges::default()).await,
            Err(AppError::VisitorNotFound(_))
        ));
        assert!(matches!(
            service.delete_visitor(id).await,
            Err(AppError::VisitorNotFound(_))
        ));
    }
}
