//! Service traits for order persistence

use crate::core::error::StorageError;
use crate::core::order::{OrderRecord, OrderStatus};
use async_trait::async_trait;
use uuid::Uuid;

/// Durable storage for acknowledged orders
///
/// The submission pipeline only ever calls [`create`](OrderStore::create);
/// the remaining operations back the order history endpoints.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Store a new order
    async fn create(&self, record: OrderRecord) -> Result<OrderRecord, StorageError>;

    /// Get an order by ID
    async fn get(&self, id: &Uuid) -> Result<Option<OrderRecord>, StorageError>;

    /// Orders for one store, most recently submitted first
    async fn list_by_store(&self, store: &str, limit: usize)
    -> Result<Vec<OrderRecord>, StorageError>;

    /// Change an order's status and append to its history
    ///
    /// Returns [`StorageError::NotFound`] for an unknown id.
    async fn update_status(
        &self,
        id: &Uuid,
        status: OrderStatus,
        updated_by: &str,
    ) -> Result<OrderRecord, StorageError>;
}
