//! In-memory implementation of OrderStore for testing and development

use crate::core::{OrderRecord, OrderStatus, OrderStore, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory order store
///
/// Orders live for the lifetime of the process. Clones share the same map.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, OrderRecord>>>,
}

impl InMemoryOrderStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    /// Every stored order, in no particular order
    pub async fn all(&self) -> Vec<OrderRecord> {
        self.orders.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, record: OrderRecord) -> Result<OrderRecord, StorageError> {
        let mut orders = self.orders.write().await;
        orders.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<OrderRecord>, StorageError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn list_by_store(
        &self,
        store: &str,
        limit: usize,
    ) -> Result<Vec<OrderRecord>, StorageError> {
        let orders = self.orders.read().await;

        let mut matching: Vec<OrderRecord> = orders
            .values()
            .filter(|record| record.submission.store() == store)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        matching.truncate(limit);

        Ok(matching)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: OrderStatus,
        updated_by: &str,
    ) -> Result<OrderRecord, StorageError> {
        let mut orders = self.orders.write().await;
        let record = orders
            .get_mut(id)
            .ok_or(StorageError::NotFound { id: *id })?;

        record.transition(status, updated_by, Utc::now());
        Ok(record.clone())
    }
}
