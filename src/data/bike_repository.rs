use crate::domain::booking::Bike;
use crate::domain::repository::BikeRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryBikeRepository {
    storage: Arc<RwLock<HashMap<String, Bike>>>,
}

impl InMemoryBikeRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryBikeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BikeRepository for InMemoryBikeRepository {
    #[instrument(skip(self, bike), fields(bike_uuid = %bike.uuid))]
    async fn insert_if_absent(&self, bike: Bike) -> Result<bool> {
        trace!("Acquiring write lock for bike storage");
        let mut storage = self.storage.write().await;
        if storage.contains_key(&bike.uuid) {
            debug!(bike_uuid = %bike.uuid, "Bike already registered");
            return Ok(false);
        }
        storage.insert(bike.uuid.clone(), bike.clone());
        debug!(bike_uuid = %bike.uuid, owner = %bike.owner, "Bike registered");
        Ok(true)
    }

    #[instrument(skip(self), fields(bike_uuid = uuid))]
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Bike>> {
        let storage = self.storage.read().await;
        Ok(storage.get(uuid).cloned())
    }
}
