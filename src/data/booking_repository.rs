use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::repository::BookingRepository;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryBookingRepository {
    storage: Arc<RwLock<HashMap<String, Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    #[instrument(skip(self, booking), fields(booking_id = %booking.id, user_id = %booking.user))]
    async fn save_booking(&self, booking: Booking) -> Result<()> {
        trace!("Acquiring write lock for booking storage");
        let mut storage = self.storage.write().await;
        storage.insert(booking.id.clone(), booking.clone());
        debug!(
            booking_id = %booking.id,
            bike_id = %booking.bike_id,
            "Booking saved to memory storage"
        );
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Booking>> {
        let storage = self.storage.read().await;
        let bookings = storage
            .values()
            .filter(|b| b.user == user_id)
            .cloned()
            .collect::<Vec<_>>();
        debug!(user_id = user_id, count = bookings.len(), "Bookings listed");
        Ok(bookings)
    }

    #[instrument(skip(self), fields(booking_id = id))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    #[instrument(skip(self), fields(booking_id = id))]
    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<Option<Booking>> {
        trace!("Acquiring write lock for booking storage");
        let mut storage = self.storage.write().await;
        let booking = match storage.get_mut(id) {
            Some(b) => b,
            None => {
                trace!(booking_id = id, "Booking not found in storage");
                return Ok(None);
            }
        };
        booking.status = status;
        booking.updated_at = Utc::now();
        debug!(booking_id = id, status = ?status, "Booking status updated");
        Ok(Some(booking.clone()))
    }
}
