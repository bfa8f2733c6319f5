use crate::domain::booking::{Bike, Booking, BookingStatus, CreateBooking};
use crate::domain::error::DomainError;
use crate::domain::repository::{BikeRepository, BookingRepository};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

pub struct BookingService<B: BikeRepository, K: BookingRepository> {
    bike_repository: Arc<B>,
    booking_repository: Arc<K>,
}

impl<B: BikeRepository, K: BookingRepository> BookingService<B, K> {
    pub fn new(bike_repository: Arc<B>, booking_repository: Arc<K>) -> Self {
        Self {
            bike_repository,
            booking_repository,
        }
    }

    /// Create a booking for the authenticated user, registering the
    /// bike first if its identifier has not been seen before. The store
    /// decides whether the bike is new; an existing identifier is not
    /// an error.
    #[instrument(skip(self, req), fields(user_id = user_id, bike_id = %req.bike_id))]
    pub async fn create_booking(
        &self,
        user_id: &str,
        customer_email: &str,
        req: CreateBooking,
    ) -> Result<Booking> {
        let now = Utc::now();

        let bike = Bike {
            uuid: req.bike_id.trim().to_lowercase(),
            owner: req.bike_owner.clone(),
            bike_type: req.bike_type.trim().to_lowercase(),
            location: req.bike_location.trim().to_lowercase(),
            created_at: now,
            updated_at: now,
        };
        let inserted = self.bike_repository.insert_if_absent(bike).await?;
        if inserted {
            debug!(bike_id = %req.bike_id, "Bike registered from booking");
        }

        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            user: user_id.to_string(),
            customer_email: customer_email.to_string(),
            bike_id: req.bike_id,
            bike_owner: req.bike_owner,
            bike_type: req.bike_type,
            bike_location: req.bike_location,
            price: req.final_price,
            start_time: req.start_time,
            end_time: req.end_time,
            status: BookingStatus::default(),
            created_at: now,
            updated_at: now,
        };
        self.booking_repository.save_booking(booking.clone()).await?;

        info!(
            booking_id = %booking.id,
            user_id = user_id,
            bike_id = %booking.bike_id,
            "Booking created"
        );

        Ok(booking)
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    pub async fn list_bookings(&self, user_id: &str) -> Result<Vec<Booking>> {
        self.booking_repository.find_by_user(user_id).await
    }

    #[instrument(skip(self), fields(booking_id = id))]
    pub async fn update_status(&self, id: &str, status: BookingStatus) -> Result<Booking> {
        let booking = self
            .booking_repository
            .update_status(id, status)
            .await?
            .ok_or_else(|| DomainError::NotFound("Booking not found".to_string()))?;

        info!(booking_id = %booking.id, status = ?booking.status, "Booking status updated");
        Ok(booking)
    }
}
