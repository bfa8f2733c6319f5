use crate::domain::booking::{Bike, Booking, BookingStatus};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. The store enforces email uniqueness; a
    /// duplicate email fails the insert.
    async fn save_user(&self, user: User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait BikeRepository: Send + Sync {
    /// Insert the bike unless one with the same identifier already
    /// exists. Returns `true` if the bike was inserted, `false` if the
    /// identifier was already taken. The check and the insert happen
    /// under one critical section, so concurrent callers cannot both
    /// insert.
    async fn insert_if_absent(&self, bike: Bike) -> Result<bool>;
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Bike>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn save_booking(&self, booking: Booking) -> Result<()>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Booking>>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>>;
    /// Set the status of an existing booking. Returns the updated
    /// booking, or `None` when the id is unknown.
    async fn update_status(&self, id: &str, status: BookingStatus) -> Result<Option<Booking>>;
}

/// Turns raw image bytes into recognized plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &[u8]) -> Result<String>;
}

/// Streams image bytes to durable remote storage and returns a stable,
/// publicly dereferenceable URL.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, image: &[u8], folder: &str) -> Result<String>;
}
