use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bike registered implicitly the first time a booking references its
/// identifier. Never updated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bike {
    /// Externally supplied identifier, lowercased on the way in.
    pub uuid: String,
    pub owner: String,
    pub bike_type: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    /// Owning user, by id. Bike fields below are denormalized copies,
    /// not a foreign key.
    pub user: String,
    pub customer_email: String,
    pub bike_id: String,
    pub bike_owner: String,
    pub bike_type: String,
    pub bike_location: String,
    pub price: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub bike_id: String,
    pub bike_owner: String,
    pub bike_type: String,
    pub bike_location: String,
    pub final_price: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}
