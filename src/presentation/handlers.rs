use crate::application::auth_service::AuthService;
use crate::application::booking_service::BookingService;
use crate::application::signup_service::SignupService;
use crate::data::bike_repository::InMemoryBikeRepository;
use crate::data::booking_repository::InMemoryBookingRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::booking::{CreateBooking, UpdateBookingStatus};
use crate::domain::error::DomainError;
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// AppState holding the services
pub struct AppState {
    pub auth_service: AuthService<InMemoryUserRepository>,
    pub signup_service: SignupService<InMemoryUserRepository>,
    pub booking_service: BookingService<InMemoryBikeRepository, InMemoryBookingRepository>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

// API Error Types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Document rejected: {0}")]
    DocumentRejected(String),
    #[error("Extraction error: {0}")]
    Extraction(String),
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DocumentRejected(_)
            | ApiError::Extraction(_)
            | ApiError::Upload(_)
            | ApiError::Conflict(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => actix_web::http::StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let message = match self {
            ApiError::Validation(msg)
            | ApiError::DocumentRejected(msg)
            | ApiError::Extraction(msg)
            | ApiError::Upload(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
        };

        // Log error based on severity
        match self {
            ApiError::Validation(_) => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            ApiError::DocumentRejected(_) => {
                warn!(error = %error_msg, status = %status, "Document rejected")
            }
            ApiError::Extraction(_) => {
                warn!(error = %error_msg, status = %status, "Extraction failed")
            }
            ApiError::Upload(_) => {
                error!(error = %error_msg, status = %status, "Upload failed")
            }
            ApiError::Unauthorized(_) => {
                warn!(error = %error_msg, status = %status, "Unauthorized")
            }
            ApiError::Forbidden(_) => {
                warn!(error = %error_msg, status = %status, "Forbidden")
            }
            ApiError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            ApiError::Conflict(_) => {
                warn!(error = %error_msg, status = %status, "Constraint violation")
            }
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: error_msg,
            details: serde_json::json!({ "message": message }),
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::DocumentRejected(msg)) => ApiError::DocumentRejected(msg.clone()),
            Some(DomainError::Extraction(msg)) => ApiError::Extraction(msg.clone()),
            Some(DomainError::Upload(msg)) => ApiError::Upload(msg.clone()),
            Some(DomainError::Unauthorized(msg)) => ApiError::Unauthorized(msg.clone()),
            Some(DomainError::Forbidden(msg)) => ApiError::Forbidden(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Conflict(msg)) => ApiError::Conflict(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

// AuthenticatedUser extractor
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
        })
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[derive(Debug, Deserialize)]
pub struct CheckUserQuery {
    pub email: String,
}

#[instrument(skip(state), fields(email = %query.email))]
pub async fn check_user(
    state: web::Data<AppState>,
    query: web::Query<CheckUserQuery>,
) -> Result<HttpResponse, ApiError> {
    let summary = state
        .auth_service
        .check_user(&query.email)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to check user");
            ApiError::from(e)
        })?;

    let body = match summary {
        Some(user) => serde_json::json!({ "exists": true, "user": user }),
        None => serde_json::json!({ "exists": false }),
    };
    Ok(HttpResponse::Ok().json(body))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn userdata(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    info!(email = %user.email, "User data requested");
    let record = state.auth_service.user_data(&user.email).await.map_err(|e| {
        error!(error = %e, "Failed to load user data");
        ApiError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "user": record })))
}

#[instrument(skip(state, user, req), fields(user_id = %user.id, bike_id = %req.bike_id))]
pub async fn create_booking(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<CreateBooking>,
) -> Result<HttpResponse, ApiError> {
    info!(bike_id = %req.bike_id, "Creating booking");
    let booking = state
        .booking_service
        .create_booking(&user.id, &user.email, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create booking");
            ApiError::from(e)
        })?;

    info!(booking_id = %booking.id, "Booking created successfully");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Booking created",
        "booking": booking,
    })))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_bookings(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let bookings = state
        .booking_service
        .list_bookings(&user.id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list bookings");
            ApiError::from(e)
        })?;

    info!(count = bookings.len(), "Bookings listed");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "bookings": bookings })))
}

#[instrument(skip(state, req), fields(booking_id = %*path))]
pub async fn update_booking(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateBookingStatus>,
) -> Result<HttpResponse, ApiError> {
    let booking_id = path.into_inner();
    info!(booking_id = %booking_id, status = ?req.status, "Updating booking status");
    let booking = state
        .booking_service
        .update_status(&booking_id, req.status)
        .await
        .map_err(|e| {
            warn!(booking_id = %booking_id, error = %e, "Failed to update booking");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "Booking updated",
        "booking": booking,
    })))
}
