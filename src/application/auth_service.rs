use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{LoginRequest, User, UserSummary};
use crate::infrastructure::security::{generate_token, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, instrument, trace, warn};

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    jwt_secret: String,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            jwt_secret,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<String> {
        trace!("Starting login");

        let email = req.email.trim().to_lowercase();
        let user = self
            .user_repository
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| {
                warn!(email = %email, "Unknown email during login");
                DomainError::NotFound("User not found".to_string())
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {e}"))
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::Unauthorized("Invalid password".to_string()).into());
        }

        let token = generate_token(&user, &self.jwt_secret).map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {e}"))
        })?;

        info!(user_id = %user.id, email = %user.email, "Login successful");

        Ok(token)
    }

    /// Record of the authenticated user, looked up by the email claim.
    #[instrument(skip(self), fields(email = email))]
    pub async fn user_data(&self, email: &str) -> Result<User> {
        self.user_repository
            .find_user_by_email(email)
            .await?
            .ok_or_else(|| {
                warn!(email = email, "User behind token no longer exists");
                DomainError::NotFound("User not found".to_string()).into()
            })
    }

    /// Existence probe; returns a reduced projection when the email is
    /// registered.
    #[instrument(skip(self), fields(email = email))]
    pub async fn check_user(&self, email: &str) -> Result<Option<UserSummary>> {
        let user = self
            .user_repository
            .find_user_by_email(&email.trim().to_lowercase())
            .await?;
        Ok(user.as_ref().map(UserSummary::from))
    }
}
