use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Shown for accounts that signed up without a verified ID document.
pub const PLACEHOLDER_ID_PIC: &str = "https://via.placeholder.com/150";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

fn placeholder_id_pic() -> String {
    PLACEHOLDER_ID_PIC.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: String,
    pub id_number: String,
    #[serde(default = "placeholder_id_pic")]
    pub id_pic: String,
    pub is_owner: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reduced projection returned by the existence probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub is_owner: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            is_owner: user.is_owner,
        }
    }
}

/// Transient signup input: form fields plus the raw ID-document image.
/// Lives only for the duration of one request.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub id_number: String,
    pub is_owner: bool,
    pub email: String,
    pub password: String,
    pub image: Vec<u8>,
}

impl SignupRequest {
    /// Check required fields and formats, mirroring the storage schema's
    /// constraints. The first failing rule determines the message.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (value, label) in [
            (&self.username, "Username"),
            (&self.first_name, "First name"),
            (&self.last_name, "Last name"),
            (&self.id_number, "ID number"),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::Validation(format!("{label} is required")));
            }
        }

        if self.email.trim().len() < 5 || !EMAIL_PATTERN.is_match(self.email.trim()) {
            return Err(DomainError::Validation(format!(
                "{} is not a valid email address",
                self.email
            )));
        }

        if self.phone.len() != 10 || !self.phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::Validation(format!(
                "{} is not a valid phone number",
                self.phone
            )));
        }

        if self.password.len() < 8 {
            return Err(DomainError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Lowercase the name and email fields. Password, ID number and phone
    /// are stored as given.
    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_lowercase();
        self.first_name = self.first_name.trim().to_lowercase();
        self.last_name = self.last_name.trim().to_lowercase();
        self.email = self.email.trim().to_lowercase();
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
