use crate::domain::error::DomainError;
use crate::domain::repository::{ImageStore, TextExtractor, UserRepository};
use crate::domain::user::{SignupRequest, User};
use crate::domain::verification::{VerificationOutcome, validate_document};
use crate::infrastructure::security::hash_password;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

/// Bounds on the two external calls so a stalled OCR run or upload
/// cannot hold the request open indefinitely.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Logical folder for verified ID-document images in the object store.
const ID_PIC_FOLDER: &str = "id-documents";

/// Sequences the signup pipeline: field validation, text extraction,
/// document validation, image upload, user-record creation.
///
/// Each request is one pass; no stage is retried. The image is uploaded
/// only after the document validates, and the user record is created
/// only after the upload succeeds, so a rejected or failed signup
/// leaves no durable state behind.
pub struct SignupService<R: UserRepository> {
    user_repository: Arc<R>,
    extractor: Arc<dyn TextExtractor>,
    image_store: Arc<dyn ImageStore>,
}

impl<R: UserRepository> SignupService<R> {
    pub fn new(
        user_repository: Arc<R>,
        extractor: Arc<dyn TextExtractor>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            user_repository,
            extractor,
            image_store,
        }
    }

    #[instrument(skip(self, req), fields(username = %req.username, email = %req.email))]
    pub async fn sign_up(&self, mut req: SignupRequest) -> Result<User> {
        trace!("Starting signup");

        req.validate()?;
        req.normalize();

        if req.image.is_empty() {
            warn!(email = %req.email, "Signup without ID document image");
            return Err(
                DomainError::Validation("ID document image is required".to_string()).into(),
            );
        }

        // Extract
        debug!(image_len = req.image.len(), "Extracting text from ID document");
        let text = match timeout(EXTRACTION_TIMEOUT, self.extractor.extract(&req.image)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(error = %e, "Could not extract text from document");
                return Err(DomainError::Extraction(format!(
                    "Could not read the uploaded document: {e}"
                ))
                .into());
            }
            Err(_) => {
                error!("Text extraction timed out");
                return Err(
                    DomainError::Extraction("Text extraction timed out".to_string()).into(),
                );
            }
        };

        // Validate
        match validate_document(&text, &req.id_number) {
            VerificationOutcome::Valid => {
                debug!("Document accepted");
            }
            VerificationOutcome::RejectedNotAnId => {
                warn!(email = %req.email, "Document rejected: not a national ID");
                return Err(DomainError::DocumentRejected(
                    "The uploaded document does not appear to be a national ID".to_string(),
                )
                .into());
            }
            VerificationOutcome::RejectedIdMismatch => {
                warn!(email = %req.email, "Document rejected: ID number mismatch");
                return Err(DomainError::DocumentRejected(
                    "The ID number does not match the uploaded document".to_string(),
                )
                .into());
            }
        }

        // Upload
        let id_pic = match timeout(
            UPLOAD_TIMEOUT,
            self.image_store.upload(&req.image, ID_PIC_FOLDER),
        )
        .await
        {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                error!(error = %e, "Failed to upload ID document");
                return Err(
                    DomainError::Upload(format!("Failed to store ID document: {e}")).into(),
                );
            }
            Err(_) => {
                error!("ID document upload timed out");
                return Err(DomainError::Upload("Image upload timed out".to_string()).into());
            }
        };

        // Persist
        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {e}"))
        })?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_hash,
            phone: req.phone,
            id_number: req.id_number,
            id_pic,
            is_owner: req.is_owner,
            created_at: now,
            updated_at: now,
        };

        debug!(user_id = %user.id, "Saving verified user to repository");
        self.user_repository.save_user(user.clone()).await?;

        info!(
            user_id = %user.id,
            email = %user.email,
            "Signup completed"
        );

        Ok(user)
    }
}
