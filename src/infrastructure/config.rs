use anyhow::{Context, Result};
use std::path::PathBuf;

/// Cloudinary credentials used by the object-store uploader.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub api_key: String,
    pub cloud_name: String,
    /// API secret. Should never be logged.
    pub api_secret: String,
}

/// Process configuration, read once at startup and passed by reference
/// into the components that need it. Components never read the
/// environment themselves.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub cloudinary: CloudinaryConfig,
    /// Directory holding the OCR model files (`text-detection.rten`,
    /// `text-recognition.rten`).
    pub ocr_model_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let port = std::env::var("PORT").unwrap_or_else(|_| "5000".to_string());

        Ok(Self {
            bind_addr: format!("127.0.0.1:{port}"),
            jwt_secret: std::env::var("SECRET").context("SECRET is not set")?,
            cloudinary: CloudinaryConfig {
                api_key: std::env::var("CLOUDINARY_API_KEY")
                    .context("CLOUDINARY_API_KEY is not set")?,
                cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME")
                    .context("CLOUDINARY_CLOUD_NAME is not set")?,
                api_secret: std::env::var("CLOUDINARY_API_SECRET")
                    .context("CLOUDINARY_API_SECRET is not set")?,
            },
            ocr_model_dir: std::env::var("OCR_MODEL_DIR")
                .map(PathBuf::from)
                .context("OCR_MODEL_DIR is not set")?,
        })
    }
}
