use crate::domain::repository::ImageStore;
use crate::infrastructure::config::CloudinaryConfig;
use anyhow::Result;
use async_trait::async_trait;
use cloudinary::upload::{Source::Path, Upload, UploadOptions};
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Uploads image buffers to Cloudinary and returns the public delivery
/// URL. The buffer is staged in a temporary file for the duration of
/// the upload only; nothing persists on local disk.
pub struct CloudinaryImageStore {
    config: CloudinaryConfig,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    #[instrument(skip(self, image), fields(image_len = image.len(), folder = folder))]
    async fn upload(&self, image: &[u8], folder: &str) -> Result<String> {
        let public_id = format!("{}/{}", folder, Uuid::new_v4());

        let options = UploadOptions::new().set_public_id(public_id.clone());
        let upload = Upload::new(
            self.config.api_key.clone(),
            self.config.cloud_name.clone(),
            self.config.api_secret.clone(),
        );

        // The upload API takes a file path; stage the buffer in a
        // temporary file that is removed on drop.
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(image)?;
        let path_buf = temp_file.path().to_path_buf();

        upload.image(Path(path_buf), &options).await?;

        let url = format!(
            "https://res.cloudinary.com/{}/image/upload/{}",
            self.config.cloud_name, public_id
        );
        debug!(url = %url, "Image uploaded");
        Ok(url)
    }
}
