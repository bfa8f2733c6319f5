use crate::domain::repository::TextExtractor;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Production text extractor backed by the `ocrs` neural OCR engine.
///
/// Model loading is the expensive step; the extractor is constructed
/// once at startup and shared across requests. Recognition itself is
/// CPU-bound and runs on the blocking thread pool. The bundled models
/// recognize Latin-script (English) text.
pub struct OcrTextExtractor {
    engine: Arc<OcrEngine>,
}

impl OcrTextExtractor {
    /// Load detection and recognition models from `dir`, which must
    /// contain `text-detection.rten` and `text-recognition.rten`.
    #[instrument(skip_all, fields(model_dir = %dir.as_ref().display()))]
    pub fn from_model_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let detection_path = dir.join(DETECTION_MODEL_FILENAME);
        let recognition_path = dir.join(RECOGNITION_MODEL_FILENAME);

        for path in [&detection_path, &recognition_path] {
            if !path.exists() {
                return Err(anyhow!("OCR model not found at {}", path.display()));
            }
        }

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&detection_path).map_err(|err| {
            anyhow!(
                "failed to load detection model from {}: {}",
                detection_path.display(),
                err
            )
        })?;

        info!("Loading OCR recognition model");
        let recognition_model = Model::load_file(&recognition_path).map_err(|err| {
            anyhow!(
                "failed to load recognition model from {}: {}",
                recognition_path.display(),
                err
            )
        })?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| anyhow!("failed to initialise OCR engine: {}", err))?;

        info!("OCR engine initialised");
        Ok(Self {
            engine: Arc::new(engine),
        })
    }
}

#[async_trait]
impl TextExtractor for OcrTextExtractor {
    #[instrument(skip_all, fields(image_len = image.len()))]
    async fn extract(&self, image: &[u8]) -> Result<String> {
        let engine = Arc::clone(&self.engine);
        let buffer = image.to_vec();

        let text = tokio::task::spawn_blocking(move || recognize(&engine, &buffer))
            .await
            .context("OCR task panicked")??;

        debug!(
            line_count = text.lines().count(),
            char_count = text.len(),
            "OCR recognition complete"
        );
        Ok(text)
    }
}

fn recognize(engine: &OcrEngine, buffer: &[u8]) -> Result<String> {
    let img = image::load_from_memory(buffer).context("failed to decode image")?;

    // ocrs expects RGB8.
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    let source = ImageSource::from_bytes(rgb.as_raw(), (width, height))
        .map_err(|err| anyhow!("failed to create image source ({width}x{height}): {err}"))?;

    let input = engine
        .prepare_input(source)
        .map_err(|err| anyhow!("OCR preprocessing failed: {err}"))?;

    engine
        .get_text(&input)
        .map_err(|err| anyhow!("OCR text recognition failed: {err}"))
}
