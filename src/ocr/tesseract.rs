//! Tesseract OCR backend implementation.
//!
//! Uses the Tesseract command-line binary with TSV output, which reports one
//! row per recognized word including its bounding box.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;
use tokio::process::Command;

use super::backend::{OcrError, RecognitionResult, RecognizedWord, TextRecognizer};
use super::preprocess::prepare_for_ocr;
use crate::config::OcrSettings;
use crate::models::BoundingBox;

/// TSV row level for individual words.
const WORD_LEVEL: &str = "5";

/// Tesseract OCR backend.
pub struct TesseractRecognizer {
    binary: String,
    language: String,
    page_seg_mode: Option<u8>,
    timeout: Duration,
}

impl TesseractRecognizer {
    /// Create a new Tesseract backend with default settings.
    pub fn new() -> Self {
        Self::with_settings(&OcrSettings::default())
    }

    /// Create a new Tesseract backend from OCR settings.
    pub fn with_settings(settings: &OcrSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            language: settings.language.clone(),
            page_seg_mode: settings.page_seg_mode,
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// Run Tesseract on an image file and return its TSV output.
    async fn run_tesseract(&self, image_path: &std::path::Path) -> Result<String, OcrError> {
        let mut command = Command::new(&self.binary);
        command
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language]);
        if let Some(psm) = self.page_seg_mode {
            command.args(["--psm", &psm.to_string()]);
        }
        command.arg("tsv").kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| OcrError::Timeout(self.timeout.as_secs()))?;

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr.trim())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::BackendNotAvailable(
                format!("{} not found (install tesseract-ocr)", self.binary),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "Tesseract is available".to_string()
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        }
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<RecognitionResult, OcrError> {
        let start = Instant::now();

        // Preprocess and write the PNG off the async workers
        let image = image.clone();
        let temp = tokio::task::spawn_blocking(move || -> Result<NamedTempFile, OcrError> {
            let prepared = prepare_for_ocr(&image);
            let temp = tempfile::Builder::new()
                .prefix("copyrot-footer-")
                .suffix(".png")
                .tempfile()?;
            prepared.save_with_format(temp.path(), ImageFormat::Png)?;
            Ok(temp)
        })
        .await
        .map_err(|e| OcrError::OcrFailed(format!("preprocessing task failed: {}", e)))??;

        let tsv = self.run_tesseract(temp.path()).await?;
        let words = parse_tsv(&tsv);

        Ok(RecognitionResult {
            words,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Parse Tesseract TSV output into words.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Only word-level rows with a
/// non-negative confidence and non-blank text are kept.
pub fn parse_tsv(tsv: &str) -> Vec<RecognizedWord> {
    tsv.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 12 || fields[0] != WORD_LEVEL {
                return None;
            }

            let text = fields[11].trim();
            if text.is_empty() {
                return None;
            }

            let confidence: f32 = fields[10].trim().parse().ok()?;
            if confidence < 0.0 {
                return None;
            }

            let left: i32 = fields[6].parse().ok()?;
            let top: i32 = fields[7].parse().ok()?;
            let width: i32 = fields[8].parse().ok()?;
            let height: i32 = fields[9].parse().ok()?;

            Some(RecognizedWord {
                text: text.to_string(),
                bbox: BoundingBox::new(left, top, left + width, top + height),
                confidence: Some(confidence),
            })
        })
        .collect()
}
