//! OCR backend abstraction.

use async_trait::async_trait;
use image::DynamicImage;
use thiserror::Error;

use crate::models::BoundingBox;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("OCR timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// A single recognized word and where it was found.
///
/// `bbox` is local to the image passed to the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    pub text: String,
    pub bbox: BoundingBox,
    /// Engine confidence (0.0 - 100.0), if reported.
    pub confidence: Option<f32>,
}

impl RecognizedWord {
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence: None,
        }
    }
}

/// All words recognized in one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionResult {
    pub words: Vec<RecognizedWord>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl RecognitionResult {
    pub fn new(words: Vec<RecognizedWord>) -> Self {
        Self {
            words,
            processing_time_ms: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words joined with single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for OCR engines.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    /// Check if this backend is available (binary installed, models present).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Recognize words in an image.
    ///
    /// Implementations apply their own preprocessing; the returned boxes
    /// must still be in the coordinate space of `image`.
    async fn recognize(&self, image: &DynamicImage) -> Result<RecognitionResult, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_text_joins_words() {
        let result = RecognitionResult::new(vec![
            RecognizedWord::new("©", BoundingBox::new(0, 0, 10, 10)),
            RecognizedWord::new("2019", BoundingBox::new(12, 0, 50, 10)),
        ]);
        assert_eq!(result.text(), "© 2019");
        assert!(!result.is_empty());
        assert!(RecognitionResult::default().is_empty());
    }
}
