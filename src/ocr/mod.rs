//! Text recognition over footer bands.
//!
//! The recognizer must return per-word bounding boxes, not just text: year
//! scoring and zoom placement both depend on where each word sits.
//!
//! Tesseract (via its command-line binary) is the only backend. Other engines
//! can be plugged in behind the `TextRecognizer` trait.

mod backend;
mod preprocess;
mod tesseract;

pub use backend::{OcrError, RecognitionResult, RecognizedWord, TextRecognizer};
pub use preprocess::{normalize_contrast, prepare_for_ocr};
pub use tesseract::{parse_tsv, TesseractRecognizer};

use image::DynamicImage;

/// Run recognition, degrading any engine failure to an empty result.
///
/// An empty result carries zero words, so the page will later be classified
/// as inconclusive instead of failing the scan.
pub async fn recognize_or_empty(
    recognizer: &dyn TextRecognizer,
    image: &DynamicImage,
) -> RecognitionResult {
    match recognizer.recognize(image).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("OCR failed ({}), treating footer as empty", e);
            RecognitionResult::default()
        }
    }
}
