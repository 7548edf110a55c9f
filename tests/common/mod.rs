//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::DynamicImage;

use copyrot::capture::{CaptureError, CaptureResult, PageCapture};
use copyrot::imaging::encode_png;
use copyrot::models::BoundingBox;
use copyrot::ocr::{OcrError, RecognitionResult, RecognizedWord, TextRecognizer};
use copyrot::proof::{ProofLinks, ProofSubmitter};

pub const PAGE_WIDTH: u32 = 1920;
pub const PAGE_HEIGHT: u32 = 1200;
/// Footer band height for the test page (bottom quarter).
pub const BAND_HEIGHT: u32 = PAGE_HEIGHT / 4;

pub fn page_png() -> Vec<u8> {
    encode_png(&DynamicImage::new_rgb8(PAGE_WIDTH, PAGE_HEIGHT)).unwrap()
}

type CaptureFn = dyn Fn(usize) -> Result<CaptureResult, CaptureError> + Send + Sync;

/// Capture fake driven by a closure over the call index.
pub struct FakeCapture {
    pub calls: Arc<AtomicUsize>,
    respond: Box<CaptureFn>,
}

impl FakeCapture {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize) -> Result<CaptureResult, CaptureError> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            respond: Box::new(respond),
        }
    }

    /// Always returns the blank test page.
    pub fn page() -> Self {
        let bytes = page_png();
        Self::new(move |_| {
            Ok(CaptureResult {
                bytes: bytes.clone(),
                width: PAGE_WIDTH,
                height: PAGE_HEIGHT,
            })
        })
    }
}

#[async_trait]
impl PageCapture for FakeCapture {
    async fn capture(&self, _url: &str) -> Result<CaptureResult, CaptureError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(index)
    }
}

/// Recognizer returning a fixed word list, or failing.
pub struct FakeRecognizer {
    words: Option<Vec<RecognizedWord>>,
    pub seen_heights: Arc<Mutex<Vec<u32>>>,
}

impl FakeRecognizer {
    pub fn with_words(words: Vec<RecognizedWord>) -> Self {
        Self {
            words: Some(words),
            seen_heights: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            words: None,
            seen_heights: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl TextRecognizer for FakeRecognizer {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn availability_hint(&self) -> String {
        String::new()
    }

    async fn recognize(&self, image: &DynamicImage) -> Result<RecognitionResult, OcrError> {
        self.seen_heights.lock().unwrap().push(image.height());
        match &self.words {
            Some(words) => Ok(RecognitionResult::new(words.clone())),
            None => Err(OcrError::OcrFailed("engine crashed".to_string())),
        }
    }
}

/// Word at band-local `(x0, y0)`, 60x20 pixels.
pub fn word(text: &str, x0: i32, y0: i32) -> RecognizedWord {
    RecognizedWord::new(text, BoundingBox::new(x0, y0, x0 + 60, y0 + 20))
}

/// Proof submitter that counts calls and returns fixed links.
pub struct RecordingProofs {
    pub calls: Arc<AtomicUsize>,
}

impl RecordingProofs {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ProofSubmitter for RecordingProofs {
    async fn submit(&self, url: &str) -> ProofLinks {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ProofLinks {
            internet_archive: Some(format!("https://web.archive.org/web/20240603000000/{}", url)),
            archive_today: None,
        }
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Build a bare response with the given status and headers.
pub fn response(status: u16, headers: &[(&str, &str)], body: Vec<u8>) -> axum::response::Response {
    let mut builder = axum::response::Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(axum::body::Body::from(body)).unwrap()
}
