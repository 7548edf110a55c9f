//! Per-URL scan pipeline.
//!
//! capture → footer band → OCR → year scoring → zoom → classification →
//! storage → archival proof (stale only) → persistence.
//!
//! URLs are processed one at a time. Only fatal capture errors (bad
//! credentials, exhausted quota) stop a batch. A capture that can't be
//! decoded or processed is recorded as inconclusive; storage and database
//! errors fail that URL alone.

mod targets;

pub use targets::{clean_url, parse_targets, shuffle, slug_of};

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::capture::{CaptureError, PageCapture};
use crate::detection::{classify, score_years, YearEvidence};
use crate::imaging::{self, compose_zoom, downscale_page, extract_footer_band, ImageError};
use crate::models::{SiteRecord, SiteStatus, ZoomCoordinates};
use crate::ocr::{recognize_or_empty, TextRecognizer};
use crate::proof::ProofSubmitter;
use crate::repository::{RepositoryError, SiteRepository};
use crate::storage::{content_hash, ScreenshotKind, ScreenshotStore, StorageError};

const PAGE_JPEG_QUALITY: u8 = 85;
const ZOOM_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The capture service can't be used at all; the run must stop.
    #[error("{0}")]
    Fatal(CaptureError),

    #[error("Invalid target URL: {0}")]
    InvalidUrl(String),

    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ScanError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::Fatal(_))
    }
}

/// Pipeline stage, reported to [`ScanProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStep {
    Capturing,
    Recognizing,
    Storing,
    Archiving,
    Saving,
}

impl ScanStep {
    pub fn label(&self) -> &'static str {
        match self {
            ScanStep::Capturing => "capturing",
            ScanStep::Recognizing => "reading footer",
            ScanStep::Storing => "storing screenshots",
            ScanStep::Archiving => "capturing archive proof",
            ScanStep::Saving => "saving",
        }
    }
}

/// Observer for batch progress. All methods default to no-ops.
pub trait ScanProgress: Send + Sync {
    fn url_started(&self, _index: usize, _total: usize, _url: &str) {}
    fn step(&self, _url: &str, _step: ScanStep) {}
    fn url_finished(&self, _url: &str, _result: Result<&ScanOutcome, &ScanError>) {}
}

/// Progress observer that reports nothing.
pub struct SilentProgress;

impl ScanProgress for SilentProgress {}

/// Result of scanning one URL.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub record: SiteRecord,
    pub evidence: Option<YearEvidence>,
    /// False when the capture failed and the page was never seen.
    pub captured: bool,
}

/// Images and evidence derived from one capture.
struct PageAnalysis {
    display_jpeg: Vec<u8>,
    evidence: Option<YearEvidence>,
    zoom: Option<(Vec<u8>, ZoomCoordinates)>,
}

/// Counts reported at the end of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
    pub ok: usize,
    pub stale: usize,
    pub future: usize,
    pub inconclusive: usize,
}

impl RunSummary {
    pub fn record(&mut self, status: SiteStatus) {
        self.processed += 1;
        match status {
            SiteStatus::Ok => self.ok += 1,
            SiteStatus::Stale => self.stale += 1,
            SiteStatus::Future => self.future += 1,
            SiteStatus::Inconclusive => self.inconclusive += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.processed + self.failed
    }
}

/// Runs the scan pipeline against injected collaborators.
pub struct Scanner {
    capture: Box<dyn PageCapture>,
    recognizer: Box<dyn TextRecognizer>,
    proofs: Box<dyn ProofSubmitter>,
    store: ScreenshotStore,
    repo: SiteRepository,
}

impl Scanner {
    pub fn new(
        capture: Box<dyn PageCapture>,
        recognizer: Box<dyn TextRecognizer>,
        proofs: Box<dyn ProofSubmitter>,
        store: ScreenshotStore,
        repo: SiteRepository,
    ) -> Self {
        Self {
            capture,
            recognizer,
            proofs,
            store,
            repo,
        }
    }

    /// Check capture credentials before any URL is processed.
    pub async fn validate(&self) -> Result<(), CaptureError> {
        self.capture.validate().await
    }

    pub fn repository(&self) -> &SiteRepository {
        &self.repo
    }

    /// Decode a capture and derive evidence, zoom and display images.
    ///
    /// Pixel work runs on the blocking pool; only recognition is awaited
    /// on the async side.
    async fn analyze(
        &self,
        url: &str,
        bytes: Vec<u8>,
        current_year: i32,
        progress: &dyn ScanProgress,
    ) -> Result<PageAnalysis, ImageError> {
        let full = Arc::new(imaging::run_blocking(move || imaging::decode(&bytes)).await?);

        progress.step(url, ScanStep::Recognizing);
        let page = Arc::clone(&full);
        let band = imaging::run_blocking(move || Ok(extract_footer_band(&page))).await?;

        let located = match band {
            Some(band) => {
                let recognition = recognize_or_empty(self.recognizer.as_ref(), &band.image).await;
                debug!(
                    "OCR read {} words from footer of {} in {}ms",
                    recognition.words.len(),
                    url,
                    recognition.processing_time_ms
                );
                score_years(&recognition, current_year, band.height())
                    .map(|evidence| (evidence, band.origin_y))
            }
            None => {
                warn!("No footer band in capture of {}", url);
                None
            }
        };

        let page = Arc::clone(&full);
        let (zoom, display_jpeg) = imaging::run_blocking(move || {
            let zoom = match located {
                Some((evidence, origin_y)) => compose_zoom(&page, origin_y, evidence.bbox)
                    .map(|z| {
                        imaging::encode_jpeg(&z.image, ZOOM_JPEG_QUALITY)
                            .map(|bytes| (bytes, z.coordinates))
                    })
                    .transpose()?,
                None => None,
            };
            let display_jpeg = imaging::encode_jpeg(&downscale_page(&page), PAGE_JPEG_QUALITY)?;
            Ok((zoom, display_jpeg))
        })
        .await?;

        Ok(PageAnalysis {
            display_jpeg,
            evidence: located.map(|(evidence, _)| evidence),
            zoom,
        })
    }

    /// Scan one URL and persist the result.
    pub async fn process_url(
        &self,
        url: &str,
        now: DateTime<Utc>,
        progress: &dyn ScanProgress,
    ) -> Result<ScanOutcome, ScanError> {
        let slug = slug_of(url).ok_or_else(|| ScanError::InvalidUrl(url.to_string()))?;
        let current_year = now.year();

        progress.step(url, ScanStep::Capturing);
        let capture = match self.capture.capture(url).await {
            Ok(capture) => Some(capture),
            Err(e) if e.is_fatal() => return Err(ScanError::Fatal(e)),
            Err(e) => {
                warn!("No capture for {}: {}", url, e);
                None
            }
        };

        let captured = capture.is_some();
        let analysis = match capture {
            Some(capture) => match self.analyze(url, capture.bytes, current_year, progress).await {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    warn!("Could not process capture of {}: {}", url, e);
                    None
                }
            },
            None => None,
        };

        let evidence = analysis.as_ref().and_then(|a| a.evidence);
        let detected_years: Vec<i32> = evidence.iter().map(|e| e.year).collect();
        let status = classify(&detected_years, current_year);
        match &evidence {
            Some(ev) => info!(
                "{}: year {} (score {}), status {}",
                url, ev.year, ev.confidence_score, status
            ),
            None => info!("{}: no year found, status {}", url, status),
        }

        let mut record = SiteRecord::new(url, slug, detected_years, current_year, status);

        if let Some(analysis) = analysis.filter(|_| status != SiteStatus::Inconclusive) {
            progress.step(url, ScanStep::Storing);
            let date = now.date_naive();

            let page = self
                .store
                .store(ScreenshotKind::Page, &record.slug, date, &analysis.display_jpeg)
                .await?;
            record.screenshot_url = Some(page.url);
            record.screenshot_hash = Some(content_hash(&analysis.display_jpeg));

            if let Some((zoom_jpeg, coordinates)) = &analysis.zoom {
                let zoom = self
                    .store
                    .store(ScreenshotKind::Zoom, &record.slug, date, zoom_jpeg)
                    .await?;
                record.zoom_screenshot_url = Some(zoom.url);
                record.zoom_screenshot_hash = Some(content_hash(zoom_jpeg));
                record.zoom_coordinates = Some(*coordinates);
            }

            if status == SiteStatus::Stale {
                progress.step(url, ScanStep::Archiving);
                let links = self.proofs.submit(url).await;
                if links.is_empty() {
                    warn!("No archive proof captured for {}", url);
                }
                record.proof_internet_archive = links.internet_archive;
                record.proof_archive_today = links.archive_today;
            }
        }

        progress.step(url, ScanStep::Saving);
        record.stamp(now);
        self.repo.upsert(&record)?;

        Ok(ScanOutcome {
            record,
            evidence,
            captured,
        })
    }

    /// Scan `urls` in order. Stops early only on a fatal error.
    pub async fn run_batch(
        &self,
        urls: &[String],
        progress: &dyn ScanProgress,
    ) -> Result<RunSummary, ScanError> {
        let mut summary = RunSummary::default();

        for (index, url) in urls.iter().enumerate() {
            progress.url_started(index, urls.len(), url);
            let result = self.process_url(url, Utc::now(), progress).await;
            progress.url_finished(url, result.as_ref());

            match result {
                Ok(outcome) => summary.record(outcome.record.status),
                Err(e) if e.is_fatal() => {
                    error!("Aborting run at {}: {}", url, e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", url, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Run complete: {} processed, {} failed ({} stale, {} ok, {} future, {} inconclusive)",
            summary.processed,
            summary.failed,
            summary.stale,
            summary.ok,
            summary.future,
            summary.inconclusive
        );
        Ok(summary)
    }
}
