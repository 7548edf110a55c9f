//! Site record repository.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, Row};

use super::{format_datetime, parse_datetime_opt, Result};
use crate::models::{SiteRecord, SiteStatus, ZoomCoordinates};

const SELECT_COLUMNS: &str = "url, slug, detected_years, current_year, status, \
     screenshot_url, screenshot_hash, zoom_screenshot_url, zoom_screenshot_hash, \
     zoom_year_x, zoom_year_y, zoom_year_width, zoom_year_height, \
     proof_internet_archive, proof_archive_today, \
     first_incorrect_at, last_incorrect_at, last_correct_at, verified_at, last_checked_at";

/// SQLite-backed site repository, keyed by slug.
pub struct SiteRepository {
    db_path: PathBuf,
}

impl SiteRepository {
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        super::connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sites (
                slug TEXT PRIMARY KEY,
                url TEXT NOT NULL,
                detected_years TEXT NOT NULL,
                current_year INTEGER NOT NULL,
                status TEXT NOT NULL,
                screenshot_url TEXT,
                screenshot_hash TEXT,
                zoom_screenshot_url TEXT,
                zoom_screenshot_hash TEXT,
                zoom_year_x INTEGER,
                zoom_year_y INTEGER,
                zoom_year_width INTEGER,
                zoom_year_height INTEGER,
                proof_internet_archive TEXT,
                proof_archive_today TEXT,
                first_incorrect_at TEXT,
                last_incorrect_at TEXT,
                last_correct_at TEXT,
                verified_at TEXT,
                last_checked_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_sites_status ON sites(status);
        "#,
        )?;
        Ok(())
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<(SiteRecord, String)> {
        let zoom = match (
            row.get::<_, Option<i32>>("zoom_year_x")?,
            row.get::<_, Option<i32>>("zoom_year_y")?,
            row.get::<_, Option<i32>>("zoom_year_width")?,
            row.get::<_, Option<i32>>("zoom_year_height")?,
        ) {
            (Some(x), Some(y), Some(width), Some(height)) => Some(ZoomCoordinates {
                x,
                y,
                width,
                height,
            }),
            _ => None,
        };

        let record = SiteRecord {
            url: row.get("url")?,
            slug: row.get("slug")?,
            detected_years: Vec::new(),
            current_year: row.get("current_year")?,
            status: SiteStatus::from_str(&row.get::<_, String>("status")?)
                .unwrap_or(SiteStatus::Inconclusive),
            screenshot_url: row.get("screenshot_url")?,
            screenshot_hash: row.get("screenshot_hash")?,
            zoom_screenshot_url: row.get("zoom_screenshot_url")?,
            zoom_screenshot_hash: row.get("zoom_screenshot_hash")?,
            zoom_coordinates: zoom,
            proof_internet_archive: row.get("proof_internet_archive")?,
            proof_archive_today: row.get("proof_archive_today")?,
            first_incorrect_at: parse_datetime_opt(row.get("first_incorrect_at")?),
            last_incorrect_at: parse_datetime_opt(row.get("last_incorrect_at")?),
            last_correct_at: parse_datetime_opt(row.get("last_correct_at")?),
            verified_at: parse_datetime_opt(row.get("verified_at")?),
            last_checked_at: parse_datetime_opt(row.get("last_checked_at")?),
        };
        Ok((record, row.get("detected_years")?))
    }

    fn finish(parts: (SiteRecord, String)) -> Result<SiteRecord> {
        let (mut record, years) = parts;
        record.detected_years = serde_json::from_str(&years)?;
        Ok(record)
    }

    /// Get a site by slug.
    pub fn get(&self, slug: &str) -> Result<Option<SiteRecord>> {
        let conn = self.connect()?;
        let sql = format!("SELECT {} FROM sites WHERE slug = ?", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        super::to_option(stmt.query_row(params![slug], Self::row_to_record))?
            .map(Self::finish)
            .transpose()
    }

    /// List sites, most recently checked first.
    pub fn list(&self, status: Option<SiteStatus>) -> Result<Vec<SiteRecord>> {
        let conn = self.connect()?;
        let order = "ORDER BY last_checked_at DESC, slug ASC";

        let rows = match status {
            Some(status) => {
                let sql = format!("SELECT {} FROM sites WHERE status = ? {}", SELECT_COLUMNS, order);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![status.as_str()], Self::row_to_record)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let sql = format!("SELECT {} FROM sites {}", SELECT_COLUMNS, order);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], Self::row_to_record)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                rows
            }
        };

        rows.into_iter().map(Self::finish).collect()
    }

    /// Insert or update a site.
    ///
    /// `first_incorrect_at` is kept once set; the other timestamps only move
    /// forward. Links, hashes and zoom coordinates are only replaced when
    /// the new record carries a value.
    pub fn upsert(&self, record: &SiteRecord) -> Result<()> {
        let conn = self.connect()?;
        let zoom = record.zoom_coordinates;

        conn.execute(
            r#"
            INSERT INTO sites (
                slug, url, detected_years, current_year, status,
                screenshot_url, screenshot_hash, zoom_screenshot_url, zoom_screenshot_hash,
                zoom_year_x, zoom_year_y, zoom_year_width, zoom_year_height,
                proof_internet_archive, proof_archive_today,
                first_incorrect_at, last_incorrect_at, last_correct_at, verified_at, last_checked_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            ON CONFLICT(slug) DO UPDATE SET
                url = excluded.url,
                detected_years = excluded.detected_years,
                current_year = excluded.current_year,
                status = excluded.status,
                screenshot_url = COALESCE(excluded.screenshot_url, sites.screenshot_url),
                screenshot_hash = COALESCE(excluded.screenshot_hash, sites.screenshot_hash),
                zoom_screenshot_url = COALESCE(excluded.zoom_screenshot_url, sites.zoom_screenshot_url),
                zoom_screenshot_hash = COALESCE(excluded.zoom_screenshot_hash, sites.zoom_screenshot_hash),
                zoom_year_x = CASE WHEN excluded.zoom_year_x IS NULL THEN sites.zoom_year_x ELSE excluded.zoom_year_x END,
                zoom_year_y = CASE WHEN excluded.zoom_year_x IS NULL THEN sites.zoom_year_y ELSE excluded.zoom_year_y END,
                zoom_year_width = CASE WHEN excluded.zoom_year_x IS NULL THEN sites.zoom_year_width ELSE excluded.zoom_year_width END,
                zoom_year_height = CASE WHEN excluded.zoom_year_x IS NULL THEN sites.zoom_year_height ELSE excluded.zoom_year_height END,
                proof_internet_archive = COALESCE(excluded.proof_internet_archive, sites.proof_internet_archive),
                proof_archive_today = COALESCE(excluded.proof_archive_today, sites.proof_archive_today),
                first_incorrect_at = COALESCE(sites.first_incorrect_at, excluded.first_incorrect_at),
                last_incorrect_at = MAX(COALESCE(excluded.last_incorrect_at, sites.last_incorrect_at), COALESCE(sites.last_incorrect_at, excluded.last_incorrect_at)),
                last_correct_at = MAX(COALESCE(excluded.last_correct_at, sites.last_correct_at), COALESCE(sites.last_correct_at, excluded.last_correct_at)),
                verified_at = MAX(COALESCE(excluded.verified_at, sites.verified_at), COALESCE(sites.verified_at, excluded.verified_at)),
                last_checked_at = MAX(COALESCE(excluded.last_checked_at, sites.last_checked_at), COALESCE(sites.last_checked_at, excluded.last_checked_at))
            "#,
            params![
                record.slug,
                record.url,
                serde_json::to_string(&record.detected_years)?,
                record.current_year,
                record.status.as_str(),
                record.screenshot_url,
                record.screenshot_hash,
                record.zoom_screenshot_url,
                record.zoom_screenshot_hash,
                zoom.map(|z| z.x),
                zoom.map(|z| z.y),
                zoom.map(|z| z.width),
                zoom.map(|z| z.height),
                record.proof_internet_archive,
                record.proof_archive_today,
                record.first_incorrect_at.as_ref().map(format_datetime),
                record.last_incorrect_at.as_ref().map(format_datetime),
                record.last_correct_at.as_ref().map(format_datetime),
                record.verified_at.as_ref().map(format_datetime),
                record.last_checked_at.as_ref().map(format_datetime),
            ],
        )?;

        Ok(())
    }

    /// Number of stored sites per status.
    pub fn count_by_status(&self) -> Result<Vec<(SiteStatus, u64)>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM sites GROUP BY status ORDER BY status")?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(counts
            .into_iter()
            .filter_map(|(status, count)| Some((SiteStatus::from_str(&status)?, count as u64)))
            .collect())
    }
}
