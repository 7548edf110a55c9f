//! Stored record listing.

use anyhow::bail;
use chrono::{Datelike, Utc};
use console::style;

use copyrot::config::Settings;
use copyrot::detection::most_problematic_year;
use copyrot::models::SiteStatus;
use copyrot::repository::SiteRepository;

use crate::cli::helpers::truncate;

/// Print stored sites as a table or JSON.
pub fn cmd_list(settings: &Settings, status: Option<&str>, json: bool) -> anyhow::Result<()> {
    let status = match status {
        Some(raw) => match SiteStatus::from_str(raw) {
            Some(status) => Some(status),
            None => bail!(
                "Unknown status '{}' (expected ok, stale, future or inconclusive)",
                raw
            ),
        },
        None => None,
    };

    let repo = SiteRepository::new(&settings.resolve_path(&settings.storage.database))?;
    let sites = repo.list(status)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sites)?);
        return Ok(());
    }

    if sites.is_empty() {
        println!(
            "{} No sites recorded. Run 'copyrot scan' first.",
            style("!").yellow()
        );
        return Ok(());
    }

    let current_year = Utc::now().year();
    println!("\n{}", style("Sites").bold());
    println!("{}", "-".repeat(78));
    println!(
        "{:<30} {:<13} {:<8} {:<8} Last Checked",
        "Slug", "Status", "Year", "Oldest"
    );
    println!("{}", "-".repeat(78));

    for site in &sites {
        let year = site
            .detected_years
            .iter()
            .max()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        let oldest = most_problematic_year(&site.detected_years, current_year)
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string());
        let checked = site
            .last_checked_at
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "Never".to_string());

        println!(
            "{:<30} {:<13} {:<8} {:<8} {}",
            truncate(&site.slug, 29),
            site.status.as_str(),
            year,
            oldest,
            checked
        );
    }

    println!("{}", "-".repeat(78));
    let counts = repo.count_by_status()?;
    let summary = counts
        .iter()
        .map(|(status, count)| format!("{} {}", count, status))
        .collect::<Vec<_>>()
        .join(", ");
    println!("{} sites ({})", sites.len(), summary);

    Ok(())
}
