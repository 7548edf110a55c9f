//! Target list parsing.

use rand::seq::SliceRandom;
use rand::Rng;
use url::Url;

/// Normalize one target line: strip whitespace and default to `https://`.
///
/// Returns `None` when the result still isn't a URL with a host.
pub fn clean_url(raw: &str) -> Option<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let lower = compact.to_ascii_lowercase();
    let cleaned = if lower.starts_with("http://") || lower.starts_with("https://") {
        compact
    } else {
        format!("https://{}", compact)
    };

    let parsed = Url::parse(&cleaned).ok()?;
    parsed.host_str()?;
    Some(cleaned)
}

/// Record key for a URL: its host (with port) with dots replaced by dashes.
pub fn slug_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    Some(host.replace('.', "-"))
}

/// Parse a newline-delimited target list. Blank lines are ignored and
/// invalid lines are skipped with a warning.
pub fn parse_targets(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let cleaned = clean_url(line);
            if cleaned.is_none() {
                tracing::warn!("Invalid URL skipped: {}", line);
            }
            cleaned
        })
        .collect()
}

/// Shuffle targets in place so no fixed prefix of the list always gets
/// the quota first.
pub fn shuffle<R: Rng + ?Sized>(targets: &mut [String], rng: &mut R) {
    targets.shuffle(rng);
}
