//! Four-digit year extraction from recognized text.

use regex::Regex;
use std::sync::LazyLock;

/// Oldest year accepted as a copyright claim.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1990;

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());

/// A year is plausible if it falls in `[1990, current_year + 1]`.
///
/// The upper bound tolerates sites that publish next year's notice early.
pub fn is_plausible_year(year: i32, current_year: i32) -> bool {
    (MIN_PLAUSIBLE_YEAR..=current_year + 1).contains(&year)
}

/// Extract the distinct plausible years in `text`, ascending.
pub fn pick_years(text: &str, current_year: i32) -> Vec<i32> {
    let mut years: Vec<i32> = YEAR_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .filter(|&year| is_plausible_year(year, current_year))
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_years_filters_and_dedupes() {
        let text = "© 2019 Acme. Est. 1985. Updated 2021, 2019. Call 2026-555";
        assert_eq!(pick_years(text, 2024), vec![2019, 2021]);
    }

    #[test]
    fn test_pick_years_allows_next_year() {
        assert_eq!(pick_years("2025", 2024), vec![2025]);
        assert!(pick_years("2026", 2024).is_empty());
    }

    #[test]
    fn test_pick_years_requires_word_boundaries() {
        assert!(pick_years("order 120190 ref 20199", 2024).is_empty());
        assert_eq!(pick_years("©2020-2023", 2024), vec![2020, 2023]);
    }

    #[test]
    fn test_is_plausible_year() {
        assert!(is_plausible_year(1990, 2024));
        assert!(!is_plausible_year(1989, 2024));
        assert!(is_plausible_year(2025, 2024));
    }
}
