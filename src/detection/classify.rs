use crate::models::SiteStatus;

/// Assign a status from the detected years and the current calendar year.
pub fn classify(detected_years: &[i32], current_year: i32) -> SiteStatus {
    match detected_years.iter().max() {
        None => SiteStatus::Inconclusive,
        Some(&newest) if newest < current_year => SiteStatus::Stale,
        Some(&newest) if newest == current_year => SiteStatus::Ok,
        Some(_) => SiteStatus::Future,
    }
}

/// Oldest detected year that is behind `current_year`, if any.
pub fn most_problematic_year(detected_years: &[i32], current_year: i32) -> Option<i32> {
    detected_years
        .iter()
        .copied()
        .filter(|&year| year < current_year)
        .min()
}
