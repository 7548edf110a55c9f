//! Year detection: plausible-year extraction, evidence scoring and status
//! classification.

mod classify;
mod scorer;
mod years;

pub use classify::{classify, most_problematic_year};
pub use scorer::{score_years, YearEvidence, COPYRIGHT_BONUS, FOOTER_POSITION_BONUS};
pub use years::{is_plausible_year, pick_years, MIN_PLAUSIBLE_YEAR};
