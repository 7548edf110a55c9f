//! Evidence scoring for the most recent year in a footer band.
//!
//! The newest plausible year is taken as the site's claim. When it occurs
//! more than once, each occurrence is scored by where it sits in the band
//! and whether a copyright marker is nearby, and the best one becomes the
//! evidentiary location used for the zoom.

use serde::Serialize;

use super::years::pick_years;
use crate::models::BoundingBox;
use crate::ocr::{RecognitionResult, RecognizedWord};

/// Awarded when a word's top edge lies in the bottom 30% of the band.
pub const FOOTER_POSITION_BONUS: i32 = 50;

/// Awarded once when another word nearby carries a copyright marker.
pub const COPYRIGHT_BONUS: i32 = 100;

const FOOTER_POSITION_THRESHOLD: f64 = 0.7;
const MARKER_MAX_DISTANCE: i32 = 200;
const COPYRIGHT_MARKERS: &[&str] = &["©", "copyright", "(c)", "rights"];

/// The chosen year and where it was found, in band-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearEvidence {
    pub year: i32,
    pub bbox: BoundingBox,
    pub confidence_score: i32,
}

fn has_copyright_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    COPYRIGHT_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn score_word(words: &[RecognizedWord], index: usize, band_height: u32) -> i32 {
    let word = &words[index];
    let mut score = 0;

    if f64::from(word.bbox.y0) > f64::from(band_height) * FOOTER_POSITION_THRESHOLD {
        score += FOOTER_POSITION_BONUS;
    }

    let marker_nearby = words.iter().enumerate().any(|(other_index, other)| {
        other_index != index
            && (other.bbox.x0 - word.bbox.x0).abs() < MARKER_MAX_DISTANCE
            && has_copyright_marker(&other.text)
    });
    if marker_nearby {
        score += COPYRIGHT_BONUS;
    }

    score
}

/// Pick the best-evidenced occurrence of the newest plausible year.
///
/// Returns `None` when the text holds no year in `[1990, current_year + 1]`.
/// Ties go to the first word in recognition order.
pub fn score_years(
    result: &RecognitionResult,
    current_year: i32,
    band_height: u32,
) -> Option<YearEvidence> {
    let target = *pick_years(&result.text(), current_year).last()?;
    let needle = target.to_string();

    let mut best: Option<(usize, i32)> = None;
    for (index, word) in result.words.iter().enumerate() {
        if !word.text.contains(&needle) {
            continue;
        }
        let score = score_word(&result.words, index, band_height);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }

    let (index, confidence_score) = best?;
    let bbox = result.words[index].bbox;
    tracing::debug!(
        "Year {} located at ({}, {}) with score {}",
        target,
        bbox.x0,
        bbox.y0,
        confidence_score
    );

    Some(YearEvidence {
        year: target,
        bbox,
        confidence_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn word(text: &str, x0: i32, y0: i32) -> RecognizedWord {
        RecognizedWord::new(text, BoundingBox::new(x0, y0, x0 + 60, y0 + 20))
    }

    fn result(words: Vec<RecognizedWord>) -> RecognitionResult {
        RecognitionResult::new(words)
    }

    #[test]
    fn test_copyright_scenario_scores_both_bonuses() {
        let band_height = 1000;
        let y = 850;
        let words = vec![
            word("©", 100, y),
            word("2019", 130, y),
            word("Acme", 200, y),
            word("Corp", 270, y),
        ];

        let evidence = score_years(&result(words), 2024, band_height).unwrap();
        assert_eq!(evidence.year, 2019);
        assert_eq!(evidence.bbox.x0, 130);
        assert!(evidence.confidence_score >= 150);
    }

    #[test]
    fn test_no_years_means_no_evidence() {
        let words = vec![word("About", 0, 10), word("Contact", 100, 10), word("123", 200, 10)];
        assert!(score_years(&result(words), 2024, 500).is_none());
        assert!(score_years(&RecognitionResult::default(), 2024, 500).is_none());
    }

    #[test]
    fn test_targets_newest_year() {
        let words = vec![word("2015", 0, 10), word("2021", 500, 10), word("Since", 600, 10)];
        let evidence = score_years(&result(words), 2024, 500).unwrap();
        assert_eq!(evidence.year, 2021);
        assert_eq!(evidence.confidence_score, 0);
    }

    #[test]
    fn test_prefers_occurrence_near_marker() {
        let words = vec![
            word("2020", 1500, 10),
            word("Copyright", 100, 400),
            word("2020", 220, 400),
        ];
        let evidence = score_years(&result(words), 2024, 500).unwrap();
        assert_eq!(evidence.bbox.x0, 220);
        assert_eq!(evidence.confidence_score, FOOTER_POSITION_BONUS + COPYRIGHT_BONUS);
    }

    #[test]
    fn test_marker_bonus_counted_once() {
        let words = vec![
            word("All", 0, 0),
            word("rights", 40, 0),
            word("©", 80, 0),
            word("2022", 120, 0),
        ];
        let evidence = score_years(&result(words), 2024, 1000).unwrap();
        assert_eq!(evidence.confidence_score, COPYRIGHT_BONUS);
    }

    #[test]
    fn test_marker_must_be_close() {
        let words = vec![word("©", 0, 0), word("2022", 200, 0)];
        let evidence = score_years(&result(words), 2024, 1000).unwrap();
        assert_eq!(evidence.confidence_score, 0);
    }

    #[test]
    fn test_ties_keep_first_match() {
        let words = vec![word("2023", 10, 10), word("2023", 900, 10)];
        let evidence = score_years(&result(words), 2024, 1000).unwrap();
        assert_eq!(evidence.bbox.x0, 10);
    }

    #[test]
    fn test_selected_year_always_plausible() {
        let mut rng = rand::thread_rng();
        for _ in 0..300 {
            let current = rng.gen_range(1995..2100);
            let words: Vec<RecognizedWord> = (0..rng.gen_range(0..12))
                .map(|i| {
                    let n: i32 = rng.gen_range(1800..2200);
                    word(&n.to_string(), i * 70, rng.gen_range(0..400))
                })
                .collect();

            if let Some(evidence) = score_years(&result(words), current, 400) {
                assert!(evidence.year >= 1990);
                assert!(evidence.year <= current + 1);
            }
        }
    }
}
