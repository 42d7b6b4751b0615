use crate::constants::{
    COLOR_MODERATE, COLOR_STRONG, COLOR_WEAK, EARLY_WARNING_DROP, PASSING_SCORE, STRONG_SCORE,
};
use crate::insights::metrics::round_half_up;
use crate::insights::types::{SubjectDistributionEntry, SubjectPerformance};

pub fn subject_distribution(subjects: &[SubjectPerformance]) -> Vec<SubjectDistributionEntry> {
    let total = subjects.len();
    let strong = subjects
        .iter()
        .filter(|s| s.current_score >= STRONG_SCORE)
        .count();
    let weak = subjects
        .iter()
        .filter(|s| s.current_score < PASSING_SCORE)
        .count();
    let moderate = total - strong - weak;

    let percent = |count: usize| {
        if total == 0 {
            0.0
        } else {
            round_half_up(count as f64 / total as f64 * 100.0)
        }
    };

    [
        ("Strong", strong, COLOR_STRONG),
        ("Moderate", moderate, COLOR_MODERATE),
        ("Needs Work", weak, COLOR_WEAK),
    ]
    .into_iter()
    .map(|(name, count, color)| SubjectDistributionEntry {
        name: name.to_string(),
        value: percent(count),
        color: color.to_string(),
        count,
    })
    .collect()
}

/// `"{subject}: {n}% decline"` for every subject whose current average fell
/// at least 10% below its previous average.
pub fn early_warnings(subjects: &[SubjectPerformance]) -> Vec<String> {
    subjects
        .iter()
        .filter(|s| s.previous_score > 0.0)
        .filter_map(|s| {
            let drop = (s.previous_score - s.current_score) / s.previous_score;
            (drop >= EARLY_WARNING_DROP)
                .then(|| format!("{}: {}% decline", s.subject, round_half_up(drop * 100.0)))
        })
        .collect()
}
