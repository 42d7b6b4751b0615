use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::constants::{
    COLOR_MODERATE, COLOR_STRONG, COLOR_WEAK, PASSING_SCORE, SCORE_WINDOW, STRONG_SCORE,
    TREND_THRESHOLD,
};
use crate::insights::metrics::{consistency_index, learning_velocity, mean, round_half_up};
use crate::insights::types::{SubjectPerformance, Trend};
use crate::store::operations::score_records::RawScoreRecord;

pub fn classify_trend(current: f64, previous: f64) -> Trend {
    if current > previous + TREND_THRESHOLD {
        Trend::Up
    } else if current < previous - TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Stable
    }
}

pub fn score_color(current: f64) -> &'static str {
    if current >= STRONG_SCORE {
        COLOR_STRONG
    } else if current < PASSING_SCORE {
        COLOR_WEAK
    } else {
        COLOR_MODERATE
    }
}

/// Groups items by key, keeping first-occurrence order of keys and source
/// order within each group.
fn group_in_order<'a, T, F>(items: &'a [T], key_of: F) -> Vec<(&'a str, Vec<&'a T>)>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&T>)> = Vec::new();
    for item in items {
        let Some(key) = key_of(item) else {
            continue;
        };
        match index.get(key) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                index.insert(key, groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

/// Per-subject performance from newest-first score records.
///
/// Records are not re-sorted; the store hands them out newest-first and the
/// current/previous windows depend on that order. Records without an upload
/// time are treated as uploaded at `now`.
pub fn subject_performance(records: &[RawScoreRecord], now: DateTime<Utc>) -> Vec<SubjectPerformance> {
    group_in_order(records, |r| Some(r.subject.as_str()))
        .into_iter()
        .map(|(subject, group)| {
            let recent: Vec<&RawScoreRecord> = group.iter().take(SCORE_WINDOW).copied().collect();
            let recent_scores: Vec<f64> = recent.iter().map(|r| r.resolved_score()).collect();
            let older_scores: Vec<f64> = group
                .iter()
                .skip(SCORE_WINDOW)
                .take(SCORE_WINDOW)
                .map(|r| r.resolved_score())
                .collect();
            // Store 写入时已补齐上传时间，这里只兜底内存中的未落库记录
            let recent_times: Vec<f64> = recent
                .iter()
                .map(|r| r.uploaded_at.unwrap_or(now).timestamp_millis() as f64)
                .collect();

            let current_score = round_half_up(mean(&recent_scores));
            let previous_score = round_half_up(mean(&older_scores));

            SubjectPerformance {
                subject: subject.to_string(),
                current_score,
                previous_score,
                trend: classify_trend(current_score, previous_score),
                color: score_color(current_score).to_string(),
                consistency_index: consistency_index(&recent_scores),
                learning_velocity: learning_velocity(&recent_scores, &recent_times),
            }
        })
        .collect()
}

/// Topics whose mean score is below the passing line.
///
/// Records without a topic are skipped. `min_samples` gates how many
/// observations a topic needs before it can be reported.
pub fn weak_topics(records: &[RawScoreRecord], min_samples: usize) -> Vec<String> {
    group_in_order(records, |r| {
        r.topic.as_deref().map(str::trim).filter(|t| !t.is_empty())
    })
    .into_iter()
    .filter(|(_, group)| group.len() >= min_samples.max(1))
    .filter(|(_, group)| {
        let scores: Vec<f64> = group.iter().map(|r| r.resolved_score()).collect();
        mean(&scores) < PASSING_SCORE
    })
    .map(|(topic, _)| topic.to_string())
    .collect()
}
