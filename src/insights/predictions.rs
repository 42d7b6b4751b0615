use crate::insights::metrics::{mean, round_half_up};
use crate::insights::types::{PerformancePrediction, SubjectPerformance, Trend};

pub const FORECAST_WEEKS: u32 = 4;

const MAX_TREND_BONUS: f64 = 5.0;
const CONSISTENCY_BONUS: f64 = 2.0;
const HIGH_CONSISTENCY: f64 = 70.0;
const LOW_CONSISTENCY: f64 = 30.0;
const MAX_VELOCITY_BONUS: f64 = 3.0;
const VELOCITY_THRESHOLD: f64 = 0.5;
const MIN_CONFIDENCE: u32 = 50;

/// Additive correction applied on top of the current overall score.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastAdjustment {
    pub delta: f64,
    pub reasons: Vec<String>,
}

impl ForecastAdjustment {
    pub fn from_subjects(subjects: &[SubjectPerformance]) -> Self {
        let mut delta = 0.0;
        let mut reasons = Vec::new();

        let improving = subjects.iter().filter(|s| s.trend == Trend::Up).count();
        let declining = subjects.iter().filter(|s| s.trend == Trend::Down).count();
        if improving > declining {
            delta += MAX_TREND_BONUS.min(round_half_up(improving as f64 * 0.5));
            reasons.push(format!("{improving} subject(s) improving"));
        } else if declining > improving {
            delta -= MAX_TREND_BONUS.min(round_half_up(declining as f64 * 0.5));
            reasons.push(format!("{declining} subject(s) declining"));
        }

        let consistencies: Vec<f64> = subjects.iter().map(|s| s.consistency_index).collect();
        let avg_consistency = mean(&consistencies);
        if avg_consistency > HIGH_CONSISTENCY {
            delta += CONSISTENCY_BONUS;
            reasons.push("consistent performance".to_string());
        } else if avg_consistency < LOW_CONSISTENCY {
            delta -= CONSISTENCY_BONUS;
            reasons.push("inconsistent performance".to_string());
        }

        let velocities: Vec<f64> = subjects.iter().map(|s| s.learning_velocity).collect();
        let avg_velocity = mean(&velocities);
        if avg_velocity > VELOCITY_THRESHOLD {
            delta += MAX_VELOCITY_BONUS.min(round_half_up(avg_velocity * 2.0));
            reasons.push("positive learning velocity".to_string());
        } else if avg_velocity < -VELOCITY_THRESHOLD {
            delta -= MAX_VELOCITY_BONUS.min(round_half_up(avg_velocity.abs() * 2.0));
            reasons.push("negative learning velocity".to_string());
        }

        Self { delta, reasons }
    }

    pub fn explanation(&self) -> String {
        if self.reasons.is_empty() {
            "Based on current performance".to_string()
        } else {
            self.reasons.join(", ")
        }
    }
}

pub fn confidence_for_week(week_index: u32) -> u32 {
    100u32.saturating_sub(10 * week_index).max(MIN_CONFIDENCE)
}

pub fn clamp_score(score: f64) -> f64 {
    round_half_up(score.clamp(0.0, 100.0))
}

/// Mean of every subject's current score, 0 without subjects.
pub fn overall_current(subjects: &[SubjectPerformance]) -> f64 {
    let scores: Vec<f64> = subjects.iter().map(|s| s.current_score).collect();
    mean(&scores)
}

/// `Current` followed by `Week 1..=4`.
///
/// Every week applies the same adjustment to the same base, so the weekly
/// scores are identical; only the confidence decays.
pub fn predict_performance(subjects: &[SubjectPerformance]) -> Vec<PerformancePrediction> {
    let base = overall_current(subjects);
    let adjustment = ForecastAdjustment::from_subjects(subjects);
    let explanation = adjustment.explanation();

    let mut out = Vec::with_capacity(FORECAST_WEEKS as usize + 1);
    out.push(PerformancePrediction {
        week: "Current".to_string(),
        predicted_score: clamp_score(base),
        confidence: confidence_for_week(0),
        explanation: "Current average across subjects".to_string(),
    });
    for week in 1..=FORECAST_WEEKS {
        out.push(PerformancePrediction {
            week: format!("Week {week}"),
            predicted_score: clamp_score(base + adjustment.delta),
            confidence: confidence_for_week(week),
            explanation: explanation.clone(),
        });
    }
    out
}
