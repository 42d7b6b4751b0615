//! Numeric primitives shared by the aggregators and derivers.

use crate::constants::MILLIS_PER_DAY;

/// Rounds halves towards positive infinity (dashboards expect `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub fn round1(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

pub fn round2(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `100 - population variance`, rounded to 2 decimals.
///
/// Not clamped: a spread with variance above 100 yields a negative index.
/// Fewer than two scores have no meaningful variance and return 0.
pub fn consistency_index(scores: &[f64]) -> f64 {
    if scores.len() < 2 {
        return 0.0;
    }
    let avg = mean(scores);
    let variance = scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / scores.len() as f64;
    round2(100.0 - variance)
}

/// Least-squares slope of score over time, in points per day.
///
/// `scores[i]` must be paired with `timestamps_ms[i]`; the input is not
/// sorted. Returns 0 for fewer than two points, mismatched lengths, or when
/// every timestamp is identical.
pub fn learning_velocity(scores: &[f64], timestamps_ms: &[f64]) -> f64 {
    let n = scores.len();
    if n < 2 || n != timestamps_ms.len() {
        return 0.0;
    }

    // 先中心化时间轴，避免毫秒时间戳平方后的精度损失
    let x_mean = mean(timestamps_ms);
    let y_mean = mean(scores);
    let mut covariance = 0.0;
    let mut x_variance = 0.0;
    for (x, y) in timestamps_ms.iter().zip(scores) {
        let dx = x - x_mean;
        covariance += dx * (y - y_mean);
        x_variance += dx * dx;
    }

    if x_variance == 0.0 {
        return 0.0;
    }

    round2(covariance / x_variance * MILLIS_PER_DAY)
}
