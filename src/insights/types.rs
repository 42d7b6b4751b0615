use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPerformance {
    pub subject: String,
    pub current_score: f64,
    pub previous_score: f64,
    pub trend: Trend,
    pub color: String,
    pub consistency_index: f64,
    pub learning_velocity: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Weakness,
    Improvement,
    Maintenance,
    Motivation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningRecommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub subject: String,
    pub action: String,
    #[serde(rename = "type")]
    pub kind: RecommendationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePrediction {
    pub week: String,
    pub predicted_score: f64,
    pub confidence: u32,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDistributionEntry {
    pub name: String,
    pub value: f64,
    pub color: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPattern {
    pub day: String,
    pub hours: f64,
    pub homework_completed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallPerformance {
    pub average_score: f64,
    pub previous_average: f64,
    pub improvement_rate: f64,
    pub consistency_index: f64,
    pub learning_velocity: f64,
    pub attendance_rate: Option<f64>,
    pub homework_completion_rate: f64,
    pub early_warnings: Vec<String>,
}

/// Durable per-student summary, replaced on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningInsights {
    pub student_id: String,
    pub subject: String,
    pub avg_score: f64,
    pub improvement_rate: f64,
    /// Weekly forecast band padded by 5 on each side: `[min - 5, max + 5]`,
    /// clamped to 0..=100. Not the bare min/max.
    pub predicted_next_score: (f64, f64),
    pub weak_topics: Vec<String>,
    pub recommendations: Vec<LearningRecommendation>,
    pub last_updated: DateTime<Utc>,
    pub consistency_index: f64,
    pub learning_velocity: f64,
}

/// Visualization projection read by dashboards without recomputing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsCache {
    pub student_id: String,
    pub overall_performance: OverallPerformance,
    pub subject_performance: Vec<SubjectPerformance>,
    pub study_patterns: Vec<StudyPattern>,
    pub performance_predictions: Vec<PerformancePrediction>,
    pub subject_distribution: Vec<SubjectDistributionEntry>,
    pub last_cached: DateTime<Utc>,
}

impl InsightsCache {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_cached) < ttl
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResult {
    pub insights: LearningInsights,
    pub visualization: InsightsCache,
    pub early_warnings: Vec<String>,
}
