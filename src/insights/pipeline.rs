use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::insights::aggregate::{subject_performance, weak_topics};
use crate::insights::config::InsightsConfig;
use crate::insights::distribution::{early_warnings, subject_distribution};
use crate::insights::metrics::{mean, round2};
use crate::insights::patterns::{homework_completion_rate, study_patterns};
use crate::insights::predictions::{clamp_score, overall_current, predict_performance};
use crate::insights::recommendations::generate_recommendations;
use crate::insights::types::{
    InsightsCache, InsightsResult, LearningInsights, OverallPerformance, PerformancePrediction,
    SubjectPerformance,
};
use crate::store::operations::attendance::AttendanceRecord;
use crate::store::operations::homework::HomeworkRecord;
use crate::store::operations::score_records::RawScoreRecord;
use crate::store::StoreError;

pub const OVERALL_SUBJECT: &str = "Overall";

/// Spread added around the weekly forecast for `predictedNextScore`.
const PREDICTION_SPREAD: f64 = 5.0;

/// Document-store operations the pipeline depends on.
pub trait InsightsRepository {
    /// Every record of the student, newest-first.
    fn fetch_score_records(&self, student_id: &str) -> Result<Vec<RawScoreRecord>, StoreError>;

    fn fetch_homework_records(&self, student_id: &str)
        -> Result<Vec<HomeworkRecord>, StoreError>;

    fn fetch_attendance_record(
        &self,
        student_id: &str,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    fn write_insights(&self, insights: &LearningInsights) -> Result<(), StoreError>;

    fn write_insights_cache(&self, cache: &InsightsCache) -> Result<(), StoreError>;

    fn read_insights_cache(&self, student_id: &str) -> Result<Option<InsightsCache>, StoreError>;
}

#[derive(Debug, Error)]
pub enum InsightsGenerationError {
    #[error("insights generation failed: could not fetch {what}: {source}")]
    Fetch {
        what: &'static str,
        source: StoreError,
    },
    #[error("insights generation failed: could not persist {what}: {source}")]
    Persist {
        what: &'static str,
        source: StoreError,
    },
}

fn fetch_failed(what: &'static str) -> impl FnOnce(StoreError) -> InsightsGenerationError {
    move |source| InsightsGenerationError::Fetch { what, source }
}

fn persist_failed(what: &'static str) -> impl FnOnce(StoreError) -> InsightsGenerationError {
    move |source| InsightsGenerationError::Persist { what, source }
}

fn predicted_range(predictions: &[PerformancePrediction]) -> (f64, f64) {
    let weekly = predictions.iter().skip(1).map(|p| p.predicted_score);
    let min = weekly.clone().fold(f64::INFINITY, f64::min);
    let max = weekly.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 0.0);
    }
    (
        clamp_score(min - PREDICTION_SPREAD),
        clamp_score(max + PREDICTION_SPREAD),
    )
}

fn improvement_rate(current: f64, previous: f64) -> f64 {
    if previous <= 0.0 {
        return 0.0;
    }
    round2((current - previous) / previous * 100.0)
}

fn subject_mean<F>(subjects: &[SubjectPerformance], metric: F) -> f64
where
    F: Fn(&SubjectPerformance) -> f64,
{
    let values: Vec<f64> = subjects.iter().map(metric).collect();
    round2(mean(&values))
}

/// Pure part of the pipeline: derive both documents from raw records.
pub fn build_insights(
    student_id: &str,
    scores: &[RawScoreRecord],
    homework: &[HomeworkRecord],
    attendance: Option<&AttendanceRecord>,
    config: &InsightsConfig,
    now: DateTime<Utc>,
) -> InsightsResult {
    let subjects = subject_performance(scores, now);
    let topics = weak_topics(scores, config.min_topic_samples);
    let recommendations = generate_recommendations(&subjects, &topics);
    let predictions = predict_performance(&subjects);
    let distribution = subject_distribution(&subjects);
    let warnings = early_warnings(&subjects);
    let patterns = study_patterns(student_id, homework);

    let current = round2(overall_current(&subjects));
    let previous = subject_mean(&subjects, |s| s.previous_score);
    let improvement = improvement_rate(current, previous);
    let consistency = subject_mean(&subjects, |s| s.consistency_index);
    let velocity = subject_mean(&subjects, |s| s.learning_velocity);

    let insights = LearningInsights {
        student_id: student_id.to_string(),
        subject: OVERALL_SUBJECT.to_string(),
        avg_score: current,
        improvement_rate: improvement,
        predicted_next_score: predicted_range(&predictions),
        weak_topics: topics,
        recommendations,
        last_updated: now,
        consistency_index: consistency,
        learning_velocity: velocity,
    };

    let visualization = InsightsCache {
        student_id: student_id.to_string(),
        overall_performance: OverallPerformance {
            average_score: current,
            previous_average: previous,
            improvement_rate: improvement,
            consistency_index: consistency,
            learning_velocity: velocity,
            attendance_rate: attendance.map(AttendanceRecord::rate),
            homework_completion_rate: homework_completion_rate(homework),
            early_warnings: warnings.clone(),
        },
        subject_performance: subjects,
        study_patterns: patterns,
        performance_predictions: predictions,
        subject_distribution: distribution,
        last_cached: now,
    };

    InsightsResult {
        insights,
        visualization,
        early_warnings: warnings,
    }
}

/// Fetch, derive, persist both documents, and return the combined result.
///
/// The insight record is written before the cache. The two writes are not
/// atomic: a failure in between leaves a fresh insight record next to the
/// previous cache document.
pub fn get_learning_insights<R>(
    repo: &R,
    config: &InsightsConfig,
    student_id: &str,
    now: DateTime<Utc>,
) -> Result<InsightsResult, InsightsGenerationError>
where
    R: InsightsRepository + ?Sized,
{
    let scores = repo
        .fetch_score_records(student_id)
        .map_err(fetch_failed("score records"))?;
    let homework = repo
        .fetch_homework_records(student_id)
        .map_err(fetch_failed("homework records"))?;
    let attendance = repo
        .fetch_attendance_record(student_id)
        .map_err(fetch_failed("attendance record"))?;

    let result = build_insights(
        student_id,
        &scores,
        &homework,
        attendance.as_ref(),
        config,
        now,
    );

    repo.write_insights(&result.insights)
        .map_err(persist_failed("learning insights"))?;
    repo.write_insights_cache(&result.visualization)
        .map_err(persist_failed("insights cache"))?;

    tracing::info!(
        student_id,
        score_records = scores.len(),
        subjects = result.visualization.subject_performance.len(),
        warnings = result.early_warnings.len(),
        "Learning insights generated"
    );

    Ok(result)
}

/// Cached visualization data if it is younger than the configured TTL.
///
/// Read failures are logged and reported as a miss.
pub fn get_cached_insights<R>(
    repo: &R,
    config: &InsightsConfig,
    student_id: &str,
    now: DateTime<Utc>,
) -> Option<InsightsCache>
where
    R: InsightsRepository + ?Sized,
{
    match repo.read_insights_cache(student_id) {
        Ok(Some(cache)) if cache.is_fresh(now, config.cache_ttl()) => Some(cache),
        Ok(Some(cache)) => {
            tracing::debug!(
                student_id,
                last_cached = %cache.last_cached,
                "Insights cache expired"
            );
            None
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(student_id, error = %e, "Failed to read insights cache");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::Duration;

    use super::*;
    use crate::insights::types::{Priority, RecommendationType, Trend};
    use crate::store::operations::homework::HomeworkStatus;
    use crate::store::operations::score_records::ScoreFields;

    #[derive(Default)]
    struct FakeRepo {
        scores: Vec<RawScoreRecord>,
        homework: Vec<HomeworkRecord>,
        attendance: Option<AttendanceRecord>,
        fail_fetch: Option<&'static str>,
        fail_write: Option<&'static str>,
        fail_read: bool,
        insights: RefCell<Option<LearningInsights>>,
        cache: RefCell<Option<InsightsCache>>,
    }

    fn boom() -> StoreError {
        StoreError::Validation("boom".to_string())
    }

    impl InsightsRepository for FakeRepo {
        fn fetch_score_records(&self, _: &str) -> Result<Vec<RawScoreRecord>, StoreError> {
            if self.fail_fetch == Some("scores") {
                return Err(boom());
            }
            Ok(self.scores.clone())
        }

        fn fetch_homework_records(&self, _: &str) -> Result<Vec<HomeworkRecord>, StoreError> {
            if self.fail_fetch == Some("homework") {
                return Err(boom());
            }
            Ok(self.homework.clone())
        }

        fn fetch_attendance_record(&self, _: &str) -> Result<Option<AttendanceRecord>, StoreError> {
            if self.fail_fetch == Some("attendance") {
                return Err(boom());
            }
            Ok(self.attendance.clone())
        }

        fn write_insights(&self, insights: &LearningInsights) -> Result<(), StoreError> {
            if self.fail_write == Some("insights") {
                return Err(boom());
            }
            *self.insights.borrow_mut() = Some(insights.clone());
            Ok(())
        }

        fn write_insights_cache(&self, cache: &InsightsCache) -> Result<(), StoreError> {
            if self.fail_write == Some("cache") {
                return Err(boom());
            }
            *self.cache.borrow_mut() = Some(cache.clone());
            Ok(())
        }

        fn read_insights_cache(&self, _: &str) -> Result<Option<InsightsCache>, StoreError> {
            if self.fail_read {
                return Err(boom());
            }
            Ok(self.cache.borrow().clone())
        }
    }

    fn score(subject: &str, marks: f64, at: DateTime<Utc>) -> RawScoreRecord {
        RawScoreRecord {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: "s1".to_string(),
            subject: subject.to_string(),
            topic: None,
            scores: ScoreFields {
                marks: Some(marks),
                ..Default::default()
            },
            uploaded_at: Some(at),
        }
    }

    fn two_subject_records(now: DateTime<Utc>) -> Vec<RawScoreRecord> {
        let math = [90.0, 88.0, 92.0, 85.0, 91.0, 70.0, 72.0, 68.0, 71.0, 69.0];
        let science = [60.0, 62.0, 58.0, 80.0, 82.0, 79.0];
        let mut records: Vec<RawScoreRecord> = math
            .iter()
            .enumerate()
            .map(|(i, s)| score("Math", *s, now - Duration::days(i as i64)))
            .collect();
        records.extend(
            science
                .iter()
                .enumerate()
                .map(|(i, s)| score("Science", *s, now - Duration::days(i as i64))),
        );
        records
    }

    #[test]
    fn end_to_end_math_example() {
        let now = Utc::now();
        let repo = FakeRepo {
            scores: two_subject_records(now),
            ..Default::default()
        };

        let result = get_learning_insights(&repo, &InsightsConfig::default(), "s1", now).unwrap();

        let math = &result.visualization.subject_performance[0];
        assert_eq!(math.subject, "Math");
        assert_eq!(math.trend, Trend::Up);
        assert_eq!(math.color, "#10b981");

        let maintenance = result
            .insights
            .recommendations
            .iter()
            .find(|r| r.kind == RecommendationType::Maintenance)
            .expect("maintenance recommendation");
        assert_eq!(maintenance.title, "Maintain Excellence in Math");
        assert_eq!(maintenance.priority, Priority::Low);

        assert_eq!(result.insights.subject, "Overall");
        assert_eq!(result.visualization.performance_predictions.len(), 5);
        assert_eq!(repo.insights.borrow().as_ref(), Some(&result.insights));
        assert_eq!(repo.cache.borrow().as_ref(), Some(&result.visualization));
    }

    #[test]
    fn overall_figures_are_subject_means() {
        let now = Utc::now();
        let result = build_insights(
            "s1",
            &two_subject_records(now),
            &[],
            None,
            &InsightsConfig::default(),
            now,
        );
        // Math 89/70, Science current round(68.4)=68 previous 79
        assert_eq!(result.insights.avg_score, 78.5);
        assert_eq!(result.visualization.overall_performance.previous_average, 74.5);
        assert_eq!(result.insights.improvement_rate, 5.37);
        assert_eq!(result.early_warnings, vec!["Science: 14% decline".to_string()]);
        assert!(result.visualization.overall_performance.attendance_rate.is_none());
    }

    #[test]
    fn predicted_range_wraps_weekly_forecast() {
        let now = Utc::now();
        let result = build_insights(
            "s1",
            &two_subject_records(now),
            &[],
            None,
            &InsightsConfig::default(),
            now,
        );
        let week1 = result.visualization.performance_predictions[1].predicted_score;
        assert_eq!(
            result.insights.predicted_next_score,
            (week1 - 5.0, (week1 + 5.0).min(100.0))
        );
    }

    #[test]
    fn empty_sources_still_produce_a_result() {
        let now = Utc::now();
        let repo = FakeRepo::default();
        let result = get_learning_insights(&repo, &InsightsConfig::default(), "s1", now).unwrap();

        assert!(result.visualization.subject_performance.is_empty());
        assert_eq!(result.insights.recommendations.len(), 1);
        assert_eq!(
            result.insights.recommendations[0].title,
            "Consistent Study Schedule"
        );
        assert_eq!(result.insights.avg_score, 0.0);
        assert_eq!(result.visualization.study_patterns.len(), 7);
    }

    #[test]
    fn attendance_and_homework_feed_overall_performance() {
        let now = Utc::now();
        let repo = FakeRepo {
            homework: vec![HomeworkRecord {
                id: "h1".to_string(),
                student_id: "s1".to_string(),
                subject: "Math".to_string(),
                title: "Sheet".to_string(),
                status: HomeworkStatus::Submitted,
                due_date: None,
                submitted_at: Some(now),
                created_at: now,
            }],
            attendance: Some(AttendanceRecord {
                student_id: "s1".to_string(),
                present_days: 9,
                total_days: 10,
                updated_at: now,
            }),
            ..Default::default()
        };
        let result = get_learning_insights(&repo, &InsightsConfig::default(), "s1", now).unwrap();
        let overall = &result.visualization.overall_performance;
        assert_eq!(overall.attendance_rate, Some(90.0));
        assert_eq!(overall.homework_completion_rate, 100.0);
    }

    #[test]
    fn fetch_failures_abort_without_writes() {
        for source in ["scores", "homework", "attendance"] {
            let repo = FakeRepo {
                fail_fetch: Some(source),
                ..Default::default()
            };
            let err = get_learning_insights(&repo, &InsightsConfig::default(), "s1", Utc::now())
                .unwrap_err();
            assert!(matches!(err, InsightsGenerationError::Fetch { .. }));
            assert!(err.to_string().starts_with("insights generation failed"));
            assert!(repo.insights.borrow().is_none());
            assert!(repo.cache.borrow().is_none());
        }
    }

    #[test]
    fn cache_write_failure_leaves_insights_written() {
        // 两次写入之间失败时，insights 已落盘而 cache 未更新
        let repo = FakeRepo {
            fail_write: Some("cache"),
            ..Default::default()
        };
        let err = get_learning_insights(&repo, &InsightsConfig::default(), "s1", Utc::now())
            .unwrap_err();
        assert!(matches!(err, InsightsGenerationError::Persist { what: "insights cache", .. }));
        assert!(repo.insights.borrow().is_some());
        assert!(repo.cache.borrow().is_none());
    }

    #[test]
    fn cache_freshness_window() {
        let now = Utc::now();
        let repo = FakeRepo::default();
        let config = InsightsConfig::default();
        let generated_at = now - Duration::minutes(59);
        get_learning_insights(&repo, &config, "s1", generated_at).unwrap();

        assert!(get_cached_insights(&repo, &config, "s1", now).is_some());
        let later = generated_at + Duration::minutes(61);
        assert!(get_cached_insights(&repo, &config, "s1", later).is_none());
    }

    #[test]
    fn cache_read_failure_is_a_miss() {
        let repo = FakeRepo {
            fail_read: true,
            ..Default::default()
        };
        assert!(get_cached_insights(&repo, &InsightsConfig::default(), "s1", Utc::now()).is_none());
    }
}
