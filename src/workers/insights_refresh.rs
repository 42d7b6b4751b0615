//! 夜间全量刷新：为所有有成绩记录的学生重新生成洞察

use chrono::Utc;

use crate::insights::{get_learning_insights, InsightsConfig};
use crate::store::Store;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
}

pub async fn run(store: &Store, config: &InsightsConfig) -> RefreshSummary {
    tracing::debug!("Insights refresh worker tick");

    let student_ids = match store.list_scored_student_ids() {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(error = %e, "Insights refresh: failed to list students");
            return RefreshSummary::default();
        }
    };

    let mut summary = RefreshSummary::default();
    for student_id in &student_ids {
        match get_learning_insights(store, config, student_id, Utc::now()) {
            Ok(_) => summary.refreshed += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(student_id = %student_id, error = %e, "Insights refresh failed");
            }
        }
        // 让出调度，避免长时间占用 worker 线程
        tokio::task::yield_now().await;
    }

    tracing::info!(
        refreshed = summary.refreshed,
        failed = summary.failed,
        "Insights refresh completed"
    );
    summary
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::store::operations::score_records::{RawScoreRecord, ScoreFields};

    fn mark(id: &str, student_id: &str, subject: &str, marks: f64) -> RawScoreRecord {
        RawScoreRecord {
            id: id.to_string(),
            student_id: student_id.to_string(),
            subject: subject.to_string(),
            topic: None,
            scores: ScoreFields {
                marks: Some(marks),
                ..Default::default()
            },
            uploaded_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn refresh_writes_insights_for_every_scored_student() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("refresh-db").to_str().unwrap()).unwrap();
        store.create_score_record(&mark("a1", "alice", "Math", 80.0)).unwrap();
        store.create_score_record(&mark("b1", "bob", "Science", 64.0)).unwrap();

        let summary = run(&store, &InsightsConfig::default()).await;

        assert_eq!(summary, RefreshSummary { refreshed: 2, failed: 0 });
        let alice = store.get_learning_insights("alice").unwrap().unwrap();
        assert_eq!(alice.avg_score, 80.0);
        assert!(store.get_insights_cache("bob").unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_store_refreshes_nothing() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("refresh-empty").to_str().unwrap()).unwrap();
        assert_eq!(
            run(&store, &InsightsConfig::default()).await,
            RefreshSummary::default()
        );
    }
}
