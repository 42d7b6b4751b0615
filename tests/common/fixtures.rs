use chrono::{DateTime, Duration, Utc};

use learning_insights::store::operations::attendance::AttendanceRecord;
use learning_insights::store::operations::homework::{HomeworkRecord, HomeworkStatus};
use learning_insights::store::operations::score_records::{RawScoreRecord, ScoreFields};
use learning_insights::store::Store;

/// Seeds `scores` for one subject, first entry newest, one day apart.
pub fn seed_subject(
    store: &Store,
    student_id: &str,
    subject: &str,
    scores: &[f64],
    newest: DateTime<Utc>,
) -> Vec<RawScoreRecord> {
    scores
        .iter()
        .enumerate()
        .map(|(idx, marks)| {
            let record = RawScoreRecord {
                id: uuid::Uuid::new_v4().to_string(),
                student_id: student_id.to_string(),
                subject: subject.to_string(),
                topic: None,
                scores: ScoreFields {
                    marks: Some(*marks),
                    ..Default::default()
                },
                uploaded_at: Some(newest - Duration::days(idx as i64)),
            };
            store.create_score_record(&record).expect("seed score record");
            record
        })
        .collect()
}

pub fn seed_topic(store: &Store, student_id: &str, subject: &str, topic: &str, scores: &[f64]) {
    let now = Utc::now();
    for (idx, score) in scores.iter().enumerate() {
        let record = RawScoreRecord {
            id: uuid::Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            subject: subject.to_string(),
            topic: Some(topic.to_string()),
            scores: ScoreFields {
                score: Some(*score),
                ..Default::default()
            },
            uploaded_at: Some(now - Duration::hours(idx as i64 + 1)),
        };
        store.create_score_record(&record).expect("seed topic record");
    }
}

pub fn seed_homework(store: &Store, student_id: &str, title: &str, status: HomeworkStatus) {
    let now = Utc::now();
    let record = HomeworkRecord {
        id: uuid::Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        subject: "Math".to_string(),
        title: title.to_string(),
        status,
        due_date: None,
        submitted_at: (status != HomeworkStatus::Pending).then_some(now),
        created_at: now,
    };
    store.create_homework_record(&record).expect("seed homework");
}

pub fn seed_attendance(store: &Store, student_id: &str, present_days: u32, total_days: u32) {
    store
        .set_attendance(&AttendanceRecord {
            student_id: student_id.to_string(),
            present_days,
            total_days,
            updated_at: Utc::now(),
        })
        .expect("seed attendance");
}
