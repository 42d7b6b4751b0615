use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::extractors::{JsonBody, StudentId};
use crate::response::{created, ok, paginated, AppError};
use crate::state::AppState;
use crate::store::operations::attendance::AttendanceRecord;
use crate::store::operations::homework::{HomeworkRecord, HomeworkStatus};
use crate::store::operations::score_records::{RawScoreRecord, ScoreFields};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:student_id/marks", get(list_marks).post(create_mark))
        .route("/:student_id/homework", post(create_homework))
        .route("/:student_id/attendance", put(upsert_attendance))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMarksQuery {
    page: Option<u64>,
    per_page: Option<u64>,
}

impl ListMarksQuery {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }
    fn per_page(&self) -> u64 {
        self.per_page
            .unwrap_or(DEFAULT_PAGE_SIZE as u64)
            .clamp(1, MAX_PAGE_SIZE as u64)
    }
}

async fn list_marks(
    StudentId(student_id): StudentId,
    Query(q): Query<ListMarksQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let page = q.page();
    let per_page = q.per_page();
    let offset = page.saturating_sub(1).saturating_mul(per_page) as usize;
    let records = state
        .store()
        .get_score_records_page(&student_id, per_page as usize, offset)?;
    let total = state.store().count_score_records(&student_id)? as u64;
    Ok(paginated(records, total, page, per_page))
}

/// 兼容旧成绩字段：marks / score / unitTest1 / unitTest2 / halfYearly / final
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMarkRequest {
    subject: String,
    topic: Option<String>,
    #[serde(flatten)]
    scores: ScoreFields,
    uploaded_at: Option<DateTime<Utc>>,
}

async fn create_mark(
    StudentId(student_id): StudentId,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateMarkRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.scores.resolve().is_none() {
        return Err(AppError::bad_request(
            "VALIDATION_ERROR",
            "one of marks, score, unitTest1, unitTest2, halfYearly or final is required",
        ));
    }

    let record = RawScoreRecord {
        id: uuid::Uuid::new_v4().to_string(),
        student_id,
        subject: req.subject.trim().to_string(),
        topic: req
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        scores: req.scores,
        uploaded_at: Some(req.uploaded_at.unwrap_or_else(Utc::now)),
    };
    state.store().create_score_record(&record)?;

    tracing::debug!(
        student_id = %record.student_id,
        subject = %record.subject,
        "Score record created"
    );
    Ok(created(record))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateHomeworkRequest {
    subject: String,
    title: String,
    status: Option<HomeworkStatus>,
    due_date: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
}

async fn create_homework(
    StudentId(student_id): StudentId,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateHomeworkRequest>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let status = req.status.unwrap_or(HomeworkStatus::Pending);
    let submitted_at = match status {
        HomeworkStatus::Pending => req.submitted_at,
        _ => Some(req.submitted_at.unwrap_or(now)),
    };

    let record = HomeworkRecord {
        id: uuid::Uuid::new_v4().to_string(),
        student_id,
        subject: req.subject.trim().to_string(),
        title: req.title.trim().to_string(),
        status,
        due_date: req.due_date,
        submitted_at,
        created_at: now,
    };
    state.store().create_homework_record(&record)?;
    Ok(created(record))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertAttendanceRequest {
    present_days: u32,
    total_days: u32,
}

async fn upsert_attendance(
    StudentId(student_id): StudentId,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpsertAttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = AttendanceRecord {
        student_id,
        present_days: req.present_days,
        total_days: req.total_days,
        updated_at: Utc::now(),
    };
    state.store().set_attendance(&record)?;
    Ok(ok(record))
}
