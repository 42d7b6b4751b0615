use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;

use crate::extractors::StudentId;
use crate::insights::{get_cached_insights, get_learning_insights};
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::store::StoreError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:student_id", get(generate_insights))
        .route("/:student_id/cached", get(cached_insights))
        .route("/:student_id/latest", get(latest_insights))
}

/// 全量重算并落库，返回 `{insights, visualization, earlyWarnings}`
async fn generate_insights(
    StudentId(student_id): StudentId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let result = get_learning_insights(state.store(), state.insights(), &student_id, Utc::now())?;
    Ok(ok(result))
}

async fn cached_insights(
    StudentId(student_id): StudentId,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ok(get_cached_insights(
        state.store(),
        state.insights(),
        &student_id,
        Utc::now(),
    ))
}

async fn latest_insights(
    StudentId(student_id): StudentId,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let insights = state
        .store()
        .get_learning_insights(&student_id)?
        .ok_or_else(|| StoreError::NotFound {
            entity: "learning insights".to_string(),
            key: student_id.clone(),
        })?;
    Ok(ok(insights))
}
