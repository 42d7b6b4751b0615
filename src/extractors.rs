use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::response::AppError;

const MAX_STUDENT_ID_LEN: usize = 128;

/// A wrapper around `axum::Json<T>` that returns `AppError` on deserialization failure
/// instead of Axum's default plain-text rejection.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection_to_app_error(rejection)),
        }
    }
}

fn json_rejection_to_app_error(rejection: JsonRejection) -> AppError {
    let reason = match &rejection {
        JsonRejection::JsonDataError(_) => "request body has invalid fields",
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => "expected application/json body",
        JsonRejection::BytesRejection(_) => "failed to read request body",
        _ => "invalid request body",
    };
    tracing::warn!(error = %rejection, reason, "Rejected JSON body");
    AppError::bad_request("INVALID_REQUEST_BODY", reason)
}

/// `{student_id}` path segment, validated so it can be used as a store key.
#[derive(Debug, Clone)]
pub struct StudentId(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for StudentId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("INVALID_STUDENT_ID", "missing student id"))?;
        let id = raw.trim();
        if !is_valid_student_id(id) {
            return Err(AppError::bad_request(
                "INVALID_STUDENT_ID",
                "student id must be 1-128 characters of letters, digits, '-', '_' or '.'",
            ));
        }
        Ok(StudentId(id.to_string()))
    }
}

fn is_valid_student_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_STUDENT_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}
