//! Support tickets and anonymous exit feedback.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use domains::{DeviceType, ExitFeedback, ExitReason, ExitTrigger};

use crate::error::ApiResult;
use crate::extract::AuthUser;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub subject: String,
    pub body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitFeedbackRequest {
    pub session_id: String,
    pub reason: ExitReason,
    pub comment: Option<String>,
    pub completion_percent: i32,
    #[serde(default)]
    pub completed_fields: Vec<String>,
    pub exit_trigger: ExitTrigger,
    pub device: DeviceType,
    #[serde(default)]
    pub wanted_help: bool,
}

pub async fn contact_admin(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<ContactRequest>,
) -> ApiResult<impl IntoResponse> {
    let message = state
        .support
        .contact_admin(user.id, &req.subject, &req.body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "message sent", "ticket": message })),
    ))
}

pub async fn my_messages(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let messages = state.support.my_messages(user.id).await?;
    Ok(Json(json!({ "messages": messages })))
}

/// Anonymous; duplicates from the same session are reported, not rejected.
pub async fn submit_exit_feedback(
    State(state): State<AppState>,
    Json(req): Json<ExitFeedbackRequest>,
) -> ApiResult<impl IntoResponse> {
    let inserted = state
        .support
        .submit_exit_feedback(ExitFeedback {
            session_id: req.session_id,
            reason: req.reason,
            comment: req.comment,
            completion_percent: req.completion_percent,
            completed_fields: req.completed_fields,
            exit_trigger: req.exit_trigger,
            device: req.device,
            wanted_help: req.wanted_help,
            created_at: Utc::now(),
        })
        .await?;
    Ok(Json(json!({
        "message": "feedback recorded",
        "alreadySubmitted": !inserted,
    })))
}

pub async fn check_exit_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let exists = state.support.feedback_exists(&session_id).await?;
    Ok(Json(json!({ "submitted": exists })))
}
