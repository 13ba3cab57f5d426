use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extractors::{ApiForm, CurrentUser};
use crate::state::AppState;
use crate::validation;

#[derive(Deserialize)]
pub struct CreateCommentForm {
    pub post_id: Option<String>,
    pub content: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/comments", post(create_comment))
}

/// POST /api/comments
async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiForm(form): ApiForm<CreateCommentForm>,
) -> AppResult<Response> {
    let Some(post_id) = form.post_id.filter(|v| !v.trim().is_empty()) else {
        return Err(AppError::Validation("Post ID is required".into()));
    };
    let post_id = validation::id(&post_id, "post ID")?;
    let content = validation::comment_content(form.content.as_deref().unwrap_or_default())?;

    let comment_id = state.store.create_comment(post_id, user.id, &content)?;
    tracing::info!(comment_id, post_id, author_id = user.id, "comment created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment created successfully",
            "comment_id": comment_id,
        })),
    )
        .into_response())
}
