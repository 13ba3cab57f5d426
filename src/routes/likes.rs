use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::models::{Polarity, VoteOutcome, VoteSummary, VoteTarget};
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiForm, CurrentUser};
use crate::state::AppState;
use crate::validation;

#[derive(Deserialize)]
pub struct LikeForm {
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
    pub is_like: Option<String>,
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub message: &'static str,
    pub outcome: VoteOutcome,
    #[serde(flatten)]
    pub summary: VoteSummary,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/like", post(toggle_like))
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

/// Exactly one of `post_id` / `comment_id` must be given.
fn parse_target(form_post: Option<String>, form_comment: Option<String>) -> AppResult<VoteTarget> {
    match (present(form_post), present(form_comment)) {
        (Some(post_id), None) => Ok(VoteTarget::Post(validation::id(&post_id, "post ID")?)),
        (None, Some(comment_id)) => Ok(VoteTarget::Comment(validation::id(
            &comment_id,
            "comment ID",
        )?)),
        (Some(_), Some(_)) => Err(AppError::Validation(
            "Provide either post_id or comment_id, not both".into(),
        )),
        (None, None) => Err(AppError::Validation(
            "Post ID or comment ID is required".into(),
        )),
    }
}

/// POST /api/like
async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiForm(form): ApiForm<LikeForm>,
) -> AppResult<Json<LikeResponse>> {
    let target = parse_target(form.post_id, form.comment_id)?;
    let Some(is_like) = present(form.is_like) else {
        return Err(AppError::Validation("is_like is required".into()));
    };
    let polarity = Polarity::from_is_like(validation::is_like(&is_like)?);

    let outcome = state.store.toggle_like(user.id, target, polarity)?;
    let summary = state.store.vote_summary(target, Some(user.id))?;

    Ok(Json(LikeResponse {
        message: "Like updated successfully",
        outcome,
        summary,
    }))
}
