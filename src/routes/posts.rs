use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::db::categories::FALLBACK_CATEGORY;
use crate::db::models::{NewPost, Post, PostFilter};
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiForm, CurrentUser, MaybeUser};
use crate::state::AppState;
use crate::validation;

// --- Forms ---

#[derive(Deserialize)]
pub struct PostsQuery {
    pub filter: Option<String>,
    pub value: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePostForm {
    pub title: Option<String>,
    pub content: Option<String>,
    pub categories: Option<String>,
}

// --- Router ---

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/post/{id}", get(show_post))
}

// --- Handlers ---

/// GET /api/posts?filter=category|created|liked&value=...
async fn list_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<PostsQuery>,
) -> AppResult<Json<Vec<Post>>> {
    let filter = PostFilter::from_query(query.filter.as_deref(), query.value.as_deref());
    if filter.requires_viewer() && viewer.0.is_none() {
        return Err(AppError::AuthRequired);
    }

    let posts = state.store.list_posts(viewer.id(), &filter)?;
    tracing::debug!(?filter, count = posts.len(), "listed posts");
    Ok(Json(posts))
}

/// POST /api/posts
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiForm(form): ApiForm<CreatePostForm>,
) -> AppResult<Response> {
    let title = validation::post_title(form.title.as_deref().unwrap_or_default())?;
    let content = validation::post_content(form.content.as_deref().unwrap_or_default())?;
    let names = validation::category_names(form.categories.as_deref().unwrap_or_default())?;

    let mut category_ids: Vec<i64> = state
        .store
        .categories_by_name(&names)?
        .into_iter()
        .map(|c| c.id)
        .collect();
    if category_ids.is_empty() {
        category_ids.push(state.store.ensure_category(FALLBACK_CATEGORY)?);
    }

    let post_id = state.store.create_post(&NewPost {
        title,
        content,
        author_id: user.id,
        category_ids,
    })?;
    tracing::info!(post_id, author_id = user.id, "post created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Post created successfully",
            "post_id": post_id,
        })),
    )
        .into_response())
}

/// GET /api/post/{id}
async fn show_post(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let post_id = validation::id(&id, "post ID")?;

    let post = state
        .store
        .get_post(viewer.id(), post_id)?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
    let comments = state.store.list_comments(post_id, viewer.id())?;

    Ok(Json(json!({
        "post": post,
        "comments": comments,
    })))
}
