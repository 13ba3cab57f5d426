use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::db::models::Category;
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/categories", get(list_categories))
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.store.list_categories()?))
}
