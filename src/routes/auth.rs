use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::cookie::{clear_session_cookie, cookie_value, session_cookie};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiForm, CurrentUser};
use crate::state::AppState;
use crate::validation;

// -- Forms --

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

/// POST /api/register
async fn register(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<RegisterForm>,
) -> AppResult<Response> {
    let (Some(username), Some(email), Some(password)) = (
        required(form.username),
        required(form.email),
        required(form.password),
    ) else {
        return Err(AppError::Validation("All fields are required".into()));
    };

    let username = validation::username(&username)?;
    let email = email.trim().to_string();
    if !validation::is_valid_email(&email) {
        return Err(AppError::Validation("Invalid email format".into()));
    }

    if state.store.user_by_email(&email)?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&password)?;
    let user = state.store.create_user(&username, &email, &password_hash)?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    )
        .into_response())
}

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> AppResult<Response> {
    let (Some(email), Some(password)) = (required(form.email), required(form.password)) else {
        return Err(AppError::Validation(
            "Email and password are required".into(),
        ));
    };

    let user = match state.store.user_by_email(email.trim())? {
        Some(user) if verify_password(&password, &user.password_hash) => user,
        _ => {
            tracing::warn!("Failed login attempt");
            return Err(AppError::InvalidCredentials);
        }
    };

    let session = state.sessions.login(user.id)?;
    tracing::info!(user_id = user.id, "user logged in");

    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            session_cookie(&state.config.auth, &session.token, state.sessions.ttl()),
        )],
        Json(json!({ "message": "Login successful" })),
    )
        .into_response())
}

/// POST /api/logout
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = cookie_value(&headers, &state.config.auth.cookie_name) {
        if let Err(e) = state.sessions.invalidate_session(token) {
            tracing::warn!("Failed to delete session on logout: {}", e);
        }
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie(&state.config.auth))],
        Json(json!({ "message": "Logout successful" })),
    )
        .into_response())
}

/// GET /api/user
async fn current_user(CurrentUser(user): CurrentUser) -> Json<serde_json::Value> {
    Json(json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "created": user.created,
    }))
}
