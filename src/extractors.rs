use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Form;
use serde::de::DeserializeOwned;

use crate::auth::cookie::cookie_value;
use crate::auth::SessionError;
use crate::db::models::User;
use crate::error::AppError;
use crate::state::AppState;

/// The user owning the request's session cookie.
/// Rejects with 401 when the cookie is missing, unknown, or expired.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_value(&parts.headers, &state.config.auth.cookie_name)
            .ok_or(AppError::AuthRequired)?;

        match state.sessions.resolve_session(token) {
            Ok(user) => Ok(CurrentUser(user)),
            Err(SessionError::Store(e)) => Err(e.into()),
            Err(e) => {
                tracing::debug!("Session rejected: {}", e);
                Err(AppError::AuthRequired)
            }
        }
    }
}

/// Optional user extractor: `None` instead of 401 when not authenticated.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(CurrentUser(user)) => Ok(MaybeUser(Some(user))),
            Err(AppError::AuthRequired) => Ok(MaybeUser(None)),
            Err(e) => {
                tracing::warn!("Treating request as anonymous after session lookup failed: {}", e);
                Ok(MaybeUser(None))
            }
        }
    }
}

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.id)
    }
}

/// `Form` whose rejection is a JSON 400 rather than axum's plain-text one.
pub struct ApiForm<T>(pub T);

impl<T, S> FromRequest<S> for ApiForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(ApiForm(value)),
            Err(rejection) => {
                tracing::debug!("Form rejected: {}", rejection.body_text());
                Err(AppError::Validation("Invalid form data".into()))
            }
        }
    }
}
