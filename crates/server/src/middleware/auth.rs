//! Authentication extractors.
//!
//! Handlers take [`RequireAuth`] or [`RequireAdmin`] as an argument to gate
//! access; rejections are JSON envelopes since every route here is an API
//! route.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::ApiError;
use crate::models::{CurrentUser, session_keys};

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("hello, {}", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in user with the admin role.
pub struct RequireAdmin(pub CurrentUser);

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Not authorized, login again".to_owned())
}

async fn current_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await.ok_or_else(unauthorized)?;

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts).await.ok_or_else(unauthorized)?;

        if !user.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".to_owned()));
        }

        Ok(Self(user))
    }
}

/// Store the logged-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the logged-in user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn missing_session_rejects_with_401() {
        assert_eq!(
            unauthorized().into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn non_admin_rejects_with_403() {
        let rejection = ApiError::Forbidden("Admin access required".to_owned());
        assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);
    }
}
