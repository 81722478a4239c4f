//! Account authentication routes: register, login, logout, profile.
//!
//! Successful register/login stores the identity in the session; the
//! httpOnly cookie is the only credential clients hold.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::error::{ApiError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::models::user::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/user/register", post(register))
        .route("/api/user/login", post(login))
        .route("/api/user/logout", post(logout))
        .route("/api/user/me", get(me))
        .route("/api/user/profile", post(update_profile))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ProfileRequest {
    name: String,
    #[serde(default)]
    phone: Option<String>,
}

async fn establish_session(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    set_current_user(session, &current)
        .await
        .map_err(|e| ApiError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Register a new account and log it in.
///
/// POST /api/user/register
#[instrument(skip(state, session, body), fields(email = %body.email))]
async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&body.name, &body.email, &body.password)
        .await?;

    establish_session(&session, &user).await?;

    Ok(Json(json!({ "success": true, "user": user })))
}

/// Log in with email and password.
///
/// POST /api/user/login
#[instrument(skip(state, session, body), fields(email = %body.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;

    establish_session(&session, &user).await?;

    Ok(Json(json!({ "success": true, "user": user })))
}

/// Log out and drop the session.
///
/// POST /api/user/logout
#[instrument(skip(session))]
async fn logout(session: Session) -> impl IntoResponse {
    let _ = clear_current_user(&session).await;
    let _ = session.flush().await;
    clear_sentry_user();

    Json(json!({ "success": true }))
}

/// The logged-in user's account.
///
/// GET /api/user/me
#[instrument(skip(state, auth))]
async fn me(State(state): State<AppState>, auth: RequireAuth) -> Result<impl IntoResponse> {
    let RequireAuth(current) = auth;
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("account no longer exists".to_owned()))?;

    Ok(Json(json!({ "success": true, "user": user })))
}

/// Update the logged-in user's profile fields.
///
/// POST /api/user/profile
#[instrument(skip(state, auth, body))]
async fn update_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<ProfileRequest>,
) -> Result<impl IntoResponse> {
    let RequireAuth(current) = auth;
    let service = AuthService::new(state.pool());
    let user = service
        .update_profile(current.id, &body.name, body.phone.as_deref())
        .await?;

    Ok(Json(json!({ "success": true, "user": user })))
}
