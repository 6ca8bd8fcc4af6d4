//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for signup, login and logout, plus the signed-in
//! user's profile and feature preferences.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, StatusCode},
    Extension, Json,
};
use chrono::{Duration, Utc};
use journal_core::domain::{PreferencesUpdate, User, UserPreferences};
use journal_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::MAX_TOKEN_TTL_DAYS;
use crate::web::middleware::extract_token;
use crate::web::rest::{bad_request, port_failure, HandlerError, MessageResponse};
use crate::web::state::AppState;

const MAX_USERNAME_CHARS: usize = 50;
const MIN_PASSWORD_CHARS: usize = 6;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub use_diary: bool,
    pub use_memoir: bool,
    pub use_period_tracker: bool,
    pub menu_configured: bool,
    pub show_install_prompt: bool,
}

impl From<UserPreferences> for PreferencesResponse {
    fn from(p: UserPreferences) -> Self {
        Self {
            use_diary: p.use_diary,
            use_memoir: p.use_memoir,
            use_period_tracker: p.use_period_tracker,
            menu_configured: p.menu_configured,
            show_install_prompt: p.show_install_prompt,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub preferences: PreferencesResponse,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.user_id,
            username: u.username,
            preferences: u.preferences.into(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// A partial preferences update; omitted fields keep their value.
#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    pub use_diary: Option<bool>,
    pub use_memoir: Option<bool>,
    pub use_period_tracker: Option<bool>,
    pub menu_configured: Option<bool>,
    pub show_install_prompt: Option<bool>,
}

/// The first-run menu selection.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuPreferencesRequest {
    pub use_diary: bool,
    pub use_memoir: bool,
    #[serde(default)]
    pub use_period_tracker: bool,
}

type AuthReply = (StatusCode, [(HeaderName, String); 1], Json<AuthResponse>);

//=========================================================================================
// Helpers
//=========================================================================================

fn validate_credentials(req: &CredentialsRequest) -> Result<(), HandlerError> {
    let username = req.username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_CHARS {
        return Err(bad_request(format!(
            "Username must be 1 to {} characters",
            MAX_USERNAME_CHARS
        )));
    }
    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

/// Issues a fresh token for `user_id` and stores it as an auth session.
async fn issue_token(state: &AppState, user_id: Uuid) -> Result<(String, String), HandlerError> {
    let token = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.token_ttl_days.clamp(1, MAX_TOKEN_TTL_DAYS));

    state
        .db
        .create_auth_session(&token, user_id, Utc::now() + ttl)
        .await
        .map_err(|e| port_failure("create session", e))?;

    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        token,
        ttl.num_seconds()
    );
    Ok((token, cookie))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<AuthReply, HandlerError> {
    validate_credentials(&req)?;

    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })?
        .to_string();

    // 2. Create user in database
    let user = state
        .db
        .create_user(req.username.trim(), &password_hash)
        .await
        .map_err(|e| port_failure("create user", e))?;
    info!("Created user {}", user.user_id);

    // 3. Log the new user in
    let (token, cookie) = issue_token(&state, user.user_id).await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /api/auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<AuthReply, HandlerError> {
    let invalid = || (StatusCode::UNAUTHORIZED, "Invalid username or password".to_string());

    // 1. Get user by username
    let creds = state
        .db
        .get_user_by_username(req.username.trim())
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => invalid(),
            other => port_failure("load user", other),
        })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    // 3. Issue a token
    let user = state
        .db
        .get_user(creds.user_id)
        .await
        .map_err(|e| port_failure("load user", e))?;
    let (token, cookie) = issue_token(&state, user.user_id).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /api/auth/logout - Revoke the presented token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<MessageResponse>), HandlerError> {
    let token = extract_token(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state
        .db
        .delete_auth_session(token)
        .await
        .map_err(|e| port_failure("logout", e))?;

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(MessageResponse::new("Logged out")),
    ))
}

/// GET /api/auth/me - The signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<UserResponse>, HandlerError> {
    let user = state
        .db
        .get_user(user_id)
        .await
        .map_err(|e| port_failure("load user", e))?;
    Ok(Json(user.into()))
}

/// GET /api/auth/user-preferences
#[utoipa::path(
    get,
    path = "/api/auth/user-preferences",
    responses((status = 200, description = "Feature preferences", body = PreferencesResponse))
)]
pub async fn get_preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<PreferencesResponse>, HandlerError> {
    let user = state
        .db
        .get_user(user_id)
        .await
        .map_err(|e| port_failure("load preferences", e))?;
    Ok(Json(user.preferences.into()))
}

/// PUT /api/auth/user-preferences
#[utoipa::path(
    put,
    path = "/api/auth/user-preferences",
    request_body = PreferencesRequest,
    responses((status = 200, description = "Updated preferences", body = PreferencesResponse))
)]
pub async fn update_preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<PreferencesRequest>,
) -> Result<Json<PreferencesResponse>, HandlerError> {
    let update = PreferencesUpdate {
        use_diary: req.use_diary,
        use_memoir: req.use_memoir,
        use_period_tracker: req.use_period_tracker,
        menu_configured: req.menu_configured,
        show_install_prompt: req.show_install_prompt,
    };
    let prefs = state
        .db
        .update_preferences(user_id, update)
        .await
        .map_err(|e| port_failure("update preferences", e))?;
    Ok(Json(prefs.into()))
}

/// POST /api/auth/update-menu-preferences - First-run menu selection
#[utoipa::path(
    post,
    path = "/api/auth/update-menu-preferences",
    request_body = MenuPreferencesRequest,
    responses(
        (status = 200, description = "Updated preferences", body = PreferencesResponse),
        (status = 400, description = "Neither diary nor memoir selected")
    )
)]
pub async fn update_menu_preferences_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<MenuPreferencesRequest>,
) -> Result<Json<PreferencesResponse>, HandlerError> {
    if !req.use_diary && !req.use_memoir {
        return Err(bad_request("Select at least one of diary or memoir"));
    }
    let update = PreferencesUpdate {
        use_diary: Some(req.use_diary),
        use_memoir: Some(req.use_memoir),
        use_period_tracker: Some(req.use_period_tracker),
        menu_configured: Some(true),
        show_install_prompt: None,
    };
    let prefs = state
        .db
        .update_preferences(user_id, update)
        .await
        .map_err(|e| port_failure("update preferences", e))?;
    Ok(Json(prefs.into()))
}
