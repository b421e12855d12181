/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create a new account
/// - `POST /api/auth/login` - Verify credentials and issue a token
///
/// Registration never logs the caller in; login is the only place tokens
/// are issued. Issuing a token does not touch the session-version counter.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, Role, User, UserProfile},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name, unique across all accounts
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub username: String,

    /// Plaintext password; hashed before storage, never persisted
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,

    /// Optional role; defaults to a regular user account
    pub role: Option<Role>,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,

    pub user_id: Uuid,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username must not be empty"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token, valid for one day
    pub token: String,

    /// The authenticated user (password hash excluded)
    pub user: UserProfile,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: empty username or password
/// - `409 Conflict`: username already taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    // The unique constraint is the duplicate check; racing registrations
    // both hit the database and exactly one wins.
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
            role: req.role.unwrap_or(Role::User),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered".to_string(),
            user_id: user.id,
        }),
    ))
}

/// Login and obtain a bearer token
///
/// The same 401 message covers both an unknown username and a wrong
/// password, so the endpoint does not confirm account existence.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    // Token carries the session version current at issuance; an admin
    // status change bumps the stored counter and strands this token.
    let claims = jwt::Claims::new(user.id, user.role, user.session_version);
    let token = jwt::create_token(&claims, &state.config.jwt.secret)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserProfile::from(user),
    }))
}
