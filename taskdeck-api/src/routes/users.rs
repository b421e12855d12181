/// User administration endpoints (admin only)
///
/// # Endpoints
///
/// - `GET /api/users?page=&limit=` - paginated account list
/// - `PATCH /api/users/:id/status` - toggle account status and revoke the
///   target's outstanding sessions
///
/// Both operations require the requester to be an admin; the role check
/// matches exhaustively on [`Role`] rather than comparing strings.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::PageQuery,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::middleware::AuthContext,
    models::user::{AccountStatus, Role, User, UserProfile},
};
use uuid::Uuid;

/// Paginated user list response
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserProfile>,

    /// Total number of accounts (all pages)
    pub total: i64,

    pub page: i64,

    pub limit: i64,
}

/// Status change request body
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AccountStatus,
}

/// Status change response
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub message: String,

    /// The target account after the change
    pub user: UserProfile,
}

/// Lists accounts, newest first, password hashes excluded
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<UserListResponse>> {
    match auth.role() {
        Role::Admin => {}
        Role::User => {
            return Err(ApiError::Forbidden(
                "Only admins can view users".to_string(),
            ))
        }
    }

    let (page, limit) = query.normalize();
    let users = User::list(&state.db, limit, query.offset()).await?;
    let total = User::count(&state.db).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserProfile::from).collect(),
        total,
        page,
        limit,
    }))
}

/// Changes an account's status and revokes its sessions
///
/// The status write and the session-version bump are one UPDATE, so every
/// token issued before this call is stale the moment it returns. The
/// counter moves even when the submitted status equals the current one;
/// revocation is unconditional.
///
/// # Errors
///
/// - `403 Forbidden`: requester is not an admin
/// - `404 Not Found`: no account with this id
/// - `400 Bad Request`: target is an admin account
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<UpdateStatusResponse>> {
    match auth.role() {
        Role::Admin => {}
        Role::User => {
            return Err(ApiError::Forbidden(
                "Only admins can change account status".to_string(),
            ))
        }
    }

    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    // Role is immutable, so this pre-check cannot race with a role change.
    match target.role {
        Role::Admin => {
            return Err(ApiError::BadRequest(
                "Cannot change status of an admin account".to_string(),
            ))
        }
        Role::User => {}
    }

    let updated = User::set_status(&state.db, id, req.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        admin_id = %auth.user_id(),
        target_id = %updated.id,
        status = updated.status.as_str(),
        session_version = updated.session_version,
        "account status changed, sessions revoked"
    );

    Ok(Json(UpdateStatusResponse {
        message: "User status updated and sessions invalidated".to_string(),
        user: UserProfile::from(updated),
    }))
}
