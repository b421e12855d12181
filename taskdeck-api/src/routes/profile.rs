/// Profile endpoint
///
/// # Endpoint
///
/// ```text
/// GET /api/me
/// ```
///
/// Returns the identity the authorization middleware resolved for this
/// request: current role and status from the store, not the (possibly
/// stale) values baked into the token.

use axum::{Extension, Json};
use taskdeck_shared::{auth::middleware::AuthContext, models::user::UserProfile};

/// Returns the authenticated user's own profile
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<UserProfile> {
    Json(UserProfile::from(auth.user))
}
