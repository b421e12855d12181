/// Request authentication middleware for Axum
///
/// Validates the `Authorization: Bearer <token>` header, resolves the user
/// behind the token from the database, and compares the token's embedded
/// session version against the stored counter. Only when all of that holds
/// does the request proceed, with an [`AuthContext`] added to the request
/// extensions for downstream role and ownership checks.
///
/// # Pipeline
///
/// 1. Missing or malformed header → 401
/// 2. Bad signature, expired, or wrong issuer → 401
/// 3. No user behind the token's subject → 401
/// 4. Stale session version → 403 (generic forbidden message; this is how
///    an admin status change revokes outstanding tokens without any
///    server-side token registry)
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Router, middleware, routing::get};
/// use taskdeck_shared::auth::middleware::{create_auth_middleware, AuthContext};
/// use sqlx::PgPool;
///
/// async fn protected(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.user.username)
/// }
///
/// fn router(pool: PgPool) -> Router {
///     Router::new()
///         .route("/api/me", get(protected))
///         .layer(middleware::from_fn(create_auth_middleware(pool, "secret")))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;

use super::jwt::{validate_token, JwtError};
use crate::models::user::{Role, User};

/// Authentication context added to request extensions
///
/// Carries the user as currently stored, so role and status reflect the
/// database at request time, not at token issuance.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The resolved, current user record
    pub user: User,
}

impl AuthContext {
    pub fn user_id(&self) -> uuid::Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        match self.user.role {
            Role::Admin => true,
            Role::User => false,
        }
    }
}

/// Error type for the authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Authorization header missing or not a Bearer credential
    #[error("Missing or malformed authorization header")]
    MissingCredentials,

    /// Token failed signature, expiry, or issuer validation
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token subject does not resolve to a user
    #[error("Unknown token subject")]
    UnknownUser,

    /// Token session version no longer matches the stored counter
    #[error("Session has been invalidated")]
    SessionInvalidated,

    /// Database error during user resolution
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "unauthorized", "No token provided")
            }
            AuthError::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid or expired token",
            ),
            AuthError::UnknownUser => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid or expired token",
            ),
            // Deliberately indistinguishable from any other forbidden
            // response on the wire.
            AuthError::SessionInvalidated => {
                (StatusCode::FORBIDDEN, "forbidden", "Session is no longer valid")
            }
            AuthError::DatabaseError(ref e) => {
                tracing::error!("auth middleware database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred",
                )
            }
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// Extracts the bearer token from request headers
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingCredentials)
}

/// Authenticates a request and resolves its [`AuthContext`]
///
/// Split out from the middleware so the validation pipeline is callable
/// without an axum `Request` in hand.
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(e.to_string()),
    })?;

    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    // The sole revocation mechanism: a token is only good while its
    // embedded counter equals the stored one.
    if claims.session_version != user.session_version {
        return Err(AuthError::SessionInvalidated);
    }

    Ok(AuthContext { user })
}

/// Authentication middleware
///
/// On success, inserts [`AuthContext`] into request extensions and calls
/// the next service. No other side effects.
pub async fn auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = authenticate(&pool, &secret, req.headers()).await?;
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

/// Creates an authentication middleware closure
///
/// Captures the pool and JWT secret for use with
/// `axum::middleware::from_fn`.
pub fn create_auth_middleware(
    pool: PgPool,
    secret: impl Into<String>,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>,
> + Clone {
    let secret = secret.into();
    move |req, next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(auth_middleware(pool, secret, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracts_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_bearer_token_empty_token() {
        let headers = headers_with("Bearer ");
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_auth_error_status_codes() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::UnknownUser.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::SessionInvalidated.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_stale_session_and_forbidden_share_status() {
        // A revoked session must not be distinguishable from a plain
        // forbidden response by status code alone.
        let response = AuthError::SessionInvalidated.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
