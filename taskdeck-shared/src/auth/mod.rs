/// Authentication and authorization utilities
///
/// # Modules
///
/// - `password`: Argon2id password hashing and verification
/// - `jwt`: Token issuance and validation (HS256, 1-day expiry)
/// - `middleware`: Axum middleware resolving tokens to an `AuthContext`,
///   including the session-version comparison that implements revocation

pub mod jwt;
pub mod middleware;
pub mod password;
