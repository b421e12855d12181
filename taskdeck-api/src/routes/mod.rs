/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login (public)
/// - `profile`: The authenticated user's own identity
/// - `users`: Admin-only account administration
/// - `tasks`: Task creation, listing, and updates

use serde::Deserialize;

pub mod auth;
pub mod health;
pub mod profile;
pub mod tasks;
pub mod users;

/// Default page size, matching the UI's table page length
const DEFAULT_PAGE_SIZE: i64 = 5;

/// Upper bound on client-requested page sizes
const MAX_PAGE_SIZE: i64 = 100;

/// Pagination query parameters (`?page=&limit=`)
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Normalizes to a 1-based page and clamped limit
    pub fn normalize(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }

    /// Row offset for the normalized page
    ///
    /// Saturates instead of overflowing on absurd page numbers; Postgres
    /// returns an empty page for a huge OFFSET, which is the right answer.
    pub fn offset(&self) -> i64 {
        let (page, limit) = self.normalize();
        (page - 1).saturating_mul(limit)
    }
}
