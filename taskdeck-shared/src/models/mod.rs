/// Database models for taskdeck
///
/// # Models
///
/// - `user`: Accounts, roles, status, and the session-version counter
/// - `task`: Tasks and their assignee-scoped queries

pub mod task;
pub mod user;
