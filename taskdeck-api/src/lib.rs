//! HTTP API server for TaskDeck
//!
//! Exposes authentication, task management, and user administration over
//! REST. Domain models, password hashing, token handling, and the
//! authentication middleware live in `taskdeck-shared`; this crate owns
//! the routes, request/response types, and server wiring.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
