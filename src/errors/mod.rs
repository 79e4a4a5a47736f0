//! Centralized error handling module
//!
//! Structured, typed errors for the application layer. Gateway failures
//! live in [`crate::fcm::FirebaseError`] and convert into [`AppError`].

pub mod context;
pub mod types;

pub use context::ErrorContextExt;
pub use types::{AppError, AppResult};
