//! Axum extractors for request handling
//!
//! Custom extractors for authentication, client metadata, and validation.

mod auth;
mod client_meta;
mod validated;

pub use auth::AuthUser;
pub use client_meta::ClientMeta;
pub use validated::ValidatedJson;
