//! Integration test utilities for the keygate server
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API with real PostgreSQL and Redis instances behind it.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
