//! Pending two-factor session storage

mod pending;

pub use pending::RedisPendingSessionStore;
