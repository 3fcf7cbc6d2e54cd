//! API client module for the AquaGreen backend.
//!
//! Provides the HTTP client with auth header injection, the error taxonomy,
//! and request/response types matching the backend's REST API.

pub mod client;
pub mod error;
pub mod types;
