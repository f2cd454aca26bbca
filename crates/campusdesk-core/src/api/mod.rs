//! REST API client module for the student records service.
//!
//! This module provides the `ApiClient` for communicating with the
//! student service gateway: authentication, the student roster, and
//! per-user messages.
//!
//! Requests are authorized with a JWT bearer token under the
//! token-in-storage credential scheme, or with a server-managed
//! HTTP-only cookie under the cookie-delegated scheme.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
