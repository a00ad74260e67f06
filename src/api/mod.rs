//! Catalog REST API access
//!
//! One [`ApiClient`] is built at startup and handed to every screen. It owns
//! the [`SessionStore`], so a token saved by the login flow is attached to the
//! next request from any screen.

pub mod auth;
pub mod client;
pub mod errors;
pub mod session;

#[cfg(test)]
pub mod mock;

pub use client::{ApiClient, ApiRequest, ApiResponse, ReqwestTransport, Transport};
pub use errors::{ApiError, ValidationError};
pub use session::SessionStore;
