//! Web API module for plaza.
//!
//! This module provides the REST boundary of the authentication core:
//! login, refresh, logout, registration, and permission retrieval.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
