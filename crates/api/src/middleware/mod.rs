//! HTTP middleware.

pub mod auth;

pub use auth::{AuthUser, CompanyScope, auth_middleware};
