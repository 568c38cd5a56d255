//! Application services for authentication and user management.

pub mod auth;

pub use auth::{AuthError, AuthResult, AuthService, ChangePasswordRequest, CreateUserRequest};
