//! User credentials and authentication.
//!
//! Users are stored globally and are unique per `(email, company)` pair. The
//! [`services::AuthService`] verifies credentials, creates users and manages
//! password changes.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
