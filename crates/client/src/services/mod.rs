//! External collaborators consumed by the client.
//!
//! # Services
//!
//! - `auth` - Remote sign-in and sign-up

pub mod auth;
