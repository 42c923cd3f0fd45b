//! Client-side domain models.

pub mod session;

pub use session::{Session, UserProfile};
