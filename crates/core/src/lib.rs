//! Matzip Core - Shared domain types.
//!
//! This crate provides the types used across all Matzip components:
//! - `client` - Session, persistence, store and navigation state machine
//! - `cli` - Headless command-line driver
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Identities, IDs, places, collections
//! - [`views`] - Derived read models (feed, map filter, calendar, stats)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod views;

pub use types::*;
