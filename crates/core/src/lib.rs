//! Customer Service Core - Shared types library.
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! Database encoding for the identifier types is available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe customer and address IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
