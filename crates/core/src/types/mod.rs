//! Core types for the customer service.

pub mod id;

pub use id::*;
