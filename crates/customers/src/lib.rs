//! Customer service library.
//!
//! This crate provides the service as a library, allowing the router to be
//! built in tests and driven without a running binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod telemetry;
