//! Shared building blocks for the Long Distance Love backend.
//!
//! Config loading, the service-wide error type, and logging setup live here
//! so the server crate stays focused on request handling.

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod logging;

pub use config::Config;
pub use error::{Error, Result};
