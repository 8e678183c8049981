//! # Sortify Common Library
//!
//! Shared code for the Sortify crates:
//! - Error and result types
//! - Configuration loading
//! - Tracing setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
