//! Common utilities shared by the Workeasy crates.
//!
//! This crate provides:
//! - Unified error handling for HTTP handlers
//! - The localized message catalog
//! - Configuration structures

pub mod config;
pub mod error;
pub mod i18n;

pub use config::*;
pub use error::{AppError, AppResult, ErrorReport, ErrorResponse, OptionExt};
