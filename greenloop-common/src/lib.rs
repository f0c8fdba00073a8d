//! # GreenLoop Common Library
//!
//! Shared code for the GreenLoop waste-reporting service:
//! - Domain models (users, reports, rewards, collection tasks)
//! - Verification result types
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{VerificationResult, WasteType};
