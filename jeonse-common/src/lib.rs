//! # Jeonse Common Library
//!
//! Shared code for the jeonse risk analysis workspace:
//! - Error taxonomy (`Error`, `Result`)
//! - Configuration file model and root folder resolution
//! - SQLite bootstrap and schema
//! - Korea Standard Time helpers

pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
