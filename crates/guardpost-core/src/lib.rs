//! # guardpost-core
//!
//! Core crate for Guardpost. Contains configuration schemas, cross-crate
//! traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Guardpost crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
