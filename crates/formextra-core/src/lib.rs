//! # formextra-core
//!
//! Core types, settings, and error types for formextra.
//! This crate has no form logic of its own; it is the foundation the forms
//! crate builds on.
//!
//! ## Modules
//!
//! - [`error`] - `ValidationError`, `FormExtraError` and result aliases
//! - [`value`] - The normalized [`Value`] type
//! - [`settings`] - Settings and the global [`SETTINGS`]
//! - [`settings_loader`] - TOML and environment loading
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use error::{FormExtraError, FormExtraResult, ValidationError};
pub use settings::{Settings, SETTINGS};
pub use value::Value;
