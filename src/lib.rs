//! Status Tray Library
//!
//! Owns one status-bar (tray) icon, routes its clicks to application handlers,
//! and lets any thread swap the icon.

pub mod error;
pub mod logging;
pub mod settings;
pub mod tray;

pub use error::{AppError, ErrorSeverity, Result};
