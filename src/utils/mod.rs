//! Helpers shared by the gateway's modules.

pub mod patch;

pub use patch::Patch;

/// Formats a shared log prefix for module logs.
pub fn log_prefix(module: &str) -> String {
    format!("gateway::{module}")
}
