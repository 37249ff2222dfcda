//! Tauri command handlers
//!
//! The event wiring between the webview and the backend. Handlers validate
//! input, claim the task slot, delegate to the core modules, and stringify
//! errors for display.

pub mod download;
pub mod fetch;
pub mod system;

// Re-export all command functions for easy access
pub use download::*;
pub use fetch::*;
pub use system::*;
