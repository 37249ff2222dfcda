//! Input validation helpers
//!
//! User input is validated before any background work starts; a rejection
//! here means no task was spawned. URLs get no format validation beyond
//! non-empty, since resolving them is the extraction engine's job.

use crate::core::models::{AppError, AppResult};

/// Reject empty or whitespace-only input
///
/// Returns the trimmed value on success.
pub fn require_non_empty(label: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Input(format!("Please enter a {}.", label)));
    }
    Ok(trimmed.to_string())
}
