//! Board defaults and text normalization shared by boards, lists and cards.

use crate::error::CoreError;

/// Name given to a board created without one.
pub const DEFAULT_BOARD_NAME: &str = "Untitled board";

/// Lists every new board starts with, in order. Their positions are
/// `1, 2, 3`.
pub const DEFAULT_LIST_TITLES: [&str; 3] = ["Todo", "Doing", "Done"];

/// Resolve the name of a new board: trimmed, or [`DEFAULT_BOARD_NAME`] when
/// absent or blank.
pub fn resolve_board_name(name: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_BOARD_NAME)
        .to_string()
}

/// Trim a required text field, rejecting blank input.
///
/// `field` is used in the error message (e.g. `"title"`).
pub fn require_text(value: &str, field: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
