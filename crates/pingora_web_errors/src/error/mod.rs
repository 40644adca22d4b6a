//! High-level HTTP errors and their classification.
mod extract;
mod high_level;
mod high_level_form;
mod web_error;

pub use extract::{extract_error, extract_error_or};
pub use high_level::*;
pub use high_level_form::{HasHighLevelForm, chain};
pub use web_error::{WebError, WrappedError};
