use super::{DEFAULT_INTERNAL_ERROR, HasHighLevelForm, HighLevelError, chain};

/// Classify `err`: the first high-level form found walking the wrap chain
/// from the outside in, or [`DEFAULT_INTERNAL_ERROR`].
pub fn extract_error(err: &dyn HasHighLevelForm) -> HighLevelError {
    extract_error_or(err, &DEFAULT_INTERNAL_ERROR)
}

/// Like [`extract_error`] with a caller-chosen fallback.
pub fn extract_error_or(err: &dyn HasHighLevelForm, fallback: &HighLevelError) -> HighLevelError {
    chain(err)
        .find_map(|e| e.high_level_form())
        .unwrap_or(fallback)
        .clone()
}
