use super::HighLevelError;

/// Capability trait for errors that may carry, or wrap something that
/// carries, a [`HighLevelError`].
///
/// Both methods default to `None`, so an error type that opts in without
/// overriding anything is classified as an internal error.
pub trait HasHighLevelForm: std::error::Error + Send + Sync {
    /// The high-level form carried directly by this error.
    fn high_level_form(&self) -> Option<&HighLevelError> {
        None
    }

    /// The next error down the wrap chain.
    fn wrapped(&self) -> Option<&dyn HasHighLevelForm> {
        None
    }
}

impl HasHighLevelForm for HighLevelError {
    fn high_level_form(&self) -> Option<&HighLevelError> {
        Some(self)
    }
}

impl HasHighLevelForm for std::io::Error {}

impl HasHighLevelForm for serde_json::Error {}

/// Iterate over `err` and everything it wraps, outermost first.
pub fn chain(err: &dyn HasHighLevelForm) -> impl Iterator<Item = &dyn HasHighLevelForm> {
    std::iter::successors(Some(err), |e| e.wrapped())
}
