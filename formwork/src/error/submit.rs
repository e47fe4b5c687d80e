//! Submit error types

/// Boxed error returned by a caller-supplied submit handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by a form submission after validation passed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The success handler resolved to an error.
    ///
    /// Field errors are left untouched; the form is still re-enabled.
    #[error("submit handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl SubmitError {
    /// Wraps a handler failure.
    pub fn handler(error: impl Into<BoxError>) -> Self {
        Self::Handler(error.into())
    }
}
