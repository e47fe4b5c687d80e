//! Submit handlers and outcomes.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{BoxError, SubmitError};

type OnSuccess<V> = Box<dyn FnOnce(V) -> BoxFuture<'static, Result<(), BoxError>> + Send>;
type OnFailure<E> = Box<dyn FnOnce(&E) + Send>;

/// What to do with the outcome of a submit.
///
/// `on_success` receives the validated values; `on_failure`, if set, is
/// called with the validation errors after they have been written into
/// state.
///
/// # Example
///
/// ```
/// use formwork::form::SubmitHandler;
/// use formwork::model::Values;
/// use formwork::validation::FormErrors;
///
/// let handler: SubmitHandler<Values, FormErrors> =
///     SubmitHandler::new(|values: Values| async move {
///         println!("saving {} field(s)", values.len());
///         Ok::<_, std::io::Error>(())
///     })
///     .on_failure(|errors: &FormErrors| println!("{} field(s) rejected", errors.len()));
/// ```
pub struct SubmitHandler<V, E> {
    pub(crate) on_success: OnSuccess<V>,
    pub(crate) on_failure: Option<OnFailure<E>>,
}

impl<V, E> SubmitHandler<V, E> {
    /// Create a handler from an async success callback.
    pub fn new<F, Fut, Err>(on_success: F) -> Self
    where
        F: FnOnce(V) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), Err>> + Send + 'static,
        Err: Into<BoxError> + 'static,
    {
        Self {
            on_success: Box::new(move |values| {
                let pending = on_success(values);
                async move { pending.await.map_err(Into::<BoxError>::into) }.boxed()
            }),
            on_failure: None,
        }
    }

    /// Set the callback run when validation fails.
    pub fn on_failure(mut self, on_failure: impl FnOnce(&E) + Send + 'static) -> Self {
        self.on_failure = Some(Box::new(on_failure));
        self
    }
}

impl<V, E> fmt::Debug for SubmitHandler<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmitHandler")
            .field("on_failure", &self.on_failure.is_some())
            .finish_non_exhaustive()
    }
}

/// The result of a submit.
#[derive(Debug)]
pub enum SubmitOutcome<E> {
    /// Validation passed and the success callback completed.
    Submitted,
    /// Validation passed but the success callback failed.
    Rejected(SubmitError),
    /// Validation failed; errors were written into state.
    Invalid(E),
}

impl<E> SubmitOutcome<E> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted)
    }

    /// The validation errors, if validation failed.
    pub fn errors(&self) -> Option<&E> {
        match self {
            SubmitOutcome::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Marks a submit in progress and runs `release` when dropped, whether the
/// submit finished, failed, panicked or was cancelled.
pub(crate) struct SubmitGuard<R: FnOnce()> {
    submitting: Arc<AtomicBool>,
    release: Option<R>,
}

impl<R: FnOnce()> SubmitGuard<R> {
    pub(crate) fn begin(submitting: &Arc<AtomicBool>, release: R) -> Self {
        log::debug!("submit started");
        submitting.store(true, Ordering::SeqCst);
        Self {
            submitting: Arc::clone(submitting),
            release: Some(release),
        }
    }
}

impl<R: FnOnce()> Drop for SubmitGuard<R> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
        self.submitting.store(false, Ordering::SeqCst);
        log::debug!("submit finished");
    }
}

/// Run the success callback, translating its error.
pub(crate) async fn run_success<V, E>(on_success: OnSuccess<V>, values: V) -> SubmitOutcome<E> {
    match on_success(values).await {
        Ok(()) => SubmitOutcome::Submitted,
        Err(e) => {
            log::debug!("submit handler rejected: {e}");
            SubmitOutcome::Rejected(SubmitError::handler(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let submitting = Arc::new(AtomicBool::new(false));
        let released = Arc::new(AtomicBool::new(false));

        let guard = SubmitGuard::begin(&submitting, {
            let released = Arc::clone(&released);
            move || released.store(true, Ordering::SeqCst)
        });
        assert!(submitting.load(Ordering::SeqCst));
        assert!(!released.load(Ordering::SeqCst));

        drop(guard);
        assert!(!submitting.load(Ordering::SeqCst));
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_run_success_translates_error() {
        let handler: SubmitHandler<i32, ()> = SubmitHandler::new(|n: i32| async move {
            if n > 0 { Ok(()) } else { Err("negative") }
        });
        let outcome = run_success::<i32, ()>(handler.on_success, -1).await;

        match outcome {
            SubmitOutcome::Rejected(e) => {
                assert_eq!(e.to_string(), "submit handler failed: negative")
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
