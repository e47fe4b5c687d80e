//! Lock-protected state container shared by the form and field-array stores.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::field::{FormState, errors_of, values_of};
use super::field_array::FieldArrayState;
use crate::model::Values;
use crate::validation::FormErrors;

/// A state with derived values and errors views.
pub(crate) trait Projected: PartialEq + fmt::Debug {
    type Values: PartialEq;
    type Errors: PartialEq;

    fn project_values(&self) -> Self::Values;
    fn project_errors(&self) -> Self::Errors;
}

impl Projected for FormState {
    type Values = Values;
    type Errors = FormErrors;

    fn project_values(&self) -> Values {
        values_of(self)
    }

    fn project_errors(&self) -> FormErrors {
        errors_of(self)
    }
}

impl Projected for FieldArrayState {
    type Values = Vec<Values>;
    type Errors = Vec<FormErrors>;

    fn project_values(&self) -> Vec<Values> {
        self.iter().map(values_of).collect()
    }

    fn project_errors(&self) -> Vec<FormErrors> {
        self.iter().map(errors_of).collect()
    }
}

struct Inner<S: Projected> {
    initial: Arc<S>,
    state: Arc<S>,
    values: Arc<S::Values>,
    errors: Arc<S::Errors>,
}

impl<S: Projected> Inner<S> {
    fn new(initial: Arc<S>) -> Self {
        Self {
            values: Arc::new(initial.project_values()),
            errors: Arc::new(initial.project_errors()),
            state: Arc::clone(&initial),
            initial,
        }
    }

    /// Install `next`, keeping every `Arc` whose contents did not change.
    /// Returns whether anything changed.
    fn commit(&mut self, next: Arc<S>) -> bool {
        if Arc::ptr_eq(&self.state, &next) || *self.state == *next {
            return false;
        }
        let values = next.project_values();
        if *self.values != values {
            self.values = Arc::new(values);
        }
        let errors = next.project_errors();
        if *self.errors != errors {
            self.errors = Arc::new(errors);
        }
        self.state = next;
        true
    }
}

/// Shared state with a dirty flag, in the manner of a reactive `State<T>`.
///
/// Only pure transitions run under the write lock; caller-supplied closures
/// must be evaluated before calling [`update`](Self::update).
pub(crate) struct Shared<S: Projected> {
    inner: Arc<RwLock<Inner<S>>>,
    dirty: Arc<AtomicBool>,
}

impl<S: Projected> Shared<S> {
    pub(crate) fn new(initial: S) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::new(Arc::new(initial)))),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Inner<S>) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut Inner<S>) -> bool) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if f(&mut guard) {
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    pub(crate) fn state(&self) -> Arc<S> {
        self.read(|inner| Arc::clone(&inner.state))
    }

    pub(crate) fn values(&self) -> Arc<S::Values> {
        self.read(|inner| Arc::clone(&inner.values))
    }

    pub(crate) fn errors(&self) -> Arc<S::Errors> {
        self.read(|inner| Arc::clone(&inner.errors))
    }

    /// Read the current state without cloning it.
    pub(crate) fn with_state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        self.read(|inner| f(&inner.state))
    }

    /// Replace the state with `next(current)`.
    pub(crate) fn update(&self, next: impl FnOnce(&S) -> S) {
        self.write(|inner| {
            let next = next(&inner.state);
            inner.commit(Arc::new(next))
        });
    }

    /// Restore the initial state, keeping its `Arc`.
    pub(crate) fn reset(&self) {
        self.write(|inner| {
            let initial = Arc::clone(&inner.initial);
            inner.commit(initial)
        });
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub(crate) fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }
}

impl<S: Projected> Clone for Shared<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
        }
    }
}

impl<S: Projected> fmt::Debug for Shared<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("state", &self.state())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
