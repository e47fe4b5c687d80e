//! Asynchronous validator combinators.
//!
//! A [`Validator<I, O>`] turns an input into an eventual [`Validated<O>`]:
//! either the (possibly converted) output, or a non-empty list of messages.
//! Validators are cheap to clone and compose:
//!
//! - [`Validator::chain`] / [`sequence`] run validators one after another and
//!   stop at the first failure.
//! - [`parallel`] runs validators on the same input concurrently and collects
//!   every failure in declaration order.
//! - [`Validator::transform`] maps the success value.
//! - [`Validator::or_else`] falls back to a second validator.
//! - [`try_catch`] lifts an arbitrary fallible async action into a validator.
//!
//! # Example
//!
//! ```
//! use formwork::validator::{self, Validator};
//!
//! let username: Validator<String, String> = validator::non_blank("Required")
//!     .chain(validator::length_range(4, 64, "Between 4 and 64 chars"));
//! ```

mod leaf;

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};

pub use leaf::*;

use crate::result::{ErrorList, Validated};

type Run<I, O> = dyn Fn(I) -> BoxFuture<'static, Validated<O>> + Send + Sync;

/// An asynchronous validation rule from `I` to `O`.
pub struct Validator<I, O> {
    run: Arc<Run<I, O>>,
}

impl<I, O> Clone for Validator<I, O> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<I, O> std::fmt::Debug for Validator<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("input", &std::any::type_name::<I>())
            .field("output", &std::any::type_name::<O>())
            .finish()
    }
}

impl<I, O> Validator<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Create a validator from an async function.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Validated<O>> + Send + 'static,
    {
        Self {
            run: Arc::new(move |input| f(input).boxed()),
        }
    }

    /// Create a validator from a synchronous check.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(I) -> Validated<O> + Send + Sync + 'static,
    {
        Self::new(move |input| futures::future::ready(f(input)))
    }

    /// Run the validator.
    pub fn validate(&self, input: I) -> BoxFuture<'static, Validated<O>> {
        (self.run)(input)
    }

    /// Map the success value through `f`. Failures pass through untouched and
    /// `f` is not called.
    pub fn transform<P, F>(self, f: F) -> Validator<I, P>
    where
        P: Send + 'static,
        F: Fn(O) -> P + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Validator::new(move |input| {
            let pending = self.validate(input);
            let f = Arc::clone(&f);
            async move { pending.await.map(|output| (*f)(output)) }
        })
    }

    /// Feed the output into `next`. Short-circuits on failure.
    pub fn chain<P>(self, next: Validator<O, P>) -> Validator<I, P>
    where
        P: Send + 'static,
    {
        Validator::new(move |input| {
            let pending = self.validate(input);
            let next = next.clone();
            async move {
                match pending.await {
                    Ok(output) => next.validate(output).await,
                    Err(errors) => Err(errors),
                }
            }
        })
    }

    /// Run `second` on the same input when this validator fails. The first
    /// failure is discarded, not merged.
    pub fn or_else(self, second: Validator<I, O>) -> Validator<I, O>
    where
        I: Clone,
    {
        Validator::new(move |input: I| {
            let pending = self.validate(input.clone());
            let second = second.clone();
            async move {
                match pending.await {
                    Ok(output) => Ok(output),
                    Err(_) => second.validate(input).await,
                }
            }
        })
    }
}

/// A validator that accepts every input unchanged.
pub fn identity<T: Send + 'static>() -> Validator<T, T> {
    Validator::from_fn(Ok)
}

pub use identity as of;

/// A validator that always succeeds with a clone of `value`.
pub fn succeed<I, O>(value: O) -> Validator<I, O>
where
    I: Send + 'static,
    O: Clone + Send + Sync + 'static,
{
    Validator::from_fn(move |_| Ok(value.clone()))
}

/// A validator that always fails with `errors`.
pub fn fail<I, O>(errors: impl Into<ErrorList>) -> Validator<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    let errors = errors.into();
    Validator::from_fn(move |_| Err(errors.clone()))
}

/// Free-function form of [`Validator::transform`].
pub fn transform<I, A, B, F>(validator: Validator<I, A>, f: F) -> Validator<I, B>
where
    I: Send + 'static,
    A: Send + 'static,
    B: Send + 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    validator.transform(f)
}

/// Free-function form of [`Validator::chain`].
pub fn chain<I, A, O>(first: Validator<I, A>, next: Validator<A, O>) -> Validator<I, O>
where
    I: Send + 'static,
    A: Send + 'static,
    O: Send + 'static,
{
    first.chain(next)
}

/// Free-function form of [`Validator::or_else`].
pub fn or_else<I, O>(first: Validator<I, O>, second: Validator<I, O>) -> Validator<I, O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
{
    first.or_else(second)
}

/// Run validators left to right, stopping at the first failure.
///
/// Only the failing validator's messages are returned; later validators are
/// never invoked. An empty list accepts every input. For validators that
/// change the type between steps use [`Validator::chain`] or [`sequence!`].
pub fn sequence<T: Send + 'static>(validators: Vec<Validator<T, T>>) -> Validator<T, T> {
    validators
        .into_iter()
        .reduce(Validator::chain)
        .unwrap_or_else(identity)
}

/// Run validators concurrently on the same input and collect every failure.
///
/// Messages are concatenated in declaration order regardless of which
/// validator finishes first. Succeeds with the original input when all pass.
pub fn parallel<T>(validators: Vec<Validator<T, T>>) -> Validator<T, T>
where
    T: Clone + Send + 'static,
{
    Validator::new(move |input: T| {
        let pending: Vec<_> = validators
            .iter()
            .map(|validator| validator.validate(input.clone()))
            .collect();
        async move {
            let mut failures: Option<ErrorList> = None;
            for result in join_all(pending).await {
                if let Err(errors) = result {
                    match failures.as_mut() {
                        Some(acc) => acc.extend(errors),
                        None => failures = Some(errors),
                    }
                }
            }
            match failures {
                Some(errors) => Err(errors),
                None => Ok(input),
            }
        }
    })
}

/// Wrap a fallible async action as a validator.
///
/// An `Err` from `action` becomes a single message produced by `on_failure`;
/// an `Ok` is mapped through `on_success`. This is the place to put side
/// effects such as a remote uniqueness check.
pub fn try_catch<I, A, E, O, F, Fut>(
    action: F,
    on_failure: impl Fn(E) -> String + Send + Sync + 'static,
    on_success: impl Fn(A) -> O + Send + Sync + 'static,
) -> Validator<I, O>
where
    I: Send + 'static,
    A: 'static,
    E: 'static,
    O: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<A, E>> + Send + 'static,
{
    let on_failure = Arc::new(on_failure);
    let on_success = Arc::new(on_success);
    Validator::new(move |input| {
        let pending = action(input);
        let on_failure = Arc::clone(&on_failure);
        let on_success = Arc::clone(&on_success);
        async move {
            match pending.await {
                Ok(value) => Ok((*on_success)(value)),
                Err(error) => Err(ErrorList::new((*on_failure)(error))),
            }
        }
    })
}

/// Adapt an external parse function reporting a list of issues.
///
/// An empty issue list on failure is reported as `fallback`.
pub fn from_parser<I, O, F>(parse: F, fallback: impl Into<String>) -> Validator<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Result<O, Vec<String>> + Send + Sync + 'static,
{
    let fallback = fallback.into();
    Validator::from_fn(move |input| {
        parse(input).map_err(|issues| {
            ErrorList::from_vec(issues).unwrap_or_else(|| ErrorList::new(fallback.clone()))
        })
    })
}

/// Chain validators whose types differ between steps.
///
/// `sequence!(a, b, c)` is `a.chain(b).chain(c)`.
#[macro_export]
macro_rules! sequence {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $first$(.chain($rest))*
    };
}

/// Shorthand for [`parallel`](crate::validator::parallel) over a list.
#[macro_export]
macro_rules! parallel {
    ($($validator:expr),* $(,)?) => {
        $crate::validator::parallel(vec![$($validator),*])
    };
}
