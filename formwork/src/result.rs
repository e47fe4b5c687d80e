//! Validation outcomes.
//!
//! A validation outcome is a plain [`Result`]: `Ok` carries the validated
//! value, `Err` carries an [`ErrorList`] of human-readable messages. The list
//! type guarantees that a failure always has at least one message.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::EmptyErrorList;

/// The outcome of running a validator.
pub type Validated<O> = Result<O, ErrorList>;

/// A non-empty, ordered list of validation messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct ErrorList(Vec<String>);

impl ErrorList {
    /// Create a list holding a single message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    /// Build a list from messages, or `None` when there are none.
    pub fn from_vec(messages: Vec<String>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self(messages))
        }
    }

    /// The first message.
    pub fn head(&self) -> &str {
        // Non-empty by construction.
        &self.0[0]
    }

    /// Append a message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Append every message of `other`, keeping order.
    pub fn extend(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    /// Consume the list into its messages.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for ErrorList {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for ErrorList {
    type Error = EmptyErrorList;

    fn try_from(messages: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_vec(messages).ok_or(EmptyErrorList)
    }
}

impl From<ErrorList> for Vec<String> {
    fn from(list: ErrorList) -> Self {
        list.0
    }
}

impl From<&str> for ErrorList {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ErrorList {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl IntoIterator for ErrorList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}

/// Construct a successful outcome.
pub fn success<S, F>(value: S) -> Result<S, F> {
    Ok(value)
}

/// Construct a failed outcome.
pub fn failure<S, F>(errors: F) -> Result<S, F> {
    Err(errors)
}

/// Extension for reading the success side of an outcome already known to be
/// successful.
pub trait ResultExt<S> {
    /// Return the success value.
    ///
    /// # Panics
    ///
    /// Panics when called on a failure. Check `is_ok()` first.
    fn extract(self) -> S;
}

impl<S, F> ResultExt<S> for Result<S, F> {
    fn extract(self) -> S {
        match self {
            Ok(value) => value,
            Err(_) => panic!("extract called on a failed outcome"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_rejects_empty() {
        assert!(ErrorList::from_vec(Vec::new()).is_none());
        assert_eq!(
            ErrorList::try_from(Vec::<String>::new()),
            Err(EmptyErrorList)
        );
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut errors = ErrorList::new("first");
        let mut more = ErrorList::new("second");
        more.push("third");
        errors.extend(more);

        assert_eq!(errors.head(), "first");
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.into_vec(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_serde_as_array() {
        let errors = ErrorList::new("Required");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"["Required"]"#);

        let parsed: ErrorList = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, errors);
        assert!(serde_json::from_str::<ErrorList>("[]").is_err());
    }

    #[test]
    fn test_extract_success() {
        let outcome: Validated<i32> = success(7);
        assert!(outcome.is_ok());
        assert_eq!(outcome.extract(), 7);
    }

    #[test]
    #[should_panic(expected = "extract called on a failed outcome")]
    fn test_extract_failure_panics() {
        let outcome: Validated<i32> = failure(ErrorList::new("nope"));
        outcome.extract();
    }
}
