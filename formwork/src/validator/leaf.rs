//! Built-in leaf validators.

use regex::Regex;

use super::Validator;
use crate::result::ErrorList;

/// Accept the input when `predicate` holds, otherwise fail with `message`.
pub fn from_predicate<T, P>(predicate: P, message: impl Into<String>) -> Validator<T, T>
where
    T: Send + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    let message = message.into();
    Validator::from_fn(move |value| {
        if predicate(&value) {
            Ok(value)
        } else {
            Err(ErrorList::new(message.clone()))
        }
    })
}

/// Narrow the input to `B` with a refining function. `None` fails with
/// `message`.
pub fn from_refinement<A, B, R>(refine: R, message: impl Into<String>) -> Validator<A, B>
where
    A: Send + 'static,
    B: Send + 'static,
    R: Fn(A) -> Option<B> + Send + Sync + 'static,
{
    let message = message.into();
    Validator::from_fn(move |value| refine(value).ok_or_else(|| ErrorList::new(message.clone())))
}

/// Fail on `None`, unwrap `Some`.
pub fn defined<T: Send + 'static>(message: impl Into<String>) -> Validator<Option<T>, T> {
    from_refinement(|value| value, message)
}

/// Accept values `>= bound`.
pub fn min<T>(bound: T, message: impl Into<String>) -> Validator<T, T>
where
    T: PartialOrd + Send + Sync + 'static,
{
    from_predicate(move |value| *value >= bound, message)
}

/// Accept values `<= bound`.
pub fn max<T>(bound: T, message: impl Into<String>) -> Validator<T, T>
where
    T: PartialOrd + Send + Sync + 'static,
{
    from_predicate(move |value| *value <= bound, message)
}

/// Accept values within `[low, high]`.
pub fn range<T>(low: T, high: T, message: impl Into<String>) -> Validator<T, T>
where
    T: PartialOrd + Send + Sync + 'static,
{
    from_predicate(move |value| *value >= low && *value <= high, message)
}

fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

/// Accept strings whose trimmed length is at least `bound` characters.
pub fn min_length(bound: usize, message: impl Into<String>) -> Validator<String, String> {
    from_predicate(move |value: &String| trimmed_len(value) >= bound, message)
}

/// Accept strings whose trimmed length is at most `bound` characters.
pub fn max_length(bound: usize, message: impl Into<String>) -> Validator<String, String> {
    from_predicate(move |value: &String| trimmed_len(value) <= bound, message)
}

/// Accept strings whose trimmed length lies within `[low, high]` characters.
pub fn length_range(
    low: usize,
    high: usize,
    message: impl Into<String>,
) -> Validator<String, String> {
    from_predicate(
        move |value: &String| (low..=high).contains(&trimmed_len(value)),
        message,
    )
}

/// Accept strings that match `regex`.
pub fn pattern(regex: Regex, message: impl Into<String>) -> Validator<String, String> {
    from_predicate(move |value: &String| regex.is_match(value), message)
}

/// Reject the empty string.
pub fn non_empty(message: impl Into<String>) -> Validator<String, String> {
    from_predicate(|value: &String| !value.is_empty(), message)
}

/// Reject blank strings and trim the accepted value.
pub fn non_blank(message: impl Into<String>) -> Validator<String, String> {
    from_predicate(|value: &String| !value.trim().is_empty(), message)
        .transform(|value| value.trim().to_string())
}

/// Accept a valid email address. Empty strings pass; pair with
/// [`non_blank`] to require a value.
pub fn email(message: impl Into<String>) -> Validator<String, String> {
    from_predicate(
        |value: &String| value.is_empty() || email_address::EmailAddress::is_valid(value),
        message,
    )
}

/// Accept values equal to `expected`.
pub fn equals<T>(expected: T, message: impl Into<String>) -> Validator<T, T>
where
    T: PartialEq + Send + Sync + 'static,
{
    from_predicate(move |value| *value == expected, message)
}

/// Require a checked box.
pub fn checked(message: impl Into<String>) -> Validator<bool, bool> {
    from_predicate(|value: &bool| *value, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_length_bounds_are_inclusive_and_trimmed() {
        let validator = length_range(2, 4, "2 to 4");

        assert_eq!(validator.validate("ab".into()).await, Ok("ab".to_string()));
        assert_eq!(validator.validate("abcd".into()).await, Ok("abcd".to_string()));
        assert!(validator.validate("  a  ".into()).await.is_err());
        assert!(validator.validate("abcde".into()).await.is_err());
        assert_eq!(
            min_length(3, "short").validate("  abc ".into()).await,
            Ok("  abc ".to_string())
        );
    }

    #[tokio::test]
    async fn test_length_counts_characters() {
        assert!(max_length(3, "long").validate("ÅÄÖ".into()).await.is_ok());
    }

    #[tokio::test]
    async fn test_numeric_bounds() {
        assert_eq!(min(18, "adult").validate(18).await, Ok(18));
        assert_eq!(min(18, "adult").validate(17).await, Err(ErrorList::new("adult")));
        assert_eq!(max(1.5, "max").validate(1.6).await, Err(ErrorList::new("max")));
        assert!(range(1, 3, "range").validate(3).await.is_ok());
        assert!(range(1, 3, "range").validate(0).await.is_err());
    }

    #[tokio::test]
    async fn test_non_blank_trims() {
        let validator = non_blank("Value should be a non-blank string!");
        assert_eq!(validator.validate("  Ada ".into()).await, Ok("Ada".to_string()));
        assert_eq!(
            validator.validate("   ".into()).await,
            Err(ErrorList::new("Value should be a non-blank string!"))
        );
    }

    #[tokio::test]
    async fn test_pattern_and_email() {
        let digits = Regex::new(r"^\d+$").unwrap();
        assert!(pattern(digits.clone(), "digits").validate("123".into()).await.is_ok());
        assert!(pattern(digits, "digits").validate("12a".into()).await.is_err());

        let validator = email("Invalid email");
        assert!(validator.validate("ada@example.com".into()).await.is_ok());
        assert!(validator.validate(String::new()).await.is_ok());
        assert!(validator.validate("ada@".into()).await.is_err());
    }

    #[tokio::test]
    async fn test_defined_and_refinement() {
        assert_eq!(defined::<i64>("Required").validate(Some(1)).await, Ok(1));
        assert_eq!(
            defined::<i64>("Required").validate(None).await,
            Err(ErrorList::new("Required"))
        );

        let parse = from_refinement(|s: String| s.parse::<u8>().ok(), "Not a byte");
        assert_eq!(parse.validate("7".into()).await, Ok(7));
        assert!(parse.validate("700".into()).await.is_err());
    }
}
