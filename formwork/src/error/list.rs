/// Returned when building an [`ErrorList`](crate::result::ErrorList) from no messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("an error list needs at least one message")]
pub struct EmptyErrorList;
