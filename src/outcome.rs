use serde::Serialize;
use std::fmt;
use std::future::Future;
use thiserror::Error;

/// # Validation Error Kinds
///
/// Classifies why a pipeline stopped. Every failing step reports exactly one
/// of these codes together with a human readable message.
///
/// - `Empty`: required input or state is missing (no address, nothing parsed,
///   an empty configuration list, an unreachable remote list)
/// - `TooShort`: the address is too short to be real
/// - `InvalidFormat`: structural, local-part or typo violations
/// - `NotAllowed`: policy blocks (TLD, domain lists, temporary services)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Empty,
    TooShort,
    InvalidFormat,
    NotAllowed,
}

impl ErrorKind {
    /// Stable string code, e.g. `"INVALID_FORMAT"`
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Empty => "EMPTY",
            ErrorKind::TooShort => "TOO_SHORT",
            ErrorKind::InvalidFormat => "INVALID_FORMAT",
            ErrorKind::NotAllowed => "NOT_ALLOWED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The failure half of an [`Outcome`]: an error code plus message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct ValidationFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// # Short-Circuiting Outcome
///
/// Threads a value through a chain of validation steps. Once an outcome is a
/// `Failure` every later combinator hands it back untouched, so the first
/// failure's code and message are what the caller sees.
///
/// ## Example
/// ```
/// use email_sanitizer::outcome::{ErrorKind, Outcome};
///
/// let outcome = Outcome::success("ab".to_string())
///     .ensure(|v| v.len() >= 5, ErrorKind::TooShort, "too short")
///     .ensure(|v| v.contains('@'), ErrorKind::InvalidFormat, "no @");
///
/// assert_eq!(outcome.error_kind(), Some(ErrorKind::TooShort));
/// assert_eq!(outcome.error_message(), Some("too short"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(ValidationFailure),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Outcome::Failure(ValidationFailure::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationFailure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(failure) => Some(failure),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(|failure| failure.kind)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error().map(|failure| failure.message.as_str())
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    /// Converts into a `Result` so pipelines can be finished with `?`.
    pub fn into_result(self) -> Result<T, ValidationFailure> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(failure) => Err(failure),
        }
    }

    /// Fails with `kind`/`message` unless `predicate` holds for the value.
    pub fn ensure<P>(self, predicate: P, kind: ErrorKind, message: impl Into<String>) -> Self
    where
        P: FnOnce(&T) -> bool,
    {
        match self {
            Outcome::Success(value) if predicate(&value) => Outcome::Success(value),
            Outcome::Success(_) => Outcome::failure(kind, message),
            failure => failure,
        }
    }

    /// Replaces the value with `transform(value)`.
    ///
    /// A transform that yields `None` turns the outcome into an `Empty`
    /// failure.
    pub fn map<U, F>(self, transform: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Option<U>,
    {
        match self {
            Outcome::Success(value) => match transform(value) {
                Some(mapped) => Outcome::Success(mapped),
                None => Outcome::failure(ErrorKind::Empty, "Transform produced no value"),
            },
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Runs a custom step on the value. The step is never invoked for a
    /// failed outcome.
    pub fn then<U, F>(self, step: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Outcome<U>,
    {
        match self {
            Outcome::Success(value) => step(value),
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }

    /// Async counterpart of [`Outcome::then`] for steps that suspend on I/O.
    pub async fn then_async<U, F, Fut>(self, step: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Outcome<U>>,
    {
        match self {
            Outcome::Success(value) => step(value).await,
            Outcome::Failure(failure) => Outcome::Failure(failure),
        }
    }
}

impl<T> From<Result<T, ValidationFailure>> for Outcome<T> {
    fn from(result: Result<T, ValidationFailure>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(failure) => Outcome::Failure(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_passes_value_through() {
        let outcome = Outcome::success(7).ensure(|v| *v > 5, ErrorKind::TooShort, "too small");
        assert_eq!(outcome, Outcome::Success(7));
    }

    #[test]
    fn test_ensure_converts_to_failure() {
        let outcome = Outcome::success(3).ensure(|v| *v > 5, ErrorKind::TooShort, "too small");
        assert!(outcome.is_failure());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::TooShort));
        assert_eq!(outcome.error_message(), Some("too small"));
    }

    #[test]
    fn test_first_failure_wins() {
        let outcome = Outcome::success(1)
            .ensure(|_| false, ErrorKind::Empty, "first")
            .ensure(|_| false, ErrorKind::NotAllowed, "second");

        assert_eq!(outcome.error_kind(), Some(ErrorKind::Empty));
        assert_eq!(outcome.error_message(), Some("first"));
    }

    #[test]
    fn test_map_none_becomes_empty_failure() {
        let outcome: Outcome<i32> = Outcome::success(1).map(|_| None);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Empty));
    }

    #[test]
    fn test_map_replaces_value() {
        let outcome = Outcome::success(2).map(|v| Some(v * 10));
        assert_eq!(outcome.into_value(), Some(20));
    }

    #[test]
    fn test_then_skips_step_on_failure() {
        let mut called = false;
        let outcome: Outcome<i32> = Outcome::failure(ErrorKind::InvalidFormat, "bad");
        let outcome = outcome.then(|v| {
            called = true;
            Outcome::success(v + 1)
        });

        assert!(!called, "step must not run on a failed outcome");
        assert_eq!(outcome.error_message(), Some("bad"));
    }

    #[tokio::test]
    async fn test_then_async_runs_on_success() {
        let outcome = Outcome::success(2)
            .then_async(|v| async move { Outcome::success(v * 2) })
            .await;
        assert_eq!(outcome.value(), Some(&4));
    }

    #[test]
    fn test_into_result_round_trip() {
        let failure: Outcome<()> = Outcome::failure(ErrorKind::NotAllowed, "blocked");
        let err = failure.into_result().unwrap_err();
        assert_eq!(err.to_string(), "NOT_ALLOWED: blocked");

        let back: Outcome<()> = Err(err).into();
        assert_eq!(back.error_kind(), Some(ErrorKind::NotAllowed));
    }
}
