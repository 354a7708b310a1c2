//! Tagged results returned by [`DataClient`](super::DataClient).
//!
//! Callers can tell "no such data" apart from "the backend could not be
//! reached" and from "the request was superseded", while still getting
//! something renderable out of every call.

use std::fmt;

use drugbit_core::Error;
use serde::Serialize;

use crate::api::ApiError;

/// Why a fetch failed after retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidRequest,
    NotFound,
    RateLimited,
    Timeout,
    Auth,
    Http,
    Network,
    Malformed,
    Backend,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::InvalidRequest => "invalid request",
            FailureKind::NotFound => "not found",
            FailureKind::RateLimited => "rate limited",
            FailureKind::Timeout => "timeout",
            FailureKind::Auth => "authentication",
            FailureKind::Http => "http",
            FailureKind::Network => "network",
            FailureKind::Malformed => "malformed response",
            FailureKind::Backend => "backend",
        };
        f.write_str(name)
    }
}

/// A failed fetch with enough detail to diagnose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub detail: String,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.detail)
    }
}

impl From<&ApiError> for FetchFailure {
    fn from(err: &ApiError) -> Self {
        let (kind, status) = match err {
            ApiError::InvalidRequest(_) => (FailureKind::InvalidRequest, None),
            ApiError::AuthError { status } => (FailureKind::Auth, Some(*status)),
            ApiError::NotFound(_) => (FailureKind::NotFound, Some(404)),
            ApiError::RateLimited => (FailureKind::RateLimited, Some(429)),
            ApiError::HttpError { status, .. } => (FailureKind::Http, Some(*status)),
            ApiError::Timeout => (FailureKind::Timeout, None),
            ApiError::Network(_) => (FailureKind::Network, None),
            ApiError::Parse(_) | ApiError::Shape(_) => (FailureKind::Malformed, None),
            ApiError::Backend(_) => (FailureKind::Backend, None),
        };
        FetchFailure { kind, status, detail: err.to_string() }
    }
}

impl From<FetchFailure> for Error {
    fn from(failure: FetchFailure) -> Self {
        let detail = failure.detail;
        match failure.kind {
            FailureKind::InvalidRequest => Error::InvalidInput(detail),
            FailureKind::NotFound => Error::NotFound(detail),
            FailureKind::RateLimited => Error::RateLimited(detail),
            FailureKind::Timeout => Error::Timeout(detail),
            FailureKind::Auth => Error::AuthError(detail),
            FailureKind::Http => Error::HttpError(detail),
            FailureKind::Network => Error::Network(detail),
            FailureKind::Malformed => Error::MalformedResponse(detail),
            FailureKind::Backend => Error::Backend(detail),
        }
    }
}

/// Result of a [`DataClient`](super::DataClient) operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// Data was found.
    Data(T),
    /// The request succeeded and there is nothing to show.
    Empty,
    /// The caller cancelled; render nothing.
    Canceled,
    /// The request failed after retries.
    Failed(FetchFailure),
}

impl<T> FetchOutcome<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchOutcome::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchOutcome::Data(data) => Some(data),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FetchOutcome::Empty)
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, FetchOutcome::Canceled)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        self.and_then(|data| FetchOutcome::Data(f(data)))
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> FetchOutcome<U>) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Data(data) => f(data),
            FetchOutcome::Empty => FetchOutcome::Empty,
            FetchOutcome::Canceled => FetchOutcome::Canceled,
            FetchOutcome::Failed(failure) => FetchOutcome::Failed(failure),
        }
    }

    /// Convert to `Result`: `Ok(None)` for `Empty`, `Err` for failure or cancellation.
    pub fn into_result(self) -> Result<Option<T>, Error> {
        match self {
            FetchOutcome::Data(data) => Ok(Some(data)),
            FetchOutcome::Empty => Ok(None),
            FetchOutcome::Canceled => Err(Error::Canceled),
            FetchOutcome::Failed(failure) => Err(failure.into()),
        }
    }
}

impl<T: Default> FetchOutcome<T> {
    /// The data, or `T::default()` for every other outcome.
    pub fn into_data_or_default(self) -> T {
        self.into_data().unwrap_or_default()
    }
}

impl<T> FetchOutcome<Vec<T>> {
    /// `Empty` for an empty list, `Data` otherwise.
    pub fn from_list(items: Vec<T>) -> Self {
        if items.is_empty() { FetchOutcome::Empty } else { FetchOutcome::Data(items) }
    }
}

impl<T> From<Option<T>> for FetchOutcome<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FetchOutcome::Empty, FetchOutcome::Data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_list() {
        assert_eq!(FetchOutcome::<Vec<i32>>::from_list(vec![]), FetchOutcome::Empty);
        assert_eq!(FetchOutcome::from_list(vec![1]), FetchOutcome::Data(vec![1]));
    }

    #[test]
    fn test_into_data_or_default() {
        let failed: FetchOutcome<Vec<i32>> = FetchOutcome::Failed(FetchFailure::from(&ApiError::Timeout));
        assert!(failed.into_data_or_default().is_empty());
        assert_eq!(FetchOutcome::Data(vec![1]).into_data_or_default(), vec![1]);
    }

    #[test]
    fn test_failure_classification() {
        let failure = FetchFailure::from(&ApiError::RateLimited);
        assert_eq!(failure.kind, FailureKind::RateLimited);
        assert_eq!(failure.status, Some(429));

        let failure = FetchFailure::from(&ApiError::Shape("expected array".into()));
        assert_eq!(failure.kind, FailureKind::Malformed);
        assert!(failure.detail.contains("expected array"));

        let failure = FetchFailure::from(&ApiError::NotFound("/drugs/sitemap".into()));
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert!(matches!(Error::from(failure), Error::NotFound(_)));

        let failure = FetchFailure::from(&ApiError::HttpError { status: 503, message: None });
        assert_eq!(failure.kind, FailureKind::Http);
        assert_eq!(failure.status, Some(503));
    }

    #[test]
    fn test_into_result() {
        assert!(matches!(FetchOutcome::Data(1).into_result(), Ok(Some(1))));
        assert!(matches!(FetchOutcome::<i32>::Empty.into_result(), Ok(None)));
        assert!(matches!(FetchOutcome::<i32>::Canceled.into_result(), Err(Error::Canceled)));

        let failed: FetchOutcome<i32> = FetchOutcome::Failed(FetchFailure::from(&ApiError::Timeout));
        assert!(matches!(failed.into_result(), Err(Error::Timeout(_))));
    }

    #[test]
    fn test_and_then_preserves_non_data() {
        let canceled: FetchOutcome<i32> = FetchOutcome::Canceled;
        assert!(canceled.map(|v| v + 1).is_canceled());
        assert_eq!(FetchOutcome::Data(2).map(|v| v * 2), FetchOutcome::Data(4));
        assert_eq!(FetchOutcome::Data(2).and_then(|_| FetchOutcome::<i32>::Empty), FetchOutcome::Empty);
    }
}
