//! Uniform success/failure classification of response envelopes.
//!
//! Callers resolving an operation never inspect envelope fields directly.
//! Every envelope implements [`Classify`], which dispatches purely on the
//! envelope's shape and knows nothing about the operation that produced it.

use super::error_code::ErrorCode;
use super::return_code::ReturnCode;

/// Client-visible result of a response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The peer reported success with this payload.
    Success(T),
    /// The peer reported this failure.
    Failure(ErrorCode),
}

impl<T> Outcome<T> {
    /// Whether this is a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The failure, if any.
    #[must_use]
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Success(_) => None,
            Self::Failure(code) => Some(*code),
        }
    }

    /// Map the success payload.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Success(payload) => Outcome::Success(f(payload)),
            Self::Failure(code) => Outcome::Failure(code),
        }
    }

    /// Convert into a `Result` with the failure as the error.
    ///
    /// # Errors
    ///
    /// Returns the carried [`ErrorCode`] for a failure outcome.
    pub fn into_result(self) -> Result<T, ErrorCode> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(code) => Err(code),
        }
    }
}

/// Shape-based classification of an envelope.
pub trait Classify {
    /// What a successful envelope of this shape yields.
    type Payload;

    /// Classify this envelope.
    fn outcome(&self) -> Outcome<&Self::Payload>;

    /// Whether the envelope represents success.
    fn is_success(&self) -> bool {
        self.outcome().is_success()
    }

    /// The carried failure, if the envelope does not represent success.
    fn error_code(&self) -> Option<ErrorCode> {
        self.outcome().error_code()
    }
}

/// Whether `envelope` represents success.
#[must_use]
pub fn is_success<C: Classify + ?Sized>(envelope: &C) -> bool {
    envelope.is_success()
}

/// The failure carried by `envelope`, or `None` on success.
#[must_use]
pub fn error_of<C: Classify + ?Sized>(envelope: &C) -> Option<ErrorCode> {
    envelope.error_code()
}

impl Classify for ReturnCode {
    type Payload = ();

    fn outcome(&self) -> Outcome<&()> {
        match self {
            Self::Success => Outcome::Success(&()),
            Self::Failure(code) => Outcome::Failure(*code),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::nfs_protocol::error_code::{CommonError, RoutingError};

    #[test]
    fn test_return_code_classification() {
        assert!(is_success(&ReturnCode::Success));
        assert_eq!(error_of(&ReturnCode::Success), None);

        let failed = ReturnCode::from(RoutingError::TimedOut);
        assert!(!is_success(&failed));
        assert_eq!(
            error_of(&failed),
            Some(ErrorCode::Routing(RoutingError::TimedOut))
        );
    }

    #[test]
    fn test_outcome_into_result() {
        let ok: Outcome<u32> = Outcome::Success(4);
        assert_eq!(ok.map(|v| v * 2).into_result(), Ok(8));

        let err: Outcome<u32> = Outcome::Failure(CommonError::NoSuchElement.into());
        assert_eq!(
            err.into_result(),
            Err(ErrorCode::General(CommonError::NoSuchElement))
        );
    }
}
