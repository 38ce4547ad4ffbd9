//! Tagged outcome type shared by every fallible engine operation.
//!
//! Success carries the value, failure carries a classified [`Failure`] with a
//! transience flag so callers can decide whether a retry is worthwhile without
//! inspecting error messages.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Result of an engine operation.
pub type Outcome<T> = Result<T, Failure>;

/// Canonical failure classes for the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed or missing input. The caller must fix the request.
    InvalidArguments,
    /// The event was already applied under the same idempotency key.
    DuplicateEvent,
    /// The referenced workflow, snapshot or event does not exist.
    NotFound,
    /// Persisted data failed structural validation.
    Corrupted,
    /// Unclassified infrastructure failure.
    Unrecognized,
    /// Domain-specific kind raised by a collaborator.
    Domain(String),
}

impl FailureKind {
    /// Returns a human-readable name for this failure kind.
    pub fn display_name(&self) -> &str {
        match self {
            FailureKind::InvalidArguments => "InvalidArguments",
            FailureKind::DuplicateEvent => "DuplicateEvent",
            FailureKind::NotFound => "NotFound",
            FailureKind::Corrupted => "Corrupted",
            FailureKind::Unrecognized => "Unrecognized",
            FailureKind::Domain(name) => name,
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A classified failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
    pub transient: bool,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>, transient: bool) -> Self {
        Self {
            kind,
            detail: detail.into(),
            transient,
        }
    }

    pub fn invalid_arguments(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidArguments, detail, false)
    }

    pub fn duplicate_event(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::DuplicateEvent, detail, false)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, detail, false)
    }

    pub fn corrupted(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::Corrupted, detail, false)
    }

    /// Infrastructure failures are always worth a retry with backoff.
    pub fn unrecognized(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::Unrecognized, detail, true)
    }

    pub fn is_kind(&self, kind: &FailureKind) -> bool {
        &self.kind == kind
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let retry = if self.transient { "transient" } else { "permanent" };
        write!(f, "{} ({}): {}", self.kind, retry, self.detail)
    }
}

impl std::error::Error for Failure {}

pub fn make_success<T>(value: T) -> Outcome<T> {
    Ok(value)
}

pub fn make_failure<T>(kind: FailureKind, detail: impl Into<String>, transient: bool) -> Outcome<T> {
    Err(Failure::new(kind, detail, transient))
}

/// Failure inspection helpers for [`Outcome`].
pub trait OutcomeExt<T> {
    fn is_success(&self) -> bool;
    fn is_failure(&self) -> bool;
    fn is_failure_of_kind(&self, kind: &FailureKind) -> bool;
    fn is_failure_transient(&self) -> bool;
    /// Returns the success value.
    ///
    /// # Panics
    ///
    /// Panics when the outcome is a failure. Only call this where a
    /// precondition already guarantees success.
    fn success_value_or_panic(self) -> T;
}

impl<T> OutcomeExt<T> for Outcome<T> {
    fn is_success(&self) -> bool {
        self.is_ok()
    }

    fn is_failure(&self) -> bool {
        self.is_err()
    }

    fn is_failure_of_kind(&self, kind: &FailureKind) -> bool {
        matches!(self, Err(failure) if failure.is_kind(kind))
    }

    fn is_failure_transient(&self) -> bool {
        matches!(self, Err(failure) if failure.transient)
    }

    #[track_caller]
    fn success_value_or_panic(self) -> T {
        match self {
            Ok(value) => value,
            Err(failure) => panic!("expected a successful outcome, got {}", failure),
        }
    }
}

#[cfg(test)]
#[path = "tests/outcome_tests.rs"]
mod tests;
