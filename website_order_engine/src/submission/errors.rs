use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::traits::StoreError;

/// One problem with a submitted draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new<S: Into<String>>(field: S, message: S) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

fn list(violations: &[FieldViolation]) -> String {
    violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("The order has {} problem(s): {}", .0.len(), list(.0))]
    ValidationError(Vec<FieldViolation>),
    #[error("You need to be signed in to submit an order")]
    Unauthenticated,
    #[error("This order has already been submitted")]
    DuplicateSubmission,
    #[error("The order could not be saved. {0}")]
    PersistenceFailure(#[from] StoreError),
}

impl SubmissionError {
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            SubmissionError::ValidationError(v) => v.as_slice(),
            _ => &[],
        }
    }
}
