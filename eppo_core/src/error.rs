use thiserror::Error;

use crate::ufc::eval_details::{BanditEvaluationCode, FlagEvaluationCode};

/// Top-level error type, returned by configuration parsing and by strict-mode evaluation.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to parse configuration: {0}")]
    ConfigurationParseError(String),

    #[error(transparent)]
    EvaluationError(#[from] EvaluationError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The subset of evaluation failures that can reach a strict-mode caller as an `Err`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("configuration has not been loaded yet")]
    ConfigurationMissing,

    #[error("flag's declared type does not match the requested type")]
    TypeMismatch,

    #[error("unexpected error evaluating flag")]
    AssignmentError,
}

/// Internal control-flow type covering every way a flag/bandit evaluation can fail to produce a
/// value, including "normal" non-error outcomes that are not surfaced as `Err` even in strict
/// mode's underlying evaluator call (only the client façade decides what becomes an `Err`).
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationFailure {
    ConfigurationMissing,
    FlagUnrecognizedOrDisabled,
    DefaultAllocationNull,
    TypeMismatch,
    AssignmentError,
    NonBanditVariation,
    NoActionsSuppliedForBandit,
    BanditError,
}

impl From<&EvaluationFailure> for FlagEvaluationCode {
    fn from(value: &EvaluationFailure) -> Self {
        match value {
            EvaluationFailure::ConfigurationMissing => FlagEvaluationCode::ConfigurationMissing,
            EvaluationFailure::FlagUnrecognizedOrDisabled => {
                FlagEvaluationCode::FlagUnrecognizedOrDisabled
            }
            EvaluationFailure::DefaultAllocationNull => FlagEvaluationCode::DefaultAllocationNull,
            EvaluationFailure::TypeMismatch => FlagEvaluationCode::TypeMismatch,
            EvaluationFailure::AssignmentError
            | EvaluationFailure::NonBanditVariation
            | EvaluationFailure::NoActionsSuppliedForBandit
            | EvaluationFailure::BanditError => FlagEvaluationCode::AssignmentError,
        }
    }
}

impl From<&EvaluationFailure> for BanditEvaluationCode {
    fn from(value: &EvaluationFailure) -> Self {
        match value {
            EvaluationFailure::NonBanditVariation => BanditEvaluationCode::NonBanditVariation,
            EvaluationFailure::NoActionsSuppliedForBandit => {
                BanditEvaluationCode::NoActionsSuppliedForBandit
            }
            _ => BanditEvaluationCode::Error,
        }
    }
}

impl From<EvaluationFailure> for Option<EvaluationError> {
    fn from(value: EvaluationFailure) -> Self {
        match value {
            EvaluationFailure::ConfigurationMissing => Some(EvaluationError::ConfigurationMissing),
            EvaluationFailure::TypeMismatch => Some(EvaluationError::TypeMismatch),
            EvaluationFailure::AssignmentError
            | EvaluationFailure::NonBanditVariation
            | EvaluationFailure::NoActionsSuppliedForBandit
            | EvaluationFailure::BanditError => Some(EvaluationError::AssignmentError),
            // Flag-unrecognized/default-allocation-null are not treated as Err even in strict
            // mode's evaluator layer; the client façade still returns the default for them.
            EvaluationFailure::FlagUnrecognizedOrDisabled
            | EvaluationFailure::DefaultAllocationNull => None,
        }
    }
}
