use serde::Serialize;

use crate::attributes::Attributes;
use crate::timestamp::Timestamp;
use crate::ufc::models::Value;

/// Stable, serializable outcome code for a single flag evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagEvaluationCode {
    Match,
    ConfigurationMissing,
    FlagUnrecognizedOrDisabled,
    DefaultAllocationNull,
    TypeMismatch,
    AssignmentError,
}

/// Stable, serializable outcome code for a single allocation considered during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationEvaluationCode {
    Unevaluated,
    Match,
    BeforeStartTime,
    AfterEndTime,
    FailingRule,
    TrafficExposureMiss,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllocationEvaluationDetails {
    pub key: String,
    /// 1-based position among the flag's declared allocations.
    pub order_position: usize,
    pub allocation_evaluation_code: AllocationEvaluationCode,
}

/// Full trace of a single flag evaluation, returned alongside the assignment value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDetails {
    pub flag_evaluation_code: FlagEvaluationCode,
    pub flag_evaluation_description: String,
    pub variation_key: Option<String>,
    pub variation_value: Option<Value>,
    pub allocations: Vec<AllocationEvaluationDetails>,
    pub subject_key: String,
    pub subject_attributes: Attributes,
    pub timestamp: Timestamp,
}

impl EvaluationDetails {
    pub fn description_for(
        code: FlagEvaluationCode,
        flag_key: &str,
        subject_key: &str,
        variation_key: Option<&str>,
        allocation_key: Option<&str>,
    ) -> String {
        match code {
            FlagEvaluationCode::Match => format!(
                "Supplied attributes match rules defined in allocation \"{}\" and were assigned variation \"{}\".",
                allocation_key.unwrap_or(""),
                variation_key.unwrap_or(""),
            ),
            FlagEvaluationCode::ConfigurationMissing => {
                "Configuration has not been loaded yet.".to_owned()
            }
            FlagEvaluationCode::FlagUnrecognizedOrDisabled => format!(
                "Feature flag \"{flag_key}\" is not enabled or does not exist on this server, so returning the default value."
            ),
            FlagEvaluationCode::DefaultAllocationNull => format!(
                "No allocations matched for subject \"{subject_key}\", so returning the default value."
            ),
            FlagEvaluationCode::TypeMismatch => {
                "Variation value does not match the flag's declared type.".to_owned()
            }
            FlagEvaluationCode::AssignmentError => {
                "An internal error occurred while evaluating this flag.".to_owned()
            }
        }
    }
}

/// Stable, serializable outcome code for a bandit evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BanditEvaluationCode {
    Match,
    NonBanditVariation,
    NoActionsSuppliedForBandit,
    Error,
}
