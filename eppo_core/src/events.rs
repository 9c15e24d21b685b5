use std::collections::HashMap;

use serde::Serialize;

use crate::attributes::Attributes;
use crate::timestamp::Timestamp;
use crate::ufc::eval_details::EvaluationDetails;

/// An assignment event to be recorded by the caller's assignment logger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentEvent {
    pub experiment: String,
    pub feature_flag: String,
    pub allocation: String,
    pub variation: String,
    pub subject: String,
    pub subject_attributes: Attributes,
    pub timestamp: Timestamp,
    pub meta_data: HashMap<String, String>,
    #[serde(flatten)]
    pub extra_logging: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_details: Option<EvaluationDetails>,
}

/// A bandit action event to be recorded by the caller's bandit logger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanditEvent {
    pub flag_key: String,
    pub bandit_key: String,
    pub subject: String,
    pub action: Option<String>,
    pub action_probability: f64,
    pub optimality_gap: f64,
    pub model_version: String,
    pub timestamp: Timestamp,
    pub subject_numeric_attributes: HashMap<String, f64>,
    pub subject_categorical_attributes: HashMap<String, String>,
    pub action_numeric_attributes: HashMap<String, f64>,
    pub action_categorical_attributes: HashMap<String, String>,
    pub meta_data: HashMap<String, String>,
}

pub fn default_meta_data() -> HashMap<String, String> {
    let mut meta = HashMap::new();
    meta.insert("sdkName".to_owned(), "rust".to_owned());
    meta.insert("sdkVersion".to_owned(), env!("CARGO_PKG_VERSION").to_owned());
    meta
}
