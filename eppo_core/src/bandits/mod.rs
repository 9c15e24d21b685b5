mod eval;

pub use eval::{evaluate_bandit, BanditEvalResult};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// A single bandit's configuration, as delivered in the configuration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanditModel {
    pub bandit_key: String,
    pub model_name: String,
    pub model_version: String,
    #[serde(deserialize_with = "crate::timestamp::deserialize_timestamp")]
    pub updated_at: Timestamp,
    pub model_data: BanditModelData,
}

/// The linear-scoring coefficients that drive action selection for one bandit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanditModelData {
    pub gamma: f64,
    pub default_action_score: f64,
    pub action_probability_floor: f64,
    pub coefficients: HashMap<String, ActionCoefficients>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCoefficients {
    pub action_key: String,
    pub intercept: f64,
    #[serde(default)]
    pub subject_numeric_coefficients: Vec<NumericCoefficient>,
    #[serde(default)]
    pub subject_categorical_coefficients: Vec<CategoricalCoefficient>,
    #[serde(default)]
    pub action_numeric_coefficients: Vec<NumericCoefficient>,
    #[serde(default)]
    pub action_categorical_coefficients: Vec<CategoricalCoefficient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericCoefficient {
    pub attribute_key: String,
    pub coefficient: f64,
    pub missing_value_coefficient: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalCoefficient {
    pub attribute_key: String,
    pub missing_value_coefficient: f64,
    pub value_coefficients: HashMap<String, f64>,
}
