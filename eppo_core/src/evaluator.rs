use std::collections::HashMap;
use std::sync::Arc;

use crate::attributes::{Attributes, ContextAttributes};
use crate::bandits::evaluate_bandit;
use crate::configuration::Configuration;
use crate::configuration_store::ConfigurationStore;
use crate::error::EvaluationFailure;
use crate::events::{default_meta_data, BanditEvent};
use crate::timestamp::Timestamp;
use crate::ufc::{Assignment, FlagEvalResult, VariationType};

/// Ties a [`ConfigurationStore`] to the flag and bandit evaluation algorithms. This is the piece
/// [`crate`] consumers embed directly; the `eppo` client crate wraps it with typed accessors and
/// graceful/strict error handling.
pub struct Evaluator {
    configuration_store: Arc<ConfigurationStore>,
}

impl Evaluator {
    pub fn new(configuration_store: Arc<ConfigurationStore>) -> Self {
        Evaluator { configuration_store }
    }

    pub fn configuration(&self) -> Option<Arc<Configuration>> {
        self.configuration_store.get_configuration()
    }

    /// Evaluates `flag_key` for the given subject, checking the flag's declared type against
    /// `expected_type` first.
    pub fn get_assignment(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        expected_type: VariationType,
        now: Timestamp,
    ) -> FlagEvalOutcome {
        let Some(configuration) = self.configuration() else {
            return FlagEvalOutcome::Failure(EvaluationFailure::ConfigurationMissing, None);
        };
        let Some(flag) = configuration.get_flag(flag_key) else {
            return FlagEvalOutcome::Failure(EvaluationFailure::FlagUnrecognizedOrDisabled, None);
        };
        if let Err(failure) = flag.verify_type(expected_type) {
            return FlagEvalOutcome::Failure(failure, None);
        }

        let FlagEvalResult { assignment, details } = flag.eval(subject_key, subject_attributes, now);
        match assignment {
            Ok(assignment) => FlagEvalOutcome::Success(assignment, details),
            Err(failure) => FlagEvalOutcome::Failure(failure, Some(details)),
        }
    }

    /// Evaluates the bandit associated with `flag_key`'s resulting variation, if any.
    pub fn get_bandit_action(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &ContextAttributes,
        actions: &HashMap<String, ContextAttributes>,
        variation_value: &str,
        now: Timestamp,
    ) -> Result<BanditOutcome, EvaluationFailure> {
        let Some(configuration) = self.configuration() else {
            return Err(EvaluationFailure::ConfigurationMissing);
        };
        let Some(bandit_key) = configuration.get_bandit_key(flag_key, variation_value) else {
            return Err(EvaluationFailure::NonBanditVariation);
        };
        if actions.is_empty() {
            return Err(EvaluationFailure::NoActionsSuppliedForBandit);
        }
        let Some(bandit) = configuration.get_bandit(bandit_key) else {
            return Err(EvaluationFailure::BanditError);
        };

        let Some(result) =
            evaluate_bandit(&bandit.model_data, flag_key, subject_key, subject_attributes, actions)
        else {
            return Err(EvaluationFailure::BanditError);
        };

        let action_attributes = actions.get(&result.action_key).cloned().unwrap_or_default();
        let event = BanditEvent {
            flag_key: flag_key.to_owned(),
            bandit_key: bandit_key.to_owned(),
            subject: subject_key.to_owned(),
            action: Some(result.action_key.clone()),
            action_probability: result.action_probability,
            optimality_gap: result.optimality_gap,
            model_version: bandit.model_version.clone(),
            timestamp: now,
            subject_numeric_attributes: subject_attributes.numeric.clone(),
            subject_categorical_attributes: subject_attributes.categorical.clone(),
            action_numeric_attributes: action_attributes.numeric.clone(),
            action_categorical_attributes: action_attributes.categorical.clone(),
            meta_data: default_meta_data(),
        };

        Ok(BanditOutcome { action_key: result.action_key, event })
    }
}

pub enum FlagEvalOutcome {
    Success(Assignment, crate::ufc::eval_details::EvaluationDetails),
    Failure(EvaluationFailure, Option<crate::ufc::eval_details::EvaluationDetails>),
}

pub struct BanditOutcome {
    pub action_key: String,
    pub event: BanditEvent,
}
