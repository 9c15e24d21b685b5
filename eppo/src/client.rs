use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use eppo_core::configuration::Configuration;
use eppo_core::configuration_store::ConfigurationStore;
use eppo_core::error::{EvaluationError, EvaluationFailure};
use eppo_core::evaluator::{Evaluator, FlagEvalOutcome};
use eppo_core::ufc::eval_details::EvaluationDetails;
use eppo_core::ufc::{AssignmentValue, VariationType};
use eppo_core::{Attributes, ContextAttributes, Error};

use crate::config::FailureMode;
use crate::ClientConfig;

type AssignmentCacheKey = (String, String);
type AssignmentCacheValue = (String, String);
type BanditCacheKey = (String, String);
type BanditCacheValue = (String, String);

/// The Eppo client. Evaluates feature flags and bandits for subjects, forwarding assignment and
/// bandit events through the configured loggers (deduplicated via an internal cache so repeat
/// calls for the same subject/flag/outcome don't re-log).
pub struct Client<'a> {
    configuration_store: Arc<ConfigurationStore>,
    evaluator: Evaluator,
    config: ClientConfig<'a>,
    assignment_cache: Mutex<eppo_core::cache::TwoQueueCache<AssignmentCacheKey, AssignmentCacheValue>>,
    bandit_cache: Mutex<eppo_core::cache::TwoQueueCache<BanditCacheKey, BanditCacheValue>>,
}

impl<'a> Client<'a> {
    pub(crate) fn new(config: ClientConfig<'a>) -> Self {
        let configuration_store = Arc::new(ConfigurationStore::new());
        let evaluator = Evaluator::new(configuration_store.clone());
        let assignment_cache =
            Mutex::new(eppo_core::cache::TwoQueueCache::new(config.assignment_cache_capacity));
        let bandit_cache =
            Mutex::new(eppo_core::cache::TwoQueueCache::new(config.bandit_cache_capacity));
        Client { configuration_store, evaluator, config, assignment_cache, bandit_cache }
    }

    /// Parses and publishes a new configuration snapshot. The embedding application is
    /// responsible for fetching the configuration bytes (over HTTP, from a file, ...); this only
    /// handles turning them into a usable, precomputed snapshot.
    pub fn set_configuration(&self, configuration_json: &[u8]) -> Result<(), Error> {
        let configuration = Configuration::from_json(configuration_json)?;
        self.configuration_store.set_configuration(configuration);
        Ok(())
    }

    /// Directly install an already-parsed configuration. Mainly useful for tests.
    pub fn set_configuration_parsed(&self, configuration: Configuration) {
        self.configuration_store.set_configuration(configuration);
    }

    /// Assigns a boolean variation to `subject_key`, or `default_value` if ineligible.
    pub fn get_boolean_assignment(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        default_value: bool,
    ) -> Result<bool, Error> {
        self.get_assignment_inner(
            flag_key,
            subject_key,
            subject_attributes,
            VariationType::Boolean,
            default_value,
            |v| v.as_boolean(),
        )
    }

    /// Assigns an integer variation to `subject_key`, or `default_value` if ineligible.
    pub fn get_integer_assignment(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        default_value: i64,
    ) -> Result<i64, Error> {
        self.get_assignment_inner(
            flag_key,
            subject_key,
            subject_attributes,
            VariationType::Integer,
            default_value,
            |v| v.as_integer(),
        )
    }

    /// Assigns a numeric variation to `subject_key`, or `default_value` if ineligible.
    pub fn get_numeric_assignment(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        default_value: f64,
    ) -> Result<f64, Error> {
        self.get_assignment_inner(
            flag_key,
            subject_key,
            subject_attributes,
            VariationType::Numeric,
            default_value,
            |v| v.as_numeric(),
        )
    }

    /// Assigns a string variation to `subject_key`, or `default_value` if ineligible.
    pub fn get_string_assignment(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        default_value: String,
    ) -> Result<String, Error> {
        self.get_assignment_inner(
            flag_key,
            subject_key,
            subject_attributes,
            VariationType::String,
            default_value,
            |v| v.as_string().map(str::to_owned),
        )
    }

    /// Assigns a JSON variation to `subject_key`, or `default_value` if ineligible.
    pub fn get_json_assignment(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        default_value: serde_json::Value,
    ) -> Result<serde_json::Value, Error> {
        self.get_assignment_inner(
            flag_key,
            subject_key,
            subject_attributes,
            VariationType::Json,
            default_value,
            |v| v.as_json().cloned(),
        )
    }

    /// Like [`Client::get_json_assignment`], but returns the JSON variation as a compact string.
    pub fn get_json_string_assignment(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        default_value: String,
    ) -> Result<String, Error> {
        let value = self.get_json_assignment(
            flag_key,
            subject_key,
            subject_attributes,
            serde_json::from_str(&default_value).unwrap_or(serde_json::Value::Null),
        )?;
        Ok(serde_json::to_string(&value).unwrap_or(default_value))
    }

    fn get_assignment_inner<T>(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        expected_type: VariationType,
        default_value: T,
        convert: impl FnOnce(&AssignmentValue) -> Option<T>,
    ) -> Result<T, Error> {
        let (value, _details) = self.get_assignment_with_details(
            flag_key,
            subject_key,
            subject_attributes,
            expected_type,
        )?;
        match value.as_ref().and_then(convert) {
            Some(v) => Ok(v),
            None => match value {
                Some(_) => {
                    log::warn!(target: "eppo", flag_key, subject_key; "assignment value did not match expected type");
                    self.fail_or_default(EvaluationFailure::AssignmentError, default_value)
                }
                None => Ok(default_value),
            },
        }
    }

    /// Evaluates `flag_key` for `subject_key` and returns both the value (if any) and the full
    /// evaluation-details trace. Honors strict/graceful failure mode the same way the typed
    /// accessors do.
    pub fn get_assignment_with_details(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        expected_type: VariationType,
    ) -> Result<(Option<AssignmentValue>, Option<EvaluationDetails>), Error> {
        if subject_key.is_empty() {
            return self.fail_with_details(EvaluationFailure::AssignmentError, "subject key must not be empty");
        }
        if flag_key.is_empty() {
            return self.fail_with_details(EvaluationFailure::AssignmentError, "flag key must not be empty");
        }

        let now = now();
        match self.evaluator.get_assignment(
            flag_key,
            subject_key,
            subject_attributes,
            expected_type,
            now,
        ) {
            FlagEvalOutcome::Success(assignment, details) => {
                if let Some(event) = assignment.event {
                    let key = (flag_key.to_owned(), subject_key.to_owned());
                    let value = (event.allocation.clone(), event.variation.clone());
                    self.log_assignment_deduped(key, value, event);
                }
                Ok((Some(assignment.value), Some(details)))
            }
            FlagEvalOutcome::Failure(failure, details) => {
                match self.config.failure_mode {
                    FailureMode::Strict => {
                        if let Some(err): Option<EvaluationError> = failure.into() {
                            return Err(Error::EvaluationError(err));
                        }
                    }
                    FailureMode::Graceful => {}
                }
                Ok((None, details))
            }
        }
    }

    /// Evaluates the bandit associated with `flag_key`'s assigned variation (if any), selecting
    /// one action from `actions`. Returns the underlying flag's string variation together with
    /// the selected action, if a bandit applies.
    pub fn get_bandit_action(
        &self,
        flag_key: &str,
        subject_key: &str,
        subject_attributes: &Attributes,
        actions: &HashMap<String, Attributes>,
        default_variation: String,
    ) -> Result<BanditActionResult, Error> {
        let variation = self.get_string_assignment(
            flag_key,
            subject_key,
            subject_attributes,
            default_variation.clone(),
        )?;

        let subject_context = ContextAttributes::from(subject_attributes);
        let action_contexts: HashMap<String, ContextAttributes> = actions
            .iter()
            .map(|(k, v)| (k.clone(), ContextAttributes::from(v)))
            .collect();

        let now = now();
        match self.evaluator.get_bandit_action(
            flag_key,
            subject_key,
            &subject_context,
            &action_contexts,
            &variation,
            now,
        ) {
            Ok(outcome) => {
                let key = (flag_key.to_owned(), subject_key.to_owned());
                let value = (outcome.event.bandit_key.clone(), outcome.action_key.clone());
                self.log_bandit_action_deduped(key, value, outcome.event);
                Ok(BanditActionResult { variation, action: Some(outcome.action_key) })
            }
            Err(EvaluationFailure::NonBanditVariation) => {
                Ok(BanditActionResult { variation, action: None })
            }
            Err(failure) => match self.config.failure_mode {
                FailureMode::Strict => {
                    if let Some(err): Option<EvaluationError> = failure.into() {
                        Err(Error::EvaluationError(err))
                    } else {
                        Ok(BanditActionResult { variation, action: None })
                    }
                }
                FailureMode::Graceful => Ok(BanditActionResult { variation, action: None }),
            },
        }
    }

    fn fail_or_default<T>(&self, failure: EvaluationFailure, default_value: T) -> Result<T, Error> {
        match self.config.failure_mode {
            FailureMode::Strict => {
                let err: Option<EvaluationError> = failure.into();
                match err {
                    Some(err) => Err(Error::EvaluationError(err)),
                    None => Ok(default_value),
                }
            }
            FailureMode::Graceful => Ok(default_value),
        }
    }

    fn fail_with_details(
        &self,
        failure: EvaluationFailure,
        message: &'static str,
    ) -> Result<(Option<AssignmentValue>, Option<EvaluationDetails>), Error> {
        match self.config.failure_mode {
            FailureMode::Strict => {
                log::warn!(target: "eppo"; "{}", message);
                let err: Option<EvaluationError> = failure.into();
                match err {
                    Some(err) => Err(Error::EvaluationError(err)),
                    None => Ok((None, None)),
                }
            }
            FailureMode::Graceful => {
                log::warn!(target: "eppo"; "{}", message);
                Ok((None, None))
            }
        }
    }

    fn log_assignment_deduped(
        &self,
        key: AssignmentCacheKey,
        value: AssignmentCacheValue,
        event: eppo_core::events::AssignmentEvent,
    ) {
        // Held across check, sink call, and insert so two racing callers with the same key can't
        // both pass the check and both log.
        let mut cache = self.assignment_cache.lock().expect("assignment cache poisoned");
        if cache.get(&key) == Some(&value) {
            return;
        }
        if let Err(e) = self.config.assignment_logger.log_assignment(event) {
            log::warn!(target: "eppo"; "assignment logger failed: {e}");
            return;
        }
        cache.insert(key, value);
    }

    fn log_bandit_action_deduped(
        &self,
        key: BanditCacheKey,
        value: BanditCacheValue,
        event: eppo_core::events::BanditEvent,
    ) {
        let mut cache = self.bandit_cache.lock().expect("bandit cache poisoned");
        if cache.get(&key) == Some(&value) {
            return;
        }
        if let Err(e) = self.config.bandit_logger.log_bandit_action(event) {
            log::warn!(target: "eppo"; "bandit logger failed: {e}");
            return;
        }
        cache.insert(key, value);
    }
}

/// The result of a bandit-aware assignment: the flag's underlying string variation, plus the
/// selected action key if the variation was bandit-controlled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanditActionResult {
    /// The flag's underlying string variation.
    pub variation: String,
    /// The selected action key, or `None` if the variation was not bandit-controlled.
    pub action: Option<String>,
}

fn now() -> eppo_core::timestamp::Timestamp {
    chrono::Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn test_client() -> Client<'static> {
        let _ = env_logger::builder().is_test(true).try_init();
        ClientConfig::new().to_client()
    }

    #[test]
    fn returns_default_while_no_configuration() {
        let client = test_client();
        let value = client
            .get_boolean_assignment("flag", "alice", &Map::new(), false)
            .unwrap();
        assert_eq!(value, false);
    }

    #[test]
    fn empty_subject_key_fails_gracefully() {
        let client = test_client();
        let value = client
            .get_boolean_assignment("flag", "", &Map::new(), true)
            .unwrap();
        assert!(value);
    }

    #[test]
    fn strict_mode_surfaces_missing_configuration() {
        let client = ClientConfig::new().strict().to_client();
        let result = client.get_boolean_assignment("flag", "alice", &Map::new(), false);
        assert!(result.is_err());
    }
}
