use crate::attributes::{AttributeValue, Attributes};
use crate::error::EvaluationFailure;
use crate::events::{default_meta_data, AssignmentEvent};
use crate::sharder::get_salted_shard;
use crate::timestamp::Timestamp;
use crate::ufc::assignment::Assignment;
use crate::ufc::eval_details::{
    AllocationEvaluationCode, AllocationEvaluationDetails, EvaluationDetails, FlagEvaluationCode,
};
use crate::ufc::models::{Allocation, Flag, Shard, ShardRange, Split, Value, VariationType};

/// The full outcome of a single flag evaluation: either a value to assign, or a classified
/// failure, paired unconditionally with the full evaluation-details trace.
pub struct FlagEvalResult {
    pub assignment: Result<Assignment, EvaluationFailure>,
    pub details: EvaluationDetails,
}

enum AllocationOutcome {
    Matched { split: Split, allocation_key: String, do_log: bool },
    NotMatched(AllocationEvaluationCode),
}

impl Flag {
    pub fn verify_type(&self, expected: VariationType) -> Result<(), EvaluationFailure> {
        if self.variation_type != expected {
            Err(EvaluationFailure::TypeMismatch)
        } else {
            Ok(())
        }
    }

    /// Parses the raw variation for `key` against this flag's declared type.
    fn parsed_variation(&self, key: &str) -> Option<Value> {
        let variation = self.variations.get(key)?;
        Value::from_json(&variation.value, self.variation_type)
    }

    pub fn eval(
        &self,
        subject_key: &str,
        subject_attributes: &Attributes,
        now: Timestamp,
    ) -> FlagEvalResult {
        let mut attributes = subject_attributes.clone();
        attributes
            .entry("id".to_owned())
            .or_insert_with(|| AttributeValue::String(subject_key.to_owned()));

        if !self.enabled {
            let code = FlagEvaluationCode::FlagUnrecognizedOrDisabled;
            return FlagEvalResult {
                assignment: Err(EvaluationFailure::FlagUnrecognizedOrDisabled),
                details: build_details(
                    code,
                    &self.key,
                    subject_key,
                    &attributes,
                    now,
                    Vec::new(),
                    None,
                    None,
                ),
            };
        }

        let mut allocation_details = Vec::with_capacity(self.allocations.len());
        let mut matched: Option<(usize, String, Split, bool)> = None;

        for (i, allocation) in self.allocations.iter().enumerate() {
            let order_position = i + 1;
            if matched.is_some() {
                allocation_details.push(AllocationEvaluationDetails {
                    key: allocation.key.clone(),
                    order_position,
                    allocation_evaluation_code: AllocationEvaluationCode::Unevaluated,
                });
                continue;
            }

            match evaluate_allocation(allocation, subject_key, &attributes, now, self.total_shards) {
                AllocationOutcome::Matched { split, allocation_key, do_log } => {
                    allocation_details.push(AllocationEvaluationDetails {
                        key: allocation.key.clone(),
                        order_position,
                        allocation_evaluation_code: AllocationEvaluationCode::Match,
                    });
                    matched = Some((order_position, allocation_key, split, do_log));
                }
                AllocationOutcome::NotMatched(code) => {
                    allocation_details.push(AllocationEvaluationDetails {
                        key: allocation.key.clone(),
                        order_position,
                        allocation_evaluation_code: code,
                    });
                }
            }
        }

        let Some((_, allocation_key, split, do_log)) = matched else {
            let code = FlagEvaluationCode::DefaultAllocationNull;
            return FlagEvalResult {
                assignment: Err(EvaluationFailure::DefaultAllocationNull),
                details: build_details(
                    code,
                    &self.key,
                    subject_key,
                    &attributes,
                    now,
                    allocation_details,
                    None,
                    None,
                ),
            };
        };

        let Some(value) = self.parsed_variation(&split.variation_key) else {
            let code = FlagEvaluationCode::AssignmentError;
            return FlagEvalResult {
                assignment: Err(EvaluationFailure::AssignmentError),
                details: build_details(
                    code,
                    &self.key,
                    subject_key,
                    &attributes,
                    now,
                    allocation_details,
                    None,
                    None,
                ),
            };
        };

        let event = if do_log {
            let mut meta_data = default_meta_data();
            meta_data.insert("allocationKey".to_owned(), allocation_key.clone());
            Some(AssignmentEvent {
                experiment: format!("{}-{}", self.key, allocation_key),
                feature_flag: self.key.clone(),
                allocation: allocation_key.clone(),
                variation: split.variation_key.clone(),
                subject: subject_key.to_owned(),
                subject_attributes: subject_attributes.clone(),
                timestamp: now,
                meta_data,
                extra_logging: split.extra_logging.clone(),
                evaluation_details: None,
            })
        } else {
            None
        };

        let Some(assignment_value) = crate::ufc::assignment::AssignmentValue::from_value(
            &value,
            matches!(self.variation_type, VariationType::Json),
        ) else {
            let code = FlagEvaluationCode::AssignmentError;
            return FlagEvalResult {
                assignment: Err(EvaluationFailure::AssignmentError),
                details: build_details(
                    code,
                    &self.key,
                    subject_key,
                    &attributes,
                    now,
                    allocation_details,
                    Some(&split.variation_key),
                    Some(&value),
                ),
            };
        };

        let code = FlagEvaluationCode::Match;
        let details = build_details(
            code,
            &self.key,
            subject_key,
            &attributes,
            now,
            allocation_details,
            Some(&split.variation_key),
            Some(&value),
        );

        FlagEvalResult {
            assignment: Ok(Assignment { value: assignment_value, event }),
            details,
        }
    }
}

fn evaluate_allocation(
    allocation: &Allocation,
    subject_key: &str,
    attributes: &Attributes,
    now: Timestamp,
    total_shards: u32,
) -> AllocationOutcome {
    if let Some(start_at) = allocation.start_at {
        if now < start_at {
            return AllocationOutcome::NotMatched(AllocationEvaluationCode::BeforeStartTime);
        }
    }
    if let Some(end_at) = allocation.end_at {
        if now >= end_at {
            return AllocationOutcome::NotMatched(AllocationEvaluationCode::AfterEndTime);
        }
    }

    if !allocation.rules.is_empty() && !allocation.rules.iter().any(|r| r.eval(attributes)) {
        return AllocationOutcome::NotMatched(AllocationEvaluationCode::FailingRule);
    }

    for split in &allocation.splits {
        if split_matches(split, subject_key, total_shards) {
            return AllocationOutcome::Matched {
                split: split.clone(),
                allocation_key: allocation.key.clone(),
                do_log: allocation.do_log,
            };
        }
    }

    AllocationOutcome::NotMatched(AllocationEvaluationCode::TrafficExposureMiss)
}

fn split_matches(split: &Split, subject_key: &str, total_shards: u32) -> bool {
    split.shards.iter().all(|shard| shard_matches(shard, subject_key, total_shards))
}

fn shard_matches(shard: &Shard, subject_key: &str, total_shards: u32) -> bool {
    let value = get_salted_shard(&shard.salt, subject_key, total_shards);
    shard.ranges.iter().any(|r| range_contains(r, value))
}

fn range_contains(r: &ShardRange, v: u32) -> bool {
    r.contains(v)
}

#[allow(clippy::too_many_arguments)]
fn build_details(
    code: FlagEvaluationCode,
    flag_key: &str,
    subject_key: &str,
    subject_attributes: &Attributes,
    now: Timestamp,
    allocations: Vec<AllocationEvaluationDetails>,
    variation_key: Option<&str>,
    value: Option<&Value>,
) -> EvaluationDetails {
    let matched_allocation_key = allocations
        .iter()
        .find(|a| a.allocation_evaluation_code == AllocationEvaluationCode::Match)
        .map(|a| a.key.as_str());

    EvaluationDetails {
        flag_evaluation_description: EvaluationDetails::description_for(
            code,
            flag_key,
            subject_key,
            variation_key,
            matched_allocation_key,
        ),
        flag_evaluation_code: code,
        variation_key: variation_key.map(str::to_owned),
        variation_value: value.cloned(),
        allocations,
        subject_key: subject_key.to_owned(),
        subject_attributes: subject_attributes.clone(),
        timestamp: now,
    }
}
