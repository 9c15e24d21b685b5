use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;
use crate::ufc::rules::parse_four_part_version;

/// The full flag configuration payload, as fetched from the configuration endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniversalFlagConfig {
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_optional_timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub environment: Option<Environment>,
    // Each flag is wrapped in `TryParse` so a single malformed flag (e.g. a variation type this
    // SDK version doesn't know about yet) doesn't fail the whole configuration load.
    pub flags: HashMap<String, TryParse<Flag>>,
    #[serde(default)]
    pub bandits: HashMap<String, TryParse<crate::bandits::BanditModel>>,
    /// bandit_key -> list of (flag, variation) pairs that bandit controls.
    #[serde(default)]
    pub bandit_flags: HashMap<String, Vec<BanditVariation>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub name: String,
}

/// Allows a subfield to fail parsing without failing the parsing of the whole structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TryParse<T> {
    Parsed(T),
    ParseFailed(serde_json::Value),
}

impl<T> TryParse<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            TryParse::Parsed(v) => Some(v),
            TryParse::ParseFailed(_) => None,
        }
    }
}

impl<T> From<TryParse<T>> for Option<T> {
    fn from(value: TryParse<T>) -> Self {
        value.ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub key: String,
    pub enabled: bool,
    pub variation_type: VariationType,
    pub variations: HashMap<String, Variation>,
    pub allocations: Vec<Allocation>,
    #[serde(default = "default_total_shards")]
    pub total_shards: u32,
}

impl Flag {
    /// Precomputes every condition reachable from this flag's allocations' rules. Called once per
    /// flag right after the configuration is parsed.
    pub fn precompute(&mut self) {
        for allocation in &mut self.allocations {
            for rule in &mut allocation.rules {
                for condition in &mut rule.conditions {
                    condition.precompute();
                }
            }
        }
    }
}

fn default_total_shards() -> u32 {
    10_000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariationType {
    String,
    Integer,
    Numeric,
    Boolean,
    Json,
}

/// An already-typed variation value.
///
/// Unlike [`crate::AttributeValue`], this is combined with the flag's declared
/// [`VariationType`] at precomputation time, so by the time evaluation runs the variant is
/// already unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Numeric(f64),
    String(String),
}

impl Value {
    /// Parses a raw JSON variation value against the flag's declared type. Returns `None` if the
    /// raw value does not coerce to the declared type; the caller drops such a variation with a
    /// warning rather than failing the whole flag.
    pub fn from_json(raw: &serde_json::Value, ty: VariationType) -> Option<Value> {
        match ty {
            VariationType::Boolean => raw.as_bool().map(Value::Boolean),
            VariationType::Integer => raw.as_i64().map(Value::Integer),
            VariationType::Numeric => raw.as_f64().map(Value::Numeric),
            VariationType::String => raw.as_str().map(|s| Value::String(s.to_owned())),
            VariationType::Json => match raw {
                serde_json::Value::String(s) => {
                    serde_json::from_str::<serde_json::Value>(s).ok()?;
                    Some(Value::String(s.clone()))
                }
                other => Some(Value::String(other.to_string())),
            },
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Value::Numeric(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::String(s) => serde_json::from_str(s).ok(),
            Value::Boolean(b) => Some(serde_json::Value::Bool(*b)),
            Value::Integer(i) => Some((*i).into()),
            Value::Numeric(n) => serde_json::Number::from_f64(*n).map(serde_json::Value::Number),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub key: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub key: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_optional_timestamp")]
    pub start_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_optional_timestamp")]
    pub end_at: Option<Timestamp>,
    pub splits: Vec<Split>,
    #[serde(default = "default_do_log")]
    pub do_log: bool,
}

fn default_do_log() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub conditions: Vec<Condition>,
}

/// A single rule condition.
///
/// `numeric_value`/`semver_value`/`four_part_value`/`compiled_regex` are derived from `value` once
/// at load time via [`Condition::precompute`], not on the deserialize path itself (since the raw
/// JSON must round-trip through `value` unchanged). Evaluation reads these instead of recompiling
/// a regex or reparsing a version on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub operator: ConditionOperator,
    pub attribute: String,
    pub value: ConditionValue,

    #[serde(skip)]
    pub numeric_value: Option<f64>,
    #[serde(skip)]
    pub semver_value: Option<semver::Version>,
    #[serde(skip)]
    pub four_part_value: Option<[u64; 4]>,
    #[serde(skip)]
    pub compiled_regex: Option<Regex>,
}

impl Condition {
    /// Builds a condition and precomputes its cached fields in one step.
    pub fn new(operator: ConditionOperator, attribute: String, value: ConditionValue) -> Condition {
        let mut condition = Condition {
            operator,
            attribute,
            value,
            numeric_value: None,
            semver_value: None,
            four_part_value: None,
            compiled_regex: None,
        };
        condition.precompute();
        condition
    }

    /// Precomputes every cacheable interpretation of `value` this condition's operator could need.
    /// Idempotent; safe to call again if `operator`/`value` change.
    pub fn precompute(&mut self) {
        let condition_str = self.value.as_str();

        self.numeric_value = condition_str
            .and_then(|s| s.parse::<f64>().ok())
            .or_else(|| match &self.value {
                ConditionValue::Single(serde_json::Value::Number(n)) => n.as_f64(),
                _ => None,
            });

        self.semver_value = None;
        self.four_part_value = None;
        if matches!(
            self.operator,
            ConditionOperator::Gte | ConditionOperator::Gt | ConditionOperator::Lte | ConditionOperator::Lt
        ) {
            if let Some(s) = condition_str {
                self.semver_value = semver::Version::parse(s).ok();
                self.four_part_value = parse_four_part_version(s);
            }
        }

        self.compiled_regex = None;
        if matches!(self.operator, ConditionOperator::Matches | ConditionOperator::NotMatches) {
            if let Some(pattern) = condition_str {
                self.compiled_regex = Regex::new(pattern).ok();
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    Matches,
    NotMatches,
    Gte,
    Gt,
    Lte,
    Lt,
    OneOf,
    NotOneOf,
    IsNull,
}

/// The raw value on the right-hand side of a condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Single(serde_json::Value),
    Multiple(Vec<serde_json::Value>),
}

impl ConditionValue {
    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            ConditionValue::Single(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn as_string_array(&self) -> Vec<String> {
        match self {
            ConditionValue::Multiple(items) => items.iter().map(json_to_string).collect(),
            ConditionValue::Single(serde_json::Value::Array(items)) => {
                items.iter().map(json_to_string).collect()
            }
            ConditionValue::Single(other) => vec![json_to_string(other)],
        }
    }
}

fn json_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    pub shards: Vec<Shard>,
    pub variation_key: String,
    #[serde(default = "HashMap::new")]
    pub extra_logging: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shard {
    pub salt: String,
    pub ranges: Vec<ShardRange>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardRange {
    pub start: u32,
    pub end: u32,
}

impl ShardRange {
    /// Half-open: `[start, end)`.
    pub fn contains(&self, shard: u32) -> bool {
        self.start <= shard && shard < self.end
    }
}

/// Associates a flag's variation value with a bandit, when that flag is bandit-controlled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanditVariation {
    pub key: String,
    pub flag_key: String,
    pub variation_key: String,
    pub variation_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_range_is_half_open() {
        let r = ShardRange { start: 0, end: 5000 };
        assert!(r.contains(0));
        assert!(r.contains(4999));
        assert!(!r.contains(5000));
    }

    #[test]
    fn parses_partially_on_unknown_variation_type() {
        let ufc: UniversalFlagConfig = serde_json::from_str(
            r#"{
                "flags": {
                    "success": {
                        "key": "success",
                        "enabled": true,
                        "variationType": "BOOLEAN",
                        "variations": {},
                        "allocations": []
                    },
                    "fail_parsing": {
                        "key": "fail_parsing",
                        "enabled": true,
                        "variationType": "NEW_TYPE",
                        "variations": {},
                        "allocations": []
                    }
                }
            }"#,
        )
        .unwrap();
        assert!(matches!(
            ufc.flags.get("success").unwrap(),
            TryParse::Parsed(_)
        ));
        assert!(matches!(
            ufc.flags.get("fail_parsing").unwrap(),
            TryParse::ParseFailed(_)
        ));
    }
}
