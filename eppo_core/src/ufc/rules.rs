use crate::attributes::{AttributeValue, Attributes};
use crate::ufc::models::{Condition, ConditionOperator, ConditionValue, Rule};

impl Rule {
    /// A rule matches iff all of its conditions match.
    pub fn eval(&self, attributes: &Attributes) -> bool {
        self.conditions.iter().all(|c| c.eval(attributes))
    }
}

impl Condition {
    pub fn eval(&self, attributes: &Attributes) -> bool {
        if self.operator == ConditionOperator::IsNull {
            let is_null = attributes
                .get(&self.attribute)
                .map(|v| v.is_null())
                .unwrap_or(true);
            let expected = match &self.value {
                ConditionValue::Single(serde_json::Value::Bool(b)) => *b,
                _ => return false,
            };
            return is_null == expected;
        }

        let Some(attribute) = attributes.get(&self.attribute) else {
            return false;
        };

        match self.operator {
            ConditionOperator::IsNull => unreachable!(),
            ConditionOperator::Matches => self
                .compiled_regex
                .as_ref()
                .map(|re| matches_regex(attribute, re))
                .unwrap_or(false),
            ConditionOperator::NotMatches => self
                .compiled_regex
                .as_ref()
                .map(|re| !matches_regex(attribute, re))
                .unwrap_or(false),
            ConditionOperator::OneOf => is_one_of(attribute, &self.value.as_string_array()),
            ConditionOperator::NotOneOf => !is_one_of(attribute, &self.value.as_string_array()),
            ConditionOperator::Gte | ConditionOperator::Gt
            | ConditionOperator::Lte | ConditionOperator::Lt => {
                eval_ordering(attribute, self, self.operator)
            }
        }
    }
}

/// Coerces an attribute to a string the way `MATCHES` does: strings pass through, integers and
/// booleans render as decimal/"true"/"false", nulls and floats never match.
fn matches_regex(attribute: &AttributeValue, re: &regex::Regex) -> bool {
    let Some(value) = coerce_for_matches(attribute) else {
        return false;
    };
    re.is_match(&value)
}

fn coerce_for_matches(attribute: &AttributeValue) -> Option<String> {
    match attribute {
        AttributeValue::String(s) => Some(s.clone()),
        AttributeValue::Integer(i) => Some(i.to_string()),
        AttributeValue::Boolean(b) => Some(if *b { "true" } else { "false" }.to_owned()),
        AttributeValue::Number(_) | AttributeValue::Null => None,
    }
}

fn is_one_of(attribute: &AttributeValue, candidates: &[String]) -> bool {
    candidates.iter().any(|s| is_one(attribute, s))
}

fn is_one(attribute: &AttributeValue, s: &str) -> bool {
    match attribute {
        AttributeValue::String(v) => v == s,
        AttributeValue::Number(v) => s.parse::<f64>().map(|n| n == *v).unwrap_or(false),
        AttributeValue::Integer(v) => s.parse::<i64>().map(|n| n == *v).unwrap_or(false),
        AttributeValue::Boolean(v) => {
            if matches!(s, "true" | "True" | "TRUE" | "1") {
                *v
            } else if matches!(s, "false" | "False" | "FALSE" | "0") {
                !*v
            } else {
                false
            }
        }
        AttributeValue::Null => s == "null" || s == "nil" || s.is_empty(),
    }
}

/// Compares `attribute` against `condition`'s precomputed value. Only the subject side is parsed
/// here, since it is runtime data supplied fresh on every call; the condition side was already
/// parsed once by `Condition::precompute`.
fn eval_ordering(attribute: &AttributeValue, condition: &Condition, op: ConditionOperator) -> bool {
    // Tier 1: semver, only when both sides are strings that parse as valid semver.
    if let (AttributeValue::String(subject), Some(condition_ver)) =
        (attribute, condition.semver_value.as_ref())
    {
        if let Ok(subject_ver) = semver::Version::parse(subject) {
            return compare(&subject_ver, condition_ver, op);
        }
    }

    // Tier 2: numeric comparison.
    if let (Some(subject_num), Some(condition_num)) = (attribute.as_f64(), condition.numeric_value) {
        return compare(&subject_num, &condition_num, op);
    }

    // Tier 3: four-part version fallback, for dot-separated numeric quads that semver declined.
    if let (AttributeValue::String(subject), Some(condition_v)) =
        (attribute, condition.four_part_value.as_ref())
    {
        if let Some(subject_v) = parse_four_part_version(subject) {
            return compare(&subject_v, condition_v, op);
        }
    }

    false
}

fn compare<T: PartialOrd>(a: &T, b: &T, op: ConditionOperator) -> bool {
    match op {
        ConditionOperator::Gt => a > b,
        ConditionOperator::Gte => a >= b,
        ConditionOperator::Lt => a < b,
        ConditionOperator::Lte => a <= b,
        _ => unreachable!("eval_ordering only called for ordering operators"),
    }
}

/// Parses up to four dot-separated non-negative integer components (e.g. `"1.2.3.4"`). Used as a
/// last-resort ordering when semver parsing and plain numeric parsing both decline, covering
/// build-style version strings with more than three components.
pub(super) fn parse_four_part_version(s: &str) -> Option<[u64; 4]> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.is_empty() || parts.len() > 4 {
        return None;
    }
    let mut out = [0u64; 4];
    for (i, part) in parts.iter().enumerate() {
        out[i] = part.parse().ok()?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, AttributeValue)]) -> Attributes {
        pairs.iter().cloned().map(|(k, v)| (k.to_owned(), v)).collect::<HashMap<_, _>>()
    }

    fn cond(op: ConditionOperator, attribute: &str, value: serde_json::Value) -> Condition {
        Condition::new(op, attribute.to_owned(), ConditionValue::Single(value))
    }

    #[test]
    fn matches_regex_on_string() {
        let a = attrs(&[("email", AttributeValue::String("a@example.com".into()))]);
        let c = cond(ConditionOperator::Matches, "email", "@example\\.com$".into());
        assert!(c.eval(&a));
    }

    #[test]
    fn matches_coerces_integer_and_bool() {
        let a = attrs(&[("age", AttributeValue::Integer(42))]);
        assert!(cond(ConditionOperator::Matches, "age", "^42$".into()).eval(&a));

        let a = attrs(&[("flag", AttributeValue::Boolean(true))]);
        assert!(cond(ConditionOperator::Matches, "flag", "true".into()).eval(&a));
    }

    #[test]
    fn matches_fails_on_number_and_null() {
        let a = attrs(&[("score", AttributeValue::Number(3.5))]);
        assert!(!cond(ConditionOperator::Matches, "score", "3".into()).eval(&a));

        let a = attrs(&[("score", AttributeValue::Null)]);
        assert!(!cond(ConditionOperator::Matches, "score", ".".into()).eval(&a));
    }

    #[test]
    fn one_of_coerces_by_attribute_type() {
        let a = attrs(&[("country", AttributeValue::String("US".into()))]);
        let c = Condition::new(
            ConditionOperator::OneOf,
            "country".into(),
            ConditionValue::Multiple(vec!["US".into(), "CA".into()]),
        );
        assert!(c.eval(&a));

        let a = attrs(&[("enabled", AttributeValue::Boolean(true))]);
        let c = Condition::new(
            ConditionOperator::OneOf,
            "enabled".into(),
            ConditionValue::Multiple(vec!["true".into()]),
        );
        assert!(c.eval(&a));
    }

    #[test]
    fn is_null_checks_presence_and_null_variant() {
        let a: Attributes = HashMap::new();
        assert!(cond(ConditionOperator::IsNull, "missing", true.into()).eval(&a));

        let a = attrs(&[("x", AttributeValue::Null)]);
        assert!(cond(ConditionOperator::IsNull, "x", true.into()).eval(&a));

        let a = attrs(&[("x", AttributeValue::String("present".into()))]);
        assert!(cond(ConditionOperator::IsNull, "x", false.into()).eval(&a));
    }

    #[test]
    fn numeric_ordering() {
        let a = attrs(&[("age", AttributeValue::Integer(21))]);
        assert!(cond(ConditionOperator::Gte, "age", 18.into()).eval(&a));
        assert!(!cond(ConditionOperator::Lt, "age", 18.into()).eval(&a));
    }

    #[test]
    fn semver_ordering_prefers_semver_over_numeric() {
        let a = attrs(&[("app_version", AttributeValue::String("2.0.0".into()))]);
        assert!(cond(ConditionOperator::Gte, "app_version", "1.5.0".into()).eval(&a));

        let a = attrs(&[("app_version", AttributeValue::String("1.2.3".into()))]);
        assert!(!cond(ConditionOperator::Gte, "app_version", "1.5.0".into()).eval(&a));

        let a = attrs(&[("app_version", AttributeValue::String("1.5.0-rc1".into()))]);
        assert!(!cond(ConditionOperator::Gte, "app_version", "1.5.0".into()).eval(&a));
    }

    #[test]
    fn four_part_version_fallback() {
        let a = attrs(&[("build", AttributeValue::String("1.2.3.4".into()))]);
        assert!(cond(ConditionOperator::Gt, "build", "1.2.3.3".into()).eval(&a));
        assert!(!cond(ConditionOperator::Gt, "build", "1.2.3.4".into()).eval(&a));
    }

    #[test]
    fn missing_attribute_fails_non_null_operators() {
        let a: Attributes = HashMap::new();
        assert!(!cond(ConditionOperator::Matches, "missing", "x".into()).eval(&a));
        assert!(!cond(ConditionOperator::Gt, "missing", 1.into()).eval(&a));
    }
}
