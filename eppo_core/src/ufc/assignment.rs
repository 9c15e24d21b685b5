use serde::Serialize;

use crate::events::AssignmentEvent;
use crate::ufc::eval_details::EvaluationDetails;
use crate::ufc::models::Value;

/// A typed assignment value, combining a raw [`Value`] with the flag's declared variation type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssignmentValue {
    String(String),
    Integer(i64),
    Numeric(f64),
    Boolean(bool),
    Json(serde_json::Value),
}

impl AssignmentValue {
    pub fn from_value(value: &Value, as_json: bool) -> Option<AssignmentValue> {
        match value {
            Value::Boolean(b) => Some(AssignmentValue::Boolean(*b)),
            Value::Integer(i) => Some(AssignmentValue::Integer(*i)),
            Value::Numeric(n) => Some(AssignmentValue::Numeric(*n)),
            Value::String(s) => {
                if as_json {
                    serde_json::from_str(s).ok().map(AssignmentValue::Json)
                } else {
                    Some(AssignmentValue::String(s.clone()))
                }
            }
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            AssignmentValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AssignmentValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            AssignmentValue::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            AssignmentValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            AssignmentValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// The result of a successful flag assignment: the value to hand back to the caller plus the
/// event to forward to the assignment logger.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub value: AssignmentValue,
    pub event: Option<AssignmentEvent>,
}

/// The full result of an assignment lookup that also retains the evaluation trace.
#[derive(Debug, Clone)]
pub struct AssignmentWithDetails {
    pub value: Option<AssignmentValue>,
    pub event: Option<AssignmentEvent>,
    pub details: EvaluationDetails,
}
