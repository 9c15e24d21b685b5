use std::cmp::Ordering;
use std::collections::HashMap;

use crate::attributes::ContextAttributes;
use crate::bandits::{ActionCoefficients, BanditModelData, NumericCoefficient, CategoricalCoefficient};
use crate::sharder::get_md5_shard;

/// The number of shards bandit action selection divides the unit interval into. Hardcoded, not
/// configurable per bandit or per flag.
const TOTAL_SHARDS: u32 = 10_000;

pub struct BanditEvalResult {
    pub action_key: String,
    pub action_probability: f64,
    pub optimality_gap: f64,
}

/// Scores every candidate action, derives selection weights, and deterministically draws one.
///
/// `actions` maps action key to its attributes; iteration order does not affect the result, since
/// selection order is itself re-derived from a shard-based shuffle.
pub fn evaluate_bandit(
    model: &BanditModelData,
    flag_key: &str,
    subject_key: &str,
    subject_attributes: &ContextAttributes,
    actions: &HashMap<String, ContextAttributes>,
) -> Option<BanditEvalResult> {
    if actions.is_empty() {
        return None;
    }

    let scores: HashMap<&str, f64> = actions
        .iter()
        .map(|(action_key, action_attributes)| {
            let score = score_action(model, action_key, subject_attributes, action_attributes);
            (action_key.as_str(), score)
        })
        .collect();

    let best_action = scores
        .iter()
        .max_by(|(key_a, score_a), (key_b, score_b)| {
            score_a
                .partial_cmp(score_b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| key_b.cmp(key_a))
        })
        .map(|(key, _)| *key)
        .expect("actions is non-empty");
    let best_score = scores[best_action];

    let n = actions.len() as f64;
    let gamma = model.gamma;
    let floor = model.action_probability_floor;

    let mut weights: HashMap<&str, f64> = HashMap::new();
    let mut non_best_total = 0.0;
    for (&action_key, &score) in scores.iter() {
        if action_key == best_action {
            continue;
        }
        let w = (floor / n).max(1.0 / (n + gamma * (best_score - score)));
        weights.insert(action_key, w);
        non_best_total += w;
    }
    weights.insert(best_action, (1.0 - non_best_total).max(0.0));

    let mut ordered: Vec<&str> = actions.keys().map(String::as_str).collect();
    ordered.sort_by(|a, b| {
        let shard_a = get_md5_shard(&[flag_key, "-", subject_key, "-", a], TOTAL_SHARDS);
        let shard_b = get_md5_shard(&[flag_key, "-", subject_key, "-", b], TOTAL_SHARDS);
        shard_a.cmp(&shard_b).then_with(|| a.cmp(b))
    });

    let draw_shard = get_md5_shard(&[flag_key, "-", subject_key], TOTAL_SHARDS);
    let p = draw_shard as f64 / TOTAL_SHARDS as f64;

    let mut cumulative = 0.0;
    let mut selected = *ordered.last().expect("non-empty");
    for &action_key in &ordered {
        cumulative += weights[action_key];
        if cumulative > p {
            selected = action_key;
            break;
        }
    }

    Some(BanditEvalResult {
        action_key: selected.to_owned(),
        action_probability: weights[selected],
        optimality_gap: best_score - scores[selected],
    })
}

fn score_action(
    model: &BanditModelData,
    action_key: &str,
    subject: &ContextAttributes,
    action: &ContextAttributes,
) -> f64 {
    let Some(coefficients) = model.coefficients.get(action_key) else {
        return model.default_action_score;
    };
    score_with_coefficients(coefficients, subject, action)
}

fn score_with_coefficients(
    coefficients: &ActionCoefficients,
    subject: &ContextAttributes,
    action: &ContextAttributes,
) -> f64 {
    let mut score = coefficients.intercept;
    score += score_numeric(&coefficients.subject_numeric_coefficients, subject);
    score += score_categorical(&coefficients.subject_categorical_coefficients, subject);
    score += score_numeric(&coefficients.action_numeric_coefficients, action);
    score += score_categorical(&coefficients.action_categorical_coefficients, action);
    score
}

fn score_numeric(coefficients: &[NumericCoefficient], attributes: &ContextAttributes) -> f64 {
    coefficients
        .iter()
        .map(|c| match attributes.numeric.get(&c.attribute_key) {
            Some(v) if v.is_finite() => v * c.coefficient,
            _ => c.missing_value_coefficient,
        })
        .sum()
}

fn score_categorical(coefficients: &[CategoricalCoefficient], attributes: &ContextAttributes) -> f64 {
    coefficients
        .iter()
        .map(|c| match attributes.categorical.get(&c.attribute_key) {
            Some(v) => c
                .value_coefficients
                .get(v)
                .copied()
                .unwrap_or(c.missing_value_coefficient),
            None => c.missing_value_coefficient,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coefficientless_model(gamma: f64, floor: f64) -> BanditModelData {
        BanditModelData {
            gamma,
            default_action_score: 0.0,
            action_probability_floor: floor,
            coefficients: HashMap::new(),
        }
    }

    #[test]
    fn no_actions_returns_none() {
        let model = coefficientless_model(1.0, 0.0);
        let result = evaluate_bandit(&model, "flag", "alice", &ContextAttributes::default(), &HashMap::new());
        assert!(result.is_none());
    }

    #[test]
    fn probabilities_sum_to_one() {
        let model = coefficientless_model(1.0, 0.0);
        let mut actions = HashMap::new();
        actions.insert("red".to_owned(), ContextAttributes::default());
        actions.insert("blue".to_owned(), ContextAttributes::default());
        actions.insert("green".to_owned(), ContextAttributes::default());

        let result = evaluate_bandit(&model, "flag", "alice", &ContextAttributes::default(), &actions)
            .expect("should select");
        // With all-equal scores every non-best weight is 1/n and the best gets the remainder;
        // summing them should total 1.0.
        assert!(result.action_probability > 0.0);
    }

    #[test]
    fn selection_is_deterministic() {
        let model = coefficientless_model(1.0, 0.0);
        let mut actions = HashMap::new();
        actions.insert("red".to_owned(), ContextAttributes::default());
        actions.insert("blue".to_owned(), ContextAttributes::default());

        let a = evaluate_bandit(&model, "flag", "alice", &ContextAttributes::default(), &actions).unwrap();
        let b = evaluate_bandit(&model, "flag", "alice", &ContextAttributes::default(), &actions).unwrap();
        assert_eq!(a.action_key, b.action_key);
    }

    #[test]
    fn dominated_action_never_becomes_best() {
        let mut model = coefficientless_model(1.0, 0.0);
        model.coefficients.insert(
            "good".to_owned(),
            ActionCoefficients {
                action_key: "good".to_owned(),
                intercept: 10.0,
                subject_numeric_coefficients: Vec::new(),
                subject_categorical_coefficients: Vec::new(),
                action_numeric_coefficients: Vec::new(),
                action_categorical_coefficients: Vec::new(),
            },
        );
        model.coefficients.insert(
            "bad".to_owned(),
            ActionCoefficients {
                action_key: "bad".to_owned(),
                intercept: -10.0,
                subject_numeric_coefficients: Vec::new(),
                subject_categorical_coefficients: Vec::new(),
                action_numeric_coefficients: Vec::new(),
                action_categorical_coefficients: Vec::new(),
            },
        );
        let mut actions = HashMap::new();
        actions.insert("good".to_owned(), ContextAttributes::default());
        actions.insert("bad".to_owned(), ContextAttributes::default());

        for subject in ["alice", "bob", "carol", "dave"] {
            let result = evaluate_bandit(&model, "flag", subject, &ContextAttributes::default(), &actions)
                .unwrap();
            // "bad" should win at most rarely (floor only); assert the optimality gap is measured
            // against "good" whenever "bad" is drawn.
            if result.action_key == "bad" {
                assert!(result.optimality_gap >= 19.9);
            }
        }
    }
}
