use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::models::{FieldViolation, VoteRequest};

/// Returns one entry per broken rule, sorted by field name. Empty means the
/// request may be handed to the voting workflow.
pub fn validate_vote_request(request: &VoteRequest) -> Vec<FieldViolation> {
    let Err(errors) = request.validate() else {
        return Vec::new();
    };

    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |err| FieldViolation {
                error: true,
                failed_field: field.clone(),
                tag: rule_tag(err),
                value: err.params.get("value").cloned().unwrap_or(Value::Null),
            })
        })
        .collect();

    violations.sort_by(|a, b| a.failed_field.cmp(&b.failed_field));
    violations
}

// `range` is reported as the bound that was broken
fn rule_tag(err: &ValidationError) -> String {
    if err.code != "range" {
        return err.code.to_string();
    }

    let value = err.params.get("value").and_then(Value::as_f64);
    let min = err.params.get("min").and_then(Value::as_f64);

    match (value, min) {
        (Some(value), Some(min)) if value < min => "min".to_string(),
        _ => "max".to_string(),
    }
}
