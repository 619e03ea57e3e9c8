//! Envelope assertions

use serde_json::Value;

/// Assert a failure envelope with `message`
pub fn assert_failure(body: &Value, message: &str) {
    assert_eq!(body["success"], false, "expected a failure envelope: {}", body);
    assert_eq!(body["message"], message, "unexpected message in {}", body);
    assert!(body.get("data").is_none(), "failure envelope carries data: {}", body);
}

/// The `param` of every field error, in order
pub fn error_params(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|error| error["param"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Assert a validation failure naming exactly `params`
pub fn assert_validation_failure(body: &Value, params: &[&str]) {
    assert_failure(body, "Validation failed");
    assert_eq!(error_params(body), params, "unexpected field errors in {}", body);
}
