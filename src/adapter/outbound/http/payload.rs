//! Payload extraction for callback-wrapped response bodies.
//!
//! The endpoint answers with a script of the form `sbi({...});`. The body is
//! never executed: the argument is cut out and parsed as JSON. Bare JSON
//! bodies are accepted too.

use serde_json::Value;

use crate::domain::RawResponse;
use crate::error::TransportError;

/// Extract the structured payload from `body`.
pub fn extract_payload(body: &str) -> Result<RawResponse, TransportError> {
    let body = body.trim().trim_end_matches(';').trim_end();

    let json = if body.starts_with('{') {
        body
    } else {
        unwrap_call(body)?
    };

    let value: Value = serde_json::from_str(json)
        .map_err(|e| TransportError::MalformedDelivery(format!("payload is not JSON: {e}")))?;

    if !value.is_object() {
        return Err(TransportError::MalformedDelivery(
            "payload is not a JSON object".into(),
        ));
    }
    Ok(RawResponse::new(value))
}

/// The argument of a single `callee(...)` call.
fn unwrap_call(body: &str) -> Result<&str, TransportError> {
    let malformed = || TransportError::MalformedDelivery("expected callback(payload) body".into());

    let open = body.find('(').ok_or_else(malformed)?;
    let callee = body[..open].trim();
    if callee.is_empty() || !callee.chars().all(is_callee_char) {
        return Err(malformed());
    }
    if !body.ends_with(')') {
        return Err(malformed());
    }
    Ok(body[open + 1..body.len() - 1].trim())
}

fn is_callee_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_callback_body() {
        let raw = extract_payload(r#"sbi({"slots":{"a":{"sbi_mouse":1}}});"#).unwrap();
        assert_eq!(raw.as_value(), &json!({"slots": {"a": {"sbi_mouse": 1}}}));
    }

    #[test]
    fn accepts_namespaced_callee_and_whitespace() {
        let raw = extract_payload("  window.sbi_cb ( {\"slots\": {}} )\n").unwrap();
        assert!(raw.slots().is_some());
    }

    #[test]
    fn accepts_bare_json() {
        let raw = extract_payload(r#"{"slots": {}, "sbi_dc": "x-"}"#).unwrap();
        assert_eq!(raw.page_field("sbi_dc"), Some(&json!("x-")));
    }

    #[test]
    fn parens_inside_strings_survive() {
        let raw = extract_payload(r#"sbi({"slots":{},"note":"a (b) c"})"#).unwrap();
        assert_eq!(raw.page_field("note"), Some(&json!("a (b) c")));
    }

    #[test]
    fn rejects_code_around_the_call() {
        assert!(extract_payload(r#"alert(1);sbi({"slots":{}})"#).is_err());
        assert!(extract_payload(r#"(function(){})()"#).is_err());
    }

    #[test]
    fn rejects_non_object_payload() {
        let err = extract_payload("sbi([1,2])").unwrap_err();
        assert!(matches!(err, TransportError::MalformedDelivery(_)));
    }

    #[test]
    fn rejects_empty_body() {
        assert!(extract_payload("").is_err());
    }
}
