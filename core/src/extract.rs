//! Pulling a JSON object out of free-form model output.
//!
//! The match is greedy: it runs from the first `{` in the text to the last
//! `}`. It does not track nesting, so any unrelated brace before or after the
//! real object (a stray `{` in prose, a second JSON snippet) ends up inside
//! the extracted region and usually makes it fail to parse.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::{RelayError, Result};

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("static pattern compiles"));

/// Returns the first-`{`-to-last-`}` slice of `text`, if there is one.
pub fn extract_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT.find(text).map(|m| m.as_str())
}

/// Extracts and parses the JSON object embedded in model output.
pub fn parse_embedded_json(text: &str) -> Result<Value> {
    let region = extract_json_object(text).ok_or(RelayError::Extraction)?;
    Ok(serde_json::from_str(region)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn takes_object_out_of_surrounding_prose() {
        assert_eq!(
            extract_json_object(r#"prefix {"a":1} suffix"#),
            Some(r#"{"a":1}"#)
        );
    }

    #[test]
    fn spans_newlines_and_nested_objects() {
        let text = "Here you go:\n```json\n{\n  \"goalPosition\": {\"x\": 1, \"y\": 2}\n}\n```\nEnjoy!";
        let value = parse_embedded_json(text).unwrap();
        assert_eq!(value, json!({"goalPosition": {"x": 1, "y": 2}}));
    }

    #[test]
    fn no_braces_is_an_extraction_error() {
        let err = parse_embedded_json("I cannot help with that.").unwrap_err();
        assert!(matches!(err, RelayError::Extraction));
        assert_eq!(err.to_string(), "Could not parse level data from AI response");
    }

    #[test]
    fn unmatched_braces_are_an_extraction_error() {
        assert!(extract_json_object("only an opening { here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }

    #[test]
    fn malformed_region_is_a_parse_error() {
        let err = parse_embedded_json(r#"{"platforms": [1, 2,]}"#).unwrap_err();
        assert!(matches!(err, RelayError::Parse(_)));
    }

    #[test]
    fn trailing_braces_corrupt_the_region() {
        // Known limitation: the match runs to the last closing brace.
        let text = r#"{"a":1} and also {"b":2}"#;
        assert_eq!(extract_json_object(text), Some(text));
        assert!(matches!(
            parse_embedded_json(text).unwrap_err(),
            RelayError::Parse(_)
        ));
    }
}
