//! Recovering a JSON object from free-form model output.
//!
//! Models asked for "only JSON" still wrap it in prose or code fences now
//! and then. The extractor takes everything from the first `{` to the last
//! `}` and hands that to `serde_json`.

use serde::de::DeserializeOwned;

use crate::error::LlmError;
use crate::types::LlmResponse;

/// The span from the first `{` to the last `}`, if there is one.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Extract the JSON object from `text` and deserialize it.
///
/// # Errors
/// `LlmError::NoJsonObject` when there is no `{...}` span,
/// `LlmError::ParseError` when the span does not parse as `T`.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let object = extract_json_object(text).ok_or(LlmError::NoJsonObject)?;
    serde_json::from_str(object)
        .map_err(|e| LlmError::ParseError(format!("JSON parse error: {e}; raw text: '{object}'")))
}

/// [`parse_json_object`] over a response's text.
///
/// # Errors
/// See [`parse_json_object`].
pub fn parse_structured<T: DeserializeOwned>(response: &LlmResponse) -> Result<T, LlmError> {
    parse_json_object(&response.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pick {
        action: String,
        target: String,
    }

    #[test]
    fn finds_object_inside_prose() {
        let text = "Sure! Here you go:\n```json\n{\"action\":\"mine\",\"target\":\"gold_ore\"}\n```\nEnjoy.";
        let pick: Pick = parse_json_object(text).expect("parses");
        assert_eq!(pick.action, "mine");
        assert_eq!(pick.target, "gold_ore");
    }

    #[test]
    fn spans_first_open_to_last_close() {
        assert_eq!(extract_json_object("a {x} b {y} c"), Some("{x} b {y}"));
        assert_eq!(extract_json_object("{\"a\":{\"b\":1}}"), Some("{\"a\":{\"b\":1}}"));
    }

    #[test]
    fn no_braces_is_no_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
        assert!(matches!(
            parse_json_object::<Pick>("plain words"),
            Err(LlmError::NoJsonObject)
        ));
    }

    #[test]
    fn two_objects_fail_to_parse() {
        let err = parse_json_object::<Pick>(r#"{"action":"a","target":"b"} {"action":"c","target":"d"}"#);
        assert!(matches!(err, Err(LlmError::ParseError(_))));
    }
}
