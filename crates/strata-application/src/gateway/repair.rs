//! Best-effort recovery of JSON from model output.
//!
//! Models wrap JSON in code fences or surround it with prose even when asked
//! not to. Recovery trims the text, unwraps a fenced block (with or without a
//! language tag) and, failing a direct parse, retries on the outermost
//! bracket pair of the expected shape.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[\w-]*[ \t]*\n?(.*?)\n?\s*```$").expect("fence pattern is valid")
});

/// The top-level JSON value a caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Object,
    Array,
}

impl JsonShape {
    fn delimiters(self) -> (char, char) {
        match self {
            JsonShape::Object => ('{', '}'),
            JsonShape::Array => ('[', ']'),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            JsonShape::Object => value.is_object(),
            JsonShape::Array => value.is_array(),
        }
    }
}

/// Removes a surrounding code fence, if the whole text is one.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    match FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parses `raw` as JSON of the given shape, repairing common wrapping.
///
/// Returns `None` when no value of that shape can be recovered.
pub fn repair_json(raw: &str, shape: JsonShape) -> Option<Value> {
    let candidate = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(candidate)
        && shape.matches(&value)
    {
        return Some(value);
    }

    let (open, close) = shape.delimiters();
    let start = candidate.find(open)?;
    let end = candidate.rfind(close)?;
    if end <= start {
        return None;
    }

    let value = serde_json::from_str::<Value>(&candidate[start..=end]).ok()?;
    shape.matches(&value).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        assert_eq!(
            repair_json(r#"{"a": 1}"#, JsonShape::Object),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_fenced_json_with_language_tag() {
        let raw = "```json\n{\"rumeltDiagnosis\": \"x\"}\n```";
        assert_eq!(
            repair_json(raw, JsonShape::Object),
            Some(json!({"rumeltDiagnosis": "x"}))
        );
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
    }

    #[test]
    fn test_prose_around_object() {
        let raw = "Here is your analysis:\n{\"sector\": \"Retail\", \"note\": \"{nested}\"}\nHope this helps!";
        assert_eq!(
            repair_json(raw, JsonShape::Object),
            Some(json!({"sector": "Retail", "note": "{nested}"}))
        );
    }

    #[test]
    fn test_array_shape() {
        let raw = "Sure:\n```json\n[\"one\", \"two\"]\n```";
        assert_eq!(
            repair_json(raw, JsonShape::Array),
            Some(json!(["one", "two"]))
        );
    }

    #[test]
    fn test_wrong_shape_or_garbage() {
        assert_eq!(repair_json("[1, 2]", JsonShape::Object), None);
        assert_eq!(repair_json("no json here", JsonShape::Object), None);
        assert_eq!(repair_json("} backwards {", JsonShape::Object), None);
        assert_eq!(repair_json("{\"a\": }", JsonShape::Object), None);
    }
}
