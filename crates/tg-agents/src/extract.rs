//! Text and metadata extraction helpers for the gatherer stage.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use tg_tools::retrieval::value_to_text;

/// Key spellings observed in the knowledge base, probed in this exact order.
const ADDITIONAL_INFO_KEYS: &[&str] = &[
    "additional Information",
    "Additional information",
    "Additional Information",
    "additional information",
];

static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Case-insensitive, dot matches newline: find the header (with or
    // without a markdown heading marker) and capture all trailing text.
    Regex::new(r"(?is)(?:###\s*)?additional information[:\s]+(.*)")
        .expect("section regex is valid")
});

static PAIRED_MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(search_rag|duckduckgo_search)>.*?</(search_rag|duckduckgo_search)>")
        .expect("paired markup regex is valid")
});

static STANDALONE_MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?(?:search_rag|duckduckgo_search)[^>]*>").expect("standalone markup regex is valid")
});

static EXCESS_BLANK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n\s*\n").expect("blank-line regex is valid"));

/// Extract the "additional information" section from raw document text:
/// everything after the header, trimmed. None when no header is present.
pub fn additional_info_section(text: &str) -> Option<String> {
    let captures = SECTION_RE.captures(text)?;
    let section = captures.get(1)?.as_str().trim();
    if section.is_empty() {
        None
    } else {
        Some(section.to_string())
    }
}

/// Extract the additional-information payload from structured metadata.
///
/// The metadata carries a `json` field (sometimes double-serialized as a
/// string), whose payload may sit under `data.json`, under `json`, or at the
/// top level. Within that object the key spellings are probed in the fixed
/// `ADDITIONAL_INFO_KEYS` order. Returns the matched key and rendered text.
pub fn additional_info_from_metadata(metadata: &Value) -> Option<(&'static str, String)> {
    let raw = metadata.get("json")?;

    let data: Value = match raw {
        Value::String(s) => serde_json::from_str(s).ok()?,
        other => other.clone(),
    };

    let target = if let Some(nested) = data.get("data").and_then(|d| d.get("json")) {
        nested
    } else if let Some(nested) = data.get("json").filter(|v| v.is_object()) {
        nested
    } else {
        &data
    };

    let object = target.as_object()?;

    for key in ADDITIONAL_INFO_KEYS {
        if let Some(value) = object.get(*key) {
            if value.is_null() {
                continue;
            }
            let text = value_to_text(value);
            if !text.trim().is_empty() {
                return Some((key, text));
            }
        }
    }

    None
}

/// Strip residual tool-call markup from model output and collapse runs of
/// three or more newlines down to a single blank line.
pub fn strip_tool_markup(text: &str) -> String {
    let cleaned = PAIRED_MARKUP_RE.replace_all(text, "");
    let cleaned = STANDALONE_MARKUP_RE.replace_all(&cleaned, "");

    let mut collapsed = cleaned.into_owned();
    loop {
        let next = EXCESS_BLANK_RE.replace_all(&collapsed, "\n\n").into_owned();
        if next == collapsed {
            break;
        }
        collapsed = next;
    }

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_extraction_markdown_header() {
        let text = "Overview of the zoo.\n### Additional information: Open daily.\nParking is free.";
        let section = additional_info_section(text).unwrap();
        assert!(section.starts_with("Open daily."));
        assert!(section.contains("Parking is free."));
    }

    #[test]
    fn test_section_extraction_case_insensitive() {
        let text = "ADDITIONAL INFORMATION:\nBring sunscreen.";
        assert_eq!(additional_info_section(text).unwrap(), "Bring sunscreen.");
    }

    #[test]
    fn test_section_extraction_absent() {
        assert!(additional_info_section("Just a plain description.").is_none());
    }

    #[test]
    fn test_metadata_extraction_flat_object() {
        let metadata = json!({"json": {"Additional information": "Wheelchair accessible."}});
        let (key, text) = additional_info_from_metadata(&metadata).unwrap();
        assert_eq!(key, "Additional information");
        assert_eq!(text, "Wheelchair accessible.");
    }

    #[test]
    fn test_metadata_extraction_double_serialized_and_nested() {
        let inner = json!({"data": {"json": {"additional information": ["No flash photography", "Re-entry allowed"]}}});
        let metadata = json!({"json": inner.to_string()});
        let (_, text) = additional_info_from_metadata(&metadata).unwrap();
        assert_eq!(text, "No flash photography\nRe-entry allowed");
    }

    #[test]
    fn test_metadata_extraction_key_precedence() {
        let metadata = json!({"json": {
            "additional information": "lowercase value",
            "additional Information": "first-listed value"
        }});
        let (key, text) = additional_info_from_metadata(&metadata).unwrap();
        assert_eq!(key, "additional Information");
        assert_eq!(text, "first-listed value");
    }

    #[test]
    fn test_metadata_extraction_missing() {
        assert!(additional_info_from_metadata(&json!({})).is_none());
        assert!(additional_info_from_metadata(&json!({"json": {"name": "Zoo"}})).is_none());
        assert!(additional_info_from_metadata(&json!({"json": "not json at all {"})).is_none());
    }

    #[test]
    fn test_strip_tool_markup() {
        let text = "Summary.\n<search_rag>{\"query\": \"zoo\"}</search_rag>\n\n\n\nMore details.\n<duckduckgo_search max_results=3>";
        let cleaned = strip_tool_markup(text);
        assert!(!cleaned.contains("search_rag"));
        assert!(!cleaned.contains("duckduckgo_search"));
        assert!(!cleaned.contains("\n\n\n"));
        assert!(cleaned.starts_with("Summary."));
        assert!(cleaned.ends_with("More details."));
    }

    #[test]
    fn test_strip_tool_markup_leaves_plain_text_alone() {
        let text = "## Pricing\n\nAdults $30.";
        assert_eq!(strip_tool_markup(text), text);
    }
}
