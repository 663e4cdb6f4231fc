//! Parsing of hosted-model responses into the extraction schema.

use serde::Deserialize;

use crate::error::ExtractionError;
use crate::extract::Result;
use crate::models::record::{ExtractionRecord, Finding, Laterality, Quadrant};

/// Strict mirror of the JSON schema given in the prompt.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExtraction {
    laterality: Option<Laterality>,
    quadrant: Option<Quadrant>,
    finding: Option<Finding>,
    microcalcifications: Option<bool>,
    size_mm: Option<f64>,
}

/// Remove Markdown code fences the model may wrap its JSON in.
///
/// Leading and trailing backtick runs are dropped, along with a language tag
/// line such as `json` directly after the opening fence.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }

    let inner = text.trim_matches('`');
    let inner = match inner.split_once('\n') {
        Some((first, rest)) if is_language_tag(first) => rest,
        _ => inner,
    };

    inner.trim()
}

fn is_language_tag(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse a model response into an [`ExtractionRecord`].
///
/// Values are never coerced: a string `"true"` for a boolean field, a value
/// outside a field's vocabulary, or an unexpected key all fail.
pub fn parse_extraction(response: &str) -> Result<ExtractionRecord> {
    let body = strip_code_fences(response);

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ExtractionError::parse(format!("invalid JSON: {e}"), body))?;

    if !value.is_object() {
        return Err(ExtractionError::parse("expected a JSON object", body));
    }

    let raw: RawExtraction = serde_json::from_value(value)
        .map_err(|e| ExtractionError::parse(format!("schema mismatch: {e}"), body))?;

    if let Some(size) = raw.size_mm {
        if !size.is_finite() || size < 0.0 {
            return Err(ExtractionError::parse(
                format!("size_mm must be a non-negative number, got {size}"),
                body,
            ));
        }
    }

    Ok(ExtractionRecord {
        laterality: raw.laterality,
        quadrant: raw.quadrant,
        finding: raw.finding,
        microcalcifications: raw.microcalcifications,
        size_mm: raw.size_mm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const BODY: &str = r#"{"laterality": "right", "quadrant": "upper outer", "finding": "mass", "microcalcifications": false, "size_mm": 14}"#;

    fn expected() -> ExtractionRecord {
        ExtractionRecord {
            laterality: Some(Laterality::Right),
            quadrant: Some(Quadrant::UpperOuter),
            finding: Some(Finding::Mass),
            microcalcifications: Some(false),
            size_mm: Some(14.0),
        }
    }

    #[rstest]
    #[case::bare(BODY.to_string())]
    #[case::json_fence(format!("```json\n{BODY}\n```"))]
    #[case::plain_fence(format!("```\n{BODY}\n```"))]
    #[case::single_line_fence(format!("```{BODY}```"))]
    #[case::padded(format!("\n\n  ```JSON\n{BODY}\n```  \n"))]
    fn test_parse_fenced_variants(#[case] response: String) {
        assert_eq!(parse_extraction(&response).unwrap(), expected());
    }

    #[test]
    fn test_strip_keeps_multiline_json_without_tag() {
        let response = "```\n{\n  \"laterality\": \"left\"\n}\n```";
        assert_eq!(strip_code_fences(response), "{\n  \"laterality\": \"left\"\n}");

        let no_tag = "```{\n\"size_mm\": 3\n}```";
        assert_eq!(strip_code_fences(no_tag), "{\n\"size_mm\": 3\n}");
    }

    #[test]
    fn test_nulls_and_missing_fields_are_absent() {
        let record = parse_extraction(r#"{"laterality": null, "size_mm": null}"#).unwrap();
        assert!(record.is_empty());
    }

    #[rstest]
    #[case::not_json("I could not find any fields.")]
    #[case::truncated(r#"{"laterality": "left""#)]
    #[case::array("[null, null, null, null, null]")]
    #[case::string_bool(r#"{"microcalcifications": "true"}"#)]
    #[case::string_null(r#"{"laterality": "null"}"#)]
    #[case::capitalized(r#"{"laterality": "Left"}"#)]
    #[case::unknown_quadrant(r#"{"quadrant": "central"}"#)]
    #[case::extra_key(r#"{"laterality": "left", "confidence": 0.9}"#)]
    #[case::string_size(r#"{"size_mm": "14"}"#)]
    #[case::negative_size(r#"{"size_mm": -2.0}"#)]
    fn test_malformed_responses_are_parse_errors(#[case] response: &str) {
        let err = parse_extraction(response).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { .. }), "got {err:?}");
    }
}
