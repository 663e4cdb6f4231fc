//! Prompt construction for hosted-model extraction.

/// System instruction establishing the extractor role.
pub const SYSTEM_PROMPT: &str =
    "You are a radiology QA extractor. Extract exactly these fields as JSON. Do not include commentary.";

/// Build the user instruction for one report.
pub fn build_extraction_prompt(report_text: &str) -> String {
    format!(
        r#"Extract these fields from the radiology report:

Return strictly this JSON schema:
{{
  "laterality": "left|right|null",
  "quadrant": "upper outer|upper inner|lower outer|lower inner|retroareolar|null",
  "finding": "mass|no suspicious finding|other|null",
  "microcalcifications": true|false|null,
  "size_mm": number|null
}}

Rules:
- If benign calcifications only, set microcalcifications=false (not suspicious).
- If no size stated, size_mm=null.
- Be conservative; prefer null over guessing.

REPORT:
"""{}""""#,
        report_text.trim()
    )
}
