//! Sanitation of raw model output.
//!
//! Models wrap JSON in markdown fences and prefix training disclaimers;
//! both are stripped before anything downstream parses the text.

/// Markers the generation prompts ask the model to attach.
const TRAINING_MARKERS: [&str; 2] = ["[TRAINING MATERIAL]", "[TRAINING]"];

/// Strips training markers and markdown code fences.
#[must_use]
pub fn sanitize_output(text: &str) -> String {
    let mut cleaned = text.to_owned();
    for marker in TRAINING_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned = cleaned.replace("```json", "").replace("```", "");
    cleaned.trim().to_owned()
}

/// Extracts the JSON payload from model output: sanitize, then slice from
/// the first `{`/`[` to the last `}`/`]`. No aggressive rewriting: if the
/// slice still does not parse it is returned unchanged and the caller
/// decides how to degrade.
#[must_use]
pub fn repair_json(text: &str) -> String {
    let cleaned = sanitize_output(text);
    let start = cleaned.find(['{', '[']);
    let end = cleaned.rfind(['}', ']']);
    match (start, end) {
        (Some(start), Some(end)) if start <= end => cleaned[start..=end].to_owned(),
        _ => cleaned,
    }
}
