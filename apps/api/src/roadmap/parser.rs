//! Response parser — turns raw generation text into typed roadmap steps.
//!
//! LLMs habitually wrap JSON in markdown code fences despite instructions
//! not to; `strip_json_fences` is the single normalization step that papers
//! over this, kept separate from parse logic so it can be replaced without
//! touching the parse path.
//!
//! A parse failure is NOT an error: generation succeeded, so the raw text is
//! handed back to the caller as a degraded plain-text roadmap.

use serde::Deserialize;
use tracing::debug;

/// One roadmap step as emitted by generation, before graph building.
///
/// `id` may carry branch suffixes ("3a", "3b") but is treated as opaque.
/// `connections` lists the ids this step leads to; empty marks a terminal
/// step. Targets are not checked for existence — a dangling reference
/// produces an edge to a missing node downstream, never a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct RoadmapStep {
    pub id: String,
    pub label: String,
    pub description: String,
    pub connections: Vec<String>,
}

/// Outcome of parsing generation output.
#[derive(Debug)]
pub enum ParseOutcome {
    /// The output parsed into the expected step array.
    Steps(Vec<RoadmapStep>),
    /// The output was prose, a non-array, or structurally wrong; carries the
    /// fence-stripped text so callers can surface it as-is.
    Unstructured(String),
}

/// Parses raw generation text into roadmap steps.
///
/// Never fails: anything that does not strictly parse into a step array
/// (prose, a bare JSON object, elements missing required fields) comes back
/// as `Unstructured` with the cleaned text.
pub fn parse_generation(raw: &str) -> ParseOutcome {
    let cleaned = strip_json_fences(raw);

    match serde_json::from_str::<Vec<RoadmapStep>>(cleaned) {
        Ok(steps) => ParseOutcome::Steps(steps),
        Err(e) => {
            debug!("Generation output did not parse as a step array: {e}");
            ParseOutcome::Unstructured(cleaned.to_string())
        }
    }
}

/// Strips a surrounding markdown code fence, with or without a language tag
/// (```json, ```javascript, plain ```). Text without a fence passes through
/// trimmed.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Drop the optional language tag occupying the remainder of the fence line
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => rest,
    };

    rest.trim()
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or_else(|| rest.trim())
}
