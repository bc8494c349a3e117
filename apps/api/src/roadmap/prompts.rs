//! Prompt builder for roadmap generation.
//!
//! One deterministic instruction string per (profile, target career) pair.
//! Missing profile fields are substituted with empty strings — a sparse
//! profile degrades prompt quality, it must never abort generation.

use crate::profile::CareerProfile;

/// System prompt for roadmap generation — enforces JSON-only output.
pub const ROADMAP_SYSTEM: &str = "You are an expert career counselor who designs \
    realistic, step-by-step career roadmaps. \
    You MUST respond with a valid JSON array only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Roadmap prompt template.
/// Replace: {education_level}, {field_of_study}, {interests}, {skills},
///          {goals}, {target_career}
const ROADMAP_PROMPT_TEMPLATE: &str = r#"Design a branching career roadmap that takes this user from their current situation to becoming a {target_career}.

USER PROFILE:
- Current education level: {education_level}
- Field of study: {field_of_study}
- Interests: {interests}
- Existing skills: {skills}
- Goals: {goals}

Return a JSON ARRAY of step objects with this EXACT schema (no extra fields):
[
  {
    "id": "1",
    "label": "Short step title",
    "description": "One or two sentences explaining the step.",
    "connections": ["2a", "2b"]
  }
]

HARD RULES:
1. Each element has exactly the fields `id`, `label`, `description`, `connections` — nothing else
2. `id` values are strings, unique within the roadmap; use suffixes like "2a" and "2b" where paths diverge
3. `connections` lists the ids of the steps this step leads to; an empty list marks a terminal step
4. The roadmap MUST branch realistically — show genuine alternatives such as diplomas vs university degrees vs bootcamps vs self-study — starting from the user's current education level
5. Branches may converge: distinct paths are allowed to connect to the same shared step id
6. Every id referenced in a `connections` list must appear as a step in the array
7. The final step is the target career itself: {target_career}"#;

/// Builds the generation prompt for one user.
/// Absent profile fields render as empty strings rather than failing.
pub fn build_roadmap_prompt(profile: &CareerProfile, target_career: &str) -> String {
    ROADMAP_PROMPT_TEMPLATE
        .replace("{target_career}", target_career)
        .replace(
            "{education_level}",
            profile.education_level.as_deref().unwrap_or(""),
        )
        .replace(
            "{field_of_study}",
            profile.field_of_study.as_deref().unwrap_or(""),
        )
        .replace("{interests}", profile.interests.as_deref().unwrap_or(""))
        .replace("{skills}", profile.skills.as_deref().unwrap_or(""))
        .replace("{goals}", profile.goals.as_deref().unwrap_or(""))
}
