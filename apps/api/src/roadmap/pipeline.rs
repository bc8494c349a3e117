//! Roadmap generation pipeline.
//!
//! Flow: profile lookup → prompt build → generation call → parse →
//!       graph build → layout → envelope.
//!
//! One synchronous request/response flow per caller; the only suspension
//! point is the outbound generation call. No shared mutable state — every
//! request computes its node/edge/position set from scratch, so concurrent
//! generations are fully independent.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::GenerationClient;
use crate::profile::ProfileStore;
use crate::roadmap::graph::{build_graph, RoadmapEdge};
use crate::roadmap::layout::{layout, LayoutConfig, PositionedNode};
use crate::roadmap::parser::{parse_generation, ParseOutcome};
use crate::roadmap::prompts::{build_roadmap_prompt, ROADMAP_SYSTEM};

/// A laid-out roadmap graph, ready for the client renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapGraph {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<RoadmapEdge>,
}

/// What a generation request produces.
///
/// `Text` is the degraded-but-successful outcome: generation worked but its
/// output had no usable structure, so the raw text is shown instead of a
/// graph. Serializes as `{ "type": "reactflow" | "text", "content": … }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum RoadmapEnvelope {
    Reactflow(RoadmapGraph),
    Text(String),
}

/// Runs the full pipeline for one user.
///
/// Terminal failures: `ProfileNotFound` / `CareerNotFound` when upstream
/// data is missing, `GenerationUnavailable` when the backend call fails.
/// Unparseable output is not a failure — it degrades to `Text`.
pub async fn generate_roadmap(
    profiles: &dyn ProfileStore,
    llm: &dyn GenerationClient,
    layout_config: &LayoutConfig,
    user_id: Uuid,
) -> Result<RoadmapEnvelope, AppError> {
    let profile = profiles
        .career_profile(user_id)
        .await?
        .ok_or(AppError::ProfileNotFound(user_id))?;

    let target_career = profiles
        .target_career(user_id)
        .await?
        .ok_or(AppError::CareerNotFound(user_id))?;

    info!("Generating roadmap for user {user_id} toward '{target_career}'");

    let prompt = build_roadmap_prompt(&profile, &target_career);

    let raw = llm
        .complete(&prompt, ROADMAP_SYSTEM)
        .await
        .map_err(|e| AppError::GenerationUnavailable(e.to_string()))?;

    match parse_generation(&raw) {
        ParseOutcome::Steps(steps) => {
            let (nodes, edges) = build_graph(&steps);
            let nodes = layout(&nodes, &edges, layout_config);
            info!(
                "Roadmap for user {user_id}: {} nodes, {} edges",
                nodes.len(),
                edges.len()
            );
            Ok(RoadmapEnvelope::Reactflow(RoadmapGraph { nodes, edges }))
        }
        ParseOutcome::Unstructured(text) => {
            warn!("Generation output for user {user_id} had no parseable structure; returning raw text");
            Ok(RoadmapEnvelope::Text(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::GenerationError;
    use crate::profile::CareerProfile;
    use crate::roadmap::graph::StepStatus;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct StubProfiles {
        profile: Option<CareerProfile>,
        career: Option<String>,
    }

    #[async_trait]
    impl ProfileStore for StubProfiles {
        async fn career_profile(&self, _user_id: Uuid) -> Result<Option<CareerProfile>, AppError> {
            Ok(self.profile.clone())
        }

        async fn target_career(&self, _user_id: Uuid) -> Result<Option<String>, AppError> {
            Ok(self.career.clone())
        }
    }

    /// Replays a canned reply and records the prompt it was asked.
    struct StubGeneration {
        reply: String,
        seen_prompt: Mutex<Option<String>>,
    }

    impl StubGeneration {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl GenerationClient for StubGeneration {
        async fn complete(&self, prompt: &str, _system: &str) -> Result<String, GenerationError> {
            *self.seen_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingGeneration;

    #[async_trait]
    impl GenerationClient for FailingGeneration {
        async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, GenerationError> {
            Err(GenerationError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            })
        }
    }

    fn olevel_profiles() -> StubProfiles {
        StubProfiles {
            profile: Some(CareerProfile {
                education_level: Some("O/Level".to_string()),
                interests: Some("web development".to_string()),
                ..CareerProfile::empty(Uuid::new_v4())
            }),
            career: Some("Full Stack Developer".to_string()),
        }
    }

    /// Branching example: 7 steps, 8 connection entries, paths diverging at
    /// "2a"/"2b" and "4a"/"4b" and converging on "3" and "5".
    const SEVEN_STEP_ROADMAP: &str = r#"```json
    [
      {"id": "1",  "label": "Complete O/Levels", "description": "Finish secondary education with a focus on maths.", "connections": ["2a", "2b"]},
      {"id": "2a", "label": "A/Levels", "description": "Take A/Levels in combined maths and ICT.", "connections": ["3"]},
      {"id": "2b", "label": "Diploma in IT", "description": "Enroll in a one-year IT diploma programme.", "connections": ["3"]},
      {"id": "3",  "label": "Degree or Bootcamp", "description": "Read for a BSc in computer science or join an intensive bootcamp.", "connections": ["4a", "4b"]},
      {"id": "4a", "label": "Frontend Track", "description": "Build projects with React and TypeScript.", "connections": ["5"]},
      {"id": "4b", "label": "Backend Track", "description": "Build APIs with Node.js and SQL databases.", "connections": ["5"]},
      {"id": "5",  "label": "Full Stack Developer", "description": "Combine both tracks and apply for full stack roles.", "connections": []}
    ]
    ```"#;

    #[tokio::test]
    async fn test_end_to_end_generates_laid_out_graph() {
        let profiles = olevel_profiles();
        let llm = StubGeneration::new(SEVEN_STEP_ROADMAP);
        let config = LayoutConfig::default();

        let envelope = generate_roadmap(&profiles, &llm, &config, Uuid::new_v4())
            .await
            .unwrap();

        let prompt = llm.seen_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Full Stack Developer"));
        assert!(prompt.contains("O/Level"));

        let graph = match envelope {
            RoadmapEnvelope::Reactflow(graph) => graph,
            RoadmapEnvelope::Text(text) => panic!("expected a graph, got text: {text}"),
        };

        assert_eq!(graph.nodes.len(), 7);
        assert_eq!(graph.edges.len(), 8);
        assert!(graph
            .nodes
            .iter()
            .all(|n| n.node.data.status == StepStatus::NotStarted));

        // Nodes group into at least 3 distinct rank layers
        let distinct_y: HashSet<u64> = graph
            .nodes
            .iter()
            .map(|n| n.position.y.to_bits())
            .collect();
        assert!(distinct_y.len() >= 3, "expected >= 3 layers");
    }

    #[tokio::test]
    async fn test_missing_profile_is_terminal() {
        let profiles = StubProfiles {
            profile: None,
            career: Some("Full Stack Developer".to_string()),
        };
        let llm = StubGeneration::new("[]");
        let result =
            generate_roadmap(&profiles, &llm, &LayoutConfig::default(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::ProfileNotFound(_))));
        // Lookup failure must short-circuit before any generation spend
        assert!(llm.seen_prompt.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_career_is_terminal() {
        let profiles = StubProfiles {
            profile: Some(CareerProfile::empty(Uuid::new_v4())),
            career: None,
        };
        let llm = StubGeneration::new("[]");
        let result =
            generate_roadmap(&profiles, &llm, &LayoutConfig::default(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::CareerNotFound(_))));
    }

    #[tokio::test]
    async fn test_prose_reply_degrades_to_text_envelope() {
        let profiles = olevel_profiles();
        let llm = StubGeneration::new("Sure! Here's your roadmap: learn HTML first.");
        let envelope = generate_roadmap(&profiles, &llm, &LayoutConfig::default(), Uuid::new_v4())
            .await
            .unwrap();
        match envelope {
            RoadmapEnvelope::Text(text) => assert!(text.contains("learn HTML")),
            RoadmapEnvelope::Reactflow(_) => panic!("prose must degrade to text"),
        }
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_generation_unavailable() {
        let profiles = olevel_profiles();
        let result = generate_roadmap(
            &profiles,
            &FailingGeneration,
            &LayoutConfig::default(),
            Uuid::new_v4(),
        )
        .await;
        assert!(matches!(result, Err(AppError::GenerationUnavailable(_))));
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = RoadmapEnvelope::Text("plain".to_string());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["content"], "plain");

        let graph = RoadmapEnvelope::Reactflow(RoadmapGraph {
            nodes: vec![],
            edges: vec![],
        });
        let value = serde_json::to_value(&graph).unwrap();
        assert_eq!(value["type"], "reactflow");
        assert!(value["content"]["nodes"].is_array());
        assert!(value["content"]["edges"].is_array());
    }
}
