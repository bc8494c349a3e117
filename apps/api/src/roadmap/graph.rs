//! Graph builder — pure transform from parsed steps to render-ready
//! nodes and edges.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::roadmap::parser::RoadmapStep;

/// Node type rendered by the client as a status-aware card.
pub const STATUS_NODE_TYPE: &str = "statusNode";
/// Edge type understood by the client renderer.
pub const STEP_EDGE_TYPE: &str = "smoothstep";

/// Completion status of a roadmap step. Always `NotStarted` at generation
/// time; later mutations belong to the progress tracker, never to this
/// pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    NotStarted,
    Ongoing,
    Done,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::NotStarted => "not_started",
            StepStatus::Ongoing => "ongoing",
            StepStatus::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    pub description: String,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub data: NodeData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

/// Derives the stable edge id for a `(source, target)` pair.
/// Idempotent across regenerations, which is what lets duplicate
/// declarations be collapsed by id.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("e{source}-{target}")
}

/// Builds the node and edge lists for one roadmap.
///
/// Nodes come out in step order with status `not_started`. Edges preserve
/// per-step connection order, then step order, and are deduplicated by
/// derived id — the first declaration of a `(source, target)` pair wins.
/// Dangling connection targets are accepted and simply yield an edge whose
/// target has no node.
pub fn build_graph(steps: &[RoadmapStep]) -> (Vec<RoadmapNode>, Vec<RoadmapEdge>) {
    let mut nodes = Vec::with_capacity(steps.len());
    let mut edges = Vec::new();
    let mut seen_edge_ids = HashSet::new();

    for step in steps {
        nodes.push(RoadmapNode {
            id: step.id.clone(),
            node_type: STATUS_NODE_TYPE.to_string(),
            data: NodeData {
                label: step.label.clone(),
                description: step.description.clone(),
                status: StepStatus::NotStarted,
            },
        });

        for target in &step.connections {
            let id = edge_id(&step.id, target);
            if !seen_edge_ids.insert(id.clone()) {
                continue;
            }
            edges.push(RoadmapEdge {
                id,
                source: step.id.clone(),
                target: target.clone(),
                edge_type: STEP_EDGE_TYPE.to_string(),
            });
        }
    }

    (nodes, edges)
}
