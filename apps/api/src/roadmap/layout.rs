//! Layout engine — layered (Sugiyama-style) top-to-bottom layout for
//! roadmap graphs.
//!
//! Three phases over a `petgraph` digraph:
//! 1. DFS classifies back edges, so a cyclic roadmap ranks as if the back
//!    edges were absent instead of crashing.
//! 2. Longest-path ranking in topological order assigns each node a layer.
//! 3. One downward barycenter sweep orders each layer by mean predecessor
//!    position, then coordinates are assigned on a fixed node footprint.
//!
//! Every phase is order-driven with no random tie-breaking: identical input
//! (same ids, same order) always yields identical coordinates.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::roadmap::graph::{RoadmapEdge, RoadmapNode};

/// Spacing parameters for the layered layout.
///
/// Every node is treated as the same fixed bounding box regardless of label
/// length; only the gaps between boxes are tunable.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Horizontal gap between nodes in the same rank.
    pub node_sep: f64,
    /// Vertical gap between ranks.
    pub rank_sep: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 172.0,
            node_height: 64.0,
            node_sep: 50.0,
            rank_sep: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A roadmap node annotated with its computed coordinates.
/// Serializes flat: `{ id, type, data, position }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub node: RoadmapNode,
    pub position: Position,
}

/// Assigns coordinates to every node. Edges are never modified — layout
/// reads connectivity, it does not own it. Edges whose endpoints have no
/// node (dangling targets) carry no layout information and are skipped.
pub fn layout(
    nodes: &[RoadmapNode],
    edges: &[RoadmapEdge],
    config: &LayoutConfig,
) -> Vec<PositionedNode> {
    if nodes.is_empty() {
        return Vec::new();
    }

    // Node weights index back into the input slice
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut index_of: HashMap<&str, NodeIndex> = HashMap::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let idx = graph.add_node(i);
        index_of.entry(node.id.as_str()).or_insert(idx);
    }
    for edge in edges {
        if let (Some(&source), Some(&target)) = (
            index_of.get(edge.source.as_str()),
            index_of.get(edge.target.as_str()),
        ) {
            graph.add_edge(source, target, ());
        }
    }

    let (back_edges, finish_order) = classify_edges(&graph);
    let ranks = assign_ranks(&graph, &back_edges, &finish_order);
    let layers = order_layers(&graph, &back_edges, &ranks);

    let mut positions = vec![Position { x: 0.0, y: 0.0 }; nodes.len()];
    for (rank, layer) in layers.iter().enumerate() {
        let width = layer.len() as f64;
        for (slot, &u) in layer.iter().enumerate() {
            positions[graph[u]] = Position {
                x: (slot as f64 - (width - 1.0) / 2.0) * (config.node_width + config.node_sep),
                y: rank as f64 * (config.node_height + config.rank_sep),
            };
        }
    }

    nodes
        .iter()
        .zip(positions)
        .map(|(node, position)| PositionedNode {
            node: node.clone(),
            position,
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

enum Visit {
    Enter(NodeIndex),
    Exit(NodeIndex),
}

/// Iterative DFS over all components, in node insertion order.
/// Returns the set of back edges and the finish order of all nodes —
/// reversed, the finish order is a topological order of the graph with
/// back edges removed.
fn classify_edges(graph: &DiGraph<usize, ()>) -> (HashSet<EdgeIndex>, Vec<NodeIndex>) {
    let mut color = vec![Color::White; graph.node_count()];
    let mut back_edges = HashSet::new();
    let mut finish_order = Vec::with_capacity(graph.node_count());
    let mut stack = Vec::new();

    for start in graph.node_indices() {
        if color[start.index()] != Color::White {
            continue;
        }
        stack.push(Visit::Enter(start));
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(u) => {
                    if color[u.index()] != Color::White {
                        continue;
                    }
                    color[u.index()] = Color::Gray;
                    stack.push(Visit::Exit(u));
                    for edge in graph.edges(u) {
                        match color[edge.target().index()] {
                            Color::White => stack.push(Visit::Enter(edge.target())),
                            // Gray target = ancestor still on the DFS stack
                            Color::Gray => {
                                back_edges.insert(edge.id());
                            }
                            Color::Black => {}
                        }
                    }
                }
                Visit::Exit(u) => {
                    color[u.index()] = Color::Black;
                    finish_order.push(u);
                }
            }
        }
    }

    (back_edges, finish_order)
}

/// Longest-path ranking: a node sits one rank below its deepest
/// non-back-edge predecessor. Sources sit at rank 0.
fn assign_ranks(
    graph: &DiGraph<usize, ()>,
    back_edges: &HashSet<EdgeIndex>,
    finish_order: &[NodeIndex],
) -> Vec<usize> {
    let mut ranks = vec![0usize; graph.node_count()];
    for &u in finish_order.iter().rev() {
        for edge in graph.edges(u) {
            if back_edges.contains(&edge.id()) {
                continue;
            }
            let v = edge.target();
            ranks[v.index()] = ranks[v.index()].max(ranks[u.index()] + 1);
        }
    }
    ranks
}

/// Groups nodes into layers by rank, then runs one downward barycenter
/// sweep: each layer is stably re-sorted by the mean in-layer position of
/// its predecessors. Nodes without predecessors keep their slot.
fn order_layers(
    graph: &DiGraph<usize, ()>,
    back_edges: &HashSet<EdgeIndex>,
    ranks: &[usize],
) -> Vec<Vec<NodeIndex>> {
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<NodeIndex>> = vec![Vec::new(); max_rank + 1];
    for u in graph.node_indices() {
        layers[ranks[u.index()]].push(u);
    }

    let mut slot = vec![0usize; graph.node_count()];
    for layer in &layers {
        for (i, &u) in layer.iter().enumerate() {
            slot[u.index()] = i;
        }
    }

    for rank in 1..layers.len() {
        let keys: HashMap<NodeIndex, f64> = layers[rank]
            .iter()
            .map(|&u| {
                let predecessors: Vec<usize> = graph
                    .edges_directed(u, Direction::Incoming)
                    .filter(|e| !back_edges.contains(&e.id()))
                    .map(|e| slot[e.source().index()])
                    .collect();
                let key = if predecessors.is_empty() {
                    slot[u.index()] as f64
                } else {
                    predecessors.iter().sum::<usize>() as f64 / predecessors.len() as f64
                };
                (u, key)
            })
            .collect();

        // Stable sort: ties keep step-declaration order
        layers[rank].sort_by(|a, b| {
            keys[a]
                .partial_cmp(&keys[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (i, &u) in layers[rank].iter().enumerate() {
            slot[u.index()] = i;
        }
    }

    layers
}
