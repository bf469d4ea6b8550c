//! Metrics calculator.
//!
//! Computes per-node strength, degree and centrality, per-edge reciprocity, a
//! graph-level summary, and the canonical edge ordering used by every
//! renderer: descending strength, ties broken by (source id, target id).
//!
//! Never mutates the graph it is given.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::connected_components;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::centrality::{self, Topology};
use crate::graph::InteractionGraph;
use crate::schema::{Edge, KindCounts, ParticipantId};

/// Derived metrics for one participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    /// Sum of strengths of edges leaving the node.
    pub outgoing: f64,
    /// Sum of strengths of edges entering the node.
    pub incoming: f64,
    /// `outgoing + incoming`; drives visual weight.
    pub combined: f64,
    /// Distinct neighbours over edges in either direction.
    pub degree: usize,
    /// 1-based position by descending combined strength, ties by id.
    pub rank: usize,
    /// `degree / (nodes - 1)`, 0 for graphs with fewer than two nodes.
    pub degree_centrality: f64,
    /// Share of directed shortest paths between other pairs passing through
    /// the node, normalized by `(nodes - 1)(nodes - 2)`.
    pub betweenness: f64,
    /// Inverse mean hop distance from the participants that reach this one,
    /// scaled by the fraction of the graph that reaches it.
    pub closeness: f64,
    /// Unweighted PageRank, damping 0.85. Sums to 1 over the graph.
    pub pagerank: f64,
}

/// Derived metrics for one directed edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeMetrics {
    pub source: ParticipantId,
    pub target: ParticipantId,
    pub strength: f64,
    pub counts: KindCounts,
    /// Strength of the opposite direction, 0 if absent.
    pub reverse_strength: f64,
    pub reciprocal: bool,
    /// `strength + reverse_strength`.
    pub pair_strength: f64,
    /// `min / max` of the two directions; 0 when not reciprocal.
    pub symmetry: f64,
}

/// Graph-level overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub total_strength: f64,
    pub average_degree: f64,
    pub density: f64,
    /// Weakly connected components; isolated nodes count as their own.
    pub components: usize,
    pub reciprocal_pairs: usize,
    /// Longest shortest path in hops, ignoring direction. 0 when the graph
    /// is empty or disconnected.
    pub diameter: usize,
}

/// Metrics for one graph snapshot. Recompute whenever the graph changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetrics {
    pub nodes: BTreeMap<ParticipantId, NodeMetrics>,
    /// Edges in canonical order.
    pub edges: Vec<EdgeMetrics>,
    pub summary: GraphSummary,
}

impl GraphMetrics {
    pub fn node(&self, id: &ParticipantId) -> Option<&NodeMetrics> {
        self.nodes.get(id)
    }

    /// Participant ids ordered by rank.
    pub fn ranked(&self) -> Vec<&ParticipantId> {
        let mut ids: Vec<_> = self.nodes.iter().collect();
        ids.sort_by_key(|(_, m)| m.rank);
        ids.into_iter().map(|(id, _)| id).collect()
    }
}

pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn compute(graph: &InteractionGraph) -> GraphMetrics {
        let node_count = graph.node_count();

        let mut nodes: BTreeMap<ParticipantId, NodeMetrics> = graph
            .participants()
            .map(|p| (p.id.clone(), NodeMetrics::default()))
            .collect();
        let mut neighbours: HashMap<&ParticipantId, BTreeSet<&ParticipantId>> = HashMap::new();

        for edge in graph.edges() {
            if let Some(m) = nodes.get_mut(&edge.source) {
                m.outgoing += edge.strength;
            }
            if let Some(m) = nodes.get_mut(&edge.target) {
                m.incoming += edge.strength;
            }
            neighbours.entry(&edge.source).or_default().insert(&edge.target);
            neighbours.entry(&edge.target).or_default().insert(&edge.source);
        }

        for (id, m) in nodes.iter_mut() {
            m.combined = m.outgoing + m.incoming;
            m.degree = neighbours.get(id).map_or(0, |n| n.len());
            m.degree_centrality = if node_count > 1 {
                m.degree as f64 / (node_count - 1) as f64
            } else {
                0.0
            };
        }

        let (topology, order) = Self::topology(graph);
        let betweenness = centrality::betweenness(&topology);
        let closeness = centrality::closeness(&topology);
        let pagerank = centrality::pagerank(&topology);
        for (i, id) in order.iter().enumerate() {
            if let Some(m) = nodes.get_mut(*id) {
                m.betweenness = betweenness[i];
                m.closeness = closeness[i];
                m.pagerank = pagerank[i];
            }
        }

        let mut by_strength: Vec<(ParticipantId, f64)> = nodes
            .iter()
            .map(|(id, m)| (id.clone(), m.combined))
            .collect();
        by_strength.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (position, (id, _)) in by_strength.iter().enumerate() {
            if let Some(m) = nodes.get_mut(id) {
                m.rank = position + 1;
            }
        }

        let mut edges: Vec<EdgeMetrics> = graph
            .edges()
            .map(|edge| Self::edge_metrics(graph, edge))
            .collect();
        edges.sort_by(canonical_order);

        let summary = Self::summarize(graph, &topology, &nodes, &edges);
        debug!(
            "Computed metrics: {} nodes, {} edges, {} components",
            summary.nodes, summary.edges, summary.components
        );

        GraphMetrics {
            nodes,
            edges,
            summary,
        }
    }

    fn edge_metrics(graph: &InteractionGraph, edge: &Edge) -> EdgeMetrics {
        let reverse = graph.edge(&edge.target, &edge.source);
        let reverse_strength = reverse.map_or(0.0, |r| r.strength);
        let symmetry = match reverse {
            Some(_) => {
                let max = edge.strength.max(reverse_strength);
                if max > 0.0 {
                    edge.strength.min(reverse_strength) / max
                } else {
                    0.0
                }
            }
            None => 0.0,
        };

        EdgeMetrics {
            source: edge.source.clone(),
            target: edge.target.clone(),
            strength: edge.strength,
            counts: edge.counts,
            reverse_strength,
            reciprocal: reverse.is_some(),
            pair_strength: edge.strength + reverse_strength,
            symmetry,
        }
    }

    fn summarize(
        graph: &InteractionGraph,
        topology: &Topology,
        nodes: &BTreeMap<ParticipantId, NodeMetrics>,
        edges: &[EdgeMetrics],
    ) -> GraphSummary {
        let n = graph.node_count();
        let m = graph.edge_count();

        let total_strength = graph.edges().fold(0.0, |acc, e| acc + e.strength);
        let degree_sum: usize = nodes.values().map(|m| m.degree).sum();
        let average_degree = if n > 0 {
            degree_sum as f64 / n as f64
        } else {
            0.0
        };
        let density = if n > 1 {
            m as f64 / (n * (n - 1)) as f64
        } else {
            0.0
        };

        GraphSummary {
            nodes: n,
            edges: m,
            total_strength,
            average_degree,
            density,
            components: connected_components(topology),
            reciprocal_pairs: edges.iter().filter(|e| e.reciprocal).count() / 2,
            diameter: centrality::diameter(topology),
        }
    }

    /// Petgraph view of the graph plus the participant id at each node index.
    fn topology(graph: &InteractionGraph) -> (Topology, Vec<&ParticipantId>) {
        let mut pg = Topology::with_capacity(graph.node_count(), graph.edge_count());
        let mut index: HashMap<&ParticipantId, NodeIndex> = HashMap::new();
        let mut order = Vec::with_capacity(graph.node_count());
        for participant in graph.participants() {
            index.insert(&participant.id, pg.add_node(()));
            order.push(&participant.id);
        }
        for edge in graph.edges() {
            if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) {
                pg.add_edge(s, t, ());
            }
        }
        (pg, order)
    }
}

/// Descending strength, then source id, then target id.
pub fn canonical_order(a: &EdgeMetrics, b: &EdgeMetrics) -> Ordering {
    b.strength
        .total_cmp(&a.strength)
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.target.cmp(&b.target))
}
