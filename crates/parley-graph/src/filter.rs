//! Graph filter.
//!
//! Produces the reportable view of a graph: participants without a resolved
//! display name are removed together with their edges, then every node left
//! without an edge is removed. Evaluating isolation against the edges that
//! survive the first step makes a single pass a fixed point.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::graph::InteractionGraph;
use crate::metrics::GraphMetrics;
use crate::schema::ParticipantId;

/// Filtered graph plus the ids removed for each reason.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub graph: InteractionGraph,
    pub removed_unknown: Vec<ParticipantId>,
    pub removed_isolated: Vec<ParticipantId>,
}

/// Filter counts, suitable for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub removed_unknown: usize,
    pub removed_isolated: usize,
}

impl FilterOutcome {
    pub fn stats(&self) -> FilterStats {
        FilterStats {
            removed_unknown: self.removed_unknown.len(),
            removed_isolated: self.removed_isolated.len(),
        }
    }

    pub fn removed_total(&self) -> usize {
        self.removed_unknown.len() + self.removed_isolated.len()
    }
}

pub struct GraphFilter;

impl GraphFilter {
    /// Derive the reportable subgraph. `metrics` must belong to `graph`.
    pub fn apply(graph: &InteractionGraph, metrics: &GraphMetrics) -> Result<FilterOutcome> {
        let removed_unknown: Vec<ParticipantId> = graph
            .participants()
            .filter(|p| !p.is_named())
            .map(|p| p.id.clone())
            .collect();
        let unknown: BTreeSet<&ParticipantId> = removed_unknown.iter().collect();

        // Nodes touching at least one edge that survives the cascade.
        let mut connected: BTreeSet<&ParticipantId> = BTreeSet::new();
        for edge in graph.edges() {
            if !unknown.contains(&edge.source) && !unknown.contains(&edge.target) {
                connected.insert(&edge.source);
                connected.insert(&edge.target);
            }
        }

        let mut removed_isolated = Vec::new();
        for participant in graph.participants() {
            if unknown.contains(&participant.id) || connected.contains(&participant.id) {
                continue;
            }
            let originally_isolated = metrics
                .node(&participant.id)
                .map_or(true, |m| m.degree == 0);
            debug!(
                "Dropping isolated participant {} ({})",
                participant.id,
                if originally_isolated {
                    "no interactions"
                } else {
                    "only interacted with unnamed participants"
                }
            );
            removed_isolated.push(participant.id.clone());
        }

        let filtered = graph.restrict(|id| connected.contains(id))?;

        info!(
            "Filtered graph: {} of {} nodes kept ({} unnamed, {} isolated removed), {} edges",
            filtered.node_count(),
            graph.node_count(),
            removed_unknown.len(),
            removed_isolated.len(),
            filtered.edge_count()
        );

        Ok(FilterOutcome {
            graph: filtered,
            removed_unknown,
            removed_isolated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::aggregate;
    use crate::metrics::MetricsCalculator;
    use crate::parser::NameRegistry;
    use crate::schema::{InteractionKind, InteractionObservation};

    fn run(
        people: &[(&str, Option<&str>)],
        edges: &[(&str, &str)],
    ) -> (InteractionGraph, FilterOutcome) {
        let mut names = NameRegistry::new();
        for (id, name) in people {
            names.observe(&(*id).into(), *name);
        }
        let observations: Vec<_> = edges
            .iter()
            .map(|(s, t)| InteractionObservation::new((*s).into(), (*t).into(), InteractionKind::Reply, 0))
            .collect();
        let graph = aggregate(&names, &observations).unwrap();
        let metrics = MetricsCalculator::compute(&graph);
        let outcome = GraphFilter::apply(&graph, &metrics).unwrap();
        (graph, outcome)
    }

    #[test]
    fn test_removes_isolated() {
        let (_, outcome) = run(
            &[("a", Some("A")), ("b", Some("B")), ("loner", Some("Loner"))],
            &[("a", "b")],
        );
        assert_eq!(outcome.graph.node_count(), 2);
        assert_eq!(outcome.removed_isolated, vec![ParticipantId::from("loner")]);
        assert!(outcome.removed_unknown.is_empty());
    }

    #[test]
    fn test_unknown_cascade_isolates_neighbour() {
        let (graph, outcome) = run(
            &[("alice", Some("Alice")), ("carol", None), ("x", Some("X")), ("y", Some("Y"))],
            &[("alice", "carol"), ("x", "y")],
        );

        assert_eq!(outcome.removed_unknown, vec![ParticipantId::from("carol")]);
        assert_eq!(outcome.removed_isolated, vec![ParticipantId::from("alice")]);
        assert_eq!(outcome.graph.node_count(), 2);
        assert_eq!(outcome.graph.edge_count(), 1);
        assert!(outcome.graph.is_subgraph_of(&graph));
        assert_eq!(outcome.stats().removed_unknown, 1);
        assert_eq!(outcome.removed_total(), 2);
    }

    #[test]
    fn test_result_is_fixed_point() {
        let (_, first) = run(
            &[("a", Some("A")), ("b", None), ("c", Some("C")), ("d", Some("D"))],
            &[("a", "b"), ("b", "c"), ("c", "d")],
        );
        let metrics = MetricsCalculator::compute(&first.graph);
        let second = GraphFilter::apply(&first.graph, &metrics).unwrap();

        assert_eq!(second.graph, first.graph);
        assert_eq!(second.removed_total(), 0);
        assert!(metrics.nodes.values().all(|m| m.degree > 0));
        assert!(first.graph.participants().all(|p| p.is_named()));
    }

    #[test]
    fn test_everything_removed() {
        let (_, outcome) = run(&[("alice", Some("Alice")), ("carol", None)], &[("alice", "carol")]);
        assert!(outcome.graph.is_empty());
        assert_eq!(outcome.graph.edge_count(), 0);
    }
}
