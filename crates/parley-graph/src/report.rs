//! The structure handed to rendering collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::InteractionGraph;
use crate::metrics::{EdgeMetrics, GraphSummary, MetricsCalculator, NodeMetrics};
use crate::schema::ParticipantId;

/// A participant present in the reportable graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParticipant {
    pub id: ParticipantId,
    pub name: String,
}

/// Filtered graph, its metrics, and the canonical edge order.
///
/// Renderers read this and never mutate it. Node metrics are computed on
/// the filtered graph, so degrees and strengths match the listed edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Ordered by rank (descending combined strength, ties by id).
    pub participants: Vec<ReportParticipant>,
    /// Descending strength, ties by (source, target).
    pub edges: Vec<EdgeMetrics>,
    pub metrics: BTreeMap<ParticipantId, NodeMetrics>,
    pub summary: GraphSummary,
}

impl Report {
    /// Build the report for an already filtered graph.
    pub fn from_graph(graph: &InteractionGraph) -> Self {
        let metrics = MetricsCalculator::compute(graph);

        let participants = metrics
            .ranked()
            .into_iter()
            .filter_map(|id| graph.participant(id))
            .map(|p| ReportParticipant {
                id: p.id.clone(),
                name: p.label().to_string(),
            })
            .collect();

        Self {
            participants,
            edges: metrics.edges,
            metrics: metrics.nodes,
            summary: metrics.summary,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn name_of(&self, id: &ParticipantId) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.name.as_str())
    }

    /// The `limit` strongest edges.
    pub fn top_edges(&self, limit: usize) -> &[EdgeMetrics] {
        &self.edges[..self.edges.len().min(limit)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::aggregate;
    use crate::parser::NameRegistry;
    use crate::schema::{InteractionKind, InteractionObservation};

    #[test]
    fn test_report_ordering() {
        let mut names = NameRegistry::new();
        for (id, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
            names.observe(&id.into(), Some(name));
        }
        let observations = vec![
            InteractionObservation::new("bob".into(), "alice".into(), InteractionKind::Reply, 0),
            InteractionObservation::new("carol".into(), "alice".into(), InteractionKind::Reaction, 1),
        ];
        let graph = aggregate(&names, &observations).unwrap();

        let report = Report::from_graph(&graph);
        let ids: Vec<&str> = report.participants.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob", "carol"]);
        assert_eq!(report.name_of(&"bob".into()), Some("Bob"));
        assert_eq!(report.edges[0].source, "bob".into());
        assert_eq!(report.top_edges(1).len(), 1);
        assert_eq!(report.top_edges(10).len(), 2);
    }
}
