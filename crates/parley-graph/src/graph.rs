//! Graph aggregation.
//!
//! [`GraphBuilder`] folds interaction observations into edges keyed by
//! ordered participant pairs. [`GraphBuilder::build`] freezes the result into
//! an immutable [`InteractionGraph`]; everything downstream borrows that
//! snapshot and derives new values from it.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::{AnalysisError, Result};
use crate::parser::NameRegistry;
use crate::schema::{Edge, InteractionObservation, Participant, ParticipantId};

type EdgeKey = (ParticipantId, ParticipantId);

/// Immutable weighted, directed interaction graph.
///
/// Every edge endpoint is a node, there are no self-loops, and each edge has
/// at least one contributing observation. Iteration is ordered by id, so two
/// graphs built from the same input iterate identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionGraph {
    participants: BTreeMap<ParticipantId, Participant>,
    edges: BTreeMap<EdgeKey, Edge>,
}

impl InteractionGraph {
    /// Assemble a graph from parts, checking the graph invariants.
    pub(crate) fn from_parts(
        participants: BTreeMap<ParticipantId, Participant>,
        edges: BTreeMap<EdgeKey, Edge>,
    ) -> Result<Self> {
        for ((source, target), edge) in &edges {
            if source == target {
                return Err(AnalysisError::InvariantViolation(format!(
                    "self-loop edge on {}",
                    source
                )));
            }
            for endpoint in [source, target] {
                if !participants.contains_key(endpoint) {
                    return Err(AnalysisError::InvariantViolation(format!(
                        "edge {} -> {} references missing node {}",
                        source, target, endpoint
                    )));
                }
            }
            if !(edge.strength.is_finite() && edge.strength >= 0.0) || edge.counts.total() == 0 {
                return Err(AnalysisError::InvariantViolation(format!(
                    "edge {} -> {} has strength {} from {} observations",
                    source,
                    target,
                    edge.strength,
                    edge.counts.total()
                )));
            }
        }
        Ok(Self {
            participants,
            edges,
        })
    }

    pub fn node_count(&self) -> usize {
        self.participants.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.contains_key(id)
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Participants in id order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// Edges in (source, target) order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge(&self, source: &ParticipantId, target: &ParticipantId) -> Option<&Edge> {
        self.edges.get(&(source.clone(), target.clone()))
    }

    /// True if every node and edge of `self` also exists in `other`.
    pub fn is_subgraph_of(&self, other: &InteractionGraph) -> bool {
        self.participants.keys().all(|id| other.contains(id))
            && self
                .edges
                .values()
                .all(|e| other.edge(&e.source, &e.target) == Some(e))
    }

    /// Keep only `retained` nodes and the edges between them.
    pub(crate) fn restrict<F>(&self, mut retained: F) -> Result<Self>
    where
        F: FnMut(&ParticipantId) -> bool,
    {
        let participants: BTreeMap<_, _> = self
            .participants
            .iter()
            .filter(|(id, _)| retained(*id))
            .map(|(id, p)| (id.clone(), p.clone()))
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|((s, t), _)| participants.contains_key(s) && participants.contains_key(t))
            .map(|(key, edge)| (key.clone(), edge.clone()))
            .collect();
        Self::from_parts(participants, edges)
    }
}

/// Mutable accumulator owned by the aggregation step.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    participants: BTreeMap<ParticipantId, Participant>,
    edges: BTreeMap<EdgeKey, Edge>,
    observations: usize,
    placeholders: usize,
    rejected: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder with every participant the parser resolved.
    pub fn from_names(names: &NameRegistry) -> Self {
        let mut builder = Self::new();
        for participant in names.participants() {
            builder.add_participant(participant);
        }
        builder
    }

    /// Insert or replace a node.
    pub fn add_participant(&mut self, participant: Participant) {
        self.participants.insert(participant.id.clone(), participant);
    }

    /// Accumulate one observation into its (source, target) edge.
    pub fn record(&mut self, observation: &InteractionObservation) {
        if observation.is_self_loop() {
            warn!("Ignoring self-loop observation on {}", observation.source);
            self.rejected += 1;
            return;
        }
        if !(observation.weight.is_finite() && observation.weight >= 0.0) {
            warn!(
                "Ignoring observation {} -> {} with weight {}",
                observation.source, observation.target, observation.weight
            );
            self.rejected += 1;
            return;
        }

        self.ensure_participant(&observation.source);
        self.ensure_participant(&observation.target);

        self.edges
            .entry((observation.source.clone(), observation.target.clone()))
            .or_insert_with(|| Edge::new(observation.source.clone(), observation.target.clone()))
            .absorb(observation);
        self.observations += 1;
    }

    /// Accumulate observations in iteration order.
    pub fn extend<'a, I>(&mut self, observations: I)
    where
        I: IntoIterator<Item = &'a InteractionObservation>,
    {
        for observation in observations {
            self.record(observation);
        }
    }

    fn ensure_participant(&mut self, id: &ParticipantId) {
        if !self.participants.contains_key(id) {
            warn!("Observation references unseen participant {}; adding placeholder", id);
            self.placeholders += 1;
            self.participants
                .insert(id.clone(), Participant::unnamed(id.clone()));
        }
    }

    /// Freeze into an immutable graph.
    pub fn build(self) -> Result<InteractionGraph> {
        debug!(
            "Freezing graph: {} observations, {} placeholders, {} rejected",
            self.observations, self.placeholders, self.rejected
        );
        let graph = InteractionGraph::from_parts(self.participants, self.edges)?;
        info!(
            "Aggregated graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Fold observations into a graph seeded with every known participant.
pub fn aggregate(
    names: &NameRegistry,
    observations: &[InteractionObservation],
) -> Result<InteractionGraph> {
    let mut builder = GraphBuilder::from_names(names);
    builder.extend(observations);
    builder.build()
}
