//! Core types for the interaction graph.
//!
//! This module defines the values that flow through the pipeline:
//! - `ParticipantId` / `Participant`: chat members, keyed by platform id
//! - `Event` / `EventKind`: normalized occurrences produced by the parser
//! - `InteractionKind`: the kinds of interaction that carry weight
//! - `InteractionObservation`: one directed unit of interaction evidence
//! - `Edge`: aggregated strength between an ordered pair of participants

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extractor::{MENTION_WEIGHT, REACTION_WEIGHT, REPLY_WEIGHT};

/// Stable platform identity of a chat member (e.g. `user123456`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A chat member with a best-effort display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// `None` when no non-empty name was ever seen for this id.
    pub display_name: Option<String>,
}

impl Participant {
    pub fn new(id: ParticipantId, display_name: Option<String>) -> Self {
        Self { id, display_name }
    }

    /// Placeholder for an id that was never named.
    pub fn unnamed(id: ParticipantId) -> Self {
        Self {
            id,
            display_name: None,
        }
    }

    pub fn is_named(&self) -> bool {
        self.display_name.is_some()
    }

    /// Display name, falling back to the raw id.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.id.as_str())
    }
}

/// Kinds of interaction that contribute strength to an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Replier → author of the replied message
    Reply,
    /// Mentioner → mentioned participant
    Mention,
    /// Reactor → author of the reacted message
    Reaction,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 3] = [
        InteractionKind::Reply,
        InteractionKind::Mention,
        InteractionKind::Reaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::Reply => "reply",
            InteractionKind::Mention => "mention",
            InteractionKind::Reaction => "reaction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reply" => Some(InteractionKind::Reply),
            "mention" => Some(InteractionKind::Mention),
            "reaction" => Some(InteractionKind::Reaction),
            _ => None,
        }
    }

    /// Strength contributed by a single observation of this kind.
    pub fn weight(&self) -> f64 {
        match self {
            InteractionKind::Reply => REPLY_WEIGHT,
            InteractionKind::Mention => MENTION_WEIGHT,
            InteractionKind::Reaction => REACTION_WEIGHT,
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observation counts per interaction kind, kept for explainability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub reply: u32,
    pub mention: u32,
    pub reaction: u32,
}

impl KindCounts {
    pub fn get(&self, kind: InteractionKind) -> u32 {
        match kind {
            InteractionKind::Reply => self.reply,
            InteractionKind::Mention => self.mention,
            InteractionKind::Reaction => self.reaction,
        }
    }

    pub fn increment(&mut self, kind: InteractionKind) {
        match kind {
            InteractionKind::Reply => self.reply += 1,
            InteractionKind::Mention => self.mention += 1,
            InteractionKind::Reaction => self.reaction += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.reply + self.mention + self.reaction
    }
}

/// What a normalized event represents.
///
/// Raw records are validated into this closed set once, at the parser
/// boundary. Targets are already resolved to participant ids; a reply whose
/// original message is not in the export keeps `target: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum EventKind {
    /// A message was sent. Carries no interaction on its own.
    Message,
    /// The source replied to message `reply_to`.
    Reply {
        reply_to: i64,
        target: Option<ParticipantId>,
    },
    /// The source mentioned `target`.
    Mention { target: ParticipantId },
    /// The source reacted to a message authored by `target`.
    Reaction { target: ParticipantId },
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::Reply { .. } => "reply",
            EventKind::Mention { .. } => "mention",
            EventKind::Reaction { .. } => "reaction",
        }
    }
}

/// One normalized occurrence from the export. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Position of the originating record in the raw export.
    pub sequence: usize,
    pub timestamp: Option<DateTime<Utc>>,
    pub source: ParticipantId,
    /// Message the event belongs to (for reactions: the reacted message).
    pub message_id: Option<i64>,
    pub kind: EventKind,
}

impl Event {
    /// Participant on the receiving end, if the event has one.
    pub fn target(&self) -> Option<&ParticipantId> {
        match &self.kind {
            EventKind::Message => None,
            EventKind::Reply { target, .. } => target.as_ref(),
            EventKind::Mention { target } | EventKind::Reaction { target } => Some(target),
        }
    }
}

/// A directed, weighted unit of evidence that `source` interacted with `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionObservation {
    pub source: ParticipantId,
    pub target: ParticipantId,
    pub kind: InteractionKind,
    pub weight: f64,
    /// Sequence of the event this observation was derived from.
    pub sequence: usize,
}

impl InteractionObservation {
    /// Create an observation weighted by its kind.
    pub fn new(
        source: ParticipantId,
        target: ParticipantId,
        kind: InteractionKind,
        sequence: usize,
    ) -> Self {
        Self {
            source,
            target,
            kind,
            weight: kind.weight(),
            sequence,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Aggregated, directed interaction between an ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: ParticipantId,
    pub target: ParticipantId,
    /// Sum of contributing observation weights, in observation order.
    pub strength: f64,
    pub counts: KindCounts,
}

impl Edge {
    pub fn new(source: ParticipantId, target: ParticipantId) -> Self {
        Self {
            source,
            target,
            strength: 0.0,
            counts: KindCounts::default(),
        }
    }

    /// Fold one observation into this edge.
    pub fn absorb(&mut self, observation: &InteractionObservation) {
        self.strength += observation.weight;
        self.counts.increment(observation.kind);
    }

    pub fn key(&self) -> (ParticipantId, ParticipantId) {
        (self.source.clone(), self.target.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_kind_roundtrip() {
        for kind in InteractionKind::ALL {
            let parsed = InteractionKind::parse(kind.as_str()).unwrap();
            assert_eq!(kind, parsed);
        }
        assert_eq!(InteractionKind::parse("forward"), None);
    }

    #[test]
    fn test_kind_weights() {
        assert_eq!(InteractionKind::Reply.weight(), 1.0);
        assert_eq!(InteractionKind::Mention.weight(), 0.5);
        assert_eq!(InteractionKind::Reaction.weight(), 0.3);
    }

    #[test]
    fn test_edge_absorb() {
        let alice = ParticipantId::from("alice");
        let bob = ParticipantId::from("bob");
        let mut edge = Edge::new(bob.clone(), alice.clone());

        edge.absorb(&InteractionObservation::new(bob.clone(), alice.clone(), InteractionKind::Reply, 0));
        edge.absorb(&InteractionObservation::new(bob, alice, InteractionKind::Mention, 1));

        assert_eq!(edge.strength, 1.5);
        assert_eq!(edge.counts.reply, 1);
        assert_eq!(edge.counts.mention, 1);
        assert_eq!(edge.counts.total(), 2);
    }

    #[test]
    fn test_participant_label() {
        let named = Participant::new("user1".into(), Some("Alice".into()));
        let unnamed = Participant::unnamed("user2".into());
        assert!(named.is_named());
        assert_eq!(named.label(), "Alice");
        assert!(!unnamed.is_named());
        assert_eq!(unnamed.label(), "user2");
    }

    #[test]
    fn test_event_target() {
        let event = Event {
            sequence: 0,
            timestamp: None,
            source: "bob".into(),
            message_id: Some(2),
            kind: EventKind::Reply {
                reply_to: 1,
                target: None,
            },
        };
        assert_eq!(event.target(), None);
        assert_eq!(event.kind.as_str(), "reply");
    }
}
