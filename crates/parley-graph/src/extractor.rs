//! Interaction extractor.
//!
//! Applies the interaction rules to a normalized event sequence:
//!
//! | Event    | Observation                          | Weight |
//! |----------|--------------------------------------|--------|
//! | reply    | replier → original author            | 1.0    |
//! | mention  | mentioner → mentioned                | 0.5    |
//! | reaction | reactor → author of reacted message  | 0.3    |
//!
//! Plain messages carry no interaction. Events whose target could not be
//! resolved are dropped and counted.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::schema::{Event, EventKind, InteractionKind, InteractionObservation, KindCounts};

/// Strength of a direct reply.
pub const REPLY_WEIGHT: f64 = 1.0;
/// Strength of a mention. Weaker, often incidental.
pub const MENTION_WEIGHT: f64 = 0.5;
/// Strength of a reaction. Lightweight acknowledgment.
pub const REACTION_WEIGHT: f64 = 0.3;

/// Summary of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Number of events scanned
    pub events_scanned: usize,
    /// Number of observations emitted
    pub observations: usize,
    /// Events dropped because their target is unknown
    pub unresolved: usize,
    /// Events that carry no interaction
    pub ignored: usize,
    /// Emitted observations per kind
    pub by_kind: KindCounts,
}

/// Turns events into weighted interaction observations.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionExtractor;

impl InteractionExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract observations in event order.
    pub fn extract(&self, events: &[Event]) -> (Vec<InteractionObservation>, ExtractionResult) {
        let mut observations = Vec::new();
        let mut result = ExtractionResult {
            events_scanned: events.len(),
            ..Default::default()
        };

        for event in events {
            let Some(kind) = Self::interaction_kind(&event.kind) else {
                result.ignored += 1;
                continue;
            };

            let Some(target) = event.target() else {
                debug!(
                    "Dropping {} from {} (record {}): target not resolvable",
                    kind, event.source, event.sequence
                );
                result.unresolved += 1;
                continue;
            };

            observations.push(InteractionObservation::new(
                event.source.clone(),
                target.clone(),
                kind,
                event.sequence,
            ));
            result.by_kind.increment(kind);
        }

        result.observations = observations.len();

        info!(
            "Extraction complete: {} events, {} observations ({} replies, {} mentions, {} reactions), {} unresolved",
            result.events_scanned,
            result.observations,
            result.by_kind.reply,
            result.by_kind.mention,
            result.by_kind.reaction,
            result.unresolved
        );

        (observations, result)
    }

    /// Rule table lookup. `None` for events without an interaction rule.
    fn interaction_kind(kind: &EventKind) -> Option<InteractionKind> {
        match kind {
            EventKind::Reply { .. } => Some(InteractionKind::Reply),
            EventKind::Mention { .. } => Some(InteractionKind::Mention),
            EventKind::Reaction { .. } => Some(InteractionKind::Reaction),
            EventKind::Message => None,
        }
    }
}
