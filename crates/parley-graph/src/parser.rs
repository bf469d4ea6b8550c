//! Record parser.
//!
//! Turns the raw, loosely-typed export records into an ordered sequence of
//! [`Event`]s and a [`NameRegistry`] holding the best-known display name for
//! every participant. Malformed records are skipped and counted; nothing in
//! here is fatal.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RecordError;
use crate::schema::{Event, EventKind, Participant, ParticipantId};

/// Naive timestamp layouts accepted besides RFC 3339. Interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// A deserialized chat export, already decoded from its wire format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatExport {
    /// Message-like records in export order.
    #[serde(default)]
    pub records: Vec<ExportRecord>,
    /// Optional member directory. Only fills names that messages never provide.
    #[serde(default)]
    pub members: Vec<Member>,
}

impl ChatExport {
    pub fn new(records: Vec<ExportRecord>) -> Self {
        Self {
            records,
            members: Vec::new(),
        }
    }
}

/// One raw message-like record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub reply_to: Option<i64>,
    #[serde(default)]
    pub reactions: Vec<ReactionRecord>,
    /// Ids of mentioned participants.
    #[serde(default)]
    pub mentions: Vec<String>,
}

/// A single reaction left on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub reactor_id: String,
    #[serde(default)]
    pub reactor_name: Option<String>,
}

/// Directory entry supplied alongside the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Scoped "latest name wins" accumulator: participant id → last-seen name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRegistry {
    names: BTreeMap<ParticipantId, Option<String>>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` and, if `name` is non-empty, make it the current name.
    pub fn observe(&mut self, id: &ParticipantId, name: Option<&str>) {
        let entry = self.names.entry(id.clone()).or_insert(None);
        if let Some(name) = clean_name(name) {
            *entry = Some(name);
        }
    }

    /// Register `id` without naming it.
    pub fn register(&mut self, id: &ParticipantId) {
        self.names.entry(id.clone()).or_insert(None);
    }

    /// Name a registered participant that is still unknown.
    /// Returns `true` if the name was applied.
    pub fn fill_unknown(&mut self, id: &ParticipantId, name: Option<&str>) -> bool {
        let Some(name) = clean_name(name) else {
            return false;
        };
        match self.names.get_mut(id) {
            Some(slot) if slot.is_none() => {
                *slot = Some(name);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.names.contains_key(id)
    }

    pub fn name_of(&self, id: &ParticipantId) -> Option<&str> {
        self.names.get(id).and_then(|n| n.as_deref())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn named_count(&self) -> usize {
        self.names.values().filter(|n| n.is_some()).count()
    }

    /// Participants in id order.
    pub fn participants(&self) -> impl Iterator<Item = Participant> + '_ {
        self.names
            .iter()
            .map(|(id, name)| Participant::new(id.clone(), name.clone()))
    }
}

/// Counters collected while parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub records_total: usize,
    pub records_skipped: usize,
    pub records_usable: usize,
    /// Replies, mentions and reactions pointing back at their own sender.
    pub self_references: usize,
    pub participants: usize,
    pub named_participants: usize,
}

/// Output of the record parser.
#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
    /// Events in chronological order.
    pub events: Vec<Event>,
    pub names: NameRegistry,
    pub stats: ParseStats,
    pub skipped: Vec<RecordError>,
}

impl ParsedExport {
    pub fn is_empty(&self) -> bool {
        self.stats.records_usable == 0
    }
}

/// A record that passed validation.
struct ValidRecord<'a> {
    index: usize,
    record: &'a ExportRecord,
    sender: ParticipantId,
    timestamp: Option<DateTime<Utc>>,
    /// Own timestamp, or the one inherited from the preceding record.
    sort_key: Option<DateTime<Utc>>,
}

/// Normalizes raw export records into events.
pub struct RecordParser;

impl RecordParser {
    /// Parse an export into chronologically ordered events.
    pub fn parse(export: &ChatExport) -> ParsedExport {
        let mut skipped = Vec::new();
        let mut valid = Vec::with_capacity(export.records.len());
        let mut carried: Option<DateTime<Utc>> = None;

        for (index, record) in export.records.iter().enumerate() {
            match Self::validate(index, record) {
                Ok((sender, timestamp)) => {
                    if timestamp.is_some() {
                        carried = timestamp;
                    }
                    valid.push(ValidRecord {
                        index,
                        record,
                        sender,
                        timestamp,
                        sort_key: carried,
                    });
                }
                Err(e) => {
                    debug!("Skipping malformed record: {}", e);
                    skipped.push(e);
                }
            }
        }

        // Stable: equal keys keep export order.
        valid.sort_by_key(|v| v.sort_key);

        let mut authors: HashMap<i64, ParticipantId> = HashMap::new();
        for v in &valid {
            if let Some(id) = v.record.message_id {
                authors.entry(id).or_insert_with(|| v.sender.clone());
            }
        }

        let mut names = NameRegistry::new();
        let mut events = Vec::new();
        let mut self_references = 0;

        for v in &valid {
            let record = v.record;
            names.observe(&v.sender, record.sender_name.as_deref());

            let event = |source: &ParticipantId, kind: EventKind| Event {
                sequence: v.index,
                timestamp: v.timestamp,
                source: source.clone(),
                message_id: record.message_id,
                kind,
            };

            events.push(event(&v.sender, EventKind::Message));

            if let Some(reply_to) = record.reply_to {
                let target = authors.get(&reply_to).cloned();
                if target.as_ref() == Some(&v.sender) {
                    debug!("Dropping self-reply in record {}", v.index);
                    self_references += 1;
                } else {
                    events.push(event(&v.sender, EventKind::Reply { reply_to, target }));
                }
            }

            for mentioned in &record.mentions {
                let Some(mentioned) = clean_id(mentioned) else {
                    continue;
                };
                if mentioned == v.sender {
                    debug!("Dropping self-mention in record {}", v.index);
                    self_references += 1;
                    continue;
                }
                names.register(&mentioned);
                events.push(event(&v.sender, EventKind::Mention { target: mentioned }));
            }

            for reaction in &record.reactions {
                let Some(reactor) = clean_id(&reaction.reactor_id) else {
                    continue;
                };
                names.observe(&reactor, reaction.reactor_name.as_deref());
                if reactor == v.sender {
                    debug!("Dropping self-reaction in record {}", v.index);
                    self_references += 1;
                    continue;
                }
                events.push(event(
                    &reactor,
                    EventKind::Reaction {
                        target: v.sender.clone(),
                    },
                ));
            }
        }

        let mut filled = 0;
        for member in &export.members {
            if let Some(id) = clean_id(&member.id) {
                if names.fill_unknown(&id, member.name.as_deref()) {
                    filled += 1;
                }
            }
        }
        if filled > 0 {
            debug!("Filled {} unknown names from the member directory", filled);
        }

        let stats = ParseStats {
            records_total: export.records.len(),
            records_skipped: skipped.len(),
            records_usable: valid.len(),
            self_references,
            participants: names.len(),
            named_participants: names.named_count(),
        };

        info!(
            "Parsed {} records: {} usable, {} skipped, {} events, {} participants ({} named)",
            stats.records_total,
            stats.records_usable,
            stats.records_skipped,
            events.len(),
            stats.participants,
            stats.named_participants
        );

        ParsedExport {
            events,
            names,
            stats,
            skipped,
        }
    }

    fn validate(
        index: usize,
        record: &ExportRecord,
    ) -> Result<(ParticipantId, Option<DateTime<Utc>>), RecordError> {
        let sender = record
            .sender_id
            .as_deref()
            .and_then(clean_id)
            .ok_or(RecordError::MissingSender { index })?;

        let timestamp = match record.timestamp.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| {
                RecordError::InvalidTimestamp {
                    index,
                    value: raw.to_string(),
                }
            })?),
        };

        Ok((sender, timestamp))
    }
}

/// Parse an export timestamp: RFC 3339, naive ISO-like (as UTC), or unix seconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = raw.parse().ok()?;
        return DateTime::from_timestamp(secs, 0);
    }

    None
}

fn clean_id(raw: &str) -> Option<ParticipantId> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| ParticipantId::new(trimmed))
}

fn clean_name(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}
