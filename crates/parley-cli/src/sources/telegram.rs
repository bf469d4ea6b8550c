//! Telegram Desktop `result.json` adapter.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use parley_graph::{ChatExport, ExportRecord, Member, ReactionRecord};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

/// `@handle` tokens in plain message text.
static HANDLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^\w@])@([A-Za-z][A-Za-z0-9_]{3,31})\b").expect("handle regex is valid")
});

/// Adapter options.
#[derive(Debug, Clone, Copy)]
pub struct TelegramOptions {
    /// Detect `@handle` mentions in messages without an entity list.
    pub text_mentions: bool,
}

impl Default for TelegramOptions {
    fn default() -> Self {
        Self {
            text_mentions: true,
        }
    }
}

/// A converted export plus what the adapter could not map.
#[derive(Debug, Clone)]
pub struct TelegramImport {
    pub export: ChatExport,
    pub chat_name: Option<String>,
    /// `@handles` mentioned but absent from the users directory, lowercased.
    pub unresolved_handles: BTreeSet<String>,
}

/// Ids appear as numbers in `users[]` and as prefixed strings elsewhere.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(i64),
}

impl IdValue {
    fn to_participant_id(&self) -> String {
        match self {
            IdValue::Text(s) => s.clone(),
            IdValue::Number(n) => format!("user{n}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawExport {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    messages: Vec<RawMessage>,
    #[serde(default)]
    users: Vec<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: IdValue,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    date_unixtime: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    from_id: Option<IdValue>,
    #[serde(default)]
    actor: Option<String>,
    #[serde(default)]
    actor_id: Option<IdValue>,
    #[serde(default)]
    reply_to_message_id: Option<i64>,
    #[serde(default)]
    text: Option<RawText>,
    #[serde(default)]
    text_entities: Option<Vec<RawEntity>>,
    #[serde(default)]
    reactions: Vec<RawReaction>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawText {
    Plain(String),
    Parts(Vec<RawTextPart>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTextPart {
    Plain(String),
    Entity(RawEntity),
}

#[derive(Debug, Clone, Deserialize)]
struct RawEntity {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    user_id: Option<IdValue>,
}

#[derive(Debug, Deserialize)]
struct RawReaction {
    #[serde(default)]
    recent: Vec<RawReactor>,
}

#[derive(Debug, Deserialize)]
struct RawReactor {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    from_id: Option<IdValue>,
}

impl RawMessage {
    fn is_service(&self) -> bool {
        self.kind.as_deref() == Some("service")
    }

    fn sender(&self) -> (Option<String>, Option<String>) {
        if self.is_service() && self.from_id.is_none() {
            (
                self.actor_id.as_ref().map(IdValue::to_participant_id),
                self.actor.clone(),
            )
        } else {
            (
                self.from_id.as_ref().map(IdValue::to_participant_id),
                self.from.clone(),
            )
        }
    }

    fn timestamp(&self) -> Option<String> {
        let present = |s: &&String| !s.trim().is_empty();
        self.date_unixtime
            .as_ref()
            .filter(present)
            .or_else(|| self.date.as_ref().filter(present))
            .cloned()
    }

    /// Entity list, taken from `text_entities` or the structured `text`.
    fn entities(&self) -> Option<Vec<RawEntity>> {
        if let Some(entities) = &self.text_entities {
            return Some(entities.clone());
        }
        match &self.text {
            Some(RawText::Parts(parts)) => Some(
                parts
                    .iter()
                    .filter_map(|part| match part {
                        RawTextPart::Entity(e) => Some(e.clone()),
                        RawTextPart::Plain(_) => None,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    fn plain_text(&self) -> String {
        match &self.text {
            Some(RawText::Plain(s)) => s.clone(),
            Some(RawText::Parts(parts)) => parts
                .iter()
                .map(|part| match part {
                    RawTextPart::Plain(s) => s.as_str(),
                    RawTextPart::Entity(e) => e.text.as_str(),
                })
                .collect(),
            None => String::new(),
        }
    }
}

/// Load and convert a Telegram export file.
pub fn load_export(path: &Path, options: TelegramOptions) -> Result<TelegramImport> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read export: {}", path.display()))?;
    parse_export(&contents, options)
        .with_context(|| format!("Failed to parse Telegram export: {}", path.display()))
}

/// Convert the JSON text of a Telegram export.
pub fn parse_export(json: &str, options: TelegramOptions) -> Result<TelegramImport> {
    let raw: RawExport = serde_json::from_str(json)?;
    Ok(convert(raw, options))
}

fn convert(raw: RawExport, options: TelegramOptions) -> TelegramImport {
    let mut handles: BTreeMap<String, String> = BTreeMap::new();
    let mut members = Vec::with_capacity(raw.users.len());
    for user in &raw.users {
        let id = user.id.to_participant_id();
        if let Some(username) = &user.username {
            let handle = username.trim_start_matches('@').to_lowercase();
            if !handle.is_empty() {
                handles.insert(handle, id.clone());
            }
        }
        members.push(Member {
            id,
            name: user.name.clone(),
        });
    }

    let mut unresolved_handles = BTreeSet::new();
    let mut entity_names: BTreeMap<String, String> = BTreeMap::new();
    let mut records = Vec::with_capacity(raw.messages.len());

    for message in &raw.messages {
        let (sender_id, sender_name) = message.sender();
        let mut mentions = Vec::new();

        match message.entities() {
            Some(entities) => {
                for entity in &entities {
                    match entity.kind.as_str() {
                        "mention_name" => {
                            if let Some(user_id) = &entity.user_id {
                                let id = user_id.to_participant_id();
                                let label = entity.text.trim().trim_start_matches('@');
                                if !label.is_empty() {
                                    entity_names
                                        .entry(id.clone())
                                        .or_insert_with(|| label.to_string());
                                }
                                mentions.push(id);
                            }
                        }
                        "mention" => {
                            resolve_handle(
                                &entity.text,
                                &handles,
                                &mut mentions,
                                &mut unresolved_handles,
                            );
                        }
                        _ => {}
                    }
                }
            }
            None if options.text_mentions => {
                let text = message.plain_text();
                for caps in HANDLE_RE.captures_iter(&text) {
                    resolve_handle(&caps[1], &handles, &mut mentions, &mut unresolved_handles);
                }
            }
            None => {}
        }

        let reactions = message
            .reactions
            .iter()
            .flat_map(|r| r.recent.iter())
            .filter_map(|reactor| {
                reactor.from_id.as_ref().map(|id| ReactionRecord {
                    reactor_id: id.to_participant_id(),
                    reactor_name: reactor.from.clone(),
                })
            })
            .collect();

        records.push(ExportRecord {
            message_id: message.id,
            sender_id,
            sender_name,
            timestamp: message.timestamp(),
            reply_to: message.reply_to_message_id,
            reactions,
            mentions,
        });
    }

    // Mention labels only name users the directory leaves unnamed.
    for (id, name) in entity_names {
        match members.iter_mut().find(|m| m.id == id) {
            Some(member) => {
                if member.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    member.name = Some(name);
                }
            }
            None => members.push(Member {
                id,
                name: Some(name),
            }),
        }
    }

    if !unresolved_handles.is_empty() {
        debug!("Unresolved handles: {:?}", unresolved_handles);
    }
    info!(
        "Telegram export: {} messages, {} users in directory, {} unresolved handles",
        records.len(),
        raw.users.len(),
        unresolved_handles.len()
    );

    TelegramImport {
        export: ChatExport { records, members },
        chat_name: raw.name,
        unresolved_handles,
    }
}

fn resolve_handle(
    raw: &str,
    handles: &BTreeMap<String, String>,
    mentions: &mut Vec<String>,
    unresolved: &mut BTreeSet<String>,
) {
    let handle = raw.trim().trim_start_matches('@').to_lowercase();
    if handle.is_empty() {
        return;
    }
    match handles.get(&handle) {
        Some(id) => mentions.push(id.clone()),
        None => {
            unresolved.insert(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn import(value: serde_json::Value) -> TelegramImport {
        parse_export(&value.to_string(), TelegramOptions::default()).unwrap()
    }

    #[test]
    fn test_basic_messages() {
        let result = import(json!({
            "name": "Team",
            "messages": [
                {"id": 1, "type": "message", "date": "2024-03-01T09:00:00",
                 "date_unixtime": "1709283600", "from": "Alice", "from_id": "user1", "text": "hi"},
                {"id": 2, "type": "message", "date": "2024-03-01T09:01:00",
                 "from": "Bob", "from_id": "user2", "reply_to_message_id": 1, "text": "hey"}
            ]
        }));

        assert_eq!(result.chat_name.as_deref(), Some("Team"));
        let records = &result.export.records;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sender_id.as_deref(), Some("user1"));
        assert_eq!(records[0].timestamp.as_deref(), Some("1709283600"));
        assert_eq!(records[1].timestamp.as_deref(), Some("2024-03-01T09:01:00"));
        assert_eq!(records[1].reply_to, Some(1));
    }

    #[test]
    fn test_blank_unixtime_falls_back_to_date() {
        let result = import(json!({
            "messages": [
                {"id": 1, "from": "Alice", "from_id": "user1", "text": "a",
                 "date": "2024-03-01T09:00:00", "date_unixtime": ""},
                {"id": 2, "from": "Bob", "from_id": "user2", "text": "b",
                 "date": "2024-03-01T09:01:00", "date_unixtime": "  "},
                {"id": 3, "from": "Carol", "from_id": "user3", "text": "c",
                 "date": "", "date_unixtime": ""}
            ]
        }));
        let records = &result.export.records;
        assert_eq!(records[0].timestamp.as_deref(), Some("2024-03-01T09:00:00"));
        assert_eq!(records[1].timestamp.as_deref(), Some("2024-03-01T09:01:00"));
        assert_eq!(records[2].timestamp, None);
    }

    #[test]
    fn test_service_message_uses_actor() {
        let result = import(json!({
            "messages": [
                {"id": 5, "type": "service", "date": "2024-03-01T09:00:00",
                 "actor": "Carol", "actor_id": "user3", "action": "pin_message"}
            ]
        }));
        let record = &result.export.records[0];
        assert_eq!(record.sender_id.as_deref(), Some("user3"));
        assert_eq!(record.sender_name.as_deref(), Some("Carol"));
    }

    #[test]
    fn test_reactions_from_recent() {
        let result = import(json!({
            "messages": [
                {"id": 1, "from": "Erin", "from_id": "user5", "text": "news",
                 "reactions": [
                    {"type": "emoji", "count": 2, "emoji": "👍",
                     "recent": [{"from": "Dave", "from_id": "user4"}, {"from": "Alice", "from_id": "user1"}]},
                    {"type": "emoji", "count": 1, "emoji": "🔥", "recent": [{"from": "Dave", "from_id": "user4"}]}
                 ]}
            ]
        }));
        let reactors: Vec<&str> = result.export.records[0]
            .reactions
            .iter()
            .map(|r| r.reactor_id.as_str())
            .collect();
        assert_eq!(reactors, vec!["user4", "user1", "user4"]);
    }

    #[test]
    fn test_entity_mentions() {
        let result = import(json!({
            "users": [{"id": 2, "name": "Bob", "username": "bobby"}],
            "messages": [
                {"id": 1, "from": "Alice", "from_id": "user1",
                 "text": ["ping ", {"type": "mention", "text": "@Bobby"}],
                 "text_entities": [
                    {"type": "plain", "text": "ping "},
                    {"type": "mention", "text": "@Bobby"},
                    {"type": "mention_name", "text": "Carol", "user_id": 3},
                    {"type": "mention", "text": "@ghost"}
                 ]}
            ]
        }));

        assert_eq!(result.export.records[0].mentions, vec!["user2", "user3"]);
        assert!(result.unresolved_handles.contains("ghost"));

        let carol = result
            .export
            .members
            .iter()
            .find(|m| m.id == "user3")
            .unwrap();
        assert_eq!(carol.name.as_deref(), Some("Carol"));
    }

    #[test]
    fn test_mention_label_names_directory_user_without_name() {
        let result = import(json!({
            "users": [{"id": 3, "name": null}, {"id": 4, "name": "Dora"}],
            "messages": [
                {"id": 1, "from": "Alice", "from_id": "user1",
                 "text_entities": [
                    {"type": "mention_name", "text": "Carol", "user_id": 3},
                    {"type": "mention_name", "text": "D.", "user_id": 4}
                 ]}
            ]
        }));

        let members = &result.export.members;
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name.as_deref(), Some("Carol"));
        assert_eq!(members[1].name.as_deref(), Some("Dora"));

        let analysis = parley_graph::analyze(&result.export).unwrap();
        assert_eq!(analysis.report.participants.len(), 3);
        assert_eq!(analysis.report.name_of(&"user3".into()), Some("Carol"));
        assert!(analysis
            .report
            .edges
            .iter()
            .any(|e| e.source.as_str() == "user1" && e.target.as_str() == "user3"));
    }

    #[test]
    fn test_plain_text_mentions() {
        let json = json!({
            "users": [{"id": 2, "name": "Bob", "username": "bobby"}],
            "messages": [
                {"id": 1, "from": "Alice", "from_id": "user1", "text": "thanks @bobby, mail me at a@bobby.com"}
            ]
        })
        .to_string();

        let on = parse_export(&json, TelegramOptions::default()).unwrap();
        assert_eq!(on.export.records[0].mentions, vec!["user2"]);

        let off = parse_export(&json, TelegramOptions { text_mentions: false }).unwrap();
        assert!(off.export.records[0].mentions.is_empty());
    }

    #[test]
    fn test_users_become_members() {
        let result = import(json!({
            "users": [{"id": 7, "name": "Grace"}, {"id": "user8", "name": null}],
            "messages": []
        }));
        let members = &result.export.members;
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, "user7");
        assert_eq!(members[0].name.as_deref(), Some("Grace"));
        assert_eq!(members[1].name, None);
    }

    #[test]
    fn test_end_to_end_with_engine() {
        let result = import(json!({
            "messages": [
                {"id": 1, "from": "Alice", "from_id": "user1", "text": "q"},
                {"id": 2, "from": "Bob", "from_id": "user2", "reply_to_message_id": 1, "text": "a"}
            ]
        }));
        let analysis = parley_graph::analyze(&result.export).unwrap();
        assert_eq!(analysis.report.edges.len(), 1);
        assert_eq!(analysis.report.edges[0].strength, 1.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_export(&dir.path().join("result.json"), TelegramOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read export"));
    }
}
