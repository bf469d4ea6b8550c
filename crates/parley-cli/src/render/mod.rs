//! Report renderers.
//!
//! Every renderer reads a [`Report`] and returns text; none of them touch
//! the engine's data.

mod dot;
mod force;
mod json;
mod table;

use anyhow::Result;
use clap::ValueEnum;
use parley_graph::{Diagnostics, Report};
use serde::{Deserialize, Serialize};

pub use dot::render_dot;
pub use force::render_force;
pub use json::render_json;
pub use table::render_table;

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Terminal summary and tables
    #[default]
    Table,
    /// Full report and diagnostics
    Json,
    /// Nodes and links for force-directed layouts
    Force,
    /// Graphviz digraph
    Dot,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Force => "force",
            OutputFormat::Dot => "dot",
        }
    }
}

/// Options shared by the renderers.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub top_edges: usize,
    pub precision: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top_edges: 20,
            precision: 2,
        }
    }
}

/// Render `report` in the requested format.
pub fn render(
    format: OutputFormat,
    report: &Report,
    diagnostics: &Diagnostics,
    options: RenderOptions,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report, diagnostics, options)),
        OutputFormat::Json => render_json(report, diagnostics),
        OutputFormat::Force => render_force(report),
        OutputFormat::Dot => Ok(render_dot(report, options)),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use parley_graph::{analyze, Analysis, ChatExport, ExportRecord, ReactionRecord};

    fn msg(id: i64, sender: &str, name: &str) -> ExportRecord {
        ExportRecord {
            message_id: Some(id),
            sender_id: Some(sender.to_string()),
            sender_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Bob replies to Alice twice, Alice reacts to Bob, "Carol \"C\"" replies to Bob.
    pub fn small_analysis() -> Analysis {
        let export = ChatExport::new(vec![
            msg(1, "user1", "Alice"),
            ExportRecord {
                reply_to: Some(1),
                reactions: vec![ReactionRecord {
                    reactor_id: "user1".into(),
                    reactor_name: Some("Alice".into()),
                }],
                ..msg(2, "user2", "Bob")
            },
            ExportRecord {
                reply_to: Some(1),
                ..msg(3, "user2", "Bob")
            },
            ExportRecord {
                reply_to: Some(2),
                ..msg(4, "user3", "Carol \"C\"")
            },
        ]);
        analyze(&export).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        for format in OutputFormat::value_variants() {
            let parsed = OutputFormat::from_str(format.as_str(), true).unwrap();
            assert_eq!(&parsed, format);
        }
    }

    #[test]
    fn test_every_format_renders() {
        let analysis = fixtures::small_analysis();
        for format in OutputFormat::value_variants() {
            let out = render(
                *format,
                &analysis.report,
                &analysis.diagnostics,
                RenderOptions::default(),
            )
            .unwrap();
            assert!(!out.is_empty(), "{} rendered nothing", format.as_str());
        }
    }
}
