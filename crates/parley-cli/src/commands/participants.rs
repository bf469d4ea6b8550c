use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use console::style;
use parley_graph::{analyze, ParticipantId};
use serde::Serialize;

use crate::config::ParleyConfig;
use crate::ui;

#[derive(Debug, Serialize)]
struct ParticipantRow {
    id: String,
    name: Option<String>,
    known: bool,
    reported: bool,
}

pub fn run(export: &Path, all: bool, json: bool, config: &ParleyConfig) -> Result<()> {
    let import = super::load(export, config)?;
    let analysis = analyze(&import.export)?;

    let reported: BTreeSet<&ParticipantId> =
        analysis.report.participants.iter().map(|p| &p.id).collect();

    let rows: Vec<ParticipantRow> = analysis
        .names
        .participants()
        .filter(|p| all || reported.contains(&p.id))
        .map(|p| ParticipantRow {
            known: p.is_named(),
            reported: reported.contains(&p.id),
            id: p.id.to_string(),
            name: p.display_name,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let title = match &import.chat_name {
        Some(name) => format!("Participants of {name}"),
        None => "Participants".to_string(),
    };
    ui::header(&title);

    if rows.is_empty() {
        println!("  {}", style("Nobody to list.").dim());
        println!();
        return Ok(());
    }

    for row in &rows {
        let name = match &row.name {
            Some(name) => style(name.clone()),
            None => style("(unknown)".to_string()).dim(),
        };
        let marker = if row.reported {
            style("●").green()
        } else {
            style("○").dim()
        };
        println!("  {} {}  {}", marker, name, style(&row.id).dim());
    }
    println!();
    ui::info(&format!(
        "{} listed, {} in the report",
        rows.len(),
        reported.len()
    ));

    Ok(())
}
