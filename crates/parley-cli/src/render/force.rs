use anyhow::Result;
use parley_graph::Report;
use serde::{Deserialize, Serialize};

/// Node/link document consumed by force-directed layout front-ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceData {
    pub nodes: Vec<ForceNode>,
    pub links: Vec<ForceLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceNode {
    pub id: String,
    pub label: String,
    /// Combined strength of the participant.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceLink {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

pub fn force_data(report: &Report) -> ForceData {
    let nodes = report
        .participants
        .iter()
        .map(|p| ForceNode {
            id: p.id.to_string(),
            label: p.name.clone(),
            weight: report.metrics.get(&p.id).map_or(0.0, |m| m.combined),
        })
        .collect();

    let links = report
        .edges
        .iter()
        .map(|e| ForceLink {
            source: e.source.to_string(),
            target: e.target.to_string(),
            weight: e.strength,
        })
        .collect();

    ForceData { nodes, links }
}

pub fn render_force(report: &Report) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&force_data(report))?;
    out.push('\n');
    Ok(out)
}
