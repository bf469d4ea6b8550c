use std::fmt::Write;

use console::{pad_str, style, Alignment};
use parley_graph::{Diagnostics, Report};

use super::RenderOptions;

const NAME_WIDTH: usize = 24;
const NUM_WIDTH: usize = 9;

/// Terminal summary: graph totals, participants by rank, strongest connections.
pub fn render_table(report: &Report, diagnostics: &Diagnostics, options: RenderOptions) -> String {
    let mut out = String::new();
    let prec = options.precision;
    let summary = &report.summary;

    let _ = writeln!(out, "{}", style("Interaction graph").bold());
    let _ = writeln!(
        out,
        "  {} participants, {} connections, {} components, {} reciprocal pairs, diameter {}",
        summary.nodes,
        summary.edges,
        summary.components,
        summary.reciprocal_pairs,
        summary.diameter
    );
    let _ = writeln!(
        out,
        "  total strength {:.prec$}, average degree {:.2}, density {:.3}",
        summary.total_strength, summary.average_degree, summary.density
    );

    if report.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", style("No named participants interacted.").dim());
    } else {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", style("Participants").bold());
        let _ = writeln!(
            out,
            "  {:>4}  {}  {}  {}  {}  {}  {}  {}  {}",
            style("#").dim(),
            style(cell("Name", NAME_WIDTH, Alignment::Left)).dim(),
            style(cell("Out", NUM_WIDTH, Alignment::Right)).dim(),
            style(cell("In", NUM_WIDTH, Alignment::Right)).dim(),
            style(cell("Total", NUM_WIDTH, Alignment::Right)).dim(),
            style(cell("Degree", NUM_WIDTH, Alignment::Right)).dim(),
            style(cell("Between", NUM_WIDTH, Alignment::Right)).dim(),
            style(cell("Close", NUM_WIDTH, Alignment::Right)).dim(),
            style(cell("PageRank", NUM_WIDTH, Alignment::Right)).dim(),
        );
        for p in &report.participants {
            let Some(m) = report.metrics.get(&p.id) else {
                continue;
            };
            let _ = writeln!(
                out,
                "  {:>4}  {}  {}  {}  {}  {}  {}  {}  {}",
                m.rank,
                cell(&p.name, NAME_WIDTH, Alignment::Left),
                cell(&format!("{:.prec$}", m.outgoing), NUM_WIDTH, Alignment::Right),
                cell(&format!("{:.prec$}", m.incoming), NUM_WIDTH, Alignment::Right),
                cell(&format!("{:.prec$}", m.combined), NUM_WIDTH, Alignment::Right),
                cell(&m.degree.to_string(), NUM_WIDTH, Alignment::Right),
                cell(&format!("{:.3}", m.betweenness), NUM_WIDTH, Alignment::Right),
                cell(&format!("{:.3}", m.closeness), NUM_WIDTH, Alignment::Right),
                cell(&format!("{:.3}", m.pagerank), NUM_WIDTH, Alignment::Right),
            );
        }

        let top = report.top_edges(options.top_edges);
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} {}",
            style("Strongest connections").bold(),
            style(format!("(top {} of {})", top.len(), report.edges.len())).dim()
        );
        for e in top {
            let source = report.name_of(&e.source).unwrap_or(e.source.as_str());
            let target = report.name_of(&e.target).unwrap_or(e.target.as_str());
            let marker = if e.reciprocal { "⇄" } else { "→" };
            let _ = writeln!(
                out,
                "  {} {} {}  {}  {}",
                cell(source, NAME_WIDTH, Alignment::Right),
                style(marker).cyan(),
                cell(target, NAME_WIDTH, Alignment::Left),
                cell(&format!("{:.prec$}", e.strength), NUM_WIDTH, Alignment::Right),
                style(format!(
                    "{} replies, {} mentions, {} reactions",
                    e.counts.reply, e.counts.mention, e.counts.reaction
                ))
                .dim(),
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", style("Diagnostics").bold());
    let _ = writeln!(
        out,
        "  {} records, {} skipped, {} self references, {} unresolved references",
        diagnostics.records_total,
        diagnostics.records_skipped,
        diagnostics.self_references,
        diagnostics.unresolved_references
    );
    let _ = writeln!(
        out,
        "  {} observations, {} participants seen, {} filtered ({} unnamed, {} isolated)",
        diagnostics.observations,
        diagnostics.participants,
        diagnostics.nodes_filtered(),
        diagnostics.nodes_filtered_unknown,
        diagnostics.nodes_filtered_isolated
    );

    out
}

fn cell(text: &str, width: usize, align: Alignment) -> String {
    pad_str(text, width, align, Some("…")).into_owned()
}
