use std::fmt::Write;

use parley_graph::Report;

use super::RenderOptions;

const BASE_PENWIDTH: f64 = 1.0;
const PENWIDTH_PER_STRENGTH: f64 = 2.0;

/// Graphviz digraph. Pen width grows linearly with edge strength.
pub fn render_dot(report: &Report, options: RenderOptions) -> String {
    let mut out = String::from("digraph parley {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=ellipse];\n");

    for p in &report.participants {
        let _ = writeln!(
            out,
            "  \"{}\" [label=\"{}\"];",
            escape(p.id.as_str()),
            escape(&p.name)
        );
    }

    for e in &report.edges {
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [label=\"{:.prec$}\", penwidth={:.2}];",
            escape(e.source.as_str()),
            escape(e.target.as_str()),
            e.strength,
            penwidth(e.strength),
            prec = options.precision
        );
    }

    out.push_str("}\n");
    out
}

pub(crate) fn penwidth(strength: f64) -> f64 {
    BASE_PENWIDTH + PENWIDTH_PER_STRENGTH * strength
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}
