//! End-to-end analysis: export → events → observations → graph → metrics → report.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AnalysisError, Result};
use crate::extractor::{ExtractionResult, InteractionExtractor};
use crate::filter::GraphFilter;
use crate::graph::{aggregate, InteractionGraph};
use crate::metrics::{GraphMetrics, MetricsCalculator};
use crate::parser::{ChatExport, NameRegistry, ParseStats, RecordParser};
use crate::report::Report;

/// Counters for degraded input that was absorbed rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub records_total: usize,
    /// Malformed records (missing sender, unparsable timestamp).
    pub records_skipped: usize,
    pub self_references: usize,
    /// Observations dropped because their target could not be resolved.
    pub unresolved_references: usize,
    pub observations: usize,
    pub participants: usize,
    pub nodes_filtered_unknown: usize,
    pub nodes_filtered_isolated: usize,
}

impl Diagnostics {
    pub fn nodes_filtered(&self) -> usize {
        self.nodes_filtered_unknown + self.nodes_filtered_isolated
    }
}

/// Result of one analysis. Every intermediate snapshot stays inspectable.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: Report,
    pub diagnostics: Diagnostics,
    pub names: NameRegistry,
    /// Aggregated graph before filtering.
    pub graph: InteractionGraph,
    /// Metrics of the unfiltered graph.
    pub metrics: GraphMetrics,
    pub parse: ParseStats,
    pub extraction: ExtractionResult,
    pub duration_ms: u64,
}

/// Run the full pipeline on one export.
///
/// Holds no state between calls; concurrent analyses share nothing.
pub fn analyze(export: &ChatExport) -> Result<Analysis> {
    let start = Instant::now();

    let parsed = RecordParser::parse(export);
    if parsed.is_empty() {
        info!(
            "Nothing to analyze: {} records, none usable",
            parsed.stats.records_total
        );
        return Err(AnalysisError::EmptyInput);
    }

    let (observations, extraction) = InteractionExtractor::new().extract(&parsed.events);
    let graph = aggregate(&parsed.names, &observations)?;
    let metrics = MetricsCalculator::compute(&graph);
    let filtered = GraphFilter::apply(&graph, &metrics)?;
    let report = Report::from_graph(&filtered.graph);

    let diagnostics = Diagnostics {
        records_total: parsed.stats.records_total,
        records_skipped: parsed.stats.records_skipped,
        self_references: parsed.stats.self_references,
        unresolved_references: extraction.unresolved,
        observations: extraction.observations,
        participants: parsed.stats.participants,
        nodes_filtered_unknown: filtered.removed_unknown.len(),
        nodes_filtered_isolated: filtered.removed_isolated.len(),
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Analysis complete: {} participants, {} connections reported in {}ms",
        report.participants.len(),
        report.edges.len(),
        duration_ms
    );

    Ok(Analysis {
        report,
        diagnostics,
        names: parsed.names,
        graph,
        metrics,
        parse: parsed.stats,
        extraction,
        duration_ms,
    })
}
