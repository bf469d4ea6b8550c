//! Parley Graph - interaction graphs from chat exports.
//!
//! This crate turns a chat export into a weighted, directed graph of who
//! interacts with whom, and the metrics needed to render and report it:
//!
//! - **Parser**: raw records → ordered events + latest-name registry
//! - **Extractor**: events → weighted interaction observations
//! - **Graph**: observations → immutable aggregated graph
//! - **Metrics**: node strengths, degrees, centrality, reciprocity, canonical edge order
//! - **Filter**: drops unnamed and isolated participants
//!
//! # Example
//!
//! ```
//! use parley_graph::{analyze, ChatExport, ExportRecord};
//!
//! let export = ChatExport::new(vec![
//!     ExportRecord {
//!         message_id: Some(1),
//!         sender_id: Some("user1".into()),
//!         sender_name: Some("Alice".into()),
//!         ..Default::default()
//!     },
//!     ExportRecord {
//!         message_id: Some(2),
//!         sender_id: Some("user2".into()),
//!         sender_name: Some("Bob".into()),
//!         reply_to: Some(1),
//!         ..Default::default()
//!     },
//! ]);
//!
//! let analysis = analyze(&export).unwrap();
//! assert_eq!(analysis.report.edges[0].strength, 1.0);
//! ```

mod centrality;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod graph;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod schema;

// Re-export commonly used types
pub use error::{AnalysisError, RecordError, Result};
pub use extractor::{
    ExtractionResult, InteractionExtractor, MENTION_WEIGHT, REACTION_WEIGHT, REPLY_WEIGHT,
};
pub use filter::{FilterOutcome, FilterStats, GraphFilter};
pub use graph::{aggregate, GraphBuilder, InteractionGraph};
pub use metrics::{EdgeMetrics, GraphMetrics, GraphSummary, MetricsCalculator, NodeMetrics};
pub use parser::{
    parse_timestamp, ChatExport, ExportRecord, Member, NameRegistry, ParseStats, ParsedExport,
    ReactionRecord, RecordParser,
};
pub use pipeline::{analyze, Analysis, Diagnostics};
pub use report::{Report, ReportParticipant};
pub use schema::{
    Edge, Event, EventKind, InteractionKind, InteractionObservation, KindCounts, Participant,
    ParticipantId,
};
