use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parley_graph::analyze;
use tracing::debug;

use crate::config::ParleyConfig;
use crate::render::{self, OutputFormat, RenderOptions};
use crate::ui;

pub struct AnalyzeArgs {
    pub export: PathBuf,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub top: Option<usize>,
}

pub fn run(args: AnalyzeArgs, config: &ParleyConfig) -> Result<()> {
    let import = super::load(&args.export, config)?;
    let analysis = analyze(&import.export)?;

    let format = args.format.unwrap_or(config.output.format);
    let options = RenderOptions {
        top_edges: args.top.unwrap_or(config.output.top_edges),
        precision: config.output.precision,
    };
    debug!(
        "Rendering {} with top={} precision={}",
        format.as_str(),
        options.top_edges,
        options.precision
    );

    if args.output.is_some() {
        console::set_colors_enabled(false);
    }
    let rendered = render::render(format, &analysis.report, &analysis.diagnostics, options)?;

    match &args.output {
        Some(path) => {
            write_output(path, &rendered)?;
            ui::success(&format!(
                "Wrote {} report for {} participants to {}",
                format.as_str(),
                analysis.report.participants.len(),
                path.display()
            ));
        }
        None => print!("{rendered}"),
    }

    if !import.unresolved_handles.is_empty() {
        ui::info(&format!(
            "{} @handles did not match any user in the export",
            import.unresolved_handles.len()
        ));
    }

    Ok(())
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write output: {}", path.display()))
}
