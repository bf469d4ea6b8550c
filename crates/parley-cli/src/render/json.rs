use anyhow::Result;
use parley_graph::{Diagnostics, Report};
use serde::Serialize;

#[derive(Serialize)]
struct JsonOutput<'a> {
    report: &'a Report,
    diagnostics: &'a Diagnostics,
}

/// Full report plus diagnostics, pretty-printed.
pub fn render_json(report: &Report, diagnostics: &Diagnostics) -> Result<String> {
    let mut out = serde_json::to_string_pretty(&JsonOutput {
        report,
        diagnostics,
    })?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::small_analysis;

    #[test]
    fn test_json_shape() {
        let analysis = small_analysis();
        let out = render_json(&analysis.report, &analysis.diagnostics).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["report"]["participants"].as_array().unwrap().len(), 3);
        assert_eq!(value["report"]["edges"][0]["source"], "user2");
        assert_eq!(value["report"]["edges"][0]["strength"], 2.0);
        assert_eq!(value["diagnostics"]["records_total"], 4);
    }

    #[test]
    fn test_json_is_stable() {
        let a = small_analysis();
        let b = small_analysis();
        assert_eq!(
            render_json(&a.report, &a.diagnostics).unwrap(),
            render_json(&b.report, &b.diagnostics).unwrap()
        );
    }
}
