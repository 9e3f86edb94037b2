//! HTML coverage report formatter.
//!
//! Renders a single self-contained summary page with one row per unit.

use crate::coverage::{CoverageMap, CoverageSummary};
use std::fmt::Write;

/// HTML summary page generator
#[derive(Debug)]
pub struct HtmlFormatter<'a> {
    map: &'a CoverageMap,
    title: String,
}

impl<'a> HtmlFormatter<'a> {
    /// Create a formatter over a coverage snapshot.
    #[must_use]
    pub fn new(map: &'a CoverageMap) -> Self {
        Self {
            map,
            title: "Fuzzing coverage report".to_string(),
        }
    }

    /// Set the page title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Generate the HTML page as a string.
    #[must_use]
    pub fn generate(&self) -> String {
        let summary = CoverageSummary::from_map(self.map);
        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
        let _ = writeln!(html, "<title>{}</title>", escape(&self.title));
        html.push_str(
            "<style>\n\
             body { font-family: sans-serif; margin: 2em; }\n\
             table { border-collapse: collapse; }\n\
             th, td { border: 1px solid #999; padding: 0.3em 0.8em; text-align: left; }\n\
             .low { background: #fdd; }\n\
             .high { background: #dfd; }\n\
             </style>\n",
        );
        html.push_str("</head>\n<body>\n");
        let _ = writeln!(html, "<h1>{}</h1>", escape(&self.title));
        let _ = writeln!(
            html,
            "<p>{} of {} lines covered ({:.2}%)</p>",
            summary.covered_lines,
            summary.total_lines,
            summary.coverage_ratio * 100.0
        );
        html.push_str("<table>\n<tr><th>Unit</th><th>Lines</th><th>Visited</th><th>Coverage</th></tr>\n");
        for unit in &summary.units {
            let class = if unit.line_coverage >= 0.5 { "high" } else { "low" };
            let _ = writeln!(
                html,
                "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td>{:.2}%</td></tr>",
                escape(&unit.unit),
                unit.total_lines,
                unit.covered_lines,
                unit.line_coverage * 100.0
            );
        }
        html.push_str("</table>\n</body>\n</html>\n");
        html
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
