//! Coverage summaries and console rendering.

use super::CoverageMap;
use serde::Serialize;
use std::fmt::Write;

/// Summary of one unit's coverage.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnitSummary {
    /// Unit identifier (namespace + simple name).
    pub unit: String,
    /// Number of declared lines.
    pub total_lines: usize,
    /// Number of distinct visited lines.
    pub covered_lines: usize,
    /// Covered over total for this unit; `0` when nothing was declared.
    pub line_coverage: f64,
}

/// Serializable summary of a whole coverage map.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoverageSummary {
    /// Per-unit summaries, ordered by unit identifier.
    pub units: Vec<UnitSummary>,
    /// Total declared lines across all units.
    pub total_lines: usize,
    /// Distinct visited lines across all units.
    pub covered_lines: usize,
    /// Global coverage ratio; `0` when nothing was declared.
    pub coverage_ratio: f64,
}

impl CoverageSummary {
    /// Summarize a coverage map.
    #[must_use]
    pub fn from_map(map: &CoverageMap) -> Self {
        let units = map
            .units()
            .iter()
            .map(|(unit, tracker)| {
                let total = tracker.lines().len();
                let covered = tracker.visits().len();
                UnitSummary {
                    unit: unit.clone(),
                    total_lines: total,
                    covered_lines: covered,
                    line_coverage: if total == 0 {
                        0.0
                    } else {
                        covered as f64 / total as f64
                    },
                }
            })
            .collect();
        Self {
            units,
            total_lines: map.total_lines(),
            covered_lines: map.covered_lines(),
            coverage_ratio: map.coverage_ratio(),
        }
    }
}

/// Render the per-unit visit table the way the session prints it to the
/// console at the end of a run.
#[must_use]
pub fn render_console(map: &CoverageMap) -> String {
    let mut out = String::new();
    for (unit, tracker) in map.units() {
        let total = tracker.lines().len();
        let covered = tracker.visits().len();
        let percent = if total == 0 {
            0.0
        } else {
            covered as f64 / total as f64 * 100.0
        };

        let _ = writeln!(out, "Coverage data for unit: {unit}");
        for (line, times) in tracker.visits() {
            let _ = writeln!(out, "    line {line} visited {times} times");
        }
        let _ = writeln!(out, "    number of lines {total}");
        let _ = writeln!(out, "    line coverage {percent:.2}% ({covered}/{total})");
    }
    out
}
