//! Coverage bookkeeping for fuzzing sessions.
//!
//! The instrumentation mechanism that produces line events is out of
//! scope; this module is the passive side of that contract. Probes report
//! "line N of unit U exists" and "line N of unit U was visited" through
//! [`CoverageSink`], and the engine pulls the derived coverage ratio back
//! out between invocations.
//!
//! Line identifiers are abstract probe numbers (`u32 > 0`); nothing here
//! assumes they correspond to physical source lines.

mod tracker;

pub mod formatters;
mod report;

pub use report::{render_console, CoverageSummary, UnitSummary};
pub use tracker::{CoverageContext, CoverageMap, CoverageSink, UnitTracker};
