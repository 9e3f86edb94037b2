//! Per-unit line trackers and the session-owned coverage context.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

/// Receives line events from the instrumentation side.
///
/// Both operations treat a zero line number or an empty unit identifier as
/// a caller contract violation and panic; a probe that reports garbage is
/// a bug in the instrumentation, not fuzzing signal.
pub trait CoverageSink {
    /// Register that a line exists in the given unit. Idempotent.
    fn declare_line(&self, unit: &str, line: u32);

    /// Register one visitation of a line in the given unit.
    fn record_visit(&self, unit: &str, line: u32);
}

/// Lines known and lines visited for a single compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitTracker {
    lines: BTreeSet<u32>,
    visits: BTreeMap<u32, u64>,
}

impl UnitTracker {
    /// All lines declared to exist in this unit.
    #[must_use]
    pub fn lines(&self) -> &BTreeSet<u32> {
        &self.lines
    }

    /// Visit counts per line.
    ///
    /// A visited line is not required to have been declared first; totals
    /// and covered counts are therefore computed independently.
    #[must_use]
    pub fn visits(&self) -> &BTreeMap<u32, u64> {
        &self.visits
    }

    fn track_line(&mut self, line: u32) {
        self.lines.insert(line);
    }

    fn visit_line(&mut self, line: u32) {
        *self.visits.entry(line).or_insert(0) += 1;
    }

    /// Fold another tracker into this one: visit counts are summed, line
    /// sets are unioned. Commutative and associative.
    pub fn merge(&mut self, other: &UnitTracker) {
        for (line, count) in &other.visits {
            *self.visits.entry(*line).or_insert(0) += count;
        }
        self.lines.extend(other.lines.iter().copied());
    }
}

/// Registry mapping unit identifiers to their line trackers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageMap {
    units: BTreeMap<String, UnitTracker>,
}

impl CoverageMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn validate(unit: &str, line: u32) {
        assert!(
            !unit.is_empty() && line > 0,
            "invalid probe: unit must be non-empty and line must be positive \
             (unit: {unit:?}, line: {line})"
        );
    }

    /// Register that `line` exists in `unit`.
    ///
    /// # Panics
    ///
    /// Panics if `unit` is empty or `line` is zero.
    pub fn declare_line(&mut self, unit: &str, line: u32) {
        Self::validate(unit, line);
        self.units.entry(unit.to_string()).or_default().track_line(line);
    }

    /// Register one visitation of `line` in `unit`, creating the unit's
    /// tracker on first use.
    ///
    /// # Panics
    ///
    /// Panics if `unit` is empty or `line` is zero.
    pub fn record_visit(&mut self, unit: &str, line: u32) {
        Self::validate(unit, line);
        self.units.entry(unit.to_string()).or_default().visit_line(line);
    }

    /// Per-unit trackers, ordered by unit identifier.
    #[must_use]
    pub fn units(&self) -> &BTreeMap<String, UnitTracker> {
        &self.units
    }

    /// Total number of declared lines across all units.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.units.values().map(|tracker| tracker.lines.len()).sum()
    }

    /// Number of distinct visited lines across all units.
    #[must_use]
    pub fn covered_lines(&self) -> usize {
        self.units.values().map(|tracker| tracker.visits.len()).sum()
    }

    /// Covered lines over total lines; `0` when nothing has been declared,
    /// never NaN.
    #[must_use]
    pub fn coverage_ratio(&self) -> f64 {
        let total = self.total_lines();
        if total == 0 {
            return 0.0;
        }
        self.covered_lines() as f64 / total as f64
    }

    /// Fold another map into this one, unit by unit.
    pub fn merge(&mut self, other: &CoverageMap) {
        for (unit, tracker) in &other.units {
            self.units.entry(unit.clone()).or_default().merge(tracker);
        }
    }
}

/// Session-owned handle to the shared coverage state.
///
/// One context is created per fuzzing session and handed by clone to the
/// coverage sink, the engine, and any instrumented target. There is no
/// process-wide registry; tearing the session down drops the state with
/// it. Interior locking makes the handle safe to call repeatedly from the
/// invocation thread; during fuzzing there is a single writer by
/// construction.
#[derive(Debug, Clone, Default)]
pub struct CoverageContext {
    inner: Arc<Mutex<CoverageMap>>,
}

impl CoverageContext {
    /// Create a fresh context with no units tracked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CoverageMap> {
        // A poisoned lock means a probe panicked mid-update; the map is
        // line counters only, so it stays usable.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Current coverage ratio; `0` when nothing has been declared.
    #[must_use]
    pub fn coverage_ratio(&self) -> f64 {
        self.lock().coverage_ratio()
    }

    /// Total number of declared lines across all units.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.lock().total_lines()
    }

    /// Number of distinct visited lines across all units.
    #[must_use]
    pub fn covered_lines(&self) -> usize {
        self.lock().covered_lines()
    }

    /// Immutable copy of the current state, for diffing and report
    /// rendering.
    #[must_use]
    pub fn snapshot(&self) -> CoverageMap {
        self.lock().clone()
    }

    /// Fold an independently populated map into this context.
    pub fn absorb(&self, other: &CoverageMap) {
        self.lock().merge(other);
    }

    /// Drop all tracked state. Test isolation only; production sessions
    /// create a fresh context instead.
    pub fn reset(&self) {
        *self.lock() = CoverageMap::new();
    }
}

impl CoverageSink for CoverageContext {
    fn declare_line(&self, unit: &str, line: u32) {
        self.lock().declare_line(unit, line);
    }

    fn record_visit(&self, unit: &str, line: u32) {
        self.lock().record_visit(unit, line);
    }
}
