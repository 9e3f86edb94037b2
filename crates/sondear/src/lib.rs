//! Sondear: Coverage-Guided Fuzzing with Regression-Test Synthesis
//!
//! Sondear (Spanish: "to sound out, to probe") repeatedly synthesizes or
//! mutates inputs, runs them against a program under test, and keeps every
//! candidate that reaches previously-unseen code. Each improving invocation
//! is captured with enough detail to regenerate a standalone regression
//! test as literal source text.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SONDEAR Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Value      │    │ Fuzzing    │    │ Coverage   │            │
//! │   │ Synthesis  │───►│ Engine     │◄──►│ Context    │            │
//! │   │ / Mutation │    │            │    │ (probes)   │            │
//! │   └────────────┘    └─────┬──────┘    └────────────┘            │
//! │                           │ improving invocations               │
//! │                     ┌─────▼──────┐    ┌────────────┐            │
//! │                     │ Result     │───►│ Test       │            │
//! │                     │ Model      │    │ Synthesis  │            │
//! │                     └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine only ever talks to the program under test through the
//! [`introspect`] capability layer, so porting to a different invocation
//! mechanism means swapping that one adapter.

#![warn(missing_docs)]

/// Coverage bookkeeping: per-unit line trackers, the session-owned
/// coverage context, report rendering, and output formatters.
pub mod coverage;

/// The main fuzzing loop: candidate selection, dispatch, coverage-delta
/// detection, and result accumulation.
mod engine;

/// Character-level mutation operator for the raw-string fuzzing mode.
mod mutator;

/// Session stopping conditions (timeout, coverage threshold, composite).
mod condition;

/// Dynamic-invocation capability layer: type descriptors, member
/// descriptors, unit registry, and value plumbing.
pub mod introspect;

/// Immutable records of improving invocations.
mod results;

/// Deterministic pseudo-randomness for reproducible sessions.
mod rng;

/// Type-directed value synthesis and the expression tree that remembers
/// how each value was built.
pub mod synthesis;

/// Translation of captured fuzzing results into test source text.
pub mod testgen;

mod result;

pub use condition::{
    CompositeCondition, CoverageCondition, FuzzEvent, StoppingCondition, TimeoutCondition,
};
pub use coverage::{CoverageContext, CoverageMap, CoverageSink, CoverageSummary, UnitTracker};
pub use engine::FuzzingEngine;
pub use introspect::{
    CapturedFailure, ScalarValue, TargetRegistry, TypeDescriptor, UnitDescriptor,
};
pub use mutator::StringMutator;
pub use result::{SondearError, SondearResult};
pub use results::{FuzzedUnitResult, InvocationOutcome, InvocationResult};
pub use rng::Seed;
pub use synthesis::{Expression, ValueSynthesizer};
pub use testgen::{RenderProfile, TestCaseBuilder, TestFileWriter};
