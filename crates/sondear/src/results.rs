//! Immutable records of improving invocations.
//!
//! One [`InvocationResult`] is retained per invocation that strictly
//! increased coverage; at the end of a session they are packaged into one
//! [`FuzzedUnitResult`] per fuzzed unit. Records are never mutated after
//! construction.

use crate::introspect::{CapturedFailure, ScalarValue, TypeDescriptor};

/// What an invocation produced: either a value (possibly absent) or a
/// captured failure.
#[derive(Debug, Clone, PartialEq, Hash)]
pub enum InvocationOutcome {
    /// The member returned normally; `None` means it produced no value.
    Value(Option<ScalarValue>),
    /// The member raised a failure, captured structurally.
    Failure(CapturedFailure),
}

impl InvocationOutcome {
    /// True when the invocation raised a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// The captured failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&CapturedFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            Self::Value(_) => None,
        }
    }

    /// The produced value, if one was captured.
    #[must_use]
    pub fn value(&self) -> Option<&ScalarValue> {
        match self {
            Self::Value(value) => value.as_ref(),
            Self::Failure(_) => None,
        }
    }
}

/// The captured record of one coverage-improving invocation.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct InvocationResult {
    method_name: String,
    parameter_literals: Vec<String>,
    parameter_types: Vec<TypeDescriptor>,
    receiver_literal: String,
    outcome: InvocationOutcome,
    is_static: bool,
    is_private: bool,
    return_type: TypeDescriptor,
}

impl InvocationResult {
    /// Create a record. `receiver_literal` is empty for static members.
    #[must_use]
    pub fn new(
        method_name: impl Into<String>,
        parameter_literals: Vec<String>,
        parameter_types: Vec<TypeDescriptor>,
        receiver_literal: impl Into<String>,
        outcome: InvocationOutcome,
        is_static: bool,
        is_private: bool,
        return_type: TypeDescriptor,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            parameter_literals,
            parameter_types,
            receiver_literal: receiver_literal.into(),
            outcome,
            is_static,
            is_private,
            return_type,
        }
    }

    /// Name of the invoked member.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Literal source text of each argument, in parameter order.
    #[must_use]
    pub fn parameter_literals(&self) -> &[String] {
        &self.parameter_literals
    }

    /// Declared parameter types, in order.
    #[must_use]
    pub fn parameter_types(&self) -> &[TypeDescriptor] {
        &self.parameter_types
    }

    /// Literal source text reconstructing the receiver; empty for static
    /// members.
    #[must_use]
    pub fn receiver_literal(&self) -> &str {
        &self.receiver_literal
    }

    /// What the invocation produced.
    #[must_use]
    pub fn outcome(&self) -> &InvocationOutcome {
        &self.outcome
    }

    /// True for members invoked without a receiver.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// True for members that required a visibility override.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.is_private
    }

    /// True when the invocation raised and the generated test should
    /// assert on the failure.
    #[must_use]
    pub fn exception_expected(&self) -> bool {
        self.outcome.is_failure()
    }

    /// Declared return type of the member.
    #[must_use]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }
}

/// All retained results of fuzzing one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzedUnitResult {
    namespace: String,
    name: String,
    results: Vec<InvocationResult>,
}

impl FuzzedUnitResult {
    /// Package the retained results of one session.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        results: Vec<InvocationResult>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            results,
        }
    }

    /// The fuzzed unit's namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The fuzzed unit's simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `namespace::Name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }

    /// Retained invocation records, in the order they improved coverage.
    #[must_use]
    pub fn results(&self) -> &[InvocationResult] {
        &self.results
    }
}
