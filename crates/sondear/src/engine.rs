//! The coverage-guided fuzzing loop.
//!
//! One engine drives one session: it proposes candidates, dispatches them
//! against the program under test, and compares the coverage ratio before
//! and after every invocation. Everything (the loop, the invocation, and
//! the coverage probes) runs inline on one thread, so the ratio observed
//! after an invocation reflects exactly that invocation's contribution.
//! Timeouts are enforced by polling between iterations; an invocation
//! that never returns is not preempted.

use crate::condition::{FuzzEvent, StoppingCondition};
use crate::coverage::CoverageContext;
use crate::introspect::{
    DynValue, InvokeError, MemberDescriptor, ScalarValue, TypeDescriptor, UnitDescriptor,
};
use crate::mutator::StringMutator;
use crate::results::{FuzzedUnitResult, InvocationOutcome, InvocationResult};
use crate::rng::{Seed, Xorshift64};
use crate::synthesis::ValueSynthesizer;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

const MAX_MUTATIONS: usize = 20;

/// The main fuzzing loop.
pub struct FuzzingEngine {
    stopping: Box<dyn StoppingCondition>,
    coverage: CoverageContext,
    synthesizer: ValueSynthesizer,
    mutator: StringMutator,
    rng: Xorshift64,
    current_coverage: f64,
    corpus: Vec<String>,
    unit_result: Option<FuzzedUnitResult>,
}

impl FuzzingEngine {
    /// Create an engine over the given stopping condition and coverage
    /// context. All randomness derives from `seed`.
    #[must_use]
    pub fn new(
        stopping: Box<dyn StoppingCondition>,
        coverage: CoverageContext,
        seed: Seed,
    ) -> Self {
        // Split the session seed into independent streams so synthesis
        // and mutation draws do not interleave with candidate selection.
        let mut rng = Xorshift64::new(seed);
        let synthesizer = ValueSynthesizer::new(Seed::from_u64(rng.next()));
        let mutator = StringMutator::new(MAX_MUTATIONS, Seed::from_u64(rng.next()));

        Self {
            stopping,
            coverage,
            synthesizer,
            mutator,
            rng,
            current_coverage: 0.0,
            corpus: Vec::new(),
            unit_result: None,
        }
    }

    /// The coverage ratio reached so far in this session.
    #[must_use]
    pub fn current_coverage(&self) -> f64 {
        self.current_coverage
    }

    /// The inputs that increased coverage in raw-string mode, in the
    /// order they were found.
    #[must_use]
    pub fn covering_inputs(&self) -> &[String] {
        &self.corpus
    }

    /// The packaged result of the last unit-fuzzing session, if one ran.
    #[must_use]
    pub fn unit_result(&self) -> Option<&FuzzedUnitResult> {
        self.unit_result.as_ref()
    }

    /// Take ownership of the last unit-fuzzing result.
    pub fn take_unit_result(&mut self) -> Option<FuzzedUnitResult> {
        self.unit_result.take()
    }

    /// Raw-string mode: feed synthesized and mutated strings to a fixed
    /// entry point until the stopping condition fires.
    ///
    /// A panic raised by the entry point is evidence, not an engine
    /// error; it is swallowed and the coverage delta decides whether the
    /// candidate is kept.
    pub fn fuzz_raw<F: FnMut(&str)>(&mut self, mut put: F) {
        debug!("started fuzzing loop");
        self.stopping.start();

        while !self.stopping.should_stop() {
            let candidate = self.choose_candidate();

            let _ = catch_unwind(AssertUnwindSafe(|| put(&candidate)));

            let new_coverage = self.coverage.coverage_ratio();
            if new_coverage > self.current_coverage {
                self.current_coverage = new_coverage;
                if !self.corpus.contains(&candidate) {
                    self.corpus.push(candidate);
                }
                self.stopping.notify(&FuzzEvent::CoverageRatio(new_coverage));
                debug!("found covering input, new coverage: {new_coverage:.4}");
            }
        }
        debug!("stopped, total coverage: {:.4}", self.current_coverage);
    }

    /// Unit-fuzzing mode: pick members of the target unit at random,
    /// synthesize receivers and arguments, force-invoke, and retain every
    /// invocation that strictly increases coverage.
    pub fn fuzz_unit(&mut self, unit: &UnitDescriptor) {
        debug!(unit = %unit.qualified_name(), "started fuzzing loop");
        self.stopping.start();

        let members = unit.invocable_members();
        let mut retained = Vec::new();

        if members.is_empty() {
            warn!(
                unit = %unit.qualified_name(),
                "unit has no invocable members, ending session"
            );
        } else {
            while !self.stopping.should_stop() {
                let member = members[self.rng.next_index(members.len())];
                if let Some(result) = self.execute_member(unit, member) {
                    retained.push(result);
                    self.stopping
                        .notify(&FuzzEvent::CoverageRatio(self.current_coverage));
                    debug!(
                        "found covering invocation, new coverage: {:.4}",
                        self.current_coverage
                    );
                }
            }
        }

        self.unit_result = Some(FuzzedUnitResult::new(
            unit.namespace(),
            unit.name(),
            retained,
        ));
        debug!("stopped, total coverage: {:.4}", self.current_coverage);
    }

    /// Execute one member with synthesized inputs and analyze the
    /// coverage delta. Returns a record only on strict improvement.
    fn execute_member(
        &mut self,
        unit: &UnitDescriptor,
        member: &MemberDescriptor,
    ) -> Option<InvocationResult> {
        // Literal lookups below only ever query values synthesized in
        // this iteration, so identities cannot alias across iterations.
        self.synthesizer.clear_memo();

        let mut receiver: Option<DynValue> = None;
        if !member.is_static() {
            receiver = self.synthesizer.instantiate(unit.receiver_type());
            if receiver.is_none() {
                warn!(
                    member = member.name(),
                    "could not construct a receiver, skipping iteration"
                );
                return None;
            }
        }

        let args: Vec<Option<DynValue>> = member
            .params()
            .iter()
            .map(|param| self.synthesizer.synthesize(param))
            .collect();

        let outcome = match member.invoke_forced(receiver.as_deref_mut(), &args) {
            Ok(produced) => InvocationOutcome::Value(Self::capture_value(
                produced.as_deref(),
                member.return_type(),
            )),
            Err(InvokeError::Access { member: name, reason }) => {
                warn!(member = %name, %reason, "member not accessible, skipping iteration");
                return None;
            }
            Err(InvokeError::Target(failure)) => InvocationOutcome::Failure(failure),
        };

        let parameter_literals: Vec<String> = args
            .iter()
            .map(|argument| match argument {
                Some(v) => self
                    .synthesizer
                    .lookup_literal(&**v)
                    .unwrap_or("None")
                    .to_string(),
                None => "None".to_string(),
            })
            .collect();
        let receiver_literal = receiver
            .as_ref()
            .and_then(|r| self.synthesizer.lookup_literal(&**r))
            .unwrap_or_default()
            .to_string();

        let new_coverage = self.coverage.coverage_ratio();
        if new_coverage > self.current_coverage {
            self.current_coverage = new_coverage;
            Some(InvocationResult::new(
                member.name(),
                parameter_literals,
                member.params().to_vec(),
                receiver_literal,
                outcome,
                member.is_static(),
                member.is_private(),
                member.return_type().clone(),
            ))
        } else {
            None
        }
    }

    fn capture_value(
        produced: Option<&dyn Any>,
        return_type: &TypeDescriptor,
    ) -> Option<ScalarValue> {
        let produced = produced?;
        Some(
            ScalarValue::from_any(produced)
                .unwrap_or_else(|| ScalarValue::Opaque(return_type.name().to_string())),
        )
    }

    /// Choose the next raw-mode candidate: a fresh synthesis with
    /// probability `1 / 2^|corpus|`, otherwise a mutation of a uniformly
    /// chosen corpus member. An empty corpus always synthesizes fresh.
    fn choose_candidate(&mut self) -> String {
        if self.corpus.is_empty() {
            return self.synthesizer.synthesize_string();
        }
        let threshold = 1.0 / 2f64.powi(self.corpus.len() as i32);
        if self.rng.next_f64() < threshold {
            self.synthesizer.synthesize_string()
        } else {
            let pick = self.rng.next_index(self.corpus.len());
            let chosen = self.corpus[pick].clone();
            self.mutator.mutate(&chosen)
        }
    }
}

impl std::fmt::Debug for FuzzingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzingEngine")
            .field("current_coverage", &self.current_coverage)
            .field("corpus", &self.corpus.len())
            .finish_non_exhaustive()
    }
}
