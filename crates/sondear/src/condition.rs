//! Stopping conditions for a fuzzing session.
//!
//! A condition is started once per session, polled between loop
//! iterations, and notified of domain events (currently the global
//! coverage ratio) whenever the engine makes progress. Conditions never
//! resurrect within a session: once `should_stop` reports true the loop
//! exits.

use std::time::{Duration, Instant};

/// A domain event delivered to stopping conditions.
///
/// The original design accepted untyped events and rejected unexpected
/// shapes at runtime; here the enum makes a malformed event unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FuzzEvent {
    /// The global coverage ratio after an improving invocation.
    CoverageRatio(f64),
}

/// Decides when a fuzzing session ends.
pub trait StoppingCondition {
    /// Called once when the fuzzing loop starts; resets internal state.
    fn start(&mut self);

    /// Pure read of the current state.
    fn should_stop(&self) -> bool;

    /// Called with a domain event whenever the engine makes progress.
    ///
    /// Conditions that do not care about a particular event kind ignore it.
    fn notify(&mut self, event: &FuzzEvent);
}

/// Stops the session once a wall-clock timeout has elapsed.
///
/// Timeout enforcement is cooperative: the engine polls between
/// iterations, so a single invocation that never returns is not preempted.
#[derive(Debug, Clone)]
pub struct TimeoutCondition {
    timeout: Duration,
    started: Instant,
}

impl TimeoutCondition {
    /// Create a condition that fires once `timeout` has elapsed after
    /// `start`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            started: Instant::now(),
        }
    }
}

impl StoppingCondition for TimeoutCondition {
    fn start(&mut self) {
        self.started = Instant::now();
    }

    fn should_stop(&self) -> bool {
        self.started.elapsed() >= self.timeout
    }

    fn notify(&mut self, _event: &FuzzEvent) {
        // Nothing to do here
    }
}

/// Stops the session once the coverage ratio reaches a threshold.
#[derive(Debug, Clone)]
pub struct CoverageCondition {
    threshold: f64,
    current: f64,
}

impl CoverageCondition {
    /// Create a condition that fires at the given coverage ratio.
    ///
    /// # Panics
    ///
    /// Panics unless `threshold` lies in `(0, 1]`; anything else is a
    /// caller contract violation.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        assert!(
            threshold > 0.0 && threshold <= 1.0,
            "coverage threshold must lie in (0, 1], got {threshold}"
        );
        Self {
            threshold,
            current: 0.0,
        }
    }

    /// The coverage ratio most recently delivered via `notify`.
    #[must_use]
    pub fn current_ratio(&self) -> f64 {
        self.current
    }
}

impl Default for CoverageCondition {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl StoppingCondition for CoverageCondition {
    fn start(&mut self) {
        self.current = 0.0;
    }

    fn should_stop(&self) -> bool {
        self.current >= self.threshold
    }

    fn notify(&mut self, event: &FuzzEvent) {
        let FuzzEvent::CoverageRatio(ratio) = event;
        self.current = *ratio;
    }
}

/// Logical OR over child conditions: the first child to finish wins.
pub struct CompositeCondition {
    children: Vec<Box<dyn StoppingCondition>>,
}

impl CompositeCondition {
    /// Combine the given conditions; the session stops as soon as any one
    /// of them reports `should_stop`.
    #[must_use]
    pub fn new(children: Vec<Box<dyn StoppingCondition>>) -> Self {
        Self { children }
    }
}

impl std::fmt::Debug for CompositeCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeCondition")
            .field("children", &self.children.len())
            .finish()
    }
}

impl StoppingCondition for CompositeCondition {
    fn start(&mut self) {
        for child in &mut self.children {
            child.start();
        }
    }

    fn should_stop(&self) -> bool {
        self.children.iter().any(|child| child.should_stop())
    }

    fn notify(&mut self, event: &FuzzEvent) {
        for child in &mut self.children {
            child.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Condition pinned to a fixed answer.
    #[derive(Default)]
    struct StubCondition {
        stop: bool,
    }

    impl StoppingCondition for StubCondition {
        fn start(&mut self) {}

        fn should_stop(&self) -> bool {
            self.stop
        }

        fn notify(&mut self, _event: &FuzzEvent) {}
    }

    mod timeout_tests {
        use super::*;

        #[test]
        fn test_zero_timeout_stops_immediately() {
            let mut condition = TimeoutCondition::new(Duration::ZERO);
            condition.start();
            assert!(condition.should_stop());
        }

        #[test]
        fn test_long_timeout_does_not_stop() {
            let mut condition = TimeoutCondition::new(Duration::from_secs(3600));
            condition.start();
            assert!(!condition.should_stop());
        }

        #[test]
        fn test_notify_is_ignored() {
            let mut condition = TimeoutCondition::new(Duration::from_secs(3600));
            condition.start();
            condition.notify(&FuzzEvent::CoverageRatio(1.0));
            assert!(!condition.should_stop());
        }

        #[test]
        fn test_start_resets_the_clock() {
            let mut condition = TimeoutCondition::new(Duration::from_millis(30));
            std::thread::sleep(Duration::from_millis(40));
            assert!(condition.should_stop());
            condition.start();
            assert!(!condition.should_stop());
        }
    }

    mod coverage_tests {
        use super::*;

        #[test]
        fn test_starts_below_threshold() {
            let condition = CoverageCondition::new(0.5);
            assert!(!condition.should_stop());
            assert_eq!(condition.current_ratio(), 0.0);
        }

        #[test]
        fn test_stops_at_threshold() {
            let mut condition = CoverageCondition::new(0.5);
            condition.start();
            condition.notify(&FuzzEvent::CoverageRatio(0.5));
            assert!(condition.should_stop());
        }

        #[test]
        fn test_notify_overwrites_ratio() {
            let mut condition = CoverageCondition::new(0.9);
            condition.start();
            condition.notify(&FuzzEvent::CoverageRatio(0.95));
            assert!(condition.should_stop());
            // The ratio is overwritten, not accumulated
            condition.notify(&FuzzEvent::CoverageRatio(0.1));
            assert!(!condition.should_stop());
        }

        #[test]
        fn test_start_resets_ratio() {
            let mut condition = CoverageCondition::new(0.5);
            condition.notify(&FuzzEvent::CoverageRatio(1.0));
            condition.start();
            assert!(!condition.should_stop());
        }

        #[test]
        fn test_default_requires_full_coverage() {
            let mut condition = CoverageCondition::default();
            condition.notify(&FuzzEvent::CoverageRatio(0.999));
            assert!(!condition.should_stop());
            condition.notify(&FuzzEvent::CoverageRatio(1.0));
            assert!(condition.should_stop());
        }

        #[test]
        #[should_panic(expected = "coverage threshold must lie in (0, 1]")]
        fn test_zero_threshold_is_rejected() {
            let _ = CoverageCondition::new(0.0);
        }

        #[test]
        #[should_panic(expected = "coverage threshold must lie in (0, 1]")]
        fn test_above_one_threshold_is_rejected() {
            let _ = CoverageCondition::new(1.5);
        }
    }

    mod composite_tests {
        use super::*;

        #[test]
        fn test_stops_when_any_child_stops() {
            let stopped = StubCondition { stop: true };
            let running = StubCondition::default();
            let composite =
                CompositeCondition::new(vec![Box::new(running), Box::new(stopped)]);
            assert!(composite.should_stop());
        }

        #[test]
        fn test_does_not_stop_when_no_child_stops() {
            let composite = CompositeCondition::new(vec![
                Box::new(StubCondition::default()),
                Box::new(StubCondition::default()),
            ]);
            assert!(!composite.should_stop());
        }

        #[test]
        fn test_empty_composite_never_stops() {
            let composite = CompositeCondition::new(Vec::new());
            assert!(!composite.should_stop());
        }

        #[test]
        fn test_broadcasts_reach_every_child_exactly_once() {
            use std::cell::Cell;
            use std::rc::Rc;

            struct CountingCondition {
                starts: Rc<Cell<usize>>,
                notifies: Rc<Cell<usize>>,
            }

            impl StoppingCondition for CountingCondition {
                fn start(&mut self) {
                    self.starts.set(self.starts.get() + 1);
                }

                fn should_stop(&self) -> bool {
                    false
                }

                fn notify(&mut self, _event: &FuzzEvent) {
                    self.notifies.set(self.notifies.get() + 1);
                }
            }

            let counters: Vec<(Rc<Cell<usize>>, Rc<Cell<usize>>)> = (0..3)
                .map(|_| (Rc::new(Cell::new(0)), Rc::new(Cell::new(0))))
                .collect();
            let children: Vec<Box<dyn StoppingCondition>> = counters
                .iter()
                .map(|(starts, notifies)| {
                    Box::new(CountingCondition {
                        starts: Rc::clone(starts),
                        notifies: Rc::clone(notifies),
                    }) as Box<dyn StoppingCondition>
                })
                .collect();

            let mut composite = CompositeCondition::new(children);
            composite.start();
            composite.notify(&FuzzEvent::CoverageRatio(0.25));
            composite.notify(&FuzzEvent::CoverageRatio(0.75));

            for (starts, notifies) in &counters {
                assert_eq!(starts.get(), 1);
                assert_eq!(notifies.get(), 2);
            }
        }

        #[test]
        fn test_timeout_or_coverage() {
            let mut composite = CompositeCondition::new(vec![
                Box::new(TimeoutCondition::new(Duration::from_secs(3600))),
                Box::new(CoverageCondition::new(0.5)),
            ]);
            composite.start();
            assert!(!composite.should_stop());
            composite.notify(&FuzzEvent::CoverageRatio(0.5));
            assert!(composite.should_stop());
        }
    }
}
