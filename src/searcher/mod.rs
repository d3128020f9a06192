//! A generic driver shared by `ForwardSearcher` and `BranchSearcher` (§4.1): the two
//! components have an identical contract, differing only in which population of states
//! they hold (ordinary vs. isolated) and, optionally, which [`SelectionPolicy`] drives
//! them. Rather than writing the same bookkeeping twice, both are the same [`Searcher`]
//! type under a different name, exactly as the teacher crate gives `ForwardReachability`
//! and `BackwardReachability` the same `ReachabilityComputation<STEP>` engine under two
//! type aliases.

pub mod policy;

use indexmap::IndexSet;
use log::{debug, trace};

use crate::interpreter::Interpreter;
pub use policy::{Bfs, Dfs, Guided, SelectionPolicy};

/// A `ForwardSearcher` or `BranchSearcher`, depending only on which states it is fed.
pub struct Searcher<I: Interpreter, P> {
    policy: P,
    live: IndexSet<I::State>,
    reached: IndexSet<I::State>,
}

impl<I: Interpreter, P: SelectionPolicy<I>> Searcher<I, P> {
    pub fn new(policy: P) -> Self {
        Searcher {
            policy,
            live: IndexSet::new(),
            reached: IndexSet::new(),
        }
    }

    /// Requires `!self.empty()`.
    pub fn select_state(&self, interpreter: &I) -> I::State {
        assert!(
            !self.live.is_empty(),
            "selectState on an empty searcher is a precondition violation"
        );
        self.policy.select(interpreter, &self.live)
    }

    pub fn empty(&self) -> bool {
        self.live.is_empty()
    }

    /// `current` is the state just stepped (absent on first call); `added` are new states
    /// spawned while stepping; `removed` are states the interpreter is about to destroy.
    pub fn update(
        &mut self,
        interpreter: &I,
        current: Option<I::State>,
        added: &[I::State],
        removed: &[I::State],
    ) {
        for &state in removed {
            self.live.shift_remove(&state);
            self.reached.shift_remove(&state);
        }
        if let Some(state) = current {
            if !removed.contains(&state) {
                debug_assert!(
                    self.live.contains(&state),
                    "ForwardResult.current not known to this searcher is an interpreter misclassification"
                );
                self.check_reached(interpreter, state);
            }
        }
        for &state in added {
            self.live.insert(state);
            self.check_reached(interpreter, state);
        }
        trace!("searcher now tracking {} live state(s)", self.live.len());
    }

    /// A state "reaches a sink" when it sits at one of its own `targets` — the location
    /// the coordinator (via `SearcherConfig`, the retarget rule, or an `Initialize` action)
    /// flagged as worth aiming at for this state.
    fn check_reached(&mut self, interpreter: &I, state: I::State) {
        let current = interpreter.current_location(state);
        if interpreter.targets(state).contains(&current) {
            debug!("state {state:?} reached a flagged sink at {current:?}");
            self.reached.insert(state);
        }
    }

    /// Drain the set of states that, since the last drain, touched a location flagged as a
    /// sink.
    pub fn collect_and_clear_reached(&mut self) -> Vec<I::State> {
        self.reached.drain(..).collect()
    }
}
