//! The backward searcher (§4.3): maintains the open proof obligations and pairs each with
//! a candidate isolated state (one that reached a sink), producing `Backward` steps.

use std::collections::HashSet;

use indexmap::IndexSet;
use log::debug;

use crate::interpreter::Interpreter;
use crate::proof_obligation::{PobId, ProofObligationForest};

pub struct BackwardSearcher<I: Interpreter> {
    pobs: IndexSet<PobId>,
    branch_states: IndexSet<I::State>,
    tried: HashSet<(PobId, I::State)>,
}

impl<I: Interpreter> Default for BackwardSearcher<I> {
    fn default() -> Self {
        BackwardSearcher {
            pobs: IndexSet::new(),
            branch_states: IndexSet::new(),
            tried: HashSet::new(),
        }
    }
}

impl<I: Interpreter> BackwardSearcher<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pob` as an open goal.
    pub fn add_pob(&mut self, pob: PobId) {
        self.pobs.insert(pob);
    }

    /// Record a newly produced child proof obligation (§4.3's `update`; functionally the
    /// same registration `add_pob` performs, kept as a distinct name because the source
    /// system calls it at a different call site: when a `Backward` step spawns a child).
    pub fn update(&mut self, new_pob: PobId) {
        self.add_pob(new_pob);
    }

    /// Unregister `pob`. In-flight pairings referencing it become stale (O3) and are
    /// filtered out of `tried` so a future re-registration of the same [`PobId`] (which
    /// cannot happen with an arena, but would with raw pointers) starts fresh.
    pub fn remove_pob(&mut self, pob: PobId) {
        self.pobs.shift_remove(&pob);
        self.tried.retain(|&(p, _)| p != pob);
    }

    /// Record `state` — an isolated state whose endpoint reached a sink — as raw material
    /// for future backward steps.
    pub fn add_branch(&mut self, state: I::State) {
        self.branch_states.insert(state);
    }

    /// True iff no fresh `(pob, state)` pair remains.
    pub fn empty(&self, interpreter: &I, forest: &ProofObligationForest<I::Location, I::State>) -> bool {
        self.next_pair(interpreter, forest).is_none()
    }

    /// Requires `!self.empty(..)`. Returns a pairing to try and marks it as tried so it is
    /// never offered again within this analysis, regardless of whether the caller's
    /// subsequent `Backward` action makes progress.
    pub fn select_action(
        &mut self,
        interpreter: &I,
        forest: &ProofObligationForest<I::Location, I::State>,
    ) -> (PobId, I::State) {
        let pair = self
            .next_pair(interpreter, forest)
            .expect("selectAction on empty BackwardSearcher is a precondition violation");
        self.tried.insert(pair);
        debug!("backward pairing selected: {:?}", pair);
        pair
    }

    /// FIFO over the (PO, state) cross-product, skipping already-tried pairs and pairs
    /// whose state's initial location is blocked against that PO.
    fn next_pair(
        &self,
        interpreter: &I,
        forest: &ProofObligationForest<I::Location, I::State>,
    ) -> Option<(PobId, I::State)> {
        for &pob in &self.pobs {
            let Some(node) = forest.get(pob) else {
                continue;
            };
            if node.is_answered() {
                continue;
            }
            for &state in &self.branch_states {
                if self.tried.contains(&(pob, state)) {
                    continue;
                }
                let initial = interpreter.initial_location(state);
                if node.blocking_locations().contains(&initial) {
                    continue;
                }
                return Some((pob, state));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeInterpreter;

    #[test]
    fn empty_with_no_pobs_or_states() {
        let interp = FakeInterpreter::new();
        let forest = ProofObligationForest::new();
        let searcher: BackwardSearcher<FakeInterpreter> = BackwardSearcher::new();
        assert!(searcher.empty(&interp, &forest));
    }

    #[test]
    fn pairs_a_pob_with_a_branch_state() {
        let mut interp = FakeInterpreter::new();
        let mut forest = ProofObligationForest::new();
        let pob = forest.insert_root(5);
        let state = interp.new_state(true, 1);

        let mut searcher: BackwardSearcher<FakeInterpreter> = BackwardSearcher::new();
        searcher.add_pob(pob);
        searcher.add_branch(state);

        assert!(!searcher.empty(&interp, &forest));
        let (p, s) = searcher.select_action(&interp, &forest);
        assert_eq!(p, pob);
        assert_eq!(s, state);
        // the pair was tried once; it must not be offered again.
        assert!(searcher.empty(&interp, &forest));
    }

    #[test]
    fn blocked_initial_location_is_skipped() {
        let mut interp = FakeInterpreter::new();
        let mut forest = ProofObligationForest::new();
        let pob = forest.insert_root(5);
        let state = interp.new_state(true, 1);
        forest.block_location(pob, state, 1);

        let mut searcher: BackwardSearcher<FakeInterpreter> = BackwardSearcher::new();
        searcher.add_pob(pob);
        searcher.add_branch(state);

        assert!(searcher.empty(&interp, &forest));
    }

    #[test]
    fn removed_pob_is_never_paired_again() {
        let mut interp = FakeInterpreter::new();
        let mut forest = ProofObligationForest::new();
        let pob = forest.insert_root(5);
        let state = interp.new_state(true, 1);

        let mut searcher: BackwardSearcher<FakeInterpreter> = BackwardSearcher::new();
        searcher.add_pob(pob);
        searcher.add_branch(state);
        searcher.remove_pob(pob);

        assert!(searcher.empty(&interp, &forest));
    }
}
