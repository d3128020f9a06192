//! The coordinator (§4.4): a weakly-fair round-robin scheduler over the four
//! sub-searchers, the sole owner of the proof-obligation forest, and the only component
//! that talks to the interpreter about state classification.

use std::collections::BTreeSet;

use log::{debug, info, trace};

use crate::action::{Action, ActionResult, BackwardResult, ForwardResult, InitializeResult};
use crate::backward::BackwardSearcher;
use crate::initializer::Initializer;
use crate::interpreter::Interpreter;
use crate::proof_obligation::{PobId, ProofObligationForest};
use crate::searcher::{SelectionPolicy, Searcher};

/// The only configuration surface the coordinator accepts (§6): an initial ordinary
/// state, the locations it should aim at, and which selection policy drives each of the
/// two pluggable searchers.
pub struct SearcherConfig<I: Interpreter, PF, PB> {
    pub initial_state: I::State,
    pub targets: Vec<I::Location>,
    pub forward_policy: PF,
    pub branch_policy: PB,
}

pub struct Coordinator<I: Interpreter, PF, PB> {
    forward: Searcher<I, PF>,
    branch: Searcher<I, PB>,
    backward: BackwardSearcher<I>,
    initializer: Initializer<I>,
    forest: ProofObligationForest<I::Location, I::State>,
    /// Last scheduler slot tried, so `select_action` resumes the rotation rather than
    /// restarting it every call.
    choice: u8,
    /// The `(pob, state)` pairing behind the most recently emitted `Backward` action,
    /// consumed by the matching `BackwardResult`.
    pending_backward: Option<(PobId, I::State)>,
    /// Locations already given a root proof obligation via a validity-core hint, so the
    /// same hint reported twice does not spawn two roots.
    seeded_locations: BTreeSet<I::Location>,
}

impl<I: Interpreter, PF: SelectionPolicy<I>, PB: SelectionPolicy<I>> Coordinator<I, PF, PB> {
    pub fn new(interpreter: &mut I, config: SearcherConfig<I, PF, PB>) -> Self {
        let SearcherConfig {
            initial_state,
            targets,
            forward_policy,
            branch_policy,
        } = config;

        for location in &targets {
            interpreter.insert_target(initial_state, *location);
        }

        let mut forward = Searcher::new(forward_policy);
        forward.update(interpreter, None, &[initial_state], &[]);

        info!("coordinator constructed with initial state {initial_state:?}");

        Coordinator {
            forward,
            branch: Searcher::new(branch_policy),
            backward: BackwardSearcher::new(),
            initializer: Initializer::new(),
            forest: ProofObligationForest::new(),
            choice: 3,
            pending_backward: None,
            seeded_locations: BTreeSet::new(),
        }
    }

    /// Requires no particular state; returns `Terminate` once every sub-searcher that
    /// contributes to `empty()` has nothing left, after trying each of the four slots at
    /// most once (weak fairness, O(1) per empty slot).
    pub fn select_action(&mut self, interpreter: &mut I) -> Action<I> {
        for _ in 0..4 {
            self.choice = (self.choice + 1) % 4;
            let action = match self.choice {
                0 => self.try_forward(interpreter),
                1 => self.try_branch(interpreter),
                2 => self.try_backward(interpreter),
                3 => self.try_initialize(interpreter),
                _ => unreachable!(),
            };
            if let Some(action) = action {
                debug!("slot {} selected {action:?}", self.choice);
                return action;
            }
            trace!("slot {} empty", self.choice);
        }
        info!("all sub-searchers exhausted; terminating");
        Action::Terminate
    }

    fn try_forward(&mut self, interpreter: &mut I) -> Option<Action<I>> {
        if self.forward.empty() {
            return None;
        }
        let state = self.forward.select_state(interpreter);
        let current = interpreter.current_location(state);
        let looping = interpreter.at_block_terminator(state)
            && interpreter.targets(state).is_empty()
            && interpreter.has_visited(state, current);

        if looping {
            if let Some(target) = interpreter.calculate_target_by_transition_history(state) {
                interpreter.insert_target(state, target);
                interpreter.update_states(Some(state));
                debug!("retargeted looping state {state:?} to {target:?}");
                return Some(Action::Forward(state));
            }
            interpreter.pause_state(state);
            interpreter.update_states(Some(state));
            self.forward.update(interpreter, None, &[], &[state]);
            debug!("paused looping state {state:?} with no retarget available");
            return None;
        }
        Some(Action::Forward(state))
    }

    fn try_branch(&mut self, interpreter: &I) -> Option<Action<I>> {
        if self.branch.empty() {
            return None;
        }
        Some(Action::Branch(self.branch.select_state(interpreter)))
    }

    fn try_backward(&mut self, interpreter: &I) -> Option<Action<I>> {
        if self.backward.empty(interpreter, &self.forest) {
            return None;
        }
        let (pob, state) = self.backward.select_action(interpreter, &self.forest);
        self.forest.add_unblocked_state(pob, state);
        self.pending_backward = Some((pob, state));
        Some(Action::Backward(state, pob))
    }

    fn try_initialize(&mut self, interpreter: &I) -> Option<Action<I>> {
        if self.initializer.empty(interpreter) {
            return None;
        }
        let (location, targets) = self.initializer.select_action(interpreter);
        Some(Action::Initialize(location, targets))
    }

    /// Fans an `ActionResult` out to whichever sub-searchers are affected (§4.4 "Result
    /// dispatch"). Ordering follows O1: branch-classify, branch update, drain reached,
    /// forward update, initializer updates.
    pub fn update(&mut self, interpreter: &mut I, result: ActionResult<I>) {
        match result {
            ActionResult::Forward(r) => self.dispatch_forward(interpreter, r),
            ActionResult::Backward(r) => self.dispatch_backward(interpreter, r),
            ActionResult::Initialize(r) => self.dispatch_initialize(interpreter, r),
        }
    }

    fn dispatch_forward(&mut self, interpreter: &mut I, result: ForwardResult<I>) {
        let ForwardResult {
            current,
            added,
            removed,
            validity_core_init,
        } = result;

        let mut forward_added = Vec::new();
        let mut branch_added = Vec::new();
        for &state in &added {
            if interpreter.is_isolated(state) {
                branch_added.push(state);
            } else {
                forward_added.push(state);
            }
        }

        let mut forward_removed = Vec::new();
        let mut branch_removed = Vec::new();
        for &state in &removed {
            if interpreter.is_isolated(state) {
                branch_removed.push(state);
            } else {
                forward_removed.push(state);
            }
        }

        let (forward_current, branch_current) = match current {
            Some(state) if interpreter.is_isolated(state) => (None, Some(state)),
            Some(state) => (Some(state), None),
            None => (None, None),
        };

        self.branch.update(interpreter, branch_current, &branch_added, &branch_removed);
        for state in self.branch.collect_and_clear_reached() {
            self.backward.add_branch(state);
        }

        self.forward.update(interpreter, forward_current, &forward_added, &forward_removed);
        for state in self.forward.collect_and_clear_reached() {
            self.backward.add_branch(state);
        }

        if let Some(seed) = validity_core_init {
            self.initializer.add_validity_core_init(seed);
            if self.seeded_locations.insert(seed.location) {
                let pob = self.forest.insert_root(seed.location);
                self.backward.add_pob(pob);
                self.initializer.add_pob(pob, seed.location);
                debug!("seeded root proof obligation {pob:?} from validity core {seed:?}");
            }
        }
    }

    fn dispatch_backward(&mut self, interpreter: &I, result: BackwardResult<I>) {
        let (pob, state) = self
            .pending_backward
            .take()
            .expect("BackwardResult with no pending Backward action is an interpreter misclassification");

        match result.new_pob {
            Some(location) => {
                let child = self.forest.insert_child(pob, location);
                self.backward.update(child);
                self.initializer.add_pob(child, location);
            }
            None => {
                let initial = interpreter.initial_location(state);
                self.forest.block_location(pob, state, initial);
            }
        }
    }

    fn dispatch_initialize(&mut self, interpreter: &mut I, result: InitializeResult<I>) {
        self.branch.update(interpreter, None, &[result.state], &[]);
    }

    /// Climbs to the root of `pob`'s tree and destroys the whole tree, unregistering every
    /// destroyed node from `BackwardSearcher` and `Initializer` first (I4). Idempotent:
    /// calling this on an already-destroyed id is a no-op.
    pub fn remove_proof_obligation(&mut self, pob: PobId) {
        let backward = &mut self.backward;
        let initializer = &mut self.initializer;
        self.forest.close(pob, |id| {
            backward.remove_pob(id);
            initializer.remove_pob(id);
        });
    }

    /// `true` iff the Forward, Backward, and Initializer sub-searchers are all empty.
    /// Branch is intentionally excluded (§4.4): isolated states with no associated proof
    /// obligation are not themselves progress.
    pub fn empty(&self, interpreter: &I) -> bool {
        self.forward.empty() && self.backward.empty(interpreter, &self.forest) && self.initializer.empty(interpreter)
    }
}
