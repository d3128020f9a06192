//! A tiny in-memory [`Interpreter`] used only by this crate's own tests.
//!
//! Mirrors the role the teacher crate's `test_utils` module plays (a hand-built example
//! network instead of a full model-checking backend): here, a handful of basic blocks and
//! functions wired up by hand, instead of a loaded LLVM module and an SMT solver. No test
//! in this crate drives a real interpreter — that machinery is out of scope (§1).

use std::collections::{BTreeMap, BTreeSet};

use crate::interpreter::{DistanceMap, Interpreter};

/// A handle to a state tracked by [`FakeInterpreter`]. Mirrors the role a pointer into
/// interpreter-owned storage plays in a real engine.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct StateId(pub u32);

#[derive(Clone)]
struct StateData {
    isolated: bool,
    initial_location: u32,
    current_location: u32,
    at_terminator: bool,
    visited: BTreeSet<u32>,
    targets: BTreeSet<u32>,
}

/// Initialize `env_logger` for tests. Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// A toy CFG: blocks are `u32`s, edges are explicit, and each block belongs to exactly one
/// function (identified by that function's entry block).
#[derive(Default)]
pub struct FakeInterpreter {
    states: Vec<StateData>,
    successors: BTreeMap<u32, BTreeSet<u32>>,
    function_of: BTreeMap<u32, u32>,
    /// Call edges: callee function entry -> set of caller function entries.
    callers: BTreeMap<u32, BTreeSet<u32>>,
    retarget_answers: BTreeMap<StateId, Option<u32>>,
    paused: BTreeSet<StateId>,
}

impl FakeInterpreter {
    pub fn new() -> Self {
        FakeInterpreter::default()
    }

    /// Declare that `block` belongs to the function whose entry is `entry` (a block is its
    /// own function's entry iff `block == entry`).
    pub fn set_function(&mut self, block: u32, entry: u32) -> &mut Self {
        self.function_of.insert(block, entry);
        self
    }

    pub fn add_edge(&mut self, from: u32, to: u32) -> &mut Self {
        self.successors.entry(from).or_default().insert(to);
        self
    }

    pub fn add_call_edge(&mut self, caller_entry: u32, callee_entry: u32) -> &mut Self {
        self.callers.entry(callee_entry).or_default().insert(caller_entry);
        self
    }

    pub fn new_state(&mut self, isolated: bool, location: u32) -> StateId {
        self.states.push(StateData {
            isolated,
            initial_location: location,
            current_location: location,
            at_terminator: false,
            visited: BTreeSet::from([location]),
            targets: BTreeSet::new(),
        });
        StateId((self.states.len() - 1) as u32)
    }

    fn data(&self, state: StateId) -> &StateData {
        &self.states[state.0 as usize]
    }

    fn data_mut(&mut self, state: StateId) -> &mut StateData {
        &mut self.states[state.0 as usize]
    }

    pub fn set_at_terminator(&mut self, state: StateId, value: bool) {
        self.data_mut(state).at_terminator = value;
    }

    pub fn step_to(&mut self, state: StateId, location: u32) {
        let data = self.data_mut(state);
        data.current_location = location;
        data.visited.insert(location);
    }

    pub fn set_retarget_answer(&mut self, state: StateId, answer: Option<u32>) {
        self.retarget_answers.insert(state, answer);
    }

    pub fn is_paused(&self, state: StateId) -> bool {
        self.paused.contains(&state)
    }
}

impl Interpreter for FakeInterpreter {
    type Location = u32;
    type State = StateId;

    fn is_isolated(&self, state: Self::State) -> bool {
        self.data(state).isolated
    }

    fn current_location(&self, state: Self::State) -> Self::Location {
        self.data(state).current_location
    }

    fn initial_location(&self, state: Self::State) -> Self::Location {
        self.data(state).initial_location
    }

    fn at_block_terminator(&self, state: Self::State) -> bool {
        self.data(state).at_terminator
    }

    fn has_visited(&self, state: Self::State, location: Self::Location) -> bool {
        self.data(state).visited.contains(&location)
    }

    fn targets(&self, state: Self::State) -> &BTreeSet<Self::Location> {
        &self.data(state).targets
    }

    fn insert_target(&mut self, state: Self::State, location: Self::Location) {
        self.data_mut(state).targets.insert(location);
    }

    fn calculate_target_by_transition_history(&mut self, state: Self::State) -> Option<Self::Location> {
        self.retarget_answers.get(&state).copied().flatten()
    }

    fn pause_state(&mut self, state: Self::State) {
        self.paused.insert(state);
    }

    fn update_states(&mut self, _state: Option<Self::State>) {}

    fn entry_of_function(&self, location: Self::Location) -> Self::Location {
        *self.function_of.get(&location).unwrap_or(&location)
    }

    fn backward_distance_within_function(&self, location: Self::Location) -> DistanceMap<Self::Location> {
        let function = self.entry_of_function(location);
        let mut distances = BTreeMap::new();
        distances.insert(location, 0u32);
        let mut frontier = vec![location];
        let mut depth = 0u32;
        while !frontier.is_empty() {
            depth += 1;
            let mut next = Vec::new();
            for &loc in &frontier {
                for (&from, tos) in &self.successors {
                    if tos.contains(&loc)
                        && self.function_of.get(&from).copied().unwrap_or(from) == function
                        && !distances.contains_key(&from)
                    {
                        distances.insert(from, depth);
                        next.push(from);
                    }
                }
            }
            frontier = next;
        }
        distances
    }

    fn backward_distance_between_functions(
        &self,
        function_entry: Self::Location,
    ) -> DistanceMap<Self::Location> {
        let mut distances = BTreeMap::new();
        let mut frontier = vec![function_entry];
        let mut depth = 0u32;
        let mut seen = BTreeSet::from([function_entry]);
        while !frontier.is_empty() {
            depth += 1;
            let mut next = Vec::new();
            for loc in &frontier {
                if let Some(callers) = self.callers.get(loc) {
                    for &caller in callers {
                        if seen.insert(caller) {
                            distances.insert(caller, depth);
                            next.push(caller);
                        }
                    }
                }
            }
            frontier = next;
        }
        distances
    }
}
