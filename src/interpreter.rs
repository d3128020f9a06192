//! The capability set the coordinator consumes from the host symbolic interpreter.
//!
//! Everything in this module is a *trait*: the coordinator never owns a concrete
//! interpreter, a concrete location, or a concrete execution state. It only knows the
//! `Interpreter` contract below. A real engine (LLVM-bitcode loader, SMT façade, memory
//! model, ...) implements this trait once and hands the coordinator a `&mut` reference
//! to itself; none of that machinery is part of this crate (see the crate-level docs).

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

/// A mapping from a location to the number of CFG edges that separate it (backward) from
/// whatever location the map was computed for. Produced by
/// [`Interpreter::backward_distance_within_function`] and
/// [`Interpreter::backward_distance_between_functions`].
pub type DistanceMap<L> = BTreeMap<L, u32>;

/// An interpreter-reported hint identifying a promising seed for isolated exploration:
/// a location, paired with the entry location of the function that contains it.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidityCore<L> {
    /// The location the interpreter found interesting.
    pub location: L,
    /// The entry block of the function containing `location`.
    pub function: L,
}

impl<L: fmt::Debug> fmt::Debug for ValidityCore<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidityCore")
            .field("location", &self.location)
            .field("function", &self.function)
            .finish()
    }
}

/// The external interface the coordinator relies on (§6 of the design).
///
/// `Location` identifies a basic block; the coordinator treats it opaquely apart from
/// the three static CFG queries below. `State` is a `Copy` *handle* to an execution state
/// that is owned and stored by the interpreter itself — the coordinator never sees the
/// state's actual contents, only what this trait exposes about it.
///
/// Every mutation the coordinator is allowed to make to a state goes through
/// [`Interpreter::insert_target`]; there is no other way for the coordinator to reach into
/// interpreter-owned storage.
pub trait Interpreter {
    /// Identifier of a basic block. Opaque apart from the CFG queries below.
    type Location: Copy + Eq + Ord + Hash + fmt::Debug;
    /// A lightweight handle to an interpreter-owned execution state.
    type State: Copy + Eq + Hash + fmt::Debug;

    /// True iff `state` was not started at program entry (i.e. it is a branch fragment
    /// produced by the [`Initializer`](crate::initializer::Initializer)).
    fn is_isolated(&self, state: Self::State) -> bool;

    /// The location `state` is currently positioned at.
    fn current_location(&self, state: Self::State) -> Self::Location;

    /// The location an isolated state was started from. Unspecified (and unused) for
    /// non-isolated states.
    fn initial_location(&self, state: Self::State) -> Self::Location;

    /// True iff `state` is currently positioned at the terminator of its current block.
    ///
    /// Instruction-level semantics are out of scope for this crate; this query lets the
    /// coordinator ask the one instruction-granularity question its scheduling rule needs
    /// (distinguishing a mid-block step from a step that is about to leave the block)
    /// without modeling instructions itself.
    fn at_block_terminator(&self, state: Self::State) -> bool;

    /// True iff `state`'s transition history already recorded a visit to `location`
    /// (the "multilevel" count of the original system).
    fn has_visited(&self, state: Self::State, location: Self::Location) -> bool;

    /// The mutable set of locations `state` is trying to reach. The coordinator only
    /// ever adds to this set, through [`Interpreter::insert_target`]; it never removes
    /// from it or inspects it except to decide the next action.
    fn targets(&self, state: Self::State) -> &std::collections::BTreeSet<Self::Location>;

    /// Insert `location` into `state`'s target set. The only mutation the coordinator is
    /// permitted to make to interpreter-owned state.
    fn insert_target(&mut self, state: Self::State, location: Self::Location);

    /// Ask the interpreter to suggest a next target for `state`, based on its transition
    /// history, when it is about to loop with no target of its own.
    fn calculate_target_by_transition_history(&mut self, state: Self::State) -> Option<Self::Location>;

    /// Remove `state` from active rotation. The interpreter keeps the handle alive but
    /// will not offer it for scheduling until some future stimulus reactivates it.
    fn pause_state(&mut self, state: Self::State);

    /// Notify the interpreter that `state` (or, if `None`, the previously paused state)
    /// was just updated and should be reconsidered by its own bookkeeping.
    fn update_states(&mut self, state: Option<Self::State>);

    /// The entry block of the function containing `location`.
    fn entry_of_function(&self, location: Self::Location) -> Self::Location;

    /// Backward distance (in CFG edges) from every reachable predecessor of `location`
    /// down to `location` itself, within `location`'s function.
    fn backward_distance_within_function(&self, location: Self::Location) -> DistanceMap<Self::Location>;

    /// Backward distance from every function whose call sites can reach
    /// `function_entry`'s function, keyed by that caller function's entry block.
    fn backward_distance_between_functions(
        &self,
        function_entry: Self::Location,
    ) -> DistanceMap<Self::Location>;
}
