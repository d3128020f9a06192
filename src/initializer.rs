//! The initializer (§4.2): produces new isolated starting locations for the branch
//! searcher, using static-distance enumeration (SDI) seeded by registered proof
//! obligations and by validity-core hints from the interpreter.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::interpreter::{Interpreter, ValidityCore};
use crate::proof_obligation::PobId;

pub struct Initializer<I: Interpreter> {
    /// Registered proof obligations, keyed by id so `remove_pob` can find them; FIFO order
    /// drives the SDI walk.
    pobs: IndexMap<PobId, I::Location>,
    /// Locations already handed out by `select_action` — monotonic, never repeated.
    initialized: BTreeSet<I::Location>,
    /// Interpreter-reported seeds not yet emitted. A seed for a location that SDI would
    /// also eventually reach supersedes SDI for that location: whichever is emitted first
    /// marks it `initialized` and the other path is skipped by that same monotonicity rule.
    pending_seeds: IndexSet<I::Location>,
}

impl<I: Interpreter> Default for Initializer<I> {
    fn default() -> Self {
        Initializer {
            pobs: IndexMap::new(),
            initialized: BTreeSet::new(),
            pending_seeds: IndexSet::new(),
        }
    }
}

impl<I: Interpreter> Initializer<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a proof obligation whose location should be considered a future
    /// isolated-start goal.
    pub fn add_pob(&mut self, pob: PobId, location: I::Location) {
        self.pobs.insert(pob, location);
    }

    /// Unregister `pob`; it stops contributing to both `empty` and future selections
    /// immediately (an edge case named explicitly in §4.2).
    pub fn remove_pob(&mut self, pob: PobId) {
        self.pobs.shift_remove(&pob);
    }

    /// Register an interesting seed the interpreter observed. The seed's function entry
    /// (not its location) is the start location a future isolated state should begin at;
    /// `location` itself is already tracked as a target through the PO it was seeded from.
    pub fn add_validity_core_init(&mut self, seed: ValidityCore<I::Location>) {
        if !self.initialized.contains(&seed.function) {
            self.pending_seeds.insert(seed.function);
        }
    }

    /// True iff for every registered PO, every location within backward distance from it
    /// (intra-function and inter-function via function entries) has already been handed
    /// out, and no validity-core seed is waiting to be emitted.
    pub fn empty(&self, interpreter: &I) -> bool {
        if self.pending_seeds.iter().any(|loc| !self.initialized.contains(loc)) {
            return false;
        }
        self.pobs
            .values()
            .all(|&location| self.frontier_of(interpreter, location).next().is_none())
    }

    /// Requires `!self.empty(..)`.
    pub fn select_action(&mut self, interpreter: &I) -> (I::Location, BTreeSet<I::Location>) {
        if let Some(&seed) = self
            .pending_seeds
            .iter()
            .find(|loc| !self.initialized.contains(*loc))
        {
            self.pending_seeds.shift_remove(&seed);
            self.initialized.insert(seed);
            debug!("initializer emitted validity-core seed {seed:?}");
            return (seed, self.registered_locations());
        }

        let locations: Vec<I::Location> = self.pobs.values().copied().collect();
        for location in locations {
            if let Some(candidate) = self.frontier_of(interpreter, location).next() {
                self.initialized.insert(candidate);
                debug!("initializer emitted {candidate:?} from SDI frontier of {location:?}");
                return (candidate, self.registered_locations());
            }
        }

        panic!("selectAction on empty Initializer is a precondition violation");
    }

    fn registered_locations(&self) -> BTreeSet<I::Location> {
        self.pobs.values().copied().collect()
    }

    /// The not-yet-initialized locations reachable backward from `location`: first its
    /// intra-function frontier, then (once that frontier is exhausted) the entry blocks of
    /// functions whose call sites can reach `location`'s function.
    fn frontier_of<'a>(
        &'a self,
        interpreter: &'a I,
        location: I::Location,
    ) -> impl Iterator<Item = I::Location> + 'a {
        let within = interpreter.backward_distance_within_function(location);
        let mut by_distance: Vec<(u32, I::Location)> =
            within.into_iter().map(|(loc, d)| (d, loc)).collect();
        by_distance.sort_by_key(|&(d, _)| d);
        let mut ordered: Vec<I::Location> = by_distance
            .into_iter()
            .map(|(_, loc)| loc)
            .filter(|&loc| loc != location)
            .collect();

        let function_entry = interpreter.entry_of_function(location);
        let between = interpreter.backward_distance_between_functions(function_entry);
        let mut between_by_distance: Vec<(u32, I::Location)> =
            between.into_iter().map(|(loc, d)| (d, loc)).collect();
        between_by_distance.sort_by_key(|&(d, _)| d);
        ordered.extend(between_by_distance.into_iter().map(|(_, loc)| loc));

        ordered
            .into_iter()
            .filter(move |loc| !self.initialized.contains(loc))
    }
}
