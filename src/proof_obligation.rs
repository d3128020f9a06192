//! The proof-obligation forest: a dynamically growing tree of goal conditions whose
//! satisfiability would witness a bug.
//!
//! The source system represents this forest with raw parent/child pointers, which makes
//! the recursive closure in [`ProofObligationForest::close`] a use-after-free hazard. Here
//! the forest is an arena (`SlotMap`) indexed by integer handles: `parent`/`children` are
//! [`PobId`] values, so a cycle cannot be constructed through the public API, and closing
//! a subtree is an iterative walk over handles rather than a recursive walk over pointers.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use log::{debug, info};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A handle to a single node of a [`ProofObligationForest`].
    pub struct PobId;
}

/// A single node of the proof-obligation forest (§3 of the design).
pub struct ProofObligation<L, S> {
    /// Where the obligation must be discharged.
    pub location: L,
    parent: Option<PobId>,
    children: BTreeSet<PobId>,
    /// Function-entry (or isolated-state-initial) locations already shown incapable of
    /// discharging this obligation.
    blocking_locations: BTreeSet<L>,
    /// States currently trying to discharge this obligation.
    unblocked_states: IndexSet<S>,
    answered: bool,
}

impl<L, S> ProofObligation<L, S> {
    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn parent(&self) -> Option<PobId> {
        self.parent
    }

    pub fn children(&self) -> &BTreeSet<PobId> {
        &self.children
    }

    pub fn blocking_locations(&self) -> &BTreeSet<L> {
        &self.blocking_locations
    }

    pub fn unblocked_states(&self) -> &IndexSet<S> {
        &self.unblocked_states
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }
}

/// Owns every live [`ProofObligation`], organized into zero or more disjoint trees.
///
/// This is the sole owner of proof-obligation data (§3 "Ownership"): sub-searchers never
/// hold a `ProofObligation` by value, only a [`PobId`] plus whatever snapshot they cached
/// at registration time (see [`crate::backward::BackwardSearcher`] and
/// [`crate::initializer::Initializer`]).
#[derive(Default)]
pub struct ProofObligationForest<L, S> {
    arena: SlotMap<PobId, ProofObligation<L, S>>,
}

impl<L, S> ProofObligationForest<L, S>
where
    L: Copy + Eq + Ord + std::fmt::Debug,
    S: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    pub fn new() -> Self {
        ProofObligationForest {
            arena: SlotMap::with_key(),
        }
    }

    pub fn get(&self, id: PobId) -> Option<&ProofObligation<L, S>> {
        self.arena.get(id)
    }

    pub fn contains(&self, id: PobId) -> bool {
        self.arena.contains_key(id)
    }

    /// Insert a new root proof obligation at `location` with no parent.
    pub fn insert_root(&mut self, location: L) -> PobId {
        let id = self.arena.insert(ProofObligation {
            location,
            parent: None,
            children: BTreeSet::new(),
            blocking_locations: BTreeSet::new(),
            unblocked_states: IndexSet::new(),
            answered: false,
        });
        debug!("registered root proof obligation {id:?} at {location:?}");
        id
    }

    /// Insert a new proof obligation at `location`, spawned from `parent` by
    /// weakest-precondition propagation (I1: the forest stays a forest, `parent` gets a
    /// new child, `child` gets exactly this one parent).
    pub fn insert_child(&mut self, parent: PobId, location: L) -> PobId {
        let id = self.arena.insert(ProofObligation {
            location,
            parent: Some(parent),
            children: BTreeSet::new(),
            blocking_locations: BTreeSet::new(),
            unblocked_states: IndexSet::new(),
            answered: false,
        });
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.insert(id);
        }
        debug!("registered child proof obligation {id:?} at {location:?} under {parent:?}");
        id
    }

    /// Record `state` as currently trying to discharge `pob`.
    pub fn add_unblocked_state(&mut self, pob: PobId, state: S) {
        if let Some(node) = self.arena.get_mut(pob) {
            node.unblocked_states.insert(state);
        }
    }

    /// Move `state` from `pob`'s `unblockedStates` into its `blockingLocations`, keyed by
    /// `state_initial_location` — the mutation the source system performs
    /// (`ProofObligation::block`) whenever a `Backward` step made no progress.
    pub fn block_location(&mut self, pob: PobId, state: S, state_initial_location: L) {
        if let Some(node) = self.arena.get_mut(pob) {
            node.unblocked_states.shift_remove(&state);
            node.blocking_locations.insert(state_initial_location);
            debug!("blocked {state_initial_location:?} against proof obligation {pob:?}");
        }
    }

    /// The root of the tree containing `pob`.
    pub fn root_of(&self, pob: PobId) -> PobId {
        let mut current = pob;
        while let Some(node) = self.arena.get(current) {
            match node.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Destroy the entire tree rooted at `pob`'s ancestor (I4), returning the ids of every
    /// destroyed node (including `pob` itself and its original root). `on_remove` is
    /// invoked for each destroyed id before it is dropped from the arena, so callers can
    /// unregister it from other components first (Coordinator's `removeProofObligation`,
    /// §4.4).
    pub fn close(&mut self, pob: PobId, mut on_remove: impl FnMut(PobId)) {
        if !self.arena.contains_key(pob) {
            return;
        }
        let root = self.root_of(pob);

        let mut stack = vec![root];
        let mut subtree = Vec::new();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.arena.get(id) {
                stack.extend(node.children.iter().copied());
                subtree.push(id);
            }
        }

        info!(
            "closing proof-obligation tree rooted at {root:?} ({} node(s))",
            subtree.len()
        );

        for id in &subtree {
            on_remove(*id);
        }
        for id in subtree {
            self.arena.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_parent() {
        let mut forest: ProofObligationForest<u32, u32> = ProofObligationForest::new();
        let root = forest.insert_root(5);
        assert_eq!(forest.get(root).unwrap().parent(), None);
        assert_eq!(*forest.get(root).unwrap().location(), 5);
    }

    #[test]
    fn child_is_registered_under_parent() {
        let mut forest: ProofObligationForest<u32, u32> = ProofObligationForest::new();
        let root = forest.insert_root(1);
        let child = forest.insert_child(root, 2);
        assert_eq!(forest.get(child).unwrap().parent(), Some(root));
        assert!(forest.get(root).unwrap().children().contains(&child));
    }

    #[test]
    fn root_of_is_transitive() {
        let mut forest: ProofObligationForest<u32, u32> = ProofObligationForest::new();
        let root = forest.insert_root(1);
        let a = forest.insert_child(root, 2);
        let b = forest.insert_child(a, 3);
        assert_eq!(forest.root_of(b), root);
        assert_eq!(forest.root_of(a), root);
        assert_eq!(forest.root_of(root), root);
    }

    #[test]
    fn closing_any_node_destroys_the_whole_tree() {
        // Scenario F: root r has children a, b; a has child c. Closing c destroys r, a, b, c.
        let mut forest: ProofObligationForest<u32, u32> = ProofObligationForest::new();
        let r = forest.insert_root(0);
        let a = forest.insert_child(r, 1);
        let _b = forest.insert_child(r, 2);
        let c = forest.insert_child(a, 3);

        let mut removed = Vec::new();
        forest.close(c, |id| removed.push(id));

        assert_eq!(removed.len(), 4);
        assert!(!forest.contains(r));
        assert!(!forest.contains(a));
        assert!(!forest.contains(_b));
        assert!(!forest.contains(c));
    }

    #[test]
    fn close_is_idempotent_on_already_removed_pob() {
        let mut forest: ProofObligationForest<u32, u32> = ProofObligationForest::new();
        let r = forest.insert_root(0);
        let mut removed = Vec::new();
        forest.close(r, |id| removed.push(id));
        assert_eq!(removed.len(), 1);
        // Closing again must not panic and must not invoke the callback again.
        removed.clear();
        forest.close(r, |id| removed.push(id));
        assert!(removed.is_empty());
    }

    #[test]
    fn block_location_moves_state_out_of_unblocked() {
        let mut forest: ProofObligationForest<u32, u32> = ProofObligationForest::new();
        let p = forest.insert_root(0);
        forest.add_unblocked_state(p, 42);
        assert!(forest.get(p).unwrap().unblocked_states().contains(&42));
        forest.block_location(p, 42, 7);
        assert!(!forest.get(p).unwrap().unblocked_states().contains(&42));
        assert!(forest.get(p).unwrap().blocking_locations().contains(&7));
    }
}
