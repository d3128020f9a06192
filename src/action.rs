//! The [`Action`]/[`ActionResult`] protocol exchanged between the coordinator and the
//! interpreter on every tick (§3, §9 "Action as tagged variant").
//!
//! The source system also has an "enum + four nullable pointers" draft of `Action`; that
//! shape doesn't type-check as a sum in Rust without giving up exhaustiveness, so this
//! crate only implements the cleaner polymorphic draft the design notes call out as
//! the intended one.

use std::collections::BTreeSet;

use crate::interpreter::{Interpreter, ValidityCore};
use crate::proof_obligation::PobId;

/// What the coordinator wants the interpreter to do next.
pub enum Action<I: Interpreter> {
    /// Step this ordinary (non-isolated) state.
    Forward(I::State),
    /// Step this isolated state.
    Branch(I::State),
    /// Try to discharge `pob` using `state`.
    Backward(I::State, PobId),
    /// Start a fresh isolated state at `location`, aimed at `targets`.
    Initialize(I::Location, BTreeSet<I::Location>),
    /// The analysis is exhausted.
    Terminate,
}

impl<I: Interpreter> Clone for Action<I> {
    fn clone(&self) -> Self {
        match self {
            Action::Forward(s) => Action::Forward(*s),
            Action::Branch(s) => Action::Branch(*s),
            Action::Backward(s, pob) => Action::Backward(*s, *pob),
            Action::Initialize(loc, targets) => Action::Initialize(*loc, targets.clone()),
            Action::Terminate => Action::Terminate,
        }
    }
}

impl<I: Interpreter> std::fmt::Debug for Action<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Forward(s) => f.debug_tuple("Forward").field(s).finish(),
            Action::Branch(s) => f.debug_tuple("Branch").field(s).finish(),
            Action::Backward(s, pob) => f.debug_tuple("Backward").field(s).field(pob).finish(),
            Action::Initialize(loc, targets) => {
                f.debug_tuple("Initialize").field(loc).field(targets).finish()
            }
            Action::Terminate => f.write_str("Terminate"),
        }
    }
}

impl<I: Interpreter> PartialEq for Action<I> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Action::Forward(a), Action::Forward(b)) => a == b,
            (Action::Branch(a), Action::Branch(b)) => a == b,
            (Action::Backward(a, p1), Action::Backward(b, p2)) => a == b && p1 == p2,
            (Action::Initialize(l1, t1), Action::Initialize(l2, t2)) => l1 == l2 && t1 == t2,
            (Action::Terminate, Action::Terminate) => true,
            _ => false,
        }
    }
}

/// What stepping a `Forward` or `Branch` action produced.
pub struct ForwardResult<I: Interpreter> {
    /// The state that was stepped, if it is still alive (not in `removed`).
    pub current: Option<I::State>,
    /// New states spawned by a branch (e.g. a conditional fork) while stepping.
    pub added: Vec<I::State>,
    /// States the interpreter has terminated and is about to destroy.
    pub removed: Vec<I::State>,
    /// A newly discovered interesting seed location, if any.
    pub validity_core_init: Option<ValidityCore<I::Location>>,
}

impl<I: Interpreter> ForwardResult<I> {
    /// A result carrying no new information beyond the state that was stepped.
    pub fn stepped(current: I::State) -> Self {
        ForwardResult {
            current: Some(current),
            added: Vec::new(),
            removed: Vec::new(),
            validity_core_init: None,
        }
    }
}

/// What stepping a `Backward` action produced: zero or one newly spawned proof obligation,
/// to be attached as a child of the one under discharge.
pub struct BackwardResult<I: Interpreter> {
    pub new_pob: Option<I::Location>,
}

/// What stepping an `Initialize` action produced: a freshly started isolated state.
pub struct InitializeResult<I: Interpreter> {
    pub state: I::State,
}

/// What the interpreter reports back after running an [`Action`].
pub enum ActionResult<I: Interpreter> {
    Forward(ForwardResult<I>),
    Backward(BackwardResult<I>),
    Initialize(InitializeResult<I>),
}
