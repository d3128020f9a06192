//! A bidirectional search coordinator for a symbolic execution engine.
//!
//! This crate provides the scheduling core that decides, tick by tick, what a symbolic
//! interpreter should do next: keep stepping an ordinary state forward, keep stepping an
//! isolated branch fragment, try to propagate a proof obligation backward through the
//! call graph, or synthesize a new isolated starting point for backward search. The
//! interpreter itself — bitcode loading, constraint solving, memory modeling — is not
//! part of this crate; [`Interpreter`](interpreter::Interpreter) is the capability set the
//! coordinator consumes from it.
//!
//! # Main Modules
//!
//! - [`interpreter`]: the `Interpreter` trait the coordinator is generic over.
//! - [`proof_obligation`]: the arena-backed forest of open proof obligations.
//! - [`action`]: the `Action`/`ActionResult` protocol exchanged with the interpreter.
//! - [`searcher`]: the generic forward/branch state-selection engine and its policies.
//! - [`backward`]: pairs open proof obligations with isolated states that reached a sink.
//! - [`initializer`]: produces new isolated starting locations via static-distance
//!   enumeration.
//! - [`coordinator`]: the round-robin scheduler tying the above together.
//!
//! # Quick Start
//!
//! ```ignore
//! use bidir_search_coordinator::coordinator::{Coordinator, SearcherConfig};
//! use bidir_search_coordinator::searcher::Bfs;
//!
//! let mut coordinator = Coordinator::new(&mut interpreter, SearcherConfig {
//!     initial_state,
//!     targets: vec![target_location],
//!     forward_policy: Bfs,
//!     branch_policy: Bfs,
//! });
//!
//! loop {
//!     let action = coordinator.select_action(&mut interpreter);
//!     if matches!(action, bidir_search_coordinator::action::Action::Terminate) {
//!         break;
//!     }
//!     let result = interpreter.run(action);
//!     coordinator.update(&mut interpreter, result);
//! }
//! ```

pub mod action;
pub mod backward;
pub mod coordinator;
pub mod initializer;
pub mod interpreter;
pub mod proof_obligation;
pub mod searcher;

#[cfg(test)]
mod test_support;
