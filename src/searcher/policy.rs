//! State-selection policies for [`super::Searcher`].
//!
//! Mirrors the teacher crate's step-operator pattern (`BfsSuccessors` / `SaturationSuccessors`
//! in the reachability module it was adapted from): a policy is a small, stateless type
//! implementing one trait, and algorithms are assembled by plugging a policy into a generic
//! driver rather than writing a new driver per strategy.

use indexmap::IndexSet;
use log::trace;

use crate::interpreter::Interpreter;

/// Chooses which of the currently live states [`super::Searcher::select_state`] should step
/// next. Must be deterministic given the same `states` set.
pub trait SelectionPolicy<I: Interpreter> {
    fn select(&self, interpreter: &I, states: &IndexSet<I::State>) -> I::State;
}

/// Select the state that has been live the longest (first-in-first-out).
#[derive(Debug, Default, Clone, Copy)]
pub struct Bfs;

impl<I: Interpreter> SelectionPolicy<I> for Bfs {
    fn select(&self, _interpreter: &I, states: &IndexSet<I::State>) -> I::State {
        *states
            .first()
            .expect("selectState on empty searcher is a precondition violation")
    }
}

/// Select the state that has been live the shortest (last-in-first-out).
#[derive(Debug, Default, Clone, Copy)]
pub struct Dfs;

impl<I: Interpreter> SelectionPolicy<I> for Dfs {
    fn select(&self, _interpreter: &I, states: &IndexSet<I::State>) -> I::State {
        *states
            .last()
            .expect("selectState on empty searcher is a precondition violation")
    }
}

/// Wraps another policy: when at least one live state has a non-empty `targets` set *and*
/// a finite static distance to one of them, prefer the state with the shortest such
/// distance (tie-break by insertion order, i.e. the order `states` already iterates in).
/// Otherwise, defer to the wrapped policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct Guided<P> {
    fallback: P,
}

impl<P> Guided<P> {
    pub fn new(fallback: P) -> Self {
        Guided { fallback }
    }
}

impl<I: Interpreter, P: SelectionPolicy<I>> SelectionPolicy<I> for Guided<P> {
    fn select(&self, interpreter: &I, states: &IndexSet<I::State>) -> I::State {
        let mut best: Option<(u32, I::State)> = None;
        for &state in states {
            let targets = interpreter.targets(state);
            if targets.is_empty() {
                continue;
            }
            let current = interpreter.current_location(state);
            let distance = targets
                .iter()
                .filter_map(|&target| {
                    interpreter
                        .backward_distance_within_function(target)
                        .get(&current)
                        .copied()
                })
                .min();
            if let Some(distance) = distance {
                let better = match best {
                    None => true,
                    Some((best_distance, _)) => distance < best_distance,
                };
                if better {
                    best = Some((distance, state));
                }
            }
        }

        match best {
            Some((distance, state)) => {
                trace!("guided selection picked {state:?} at distance {distance}");
                state
            }
            None => self.fallback.select(interpreter, states),
        }
    }
}
