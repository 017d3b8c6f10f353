//! The caller-supplied state transition

use crate::Action;

/// A pure `(state, action) -> state` transition
///
/// Implementations must not read wall-clock time, randomness, or any other
/// hidden input: replaying the same actions from the same state has to give
/// the same result. The engine replaces its state wholesale with whatever
/// `reduce` returns.
///
/// Any `Fn(&S, &Action<A>) -> S` closure is a reducer.
pub trait Reducer<S, A> {
    /// Compute the state that follows `state` after `action`
    fn reduce(&self, state: &S, action: &Action<A>) -> S;
}

impl<S, A, F> Reducer<S, A> for F
where
    F: Fn(&S, &Action<A>) -> S,
{
    fn reduce(&self, state: &S, action: &Action<A>) -> S {
        self(state, action)
    }
}
