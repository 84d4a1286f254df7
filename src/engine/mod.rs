//! The seam between the planner and the clause-walking match engine.
//!
//! The planner only decides where a grounding search should begin; the
//! engine owns the actual backtracking verification of each candidate.

use crate::{
    atomspace::Handle,
    pattern::{Pattern, Variables},
};

/// The generic interface of a pattern-match execution engine.
pub trait MatchEngine {
    /// Re-points the engine at a pattern bundle. Called before any
    /// exploration, and again whenever just-in-time expansion has rebuilt
    /// the pattern.
    fn set_pattern(&mut self, variables: &Variables, pattern: &Pattern);

    /// Attempts to ground `root` starting from `candidate`, an anchor link
    /// taken from the planned neighborhood. `starter_term` is the pattern
    /// sub-term the candidate is expected to match; it is `None` when the
    /// anchor was a bare constant clause or choice branch.
    ///
    /// Returns `true` if a satisfying grounding was found.
    fn explore_neighborhood(
        &mut self,
        root: &Handle,
        starter_term: Option<&Handle>,
        candidate: &Handle,
    ) -> bool;

    /// Evaluates clauses that contain no variables at all. Nothing needs
    /// to be matched; the clauses only need to be evaluated.
    ///
    /// Returns `true` if the clauses are satisfied.
    fn explore_constant_evaluatables(&mut self, clauses: &[Handle]) -> bool;
}
