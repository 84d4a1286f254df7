//! Drives the match engine over a finished plan.
//!
//! Each independent starting neighborhood is tried in insertion order; the
//! first satisfying grounding terminates the whole search. The loop is
//! sequential on purpose: parallelizing it would need the engine's result
//! reporting to be lock-protected.

use log::{debug, trace};

use crate::{
    atomspace::{AtomSpace, Handle},
    engine::MatchEngine,
    planner::{Choice, SearchPlan, Strategy},
};

/// Executes `plan` against `engine`. Returns `true` on the first
/// satisfying grounding.
pub(crate) fn run(space: &AtomSpace, plan: &SearchPlan, engine: &mut dyn MatchEngine) -> bool {
    engine.set_pattern(&plan.variables, &plan.pattern);

    match &plan.strategy {
        Strategy::NoSearch => {
            debug!("no variables to ground, evaluating constant clauses");
            engine.explore_constant_evaluatables(&plan.pattern.mandatory)
        }
        Strategy::Neighborhood { choices } => choice_loop(space, choices, engine),
        Strategy::LinkType {
            root,
            starter_term,
            search_set,
        }
        | Strategy::VariableType {
            root,
            starter_term,
            search_set,
        } => search_loop(root, Some(starter_term), search_set, engine),
    }
}

fn choice_loop(space: &AtomSpace, choices: &[Choice], engine: &mut dyn MatchEngine) -> bool {
    for choice in choices {
        debug!("search start node: {}", choice.best_start);
        match &choice.start_term {
            Some(term) => debug!("start term: {}", term),
            None => debug!("start term: none"),
        }
        debug!("root clause: {}", choice.clause);

        // The neighborhood: incoming links of the anchor, narrowed to the
        // expected parent type when one is known.
        let search_set: Vec<Handle> = match &choice.start_term {
            Some(term) => space.incoming_filtered(&choice.best_start, term.atom_type()),
            None => space.incoming(&choice.best_start).to_vec(),
        };

        if search_loop(&choice.clause, choice.start_term.as_ref(), &search_set, engine) {
            return true;
        }
    }
    false
}

fn search_loop(
    root: &Handle,
    starter_term: Option<&Handle>,
    search_set: &[Handle],
    engine: &mut dyn MatchEngine,
) -> bool {
    let total = search_set.len();
    for (i, candidate) in search_set.iter().enumerate() {
        trace!("loop candidate ({}/{}): {}", i + 1, total, candidate);
        if engine.explore_neighborhood(root, starter_term, candidate) {
            return true;
        }
    }
    false
}
