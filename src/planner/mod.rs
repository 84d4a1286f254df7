//! The search-initiation planner.
//!
//! Given a pattern and a read-only atomspace, the planner shrinks the
//! candidate search space from "all of the graph" to a small neighborhood
//! before the match engine is ever invoked.
//!
//! Strategies are tried in a fixed order, stopping at the first that
//! yields a usable plan:
//!
//! 1. **Neighborhood:** anchor at the constant with the thinnest incoming
//!    set anywhere in the clauses.
//! 2. **No-search:** the pattern declares no variables; clauses only need
//!    to be evaluated, not matched.
//! 3. **Link-type:** no usable constant; anchor on the rarest link type
//!    occurring in the clauses and enumerate all atoms of that type.
//! 4. **Variable-type:** clauses are bare typed variables; enumerate the
//!    atoms admitted by the narrowest type restriction.
//!
//! Exhausting all four is an ordinary outcome (the pattern simply has no
//! grounding entry point), reported as `Ok(false)`, never as an error.

mod debug;
mod driver;
mod jit;
mod metrics;
mod starter;

use std::time::Instant;

use itertools::Itertools;
use log::{debug, trace, warn};

pub use debug::print_plan;
pub use metrics::PlannerMetrics;
pub use starter::{Choice, Starter};

use crate::{
    atomspace::{AtomSpace, AtomType, Handle, Quotation},
    engine::MatchEngine,
    error::{PlannerError, PlannerResult},
    pattern::{Pattern, Variables},
    planner::starter::{least_holder, StarterFinder},
};

/// Tunable limits for planning.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    /// How often the degenerate no-type-restrictions path may be re-entered
    /// with the same pattern before it is diagnosed as an infinite loop.
    pub degenerate_replan_limit: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            degenerate_replan_limit: 300,
        }
    }
}

/// How a plan intends to seed the search, with everything the driver needs
/// to do so.
#[derive(Clone, Debug)]
pub enum Strategy {
    /// One independent starting neighborhood per choice, each anchored at
    /// a concrete constant.
    Neighborhood { choices: Vec<Choice> },
    /// Nothing to ground; the engine evaluates the mandatory clauses
    /// directly.
    NoSearch,
    /// Every atom of the rarest link type occurring in the clauses.
    LinkType {
        root: Handle,
        starter_term: Handle,
        search_set: Vec<Handle>,
    },
    /// Every atom admitted by the narrowest variable type restriction.
    VariableType {
        root: Handle,
        starter_term: Handle,
        search_set: Vec<Handle>,
    },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Neighborhood { .. } => "neighborhood",
            Strategy::NoSearch => "no-search",
            Strategy::LinkType { .. } => "link-type",
            Strategy::VariableType { .. } => "variable-type",
        }
    }
}

/// A finished plan: the (possibly expanded) pattern bundle plus the chosen
/// strategy. Lives for one search.
#[derive(Clone, Debug)]
pub struct SearchPlan {
    pub variables: Variables,
    pub pattern: Pattern,
    pub strategy: Strategy,
}

/// Plans where a grounding search should begin.
///
/// The planner only borrows the atomspace and mutates nothing in it. It
/// may be reused across searches; the infinite-loop guard for degenerate
/// patterns is scoped to the instance, so independent planners never
/// interfere with each other.
pub struct SearchPlanner<'a> {
    space: &'a AtomSpace,
    config: PlannerConfig,
    metrics: PlannerMetrics,
    degenerate_body: Option<Handle>,
    degenerate_count: u32,
}

impl<'a> SearchPlanner<'a> {
    pub fn new(space: &'a AtomSpace) -> Self {
        Self::with_config(space, PlannerConfig::default())
    }

    pub fn with_config(space: &'a AtomSpace, config: PlannerConfig) -> Self {
        Self {
            space,
            config,
            metrics: PlannerMetrics::default(),
            degenerate_body: None,
            degenerate_count: 0,
        }
    }

    /// Metrics from the most recent `create_plan` call.
    pub fn metrics(&self) -> &PlannerMetrics {
        &self.metrics
    }

    /// Plans a search and drives `engine` over it.
    ///
    /// Returns `Ok(true)` on the first satisfying grounding, `Ok(false)`
    /// when the candidate space is exhausted or no strategy applies.
    pub fn initiate_search(
        &mut self,
        variables: &Variables,
        pattern: &Pattern,
        engine: &mut dyn MatchEngine,
    ) -> PlannerResult<bool> {
        match self.create_plan(variables, pattern)? {
            Some(plan) => Ok(driver::run(self.space, &plan, engine)),
            None => {
                debug!("all search strategies exhausted, pattern cannot be grounded");
                Ok(false)
            }
        }
    }

    /// Expands defined terms, then runs the strategy cascade. `None` means
    /// no strategy produced a usable plan.
    pub fn create_plan(
        &mut self,
        variables: &Variables,
        pattern: &Pattern,
    ) -> PlannerResult<Option<SearchPlan>> {
        let started = Instant::now();
        self.metrics = PlannerMetrics::default();

        let (variables, pattern, jit_rounds) = jit::expand(self.space, variables, pattern)?;
        self.metrics.jit_rounds = Some(jit_rounds as u32);

        debug!("attempting node-neighborhood search");
        let mut strategy = self.neighborhood_search(&pattern);
        if strategy.is_none() {
            debug!("cannot use node-neighborhood search, trying no-variable search");
            strategy = self.no_search(&variables);
        }
        if strategy.is_none() {
            debug!("cannot use no-variable search, trying link-type search");
            strategy = self.link_type_search(&pattern);
        }
        if strategy.is_none() {
            debug!("cannot use link-type search, trying variable-type search");
            strategy = self.variable_type_search(&variables, &pattern)?;
        }

        self.metrics.planning_time = Some(started.elapsed());
        Ok(strategy.map(|strategy| {
            self.metrics.strategy = Some(strategy.name());
            SearchPlan {
                variables,
                pattern,
                strategy,
            }
        }))
    }

    /// The primary strategy: anchor at the thinnest constant in the
    /// clauses.
    ///
    /// Mandatory clauses are preferred. Only when every mandatory clause
    /// holds an evaluatable does the search fall back to optionals; an
    /// optional clause might be absent from the graph, so anchoring on one
    /// while a groundable mandatory exists would spuriously fail.
    fn neighborhood_search(&mut self, pattern: &Pattern) -> Option<Strategy> {
        if pattern.mandatory.is_empty() && pattern.optionals.is_empty() {
            return None;
        }

        let try_optionals = pattern
            .mandatory
            .iter()
            .all(|m| pattern.evaluatable_holders.contains(m));
        let clauses = if try_optionals {
            &pattern.optionals
        } else {
            &pattern.mandatory
        };
        self.metrics.clauses_examined = Some(clauses.len() as u32);

        let mut finder = StarterFinder::new(self.space, &pattern.evaluatable_terms);
        let best = finder.find_thinnest(clauses, &pattern.evaluatable_holders);
        let mut choices = finder.into_choices();

        // No constant anywhere and no choice branches either: some other
        // strategy will have to do.
        if choices.is_empty() {
            let (clause, starter) = best?;
            choices.push(Choice {
                clause,
                best_start: starter.best_start,
                start_term: starter.start_term,
            });
        }
        self.metrics.choices_emitted = Some(choices.len() as u32);
        Some(Strategy::Neighborhood { choices })
    }

    /// No variables means nothing to ground; clauses are evaluated as-is.
    fn no_search(&self, variables: &Variables) -> Option<Strategy> {
        if variables.is_empty() {
            Some(Strategy::NoSearch)
        } else {
            None
        }
    }

    /// Anchors on the rarest link type occurring in any mandatory clause
    /// and enumerates every atom of exactly that type.
    fn link_type_search(&mut self, pattern: &Pattern) -> Option<Strategy> {
        let mut root: Option<Handle> = None;
        let mut starter_term: Option<Handle> = None;
        let mut count = usize::MAX;

        for clause in &pattern.mandatory {
            // Evaluatables do not, in general, exist in the graph.
            if pattern.evaluatable_holders.contains(clause) {
                continue;
            }
            let prev = count;
            self.find_rarest(clause, &mut starter_term, &mut count, Quotation::new());
            if count < prev {
                root = Some(clause.clone());
            }
        }

        // No link anywhere: every clause is a lone variable.
        let root = root?;
        let starter_term = starter_term?;

        debug!("link-type start clause: {}", root);
        debug!("link-type start term: {}", starter_term);

        let search_set = self.space.atoms_of_type(starter_term.atom_type());
        if search_set.is_empty() {
            return None;
        }
        Some(Strategy::LinkType {
            root,
            starter_term,
            search_set,
        })
    }

    /// The rarest link type within `clause`, by current population.
    /// Quotation markers are tracked; a consumable marker is not itself
    /// counted. Unquoted choice links are not descended, since their
    /// branches are alternatives rather than required structure.
    fn find_rarest(
        &self,
        clause: &Handle,
        rarest: &mut Option<Handle>,
        count: &mut usize,
        quotation: Quotation,
    ) {
        let t = clause.atom_type();
        if quotation.is_unquoted() && t.is_choice() {
            return;
        }
        if !clause.is_link() {
            return;
        }

        if !quotation.consumable(t) {
            let num = self.space.count_of_type(t);
            if num < *count {
                *count = num;
                *rarest = Some(clause.clone());
            }
        }

        let mut quotation = quotation;
        quotation.update(t);
        for child in clause.outgoing() {
            self.find_rarest(child, rarest, count, quotation);
        }
    }

    /// The last resort: enumerate atoms admitted by the narrowest variable
    /// type restriction.
    fn variable_type_search(
        &mut self,
        variables: &Variables,
        pattern: &Pattern,
    ) -> PlannerResult<Option<Strategy>> {
        let clauses = &pattern.mandatory;

        // When every clause is evaluatable there is no structure to walk;
        // the variable itself has to serve as the start term.
        let all_clauses_are_evaluatable = clauses
            .iter()
            .all(|cl| pattern.evaluatable_holders.contains(cl));

        let mut root: Option<Handle> = None;
        let mut starter_term: Option<Handle> = None;
        let mut count = usize::MAX;
        let mut ptypes: Vec<AtomType> = Vec::new();

        for var in variables.vars() {
            trace!("examine variable {}", var);

            if variables.deep_type(var).is_some() {
                warn!("deep type restrictions are not supported; ignoring {}", var);
                continue;
            }
            let Some(typeset) = variables.simple_types(var) else {
                continue;
            };

            let num: usize = typeset.iter().map(|t| self.space.count_of_type(*t)).sum();
            trace!("{} has {} admissible atoms", var, num);
            if num == 0 || num >= count {
                continue;
            }

            for clause in clauses {
                if !all_clauses_are_evaluatable && pattern.evaluatable_holders.contains(clause) {
                    continue;
                }

                if clause == var {
                    root = Some(clause.clone());
                    starter_term = Some(clause.clone());
                    count = num;
                    ptypes = typeset.iter().copied().sorted().collect();
                    trace!("new minimum count of {}", count);
                    break;
                }

                if let Some(holder) = least_holder(clause, var) {
                    root = Some(clause.clone());
                    starter_term = Some(if all_clauses_are_evaluatable {
                        var.clone()
                    } else {
                        holder
                    });
                    count = num;
                    ptypes = typeset.iter().copied().sorted().collect();
                    trace!("new minimum count of {} (nonroot)", count);
                    break;
                }
            }
        }

        if root.is_none() {
            if variables.has_deep_types() {
                warn!("deep type restrictions are not supported");
            } else {
                warn!("pattern has no type restrictions on any variable");
                for var in variables.vars() {
                    warn!("offending variable: {}", var);
                }
                for clause in clauses {
                    warn!("offending clause: {}", clause);
                }
                self.check_degenerate_guard(&pattern.body)?;
            }

            // All clauses optional: nowhere at all to start.
            if clauses.is_empty() {
                return Ok(None);
            }

            // Prefer a clause that can be walked structurally, letting any
            // evaluatable siblings be evaluated later.
            for clause in &pattern.mandatory {
                if !pattern.evaluatable_holders.contains(clause) {
                    root = Some(clause.clone());
                    starter_term = Some(clause.clone());
                    break;
                }
            }

            // Fail-safe when they are all evaluatable.
            if root.is_none() {
                let var = variables.vars().first().cloned().ok_or_else(|| {
                    PlannerError::Internal(
                        "variable-type search reached with no variables".to_string(),
                    )
                })?;
                root = Some(clauses[0].clone());
                starter_term = Some(var);
            }
        }

        let (Some(root), Some(starter_term)) = (root, starter_term) else {
            return Ok(None);
        };

        let search_set: Vec<Handle> = if ptypes.is_empty() {
            self.space.all_atoms().to_vec()
        } else {
            ptypes
                .iter()
                .flat_map(|t| self.space.atoms_of_type(*t))
                .collect()
        };
        if search_set.is_empty() {
            return Ok(None);
        }

        Ok(Some(Strategy::VariableType {
            root,
            starter_term,
            search_set,
        }))
    }

    /// Re-entering the degenerate path over and over with the same pattern
    /// is how runaway recursive rule systems present themselves.
    fn check_degenerate_guard(&mut self, body: &Handle) -> PlannerResult<()> {
        if self.degenerate_body.as_ref() == Some(body) {
            self.degenerate_count += 1;
            if self.degenerate_count > self.config.degenerate_replan_limit {
                return Err(PlannerError::InfiniteLoop(self.degenerate_count));
            }
        } else {
            self.degenerate_body = Some(body.clone());
            self.degenerate_count = 0;
        }
        Ok(())
    }
}

/// Plans and drives one search with a throwaway planner.
pub fn initiate_search(
    space: &AtomSpace,
    variables: &Variables,
    pattern: &Pattern,
    engine: &mut dyn MatchEngine,
) -> PlannerResult<bool> {
    let mut planner = SearchPlanner::new(space);
    planner.initiate_search(variables, pattern, engine)
}
