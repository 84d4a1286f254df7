//! Finding the constant atom at which to anchor a neighborhood search.
//!
//! In principle any constant in a clause would do: every grounding of the
//! clause must contain that constant, so walking its incoming set finds
//! every candidate. In practice the choice matters enormously. A typical
//! clause
//!
//! ```text
//! (Evaluation (Predicate "blah") (List (Variable "$x") (Concept "item")))
//! ```
//!
//! may have tens of thousands of incoming links on the predicate but only
//! a handful on the concept. The finder therefore walks the clause to its
//! full depth and greedily keeps the constant with the smallest incoming
//! set, breaking ties toward the more deeply nested constant, whose
//! structural context is more constrained.
//!
//! Atoms inside evaluatable sub-terms are never considered; groundings for
//! those might not exist at all. Variable and glob nodes are placeholders,
//! never anchors.

use std::collections::HashSet;

use crate::atomspace::{AtomSpace, Handle};

/// A candidate anchor: the constant to start at, the enclosing sub-term
/// whose incoming set will be enumerated, and the cost metrics that won it
/// the selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Starter {
    pub best_start: Handle,
    /// The link enclosing `best_start`. `None` when the starter is a bare
    /// node clause or a bare node branch of a choice.
    pub start_term: Option<Handle>,
    /// Nesting depth at which the starter was found.
    pub depth: usize,
    /// Incoming-set size of the starter.
    pub width: usize,
}

/// One independent starting neighborhood. A clause without choice
/// sub-terms produces exactly one; each branch of a choice produces its
/// own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub clause: Handle,
    pub best_start: Handle,
    pub start_term: Option<Handle>,
}

/// Walks clauses for the thinnest constant anchor, accumulating one
/// `Choice` per branch wherever a choice link splits the clause into
/// alternative sub-patterns.
pub(crate) struct StarterFinder<'a> {
    space: &'a AtomSpace,
    evaluatable: &'a HashSet<Handle>,
    choices: Vec<Choice>,
}

impl<'a> StarterFinder<'a> {
    pub fn new(space: &'a AtomSpace, evaluatable: &'a HashSet<Handle>) -> Self {
        Self {
            space,
            evaluatable,
            choices: Vec::new(),
        }
    }

    pub fn into_choices(self) -> Vec<Choice> {
        self.choices
    }

    /// Picks one clause out of `clauses` to anchor the whole search: the
    /// clause whose starter has the smallest incoming set, ties broken by
    /// greater depth. Clauses holding evaluatable sub-terms are skipped
    /// entirely.
    pub fn find_thinnest(
        &mut self,
        clauses: &[Handle],
        evaluatable_holders: &HashSet<Handle>,
    ) -> Option<(Handle, Starter)> {
        self.choices.clear();
        let mut best: Option<(Handle, Starter)> = None;
        for clause in clauses {
            if evaluatable_holders.contains(clause) {
                continue;
            }
            let Some(starter) = self.find_starter(clause) else {
                continue;
            };
            let better = best.as_ref().map_or(true, |(_, b)| {
                starter.width < b.width || (starter.width == b.width && starter.depth > b.depth)
            });
            if better {
                best = Some((clause.clone(), starter));
            }
        }
        best
    }

    /// Finds the best anchor within a single clause. Returns `None` when
    /// the clause offers nowhere to start: all variables, or all
    /// evaluatable.
    pub fn find_starter(&mut self, clause: &Handle) -> Option<Starter> {
        if clause.is_node() {
            return self.node_starter(clause, 0, None);
        }
        self.find_recursive(clause, clause, 0, None)
    }

    fn node_starter(
        &self,
        h: &Handle,
        depth: usize,
        enclosing: Option<&Handle>,
    ) -> Option<Starter> {
        let t = h.atom_type();
        if t.is_variable() || t.is_glob() {
            return None;
        }
        Some(Starter {
            best_start: h.clone(),
            start_term: enclosing.cloned(),
            depth,
            width: self.space.incoming_size(h),
        })
    }

    fn find_recursive(
        &mut self,
        clause: &Handle,
        h: &Handle,
        depth: usize,
        enclosing: Option<&Handle>,
    ) -> Option<Starter> {
        if h.is_node() {
            return self.node_starter(h, depth, enclosing);
        }
        // Never start inside a dynamically-evaluated term.
        if self.evaluatable.contains(h) {
            return None;
        }

        let t = h.atom_type();
        let mut best: Option<Starter> = None;
        for child in h.outgoing() {
            // The start term must sit above or below a choice link, never
            // be one.
            let enclosing_for_child = if t.is_choice() { enclosing } else { Some(h) };

            // Quotation markers are transparent here; they only matter to
            // the matcher.
            let child = if child.atom_type().is_quotation() {
                match child.outgoing().first() {
                    Some(inner) => inner.clone(),
                    None => continue,
                }
            } else {
                child.clone()
            };

            let Some(starter) = self.find_recursive(clause, &child, depth + 1, enclosing_for_child)
            else {
                continue;
            };

            if t.is_choice() {
                // Branches of a choice may be disconnected sub-patterns;
                // each seeds its own neighborhood instead of competing for
                // a single winner.
                self.push_choice(Choice {
                    clause: clause.clone(),
                    best_start: starter.best_start,
                    start_term: starter.start_term,
                });
            } else if best.as_ref().map_or(true, |b| {
                starter.width < b.width || (starter.width == b.width && starter.depth > b.depth)
            }) {
                best = Some(starter);
            }
        }
        best
    }

    fn push_choice(&mut self, choice: Choice) {
        if !self.choices.contains(&choice) {
            self.choices.push(choice);
        }
    }
}

/// The innermost link within `term` that directly contains `target`.
pub(crate) fn least_holder(term: &Handle, target: &Handle) -> Option<Handle> {
    if !term.is_link() {
        return None;
    }
    for child in term.outgoing() {
        if let Some(holder) = least_holder(child, target) {
            return Some(holder);
        }
    }
    if term.outgoing().contains(target) {
        return Some(term.clone());
    }
    None
}
