//! The pattern model: the clause bundle the planner works against.
//!
//! A pattern is compiled from a body term. An `And` body contributes one
//! clause per child; any other body is a single clause. `Absent` clauses
//! are optional (they may legitimately have no grounding). Compilation
//! also classifies which sub-terms are evaluatable, which clauses hold
//! them, and which defined names still need just-in-time expansion.

mod variables;

use std::collections::HashSet;

use crate::atomspace::{AtomType, Handle};

pub use variables::Variables;

/// An immutable clause bundle. Replaced wholesale when the expander
/// substitutes defined terms.
#[derive(Clone, Debug)]
pub struct Pattern {
    /// The term the pattern was compiled from.
    pub body: Handle,
    /// Clauses that must be grounded.
    pub mandatory: Vec<Handle>,
    /// Clauses that may be absent from the graph.
    pub optionals: Vec<Handle>,
    /// Sub-terms whose truth is computed rather than looked up. Their
    /// groundings need not exist, so search never starts inside one.
    pub evaluatable_terms: HashSet<Handle>,
    /// Every term, up to and including its clause, that contains an
    /// evaluatable sub-term.
    pub evaluatable_holders: HashSet<Handle>,
    /// Defined names awaiting expansion.
    pub defined_terms: HashSet<Handle>,
}

impl Pattern {
    /// Compiles a body term into a clause bundle.
    pub fn compile(body: &Handle) -> Self {
        let clauses: Vec<Handle> = if body.atom_type() == AtomType::And {
            body.outgoing().to_vec()
        } else {
            vec![body.clone()]
        };

        let mut mandatory = Vec::new();
        let mut optionals = Vec::new();
        for clause in clauses {
            if clause.atom_type() == AtomType::Absent {
                optionals.extend(clause.outgoing().iter().cloned());
            } else {
                mandatory.push(clause);
            }
        }

        let mut evaluatable_terms = HashSet::new();
        let mut evaluatable_holders = HashSet::new();
        for clause in mandatory.iter().chain(optionals.iter()) {
            let mut path = Vec::new();
            classify(clause, &mut path, &mut evaluatable_terms, &mut evaluatable_holders);
        }

        let mut defined_terms = HashSet::new();
        collect_defined(body, &mut defined_terms);

        Pattern {
            body: body.clone(),
            mandatory,
            optionals,
            evaluatable_terms,
            evaluatable_holders,
            defined_terms,
        }
    }
}

/// A term is evaluatable when its truth comes from evaluation: an
/// inherently evaluatable link type, or an `Evaluation` headed by a
/// grounded predicate.
fn is_evaluatable(term: &Handle) -> bool {
    match term.atom_type() {
        AtomType::GreaterThan => true,
        AtomType::Evaluation => term
            .outgoing()
            .first()
            .is_some_and(|h| h.atom_type() == AtomType::GroundedPredicate),
        _ => false,
    }
}

fn classify(
    term: &Handle,
    path: &mut Vec<Handle>,
    evaluatable_terms: &mut HashSet<Handle>,
    evaluatable_holders: &mut HashSet<Handle>,
) {
    if is_evaluatable(term) {
        evaluatable_terms.insert(term.clone());
        evaluatable_holders.insert(term.clone());
        for holder in path.iter() {
            evaluatable_holders.insert(holder.clone());
        }
        return;
    }
    if term.is_link() {
        path.push(term.clone());
        for child in term.outgoing() {
            classify(child, path, evaluatable_terms, evaluatable_holders);
        }
        path.pop();
    }
}

fn collect_defined(term: &Handle, defined: &mut HashSet<Handle>) {
    if term.atom_type() == AtomType::DefinedPredicate {
        defined.insert(term.clone());
    }
    for child in term.outgoing() {
        collect_defined(child, defined);
    }
}
