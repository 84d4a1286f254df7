//! Just-in-time expansion of defined terms.
//!
//! Definitions may not exist when a pattern is first built, and may change
//! between searches, so they are looked up at search time. Expansion is
//! one level per round, re-reading the clause bundle after each
//! substitution, until no defined names remain. A name whose expansion
//! brings itself back (directly or through another definition) is
//! diagnosed instead of looping.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::warn;

use crate::{
    atomspace::{link, Atom, AtomSpace, AtomType, Handle},
    error::{PlannerError, PlannerResult},
    pattern::{Pattern, Variables},
};

/// Expands all defined terms in `pattern`, returning the active variable
/// set, the active pattern, and the number of expansion rounds performed.
pub(crate) fn expand(
    space: &AtomSpace,
    variables: &Variables,
    pattern: &Pattern,
) -> PlannerResult<(Variables, Pattern, usize)> {
    if pattern.defined_terms.is_empty() {
        return Ok((variables.clone(), pattern.clone(), 0));
    }

    let mut vars = variables.clone();
    let mut pat = pattern.clone();
    let mut expanded: HashSet<Handle> = HashSet::new();
    let mut rounds = 0;

    while !pat.defined_terms.is_empty() {
        let mut substitutions: HashMap<Handle, Handle> = HashMap::new();
        for name in &pat.defined_terms {
            let Some(definition) = space.definition_of(name) else {
                warn!("no definition found for {}; leaving it unexpanded", name);
                continue;
            };
            if !expanded.insert(name.clone()) {
                return Err(PlannerError::RecursiveDefinition(name.to_string()));
            }

            // A lambda definition declares its variables; anything else
            // has its free variables harvested.
            let body = if definition.atom_type() == AtomType::Lambda {
                match definition.outgoing() {
                    [body] => body.clone(),
                    [decl, body] => {
                        vars.extend(&Variables::find_variables(decl));
                        body.clone()
                    }
                    _ => {
                        warn!("malformed lambda definition for {}; skipping", name);
                        continue;
                    }
                }
            } else {
                vars.extend(&Variables::find_variables(&definition));
                definition
            };
            substitutions.insert(name.clone(), body);
        }

        if substitutions.is_empty() {
            // Nothing left that can be expanded.
            break;
        }

        let new_body = substitute(&pat.body, &substitutions);
        pat = Pattern::compile(&new_body);
        rounds += 1;
    }

    Ok((vars, pat, rounds))
}

/// Rebuilds `term` with every occurrence of a mapped name replaced by its
/// definition body. Unchanged sub-terms are shared, not copied.
fn substitute(term: &Handle, map: &HashMap<Handle, Handle>) -> Handle {
    if let Some(replacement) = map.get(term) {
        return replacement.clone();
    }
    match term.as_ref() {
        Atom::Node { .. } => term.clone(),
        Atom::Link { atom_type, outgoing } => {
            let children: Vec<Handle> = outgoing.iter().map(|c| substitute(c, map)).collect();
            if children
                .iter()
                .zip(outgoing.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
            {
                term.clone()
            } else {
                link(*atom_type, children)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomspace::node;

    fn space_with_definition(definition: Handle) -> (AtomSpace, Handle) {
        let mut space = AtomSpace::new();
        let name = space.add_node(AtomType::DefinedPredicate, "DN");
        let definition = space.add(&definition);
        space.add_link(AtomType::Define, vec![name.clone(), definition]);
        (space, name)
    }

    #[test]
    fn expansion_reaches_a_fixed_point() {
        let defn = link(
            AtomType::Present,
            vec![node(AtomType::Concept, "C")],
        );
        let (space, name) = space_with_definition(defn.clone());

        let body = link(AtomType::And, vec![name]);
        let pattern = Pattern::compile(&body);
        assert!(!pattern.defined_terms.is_empty());

        let (_, expanded, rounds) = expand(&space, &Variables::new(), &pattern).unwrap();
        assert!(expanded.defined_terms.is_empty());
        assert_eq!(rounds, 1);
        assert_eq!(expanded.mandatory, vec![defn]);
    }

    #[test]
    fn lambda_definition_contributes_its_variables() {
        let x = node(AtomType::Variable, "$x");
        let defn = link(
            AtomType::Lambda,
            vec![
                x.clone(),
                link(
                    AtomType::Inheritance,
                    vec![x.clone(), node(AtomType::Concept, "C")],
                ),
            ],
        );
        let (space, name) = space_with_definition(defn);

        let body = link(AtomType::And, vec![name]);
        let pattern = Pattern::compile(&body);

        let (vars, expanded, _) = expand(&space, &Variables::new(), &pattern).unwrap();
        assert!(vars.contains(&x));
        assert!(expanded.defined_terms.is_empty());
        // The lambda wrapper is stripped; only its body survives.
        assert_eq!(expanded.mandatory.len(), 1);
        assert_eq!(expanded.mandatory[0].atom_type(), AtomType::Inheritance);
    }

    #[test]
    fn free_variables_are_harvested_without_a_lambda() {
        let y = node(AtomType::Variable, "$y");
        let defn = link(
            AtomType::Inheritance,
            vec![y.clone(), node(AtomType::Concept, "C")],
        );
        let (space, name) = space_with_definition(defn);

        let body = link(AtomType::And, vec![name]);
        let pattern = Pattern::compile(&body);

        let (vars, expanded, _) = expand(&space, &Variables::new(), &pattern).unwrap();
        assert!(vars.contains(&y));
        assert!(expanded.defined_terms.is_empty());
    }

    #[test]
    fn self_reference_is_an_error() {
        // DN expands to a term that mentions DN again.
        let name = node(AtomType::DefinedPredicate, "DN");
        let defn = link(AtomType::And, vec![name.clone()]);
        let (space, name) = {
            let mut space = AtomSpace::new();
            let name = space.add(&name);
            let defn = space.add(&defn);
            space.add_link(AtomType::Define, vec![name.clone(), defn]);
            (space, name)
        };

        let body = link(AtomType::And, vec![name]);
        let pattern = Pattern::compile(&body);

        let err = expand(&space, &Variables::new(), &pattern).unwrap_err();
        assert!(matches!(err, PlannerError::RecursiveDefinition(_)));
    }

    #[test]
    fn undefined_names_stop_the_loop() {
        let mut space = AtomSpace::new();
        let name = space.add_node(AtomType::DefinedPredicate, "nowhere");

        let body = link(AtomType::And, vec![name.clone()]);
        let pattern = Pattern::compile(&body);

        let (_, expanded, rounds) = expand(&space, &Variables::new(), &pattern).unwrap();
        assert_eq!(rounds, 0);
        assert!(expanded.defined_terms.contains(&name));
    }

    #[test]
    fn chained_definitions_expand_over_rounds() {
        let mut space = AtomSpace::new();
        let outer = space.add_node(AtomType::DefinedPredicate, "outer");
        let inner = space.add_node(AtomType::DefinedPredicate, "inner");
        let inner_defn = {
            let c = space.add_node(AtomType::Concept, "C");
            space.add_link(AtomType::Present, vec![c])
        };
        // `outer` is defined as a bare reference to `inner`.
        space.add_link(AtomType::Define, vec![outer.clone(), inner.clone()]);
        space.add_link(AtomType::Define, vec![inner.clone(), inner_defn.clone()]);

        let body = link(AtomType::And, vec![outer]);
        let pattern = Pattern::compile(&body);

        let (_, expanded, rounds) = expand(&space, &Variables::new(), &pattern).unwrap();
        assert_eq!(rounds, 2);
        assert!(expanded.defined_terms.is_empty());
        assert_eq!(expanded.mandatory, vec![inner_defn]);
    }
}
