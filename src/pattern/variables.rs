//! The variable set of a pattern: which nodes are placeholders, and what
//! type restrictions they carry.

use std::collections::{HashMap, HashSet};

use crate::atomspace::{AtomType, Handle};

/// Declared variables plus their optional type restrictions.
///
/// Declaration order is preserved; it decides which variable the degenerate
/// fallback path picks. The simple type map restricts a variable to a set
/// of admissible atom types. A deep type map entry records a structural
/// type signature; the planner recognizes these but never exploits them.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    varset: Vec<Handle>,
    members: HashSet<Handle>,
    simple_typemap: HashMap<Handle, HashSet<AtomType>>,
    deep_typemap: HashMap<Handle, Handle>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, var: Handle) {
        if self.members.insert(var.clone()) {
            self.varset.push(var);
        }
    }

    pub fn restrict(&mut self, var: Handle, types: impl IntoIterator<Item = AtomType>) {
        self.declare(var.clone());
        self.simple_typemap
            .entry(var)
            .or_default()
            .extend(types);
    }

    pub fn restrict_deep(&mut self, var: Handle, signature: Handle) {
        self.declare(var.clone());
        self.deep_typemap.insert(var, signature);
    }

    pub fn contains(&self, h: &Handle) -> bool {
        self.members.contains(h)
    }

    pub fn is_empty(&self) -> bool {
        self.varset.is_empty()
    }

    pub fn len(&self) -> usize {
        self.varset.len()
    }

    /// Declared variables in declaration order.
    pub fn vars(&self) -> &[Handle] {
        &self.varset
    }

    pub fn simple_types(&self, var: &Handle) -> Option<&HashSet<AtomType>> {
        self.simple_typemap.get(var)
    }

    pub fn deep_type(&self, var: &Handle) -> Option<&Handle> {
        self.deep_typemap.get(var)
    }

    pub fn has_deep_types(&self) -> bool {
        !self.deep_typemap.is_empty()
    }

    /// Unions `other` into `self`. Restrictions already present win.
    pub fn extend(&mut self, other: &Variables) {
        for var in &other.varset {
            self.declare(var.clone());
        }
        for (var, types) in &other.simple_typemap {
            self.simple_typemap
                .entry(var.clone())
                .or_insert_with(|| types.clone());
        }
        for (var, sig) in &other.deep_typemap {
            self.deep_typemap
                .entry(var.clone())
                .or_insert_with(|| sig.clone());
        }
    }

    /// Harvests every variable and glob node occurring in `term`, in
    /// left-to-right order. Used for definitions that do not declare their
    /// variables explicitly.
    pub fn find_variables(term: &Handle) -> Variables {
        let mut vars = Variables::new();
        vars.harvest(term);
        vars
    }

    fn harvest(&mut self, term: &Handle) {
        let t = term.atom_type();
        if t.is_variable() || t.is_glob() {
            self.declare(term.clone());
        }
        for child in term.outgoing() {
            self.harvest(child);
        }
    }
}
