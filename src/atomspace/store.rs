//! The read-side store the planner borrows: structural interning plus the
//! indexes the planning heuristics consume (incoming sets and per-type
//! populations).

use std::collections::{HashMap, HashSet};

use super::{link, Atom, AtomType, Handle};

/// A typed hypergraph store.
///
/// Atoms are interned structurally; adding an equal term twice yields the
/// same canonical handle. Both the per-type index and the incoming sets
/// preserve insertion order, so enumeration is deterministic.
#[derive(Debug, Default)]
pub struct AtomSpace {
    atoms: HashSet<Handle>,
    order: Vec<Handle>,
    by_type: HashMap<AtomType, Vec<Handle>>,
    incoming: HashMap<Handle, Vec<Handle>>,
}

impl AtomSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `atom` and, recursively, its children. Returns the canonical
    /// handle for the term.
    pub fn add(&mut self, atom: &Handle) -> Handle {
        if let Some(existing) = self.atoms.get(atom) {
            return existing.clone();
        }
        let interned = match atom.as_ref() {
            Atom::Node { .. } => atom.clone(),
            Atom::Link { atom_type, outgoing } => {
                let children: Vec<Handle> = outgoing.iter().map(|c| self.add(c)).collect();
                link(*atom_type, children)
            }
        };
        self.atoms.insert(interned.clone());
        self.order.push(interned.clone());
        self.by_type
            .entry(interned.atom_type())
            .or_default()
            .push(interned.clone());
        for child in interned.outgoing() {
            self.incoming
                .entry(child.clone())
                .or_default()
                .push(interned.clone());
        }
        interned
    }

    pub fn add_node(&mut self, atom_type: AtomType, name: impl Into<String>) -> Handle {
        self.add(&super::node(atom_type, name))
    }

    pub fn add_link(&mut self, atom_type: AtomType, outgoing: Vec<Handle>) -> Handle {
        self.add(&link(atom_type, outgoing))
    }

    pub fn contains(&self, h: &Handle) -> bool {
        self.atoms.contains(h)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The links that directly contain `h` as a child. Empty for atoms that
    /// are absent from the store.
    pub fn incoming(&self, h: &Handle) -> &[Handle] {
        self.incoming.get(h).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming_size(&self, h: &Handle) -> usize {
        self.incoming(h).len()
    }

    /// Incoming links of exactly type `t`.
    pub fn incoming_filtered(&self, h: &Handle, t: AtomType) -> Vec<Handle> {
        self.incoming(h)
            .iter()
            .filter(|l| l.atom_type() == t)
            .cloned()
            .collect()
    }

    /// The current population of atoms of exactly type `t`.
    pub fn count_of_type(&self, t: AtomType) -> usize {
        self.by_type.get(&t).map(Vec::len).unwrap_or(0)
    }

    pub fn atoms_of_type(&self, t: AtomType) -> Vec<Handle> {
        self.by_type.get(&t).cloned().unwrap_or_default()
    }

    /// Every atom in the store, in insertion order.
    pub fn all_atoms(&self) -> &[Handle] {
        &self.order
    }

    /// Resolves a defined name to its definition body by scanning the
    /// name's incoming `Define` links. The first child of a `Define` is the
    /// name, the second is the definition.
    pub fn definition_of(&self, name: &Handle) -> Option<Handle> {
        self.incoming_filtered(name, AtomType::Define)
            .into_iter()
            .find(|d| d.outgoing().first() == Some(name))
            .and_then(|d| d.outgoing().get(1).cloned())
    }
}
