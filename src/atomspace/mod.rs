//! The atom model: typed nodes and links forming a hypergraph.
//!
//! An atom is either a named node or a link over an ordered sequence of
//! child atoms. Handles are reference-counted and compare structurally, so
//! a term built by a caller unifies with the store's copy of the same term
//! without going through the store first.

mod store;

use std::{fmt, sync::Arc};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub use store::AtomSpace;

/// A shared reference to an atom. Equality and hashing are structural.
pub type Handle = Arc<Atom>;

/// The closed set of atom type tags.
///
/// Every structural predicate the planner needs (`is_node`, `is_variable`,
/// `is_choice`, ...) is a comparison on this tag.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AtomType {
    // Node types
    Concept,
    Predicate,
    GroundedPredicate,
    Number,
    Variable,
    Glob,
    DefinedPredicate,
    // Link types
    List,
    Evaluation,
    Inheritance,
    And,
    Present,
    Absent,
    Choice,
    Quote,
    Unquote,
    LocalQuote,
    Lambda,
    Define,
    GreaterThan,
}

impl AtomType {
    pub fn is_node(self) -> bool {
        matches!(
            self,
            AtomType::Concept
                | AtomType::Predicate
                | AtomType::GroundedPredicate
                | AtomType::Number
                | AtomType::Variable
                | AtomType::Glob
                | AtomType::DefinedPredicate
        )
    }

    pub fn is_link(self) -> bool {
        !self.is_node()
    }

    pub fn is_variable(self) -> bool {
        self == AtomType::Variable
    }

    pub fn is_glob(self) -> bool {
        self == AtomType::Glob
    }

    pub fn is_choice(self) -> bool {
        self == AtomType::Choice
    }

    /// Quotation markers: transparent to planning, opaque to matching.
    pub fn is_quotation(self) -> bool {
        matches!(
            self,
            AtomType::Quote | AtomType::Unquote | AtomType::LocalQuote
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            AtomType::Concept => "Concept",
            AtomType::Predicate => "Predicate",
            AtomType::GroundedPredicate => "GroundedPredicate",
            AtomType::Number => "Number",
            AtomType::Variable => "Variable",
            AtomType::Glob => "Glob",
            AtomType::DefinedPredicate => "DefinedPredicate",
            AtomType::List => "List",
            AtomType::Evaluation => "Evaluation",
            AtomType::Inheritance => "Inheritance",
            AtomType::And => "And",
            AtomType::Present => "Present",
            AtomType::Absent => "Absent",
            AtomType::Choice => "Choice",
            AtomType::Quote => "Quote",
            AtomType::Unquote => "Unquote",
            AtomType::LocalQuote => "LocalQuote",
            AtomType::Lambda => "Lambda",
            AtomType::Define => "Define",
            AtomType::GreaterThan => "GreaterThan",
        }
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A node with a name, or a link over an ordered sequence of children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Atom {
    Node { atom_type: AtomType, name: String },
    Link { atom_type: AtomType, outgoing: Vec<Handle> },
}

impl Atom {
    pub fn atom_type(&self) -> AtomType {
        match self {
            Atom::Node { atom_type, .. } => *atom_type,
            Atom::Link { atom_type, .. } => *atom_type,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Atom::Node { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Atom::Link { .. })
    }

    /// The children of a link; empty for nodes.
    pub fn outgoing(&self) -> &[Handle] {
        match self {
            Atom::Node { .. } => &[],
            Atom::Link { outgoing, .. } => outgoing,
        }
    }

    pub fn node_name(&self) -> Option<&str> {
        match self {
            Atom::Node { name, .. } => Some(name),
            Atom::Link { .. } => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Node { atom_type, name } => write!(f, "({} \"{}\")", atom_type, name),
            Atom::Link { atom_type, outgoing } => {
                if outgoing.is_empty() {
                    write!(f, "({})", atom_type)
                } else {
                    write!(f, "({} {})", atom_type, outgoing.iter().format(" "))
                }
            }
        }
    }
}

/// Creates a node handle. The `name` can be `&str, String, ...`
pub fn node(atom_type: AtomType, name: impl Into<String>) -> Handle {
    Arc::new(Atom::Node {
        atom_type,
        name: name.into(),
    })
}

/// Creates a link handle over the given children.
pub fn link(atom_type: AtomType, outgoing: Vec<Handle>) -> Handle {
    Arc::new(Atom::Link {
        atom_type,
        outgoing,
    })
}

/// Tracks quotation depth while walking a term tree.
///
/// A `Quote` raises the level, an `Unquote` lowers it, and a `LocalQuote`
/// quotes only its immediate child. A marker is consumable when it is doing
/// its job at the current level rather than being quoted data itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Quotation {
    level: u32,
    local: bool,
}

impl Quotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_quoted(&self) -> bool {
        self.local || self.level != 0
    }

    pub fn is_unquoted(&self) -> bool {
        !self.is_quoted()
    }

    pub fn consumable(&self, t: AtomType) -> bool {
        (self.is_unquoted() && matches!(t, AtomType::Quote | AtomType::LocalQuote))
            || (self.level == 1 && t == AtomType::Unquote)
    }

    /// Advances the state across a term of type `t`, descending one level.
    pub fn update(&mut self, t: AtomType) {
        if t.is_quotation() {
            if self.consumable(t) {
                match t {
                    AtomType::Quote => self.level += 1,
                    AtomType::Unquote => self.level -= 1,
                    AtomType::LocalQuote => self.local = true,
                    _ => {}
                }
            } else {
                // Quotation markers nested inside quoted data.
                match t {
                    AtomType::Quote => self.level += 1,
                    AtomType::Unquote => self.level = self.level.saturating_sub(1),
                    _ => {}
                }
                self.local = false;
            }
        } else if self.local {
            self.local = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_predicates() {
        assert!(AtomType::Concept.is_node());
        assert!(AtomType::Variable.is_variable());
        assert!(AtomType::Glob.is_glob());
        assert!(!AtomType::Variable.is_link());
        assert!(AtomType::List.is_link());
        assert!(AtomType::Choice.is_choice());
        assert!(AtomType::Quote.is_quotation());
        assert!(AtomType::LocalQuote.is_quotation());
        assert!(!AtomType::List.is_quotation());
    }

    #[test]
    fn structural_equality() {
        let a = link(
            AtomType::List,
            vec![node(AtomType::Concept, "x"), node(AtomType::Concept, "y")],
        );
        let b = link(
            AtomType::List,
            vec![node(AtomType::Concept, "x"), node(AtomType::Concept, "y")],
        );
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn display_renders_prefix_form() {
        let term = link(
            AtomType::Evaluation,
            vec![
                node(AtomType::Predicate, "blah"),
                link(
                    AtomType::List,
                    vec![
                        node(AtomType::Variable, "$x"),
                        node(AtomType::Concept, "item"),
                    ],
                ),
            ],
        );
        assert_eq!(
            term.to_string(),
            "(Evaluation (Predicate \"blah\") (List (Variable \"$x\") (Concept \"item\")))"
        );
    }

    #[test]
    fn quotation_consume_and_restore() {
        let mut q = Quotation::new();
        assert!(q.is_unquoted());
        assert!(q.consumable(AtomType::Quote));

        q.update(AtomType::Quote);
        assert!(q.is_quoted());
        // A Quote inside quoted data is no longer consumable.
        assert!(!q.consumable(AtomType::Quote));
        assert!(q.consumable(AtomType::Unquote));

        q.update(AtomType::Unquote);
        assert!(q.is_unquoted());
    }

    #[test]
    fn local_quote_covers_one_term() {
        let mut q = Quotation::new();
        q.update(AtomType::LocalQuote);
        assert!(q.is_quoted());
        q.update(AtomType::List);
        assert!(q.is_unquoted());
    }
}
