//! The traversal filter: turns the front end's visitation events into a
//! [`UnitIndex`] scoped to one translation unit's primary file.

use crate::file_format::location::RefLocation;
use crate::file_format::unit_index::UnitIndex;
use crate::frontend::{Node, ParsedUnit, VisitResult, Visitor};

/// Records, for every node physically inside the primary file, the symbol it
/// references.  Holds no state beyond the primary file path and the index
/// under construction.
pub struct UnitIndexer {
    unit_path: String,
    index: UnitIndex,
}

impl UnitIndexer {
    pub fn new(unit_path: &str) -> UnitIndexer {
        UnitIndexer {
            unit_path: unit_path.to_string(),
            index: UnitIndex::new(),
        }
    }

    pub fn into_index(self) -> UnitIndex {
        self.index
    }
}

impl Visitor for UnitIndexer {
    fn visit(&mut self, node: &Node, _parent: Option<&Node>) -> VisitResult {
        // Nodes with no physical location (builtins, synthesized) and nodes
        // physically outside the primary file prune their whole subtree;
        // references occurring only in included files stay attributed to the
        // units that own those files.
        let loc = match &node.loc {
            Some(loc) if loc.path == self.unit_path => loc,
            _ => return VisitResult::Continue,
        };

        // Inside the primary file we always recurse, whether or not this
        // particular node is recordable.
        if let Some(referenced) = &node.referenced {
            if referenced.loc.is_some() && !referenced.sym.is_empty() {
                self.index.insert(
                    &referenced.sym,
                    RefLocation {
                        path: loc.path.clone(),
                        lineno: loc.lineno,
                        col: loc.col,
                        kind: node.kind,
                    },
                );
            }
        }
        VisitResult::Recurse
    }
}

/// Run the filter over the whole unit and hand the finished index out by
/// value; the index is never mutated after this returns.
pub fn build_unit_index(unit: &dyn ParsedUnit, unit_path: &str) -> UnitIndex {
    let mut indexer = UnitIndexer::new(unit_path);
    unit.visit_children(&mut indexer);
    indexer.into_index()
}
