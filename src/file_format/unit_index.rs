use std::collections::btree_map;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use super::location::RefLocation;

/// Reverse index for one analyzed unit: SymbolId -> the deduplicated set of
/// locations in that unit which reference the symbol.  Created empty at the
/// start of processing, populated only by the traversal filter, then handed
/// off by value to the serializer and the store merge.
///
/// Iteration is in sorted symbol order with each location set in canonical
/// string order, so everything downstream is deterministic.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UnitIndex {
    map: BTreeMap<String, BTreeSet<RefLocation>>,
}

impl UnitIndex {
    pub fn new() -> UnitIndex {
        UnitIndex {
            map: BTreeMap::new(),
        }
    }

    /// Record one reference.  Set semantics: inserting the same location
    /// twice for the same symbol is a no-op.  An empty SymbolId is never
    /// recorded as a key.
    pub fn insert(&mut self, sym: &str, loc: RefLocation) {
        if sym.is_empty() {
            return;
        }
        self.map
            .entry(sym.to_string())
            .or_insert_with(BTreeSet::new)
            .insert(loc);
    }

    pub fn locations(&self, sym: &str) -> Option<&BTreeSet<RefLocation>> {
        self.map.get(sym)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, BTreeSet<RefLocation>> {
        self.map.iter()
    }

    /// Number of symbols (not locations) in the index.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
