//! The one-unit write path: diagnostics gate, traversal, compressed
//! artifact, store merge.
//!
//! This logic was extracted out from `unit-crossref.rs` so the whole pipeline
//! can be driven from tests without spawning the binary.

use std::fs::File;
use std::path::Path;

use crate::errors::{IndexError, Result};
use crate::file_format::compressed_index::write_index;
use crate::frontend::{has_errors, ParsedUnit};
use crate::store::XrefStore;
use crate::unit_visitor::build_unit_index;

/// Index one translation unit: build its reference index, write the
/// compressed per-unit artifact to `index_path`, then merge the same index
/// into the store at `store_path`.
///
/// A unit with error or fatal diagnostics produces nothing: no artifact is
/// written and the store is never opened.  A serialization failure likewise
/// leaves the store exactly as it was, since the merge only happens after
/// the artifact is complete.
pub fn index_unit(
    unit: &dyn ParsedUnit,
    unit_path: &str,
    index_path: &Path,
    store_path: &Path,
) -> Result<()> {
    if has_errors(unit.diagnostics()) {
        return Err(IndexError::diagnostics(
            unit_path,
            "unit has error or fatal diagnostics; refusing to index",
        ));
    }

    let index = build_unit_index(unit, unit_path);
    info!(
        "indexed {} symbols from {}",
        index.len(),
        unit_path
    );

    let sink = File::create(index_path).map_err(|e| {
        IndexError::serialization("create index file", format!("{}: {}", index_path.display(), e))
    })?;
    write_index(&index, sink)?;

    let mut store = XrefStore::open(store_path)?;
    store.merge_index(&index)?;
    store.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_format::compressed_index::read_index;
    use crate::frontend::tree_dump::TreeDumpUnit;
    use crate::unit_visitor::build_unit_index;

    const CLEAN_UNIT: &str = r#"{
        "diagnostics": [{"severity": "warning", "message": "unused variable"}],
        "nodes": [
            {"loc": "a.c:10:3", "kind": "call",
             "ref": {"sym": "c:@F@f#", "loc": "a.c:2:5"}},
            {"loc": "a.c:12:7", "kind": "call",
             "ref": {"sym": "c:@F@f#", "loc": "a.c:2:5"}}
        ]
    }"#;

    const BROKEN_UNIT: &str = r#"{
        "diagnostics": [{"severity": "error", "message": "unknown type name"}],
        "nodes": [
            {"loc": "a.c:10:3", "kind": "call",
             "ref": {"sym": "c:@F@f#", "loc": "a.c:2:5"}}
        ]
    }"#;

    #[test]
    fn test_full_write_path() {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("a.c.idx.gz");
        let store_path = dir.path().join("xrefs.db");

        let unit = TreeDumpUnit::from_str(CLEAN_UNIT).unwrap();
        index_unit(&unit, "a.c", &index_path, &store_path).unwrap();

        // The artifact round-trips to the same index the traversal built.
        let artifact = read_index(std::fs::File::open(&index_path).unwrap()).unwrap();
        assert_eq!(artifact, build_unit_index(&unit, "a.c"));

        let store = XrefStore::open(&store_path).unwrap();
        assert_eq!(store.locations("c:@F@f#").unwrap().len(), 2);
        store.close().unwrap();
    }

    #[test]
    fn test_error_diagnostics_produce_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("a.c.idx.gz");
        let store_path = dir.path().join("xrefs.db");

        let unit = TreeDumpUnit::from_str(BROKEN_UNIT).unwrap();
        match index_unit(&unit, "a.c", &index_path, &store_path) {
            Err(IndexError::Diagnostics(_)) => {}
            other => panic!("expected diagnostics failure, got {:?}", other),
        }
        assert!(!index_path.exists());
        assert!(!store_path.exists());
    }

    #[test]
    fn test_serialization_failure_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("missing-dir").join("a.c.idx.gz");
        let store_path = dir.path().join("xrefs.db");

        let unit = TreeDumpUnit::from_str(CLEAN_UNIT).unwrap();
        match index_unit(&unit, "a.c", &index_path, &store_path) {
            Err(IndexError::Serialization(_)) => {}
            other => panic!("expected serialization failure, got {:?}", other),
        }
        assert!(!store_path.exists());
    }

    #[test]
    fn test_two_units_union_in_store() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("xrefs.db");

        let second_unit = r#"{
            "nodes": [
                {"loc": "b.c:4:1", "kind": "call",
                 "ref": {"sym": "c:@F@f#", "loc": "a.c:2:5"}}
            ]
        }"#;

        let unit_a = TreeDumpUnit::from_str(CLEAN_UNIT).unwrap();
        let unit_b = TreeDumpUnit::from_str(second_unit).unwrap();
        index_unit(&unit_a, "a.c", &dir.path().join("a.idx.gz"), &store_path).unwrap();
        index_unit(&unit_b, "b.c", &dir.path().join("b.idx.gz"), &store_path).unwrap();

        let store = XrefStore::open(&store_path).unwrap();
        let merged: Vec<String> = store
            .locations("c:@F@f#")
            .unwrap()
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(
            merged,
            ["a.c:10:3:call", "a.c:12:7:call", "b.c:4:1:call"]
        );
        store.close().unwrap();
    }
}
