//! Durable cross-unit store: SymbolId -> accumulated reference locations,
//! aggregated across many unit merges over the store's lifetime.
//!
//! Backed by embedded SQLite.  Concurrent invocations sharing one store path
//! are serialized by SQLite's own file locking together with the busy
//! timeout set at open; within one process the store has a single owner.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::errors::{IndexError, Result};
use crate::file_format::location::RefLocation;
use crate::file_format::unit_index::UnitIndex;

pub struct XrefStore {
    conn: Connection,
    path: PathBuf,
}

impl XrefStore {
    /// Open an existing store or create an empty one at `path`.  Sets WAL
    /// mode and a busy timeout; schema creation is idempotent.
    pub fn open(path: &Path) -> Result<XrefStore> {
        let conn = Connection::open(path).map_err(|e| IndexError::store(path, "open", e))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")
            .map_err(|e| IndexError::store(path, "open", e))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS xrefs (
                 sym TEXT NOT NULL,
                 loc TEXT NOT NULL,
                 PRIMARY KEY (sym, loc)
             ) WITHOUT ROWID;",
        )
        .map_err(|e| IndexError::store(path, "open", e))?;
        Ok(XrefStore {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Add every location in `locs` to the store's entry for `sym`, creating
    /// the entry if absent.  Runs in a single transaction, so one merge call
    /// lands entirely or not at all.  Existing rows are never removed or
    /// overwritten; re-merging is idempotent.
    pub fn merge(&mut self, sym: &str, locs: &BTreeSet<RefLocation>) -> Result<()> {
        let path = self.path.clone();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| IndexError::store(&path, "merge", e))?;
        {
            let mut stmt = tx
                .prepare_cached("INSERT OR IGNORE INTO xrefs (sym, loc) VALUES (?1, ?2)")
                .map_err(|e| IndexError::store(&path, "merge", e))?;
            for loc in locs {
                stmt.execute(params![sym, loc.to_string()])
                    .map_err(|e| IndexError::store(&path, "merge", e))?;
            }
        }
        tx.commit()
            .map_err(|e| IndexError::store(&path, "merge", e))
    }

    /// Merge a whole unit's index in one transaction.
    pub fn merge_index(&mut self, index: &UnitIndex) -> Result<()> {
        let path = self.path.clone();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| IndexError::store(&path, "merge", e))?;
        {
            let mut stmt = tx
                .prepare_cached("INSERT OR IGNORE INTO xrefs (sym, loc) VALUES (?1, ?2)")
                .map_err(|e| IndexError::store(&path, "merge", e))?;
            for (sym, locs) in index.iter() {
                for loc in locs {
                    stmt.execute(params![sym, loc.to_string()])
                        .map_err(|e| IndexError::store(&path, "merge", e))?;
                }
            }
        }
        tx.commit()
            .map_err(|e| IndexError::store(&path, "merge", e))
    }

    /// Read back the accumulated location set for one symbol.  Empty set for
    /// unknown symbols.
    pub fn locations(&self, sym: &str) -> Result<BTreeSet<RefLocation>> {
        let mut stmt = self
            .conn
            .prepare("SELECT loc FROM xrefs WHERE sym = ?1")
            .map_err(|e| IndexError::store(&self.path, "read", e))?;
        let rows = stmt
            .query_map([sym], |row| row.get::<_, String>(0))
            .map_err(|e| IndexError::store(&self.path, "read", e))?;
        let mut locs = BTreeSet::new();
        for row in rows {
            let raw = row.map_err(|e| IndexError::store(&self.path, "read", e))?;
            let loc: RefLocation = raw
                .parse()
                .map_err(|e: String| IndexError::store(&self.path, "read", e))?;
            locs.insert(loc);
        }
        Ok(locs)
    }

    /// Flush and release the store.  A close failure is reported, not
    /// swallowed.
    pub fn close(self) -> Result<()> {
        let XrefStore { conn, path } = self;
        conn.close()
            .map_err(|(_conn, e)| IndexError::store(&path, "close", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locs(raw: &[&str]) -> BTreeSet<RefLocation> {
        raw.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_merge_accumulates_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("xrefs.db");

        let mut store = XrefStore::open(&db).unwrap();
        store
            .merge("c:@F@f#", &locs(&["a.c:10:3:call", "a.c:12:7:call"]))
            .unwrap();
        store.merge("c:@F@f#", &locs(&["b.c:4:1:call"])).unwrap();
        assert_eq!(
            store.locations("c:@F@f#").unwrap(),
            locs(&["a.c:10:3:call", "a.c:12:7:call", "b.c:4:1:call"])
        );
        store.close().unwrap();
    }

    #[test]
    fn test_merge_is_idempotent_and_commutative() {
        let dir = tempfile::tempdir().unwrap();
        let one = locs(&["a.c:10:3:call"]);
        let two = locs(&["b.c:4:1:call", "a.c:10:3:call"]);
        let union = locs(&["a.c:10:3:call", "b.c:4:1:call"]);

        let forward = dir.path().join("forward.db");
        let mut store = XrefStore::open(&forward).unwrap();
        store.merge("s", &one).unwrap();
        store.merge("s", &two).unwrap();
        store.merge("s", &two).unwrap();
        assert_eq!(store.locations("s").unwrap(), union);
        store.close().unwrap();

        let reverse = dir.path().join("reverse.db");
        let mut store = XrefStore::open(&reverse).unwrap();
        store.merge("s", &two).unwrap();
        store.merge("s", &one).unwrap();
        assert_eq!(store.locations("s").unwrap(), union);
        store.close().unwrap();
    }

    #[test]
    fn test_entries_persist_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("xrefs.db");

        let mut store = XrefStore::open(&db).unwrap();
        store.merge("c:@F@f#", &locs(&["a.c:10:3:call"])).unwrap();
        store.close().unwrap();

        let store = XrefStore::open(&db).unwrap();
        assert_eq!(
            store.locations("c:@F@f#").unwrap(),
            locs(&["a.c:10:3:call"])
        );
        assert!(store.locations("c:@F@missing#").unwrap().is_empty());
        store.close().unwrap();
    }

    #[test]
    fn test_merge_index_covers_every_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("xrefs.db");

        let mut index = UnitIndex::new();
        index.insert("c:@F@f#", "a.c:10:3:call".parse().unwrap());
        index.insert("c:@S@point", "a.c:3:1:type".parse().unwrap());

        let mut store = XrefStore::open(&db).unwrap();
        store.merge_index(&index).unwrap();
        assert_eq!(store.locations("c:@F@f#").unwrap().len(), 1);
        assert_eq!(store.locations("c:@S@point").unwrap().len(), 1);
        store.close().unwrap();
    }

    #[test]
    fn test_open_fails_on_unwritable_path() {
        let err = XrefStore::open(Path::new("/nonexistent-dir/xrefs.db"));
        match err {
            Err(IndexError::Store(_)) => {}
            _ => panic!("expected store failure"),
        }
    }
}
