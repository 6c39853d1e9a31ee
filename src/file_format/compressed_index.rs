//! Serialized form of a [`UnitIndex`]: newline-delimited JSON records, one
//! per symbol, gzip-compressed as a whole stream.  Compression is applied to
//! the stream rather than per record because the entropy reduction comes from
//! the repeated path prefixes across many records.

use std::io::Read;
use std::io::Write;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use super::location::RefLocation;
use super::unit_index::UnitIndex;
use crate::errors::{IndexError, Result};

/// One line of the artifact.  `refs` holds canonical location strings in
/// their canonical order.
#[derive(Serialize, Deserialize)]
struct IndexRecord {
    sym: String,
    refs: Vec<String>,
}

/// Write the index to `sink` as a gzipped stream.  Symbols come out in
/// sorted order, so serializing the same index twice produces identical
/// bytes.
pub fn write_index<W: Write>(index: &UnitIndex, sink: W) -> Result<()> {
    let mut gz = GzEncoder::new(sink, Compression::default());
    for (sym, locs) in index.iter() {
        let record = IndexRecord {
            sym: sym.clone(),
            refs: locs.iter().map(|loc| loc.to_string()).collect(),
        };
        serde_json::to_writer(&mut gz, &record)
            .map_err(|e| IndexError::serialization("encode index record", e))?;
        gz.write_all(b"\n")
            .map_err(|e| IndexError::serialization("write index record", e))?;
    }
    gz.finish()
        .map_err(|e| IndexError::serialization("finish compressed index", e))?;
    Ok(())
}

/// Inverse of [`write_index`].  Rejects corrupt compression, malformed
/// records, malformed location strings, and empty symbol ids.
pub fn read_index<R: Read>(source: R) -> Result<UnitIndex> {
    // Decompress to a single buffer up front; serde_json performs much worse
    // through a buffered reader (https://github.com/serde-rs/json/issues/160).
    let mut gz = GzDecoder::new(source);
    let mut raw = String::new();
    gz.read_to_string(&mut raw)
        .map_err(|e| IndexError::serialization("decompress index", e))?;

    let mut index = UnitIndex::new();
    for line in raw.lines() {
        let record: IndexRecord = serde_json::from_str(line)
            .map_err(|e| IndexError::serialization("decode index record", e))?;
        if record.sym.is_empty() {
            return Err(IndexError::serialization(
                "decode index record",
                "empty symbol id",
            ));
        }
        for loc_str in &record.refs {
            let loc: RefLocation = loc_str
                .parse()
                .map_err(|e: String| IndexError::serialization("decode location", e))?;
            index.insert(&record.sym, loc);
        }
    }
    Ok(index)
}
