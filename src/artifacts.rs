//! Output Artifacts
//!
//! Persistence for the three run outputs: the graph JSON, the metadata
//! index JSON, and the raw embedding matrix. The matrix and index exist so
//! edge filtering can be re-run with different thresholds without paying
//! for embeddings again.
//!
//! # Matrix file format
//!
//! Little-endian, row-major:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 8    | magic `NTGEMB01` |
//! | 8      | 4    | format version (u32) |
//! | 12     | 4    | row count (u32) |
//! | 16     | 4    | dimensions (u32) |
//! | 20     | 4*rows*dims | f32 values |

use crate::error::{NotegraphError, Result};
use crate::graph::NoteGraph;
use crate::loader::NoteMeta;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic number for embedding matrix files
pub const MATRIX_MAGIC: &[u8; 8] = b"NTGEMB01";

/// Current matrix file format version
pub const MATRIX_VERSION: u32 = 1;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the graph JSON, pretty-printed, preserving node and edge order.
pub fn write_graph(path: &Path, graph: &NoteGraph) -> Result<()> {
    ensure_parent(path)?;
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, graph)?;
    Ok(())
}

/// Read a graph JSON artifact back.
pub fn read_graph(path: &Path) -> Result<NoteGraph> {
    let file = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(file)?)
}

/// Write the metadata index: one entry per matrix row, same order.
pub fn write_index(path: &Path, index: &[NoteMeta]) -> Result<()> {
    ensure_parent(path)?;
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, index)?;
    Ok(())
}

/// Read the metadata index artifact back.
pub fn read_index(path: &Path) -> Result<Vec<NoteMeta>> {
    let file = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(file)?)
}

/// Write the embedding matrix. All rows must share one dimensionality.
pub fn write_matrix(path: &Path, vectors: &[Vec<f32>]) -> Result<()> {
    let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
    for row in vectors {
        if row.len() != dims {
            return Err(NotegraphError::DimensionMismatch { expected: dims, got: row.len() });
        }
    }

    ensure_parent(path)?;
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(MATRIX_MAGIC)?;
    file.write_all(&MATRIX_VERSION.to_le_bytes())?;
    file.write_all(&(vectors.len() as u32).to_le_bytes())?;
    file.write_all(&(dims as u32).to_le_bytes())?;
    for row in vectors {
        for value in row {
            file.write_all(&value.to_le_bytes())?;
        }
    }
    file.flush()?;
    Ok(())
}

/// Read an embedding matrix, validating magic, version, and payload size.
pub fn read_matrix(path: &Path) -> Result<Vec<Vec<f32>>> {
    let mut file = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 8];
    file.read_exact(&mut magic)
        .map_err(|_| NotegraphError::InvalidMatrix("file too short for header".into()))?;
    if &magic != MATRIX_MAGIC {
        return Err(NotegraphError::InvalidMatrix("bad magic number".into()));
    }

    let mut word = [0u8; 4];
    file.read_exact(&mut word)
        .map_err(|_| NotegraphError::InvalidMatrix("file too short for header".into()))?;
    let version = u32::from_le_bytes(word);
    if version != MATRIX_VERSION {
        return Err(NotegraphError::InvalidMatrix(format!("unsupported version {version}")));
    }

    file.read_exact(&mut word)
        .map_err(|_| NotegraphError::InvalidMatrix("file too short for header".into()))?;
    let rows = u32::from_le_bytes(word) as usize;
    file.read_exact(&mut word)
        .map_err(|_| NotegraphError::InvalidMatrix("file too short for header".into()))?;
    let dims = u32::from_le_bytes(word) as usize;

    let mut payload = Vec::new();
    file.read_to_end(&mut payload)?;
    // Header fields are untrusted: a corrupt file can claim u32::MAX rows.
    let expected = rows
        .checked_mul(dims)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| {
            NotegraphError::InvalidMatrix(format!("implausible shape {rows}x{dims}"))
        })?;
    if payload.len() != expected {
        return Err(NotegraphError::InvalidMatrix(format!(
            "payload is {} bytes, expected {expected} for {rows}x{dims}",
            payload.len()
        )));
    }

    let mut values = payload
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]));
    let mut vectors = Vec::with_capacity(rows);
    for _ in 0..rows {
        vectors.push(values.by_ref().take(dims).collect());
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_matrix_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("embeddings.bin");
        let vectors = vec![vec![0.1f32, 0.2, 0.3], vec![-1.0, 0.5, 0.25]];

        write_matrix(&path, &vectors).unwrap();
        let loaded = read_matrix(&path).unwrap();
        assert_eq!(loaded, vectors);
    }

    #[test]
    fn test_empty_matrix_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        write_matrix(&path, &[]).unwrap();
        assert!(read_matrix(&path).unwrap().is_empty());
    }

    #[test]
    fn test_ragged_matrix_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.bin");
        let vectors = vec![vec![0.1f32, 0.2], vec![0.3]];
        let err = write_matrix(&path, &vectors).unwrap_err();
        assert!(matches!(err, NotegraphError::DimensionMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.bin");
        fs::write(&path, b"NOTAMTRXsome other bytes").unwrap();
        let err = read_matrix(&path).unwrap_err();
        assert!(matches!(err, NotegraphError::InvalidMatrix(_)));
    }

    #[test]
    fn test_overflowing_shape_header_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge.bin");
        // Valid magic and version, but a shape whose byte size overflows
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MATRIX_MAGIC);
        bytes.extend_from_slice(&MATRIX_VERSION.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        fs::write(&path, bytes).unwrap();
        let err = read_matrix(&path).unwrap_err();
        assert!(matches!(err, NotegraphError::InvalidMatrix(_)));
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("truncated.bin");
        write_matrix(&path, &[vec![1.0f32, 2.0, 3.0]]).unwrap();
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();
        let err = read_matrix(&path).unwrap_err();
        assert!(matches!(err, NotegraphError::InvalidMatrix(_)));
    }

    #[test]
    fn test_index_round_trip_preserves_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("index.json");
        let index = vec![
            NoteMeta { path: "content/b.md".into(), title: "B".into(), group: "content".into() },
            NoteMeta { path: "content/a.md".into(), title: "A".into(), group: "content".into() },
        ];
        write_index(&path, &index).unwrap();
        assert_eq!(read_index(&path).unwrap(), index);
    }
}
