//! Note Loading
//!
//! Discovers markdown files under a notes directory and turns them into
//! [`Note`] records: front matter stripped, title extracted, group derived
//! from the storage path. Traversal order is lexicographic over the full
//! path, so note ids are stable across runs on unchanged input.
//!
//! Index and about pages carry no content of their own and are filtered
//! out by exact filename match. Files that cannot be read are skipped with
//! a warning instead of failing the run; the caller sees the skip count.

use crate::error::{NotegraphError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Filenames excluded from the corpus (section indexes, about pages)
const MARKER_FILES: &[&str] = &["_index.md", "about.md"];

/// Display metadata for one note. Also the row type of the embedding
/// metadata index artifact, so field order matters for diffable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMeta {
    /// Path of the source file, as given (posix separators)
    pub path: String,
    /// First `# ` heading, or the file stem if none
    pub title: String,
    /// First directory component under the notes root
    pub group: String,
}

/// One loaded note. `id` is the position in traversal order and is the
/// sole identity used in the graph; immutable after loading.
#[derive(Debug, Clone)]
pub struct Note {
    /// Stable 0-based id, assigned in discovery order
    pub id: usize,
    /// Display metadata
    pub meta: NoteMeta,
    /// Note text with front matter removed
    pub body: String,
}

/// Outcome of a directory scan: the notes plus how many files were skipped
/// because they could not be read.
#[derive(Debug)]
pub struct LoadedNotes {
    /// Notes in discovery order, ids already assigned
    pub notes: Vec<Note>,
    /// Files skipped because they could not be read
    pub skipped: usize,
}

/// Remove a leading YAML front-matter block delimited by `---` lines.
///
/// The block is bounded by the first and second occurrence of the marker;
/// text without a leading marker is returned unchanged.
pub fn strip_front_matter(text: &str) -> &str {
    if text.trim_start().starts_with("---") {
        let mut parts = text.splitn(3, "---");
        let _before = parts.next();
        let _block = parts.next();
        if let Some(rest) = parts.next() {
            return rest;
        }
    }
    text
}

/// Return the first top-level heading (`#` followed by whitespace and a
/// title), or `fallback` if the text has none.
pub fn extract_title(text: &str, fallback: &str) -> String {
    text.lines()
        .find_map(|line| {
            let rest = line.strip_prefix('#')?;
            let title = rest.trim_start();
            // Require whitespace after '#': rules out "##" subheadings
            // and bare "#text" lines.
            if title.len() < rest.len() && !title.is_empty() {
                Some(title.trim_end().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| fallback.to_string())
}

/// Load every eligible markdown note under `root`.
///
/// Fails with [`NotegraphError::NotesDirNotFound`] if `root` does not
/// exist. An existing directory with no eligible files yields an empty
/// result, not an error; the caller decides whether that is fatal.
pub fn load_notes(root: &Path) -> Result<LoadedNotes> {
    if !root.is_dir() {
        return Err(NotegraphError::NotesDirNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    collect_markdown(root, &mut files)?;
    files.sort();

    let mut notes = Vec::with_capacity(files.len());
    let mut skipped = 0;
    for path in files {
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable note");
                skipped += 1;
                continue;
            }
        };
        let body = strip_front_matter(&raw).trim().to_string();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        notes.push(Note {
            id: notes.len(),
            meta: NoteMeta {
                path: to_posix(&path),
                title: extract_title(&body, &stem),
                group: group_of(root, &path),
            },
            body,
        });
    }

    Ok(LoadedNotes { notes, skipped })
}

/// Group = first path component under the notes root; notes sitting
/// directly in the root fall back to the root directory's own name.
fn group_of(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let components: Vec<_> = rel.components().collect();
    if components.len() > 1 {
        components[0].as_os_str().to_string_lossy().into_owned()
    } else {
        root.file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn collect_markdown(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_markdown(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "md") && !is_marker(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_marker(path: &Path) -> bool {
    path.file_name()
        .map(|name| MARKER_FILES.iter().any(|m| name == *m))
        .unwrap_or(false)
}

fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
