use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Error;
use crate::matcher::MatchEngine;
use crate::project::METADATA_NAME;

/// A file that matched the template, with the directory it belongs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedFile {
    /// Path relative to the scan root.
    pub path: PathBuf,
    pub placement: Vec<String>,
}

/// A file the template could not handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    pub placed: Vec<PlacedFile>,
    pub unsupported: Vec<RejectedFile>,
    pub mismatched: Vec<RejectedFile>,
}

impl WalkOutput {
    pub fn file_count(&self) -> usize {
        self.placed.len() + self.unsupported.len() + self.mismatched.len()
    }
}

/// Walks `root` recursively and classifies every regular file by name.
///
/// Entries are visited in sorted order so the output is deterministic.
pub fn scan_dir(root: &Path, engine: &MatchEngine) -> Result<WalkOutput, Error> {
    let mut out = WalkOutput::default();
    debug!(root = %root.display(), "scan: start");
    walk_dir(root, Path::new(""), engine, &mut out)?;
    debug!(files = out.file_count(), "scan: done");
    Ok(out)
}

fn walk_dir(
    root: &Path,
    rel: &Path,
    engine: &MatchEngine,
    out: &mut WalkOutput,
) -> Result<(), Error> {
    let abs = root.join(rel);

    let rd = fs::read_dir(&abs).map_err(|e| Error::io(&abs, e))?;
    let mut entries: Vec<fs::DirEntry> = Vec::new();
    for ent in rd {
        entries.push(ent.map_err(|e| Error::io(&abs, e))?);
    }
    entries.sort_by_key(|e| e.file_name());

    for ent in entries {
        let name = ent.file_name();
        let name = name.to_string_lossy();

        // Skip the project's own metadata.
        if rel.as_os_str().is_empty() && name == METADATA_NAME {
            continue;
        }

        let ty = ent.file_type().map_err(|e| Error::io(ent.path(), e))?;
        let rel_path = rel.join(name.as_ref());

        if ty.is_dir() {
            walk_dir(root, &rel_path, engine, out)?;
        } else if ty.is_file() {
            classify(&rel_path, &name, engine, out)?;
        } else {
            debug!(path = %rel_path.display(), "scan: skipping non-regular entry");
        }
    }

    Ok(())
}

fn classify(
    rel_path: &Path,
    name: &str,
    engine: &MatchEngine,
    out: &mut WalkOutput,
) -> Result<(), Error> {
    match engine.placement(name) {
        Ok(placement) => out.placed.push(PlacedFile {
            path: rel_path.to_path_buf(),
            placement,
        }),
        Err(e @ Error::UnsupportedFileExtension { .. }) => {
            warn!(path = %rel_path.display(), "{e}");
            out.unsupported.push(RejectedFile {
                path: rel_path.to_path_buf(),
                message: e.to_string(),
            });
        }
        Err(e) if e.is_per_file() => {
            warn!(path = %rel_path.display(), "{e}");
            out.mismatched.push(RejectedFile {
                path: rel_path.to_path_buf(),
                message: e.to_string(),
            });
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::default::default_template;

    fn write_file(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "dummy_file").unwrap();
    }

    #[test]
    fn classifies_files_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write_file(&root.join("20201010-101010_adelaide_oak_alpha.bin"));
        write_file(&root.join("nested/deeper/20201010-101010_adelaide_oak_beta_proc.bin"));
        write_file(&root.join("notes.txt"));
        write_file(&root.join(METADATA_NAME));

        let engine = MatchEngine::new(default_template().unwrap());
        let out = scan_dir(root, &engine).unwrap();

        assert_eq!(out.placed.len(), 2);
        assert_eq!(out.mismatched.len(), 1);
        assert!(out.unsupported.is_empty());
        assert_eq!(out.mismatched[0].path, PathBuf::from("notes.txt"));

        assert_eq!(out.placed[0].path, PathBuf::from("20201010-101010_adelaide_oak_alpha.bin"));
        assert_eq!(out.placed[1].placement[4], "T1-proc");
    }
}
