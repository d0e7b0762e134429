use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::input::InputSource;

/// Refuse an `--output` path that points at one of the input files.
pub fn ensure_output_not_same(output: &Path, inputs: &[&InputSource]) -> Result<()> {
    let out_norm = normalize_for_compare(output)
        .with_context(|| format!("failed to normalize output path {}", output.display()))?;

    for input in inputs.iter().filter_map(|input| input.path()) {
        let in_norm = normalize_for_compare(input)
            .with_context(|| format!("failed to normalize input path {}", input.display()))?;
        if out_norm == in_norm {
            bail!(
                "refusing to overwrite input file: output {} matches input {}",
                output.display(),
                input.display()
            );
        }
    }
    Ok(())
}

fn normalize_for_compare(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("canonicalize {}", path.display()));
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().context("current_dir")?.join(path)
    };

    // `canonicalize` needs an existing file, so fold `.` and `..` by hand and
    // resolve symlinks through the deepest ancestor that does exist.
    let mut folded = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                folded.pop();
            }
            other => folded.push(other),
        }
    }

    let mut missing = Vec::new();
    let mut existing = folded.as_path();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing
        .canonicalize()
        .with_context(|| format!("canonicalize {}", existing.display()))?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}
