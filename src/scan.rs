//! Directory listing shared by the asset directory and bundle lookups.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Kind of entry a listing keeps. Symlinks count as whatever they point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryKind {
  Dir,
  File,
}

/// Names of the entries directly under `dir` of the given kind that `accept` keeps, sorted so
/// repeated runs pick the same entry. Names that are not valid UTF-8 are ignored.
pub(crate) fn sorted_entry_names<F>(
  dir: &Path,
  kind: EntryKind,
  accept: F,
) -> Result<Vec<String>>
where
  F: Fn(&str) -> bool,
{
  let mut names = Vec::new();
  for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
    let entry = entry?;
    let path = entry.path();
    let keep = match kind {
      EntryKind::Dir => path.is_dir(),
      EntryKind::File => path.is_file(),
    };
    if !keep {
      continue;
    }

    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else {
      continue;
    };

    if accept(name) {
      names.push(name.to_string());
    }
  }

  names.sort();
  Ok(names)
}
