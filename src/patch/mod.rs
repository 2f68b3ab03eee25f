//! Text rewrites applied to the exported entry document and webpack bundle files.

pub mod bundle;
pub mod html;
pub mod styles;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Outcome of a single guarded rewrite on a text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
  /// The buffer was changed.
  Applied,
  /// The rewrite had already been applied by an earlier run.
  AlreadyApplied,
  /// Neither the pattern nor the anchor the rewrite needs is present.
  NotFound,
}

impl PatchOutcome {
  /// `true` when the buffer changed.
  pub fn is_applied(self) -> bool {
    matches!(self, PatchOutcome::Applied)
  }
}

fn read_text(path: &Path) -> Result<String> {
  fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write `text` back when it differs from `original`. Returns whether a write happened.
fn write_if_changed(path: &Path, original: &str, text: &str, dry_run: bool) -> Result<bool> {
  if original == text || dry_run {
    return Ok(false);
  }
  fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
  Ok(true)
}
