//! Locating the exported asset directory and moving it to its canonical name.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::project::SiteLayout;
use crate::scan::{EntryKind, sorted_entry_names};

/// Outcome of resolving the asset directory of a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetDirResolution {
  /// The exported directory was moved to the canonical name.
  Renamed {
    /// Original directory name.
    legacy: String,
  },
  /// The canonical directory already existed. An exported directory found next to it is left
  /// untouched.
  CanonicalExists {
    /// Exported directory name, when one is still present.
    legacy: Option<String>,
  },
  /// Neither an exported nor a canonical directory exists.
  Missing,
}

impl AssetDirResolution {
  /// Name of the exported directory, which entry document references still point at.
  pub fn legacy_name(&self) -> Option<&str> {
    match self {
      AssetDirResolution::Renamed { legacy } => Some(legacy),
      AssetDirResolution::CanonicalExists { legacy } => legacy.as_deref(),
      AssetDirResolution::Missing => None,
    }
  }
}

/// Find the first directory directly under `site_root` whose name ends with `suffix`.
///
/// Entries are visited in name order and symlinked directories qualify. The canonical name
/// itself never counts as an exported directory.
pub fn find_legacy_asset_dir(
  site_root: &Path,
  suffix: &str,
  canonical: &str,
) -> Result<Option<String>> {
  let names = sorted_entry_names(site_root, EntryKind::Dir, |name| {
    name.ends_with(suffix) && name != canonical
  })?;
  Ok(names.into_iter().next())
}

/// Move the exported asset directory to the canonical name when needed.
///
/// With `dry_run` set the filesystem is inspected but not changed; the returned resolution
/// describes what a real run would do.
pub fn resolve_asset_dir(layout: &SiteLayout, dry_run: bool) -> Result<AssetDirResolution> {
  let config = layout.config();
  let canonical = layout.assets_dir();
  let legacy = find_legacy_asset_dir(
    layout.root(),
    &config.legacy_dir_suffix,
    &config.assets_dir,
  )?;

  if canonical.exists() {
    return Ok(AssetDirResolution::CanonicalExists { legacy });
  }

  let Some(legacy) = legacy else {
    return Ok(AssetDirResolution::Missing);
  };

  if !dry_run {
    let source = layout.root().join(&legacy);
    fs::rename(&source, &canonical).with_context(|| {
      format!(
        "failed to rename {} to {}",
        source.display(),
        canonical.display()
      )
    })?;
  }

  Ok(AssetDirResolution::Renamed { legacy })
}

/// Directory the bundle files live in after this resolution.
///
/// During a dry run the rename has not happened, so the exported directory is still the one
/// holding the bundle files.
pub fn effective_assets_dir(
  layout: &SiteLayout,
  resolution: &AssetDirResolution,
  dry_run: bool,
) -> PathBuf {
  match resolution {
    AssetDirResolution::Renamed { legacy } if dry_run => layout.root().join(legacy),
    _ => layout.assets_dir(),
  }
}
