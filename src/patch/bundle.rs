//! Mutations applied to the webpack runtime and Next.js build manifest.

use std::path::{Path, PathBuf};

use anyhow::Result;
use regex::{NoExpand, Regex};

use super::{PatchOutcome, read_text, write_if_changed};
use crate::config::MigrationConfig;
use crate::scan::{EntryKind, sorted_entry_names};

/// Path prefixes the exporter returns for chunk and stylesheet URLs.
const NESTED_PREFIX_RETURNS: [&str; 2] = [r#"return"static/chunks/""#, r#"return"static/css/""#];

const FLAT_PREFIX_RETURN: &str = r#"return"""#;

/// Changes made to a single bundle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePatch {
  /// File name inside the asset directory.
  pub file_name: String,
  /// Public path rewrite outcome; only the webpack runtime carries one.
  pub public_path: Option<PatchOutcome>,
  /// Number of prefix-returning expressions that were flattened.
  pub flattened: usize,
  /// Whether the file was written back.
  pub written: bool,
}

/// Locate the webpack runtime chunk (`webpack-<hash>.js`) inside the asset directory.
///
/// A symlinked runtime is patched through the link.
pub fn find_webpack_runtime(
  assets_dir: &Path,
  prefix: &str,
  suffix: &str,
) -> Result<Option<PathBuf>> {
  if !assets_dir.is_dir() {
    return Ok(None);
  }

  let names = sorted_entry_names(assets_dir, EntryKind::File, |name| {
    name.starts_with(prefix) && name.ends_with(suffix)
  })?;
  Ok(names.into_iter().next().map(|name| assets_dir.join(name)))
}

/// Point the webpack public path at `public_path` instead of the Gamma CDN.
pub fn rewrite_public_path(
  text: &mut String,
  config: &MigrationConfig,
  public_path: &str,
) -> Result<PatchOutcome> {
  let pattern = Regex::new(&format!(
    r#"{}="https://{}/[^"]*""#,
    regex::escape(&config.public_path_var),
    regex::escape(&config.public_path_host)
  ))?;

  let replacement = format!(r#"{}="{}""#, config.public_path_var, public_path);
  if !pattern.is_match(text) {
    return Ok(if text.contains(&replacement) {
      PatchOutcome::AlreadyApplied
    } else {
      PatchOutcome::NotFound
    });
  }

  *text = pattern
    .replace_all(text, NoExpand(&replacement))
    .into_owned();
  Ok(PatchOutcome::Applied)
}

/// Make chunk and stylesheet prefix expressions return an empty string so the flattened asset
/// directory resolves. Returns the number of expressions rewritten.
pub fn flatten_chunk_prefixes(text: &mut String) -> usize {
  let mut count = 0;
  for nested in NESTED_PREFIX_RETURNS {
    let found = text.matches(nested).count();
    if found > 0 {
      *text = text.replace(nested, FLAT_PREFIX_RETURN);
      count += found;
    }
  }
  count
}

/// Patch the webpack runtime chunk, if the asset directory has one.
pub fn patch_webpack_runtime(
  config: &MigrationConfig,
  assets_dir: &Path,
  public_path: &str,
  dry_run: bool,
) -> Result<Option<BundlePatch>> {
  let runtime = find_webpack_runtime(assets_dir, &config.webpack_prefix, &config.webpack_suffix)?;
  let Some(path) = runtime else {
    return Ok(None);
  };

  let original = read_text(&path)?;
  let mut text = original.clone();
  let public_path = rewrite_public_path(&mut text, config, public_path)?;
  let flattened = flatten_chunk_prefixes(&mut text);
  let written = write_if_changed(&path, &original, &text, dry_run)?;

  Ok(Some(BundlePatch {
    file_name: file_name_of(&path),
    public_path: Some(public_path),
    flattened,
    written,
  }))
}

/// Flatten chunk prefixes in the build manifest, if the asset directory has one.
pub fn patch_build_manifest(
  config: &MigrationConfig,
  assets_dir: &Path,
  dry_run: bool,
) -> Result<Option<BundlePatch>> {
  let path = assets_dir.join(&config.build_manifest_file);
  if !path.is_file() {
    return Ok(None);
  }

  let original = read_text(&path)?;
  let mut text = original.clone();
  let flattened = flatten_chunk_prefixes(&mut text);
  let written = write_if_changed(&path, &original, &text, dry_run)?;

  Ok(Some(BundlePatch {
    file_name: config.build_manifest_file.clone(),
    public_path: None,
    flattened,
    written,
  }))
}

fn file_name_of(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}
