//! Site layout resolved from a [`MigrationConfig`] and a concrete site directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::MigrationConfig;
use crate::error::MigrateError;

/// Paths and derived strings for a single site being migrated.
#[derive(Debug, Clone)]
pub struct SiteLayout {
  config: MigrationConfig,
  root: PathBuf,
  site_name: String,
}

impl SiteLayout {
  /// Resolve `site_root` to an absolute directory and derive the site name from its basename
  /// unless `site_name` overrides it.
  pub fn resolve(
    config: MigrationConfig,
    site_root: &Path,
    site_name: Option<&str>,
  ) -> Result<Self, MigrateError> {
    let root = std::path::absolute(site_root).map_err(|source| MigrateError::Resolve {
      path: site_root.to_path_buf(),
      source,
    })?;

    match fs::metadata(&root) {
      Ok(meta) if meta.is_dir() => {}
      Ok(_) => return Err(MigrateError::NotADirectory { path: root }),
      Err(err) if err.kind() == ErrorKind::NotFound => {
        return Err(MigrateError::SiteNotFound { path: root });
      }
      Err(source) => return Err(MigrateError::Resolve { path: root, source }),
    }

    let site_name = match site_name {
      Some(name) => {
        let name = name.trim_matches('/');
        if name.is_empty() {
          return Err(MigrateError::SiteName { path: root });
        }
        name.to_string()
      }
      None => derive_site_name(&root)?,
    };

    Ok(Self {
      config,
      root,
      site_name,
    })
  }

  /// Settings the layout was resolved from.
  pub fn config(&self) -> &MigrationConfig {
    &self.config
  }

  /// Absolute site root.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Name the site is hosted under.
  pub fn site_name(&self) -> &str {
    &self.site_name
  }

  /// Canonical asset directory inside the site root.
  pub fn assets_dir(&self) -> PathBuf {
    self.root.join(&self.config.assets_dir)
  }

  /// Entry document inside the site root.
  pub fn index_html(&self) -> PathBuf {
    self.root.join(&self.config.index_html_file)
  }

  /// Value of the injected `<base href>`, e.g. `/sites/deck/`.
  pub fn base_href(&self) -> String {
    format!(
      "{}/{}/",
      self.config.sites_prefix.trim_end_matches('/'),
      self.site_name
    )
  }

  /// Public path webpack should load chunks from, e.g. `/sites/deck/assets/`.
  pub fn public_path(&self) -> String {
    format!(
      "{}{}/",
      self.base_href(),
      self.config.assets_dir.trim_matches('/')
    )
  }
}

fn derive_site_name(root: &Path) -> Result<String, MigrateError> {
  if let Some(name) = root.file_name() {
    return Ok(name.to_string_lossy().into_owned());
  }

  // `..` and similar components have no basename until symlinks and parents are resolved.
  let canonical = fs::canonicalize(root).map_err(|source| MigrateError::Resolve {
    path: root.to_path_buf(),
    source,
  })?;
  canonical
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .ok_or_else(|| MigrateError::SiteName {
      path: root.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn derives_name_from_directory_basename() {
    let dir = tempdir().unwrap();
    let site = dir.path().join("quarterly-review");
    fs::create_dir_all(&site).unwrap();

    let layout = SiteLayout::resolve(MigrationConfig::default(), &site, None).unwrap();
    assert_eq!(layout.site_name(), "quarterly-review");
    assert_eq!(layout.base_href(), "/sites/quarterly-review/");
    assert_eq!(layout.public_path(), "/sites/quarterly-review/assets/");
    assert_eq!(layout.assets_dir(), site.join("assets"));
    assert_eq!(layout.index_html(), site.join("index.html"));
  }

  #[test]
  fn resolves_parent_components_to_a_name() {
    let dir = tempdir().unwrap();
    let site = dir.path().join("deck");
    fs::create_dir_all(site.join("nested")).unwrap();

    let layout =
      SiteLayout::resolve(MigrationConfig::default(), &site.join("nested").join(".."), None)
        .unwrap();
    assert_eq!(layout.site_name(), "deck");
  }

  #[test]
  fn explicit_name_and_prefix_override_defaults() {
    let dir = tempdir().unwrap();
    let config = MigrationConfig {
      sites_prefix: "/decks/".into(),
      ..MigrationConfig::default()
    };

    let layout = SiteLayout::resolve(config, dir.path(), Some("launch")).unwrap();
    assert_eq!(layout.base_href(), "/decks/launch/");
    assert_eq!(layout.public_path(), "/decks/launch/assets/");
  }

  #[test]
  fn rejects_missing_and_non_directory_roots() {
    let dir = tempdir().unwrap();
    let missing = SiteLayout::resolve(MigrationConfig::default(), &dir.path().join("nope"), None);
    assert!(matches!(missing, Err(MigrateError::SiteNotFound { .. })));

    let file = dir.path().join("index.html");
    fs::write(&file, "<html></html>").unwrap();
    let not_dir = SiteLayout::resolve(MigrationConfig::default(), &file, None);
    assert!(matches!(not_dir, Err(MigrateError::NotADirectory { .. })));
  }

  #[test]
  fn rejects_empty_override() {
    let dir = tempdir().unwrap();
    let result = SiteLayout::resolve(MigrationConfig::default(), dir.path(), Some("/"));
    assert!(matches!(result, Err(MigrateError::SiteName { .. })));
  }
}
