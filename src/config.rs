//! Migration settings describing the exported site layout and the hosting path.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::MigrateError;
use crate::project::SiteLayout;

/// Layout and rewrite settings for a site migration.
///
/// Every field has a default matching the Gamma export format, so a config file only needs to
/// list the values it wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
  /// Name the asset directory is normalised to.
  pub assets_dir: String,
  /// Suffix identifying the exported asset directory (`<page>_files`).
  pub legacy_dir_suffix: String,
  /// File name of the entry document inside the site root.
  pub index_html_file: String,
  /// Path prefix sites are served under; the site name is appended.
  pub sites_prefix: String,
  /// Prefix of the webpack runtime chunk inside the asset directory.
  pub webpack_prefix: String,
  /// Suffix of the webpack runtime chunk inside the asset directory.
  pub webpack_suffix: String,
  /// File name of the Next.js build manifest inside the asset directory.
  pub build_manifest_file: String,
  /// Host the exported bundle loads its chunks from.
  pub public_path_host: String,
  /// Minified assignment target holding the webpack public path.
  pub public_path_var: String,
}

impl Default for MigrationConfig {
  fn default() -> Self {
    Self {
      assets_dir: "assets".into(),
      legacy_dir_suffix: "_files".into(),
      index_html_file: "index.html".into(),
      sites_prefix: "/sites".into(),
      webpack_prefix: "webpack-".into(),
      webpack_suffix: ".js".into(),
      build_manifest_file: "_buildManifest.js".into(),
      public_path_host: "assets.gammahosted.com".into(),
      public_path_var: "a.p".into(),
    }
  }
}

impl MigrationConfig {
  /// Read configuration from a specific JSON file.
  ///
  /// Unlike discovery-style loaders this is only called for an explicitly requested file, so
  /// a missing or malformed file is an error rather than a silent fallback.
  pub fn from_path(path: &Path) -> Result<Self, MigrateError> {
    let content = fs::read_to_string(path).map_err(|source| MigrateError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| MigrateError::ConfigParse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Resolve the configuration against a concrete site directory.
  pub fn into_layout(
    self,
    site_root: &Path,
    site_name: Option<&str>,
  ) -> Result<SiteLayout, MigrateError> {
    SiteLayout::resolve(self, site_root, site_name)
  }
}
