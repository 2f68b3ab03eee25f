//! Fatal errors that stop a migration before any file is touched.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing a migration run.
///
/// Problems inside individual pipeline steps are not represented here; those are recorded in
/// the [`crate::MigrationReport`] and the run carries on.
#[derive(Debug, Error)]
pub enum MigrateError {
  /// The site directory does not exist.
  #[error("site directory not found: {}", path.display())]
  SiteNotFound {
    /// Path that was requested.
    path: PathBuf,
  },
  /// The site path exists but is not a directory.
  #[error("site path is not a directory: {}", path.display())]
  NotADirectory {
    /// Path that was requested.
    path: PathBuf,
  },
  /// No site name could be derived from the site path.
  #[error("cannot derive a site name from {}; pass --site-name", path.display())]
  SiteName {
    /// Path the name was derived from.
    path: PathBuf,
  },
  /// Failed to resolve the site directory to an absolute path.
  #[error("failed to resolve {}", path.display())]
  Resolve {
    /// Path that could not be resolved.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to read the configuration file.
  #[error("failed to read config {}", path.display())]
  ConfigRead {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// Failed to parse the configuration file.
  #[error("failed to parse config {}", path.display())]
  ConfigParse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
}
