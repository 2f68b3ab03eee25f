//! Records produced while migrating a site.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Individual transformation performed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
  /// Rename of the exported asset directory.
  RenameAssets,
  /// Loading and saving the entry document.
  IndexHtml,
  /// Rewrite of references to the exported asset directory.
  AssetReferences,
  /// Injection of the `<base href>` tag.
  BaseTag,
  /// Injection of the branding override stylesheet.
  BrandingStyles,
  /// Repair of the duplicated `@media` keyword.
  MediaQuery,
  /// Rewrite of the webpack public path.
  PublicPath,
  /// Flattening of chunk and stylesheet prefixes in a bundle file.
  FlattenChunks,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let label = match self {
      Step::RenameAssets => "rename-assets",
      Step::IndexHtml => "index-html",
      Step::AssetReferences => "asset-references",
      Step::BaseTag => "base-tag",
      Step::BrandingStyles => "branding-styles",
      Step::MediaQuery => "media-query",
      Step::PublicPath => "public-path",
      Step::FlattenChunks => "flatten-chunks",
    };
    f.write_str(label)
  }
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  /// Content or layout was changed.
  Applied,
  /// Nothing to do; the step already ran or its pattern is absent.
  Skipped,
  /// An input file or directory the step works on does not exist.
  Missing,
  /// The step hit an I/O error.
  Failed,
}

/// Report line for a step applied to one target.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
  /// Step that ran.
  pub step: Step,
  /// What happened.
  pub status: StepStatus,
  /// File or directory the step targeted, relative to the site root when possible.
  pub target: String,
  /// Human readable detail.
  pub message: String,
}

/// Summary of a whole migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
  /// Site name used in the hosting path.
  pub site_name: String,
  /// Absolute site root.
  pub site_root: PathBuf,
  /// Whether files were left untouched.
  pub dry_run: bool,
  /// Steps in the order they ran.
  pub steps: Vec<StepReport>,
}

impl MigrationReport {
  /// Empty report for a site.
  pub fn new(site_name: impl Into<String>, site_root: impl Into<PathBuf>, dry_run: bool) -> Self {
    Self {
      site_name: site_name.into(),
      site_root: site_root.into(),
      dry_run,
      steps: Vec::new(),
    }
  }

  /// Append a step record.
  pub fn record(
    &mut self,
    step: Step,
    status: StepStatus,
    target: impl Into<String>,
    message: impl Into<String>,
  ) {
    self.steps.push(StepReport {
      step,
      status,
      target: target.into(),
      message: message.into(),
    });
  }

  /// Steps that changed something.
  pub fn applied(&self) -> impl Iterator<Item = &StepReport> {
    self.with_status(StepStatus::Applied)
  }

  /// Steps that failed with an I/O error.
  pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
    self.with_status(StepStatus::Failed)
  }

  /// `true` when at least one step failed.
  pub fn has_failures(&self) -> bool {
    self.failures().next().is_some()
  }

  /// First status recorded for a step.
  pub fn status_of(&self, step: Step) -> Option<StepStatus> {
    self
      .steps
      .iter()
      .find(|report| report.step == step)
      .map(|report| report.status)
  }

  fn with_status(&self, status: StepStatus) -> impl Iterator<Item = &StepReport> {
    self
      .steps
      .iter()
      .filter(move |report| report.status == status)
  }
}
