//! Migration orchestrator running the asset, entry document and bundle steps in order.

use std::path::Path;

use tracing::{Level, debug, error, info, warn};

use crate::asset_dir::{AssetDirResolution, effective_assets_dir, resolve_asset_dir};
use crate::config::MigrationConfig;
use crate::error::MigrateError;
use crate::models::{MigrationReport, Step, StepStatus};
use crate::patch::PatchOutcome;
use crate::patch::bundle::{BundlePatch, patch_build_manifest, patch_webpack_runtime};
use crate::patch::html::patch_index_html;
use crate::project::SiteLayout;

/// High-level helper migrating one exported site in place.
pub struct SiteMigrator {
  layout: SiteLayout,
  dry_run: bool,
}

impl SiteMigrator {
  /// Create a migrator for an already resolved layout.
  pub fn new(layout: SiteLayout) -> Self {
    Self {
      layout,
      dry_run: false,
    }
  }

  /// Resolve `site_root` with `config` and create a migrator for it.
  pub fn for_site(
    config: MigrationConfig,
    site_root: &Path,
    site_name: Option<&str>,
  ) -> Result<Self, MigrateError> {
    Ok(Self::new(config.into_layout(site_root, site_name)?))
  }

  /// Inspect and report without renaming or writing anything.
  pub fn dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  /// Run every step. Failures are recorded in the report and later steps still run.
  pub fn run(&self) -> MigrationReport {
    let layout = &self.layout;
    info!(
      site = layout.site_name(),
      root = %layout.root().display(),
      dry_run = self.dry_run,
      "migrating site"
    );

    let mut report = MigrationReport::new(layout.site_name(), layout.root(), self.dry_run);
    let resolution = self.rename_assets(&mut report);
    self.patch_index(&mut report, resolution.as_ref().and_then(|r| r.legacy_name()));

    let assets_dir = match &resolution {
      Some(resolution) => effective_assets_dir(layout, resolution, self.dry_run),
      None => layout.assets_dir(),
    };
    self.patch_bundles(&mut report, &assets_dir);

    if report.has_failures() {
      warn!(
        failed = report.failures().count(),
        "migration finished with errors"
      );
    } else {
      info!(changed = report.applied().count(), "migration completed");
    }
    report
  }

  fn rename_assets(&self, report: &mut MigrationReport) -> Option<AssetDirResolution> {
    let canonical = &self.layout.config().assets_dir;
    match resolve_asset_dir(&self.layout, self.dry_run) {
      Ok(resolution) => {
        match &resolution {
          AssetDirResolution::Renamed { legacy } => note(
            report,
            Step::RenameAssets,
            StepStatus::Applied,
            legacy,
            format!("renamed '{legacy}' to '{canonical}'"),
          ),
          AssetDirResolution::CanonicalExists { legacy: Some(legacy) } => note(
            report,
            Step::RenameAssets,
            StepStatus::Skipped,
            legacy,
            format!("'{canonical}' directory already exists; leaving '{legacy}' in place"),
          ),
          AssetDirResolution::CanonicalExists { legacy: None } => note(
            report,
            Step::RenameAssets,
            StepStatus::Skipped,
            canonical,
            format!("'{canonical}' directory already in place"),
          ),
          AssetDirResolution::Missing => note(
            report,
            Step::RenameAssets,
            StepStatus::Missing,
            canonical,
            format!(
              "no *{} directory and no '{canonical}' directory; assuming assets are not needed",
              self.layout.config().legacy_dir_suffix
            ),
          ),
        }
        Some(resolution)
      }
      Err(err) => {
        note(
          report,
          Step::RenameAssets,
          StepStatus::Failed,
          canonical,
          format!("{err:#}"),
        );
        None
      }
    }
  }

  fn patch_index(&self, report: &mut MigrationReport, legacy: Option<&str>) {
    let index_file = &self.layout.config().index_html_file;
    let patch = match patch_index_html(&self.layout, legacy, self.dry_run) {
      Ok(Some(patch)) => patch,
      Ok(None) => {
        note(
          report,
          Step::IndexHtml,
          StepStatus::Missing,
          index_file,
          format!("{index_file} not found"),
        );
        return;
      }
      Err(err) => {
        note(
          report,
          Step::IndexHtml,
          StepStatus::Failed,
          index_file,
          format!("{err:#}"),
        );
        return;
      }
    };

    if let Some(count) = patch.asset_references {
      let status = if count > 0 {
        StepStatus::Applied
      } else {
        StepStatus::Skipped
      };
      note(
        report,
        Step::AssetReferences,
        status,
        index_file,
        format!("updated {count} asset path(s)"),
      );
    }

    for (step, outcome) in &patch.outcomes {
      let (status, message) = describe_index_outcome(*step, *outcome);
      note(report, *step, status, index_file, message);
    }

    if patch.written {
      info!(file = %index_file, "saved changes");
    }
  }

  fn patch_bundles(&self, report: &mut MigrationReport, assets_dir: &Path) {
    let config = self.layout.config();
    if !assets_dir.is_dir() {
      debug!(
        dir = %assets_dir.display(),
        "no asset directory; skipping bundle patches"
      );
      return;
    }

    match patch_webpack_runtime(config, assets_dir, &self.layout.public_path(), self.dry_run) {
      Ok(Some(patch)) => self.record_bundle(report, &patch),
      Ok(None) => debug!(
        pattern = %format!("{}*{}", config.webpack_prefix, config.webpack_suffix),
        "no webpack runtime found"
      ),
      Err(err) => {
        let runtime = format!("{}*{}", config.webpack_prefix, config.webpack_suffix);
        let message = format!("{err:#}");
        note(
          report,
          Step::PublicPath,
          StepStatus::Failed,
          &runtime,
          message.clone(),
        );
        note(report, Step::FlattenChunks, StepStatus::Failed, &runtime, message);
      }
    }

    match patch_build_manifest(config, assets_dir, self.dry_run) {
      Ok(Some(patch)) => self.record_bundle(report, &patch),
      Ok(None) => debug!(file = %config.build_manifest_file, "no build manifest found"),
      Err(err) => note(
        report,
        Step::FlattenChunks,
        StepStatus::Failed,
        &config.build_manifest_file,
        format!("{err:#}"),
      ),
    }
  }

  fn record_bundle(&self, report: &mut MigrationReport, patch: &BundlePatch) {
    if let Some(outcome) = patch.public_path {
      let (status, message) = match outcome {
        PatchOutcome::Applied => (
          StepStatus::Applied,
          format!("patched public path to {}", self.layout.public_path()),
        ),
        PatchOutcome::AlreadyApplied => (
          StepStatus::Skipped,
          "public path already points at the hosted assets".to_string(),
        ),
        PatchOutcome::NotFound => (
          StepStatus::Skipped,
          "no absolute public path found".to_string(),
        ),
      };
      note(report, Step::PublicPath, status, &patch.file_name, message);
    }

    let status = if patch.flattened > 0 {
      StepStatus::Applied
    } else {
      StepStatus::Skipped
    };
    note(
      report,
      Step::FlattenChunks,
      status,
      &patch.file_name,
      format!("flattened {} chunk path prefix(es)", patch.flattened),
    );

    if patch.written {
      info!(file = %patch.file_name, "saved patches");
    }
  }
}

fn describe_index_outcome(step: Step, outcome: PatchOutcome) -> (StepStatus, String) {
  let message = match (step, outcome) {
    (Step::BaseTag, PatchOutcome::Applied) => "injected <base> tag",
    (Step::BaseTag, PatchOutcome::AlreadyApplied) => "<base> tag already present",
    (Step::BaseTag, PatchOutcome::NotFound) => "no <head> tag to anchor the <base> tag",
    (Step::BrandingStyles, PatchOutcome::Applied) => "injected CSS to hide branding",
    (Step::BrandingStyles, PatchOutcome::AlreadyApplied) => "branding CSS already present",
    (Step::BrandingStyles, PatchOutcome::NotFound) => "no </head> tag to anchor the branding CSS",
    (Step::MediaQuery, PatchOutcome::Applied) => "fixed invalid CSS media query syntax",
    (Step::MediaQuery, _) => "no invalid media query found",
    (_, PatchOutcome::Applied) => "applied",
    (_, _) => "nothing to do",
  };
  let status = if outcome.is_applied() {
    StepStatus::Applied
  } else {
    StepStatus::Skipped
  };
  (status, message.to_string())
}

/// Log a step result and append it to the report.
fn note(
  report: &mut MigrationReport,
  step: Step,
  status: StepStatus,
  target: &str,
  message: String,
) {
  let level = level_for(step, status);
  if level == Level::ERROR {
    error!(%step, file = target, "{message}");
  } else if level == Level::WARN {
    warn!(%step, file = target, "{message}");
  } else if level == Level::INFO {
    info!(%step, file = target, "{message}");
  } else {
    debug!(%step, file = target, "{message}");
  }
  report.record(step, status, target, message);
}

/// Log level for a step result. A site without any asset directory is a normal case.
fn level_for(step: Step, status: StepStatus) -> Level {
  match (step, status) {
    (_, StepStatus::Failed) | (Step::IndexHtml, StepStatus::Missing) => Level::ERROR,
    (Step::RenameAssets, StepStatus::Missing) => Level::INFO,
    (_, StepStatus::Missing) => Level::WARN,
    (_, StepStatus::Applied) => Level::INFO,
    (_, StepStatus::Skipped) => Level::DEBUG,
  }
}
