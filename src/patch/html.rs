//! Patching the exported `index.html` for hosting under a sub-path.

use anyhow::Result;
use regex::{NoExpand, Regex};

use super::{PatchOutcome, read_text, styles, write_if_changed};
use crate::models::Step;
use crate::project::SiteLayout;

/// Changes made to the entry document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPatch {
  /// Number of references to the exported asset directory that were rewritten, when an
  /// exported directory was known.
  pub asset_references: Option<usize>,
  /// Outcome of each guarded rewrite, in the order they ran.
  pub outcomes: Vec<(Step, PatchOutcome)>,
  /// Whether the document was written back.
  pub written: bool,
}

/// Replace every occurrence of the exported directory name with the canonical one.
///
/// This is a plain substring replacement; a name that also appears in unrelated text is
/// rewritten there as well.
pub fn rewrite_asset_references(
  text: &mut String,
  legacy: &str,
  canonical: &str,
) -> Result<usize> {
  let pattern = Regex::new(&regex::escape(legacy))?;
  let count = pattern.find_iter(text).count();
  if count > 0 {
    *text = pattern.replace_all(text, NoExpand(canonical)).into_owned();
  }
  Ok(count)
}

/// Insert `<base href="...">` right after the opening `<head>` tag.
pub fn inject_base_tag(text: &mut String, base_href: &str) -> PatchOutcome {
  if text.contains("<base href=") {
    return PatchOutcome::AlreadyApplied;
  }
  if !text.contains("<head>") {
    return PatchOutcome::NotFound;
  }

  *text = text.replacen("<head>", &format!("<head>\n  <base href=\"{base_href}\">"), 1);
  PatchOutcome::Applied
}

/// Apply every entry document rewrite in memory.
pub fn patch_index_text(
  text: &mut String,
  layout: &SiteLayout,
  legacy: Option<&str>,
) -> Result<(Option<usize>, Vec<(Step, PatchOutcome)>)> {
  let asset_references = match legacy {
    Some(legacy) => Some(rewrite_asset_references(
      text,
      legacy,
      &layout.config().assets_dir,
    )?),
    None => None,
  };

  let outcomes = vec![
    (Step::BaseTag, inject_base_tag(text, &layout.base_href())),
    (Step::BrandingStyles, styles::inject_branding_overrides(text)),
    (Step::MediaQuery, styles::repair_media_query(text)),
  ];

  Ok((asset_references, outcomes))
}

/// Patch the entry document in place.
///
/// Returns `Ok(None)` when the site has no entry document.
pub fn patch_index_html(
  layout: &SiteLayout,
  legacy: Option<&str>,
  dry_run: bool,
) -> Result<Option<IndexPatch>> {
  let index_path = layout.index_html();
  if !index_path.is_file() {
    return Ok(None);
  }

  let original = read_text(&index_path)?;
  let mut text = original.clone();
  let (asset_references, outcomes) = patch_index_text(&mut text, layout, legacy)?;
  let written = write_if_changed(&index_path, &original, &text, dry_run)?;

  Ok(Some(IndexPatch {
    asset_references,
    outcomes,
    written,
  }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::MigrationConfig;
  use std::fs;
  use std::path::Path;
  use tempfile::tempdir;

  fn layout(root: &Path) -> SiteLayout {
    SiteLayout::resolve(MigrationConfig::default(), root, Some("launch-deck")).unwrap()
  }

  const EXPORTED: &str = r#"<!DOCTYPE html>
<html>
<head>
  <link rel="stylesheet" href="./Launch (v2)_files/app.css">
  <style>
    @media only screen and (max-device-width: 812px) and (-webkit-min-device-pixel-ratio: 2), @media only screen and (max-width: 500px) { body { margin: 0; } }
  </style>
</head>
<body>
  <script src="./Launch (v2)_files/webpack-1234.js"></script>
</body>
</html>
"#;

  #[test]
  fn escapes_special_characters_in_exported_name() {
    let mut text = "a/Launch (v2)_files/x.js b/Launch v2_files/y.js".to_string();
    let count = rewrite_asset_references(&mut text, "Launch (v2)_files", "assets").unwrap();
    assert_eq!(count, 1);
    assert_eq!(text, "a/assets/x.js b/Launch v2_files/y.js");
  }

  #[test]
  fn canonical_name_is_inserted_literally() {
    let mut text = "old_files/app.js".to_string();
    rewrite_asset_references(&mut text, "old_files", "$1").unwrap();
    assert_eq!(text, "$1/app.js");
  }

  #[test]
  fn injects_single_base_tag() {
    let mut text = "<html><head><title>x</title></head></html>".to_string();
    assert_eq!(inject_base_tag(&mut text, "/sites/deck/"), PatchOutcome::Applied);
    assert!(text.starts_with("<html><head>\n  <base href=\"/sites/deck/\"><title>"));

    assert_eq!(
      inject_base_tag(&mut text, "/sites/deck/"),
      PatchOutcome::AlreadyApplied
    );
    assert_eq!(text.matches("<base href=").count(), 1);
  }

  #[test]
  fn keeps_existing_base_tag() {
    let mut text = r#"<head><base href="/elsewhere/"></head>"#.to_string();
    assert_eq!(
      inject_base_tag(&mut text, "/sites/deck/"),
      PatchOutcome::AlreadyApplied
    );
    assert!(!text.contains("/sites/deck/"));
  }

  #[test]
  fn patches_exported_document() {
    let dir = tempdir().unwrap();
    let layout = layout(dir.path());
    let index_path = dir.path().join("index.html");
    fs::write(&index_path, EXPORTED).unwrap();

    let patch = patch_index_html(&layout, Some("Launch (v2)_files"), false)
      .unwrap()
      .unwrap();
    assert_eq!(patch.asset_references, Some(2));
    assert!(patch.written);
    assert!(patch.outcomes.iter().all(|(_, outcome)| outcome.is_applied()));

    let updated = fs::read_to_string(&index_path).unwrap();
    assert!(!updated.contains("_files"));
    assert!(updated.contains(r#"href="./assets/app.css""#));
    assert_eq!(
      updated
        .matches(r#"<base href="/sites/launch-deck/">"#)
        .count(),
      1
    );
    assert!(updated.contains(r#"[data-id="made-with-gamma-btn"]"#));
    assert!(updated.contains("(-webkit-min-device-pixel-ratio: 2),\n    only screen and (max-width: 500px)"));
  }

  #[test]
  fn second_pass_changes_nothing() {
    let dir = tempdir().unwrap();
    let layout = layout(dir.path());
    let index_path = dir.path().join("index.html");
    fs::write(&index_path, EXPORTED).unwrap();

    patch_index_html(&layout, Some("Launch (v2)_files"), false).unwrap();
    let first = fs::read_to_string(&index_path).unwrap();

    let patch = patch_index_html(&layout, None, false).unwrap().unwrap();
    assert!(!patch.written);
    assert_eq!(patch.asset_references, None);
    assert!(patch.outcomes.iter().all(|(_, outcome)| !outcome.is_applied()));
    assert_eq!(fs::read_to_string(&index_path).unwrap(), first);
  }

  #[test]
  fn dry_run_leaves_document_untouched() {
    let dir = tempdir().unwrap();
    let layout = layout(dir.path());
    let index_path = dir.path().join("index.html");
    fs::write(&index_path, EXPORTED).unwrap();

    let patch = patch_index_html(&layout, Some("Launch (v2)_files"), true)
      .unwrap()
      .unwrap();
    assert!(!patch.written);
    assert!(patch.outcomes.iter().any(|(_, outcome)| outcome.is_applied()));
    assert_eq!(fs::read_to_string(&index_path).unwrap(), EXPORTED);
  }

  #[test]
  fn missing_document_is_reported_as_none() {
    let dir = tempdir().unwrap();
    assert!(patch_index_html(&layout(dir.path()), None, false)
      .unwrap()
      .is_none());
  }
}
