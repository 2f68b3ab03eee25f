//! Stylesheet fixes for the exported entry document.

use std::sync::LazyLock;

use regex::Regex;

use super::PatchOutcome;

/// Selectors of the Gamma branding widgets hidden on rehosted sites.
pub const BRANDING_SELECTORS: [&str; 3] = [
  r#"[data-id="made-with-gamma-btn"]"#,
  ".node-buttonGroup",
  r#"[aria-label="Report this page"]"#,
];

/// The "made with Gamma" button selector doubles as the marker for an existing override block.
const BRANDING_MARKER: &str = BRANDING_SELECTORS[0];

static DUPLICATED_MEDIA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(@media only screen and \(max-device-width: \d+px\) and \(-webkit-min-device-pixel-ratio: [\d.]+\)),\s*@media only screen",
  )
  .expect("invalid media query regex")
});

/// `<style>` block hiding every branding selector.
pub fn branding_override_block() -> String {
  let selectors = BRANDING_SELECTORS
    .iter()
    .map(|selector| format!("    {selector}"))
    .collect::<Vec<_>>()
    .join(",\n");
  format!("\n  <style>\n{selectors} {{ display: none !important; }}\n  </style>")
}

/// Insert the branding override block right before `</head>`.
pub fn inject_branding_overrides(text: &mut String) -> PatchOutcome {
  if text.contains(BRANDING_MARKER) {
    return PatchOutcome::AlreadyApplied;
  }
  if !text.contains("</head>") {
    return PatchOutcome::NotFound;
  }

  *text = text.replacen(
    "</head>",
    &format!("{}\n</head>", branding_override_block()),
    1,
  );
  PatchOutcome::Applied
}

/// Drop the stray `@media` keyword the exporter emits inside a comma separated query list.
///
/// Both queries keep their original conditions; the second one simply loses the repeated
/// keyword so the list parses again.
pub fn repair_media_query(text: &mut String) -> PatchOutcome {
  if !DUPLICATED_MEDIA_PATTERN.is_match(text) {
    return PatchOutcome::NotFound;
  }

  *text = DUPLICATED_MEDIA_PATTERN
    .replace_all(text, "${1},\n    only screen")
    .into_owned();
  PatchOutcome::Applied
}

#[cfg(test)]
mod tests {
  use super::*;

  const MALFORMED: &str = "@media only screen and (max-device-width: 812px) and (-webkit-min-device-pixel-ratio: 2),\n  @media only screen and (max-width: 600px) { .card { padding: 0; } }";

  #[test]
  fn injects_overrides_before_head_close() {
    let mut text = "<html><head><title>Deck</title></head><body></body></html>".to_string();

    assert_eq!(inject_branding_overrides(&mut text), PatchOutcome::Applied);
    let style_at = text.find("<style>").unwrap();
    let head_close = text.find("</head>").unwrap();
    assert!(style_at < head_close);
    assert!(text.contains(".node-buttonGroup,"));
    assert!(text.contains(r#"[aria-label="Report this page"] { display: none !important; }"#));
  }

  #[test]
  fn does_not_duplicate_overrides() {
    let mut text = "<head></head>".to_string();
    inject_branding_overrides(&mut text);
    let once = text.clone();

    assert_eq!(inject_branding_overrides(&mut text), PatchOutcome::AlreadyApplied);
    assert_eq!(text, once);
    assert_eq!(text.matches("<style>").count(), 1);
  }

  #[test]
  fn skips_overrides_without_head_close() {
    let mut text = "<body>fragment</body>".to_string();
    assert_eq!(inject_branding_overrides(&mut text), PatchOutcome::NotFound);
    assert_eq!(text, "<body>fragment</body>");
  }

  #[test]
  fn repairs_duplicated_media_keyword() {
    let mut text = MALFORMED.to_string();

    assert_eq!(repair_media_query(&mut text), PatchOutcome::Applied);
    assert!(!text.contains(",\n  @media only screen"));
    assert_eq!(text.matches("@media").count(), 1);
    assert!(text.contains(
      "@media only screen and (max-device-width: 812px) and (-webkit-min-device-pixel-ratio: 2),\n    only screen and (max-width: 600px)"
    ));

    assert_eq!(repair_media_query(&mut text), PatchOutcome::NotFound);
  }

  #[test]
  fn leaves_valid_media_queries_alone() {
    let mut text = "@media only screen and (max-width: 600px) { }".to_string();
    assert_eq!(repair_media_query(&mut text), PatchOutcome::NotFound);
    assert_eq!(text, "@media only screen and (max-width: 600px) { }");
  }
}
