#![cfg(test)]
/*!
Theme selector lint for the desktop build.

Purpose:
- Ensure that CSS selectors the dashboard components render (upload cards, filter
  bar, metric and session pickers, radar chart, report table, export panel) remain
  present in the shared theme: ui/assets/theme/main.css
- Fail fast if a refactor drops or renames a class the components still emit.

How it works:
- We compile‑time embed the theme using `include_str!` pointing to the shared
  `ui/` location (mirrors the constant in `desktop/src/main.rs`).
- We assert presence of a curated set of selectors / tokens.
- If you intentionally rename or remove a selector:
    1. Update the Dioxus component markup.
    2. Adjust this test's REQUIRED_SELECTORS accordingly.
*/

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/main.css"
));

/// Core selectors / tokens that must exist in the shared theme for desktop.
const REQUIRED_SELECTORS: &[&str] = &[
    // Global / layout
    ":root",
    "body {",
    ".page {",
    ".visually-hidden",
    // Buttons & shared UI
    ".button {",
    ".button--primary",
    ".button--accent",
    ".button--ghost",
    // Cards
    ".dashboard-card {",
    ".dashboard-card__header",
    ".dashboard-card__meta",
    ".dashboard-card__meta--error",
    ".dashboard-card__placeholder",
    // Upload
    ".upload-card__actions",
    ".upload-card__picker--busy",
    // Filters & pickers
    ".filter-bar",
    ".filter-bar__field",
    ".metric-picker__list",
    ".metric-picker__item",
    ".metric-picker__badge",
    ".session-picker__chips",
    ".session-chip",
    ".session-chip--active",
    // Radar chart
    ".radar-chart",
    ".radar-chart__grid",
    ".radar-chart__population",
    ".radar-chart__series",
    ".radar-chart__outlier",
    ".radar-chart__unscored",
    ".radar-chart__legend-swatch--population",
    // Report
    ".report__summary",
    ".report-table__grid",
    ".report-table__approx",
    ".export-panel__actions",
    // Media query token (sanity check responsive block exists)
    "@media (max-width: 720px)",
];

#[test]
fn unified_theme_contains_required_selectors() {
    let mut missing = Vec::new();
    for sel in REQUIRED_SELECTORS {
        if !THEME_CSS.contains(sel) {
            missing.push(*sel);
        }
    }

    if !missing.is_empty() {
        panic!(
            "Missing {} required CSS selectors/tokens in unified theme:\n{}",
            missing.len(),
            missing.join("\n")
        );
    }
}

#[test]
fn unified_theme_not_trivially_empty() {
    let non_ws_len = THEME_CSS.chars().filter(|c| !c.is_whitespace()).count();
    assert!(
        non_ws_len > 4_000,
        "Embedded theme appears unexpectedly small ({} non-whitespace chars) – \
         did the file get truncated or path change?",
        non_ws_len
    );
}

#[test]
fn meta_status_variants_are_paired() {
    // Upload and export feedback switch between these two modifiers.
    let has_success = THEME_CSS.contains(".dashboard-card__meta--success");
    let has_error = THEME_CSS.contains(".dashboard-card__meta--error");
    assert!(
        has_success && has_error,
        "Feedback modifiers missing (success: {has_success}, error: {has_error})"
    );
}

fn root_tokens() -> Vec<&'static str> {
    let Some((_, rest)) = THEME_CSS.split_once(":root {") else {
        panic!("theme has no :root block");
    };
    let block = rest.split('}').next().unwrap_or_default();
    block
        .lines()
        .filter_map(|line| line.trim().split_once(':'))
        .map(|(name, _)| name.trim())
        .filter(|name| name.starts_with("--"))
        .collect()
}

#[test]
fn dashboard_tokens_are_declared_once_in_root() {
    let tokens = root_tokens();
    for token in [
        "--color-bg",
        "--color-surface",
        "--color-text",
        "--color-primary",
        "--color-danger",
        "--color-success",
        "--color-population",
        "--font-mono",
    ] {
        let count = tokens.iter().filter(|name| **name == token).count();
        assert_eq!(count, 1, "`{token}` declared {count} times in :root");
    }
}

#[test]
fn every_var_reference_resolves_to_a_root_token() {
    let tokens = root_tokens();
    let unresolved: Vec<&str> = THEME_CSS
        .split("var(")
        .skip(1)
        .map(|rest| {
            rest.split(|c: char| c == ')' || c == ',')
                .next()
                .unwrap_or_default()
                .trim()
        })
        .filter(|name| !tokens.contains(name))
        .collect();
    assert!(
        unresolved.is_empty(),
        "var() references without a :root declaration: {unresolved:?}"
    );
}
