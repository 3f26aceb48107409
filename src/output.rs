//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (product, certification, page) is its semantic identity,
//! a positional index and a title, with filesystem paths shown as secondary
//! context via indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Products
//! 001 Zavaya Hass Avocados (fresh, featured)
//!     Source: products/010-avocados-hass.toml
//!
//! Certifications
//! 001 USDA
//! 007 TBD (pending)
//!
//! Home
//!     3 capabilities, 3 quality pillars, 2 contacts
//!
//! Translations
//!     en: 92 keys (default)
//!     es: 92 keys
//!
//! Config
//!     config.toml
//!     assets/
//! ```
//!
//! ## Generate
//!
//! ```text
//! en
//!     home → index.html (14 reveal elements)
//!     products → products/index.html (8 reveal elements)
//! es
//!     home → es/index.html (14 reveal elements)
//!
//! Assets
//!     style-3f2a9c01d4.css
//!     reveal-81b07e55aa.js
//!     1 file copied from assets/
//!
//! Generated 20 pages in 2 locales
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::GenerateReport;
use crate::i18n::Locale;
use crate::reveal::sim::Size;
use crate::scan::{CoverageReport, Manifest};
use crate::timeline::Timeline;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn format_ms(d: Duration) -> String {
    format!("{}ms", d.as_millis())
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered content.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Products".to_string());
    for (i, product) in manifest.listed_products().enumerate() {
        let mut tags = vec![format!("{:?}", product.category).to_lowercase()];
        if product.featured {
            tags.push("featured".to_string());
        }
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            product.name.en,
            tags.join(", ")
        ));
        lines.push(format!(
            "    Source: products/{:03}-{}.toml",
            product.sort_key, product.slug
        ));
    }
    // Unnumbered products get a page but no listing slot.
    for product in manifest.products.iter().filter(|p| !p.in_listing) {
        lines.push(format!("    {} (unlisted)", product.name.en));
        lines.push(format!("        Source: products/{}.toml", product.slug));
    }

    if !manifest.certifications.is_empty() {
        lines.push(String::new());
        lines.push("Certifications".to_string());
        for (i, cert) in manifest.certifications.iter().enumerate() {
            let marker = if cert.placeholder { " (pending)" } else { "" };
            lines.push(format!("{} {}{}", format_index(i + 1), cert.label, marker));
        }
    }

    let home = &manifest.home;
    lines.push(String::new());
    lines.push("Home".to_string());
    lines.push(format!(
        "    {}, {}, {}",
        plural(home.capabilities.len(), "capability", "capabilities"),
        plural(home.pillars.len(), "quality pillar", "quality pillars"),
        plural(home.contacts.len(), "contact", "contacts")
    ));

    lines.push(String::new());
    lines.push("Translations".to_string());
    for locale in Locale::ALL {
        let keys = manifest.catalog.table(locale).len();
        let marker = if locale == manifest.catalog.default_locale {
            " (default)"
        } else {
            ""
        };
        lines.push(format!("    {locale}: {}{marker}", plural(keys, "key", "keys")));
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join("config.toml").exists() {
        lines.push("    config.toml".to_string());
    }
    if source_root.join("assets").is_dir() {
        lines.push("    assets/".to_string());
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Generate output
// ============================================================================

/// Format generate stage output: pages grouped by locale, then assets.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    let mut locales = 0;

    for locale in Locale::ALL {
        let pages: Vec<_> = report.pages.iter().filter(|p| p.locale == locale).collect();
        if pages.is_empty() {
            continue;
        }
        locales += 1;
        lines.push(locale.to_string());
        for page in pages {
            lines.push(format!(
                "    {} → {} ({})",
                page.route,
                page.path.display(),
                plural(page.reveal_elements, "reveal element", "reveal elements")
            ));
        }
    }

    lines.push(String::new());
    lines.push("Assets".to_string());
    lines.push(format!("    {}", report.stylesheet));
    match &report.script {
        Some(script) => lines.push(format!("    {script}")),
        None => lines.push("    no script (prerendered revealed)".to_string()),
    }
    if report.assets_copied > 0 {
        lines.push(format!(
            "    {} copied from assets/",
            plural(report.assets_copied, "file", "files")
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} in {}",
        plural(report.pages.len(), "page", "pages"),
        plural(locales, "locale", "locales")
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format translation coverage: missing keys warn, unknown keys fail.
pub fn format_check_output(report: &CoverageReport) -> Vec<String> {
    let mut lines = vec!["Translations".to_string()];
    for (locale, key) in &report.missing {
        lines.push(format!("    warning: {locale} has no text for '{key}'"));
    }
    for key in &report.unknown {
        lines.push(format!("    error: content refers to unknown key '{key}'"));
    }
    if report.missing.is_empty() && report.unknown.is_empty() {
        lines.push("    every key translated".to_string());
    }
    lines
}

pub fn print_check_output(report: &CoverageReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Timeline output
// ============================================================================

/// Format a simulated scroll as one row per element, in page order.
///
/// ```text
/// home (en) at 1280x800, page 5012px
///    top   delay  revealed  element
///     72     0ms       0ms  hero text
///    770   120ms    1520ms  capability cards #2
/// Revealed 22/22 elements, 15 timers, 8200ms simulated
/// ```
pub fn format_timeline(timeline: &Timeline, page: &str, viewport: Size) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{page} at {}x{}, page {:.0}px",
            viewport.width, viewport.height, timeline.page_height
        ),
        format!("{:>6}  {:>6}  {:>8}  element", "top", "delay", "revealed"),
    ];
    for row in &timeline.rows {
        let label = match row.index {
            Some(i) => format!("{} #{}", row.label, i + 1),
            None => row.label.clone(),
        };
        let revealed = row.revealed_at.map_or_else(|| "never".to_string(), format_ms);
        lines.push(format!(
            "{:>6.0}  {:>6}  {:>8}  {}",
            row.top,
            format_ms(row.delay),
            revealed,
            label
        ));
    }
    lines.push(format!(
        "Revealed {}/{} elements, {}, {} simulated",
        timeline.revealed_count(),
        timeline.rows.len(),
        plural(timeline.timers_created, "timer", "timers"),
        format_ms(timeline.duration)
    ));
    lines
}

pub fn print_timeline(timeline: &Timeline, page: &str, viewport: Size) {
    for line in format_timeline(timeline, page, viewport) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GeneratedPage, Route};
    use crate::reveal::NodeId;
    use crate::test_helpers::*;
    use crate::timeline::TimelineRow;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "page", "pages"), "1 page");
        assert_eq!(plural(0, "page", "pages"), "0 pages");
        assert_eq!(plural(3, "capability", "capabilities"), "3 capabilities");
    }

    #[test]
    fn scan_output_lists_products_in_order() {
        let (tmp, manifest) = scanned_content();
        let lines = format_scan_output(&manifest, tmp.path());

        assert_eq!(lines[0], "Products");
        assert_eq!(lines[1], "001 Zavaya Hass Avocados (fresh, featured)");
        assert_eq!(lines[2], "    Source: products/010-avocados-hass.toml");
        assert!(lines.contains(&"    config.toml".to_string()));
        assert!(lines.contains(&"    assets/".to_string()));
        assert!(lines.contains(&"    en: 92 keys (default)".to_string()));
    }

    #[test]
    fn scan_output_marks_pending_certifications() {
        let (tmp, manifest) = scanned_content();
        let lines = format_scan_output(&manifest, tmp.path());
        let pending = lines.iter().filter(|l| l.ends_with("(pending)")).count();
        let placeholders = manifest.certifications.iter().filter(|c| c.placeholder).count();
        assert_eq!(pending, placeholders);
    }

    #[test]
    fn scan_output_shows_unlisted_products() {
        let (tmp, mut manifest) = scanned_content();
        manifest.products[0].in_listing = false;
        let lines = format_scan_output(&manifest, tmp.path());
        assert!(lines.contains(&"    Zavaya Hass Avocados (unlisted)".to_string()));
        assert!(lines.contains(&"        Source: products/avocados-hass.toml".to_string()));
    }

    fn report(script: Option<&str>) -> GenerateReport {
        GenerateReport {
            pages: vec![
                GeneratedPage {
                    route: Route::Home,
                    path: PathBuf::from("index.html"),
                    locale: Locale::En,
                    reveal_elements: 14,
                },
                GeneratedPage {
                    route: Route::Product("pulp".into()),
                    path: PathBuf::from("es/products/pulp/index.html"),
                    locale: Locale::Es,
                    reveal_elements: 1,
                },
            ],
            stylesheet: "style-0123456789.css".to_string(),
            script: script.map(str::to_string),
            assets_copied: 1,
        }
    }

    #[test]
    fn generate_output_groups_by_locale() {
        let lines = format_generate_output(&report(Some("reveal-abcdef0123.js")));
        assert_eq!(lines[0], "en");
        assert_eq!(lines[1], "    home → index.html (14 reveal elements)");
        assert_eq!(lines[2], "es");
        assert_eq!(
            lines[3],
            "    product:pulp → es/products/pulp/index.html (1 reveal element)"
        );
        assert!(lines.contains(&"    reveal-abcdef0123.js".to_string()));
        assert!(lines.contains(&"    1 file copied from assets/".to_string()));
        assert_eq!(lines.last().unwrap(), "Generated 2 pages in 2 locales");
    }

    #[test]
    fn generate_output_notes_missing_script() {
        let lines = format_generate_output(&report(None));
        assert!(lines.contains(&"    no script (prerendered revealed)".to_string()));
    }

    #[test]
    fn check_output() {
        let ok = format_check_output(&CoverageReport::default());
        assert_eq!(ok, vec!["Translations", "    every key translated"]);

        let report = CoverageReport {
            missing: vec![(Locale::Es, "hero.cta".to_string())],
            unknown: vec!["quality.audits.title".to_string()],
        };
        let lines = format_check_output(&report);
        assert_eq!(lines[1], "    warning: es has no text for 'hero.cta'");
        assert_eq!(lines[2], "    error: content refers to unknown key 'quality.audits.title'");
    }

    #[test]
    fn timeline_rows() {
        let timeline = Timeline {
            rows: vec![
                TimelineRow {
                    label: "hero text".to_string(),
                    index: None,
                    node: NodeId(1),
                    top: 72.0,
                    delay: Duration::ZERO,
                    revealed_at: Some(Duration::ZERO),
                },
                TimelineRow {
                    label: "cards".to_string(),
                    index: Some(1),
                    node: NodeId(3),
                    top: 770.0,
                    delay: Duration::from_millis(120),
                    revealed_at: None,
                },
            ],
            page_height: 1500.0,
            duration: Duration::from_millis(2400),
            timers_created: 1,
        };
        let lines = format_timeline(&timeline, "home (en)", Size::new(1280.0, 800.0));
        assert_eq!(lines[0], "home (en) at 1280x800, page 1500px");
        assert_eq!(lines[1], "   top   delay  revealed  element");
        assert_eq!(lines[2], "    72     0ms       0ms  hero text");
        assert_eq!(lines[3], "   770   120ms     never  cards #2");
        assert_eq!(lines[4], "Revealed 1/2 elements, 1 timer, 2400ms simulated");
    }
}
