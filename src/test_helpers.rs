//! Shared test utilities.
//!
//! Provides an isolated copy of the shipped `content/` directory plus lookup
//! helpers that panic with the available options on a miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_content();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let pulp = find_product(&manifest, "pulp");
//! assert_eq!(pulp.name.en, "Zavaya Pulp");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::scan::{Manifest, scan};
use crate::types::{Certification, Product};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the shipped content.
pub fn setup_content() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let content = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
    copy_dir_recursive(&content, tmp.path()).unwrap();
    tmp
}

/// Scan a fresh copy of the shipped content. The temp dir must outlive the
/// manifest only if the test copies assets.
pub fn scanned_content() -> (TempDir, Manifest) {
    let tmp = setup_content();
    let manifest = scan(tmp.path()).unwrap();
    (tmp, manifest)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Manifest lookups, panicking with the available options on a miss
// =========================================================================

/// Find a product by slug. Panics if not found.
pub fn find_product<'a>(manifest: &'a Manifest, slug: &str) -> &'a Product {
    manifest
        .products
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            let slugs = product_slugs(manifest);
            panic!("product '{slug}' not found. Available: {slugs:?}")
        })
}

/// Find a certification by id. Panics if not found.
pub fn find_certification<'a>(manifest: &'a Manifest, id: &str) -> &'a Certification {
    manifest.certification(id).unwrap_or_else(|| {
        let ids: Vec<&str> = manifest.certifications.iter().map(|c| c.id.as_str()).collect();
        panic!("certification '{id}' not found. Available: {ids:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All product slugs in manifest order.
pub fn product_slugs(manifest: &Manifest) -> Vec<&str> {
    manifest.products.iter().map(|p| p.slug.as_str()).collect()
}

// =========================================================================
// HTML helpers
// =========================================================================

/// Count non-overlapping occurrences of `needle` in `html`.
pub fn count(html: &str, needle: &str) -> usize {
    html.matches(needle).count()
}

/// The opening tag of the first element whose attributes contain `marker`.
/// Panics if absent.
pub fn tag_containing<'a>(html: &'a str, marker: &str) -> &'a str {
    let pos = html
        .find(marker)
        .unwrap_or_else(|| panic!("'{marker}' not found in html"));
    let start = html[..pos].rfind('<').unwrap_or(0);
    let end = pos + html[pos..].find('>').unwrap_or(html.len() - pos);
    &html[start..=end.min(html.len() - 1)]
}
