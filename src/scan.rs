//! Content directory scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Reads the TOML content files and produces a
//! [`Manifest`] that the generate stage renders from.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml                      # Site configuration (optional)
//! ├── translations/
//! │   ├── en.toml                      # UI copy (default locale required)
//! │   └── es.toml
//! ├── home.toml                        # Capabilities, pillars, contacts (optional)
//! ├── certifications.toml              # [[certification]] entries (optional)
//! ├── products/
//! │   ├── 010-avocados-hass.toml       # Numbered = listed, sorted by number
//! │   ├── 020-dragon-fruit-red.toml
//! │   └── seasonal-special.toml        # Unnumbered = page only, not listed
//! └── assets/                          # Copied verbatim to the output root
//! ```
//!
//! ## Validation
//!
//! The scanner enforces these rules:
//! - Product slugs are lowercase URL segments and unique
//! - No duplicate product numbers
//! - Certification ids are unique
//! - Home page certification references resolve

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::{self, SiteConfig};
use crate::i18n::{Catalog, CatalogError, Locale};
use crate::naming::{is_valid_slug, parse_entry_name};
use crate::types::{
    Assortment, Certification, HomeContent, Localized, Product, ProductCategory,
};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Translation error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Duplicate product number {0} in {1}")]
    DuplicateNumber(u32, PathBuf),
    #[error("Duplicate product slug '{0}'")]
    DuplicateSlug(String),
    #[error("Invalid product slug '{slug}' from {path} (use lowercase letters, digits and dashes)")]
    InvalidSlug { slug: String, path: PathBuf },
    #[error("Duplicate certification id '{0}'")]
    DuplicateCertification(String),
    #[error("home.toml references unknown certification '{0}'")]
    UnknownCertification(String),
}

/// Manifest output from the scan stage.
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub config: SiteConfig,
    pub catalog: Catalog,
    pub products: Vec<Product>,
    pub certifications: Vec<Certification>,
    pub home: HomeContent,
    /// Content root, for copying `assets/` during generation.
    pub source: PathBuf,
}

impl Manifest {
    /// Numbered products in catalog order.
    pub fn listed_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.in_listing)
    }

    pub fn featured_products(&self) -> impl Iterator<Item = &Product> {
        self.listed_products().filter(|p| p.featured)
    }

    pub fn certification(&self, id: &str) -> Option<&Certification> {
        self.certifications.iter().find(|c| c.id == id)
    }
}

/// On-disk shape of `products/*.toml`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProductFile {
    name: Localized,
    summary: Localized,
    description: Localized,
    category: ProductCategory,
    origin: Vec<String>,
    seasonality: Localized,
    #[serde(default)]
    packaging: Vec<Localized>,
    #[serde(default)]
    certifications: Vec<String>,
    image: Option<String>,
    card_image: Option<String>,
    #[serde(default)]
    featured: bool,
    assortment: Option<Assortment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CertificationsFile {
    certification: Vec<Certification>,
}

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    let catalog = Catalog::load(&root.join("translations"), config.site.default_locale)?;
    let products = load_products(&root.join("products"))?;
    let certifications = load_certifications(&root.join("certifications.toml"))?;
    let home: HomeContent = read_optional_toml(&root.join("home.toml"))?.unwrap_or_default();

    let known: BTreeSet<&str> = certifications.iter().map(|c| c.id.as_str()).collect();
    if let Some(unknown) = home
        .quality_certifications
        .iter()
        .find(|id| !known.contains(id.as_str()))
    {
        return Err(ScanError::UnknownCertification(unknown.clone()));
    }

    debug!(
        products = products.len(),
        certifications = certifications.len(),
        "content scanned"
    );

    Ok(Manifest {
        config,
        catalog,
        products,
        certifications,
        home,
        source: root.to_path_buf(),
    })
}

/// Load every `*.toml` under `products/`, ordered by number prefix.
fn load_products(dir: &Path) -> Result<Vec<Product>, ScanError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension().is_some_and(|e| e.eq_ignore_ascii_case("toml"))
                && !p
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with('.'))
        })
        .collect();
    files.sort();

    let mut numbers: BTreeMap<u32, PathBuf> = BTreeMap::new();
    let mut slugs = BTreeSet::new();
    let mut products = Vec::new();

    for path in &files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let parsed = parse_entry_name(&stem);

        if !is_valid_slug(&parsed.name) {
            return Err(ScanError::InvalidSlug {
                slug: parsed.name,
                path: path.clone(),
            });
        }
        if let Some(num) = parsed.number
            && numbers.insert(num, path.clone()).is_some()
        {
            return Err(ScanError::DuplicateNumber(num, dir.to_path_buf()));
        }
        if !slugs.insert(parsed.name.clone()) {
            return Err(ScanError::DuplicateSlug(parsed.name));
        }

        let file: ProductFile = read_toml(path)?;
        products.push(Product {
            slug: parsed.name,
            sort_key: parsed.number.unwrap_or(u32::MAX),
            in_listing: parsed.number.is_some(),
            name: file.name,
            summary: file.summary,
            description: file.description,
            category: file.category,
            origin: file.origin,
            seasonality: file.seasonality,
            packaging: file.packaging,
            certifications: file.certifications,
            image: file.image,
            card_image: file.card_image,
            featured: file.featured,
            assortment: file.assortment,
        });
    }

    products.sort_by(|a, b| a.sort_key.cmp(&b.sort_key).then_with(|| a.slug.cmp(&b.slug)));
    Ok(products)
}

fn load_certifications(path: &Path) -> Result<Vec<Certification>, ScanError> {
    let file: CertificationsFile = read_optional_toml(path)?.unwrap_or_default();
    let mut seen = BTreeSet::new();
    for cert in &file.certification {
        if !seen.insert(cert.id.as_str()) {
            return Err(ScanError::DuplicateCertification(cert.id.clone()));
        }
    }
    Ok(file.certification)
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ScanError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| ScanError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional_toml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ScanError> {
    if !path.exists() {
        return Ok(None);
    }
    read_toml(path).map(Some)
}

// =============================================================================
// Translation coverage
// =============================================================================

/// Result of checking the catalog against the content.
#[derive(Debug, Default)]
pub struct CoverageReport {
    /// Keys the default locale defines but `locale` does not. Warnings.
    pub missing: Vec<(Locale, String)>,
    /// Keys the content refers to that the default locale lacks. Errors.
    pub unknown: Vec<String>,
}

impl CoverageReport {
    pub fn is_ok(&self) -> bool {
        self.unknown.is_empty()
    }
}

/// Catalog keys the content files point at (capability and pillar copy,
/// contact roles).
pub fn referenced_keys(manifest: &Manifest) -> Vec<String> {
    let mut keys = Vec::new();
    for cap in &manifest.home.capabilities {
        keys.push(format!("capabilities.{}.title", cap.id));
        keys.push(format!("capabilities.{}.description", cap.id));
    }
    for pillar in &manifest.home.pillars {
        keys.push(format!("quality.{pillar}.title"));
        keys.push(format!("quality.{pillar}.description"));
    }
    for contact in &manifest.home.contacts {
        keys.push(contact.role.clone());
    }
    keys
}

pub fn check_coverage(manifest: &Manifest) -> CoverageReport {
    let catalog = &manifest.catalog;
    let missing = Locale::ALL
        .into_iter()
        .filter(|l| *l != catalog.default_locale)
        .flat_map(|l| {
            catalog
                .missing_keys(l)
                .into_iter()
                .map(move |k| (l, k.to_string()))
        })
        .collect();
    let unknown = referenced_keys(manifest)
        .into_iter()
        .filter(|k| !catalog.contains(k))
        .collect();
    CoverageReport { missing, unknown }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn scan_reads_shipped_content() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();

        assert_eq!(manifest.products.len(), 7);
        assert_eq!(manifest.certifications.len(), 10);
        assert_eq!(manifest.home.capabilities.len(), 3);
        assert_eq!(manifest.catalog.t(Locale::Es, "nav.products"), "Productos");
    }

    #[test]
    fn products_sorted_by_number() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        assert_eq!(
            product_slugs(&manifest),
            vec![
                "avocados-hass",
                "dragon-fruit-red",
                "dragon-fruit-yellow",
                "lemons",
                "blueberries",
                "frozen",
                "pulp"
            ]
        );
    }

    #[test]
    fn featured_products_are_listed_subset() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let featured: Vec<&str> = manifest.featured_products().map(|p| p.slug.as_str()).collect();
        assert_eq!(featured, vec!["avocados-hass", "dragon-fruit-red", "dragon-fruit-yellow"]);
    }

    #[test]
    fn product_fields_are_loaded() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let pulp = find_product(&manifest, "pulp");
        assert_eq!(pulp.category, ProductCategory::Pulp);
        assert_eq!(pulp.name.get(Locale::Es), "Pulpa Zavaya");
        let flavors = pulp.assortment.as_ref().unwrap();
        assert_eq!(flavors.items.len(), 4);
    }

    #[test]
    fn unnumbered_product_is_not_listed() {
        let tmp = setup_content();
        let src = tmp.path().join("products/040-lemons.toml");
        fs::rename(&src, tmp.path().join("products/lemons.toml")).unwrap();

        let manifest = scan(tmp.path()).unwrap();
        let lemons = find_product(&manifest, "lemons");
        assert!(!lemons.in_listing);
        assert_eq!(manifest.products.last().unwrap().slug, "lemons");
        assert_eq!(manifest.listed_products().count(), 6);
    }

    #[test]
    fn duplicate_number_is_error() {
        let tmp = setup_content();
        fs::copy(
            tmp.path().join("products/040-lemons.toml"),
            tmp.path().join("products/040-limes.toml"),
        )
        .unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::DuplicateNumber(40, _)));
    }

    #[test]
    fn duplicate_slug_is_error() {
        let tmp = setup_content();
        fs::copy(
            tmp.path().join("products/040-lemons.toml"),
            tmp.path().join("products/090-lemons.toml"),
        )
        .unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::DuplicateSlug(s) if s == "lemons"));
    }

    #[test]
    fn invalid_slug_is_error() {
        let tmp = setup_content();
        fs::copy(
            tmp.path().join("products/040-lemons.toml"),
            tmp.path().join("products/090-Key-Limes.toml"),
        )
        .unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidSlug { slug, .. } if slug == "Key-Limes"));
    }

    #[test]
    fn unknown_product_field_names_file() {
        let tmp = setup_content();
        let path = tmp.path().join("products/040-lemons.toml");
        let mut content = fs::read_to_string(&path).unwrap();
        content.insert_str(0, "colour = \"yellow\"\n");
        fs::write(&path, content).unwrap();

        let err = scan(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("040-lemons.toml"));
    }

    #[test]
    fn missing_optional_files_use_defaults() {
        let tmp = setup_content();
        fs::remove_file(tmp.path().join("home.toml")).unwrap();
        fs::remove_file(tmp.path().join("certifications.toml")).unwrap();
        fs::remove_dir_all(tmp.path().join("products")).unwrap();

        let manifest = scan(tmp.path()).unwrap();
        assert!(manifest.products.is_empty());
        assert!(manifest.certifications.is_empty());
        assert!(manifest.home.capabilities.is_empty());
    }

    #[test]
    fn missing_default_translations_is_error() {
        let tmp = setup_content();
        fs::remove_file(tmp.path().join("translations/en.toml")).unwrap();
        assert!(matches!(
            scan(tmp.path()),
            Err(ScanError::Catalog(CatalogError::MissingDefault(_)))
        ));
    }

    #[test]
    fn unknown_quality_certification_is_error() {
        let tmp = setup_content();
        let path = tmp.path().join("home.toml");
        let content = fs::read_to_string(&path)
            .unwrap()
            .replace("\"fsma\"", "\"iso-9001\"");
        fs::write(&path, content).unwrap();
        let err = scan(tmp.path()).unwrap_err();
        assert!(matches!(err, ScanError::UnknownCertification(id) if id == "iso-9001"));
    }

    #[test]
    fn duplicate_certification_is_error() {
        let tmp = setup_content();
        let path = tmp.path().join("certifications.toml");
        let mut content = fs::read_to_string(&path).unwrap();
        content.push_str(
            "\n[[certification]]\nid = \"usda\"\nlabel = \"USDA\"\ndescription = { en = \"again\" }\n",
        );
        fs::write(&path, content).unwrap();
        assert!(matches!(
            scan(tmp.path()),
            Err(ScanError::DuplicateCertification(id)) if id == "usda"
        ));
    }

    #[test]
    fn manifest_round_trips_through_json() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(product_slugs(&back), product_slugs(&manifest));
        assert_eq!(back.catalog.t(Locale::Es, "hero.cta"), "Cotización");
    }

    // =========================================================================
    // Coverage
    // =========================================================================

    #[test]
    fn shipped_content_has_full_coverage() {
        let tmp = setup_content();
        let manifest = scan(tmp.path()).unwrap();
        let report = check_coverage(&manifest);
        assert!(report.is_ok(), "unknown keys: {:?}", report.unknown);
        assert!(report.missing.is_empty(), "missing: {:?}", report.missing);
    }

    #[test]
    fn coverage_reports_missing_and_unknown() {
        let tmp = setup_content();
        let es = tmp.path().join("translations/es.toml");
        let content = fs::read_to_string(&es)
            .unwrap()
            .replace("getPricing = \"Cotización\"\n", "");
        fs::write(&es, content).unwrap();

        let mut manifest = scan(tmp.path()).unwrap();
        manifest.home.pillars.push("coldRoom".to_string());

        let report = check_coverage(&manifest);
        assert_eq!(report.missing, vec![(Locale::Es, "nav.getPricing".to_string())]);
        assert_eq!(
            report.unknown,
            vec!["quality.coldRoom.title".to_string(), "quality.coldRoom.description".to_string()]
        );
        assert!(!report.is_ok());
    }
}
