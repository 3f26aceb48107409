//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged on top, so a config
//! file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml              # Overrides stock defaults
//! ├── translations/
//! └── products/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Global Gate Produce"
//! brand = "Zavaya"
//! default_locale = "en"     # Served at the site root; the other under /<code>/
//! base_path = "/"           # URL prefix when hosted in a subdirectory
//! form_action = "#"         # Contact form target (no backend ships with the site)
//! copyright_year = 2026
//!
//! [colors]
//! primary = "#166534"
//! mint = "#4ade80"
//! # ...
//!
//! [reveal]
//! prerender = "animated"    # or "revealed": static pages, no script
//!
//! [reveal.default]
//! threshold = 0.15
//! root_margin = "0px 0px -10% 0px"
//!
//! [reveal.image]
//! threshold = 0.15
//! root_margin = "0px 0px -25% 0px"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::i18n::Locale;
use crate::reveal::{VariantPreset, VariantPresets};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Identity, locale and URL settings.
    pub site: SiteSection,
    /// Brand palette, emitted as CSS custom properties.
    pub colors: ColorConfig,
    /// Scroll reveal presets and build mode.
    pub reveal: RevealConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        if !self.site.base_path.starts_with('/') || !self.site.base_path.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "site.base_path must start and end with '/', got '{}'",
                self.site.base_path
            )));
        }
        for (name, preset) in [
            ("reveal.default", &self.reveal.default),
            ("reveal.image", &self.reveal.image),
        ] {
            if !(0.0..=1.0).contains(&preset.threshold) {
                return Err(ConfigError::Validation(format!(
                    "{name}.threshold must be 0-1, got {}",
                    preset.threshold
                )));
            }
        }
        for (name, value) in self.colors.entries() {
            if !is_hex_color(value) {
                return Err(ConfigError::Validation(format!(
                    "colors.{name} must be a hex color like #166534, got '{value}'"
                )));
            }
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub title: String,
    /// Product brand shown on catalog pages.
    pub brand: String,
    pub default_locale: Locale,
    /// Prefix for every generated link.
    pub base_path: String,
    pub form_action: String,
    pub copyright_year: u32,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Global Gate Produce".to_string(),
            brand: "Zavaya".to_string(),
            default_locale: Locale::En,
            base_path: "/".to_string(),
            form_action: "#".to_string(),
            copyright_year: 2026,
        }
    }
}

/// Brand palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Dark avocado green; headers, buttons, hero background.
    pub primary: String,
    pub primary_dark: String,
    pub mint: String,
    pub teal: String,
    pub orange: String,
    pub yellow: String,
    pub magenta: String,
    /// Page background.
    pub offwhite: String,
    /// Section background.
    pub cream: String,
    /// Secondary text.
    pub stone: String,
    /// Primary text.
    pub charcoal: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "#166534".to_string(),
            primary_dark: "#14532d".to_string(),
            mint: "#4ade80".to_string(),
            teal: "#5eead4".to_string(),
            orange: "#f97316".to_string(),
            yellow: "#facc15".to_string(),
            magenta: "#db2777".to_string(),
            offwhite: "#fafaf9".to_string(),
            cream: "#f5f5f4".to_string(),
            stone: "#78716c".to_string(),
            charcoal: "#1c1917".to_string(),
        }
    }
}

impl ColorConfig {
    /// `(name, value)` pairs in declaration order.
    pub fn entries(&self) -> [(&'static str, &str); 11] {
        [
            ("primary", self.primary.as_str()),
            ("primary_dark", self.primary_dark.as_str()),
            ("mint", self.mint.as_str()),
            ("teal", self.teal.as_str()),
            ("orange", self.orange.as_str()),
            ("yellow", self.yellow.as_str()),
            ("magenta", self.magenta.as_str()),
            ("offwhite", self.offwhite.as_str()),
            ("cream", self.cream.as_str()),
            ("stone", self.stone.as_str()),
            ("charcoal", self.charcoal.as_str()),
        ]
    }
}

/// How revealable elements are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prerender {
    /// Hidden until the browser script reveals them on scroll.
    #[default]
    Animated,
    /// Emitted already revealed; no script is included.
    Revealed,
}

/// `[reveal]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    pub prerender: Prerender,
    pub default: VariantPreset,
    pub image: VariantPreset,
}

impl Default for RevealConfig {
    fn default() -> Self {
        let presets = VariantPresets::default();
        Self {
            prerender: Prerender::default(),
            default: presets.default,
            image: presets.image,
        }
    }
}

impl RevealConfig {
    pub fn presets(&self) -> VariantPresets {
        VariantPresets {
            default: self.default,
            image: self.image,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Global Gate Produce site configuration
# ======================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "Global Gate Produce"

# Product brand shown on the catalog pages.
brand = "Zavaya"

# Locale served at the site root ("en" or "es"). The other locale is
# generated under /<code>/, e.g. /es/products/.
default_locale = "en"

# Prefix for every generated link. Must start and end with "/".
base_path = "/"

# Where the contact form posts. The site ships without a backend; point this
# at a form service to receive messages.
form_action = "#"

# Substituted for {year} in the footer copyright line.
copyright_year = 2026

# ---------------------------------------------------------------------------
# Colors (emitted as CSS custom properties, e.g. --color-primary)
# ---------------------------------------------------------------------------
[colors]
primary = "#166534"       # Dark avocado green
primary_dark = "#14532d"
mint = "#4ade80"
teal = "#5eead4"
orange = "#f97316"
yellow = "#facc15"
magenta = "#db2777"
offwhite = "#fafaf9"      # Page background
cream = "#f5f5f4"         # Section backgrounds
stone = "#78716c"         # Secondary text
charcoal = "#1c1917"      # Primary text

# ---------------------------------------------------------------------------
# Scroll reveal
# ---------------------------------------------------------------------------
[reveal]
# "animated": elements fade in once when first scrolled into view.
# "revealed": every element is emitted already visible and no script is
#             included (useful for print or no-JS hosting).
prerender = "animated"

# Text blocks and section headers.
#   threshold:   fraction of the element (0-1) that must be visible
#   root_margin: CSS-style "top right bottom left" adjustment of the
#                viewport; negative values shrink it
[reveal.default]
threshold = 0.15
root_margin = "0px 0px -10% 0px"

# Image-heavy blocks. Triggers deeper in the viewport.
[reveal.image]
threshold = 0.15
root_margin = "0px 0px -25% 0px"
"##
}

/// Generate CSS custom properties from the palette.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    let mut css = String::from(":root {\n");
    for (name, value) in colors.entries() {
        css.push_str(&format!("    --color-{}: {value};\n", name.replace('_', "-")));
    }
    css.push('}');
    css
}
