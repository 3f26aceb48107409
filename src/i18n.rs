//! Bilingual text catalog.
//!
//! All UI copy lives in `translations/<locale>.toml` inside the content
//! directory. Nested tables are flattened into dotted keys, so
//!
//! ```toml
//! [contact.form]
//! submit = "Send Message"
//! ```
//!
//! is looked up as `contact.form.submit`.
//!
//! Lookup falls back from the requested locale to the default locale and
//! finally to the key itself, so a missing translation shows up as a visible
//! key rather than an empty element. `{name}` placeholders are filled from the
//! caller's variables; unknown placeholders are left as written.
//!
//! The locale is always an explicit argument. There is no "current language"
//! global: each rendered page is built with a [`Translator`] bound to its
//! locale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("translation '{0}' must be a string")]
    NotText(String),
    #[error("unknown locale '{0}' (expected 'en' or 'es')")]
    UnknownLocale(String),
    #[error("default locale file not found: {0}")]
    MissingDefault(PathBuf),
}

/// A supported site language.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Es];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// The other language, for the header's language switch.
    pub fn toggled(self) -> Locale {
        match self {
            Locale::En => Locale::Es,
            Locale::Es => Locale::En,
        }
    }

    /// Label shown on the switch that leads *to* this locale.
    pub fn switch_label(self) -> &'static str {
        match self {
            Locale::En => "EN",
            Locale::Es => "ES",
        }
    }

    /// URL prefix: the default locale lives at the site root, others under
    /// `/<code>`.
    pub fn url_prefix(self, default: Locale) -> String {
        if self == default {
            String::new()
        } else {
            format!("/{}", self.code())
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            _ => Err(CatalogError::UnknownLocale(s.to_string())),
        }
    }
}

/// Flat `key → text` table for one locale.
pub type Table = BTreeMap<String, String>;

/// Immutable translation tables for every locale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub default_locale: Locale,
    en: Table,
    es: Table,
}

impl Catalog {
    pub fn new(default_locale: Locale) -> Self {
        Self {
            default_locale,
            ..Self::default()
        }
    }

    /// Load `<dir>/en.toml` and `<dir>/es.toml`.
    ///
    /// The default locale's file is required; the other may be absent, in
    /// which case every lookup falls back.
    pub fn load(dir: &Path, default_locale: Locale) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(default_locale);
        for locale in Locale::ALL {
            let path = dir.join(format!("{}.toml", locale.code()));
            if !path.exists() {
                if locale == default_locale {
                    return Err(CatalogError::MissingDefault(path));
                }
                continue;
            }
            let content = fs::read_to_string(&path)?;
            *catalog.table_mut(locale) = parse_table(&content).map_err(|err| match err {
                CatalogError::Toml { source, .. } => CatalogError::Toml {
                    path: path.clone(),
                    source,
                },
                other => other,
            })?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, locale: Locale, key: impl Into<String>, text: impl Into<String>) {
        self.table_mut(locale).insert(key.into(), text.into());
    }

    pub fn table(&self, locale: Locale) -> &Table {
        match locale {
            Locale::En => &self.en,
            Locale::Es => &self.es,
        }
    }

    fn table_mut(&mut self, locale: Locale) -> &mut Table {
        match locale {
            Locale::En => &mut self.en,
            Locale::Es => &mut self.es,
        }
    }

    /// Raw text for `key`, falling back to the default locale. Empty strings
    /// count as missing.
    pub fn get(&self, locale: Locale, key: &str) -> Option<&str> {
        let lookup = |l: Locale| {
            self.table(l)
                .get(key)
                .map(String::as_str)
                .filter(|s| !s.is_empty())
        };
        lookup(locale).or_else(|| {
            let fallback = lookup(self.default_locale);
            if fallback.is_some() && locale != self.default_locale {
                debug!(%locale, key, "translation falls back to default locale");
            }
            fallback
        })
    }

    /// Whether the default locale defines `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(self.default_locale, key).is_some()
    }

    pub fn t(&self, locale: Locale, key: &str) -> String {
        self.t_with(locale, key, &[])
    }

    /// Look up `key` and substitute `{name}` placeholders from `vars`.
    pub fn t_with(&self, locale: Locale, key: &str, vars: &[(&str, &str)]) -> String {
        match self.get(locale, key) {
            Some(text) => interpolate(text, vars),
            None => {
                warn!(%locale, key, "missing translation");
                key.to_string()
            }
        }
    }

    /// Keys the default locale defines that `locale` does not.
    pub fn missing_keys(&self, locale: Locale) -> Vec<&str> {
        let table = self.table(locale);
        self.table(self.default_locale)
            .keys()
            .filter(|k| table.get(*k).is_none_or(|v| v.is_empty()))
            .map(String::as_str)
            .collect()
    }

    pub fn translator(&self, locale: Locale) -> Translator<'_> {
        Translator {
            catalog: self,
            locale,
        }
    }
}

/// A catalog bound to one locale; what page renderers receive.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    catalog: &'a Catalog,
    locale: Locale,
}

impl Translator<'_> {
    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn default_locale(&self) -> Locale {
        self.catalog.default_locale
    }

    pub fn t(&self, key: &str) -> String {
        self.catalog.t(self.locale, key)
    }

    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        self.catalog.t_with(self.locale, key, vars)
    }
}

/// Parse a translation file and flatten nested tables into dotted keys.
pub fn parse_table(content: &str) -> Result<Table, CatalogError> {
    let value: toml::Table = toml::from_str(content).map_err(|source| CatalogError::Toml {
        path: PathBuf::new(),
        source,
    })?;
    let mut table = Table::new();
    flatten("", &value, &mut table)?;
    Ok(table)
}

fn flatten(prefix: &str, value: &toml::Table, out: &mut Table) -> Result<(), CatalogError> {
    for (key, val) in value {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            toml::Value::String(s) => {
                out.insert(full, s.clone());
            }
            toml::Value::Table(nested) => flatten(&full, nested, out)?,
            _ => return Err(CatalogError::NotText(full)),
        }
    }
    Ok(())
}

/// Replace `{name}` placeholders. Unknown names and malformed braces are kept.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..name_len];
        let closed = after[name_len..].starts_with('}');
        match vars.iter().find(|(k, _)| *k == name) {
            Some((_, value)) if closed && !name.is_empty() => {
                out.push_str(value);
                rest = &after[name_len + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
