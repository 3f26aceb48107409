//! Shared content types.
//!
//! These are serialized into `manifest.json` between the scan and generate
//! stages, so both sides see identical data.
//!
//! Text that varies by language comes in two forms: catalog keys (UI copy
//! looked up through [`crate::i18n`]) and [`Localized`] values for content
//! authored next to the data it describes, like product names.

use serde::{Deserialize, Serialize};

use crate::i18n::Locale;

/// Content text with an English original and an optional Spanish version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Localized {
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub es: Option<String>,
}

impl Localized {
    pub fn new(en: impl Into<String>, es: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            es: Some(es.into()),
        }
    }

    /// Text for `locale`; an absent or empty Spanish version falls back to English.
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Es => self
                .es
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(&self.en),
        }
    }
}

/// Which catalog section a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Fresh,
    Frozen,
    Pulp,
}

impl ProductCategory {
    /// Frozen and pulp lines share the "processed" section.
    pub fn is_processed(self) -> bool {
        !matches!(self, ProductCategory::Fresh)
    }
}

/// Brand accent used for card borders and badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    Teal,
    Mint,
    Orange,
    Yellow,
    Magenta,
    Primary,
}

impl AccentColor {
    /// Rotation used for cards in listings.
    pub const CYCLE: [AccentColor; 5] = [
        AccentColor::Teal,
        AccentColor::Mint,
        AccentColor::Orange,
        AccentColor::Yellow,
        AccentColor::Magenta,
    ];

    pub fn cycle(index: usize) -> AccentColor {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    /// CSS custom property set from `[colors]`.
    pub fn css_var(self) -> &'static str {
        match self {
            AccentColor::Teal => "var(--color-teal)",
            AccentColor::Mint => "var(--color-mint)",
            AccentColor::Orange => "var(--color-orange)",
            AccentColor::Yellow => "var(--color-yellow)",
            AccentColor::Magenta => "var(--color-magenta)",
            AccentColor::Primary => "var(--color-primary)",
        }
    }
}

/// A product line with its own detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// URL slug, from the file name with the number prefix stripped.
    pub slug: String,
    /// Sort key from number prefix.
    pub sort_key: u32,
    /// Numbered files appear in listings; unnumbered ones only get a page.
    pub in_listing: bool,
    pub name: Localized,
    /// One-line card text.
    pub summary: Localized,
    /// Long description, Markdown.
    pub description: Localized,
    pub category: ProductCategory,
    pub origin: Vec<String>,
    pub seasonality: Localized,
    pub packaging: Vec<Localized>,
    pub certifications: Vec<String>,
    /// Detail page image, relative to the site root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Listing card image; falls back to `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_image: Option<String>,
    /// Shown in the home page product focus.
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assortment: Option<Assortment>,
}

impl Product {
    /// Origin regions as one label, e.g. "Michoacán & Jalisco".
    pub fn origin_label(&self) -> String {
        self.origin.join(" & ")
    }

    pub fn listing_image(&self) -> Option<&str> {
        self.card_image.as_deref().or(self.image.as_deref())
    }
}

/// Sub-range shown on a detail page, like pulp flavors or frozen cubes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assortment {
    pub title: Localized,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Localized>,
    pub items: Vec<AssortmentItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssortmentItem {
    pub name: Localized,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A certification badge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Certification {
    pub id: String,
    pub label: String,
    pub description: Localized,
    /// Slot reserved for a certification whose paperwork is pending.
    #[serde(default)]
    pub placeholder: bool,
}

impl Certification {
    /// Short badge text: first three letters, or "?" for placeholders.
    pub fn badge(&self) -> String {
        if self.placeholder {
            return "?".to_string();
        }
        self.label.chars().take(3).collect::<String>().to_uppercase()
    }
}

/// One step of the "orchard to dock" section. Title and description come
/// from `capabilities.<id>.title` / `.description`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capability {
    pub id: String,
    pub accent: AccentColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<Localized>,
}

/// A sales or finance contact shown next to the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Catalog key for the role, e.g. `contact.salesManager`.
    pub role: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Contact {
    /// `tel:` URL with everything but digits and `+` stripped.
    pub fn phone_href(&self) -> Option<String> {
        self.phone.as_ref().map(|p| {
            let digits: String = p.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
            format!("tel:{digits}")
        })
    }
}

/// Home page content that is not UI copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    pub capabilities: Vec<Capability>,
    /// Ids of quality pillars; text from `quality.<id>.title` / `.description`.
    pub pillars: Vec<String>,
    /// Certification ids listed in the quality section.
    pub quality_certifications: Vec<String>,
    /// "Also available" list under the featured products.
    pub more_products: Vec<Localized>,
    pub contacts: Vec<Contact>,
    pub location: Localized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localized_falls_back_to_english() {
        let both = Localized::new("Lemons", "Limones");
        assert_eq!(both.get(Locale::Es), "Limones");
        assert_eq!(both.get(Locale::En), "Lemons");

        let en_only = Localized {
            en: "Mexico".to_string(),
            es: None,
        };
        assert_eq!(en_only.get(Locale::Es), "Mexico");

        let empty_es = Localized {
            en: "Mango".to_string(),
            es: Some(String::new()),
        };
        assert_eq!(empty_es.get(Locale::Es), "Mango");
    }

    #[test]
    fn localized_rejects_unknown_languages() {
        let result: Result<Localized, _> = toml::from_str("en = \"a\"\nfr = \"b\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn accent_cycle_wraps() {
        assert_eq!(AccentColor::cycle(0), AccentColor::Teal);
        assert_eq!(AccentColor::cycle(4), AccentColor::Magenta);
        assert_eq!(AccentColor::cycle(5), AccentColor::Teal);
        assert_eq!(AccentColor::Primary.css_var(), "var(--color-primary)");
    }

    #[test]
    fn certification_badge() {
        let usda = Certification {
            id: "usda".to_string(),
            label: "GlobalGAP".to_string(),
            description: Localized::default(),
            placeholder: false,
        };
        assert_eq!(usda.badge(), "GLO");

        let tbd = Certification {
            placeholder: true,
            ..usda
        };
        assert_eq!(tbd.badge(), "?");
    }

    #[test]
    fn contact_phone_href() {
        let contact = Contact {
            name: None,
            role: "contact.salesManager".to_string(),
            email: "sales@globalgateproduce.com".to_string(),
            phone: Some("+1 956 651 1021".to_string()),
            image: None,
        };
        assert_eq!(contact.phone_href().as_deref(), Some("tel:+19566511021"));
    }

    #[test]
    fn processed_categories() {
        assert!(!ProductCategory::Fresh.is_processed());
        assert!(ProductCategory::Frozen.is_processed());
        assert!(ProductCategory::Pulp.is_processed());
    }
}
