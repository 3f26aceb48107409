//! Centralized filename parsing for the NNN-slug convention.
//!
//! Product files follow one pattern: an optional numeric prefix (`NNN-`)
//! followed by the URL slug. The number orders the catalog; the slug names the
//! detail page.
//!
//! - `010-avocados-hass.toml` → number 10, slug `avocados-hass`
//! - `lemons.toml` → unnumbered, slug `lemons` (generated, hidden from listings)

/// Result of parsing a numbered entry name like `010-avocados-hass`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `10` from `010-avocados-hass`)
    pub number: Option<u32>,
    /// Name part after `NNN-`, dashes preserved. Empty if number-only.
    /// For unnumbered entries, this is the full input.
    pub name: String,
}

/// Parse an entry name following the `NNN-name` convention.
///
/// - `"010-avocados-hass"` → number=Some(10), name="avocados-hass"
/// - `"001"` → number=Some(1), name=""
/// - `"001-"` → number=Some(1), name=""
/// - `"dragon-fruit-red"` → number=None, name="dragon-fruit-red"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some(dash_pos) = name.find('-') {
        let prefix = &name[..dash_pos];
        if let Ok(num) = prefix.parse::<u32>() {
            return ParsedName {
                number: Some(num),
                name: name[dash_pos + 1..].to_string(),
            };
        }
    }
    if let Ok(num) = name.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: name.to_string(),
    }
}

/// Whether `slug` is usable as a URL path segment: lowercase ASCII letters,
/// digits and single inner dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
