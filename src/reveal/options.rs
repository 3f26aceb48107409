//! Typed reveal configuration: variants, presets, and per-call options.
//!
//! Every call site picks a [`Variant`] and may override its threshold or root
//! margin. Resolution against the active [`VariantPresets`] yields the
//! [`ObserveOptions`] handed to the host.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use super::geometry::Rect;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarginParseError {
    #[error("root margin must have 1 to 4 values, got {0}")]
    Arity(usize),
    #[error("invalid root margin value '{0}' (expected e.g. '0px' or '-10%')")]
    Value(String),
}

/// One side of a root margin: absolute pixels or a percentage of the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f64),
    Percent(f64),
}

impl MarginValue {
    /// Resolve against the root dimension on this side's axis.
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            MarginValue::Px(px) => px,
            MarginValue::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl FromStr for MarginValue {
    type Err = MarginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || MarginParseError::Value(s.to_string());
        if let Some(num) = s.strip_suffix('%') {
            num.parse().map(MarginValue::Percent).map_err(|_| bad())
        } else if let Some(num) = s.strip_suffix("px") {
            num.parse().map(MarginValue::Px).map_err(|_| bad())
        } else if s == "0" {
            Ok(MarginValue::Px(0.0))
        } else {
            Err(bad())
        }
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Px(v) => write!(f, "{v}px"),
            MarginValue::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// Adjustment applied to the viewport before visibility testing.
///
/// Written in CSS shorthand order (`top right bottom left`, 1 to 4 values).
/// Negative values shrink the effective viewport, so `"0px 0px -25% 0px"`
/// only counts an element once it is a quarter of the way up the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: MarginValue::Px(0.0),
        right: MarginValue::Px(0.0),
        bottom: MarginValue::Px(0.0),
        left: MarginValue::Px(0.0),
    };

    /// Margin that only moves the bottom edge, by a percentage of the height.
    pub const fn bottom_percent(pct: f64) -> Self {
        RootMargin {
            bottom: MarginValue::Percent(pct),
            ..Self::ZERO
        }
    }

    /// Grow (positive) or shrink (negative) `root` by this margin.
    pub fn apply(&self, root: Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect {
            x: root.x - left,
            y: root.y - top,
            width: (root.width + left + right).max(0.0),
            height: (root.height + top + bottom).max(0.0),
        }
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = MarginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(MarginValue::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            other => return Err(MarginParseError::Arity(other.len())),
        };
        Ok(RootMargin {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = MarginParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(margin: RootMargin) -> Self {
        margin.to_string()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Visual preset for a revealable element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Text blocks and section headers.
    #[default]
    Default,
    /// Image-heavy blocks: slower animation, triggers deeper in the viewport.
    Image,
}

impl Variant {
    /// Extra class the stylesheet keys the slower image animation off.
    pub fn class(self) -> Option<&'static str> {
        match self {
            Variant::Default => None,
            Variant::Image => Some("reveal--image"),
        }
    }
}

/// Threshold and margin a variant resolves to when not overridden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantPreset {
    /// Fraction of the element (0-1) that must be visible.
    pub threshold: f64,
    /// Adjustment applied to the viewport before testing.
    pub root_margin: RootMargin,
}

/// Preset table, one entry per [`Variant`]. Overridable from `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantPresets {
    pub default: VariantPreset,
    pub image: VariantPreset,
}

impl Default for VariantPresets {
    fn default() -> Self {
        Self {
            default: VariantPreset {
                threshold: 0.15,
                root_margin: RootMargin::bottom_percent(-10.0),
            },
            image: VariantPreset {
                threshold: 0.15,
                root_margin: RootMargin::bottom_percent(-25.0),
            },
        }
    }
}

impl VariantPresets {
    pub fn get(&self, variant: Variant) -> &VariantPreset {
        match variant {
            Variant::Default => &self.default,
            Variant::Image => &self.image,
        }
    }
}

/// What the host needs to monitor one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
}

/// Options for a single revealable element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevealOptions {
    pub variant: Variant,
    /// Wait this long after the element becomes visible. Zero reveals at once.
    pub delay: Duration,
    pub threshold: Option<f64>,
    pub root_margin: Option<RootMargin>,
}

impl RevealOptions {
    pub fn image() -> Self {
        Self {
            variant: Variant::Image,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn resolve(&self, presets: &VariantPresets) -> ObserveOptions {
        resolve(self.variant, self.threshold, self.root_margin, presets)
    }
}

/// Options for an ordered group of elements revealed in sequence.
///
/// There is deliberately no fixed delay here: the index-based stagger is the
/// only delay a group member ever gets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupOptions {
    pub variant: Variant,
    /// Added per index: member `i` waits `i * stagger_delay`.
    pub stagger_delay: Duration,
    pub threshold: Option<f64>,
    pub root_margin: Option<RootMargin>,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            variant: Variant::Default,
            stagger_delay: Duration::from_millis(100),
            threshold: None,
            root_margin: None,
        }
    }
}

impl GroupOptions {
    pub fn staggered(variant: Variant, stagger_ms: u64) -> Self {
        Self {
            variant,
            stagger_delay: Duration::from_millis(stagger_ms),
            ..Self::default()
        }
    }

    /// Delay for the member at `index`.
    pub fn delay_for(&self, index: usize) -> Duration {
        self.stagger_delay.saturating_mul(index as u32)
    }

    pub fn resolve(&self, presets: &VariantPresets) -> ObserveOptions {
        resolve(self.variant, self.threshold, self.root_margin, presets)
    }
}

fn resolve(
    variant: Variant,
    threshold: Option<f64>,
    root_margin: Option<RootMargin>,
    presets: &VariantPresets,
) -> ObserveOptions {
    let preset = presets.get(variant);
    ObserveOptions {
        threshold: threshold.unwrap_or(preset.threshold).clamp(0.0, 1.0),
        root_margin: root_margin.unwrap_or(preset.root_margin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_four_value_margin() {
        let m: RootMargin = "0px 0px -10% 0px".parse().unwrap();
        assert_eq!(m.top, MarginValue::Px(0.0));
        assert_eq!(m.bottom, MarginValue::Percent(-10.0));
        assert_eq!(m.left, MarginValue::Px(0.0));
    }

    #[test]
    fn parse_shorthand_margins() {
        let one: RootMargin = "10px".parse().unwrap();
        assert_eq!(one.right, MarginValue::Px(10.0));
        assert_eq!(one.bottom, MarginValue::Px(10.0));

        let two: RootMargin = "5px 10%".parse().unwrap();
        assert_eq!(two.top, MarginValue::Px(5.0));
        assert_eq!(two.left, MarginValue::Percent(10.0));

        let three: RootMargin = "1px 2px 3px".parse().unwrap();
        assert_eq!(three.left, MarginValue::Px(2.0));
        assert_eq!(three.bottom, MarginValue::Px(3.0));
    }

    #[test]
    fn bare_zero_is_accepted() {
        let m: RootMargin = "0 0 -25% 0".parse().unwrap();
        assert_eq!(m, RootMargin::bottom_percent(-25.0));
    }

    #[test]
    fn reject_bad_margins() {
        assert_eq!(
            "".parse::<RootMargin>(),
            Err(MarginParseError::Arity(0))
        );
        assert_eq!(
            "1px 2px 3px 4px 5px".parse::<RootMargin>(),
            Err(MarginParseError::Arity(5))
        );
        assert!(matches!(
            "10em".parse::<RootMargin>(),
            Err(MarginParseError::Value(v)) if v == "10em"
        ));
    }

    #[test]
    fn margin_display_round_trips_through_parse() {
        let m = RootMargin::bottom_percent(-25.0);
        assert_eq!(m.to_string(), "0px 0px -25% 0px");
        assert_eq!(m.to_string().parse::<RootMargin>().unwrap(), m);
    }

    #[test]
    fn negative_bottom_margin_shrinks_viewport() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let shrunk = RootMargin::bottom_percent(-25.0).apply(viewport);
        assert_eq!(shrunk, Rect::new(0.0, 0.0, 1000.0, 600.0));
    }

    #[test]
    fn positive_margin_grows_viewport() {
        let viewport = Rect::new(0.0, 100.0, 1000.0, 800.0);
        let grown: RootMargin = "50px".parse().unwrap();
        assert_eq!(grown.apply(viewport), Rect::new(-50.0, 50.0, 1100.0, 900.0));
    }

    #[test]
    fn presets_match_variant_defaults() {
        let presets = VariantPresets::default();
        let text = RevealOptions::default().resolve(&presets);
        assert_eq!(text.threshold, 0.15);
        assert_eq!(text.root_margin, RootMargin::bottom_percent(-10.0));

        let image = RevealOptions::image().resolve(&presets);
        assert_eq!(image.root_margin, RootMargin::bottom_percent(-25.0));
    }

    #[test]
    fn explicit_overrides_win_over_preset() {
        let presets = VariantPresets::default();
        let opts = RevealOptions {
            threshold: Some(0.5),
            root_margin: Some(RootMargin::ZERO),
            ..RevealOptions::image()
        };
        let resolved = opts.resolve(&presets);
        assert_eq!(resolved.threshold, 0.5);
        assert_eq!(resolved.root_margin, RootMargin::ZERO);
    }

    #[test]
    fn threshold_is_clamped() {
        let presets = VariantPresets::default();
        let opts = GroupOptions {
            threshold: Some(1.7),
            ..GroupOptions::default()
        };
        assert_eq!(opts.resolve(&presets).threshold, 1.0);
    }

    #[test]
    fn stagger_delay_scales_with_index() {
        let opts = GroupOptions::staggered(Variant::Image, 120);
        assert_eq!(opts.delay_for(0), Duration::ZERO);
        assert_eq!(opts.delay_for(2), Duration::from_millis(240));
    }

    #[test]
    fn presets_deserialize_from_toml() {
        let presets: VariantPresets = toml::from_str(
            r#"
[image]
threshold = 0.3
root_margin = "0px 0px -40% 0px"
"#,
        )
        .unwrap();
        assert_eq!(presets.image.threshold, 0.3);
        assert_eq!(presets.image.root_margin, RootMargin::bottom_percent(-40.0));
        // Untouched variant keeps its default
        assert_eq!(presets.default, VariantPresets::default().default);
    }
}
