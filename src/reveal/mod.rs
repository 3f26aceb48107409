//! One-time scroll reveal scheduling.
//!
//! Page sections fade or slide in the first time they become visible and then
//! stay put: scrolling back up never replays the animation. This module owns
//! the decision of *when* a node flips to its revealed state; the stylesheet
//! owns the animation itself, keyed off `data-revealed="true"`.
//!
//! - [`Reveal`] handles one element with an optional fixed delay.
//! - [`GroupReveal`] handles an ordered list where member `i` waits
//!   `i * stagger_delay`. Group members never get a fixed delay on top.
//! - Both talk to the platform only through [`Host`]. The build uses a markup
//!   host (see [`crate::markup`]); tests and the `timeline` command use
//!   [`sim::SimHost`].
//!
//! If the visitor prefers reduced motion, everything is revealed on attach
//! without observation or timers. If the platform cannot monitor visibility,
//! nodes are revealed as if they had been seen: over-revealing beats content
//! that never appears.

mod geometry;
mod host;
mod options;
mod scheduler;
pub mod sim;

pub use geometry::{Rect, visible_fraction};
pub use host::{Host, MonitorError, NodeId, TimerId, VisibilityEntry};
pub use options::{
    GroupOptions, MarginParseError, MarginValue, ObserveOptions, RevealOptions, RootMargin,
    Variant, VariantPreset, VariantPresets,
};
pub use scheduler::{DELAY_PROPERTY, GroupReveal, MAX_GROUP_LEN, NodeState, Reveal, Scheduled};
