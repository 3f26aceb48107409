//! The platform capabilities a reveal scheduler consumes.
//!
//! A [`Host`] stands in for the browser: it answers the reduced-motion query,
//! monitors node visibility, runs one-shot timers, and applies the visual
//! effects (revealed flag, classes, style properties). The scheduler never
//! touches a node directly.
//!
//! Callbacks flow the other way through plain method calls: whoever owns the
//! event loop hands batches of [`VisibilityEntry`] to
//! [`Scheduled::on_visibility`](super::Scheduled::on_visibility) and fired
//! timer ids to [`Scheduled::on_timer`](super::Scheduled::on_timer).

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::options::ObserveOptions;

/// Identity of an observable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Handle of a scheduled one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("visibility monitoring is not available")]
    Unavailable,
    #[error("{node} cannot be observed: {reason}")]
    Rejected { node: NodeId, reason: String },
}

/// One visibility-change notification for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub node: NodeId,
    /// Fraction of the node inside the margin-adjusted viewport.
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl VisibilityEntry {
    pub fn satisfies(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

/// Platform facilities used by the reveal schedulers.
pub trait Host {
    /// Whether the user asked for reduced motion.
    fn prefers_reduced_motion(&self) -> bool;

    /// Start delivering visibility entries for `node`.
    fn observe(&mut self, node: NodeId, options: &ObserveOptions) -> Result<(), MonitorError>;

    /// Stop delivering entries for `node`. Unknown nodes are ignored.
    fn unobserve(&mut self, node: NodeId);

    /// Schedule a one-shot timer.
    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    /// Cancel a timer. Cancelling a fired or unknown timer is a no-op.
    fn clear_timeout(&mut self, timer: TimerId);

    /// Flip `node` to its revealed visual state (`data-revealed="true"`).
    fn mark_revealed(&mut self, node: NodeId);

    fn add_class(&mut self, node: NodeId, class: &str);

    fn set_property(&mut self, node: NodeId, name: &str, value: &str);
}
