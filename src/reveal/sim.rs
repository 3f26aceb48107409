//! Deterministic single-threaded host: virtual clock, scrollable viewport,
//! and a timer queue.
//!
//! Used by the test suite and by the `timeline` command to answer "when does
//! each element on this page reveal if the visitor scrolls like this?".
//!
//! ```
//! use ggp_site::reveal::sim::{SimHost, Size};
//! use ggp_site::reveal::{NodeId, Rect, Reveal, RevealOptions, VariantPresets};
//! use std::time::Duration;
//!
//! let mut host = SimHost::new(Size::new(1280.0, 800.0));
//! host.place(NodeId(1), Rect::new(0.0, 1200.0, 600.0, 300.0));
//! let mut header = Reveal::attach(&mut host, Some(NodeId(1)), &RevealOptions::default(), &VariantPresets::default());
//!
//! host.advance(Duration::from_millis(500), &mut [&mut header]);
//! assert!(!header.is_revealed());
//!
//! host.scroll_to(900.0);
//! host.advance(Duration::from_millis(16), &mut [&mut header]);
//! assert_eq!(host.revealed_at(NodeId(1)), Some(Duration::from_millis(500)));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use super::geometry::{Rect, visible_fraction};
use super::host::{Host, MonitorError, NodeId, TimerId, VisibilityEntry};
use super::options::ObserveOptions;
use super::scheduler::Scheduled;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Everything the simulated page knows about one node.
#[derive(Debug, Clone, Default)]
pub struct SimNode {
    pub rect: Option<Rect>,
    pub revealed_at: Option<Duration>,
    /// How many times `mark_revealed` was called. Anything above 1 is a bug.
    pub reveal_count: usize,
    pub classes: Vec<String>,
    pub properties: BTreeMap<String, String>,
    observing: Option<ObserveOptions>,
    satisfied: bool,
}

#[derive(Debug)]
pub struct SimHost {
    now: Duration,
    viewport: Size,
    scroll_y: f64,
    reduced_motion: bool,
    monitor_available: bool,
    nodes: BTreeMap<NodeId, SimNode>,
    queue: BTreeSet<(Duration, TimerId)>,
    deadlines: HashMap<TimerId, Duration>,
    timers_created: usize,
    pending_entries: Vec<VisibilityEntry>,
}

impl SimHost {
    pub fn new(viewport: Size) -> Self {
        Self {
            now: Duration::ZERO,
            viewport,
            scroll_y: 0.0,
            reduced_motion: false,
            monitor_available: true,
            nodes: BTreeMap::new(),
            queue: BTreeSet::new(),
            deadlines: HashMap::new(),
            timers_created: 0,
            pending_entries: Vec::new(),
        }
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }

    /// Simulate a platform without visibility monitoring.
    pub fn without_monitor(mut self) -> Self {
        self.monitor_available = false;
        self
    }

    /// Lay out `node` at `rect` (page coordinates).
    pub fn place(&mut self, node: NodeId, rect: Rect) {
        self.nodes.entry(node).or_default().rect = Some(rect);
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn node(&self, node: NodeId) -> Option<&SimNode> {
        self.nodes.get(&node)
    }

    pub fn revealed_at(&self, node: NodeId) -> Option<Duration> {
        self.nodes.get(&node).and_then(|n| n.revealed_at)
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|n| n.observing.is_some())
    }

    pub fn timers_created(&self) -> usize {
        self.timers_created
    }

    pub fn pending_timers(&self) -> usize {
        self.queue.len()
    }

    /// Move the viewport and queue an entry for every observed node whose
    /// threshold state flipped.
    pub fn scroll_to(&mut self, y: f64) {
        self.scroll_y = y;
        let viewport = self.viewport_rect();
        for (id, node) in self.nodes.iter_mut() {
            let (Some(options), Some(rect)) = (node.observing, node.rect) else {
                continue;
            };
            let entry = measure(*id, &rect, &viewport, &options);
            let satisfied = entry.satisfies(options.threshold);
            if satisfied != node.satisfied {
                node.satisfied = satisfied;
                self.pending_entries.push(entry);
            }
        }
    }

    /// Deliver queued visibility entries to `schedulers`.
    pub fn flush(&mut self, schedulers: &mut [&mut dyn Scheduled<SimHost>]) {
        let entries = std::mem::take(&mut self.pending_entries);
        if entries.is_empty() {
            return;
        }
        for scheduler in schedulers.iter_mut() {
            scheduler.on_visibility(self, &entries);
        }
    }

    /// Flush entries, then run the clock forward by `by`, firing due timers in
    /// deadline order (ties in creation order).
    pub fn advance(&mut self, by: Duration, schedulers: &mut [&mut dyn Scheduled<SimHost>]) {
        self.flush(schedulers);
        let until = self.now + by;
        while let Some(timer) = self.pop_due(until) {
            for scheduler in schedulers.iter_mut() {
                if scheduler.on_timer(self, timer) {
                    break;
                }
            }
        }
        self.now = until;
    }

    fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let &(deadline, timer) = self.queue.first()?;
        if deadline > until {
            return None;
        }
        self.queue.remove(&(deadline, timer));
        self.deadlines.remove(&timer);
        self.now = deadline;
        Some(timer)
    }

    fn viewport_rect(&self) -> Rect {
        Rect::new(0.0, self.scroll_y, self.viewport.width, self.viewport.height)
    }
}

fn measure(node: NodeId, rect: &Rect, viewport: &Rect, options: &ObserveOptions) -> VisibilityEntry {
    let root = options.root_margin.apply(*viewport);
    let (ratio, is_intersecting) = visible_fraction(rect, &root);
    VisibilityEntry {
        node,
        ratio,
        is_intersecting,
    }
}

impl Host for SimHost {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn observe(&mut self, node: NodeId, options: &ObserveOptions) -> Result<(), MonitorError> {
        if !self.monitor_available {
            return Err(MonitorError::Unavailable);
        }
        let viewport = self.viewport_rect();
        let sim = self.nodes.entry(node).or_default();
        let Some(rect) = sim.rect else {
            return Err(MonitorError::Rejected {
                node,
                reason: "node has no layout".to_string(),
            });
        };
        // Like the browser, the first notification arrives right after
        // observation starts, whatever the state.
        let entry = measure(node, &rect, &viewport, options);
        sim.satisfied = entry.satisfies(options.threshold);
        sim.observing = Some(*options);
        self.pending_entries.push(entry);
        Ok(())
    }

    fn unobserve(&mut self, node: NodeId) {
        if let Some(sim) = self.nodes.get_mut(&node) {
            sim.observing = None;
        }
        self.pending_entries.retain(|e| e.node != node);
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        self.timers_created += 1;
        let timer = TimerId(self.timers_created as u64);
        let deadline = self.now + delay;
        self.queue.insert((deadline, timer));
        self.deadlines.insert(timer, deadline);
        timer
    }

    fn clear_timeout(&mut self, timer: TimerId) {
        if let Some(deadline) = self.deadlines.remove(&timer) {
            self.queue.remove(&(deadline, timer));
        }
    }

    fn mark_revealed(&mut self, node: NodeId) {
        let now = self.now;
        let sim = self.nodes.entry(node).or_default();
        sim.revealed_at.get_or_insert(now);
        sim.reveal_count += 1;
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        let sim = self.nodes.entry(node).or_default();
        if !sim.classes.iter().any(|c| c == class) {
            sim.classes.push(class.to_string());
        }
    }

    fn set_property(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes
            .entry(node)
            .or_default()
            .properties
            .insert(name.to_string(), value.to_string());
    }
}
