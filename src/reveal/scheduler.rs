//! One-shot reveal schedulers for single elements and staggered groups.
//!
//! Each observed node moves through an explicit state machine:
//!
//! ```text
//! Unobserved ──observe──▶ Observing ──first qualifying entry──▶ Pending(timer) ──fires──▶ Revealed
//!      │                      │                                      │
//!      │                      └──────── delay == 0 ─────────────────────────────────────▶ Revealed
//!      └──────────────── teardown (from any non-revealed state) ──▶ Detached
//! ```
//!
//! `Revealed` and `Detached` are terminal. A node leaves observation the moment
//! its first qualifying entry arrives, so later enter/exit churn can never
//! schedule a second timer.

use std::time::Duration;
use tracing::{debug, warn};

use super::host::{Host, NodeId, TimerId, VisibilityEntry};
use super::options::{GroupOptions, ObserveOptions, RevealOptions, Variant, VariantPresets};

/// Style property carrying a node's delay, for stylesheets and browser glue.
pub const DELAY_PROPERTY: &str = "--reveal-delay";

/// Upper bound on group slots; registrations at or past it are ignored.
pub const MAX_GROUP_LEN: usize = 4096;

/// Lifecycle of one observed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Unobserved,
    Observing,
    Pending(TimerId),
    Revealed,
    /// Torn down before it ever revealed.
    Detached,
}

/// Event sink shared by both scheduler kinds so a host's event loop can drive
/// a mixed set of them.
pub trait Scheduled<H: Host> {
    /// Process one batch of visibility entries. Entries for nodes this
    /// scheduler does not own are ignored.
    fn on_visibility(&mut self, host: &mut H, entries: &[VisibilityEntry]);

    /// Handle a fired timer. Returns `false` if the timer is not ours.
    fn on_timer(&mut self, host: &mut H, timer: TimerId) -> bool;

    /// Cancel every pending timer and stop all observation. After this
    /// returns, no callback will change any node.
    fn teardown(&mut self, host: &mut H);
}

#[derive(Debug)]
struct Slot {
    node: NodeId,
    delay: Duration,
    state: NodeState,
}

impl Slot {
    fn new(node: NodeId, delay: Duration) -> Self {
        Self {
            node,
            delay,
            state: NodeState::Unobserved,
        }
    }

    fn start<H: Host>(
        &mut self,
        host: &mut H,
        observe: &ObserveOptions,
        variant: Variant,
        reduced_motion: bool,
    ) {
        if reduced_motion {
            self.reveal(host);
            return;
        }
        if let Some(class) = variant.class() {
            host.add_class(self.node, class);
        }
        if !self.delay.is_zero() {
            let value = format!("{}ms", self.delay.as_millis());
            host.set_property(self.node, DELAY_PROPERTY, &value);
        }
        match host.observe(self.node, observe) {
            Ok(()) => self.state = NodeState::Observing,
            Err(err) => {
                // Never leave content hidden: treat as visible.
                warn!(node = %self.node, error = %err, "visibility monitor failed, revealing");
                self.trigger(host);
            }
        }
    }

    /// Replace the delay of a node that is still waiting for its entry.
    fn restagger<H: Host>(&mut self, host: &mut H, delay: Duration) {
        if self.state != NodeState::Observing || self.delay == delay {
            return;
        }
        self.delay = delay;
        let value = format!("{}ms", delay.as_millis());
        host.set_property(self.node, DELAY_PROPERTY, &value);
    }

    fn on_entry<H: Host>(&mut self, host: &mut H, entry: &VisibilityEntry, threshold: f64) {
        if self.state != NodeState::Observing || !entry.satisfies(threshold) {
            return;
        }
        host.unobserve(self.node);
        self.trigger(host);
    }

    fn trigger<H: Host>(&mut self, host: &mut H) {
        if self.delay.is_zero() {
            self.reveal(host);
        } else {
            let timer = host.set_timeout(self.delay);
            debug!(node = %self.node, delay_ms = self.delay.as_millis() as u64, "reveal scheduled");
            self.state = NodeState::Pending(timer);
        }
    }

    fn on_timer<H: Host>(&mut self, host: &mut H, timer: TimerId) -> bool {
        if self.state != NodeState::Pending(timer) {
            return false;
        }
        self.reveal(host);
        true
    }

    fn reveal<H: Host>(&mut self, host: &mut H) {
        host.mark_revealed(self.node);
        self.state = NodeState::Revealed;
        debug!(node = %self.node, "revealed");
    }

    fn detach<H: Host>(&mut self, host: &mut H) {
        match self.state {
            NodeState::Pending(timer) => host.clear_timeout(timer),
            NodeState::Observing => host.unobserve(self.node),
            NodeState::Revealed | NodeState::Detached => return,
            NodeState::Unobserved => {}
        }
        self.state = NodeState::Detached;
    }
}

/// Reveal scheduler for one element.
///
/// Attaching with `None` (the element never mounted) yields an inert
/// scheduler: nothing is observed and nothing is revealed.
#[derive(Debug)]
pub struct Reveal {
    slot: Option<Slot>,
    observe: ObserveOptions,
}

impl Reveal {
    pub fn attach<H: Host>(
        host: &mut H,
        node: Option<NodeId>,
        options: &RevealOptions,
        presets: &VariantPresets,
    ) -> Self {
        let observe = options.resolve(presets);
        let slot = node.map(|node| {
            let reduced_motion = host.prefers_reduced_motion();
            let mut slot = Slot::new(node, options.delay);
            slot.start(host, &observe, options.variant, reduced_motion);
            slot
        });
        Self { slot, observe }
    }

    pub fn node(&self) -> Option<NodeId> {
        self.slot.as_ref().map(|s| s.node)
    }

    pub fn state(&self) -> Option<NodeState> {
        self.slot.as_ref().map(|s| s.state)
    }

    pub fn is_revealed(&self) -> bool {
        self.state() == Some(NodeState::Revealed)
    }

    pub fn observe_options(&self) -> &ObserveOptions {
        &self.observe
    }
}

impl<H: Host> Scheduled<H> for Reveal {
    fn on_visibility(&mut self, host: &mut H, entries: &[VisibilityEntry]) {
        let Some(slot) = self.slot.as_mut() else {
            return;
        };
        let node = slot.node;
        for entry in entries.iter().filter(|e| e.node == node) {
            slot.on_entry(host, entry, self.observe.threshold);
        }
    }

    fn on_timer(&mut self, host: &mut H, timer: TimerId) -> bool {
        self.slot
            .as_mut()
            .is_some_and(|slot| slot.on_timer(host, timer))
    }

    fn teardown(&mut self, host: &mut H) {
        if let Some(slot) = self.slot.as_mut() {
            slot.detach(host);
        }
    }
}

/// Reveal scheduler for an ordered group with index-based stagger.
///
/// Slots may be filled across several passes with [`GroupReveal::register`];
/// empty slots are simply skipped. Stagger counts populated slots only, so
/// `[a, None, c]` staggers `c` as the second member. The rank is taken again
/// when a node's entry arrives, after any late registrations.
#[derive(Debug)]
pub struct GroupReveal {
    slots: Vec<Option<Slot>>,
    options: GroupOptions,
    observe: ObserveOptions,
    reduced_motion: bool,
    torn_down: bool,
}

impl GroupReveal {
    /// An empty group with `count` slots. Reduced motion is sampled once, here.
    pub fn new<H: Host>(
        host: &H,
        count: usize,
        options: &GroupOptions,
        presets: &VariantPresets,
    ) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(count).collect(),
            options: *options,
            observe: options.resolve(presets),
            reduced_motion: host.prefers_reduced_motion(),
            torn_down: false,
        }
    }

    /// Create the group and register every populated slot of `nodes`.
    pub fn attach<H: Host>(
        host: &mut H,
        nodes: &[Option<NodeId>],
        options: &GroupOptions,
        presets: &VariantPresets,
    ) -> Self {
        let mut group = Self::new(host, nodes.len(), options, presets);
        for (index, node) in nodes.iter().enumerate() {
            group.register(host, index, *node);
        }
        group
    }

    /// Bind the node at `index` and start tracking it.
    ///
    /// `None`, an already-filled slot, or a torn-down group are no-ops.
    /// Indices past the current length grow the group.
    pub fn register<H: Host>(&mut self, host: &mut H, index: usize, node: Option<NodeId>) {
        let Some(node) = node else {
            return;
        };
        if self.torn_down {
            return;
        }
        if index >= MAX_GROUP_LEN {
            warn!(index, "group index out of range, ignoring registration");
            return;
        }
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        if self.slots[index].is_some() {
            return;
        }
        let mut slot = Slot::new(node, self.options.delay_for(self.rank(index)));
        slot.start(host, &self.observe, self.options.variant, self.reduced_motion);
        self.slots[index] = Some(slot);
    }

    /// Number of populated slots before `index`.
    fn rank(&self, index: usize) -> usize {
        self.slots[..index.min(self.slots.len())]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<NodeState> {
        self.slots.get(index)?.as_ref().map(|s| s.state)
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.state(index) == Some(NodeState::Revealed)
    }

    pub fn revealed_count(&self) -> usize {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.state == NodeState::Revealed)
            .count()
    }

    pub fn observe_options(&self) -> &ObserveOptions {
        &self.observe
    }
}

impl<H: Host> Scheduled<H> for GroupReveal {
    fn on_visibility(&mut self, host: &mut H, entries: &[VisibilityEntry]) {
        for entry in entries {
            let Some(index) = self
                .slots
                .iter()
                .position(|s| s.as_ref().is_some_and(|s| s.node == entry.node))
            else {
                continue;
            };
            let delay = self.options.delay_for(self.rank(index));
            if let Some(slot) = self.slots[index].as_mut() {
                slot.restagger(host, delay);
                slot.on_entry(host, entry, self.observe.threshold);
            }
        }
    }

    fn on_timer(&mut self, host: &mut H, timer: TimerId) -> bool {
        self.slots
            .iter_mut()
            .flatten()
            .any(|slot| slot.on_timer(host, timer))
    }

    fn teardown(&mut self, host: &mut H) {
        self.torn_down = true;
        for slot in self.slots.iter_mut().flatten() {
            slot.detach(host);
        }
    }
}
