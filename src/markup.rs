//! Build-time reveal host: turns scheduler effects into HTML attributes.
//!
//! Pages are rendered once, ahead of time, so there is no viewport to watch.
//! [`MarkupHost`] implements [`Host`] by recording what the scheduler asks
//! for (observe options, classes, the delay property, the revealed flag) and
//! [`RevealScope`] hands each element its [`RevealAttrs`]. The browser glue in
//! `static/reveal.js` reads those attributes back and finishes the job with a
//! real visibility monitor.
//!
//! In prerender mode the host reports reduced motion, so the schedulers reveal
//! every element on attach and the page ships fully visible.
//!
//! Every element also lands in a [`RevealPlan`], which the `timeline` command
//! replays against a simulated viewport.

use maud::{Markup, html};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::Prerender;
use crate::reveal::{
    DELAY_PROPERTY, GroupOptions, GroupReveal, Host, MonitorError, NodeId, ObserveOptions, Reveal,
    RevealOptions, RootMargin, TimerId, VariantPresets,
};

#[derive(Debug, Default)]
struct NodeRecord {
    revealed: bool,
    classes: Vec<String>,
    properties: BTreeMap<String, String>,
    observe: Option<ObserveOptions>,
}

/// [`Host`] that records effects per node instead of applying them.
#[derive(Debug, Default)]
pub struct MarkupHost {
    reduced_motion: bool,
    next_node: u32,
    next_timer: u64,
    nodes: BTreeMap<NodeId, NodeRecord>,
}

impl MarkupHost {
    pub fn new(prerender: Prerender) -> Self {
        Self {
            reduced_motion: prerender == Prerender::Revealed,
            ..Self::default()
        }
    }

    /// Mint a fresh node id for the element about to be rendered.
    pub fn alloc(&mut self) -> NodeId {
        self.next_node += 1;
        let node = NodeId(self.next_node);
        self.nodes.insert(node, NodeRecord::default());
        node
    }

    /// Attributes for `node` as the scheduler left it.
    pub fn attrs(&self, node: NodeId) -> RevealAttrs {
        let record = self.nodes.get(&node);
        RevealAttrs {
            node,
            revealed: record.is_some_and(|r| r.revealed),
            classes: record.map(|r| r.classes.clone()).unwrap_or_default(),
            threshold: record.and_then(|r| r.observe).map(|o| o.threshold),
            root_margin: record.and_then(|r| r.observe).map(|o| o.root_margin),
            delay: record.and_then(|r| r.properties.get(DELAY_PROPERTY).cloned()),
        }
    }
}

impl Host for MarkupHost {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn observe(&mut self, node: NodeId, options: &ObserveOptions) -> Result<(), MonitorError> {
        let record = self.nodes.get_mut(&node).ok_or_else(|| MonitorError::Rejected {
            node,
            reason: "not allocated by this page".to_string(),
        })?;
        record.observe = Some(*options);
        Ok(())
    }

    // The browser unobserves on its own; the attributes must stay for it.
    fn unobserve(&mut self, _node: NodeId) {}

    fn set_timeout(&mut self, _delay: Duration) -> TimerId {
        self.next_timer += 1;
        TimerId(self.next_timer)
    }

    fn clear_timeout(&mut self, _timer: TimerId) {}

    fn mark_revealed(&mut self, node: NodeId) {
        self.nodes.entry(node).or_default().revealed = true;
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        let classes = &mut self.nodes.entry(node).or_default().classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
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

/// Everything an element needs to take part in scroll reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealAttrs {
    pub node: NodeId,
    pub revealed: bool,
    /// Variant classes beyond the base `reveal`.
    pub classes: Vec<String>,
    pub threshold: Option<f64>,
    pub root_margin: Option<RootMargin>,
    /// Value of the delay property, e.g. `120ms`.
    pub delay: Option<String>,
}

impl RevealAttrs {
    /// `class` attribute: `reveal`, variant classes, then `extra`.
    pub fn class(&self, extra: &str) -> String {
        let mut class = String::from("reveal");
        for c in &self.classes {
            class.push(' ');
            class.push_str(c);
        }
        if !extra.is_empty() {
            class.push(' ');
            class.push_str(extra);
        }
        class
    }

    pub fn style(&self) -> Option<String> {
        self.delay
            .as_ref()
            .map(|d| format!("{DELAY_PROPERTY}: {d}"))
    }

    fn revealed_attr(&self) -> Option<&'static str> {
        self.revealed.then_some("true")
    }

    fn threshold_attr(&self) -> Option<String> {
        self.threshold.map(|t| t.to_string())
    }

    fn margin_attr(&self) -> Option<String> {
        self.root_margin.map(|m| m.to_string())
    }
}

/// Wrap `content` in a revealable `div`.
pub fn reveal_div(attrs: &RevealAttrs, class: &str, content: Markup) -> Markup {
    html! {
        div class=(attrs.class(class))
            data-revealed=[attrs.revealed_attr()]
            data-reveal-threshold=[attrs.threshold_attr()]
            data-reveal-margin=[attrs.margin_attr()]
            style=[attrs.style()] {
            (content)
        }
    }
}

/// Wrap `content` in a revealable link.
pub fn reveal_link(attrs: &RevealAttrs, class: &str, href: &str, content: Markup) -> Markup {
    html! {
        a class=(attrs.class(class)) href=(href)
            data-revealed=[attrs.revealed_attr()]
            data-reveal-threshold=[attrs.threshold_attr()]
            data-reveal-margin=[attrs.margin_attr()]
            style=[attrs.style()] {
            (content)
        }
    }
}

// =============================================================================
// Plan
// =============================================================================

/// How one revealable element or group was configured, plus a rough layout
/// hint (CSS pixels at desktop width) for simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanItem {
    Single {
        label: String,
        node: NodeId,
        options: RevealOptions,
        height: f64,
        /// Sits to the right of the previous single instead of below it.
        beside_previous: bool,
    },
    Group {
        label: String,
        nodes: Vec<NodeId>,
        options: GroupOptions,
        columns: usize,
        item_height: f64,
    },
}

impl PlanItem {
    pub fn label(&self) -> &str {
        match self {
            PlanItem::Single { label, .. } | PlanItem::Group { label, .. } => label,
        }
    }
}

/// Ordered reveal configuration of one rendered page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealPlan {
    pub items: Vec<PlanItem>,
}

impl RevealPlan {
    /// Total number of revealable elements.
    pub fn element_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                PlanItem::Single { .. } => 1,
                PlanItem::Group { nodes, .. } => nodes.len(),
            })
            .sum()
    }
}

/// Per-page reveal registry used by the renderers.
#[derive(Debug)]
pub struct RevealScope {
    host: MarkupHost,
    presets: VariantPresets,
    plan: RevealPlan,
}

impl RevealScope {
    pub fn new(prerender: Prerender, presets: VariantPresets) -> Self {
        Self {
            host: MarkupHost::new(prerender),
            presets,
            plan: RevealPlan::default(),
        }
    }

    /// Register one element and return its attributes.
    pub fn single(&mut self, label: &str, options: RevealOptions, height: f64) -> RevealAttrs {
        self.push_single(label, options, height, false)
    }

    /// Like [`single`](Self::single), laid out beside the previous element.
    pub fn beside(&mut self, label: &str, options: RevealOptions, height: f64) -> RevealAttrs {
        self.push_single(label, options, height, true)
    }

    fn push_single(
        &mut self,
        label: &str,
        options: RevealOptions,
        height: f64,
        beside_previous: bool,
    ) -> RevealAttrs {
        let node = self.host.alloc();
        Reveal::attach(&mut self.host, Some(node), &options, &self.presets);
        self.plan.items.push(PlanItem::Single {
            label: label.to_string(),
            node,
            options,
            height,
            beside_previous,
        });
        self.host.attrs(node)
    }

    /// Register `count` elements revealed with index stagger. The returned
    /// attributes are in index order.
    pub fn group(
        &mut self,
        label: &str,
        options: GroupOptions,
        count: usize,
        columns: usize,
        item_height: f64,
    ) -> Vec<RevealAttrs> {
        let nodes: Vec<NodeId> = (0..count).map(|_| self.host.alloc()).collect();
        let slots: Vec<Option<NodeId>> = nodes.iter().copied().map(Some).collect();
        GroupReveal::attach(&mut self.host, &slots, &options, &self.presets);
        let attrs = nodes.iter().map(|n| self.host.attrs(*n)).collect();
        self.plan.items.push(PlanItem::Group {
            label: label.to_string(),
            nodes,
            options,
            columns: columns.max(1),
            item_height,
        });
        attrs
    }

    pub fn into_plan(self) -> RevealPlan {
        self.plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reveal::Variant;

    fn scope(prerender: Prerender) -> RevealScope {
        RevealScope::new(prerender, VariantPresets::default())
    }

    #[test]
    fn single_default_carries_observe_attributes() {
        let mut scope = scope(Prerender::Animated);
        let attrs = scope.single("header", RevealOptions::default(), 200.0);
        assert!(!attrs.revealed);
        assert_eq!(attrs.class(""), "reveal");
        assert_eq!(attrs.threshold, Some(0.15));
        assert_eq!(attrs.root_margin, Some(RootMargin::bottom_percent(-10.0)));
        assert_eq!(attrs.style(), None);
    }

    #[test]
    fn image_with_delay_gets_class_and_style() {
        let mut scope = scope(Prerender::Animated);
        let opts = RevealOptions::image().with_delay(Duration::from_millis(100));
        let attrs = scope.single("hero image", opts, 400.0);
        assert_eq!(attrs.class("hero-image"), "reveal reveal--image hero-image");
        assert_eq!(attrs.style().as_deref(), Some("--reveal-delay: 100ms"));
        assert_eq!(attrs.root_margin, Some(RootMargin::bottom_percent(-25.0)));
    }

    #[test]
    fn group_publishes_stagger_per_index() {
        let mut scope = scope(Prerender::Animated);
        let attrs = scope.group("cards", GroupOptions::staggered(Variant::Image, 120), 3, 3, 300.0);
        let delays: Vec<Option<&str>> = attrs.iter().map(|a| a.delay.as_deref()).collect();
        assert_eq!(delays, vec![None, Some("120ms"), Some("240ms")]);
        assert!(attrs.iter().all(|a| a.classes == vec!["reveal--image".to_string()]));
    }

    #[test]
    fn prerender_reveals_everything_without_attributes() {
        let mut scope = scope(Prerender::Revealed);
        let single = scope.single("x", RevealOptions::image().with_delay(Duration::from_millis(100)), 1.0);
        let group = scope.group("y", GroupOptions::staggered(Variant::Default, 80), 2, 2, 1.0);
        for attrs in std::iter::once(&single).chain(&group) {
            assert!(attrs.revealed);
            assert_eq!(attrs.threshold, None);
            assert_eq!(attrs.delay, None);
            assert_eq!(attrs.class(""), "reveal");
        }
    }

    #[test]
    fn reveal_div_renders_data_attributes() {
        let mut scope = scope(Prerender::Animated);
        let attrs = scope.single("form", RevealOptions::default().with_delay(Duration::from_millis(100)), 1.0);
        let html = reveal_div(&attrs, "contact-form", html! { "hi" }).into_string();
        assert!(html.contains(r#"class="reveal contact-form""#));
        assert!(html.contains(r#"data-reveal-threshold="0.15""#));
        assert!(html.contains(r#"data-reveal-margin="0px 0px -10% 0px""#));
        assert!(html.contains(r#"style="--reveal-delay: 100ms""#));
        assert!(!html.contains("data-revealed"));
    }

    #[test]
    fn reveal_link_prerendered() {
        let mut scope = scope(Prerender::Revealed);
        let attrs = scope.single("card", RevealOptions::default(), 1.0);
        let html = reveal_link(&attrs, "card", "/products/pulp/", html! { "Pulp" }).into_string();
        assert!(html.contains(r#"data-revealed="true""#));
        assert!(html.contains(r#"href="/products/pulp/""#));
        assert!(!html.contains("data-reveal-threshold"));
    }

    #[test]
    fn plan_records_items_in_order() {
        let mut scope = scope(Prerender::Animated);
        scope.single("text", RevealOptions::default(), 300.0);
        scope.beside("image", RevealOptions::image(), 300.0);
        scope.group("cards", GroupOptions::default(), 4, 2, 200.0);
        let plan = scope.into_plan();
        let labels: Vec<&str> = plan.items.iter().map(PlanItem::label).collect();
        assert_eq!(labels, vec!["text", "image", "cards"]);
        assert_eq!(plan.element_count(), 6);
        assert!(matches!(
            plan.items[1],
            PlanItem::Single { beside_previous: true, .. }
        ));
    }

    #[test]
    fn observe_of_unknown_node_is_rejected() {
        let mut host = MarkupHost::new(Prerender::Animated);
        let opts = RevealOptions::default().resolve(&VariantPresets::default());
        assert!(host.observe(NodeId(42), &opts).is_err());
    }
}
