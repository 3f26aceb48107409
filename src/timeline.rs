//! Scroll-through simulation of a rendered page.
//!
//! Takes the [`RevealPlan`] a page was rendered with, lays its elements out in
//! a simple single-column grid, and scrolls a [`SimHost`] viewport from top to
//! bottom at a steady pace, recording when each element reveals. The layout is
//! approximate (heights come from the render hints, not a real browser), but
//! the reveal decisions are made by the same schedulers the build uses.

use std::time::Duration;

use crate::markup::{PlanItem, RevealPlan};
use crate::reveal::sim::{SimHost, Size};
use crate::reveal::{GroupReveal, NodeId, Rect, Reveal, Scheduled, VariantPresets};

/// Height of the sticky site header.
const HEADER_HEIGHT: f64 = 72.0;
/// Vertical gap between laid-out elements.
const GAP: f64 = 48.0;
const FOOTER_HEIGHT: f64 = 320.0;

#[derive(Debug, Clone, Copy)]
pub struct TimelineOptions {
    pub viewport: Size,
    pub reduced_motion: bool,
    /// Pixels scrolled per step.
    pub scroll_step: f64,
    /// Time spent at each scroll position.
    pub dwell: Duration,
    /// Extra time after reaching the bottom so pending delays can fire.
    pub settle: Duration,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 800.0),
            reduced_motion: false,
            scroll_step: 200.0,
            dwell: Duration::from_millis(200),
            settle: Duration::from_secs(2),
        }
    }
}

/// Parse a `WIDTHxHEIGHT` viewport like `1280x800`.
pub fn parse_viewport(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| *n > 0.0)
            .ok_or_else(|| format!("invalid viewport dimension '{v}'"))
    };
    Ok(Size::new(parse(w)?, parse(h)?))
}

/// Page-coordinate rectangles for every element of a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub rects: Vec<(NodeId, Rect)>,
    /// Total page height including the footer.
    pub height: f64,
}

impl Layout {
    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.rects.iter().find(|(n, _)| *n == node).map(|(_, r)| *r)
    }
}

/// Stack plan items top to bottom. Singles span the full width unless marked
/// beside the previous one, in which case the pair splits the row. Groups fill
/// a grid of their column count.
pub fn layout(plan: &RevealPlan, width: f64) -> Layout {
    let mut rects: Vec<(NodeId, Rect)> = Vec::new();
    let mut cursor = HEADER_HEIGHT;
    // Index in `rects` of the last single placed on its own row.
    let mut row_start: Option<usize> = None;

    for item in &plan.items {
        match item {
            PlanItem::Single {
                node,
                height,
                beside_previous,
                ..
            } => match row_start.filter(|_| *beside_previous) {
                Some(index) => {
                    let half = width / 2.0;
                    let prev = rects[index].1;
                    rects[index].1 = Rect::new(prev.x, prev.y, half, prev.height);
                    rects.push((*node, Rect::new(half, prev.y, half, *height)));
                    cursor = cursor.max(prev.y + height + GAP);
                    row_start = None;
                }
                None => {
                    rects.push((*node, Rect::new(0.0, cursor, width, *height)));
                    row_start = Some(rects.len() - 1);
                    cursor += height + GAP;
                }
            },
            PlanItem::Group {
                nodes,
                columns,
                item_height,
                ..
            } => {
                let columns = (*columns).max(1);
                let column_width = width / columns as f64;
                for (i, node) in nodes.iter().enumerate() {
                    let row = (i / columns) as f64;
                    let col = (i % columns) as f64;
                    let y = cursor + row * (item_height + GAP);
                    rects.push((*node, Rect::new(col * column_width, y, column_width, *item_height)));
                }
                let rows = nodes.len().div_ceil(columns) as f64;
                cursor += rows * (item_height + GAP);
                row_start = None;
            }
        }
    }

    Layout {
        rects,
        height: cursor + FOOTER_HEIGHT,
    }
}

/// When one element revealed during the simulated scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub label: String,
    /// Position within its group; `None` for single elements.
    pub index: Option<usize>,
    pub node: NodeId,
    pub top: f64,
    pub delay: Duration,
    pub revealed_at: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Timeline {
    pub rows: Vec<TimelineRow>,
    pub page_height: f64,
    /// Simulated time when the run ended.
    pub duration: Duration,
    pub timers_created: usize,
}

impl Timeline {
    pub fn revealed_count(&self) -> usize {
        self.rows.iter().filter(|r| r.revealed_at.is_some()).count()
    }
}

/// Scroll through `plan` and record reveal times.
pub fn simulate(plan: &RevealPlan, presets: &VariantPresets, options: &TimelineOptions) -> Timeline {
    let viewport = options.viewport;
    let layout = layout(plan, viewport.width);

    let mut host = SimHost::new(viewport).with_reduced_motion(options.reduced_motion);
    for (node, rect) in &layout.rects {
        host.place(*node, *rect);
    }

    let mut singles = Vec::new();
    let mut groups = Vec::new();
    for item in &plan.items {
        match item {
            PlanItem::Single { node, options, .. } => {
                singles.push(Reveal::attach(&mut host, Some(*node), options, presets));
            }
            PlanItem::Group { nodes, options, .. } => {
                let slots: Vec<Option<NodeId>> = nodes.iter().copied().map(Some).collect();
                groups.push(GroupReveal::attach(&mut host, &slots, options, presets));
            }
        }
    }
    let mut schedulers: Vec<&mut dyn Scheduled<SimHost>> = singles
        .iter_mut()
        .map(|s| s as &mut dyn Scheduled<SimHost>)
        .chain(groups.iter_mut().map(|g| g as &mut dyn Scheduled<SimHost>))
        .collect();

    let max_scroll = (layout.height - viewport.height).max(0.0);
    let step = options.scroll_step.max(1.0);
    let mut y = 0.0;
    host.advance(options.dwell, &mut schedulers);
    while y < max_scroll {
        y = (y + step).min(max_scroll);
        host.scroll_to(y);
        host.advance(options.dwell, &mut schedulers);
    }
    host.advance(options.settle, &mut schedulers);

    let mut rows = Vec::new();
    for item in &plan.items {
        match item {
            PlanItem::Single {
                label,
                node,
                options,
                ..
            } => rows.push(row(&host, &layout, label, None, *node, options.delay)),
            PlanItem::Group {
                label,
                nodes,
                options,
                ..
            } => {
                for (i, node) in nodes.iter().enumerate() {
                    rows.push(row(&host, &layout, label, Some(i), *node, options.delay_for(i)));
                }
            }
        }
    }

    Timeline {
        rows,
        page_height: layout.height,
        duration: host.now(),
        timers_created: host.timers_created(),
    }
}

fn row(
    host: &SimHost,
    layout: &Layout,
    label: &str,
    index: Option<usize>,
    node: NodeId,
    delay: Duration,
) -> TimelineRow {
    TimelineRow {
        label: label.to_string(),
        index,
        node,
        top: layout.rect(node).map_or(0.0, |r| r.y),
        delay,
        revealed_at: host.revealed_at(node),
    }
}
