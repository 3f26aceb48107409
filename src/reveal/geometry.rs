//! Axis-aligned rectangles and the visible-fraction computation.

/// Rectangle in page coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlap of two rectangles, or `None` when they are disjoint.
    ///
    /// Touching edges count as an (empty) intersection, matching how browsers
    /// report a zero-height element sitting exactly on the viewport edge.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < x || bottom < y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }
}

/// Fraction of `target` inside `root`, plus whether they intersect at all.
pub fn visible_fraction(target: &Rect, root: &Rect) -> (f64, bool) {
    match target.intersection(root) {
        None => (0.0, false),
        Some(overlap) => {
            let area = target.area();
            if area <= 0.0 {
                (1.0, true)
            } else {
                ((overlap.area() / area).clamp(0.0, 1.0), true)
            }
        }
    }
}
