//! Scissor (clipping) rectangle stack for hit-grid writes.

/// A clipping rectangle in screen cells. The origin may be negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ClipRect {
    /// Zero-area rectangle; clips everything.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Unbounded rectangle; clips nothing.
    pub const UNBOUNDED: Self = Self::new(0, 0, u32::MAX, u32::MAX);

    /// Create a new clipping rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge, saturated.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    /// Exclusive bottom edge, saturated.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    /// Check if a point is inside this rectangle.
    #[must_use]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.right() && py < self.bottom()
    }

    /// Overlap of two rectangles, `None` when they do not touch.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 > x1 && y2 > y1 {
            Some(Self {
                x: x1,
                y: y1,
                width: x2.abs_diff(x1),
                height: y2.abs_diff(y1),
            })
        } else {
            None
        }
    }

    /// Check if this rectangle is empty (zero area).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for ClipRect {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

/// Stack of clip rectangles. Every entry is already intersected with the
/// entries below it, so only the top is ever consulted.
#[derive(Clone, Debug, Default)]
pub struct ScissorStack {
    stack: Vec<ClipRect>,
}

impl ScissorStack {
    /// Create an empty stack (no clipping).
    #[must_use]
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Push `rect` intersected with the current top. Disjoint rects push
    /// [`ClipRect::EMPTY`].
    pub fn push(&mut self, rect: ClipRect) {
        let clipped = self
            .current()
            .intersect(&rect)
            .unwrap_or(ClipRect::EMPTY);
        self.stack.push(clipped);
    }

    /// Pop the top rectangle. No-op on an empty stack.
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Clear the stack.
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Number of pushed rectangles.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Current effective clip, unbounded when nothing is pushed.
    #[must_use]
    pub fn current(&self) -> ClipRect {
        self.stack.last().copied().unwrap_or(ClipRect::UNBOUNDED)
    }

    /// Clip `rect` against the current top.
    #[must_use]
    pub fn clip(&self, rect: ClipRect) -> Option<ClipRect> {
        self.current().intersect(&rect)
    }
}
