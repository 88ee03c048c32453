//! Half-open integer rectangles

use crate::CoreError;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle covering `[x, x + width) x [y, y + height)`.
///
/// A rectangle with a non-positive width or height is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The square of side `2 * radius + 1` centered on `(x, y)`, or `None`
    /// if any of its edges falls outside the `i32` range.
    pub fn around(x: i32, y: i32, radius: i32) -> Option<Self> {
        let side = radius.checked_mul(2)?.checked_add(1)?;
        let rect = Self::new(x.checked_sub(radius)?, y.checked_sub(radius)?, side, side);
        rect.is_bounded().then_some(rect)
    }

    pub const fn left(&self) -> i32 {
        self.x
    }

    /// Exclusive right edge, saturating at `i32::MAX`
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub const fn top(&self) -> i32 {
        self.y
    }

    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Whether both exclusive edges are representable without saturating
    pub const fn is_bounded(&self) -> bool {
        self.x.checked_add(self.width).is_some() && self.y.checked_add(self.height).is_some()
    }

    /// Reject rectangles that are empty or reach past the `i32` range.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.is_empty() {
            return Err(CoreError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.is_bounded() {
            return Err(CoreError::OutOfRange(*self));
        }
        Ok(())
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of integer points inside the rectangle
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        self.left() <= x && x < self.right() && self.top() <= y && y < self.bottom()
    }

    /// Overlap of two rectangles; empty (zero-sized) when they do not meet
    pub fn intersection(&self, other: &Rect) -> Rect {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return Rect::new(left, top, 0, 0);
        }
        Rect::new(left, top, right - left, bottom - top)
    }
}
