//! Pointwise coordinate arithmetic
//!
//! A [`Pointwise`] is a rectangle plus a stride in each axis and a policy for
//! points that fall outside of it. Traversal is always row-major (y outer,
//! x inner, ascending) and restartable: every call to [`Pointwise::iter`] or
//! [`Pointwise::for_each`] starts from scratch.

use crate::{CoreError, Rect};
use serde::{Deserialize, Serialize};

/// Handling for points outside of a [`Pointwise`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Snap each axis to the nearest in-bounds value
    #[default]
    Clamp,
    /// Treat the rectangle as a torus
    Mod,
    /// Out-of-bounds points resolve to nothing
    Skip,
}

/// Strided traversal over a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PointwiseDef")]
pub struct Pointwise {
    rect: Rect,
    stride_x: i32,
    stride_y: i32,
    adjustment: Adjustment,
}

/// Unvalidated serialized form of [`Pointwise`]
#[derive(Deserialize)]
struct PointwiseDef {
    rect: Rect,
    #[serde(default = "unit_stride")]
    stride_x: i32,
    #[serde(default = "unit_stride")]
    stride_y: i32,
    #[serde(default)]
    adjustment: Adjustment,
}

fn unit_stride() -> i32 {
    1
}

impl TryFrom<PointwiseDef> for Pointwise {
    type Error = CoreError;

    fn try_from(def: PointwiseDef) -> Result<Self, Self::Error> {
        Ok(Pointwise::new(def.rect)?
            .with_stride(def.stride_x, def.stride_y)?
            .with_adjustment(def.adjustment))
    }
}

impl Pointwise {
    /// Create a pointwise over `rect` with unit stride and clamping.
    pub fn new(rect: Rect) -> Result<Self, CoreError> {
        rect.validate()?;
        Ok(Self {
            rect,
            stride_x: 1,
            stride_y: 1,
            adjustment: Adjustment::Clamp,
        })
    }

    pub fn with_stride(mut self, stride_x: i32, stride_y: i32) -> Result<Self, CoreError> {
        if stride_x <= 0 || stride_y <= 0 {
            return Err(CoreError::InvalidStride {
                x: stride_x,
                y: stride_y,
            });
        }
        self.stride_x = stride_x;
        self.stride_y = stride_y;
        Ok(self)
    }

    pub fn with_adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustment = adjustment;
        self
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn stride(&self) -> (i32, i32) {
        (self.stride_x, self.stride_y)
    }

    pub fn adjustment(&self) -> Adjustment {
        self.adjustment
    }

    /// Number of visited columns per row
    pub fn col_count(&self) -> usize {
        ceil_div(self.rect.width.into(), self.stride_x.into()) as usize
    }

    /// Number of visited rows
    pub fn row_count(&self) -> usize {
        ceil_div(self.rect.height.into(), self.stride_y.into()) as usize
    }

    /// Whether the point lies inside the rectangle, ignoring the adjustment policy
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rect.contains(x, y)
    }

    pub fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
        (
            clamp_interval(self.rect.left(), self.rect.right(), x),
            clamp_interval(self.rect.top(), self.rect.bottom(), y),
        )
    }

    pub fn modulo(&self, x: i32, y: i32) -> (i32, i32) {
        (
            modulo(self.rect.left(), self.rect.right(), x),
            modulo(self.rect.top(), self.rect.bottom(), y),
        )
    }

    /// Apply the adjustment policy. Only [`Adjustment::Skip`] can return `None`.
    pub fn adjust(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        match self.adjustment {
            Adjustment::Clamp => Some(self.clamp(x, y)),
            Adjustment::Mod => Some(self.modulo(x, y)),
            Adjustment::Skip => self.contains(x, y).then_some((x, y)),
        }
    }

    /// The `i`th visited point, counting row-major from the top left.
    ///
    /// Counts past the last column continue on the next row; counts past the
    /// last row run off the bottom and are resolved by the adjustment policy.
    /// Rows beyond the `i32` range saturate at `i32::MAX`.
    pub fn nth(&self, i: usize) -> Option<(i32, i32)> {
        let cols = self.col_count();
        let col = (i % cols) as i32;
        let row = i64::try_from(i / cols).unwrap_or(i64::MAX);
        let y = i64::from(self.stride_y)
            .saturating_mul(row)
            .saturating_add(self.rect.top().into());
        self.adjust(
            self.rect.left() + self.stride_x * col,
            i32::try_from(y).unwrap_or(i32::MAX),
        )
    }

    /// Inverse of [`nth`](Self::nth): the visitation count of the lattice
    /// point at or before `(x, y)`, wrapping coordinates outside the rectangle.
    pub fn index(&self, x: i32, y: i32) -> usize {
        let cols = self.col_count();
        let rows = self.row_count();
        let col = (i64::from(x) - i64::from(self.rect.left()))
            .div_euclid(self.stride_x.into())
            .rem_euclid(cols as i64) as usize;
        let row = (i64::from(y) - i64::from(self.rect.top()))
            .div_euclid(self.stride_y.into())
            .rem_euclid(rows as i64) as usize;
        row * cols + col
    }

    /// Iterate `(x, y, index)` over the rectangle, or over `area` if given.
    ///
    /// With clamping or skipping the area is first intersected with the
    /// rectangle; with wrapping it is walked as given and each point is
    /// reported after wrapping. Points always sit on the stride lattice.
    pub fn iter(&self, area: Option<Rect>) -> Points {
        let area = match (self.adjustment, area) {
            (_, None) => self.rect,
            (Adjustment::Mod, Some(area)) => area,
            (Adjustment::Clamp | Adjustment::Skip, Some(area)) => self.rect.intersection(&area),
        };
        let start_x = lattice_start(self.rect.left(), area.left(), self.stride_x);
        let start_y = lattice_start(self.rect.top(), area.top(), self.stride_y);
        Points {
            pointwise: *self,
            area,
            start_x,
            x: start_x,
            y: start_y,
            index: 0,
        }
    }

    /// Invoke `callback(x, y, index)` at every point [`iter`](Self::iter) visits.
    pub fn for_each<F>(&self, mut callback: F, area: Option<Rect>)
    where
        F: FnMut(i32, i32, usize),
    {
        for (x, y, index) in self.iter(area) {
            callback(x, y, index);
        }
    }

    /// Invoke `callback` at the adjusted point, or return `None` if it was skipped.
    pub fn evaluate_at<T, F>(&self, callback: F, x: i32, y: i32) -> Option<T>
    where
        F: FnOnce(i32, i32) -> T,
    {
        self.adjust(x, y).map(|(x, y)| callback(x, y))
    }
}

/// Row-major point iterator produced by [`Pointwise::iter`]
#[derive(Debug, Clone)]
pub struct Points {
    pointwise: Pointwise,
    area: Rect,
    start_x: i32,
    x: i32,
    y: i32,
    index: usize,
}

impl Iterator for Points {
    type Item = (i32, i32, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (stride_x, stride_y) = self.pointwise.stride();
        while self.y < self.area.bottom() && self.start_x < self.area.right() {
            let (x, y) = (self.x, self.y);
            self.x = self.x.saturating_add(stride_x);
            if self.x >= self.area.right() {
                self.x = self.start_x;
                self.y = self.y.saturating_add(stride_y);
            }
            if let Some((x, y)) = self.pointwise.adjust(x, y) {
                let index = self.index;
                self.index += 1;
                return Some((x, y, index));
            }
        }
        None
    }
}

/// True if the interval `[min, max)` contains `val`.
pub fn contains_interval(min: i32, max: i32, val: i32) -> bool {
    min <= val && val < max
}

/// `val` wrapped into `[min, max)`; non-negative for any magnitude of `val`.
pub fn modulo(min: i32, max: i32, val: i32) -> i32 {
    let (min, max, val) = (i64::from(min), i64::from(max), i64::from(val));
    (min + (val - min).rem_euclid(max - min)) as i32
}

/// The value within `[min, max)` closest to `val`.
pub fn clamp_interval(min: i32, max: i32, val: i32) -> i32 {
    if val >= max {
        max - 1
    } else if val < min {
        min
    } else {
        val
    }
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1).div_euclid(divisor)
}

/// First lattice coordinate at or after `from`, for a lattice anchored at
/// `origin`; saturates at `i32::MAX`.
fn lattice_start(origin: i32, from: i32, stride: i32) -> i32 {
    let (origin, stride) = (i64::from(origin), i64::from(stride));
    let start = origin + ceil_div(i64::from(from) - origin, stride) * stride;
    i32::try_from(start).unwrap_or(i32::MAX)
}
