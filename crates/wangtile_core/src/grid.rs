//! Sparse occupancy grid
//!
//! A [`Grid`] stores which cells of a fixed rectangle are "on". Probes
//! outside of the rectangle are answered by its [`Overflow`] policy, so Wang
//! id derivation at the border never has to special-case the edge.

use crate::pointwise::{clamp_interval, modulo};
use crate::{CoreError, Occupancy, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

/// How probes outside of the grid rectangle are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Circle back to the other end of the grid (torus)
    Wrap,
    /// Use the nearest in-bounds cell, per axis
    Clamp,
    /// Everything outside is on
    AlwaysOn,
    /// Everything outside is off
    #[default]
    AlwaysOff,
    /// Outside probes have no answer; see [`Grid::probe`]
    Skip,
}

/// Occupied cells within a bounded rectangle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridDef")]
pub struct Grid {
    rect: Rect,
    overflow: Overflow,
    /// Stored as `(y, x)` so iteration is row-major
    values: BTreeSet<(i32, i32)>,
}

/// Unvalidated serialized form of [`Grid`]
#[derive(Deserialize)]
struct GridDef {
    rect: Rect,
    #[serde(default)]
    overflow: Overflow,
    #[serde(default)]
    values: BTreeSet<(i32, i32)>,
}

impl TryFrom<GridDef> for Grid {
    type Error = CoreError;

    fn try_from(def: GridDef) -> Result<Self, Self::Error> {
        let mut grid = Grid::new(def.rect, def.overflow)?;
        for (y, x) in def.values {
            grid.set(x, y);
        }
        Ok(grid)
    }
}

impl Grid {
    /// Create an empty grid. The rectangle is fixed for the grid's lifetime
    /// and must lie within the `i32` coordinate range.
    pub fn new(rect: Rect, overflow: Overflow) -> Result<Self, CoreError> {
        rect.validate()?;
        Ok(Self {
            rect,
            overflow,
            values: BTreeSet::new(),
        })
    }

    /// Create a grid populated from `probe` over its whole rectangle
    pub fn with_probe<P>(rect: Rect, overflow: Overflow, probe: &P) -> Result<Self, CoreError>
    where
        P: Occupancy + ?Sized,
    {
        let mut grid = Self::new(rect, overflow)?;
        grid.refresh(rect, probe);
        Ok(grid)
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Occupied cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.values.iter().map(|&(y, x)| (x, y))
    }

    /// Turn a cell on. Returns `false` if the cell is outside the grid.
    pub fn set(&mut self, x: i32, y: i32) -> bool {
        if !self.rect.contains(x, y) {
            trace!(x, y, "ignoring set outside of grid");
            return false;
        }
        self.values.insert((y, x));
        true
    }

    /// Turn a cell off. Returns `false` if the cell is outside the grid.
    pub fn unset(&mut self, x: i32, y: i32) -> bool {
        if !self.rect.contains(x, y) {
            trace!(x, y, "ignoring unset outside of grid");
            return false;
        }
        self.values.remove(&(y, x));
        true
    }

    /// Resynchronise the part of `rect` inside the grid from `probe`.
    pub fn refresh<P>(&mut self, rect: Rect, probe: &P)
    where
        P: Occupancy + ?Sized,
    {
        let scoped = self.rect.intersection(&rect);
        for y in scoped.top()..scoped.bottom() {
            for x in scoped.left()..scoped.right() {
                if probe.is_set(x, y) {
                    self.values.insert((y, x));
                } else {
                    self.values.remove(&(y, x));
                }
            }
        }
    }

    /// Occupancy at `(x, y)`, or `None` for an out-of-bounds probe under
    /// [`Overflow::Skip`].
    pub fn probe(&self, x: i32, y: i32) -> Option<bool> {
        if self.rect.contains(x, y) {
            return Some(self.values.contains(&(y, x)));
        }
        let rect = self.rect;
        match self.overflow {
            Overflow::Wrap => {
                let x = modulo(rect.left(), rect.right(), x);
                let y = modulo(rect.top(), rect.bottom(), y);
                Some(self.values.contains(&(y, x)))
            }
            Overflow::Clamp => {
                let x = clamp_interval(rect.left(), rect.right(), x);
                let y = clamp_interval(rect.top(), rect.bottom(), y);
                Some(self.values.contains(&(y, x)))
            }
            Overflow::AlwaysOn => Some(true),
            Overflow::AlwaysOff => Some(false),
            Overflow::Skip => None,
        }
    }

    /// Occupancy at `(x, y)`; skipped probes read as off.
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.probe(x, y).unwrap_or(false)
    }
}

impl Occupancy for Grid {
    fn is_set(&self, x: i32, y: i32) -> bool {
        Grid::is_set(self, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(overflow: Overflow) -> Grid {
        let mut grid = Grid::new(Rect::new(0, 0, 4, 3), overflow).unwrap();
        grid.set(0, 0);
        grid.set(3, 2);
        grid
    }

    #[test]
    fn test_rejects_empty_rect() {
        assert!(Grid::new(Rect::new(0, 0, 0, 1), Overflow::Wrap).is_err());
    }

    #[test]
    fn test_set_and_unset() {
        let mut g = grid(Overflow::AlwaysOff);
        assert!(g.is_set(0, 0));
        assert!(!g.is_set(1, 0));
        assert!(g.unset(0, 0));
        assert!(!g.is_set(0, 0));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_no_implicit_growth() {
        let mut g = grid(Overflow::AlwaysOff);
        assert!(!g.set(4, 0));
        assert!(!g.set(-1, 1));
        assert_eq!(g.len(), 2);
        assert_eq!(g.rect(), Rect::new(0, 0, 4, 3));
    }

    #[test]
    fn test_wrap_any_magnitude() {
        let g = grid(Overflow::Wrap);
        assert!(g.is_set(4, 3));
        assert!(g.is_set(-1, -1));
        assert!(g.is_set(400, 300));
        assert!(g.is_set(-401, -301));
        assert!(!g.is_set(-2, -1));
    }

    #[test]
    fn test_clamp_per_axis() {
        let g = grid(Overflow::Clamp);
        assert!(g.is_set(-5, -5));
        assert!(g.is_set(10, 10));
        assert!(g.is_set(3, 99));
        assert!(!g.is_set(-5, 2));
    }

    #[test]
    fn test_constant_policies() {
        assert!(grid(Overflow::AlwaysOn).is_set(-1, 0));
        assert!(!grid(Overflow::AlwaysOff).is_set(-1, 0));
        let skip = grid(Overflow::Skip);
        assert_eq!(skip.probe(-1, 0), None);
        assert_eq!(skip.probe(0, 0), Some(true));
        assert!(!skip.is_set(-1, 0));
    }

    #[test]
    fn test_refresh_from_probe() {
        let diagonal = |x: i32, y: i32| x == y;
        let mut g = Grid::with_probe(Rect::new(0, 0, 3, 3), Overflow::AlwaysOff, &diagonal).unwrap();
        assert_eq!(g.iter().collect::<Vec<_>>(), vec![(0, 0), (1, 1), (2, 2)]);

        g.refresh(Rect::new(1, 0, 10, 1), &|_: i32, _: i32| true);
        assert_eq!(
            g.iter().collect::<Vec<_>>(),
            vec![(0, 0), (1, 0), (2, 0), (1, 1), (2, 2)]
        );
    }

    #[test]
    fn test_grid_is_occupancy() {
        fn count<P: Occupancy>(probe: &P) -> usize {
            (0..3).filter(|&x| probe.is_set(x, 0)).count()
        }
        let mut g = Grid::new(Rect::new(0, 0, 3, 1), Overflow::AlwaysOff).unwrap();
        g.set(1, 0);
        g.set(2, 0);
        assert_eq!(count(&g), 2);
    }

    #[test]
    fn test_deserialize_validates() {
        let g = grid(Overflow::Wrap);
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), g);

        // Cells outside the rectangle are dropped, as with `set`.
        let parsed: Grid = serde_json::from_str(
            r#"{"rect": {"x": 0, "y": 0, "width": 2, "height": 2}, "values": [[1, 1], [5, 0]]}"#,
        )
        .unwrap();
        assert_eq!(parsed.overflow(), Overflow::AlwaysOff);
        assert_eq!(parsed.iter().collect::<Vec<_>>(), vec![(1, 1)]);

        for invalid in [
            r#"{"rect": {"x": 0, "y": 0, "width": 0, "height": 0}, "overflow": "wrap"}"#,
            r#"{"rect": {"x": 0, "y": 0, "width": 3, "height": -1}}"#,
            r#"{"rect": {"x": 0, "y": 2147483646, "width": 3, "height": 3}}"#,
        ] {
            assert!(serde_json::from_str::<Grid>(invalid).is_err(), "{invalid}");
        }
    }

    #[test]
    fn test_coordinate_limits() {
        assert!(matches!(
            Grid::new(Rect::new(i32::MAX - 1, 0, 2, 1), Overflow::Wrap),
            Err(CoreError::OutOfRange(_))
        ));

        let mut g = Grid::new(Rect::new(i32::MAX - 2, i32::MIN, 2, 2), Overflow::Wrap).unwrap();
        assert!(g.set(i32::MAX - 2, i32::MIN));
        assert!(!g.set(i32::MAX, i32::MIN));
        assert!(g.is_set(i32::MAX - 2, i32::MIN));
        assert!(g.is_set(i32::MAX, i32::MIN + 2));
        assert!(g.is_set(i32::MIN + 1, i32::MAX - 1));
        assert!(!g.is_set(i32::MAX - 1, i32::MIN));
    }
}
