//! Autotile layouts
//!
//! Each layout is a derive + project + default pattern triple. The set is
//! closed, so every `match` over it is checked for exhaustiveness.

use crate::ids::{derive_blob, derive_corner, derive_edge, WangId};
use crate::pattern::{BuiltinPattern, Pattern};
use crate::AutotileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use wangtile_core::Occupancy;

/// Type of tileset layout - determines which neighbors matter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// 4 edges per tile (N, E, S, W)
    /// Good for roads, paths, overhead walls
    Edge,
    /// 4 corners per tile, sampled from the cell's own quadrant
    /// Good for basic terrain transitions
    Corner,
    /// 4 edges + 4 corners per tile, corners only with both flanks
    /// Most flexible, requires 47 tiles
    #[default]
    Blob,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Edge, Layout::Corner, Layout::Blob];

    /// Derive the raw id at `(x, y)`, or `None` if nothing should be drawn there.
    pub fn derive<P>(self, probe: &P, x: i32, y: i32) -> Option<WangId>
    where
        P: Occupancy + ?Sized,
    {
        match self {
            Layout::Edge => derive_edge(probe, x, y),
            Layout::Corner => derive_corner(probe, x, y),
            Layout::Blob => derive_blob(probe, x, y),
        }
    }

    /// Mask an id down to the bits this layout's art distinguishes.
    pub fn project(self, wang_id: WangId) -> WangId {
        match self {
            Layout::Edge => wang_id.project_edge(),
            Layout::Corner => wang_id.project_corner(),
            Layout::Blob => wang_id.project_blob(),
        }
    }

    /// The built-in table this layout uses when none is given
    pub fn builtin(self) -> BuiltinPattern {
        match self {
            Layout::Edge => BuiltinPattern::Edge,
            Layout::Corner => BuiltinPattern::BrigittsCross,
            Layout::Blob => BuiltinPattern::Blob,
        }
    }

    pub fn default_pattern(self) -> &'static Pattern {
        self.builtin().pattern()
    }

    /// Number of distinct projected ids (and so tiles) this layout needs
    pub fn tile_count(self) -> usize {
        match self {
            Layout::Edge | Layout::Corner => 16,
            Layout::Blob => 47,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layout::Edge => "edge",
            Layout::Corner => "corner",
            Layout::Blob => "blob",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layout {
    type Err = AutotileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::ALL
            .into_iter()
            .find(|layout| layout.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| AutotileError::Configuration(format!("unknown layout '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_is_total() {
        for layout in Layout::ALL {
            let pattern = layout.default_pattern();
            assert_eq!(pattern.len(), layout.tile_count());
            for w in WangId::all() {
                assert!(
                    pattern.get(layout.project(w)).is_ok(),
                    "{layout} has no tile for {w}"
                );
            }
        }
    }

    #[test]
    fn test_projection_idempotent() {
        for layout in Layout::ALL {
            for w in WangId::all() {
                let once = layout.project(w);
                assert_eq!(layout.project(once), once);
            }
        }
    }

    #[test]
    fn test_edge_absent_vs_zero() {
        let lonely = |x: i32, y: i32| x == 1 && y == 1;
        let id = Layout::Edge.derive(&lonely, 1, 1);
        assert_eq!(id, Some(WangId::EMPTY));
        assert_eq!(Layout::Edge.default_pattern().get(WangId::EMPTY).unwrap(), 12);

        let hole = |x: i32, y: i32| !(x == 1 && y == 1);
        assert_eq!(Layout::Edge.derive(&hole, 1, 1), None);
    }

    #[test]
    fn test_parse_layout() {
        assert_eq!("blob".parse::<Layout>().unwrap(), Layout::Blob);
        assert_eq!("Edge".parse::<Layout>().unwrap(), Layout::Edge);
        assert!(matches!(
            "hex".parse::<Layout>(),
            Err(AutotileError::Configuration(_))
        ));
    }
}
