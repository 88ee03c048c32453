//! Pattern tables and corner indexing
//!
//! A [`Pattern`] maps a projected [`WangId`] to a tile index. The built-in
//! tables are built once and shared; terrains that need a different table
//! copy one with [`Pattern::with_tile`] instead of mutating it.

use crate::ids::{Corner, WangId};
use crate::layout::Layout;
use crate::AutotileError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::debug;

const N: u8 = 1 << 0;
const NE: u8 = 1 << 1;
const E: u8 = 1 << 2;
const SE: u8 = 1 << 3;
const S: u8 = 1 << 4;
const SW: u8 = 1 << 5;
const W: u8 = 1 << 6;
const NW: u8 = 1 << 7;

/// 2-edge layout 0 from the cr31 Wang tile reference, as a 4x4 sheet:
/// the upper right 3x3 is fully connected, with a 1x3 column to its west,
/// a 3x1 row to its south, and an island in the bottom left.
const EDGE: [(u8, u32); 16] = [
    (S, 0),
    (S | E, 1),
    (W | S | E, 2),
    (W | S, 3),
    (N | S, 4),
    (N | E | S, 5),
    (N | E | S | W, 6),
    (N | S | W, 7),
    (N, 8),
    (N | E, 9),
    (N | E | W, 10),
    (N | W, 11),
    (0, 12),
    (E, 13),
    (E | W, 14),
    (W, 15),
];

/// Brigitt's Cross 2-corner layout, as a 4x4 sheet.
const BRIGITTS_CROSS: [(u8, u32); 16] = [
    (SW, 0),
    (NE | SE, 1),
    (NW | SW | SE, 2),
    (SW | SE, 3),
    (NW | SE, 4),
    (NE | SE | SW, 5),
    (NE | SE | SW | NW, 6),
    (NE | SW | NW, 7),
    (NE, 8),
    (NW | NE, 9),
    (NW | NE | SE, 10),
    (NW | SW, 11),
    (0, 12),
    (SE, 13),
    (SW | NE, 14),
    (NW, 15),
];

/// The 47 blob-normalised ids in ascending order; tile index = position.
const BLOB: [u8; 47] = [
    0, 1, 4, 5, 7, 16, 17, 20, 21, 23, 28, 29, 31, 64, 65, 68, 69, 71, 80, 81, 84, 85, 87, 92,
    93, 95, 112, 113, 116, 117, 119, 124, 125, 127, 193, 197, 199, 209, 213, 215, 221, 223, 241,
    245, 247, 253, 255,
];

/// Crossroads plus the four convex corner islands. Tile 0 is unused.
const RPG_MAKER: [(u8, u32); 5] = [
    (N | E | S | W, 1),
    (E | SE | S, 2),
    (S | SW | W, 3),
    (N | NE | E, 4),
    (W | NW | N, 5),
];

/// A mapping from wang id to tile index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    entries: BTreeMap<WangId, u32>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (WangId, u32)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    fn from_raw(pairs: &[(u8, u32)]) -> Self {
        Self::from_pairs(pairs.iter().map(|&(id, tile)| (WangId(id), tile)))
    }

    /// Tile for an already-projected id.
    ///
    /// A miss means the caller skipped projection for this pattern's layout.
    pub fn get(&self, wang_id: WangId) -> Result<u32, AutotileError> {
        self.try_get(wang_id)
            .ok_or(AutotileError::LookupMiss(wang_id))
    }

    pub fn try_get(&self, wang_id: WangId) -> Option<u32> {
        self.entries.get(&wang_id).copied()
    }

    pub fn contains(&self, wang_id: WangId) -> bool {
        self.entries.contains_key(&wang_id)
    }

    /// A copy of this pattern with one more (or one replaced) entry
    pub fn with_tile(&self, wang_id: WangId, tile: u32) -> Pattern {
        let mut copy = self.clone();
        copy.entries.insert(wang_id, tile);
        copy
    }

    /// A copy of this pattern with every tile index shifted by `first_tile`.
    ///
    /// Fails if a shifted index no longer fits in a `u32`.
    pub fn offset(&self, first_tile: u32) -> Result<Pattern, AutotileError> {
        self.iter()
            .map(|(id, tile)| {
                tile.checked_add(first_tile).map(|tile| (id, tile)).ok_or_else(|| {
                    AutotileError::Configuration(format!(
                        "tile {tile} offset by {first_tile} overflows"
                    ))
                })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(|entries| Pattern { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending wang id order
    pub fn iter(&self) -> impl Iterator<Item = (WangId, u32)> + '_ {
        self.entries.iter().map(|(&id, &tile)| (id, tile))
    }

    pub fn wang_ids(&self) -> impl Iterator<Item = WangId> + '_ {
        self.entries.keys().copied()
    }

    /// Every tile index this pattern can produce
    pub fn tiles(&self) -> BTreeSet<u32> {
        self.entries.values().copied().collect()
    }

    /// Map back from tile index to wang id. Later ids win on duplicate tiles.
    pub fn reverse(&self) -> BTreeMap<u32, WangId> {
        self.iter().map(|(id, tile)| (tile, id)).collect()
    }

    /// Ensure every id `layout` can project to has a tile.
    pub fn check_total(&self, layout: Layout) -> Result<(), AutotileError> {
        let missing: BTreeSet<WangId> = WangId::all()
            .map(|w| layout.project(w))
            .filter(|w| !self.contains(*w))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = missing.iter().map(|w| w.to_string()).collect();
        Err(AutotileError::Configuration(format!(
            "{layout} pattern has no tile for {}",
            names.join(", ")
        )))
    }
}

/// Hardcoded tileset layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinPattern {
    /// 16-tile 2-edge sheet
    Edge,
    /// 16-tile 2-corner sheet
    BrigittsCross,
    /// 47-tile blob strip
    Blob,
    /// 5-tile source sheet used for blob synthesis
    RpgMaker,
}

impl BuiltinPattern {
    pub fn pattern(self) -> &'static Pattern {
        static EDGE_PATTERN: OnceLock<Pattern> = OnceLock::new();
        static CORNER_PATTERN: OnceLock<Pattern> = OnceLock::new();
        static BLOB_PATTERN: OnceLock<Pattern> = OnceLock::new();
        static RPG_MAKER_PATTERN: OnceLock<Pattern> = OnceLock::new();

        match self {
            BuiltinPattern::Edge => EDGE_PATTERN.get_or_init(|| Pattern::from_raw(&EDGE)),
            BuiltinPattern::BrigittsCross => {
                CORNER_PATTERN.get_or_init(|| Pattern::from_raw(&BRIGITTS_CROSS))
            }
            BuiltinPattern::Blob => BLOB_PATTERN.get_or_init(|| {
                Pattern::from_pairs(
                    BLOB.iter()
                        .enumerate()
                        .map(|(tile, &id)| (WangId(id), tile as u32)),
                )
            }),
            BuiltinPattern::RpgMaker => {
                RPG_MAKER_PATTERN.get_or_init(|| Pattern::from_raw(&RPG_MAKER))
            }
        }
    }
}

/// Per corner: corner-local id -> the source id whose corner looks like that
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CornerIndex {
    corners: [BTreeMap<WangId, WangId>; 4],
}

impl CornerIndex {
    /// Index every id of `pattern` under each corner's local projection.
    ///
    /// When two source ids share a corner-local id the later one (in
    /// ascending id order) wins.
    pub fn build(pattern: &Pattern) -> Self {
        let mut index = CornerIndex::default();
        for corner in Corner::ALL {
            let slot = &mut index.corners[corner.index()];
            for source in pattern.wang_ids() {
                let local = corner.project(source);
                if let Some(previous) = slot.insert(local, source) {
                    debug!(?corner, %local, %previous, %source, "corner index overwrite");
                }
            }
        }
        index
    }

    /// The corner-local table for one corner
    pub fn corner(&self, corner: Corner) -> &BTreeMap<WangId, WangId> {
        &self.corners[corner.index()]
    }

    /// Project `wang_id` into `corner`'s local space and find its source id.
    pub fn lookup(&self, corner: Corner, wang_id: WangId) -> Result<WangId, AutotileError> {
        let local = corner.project(wang_id);
        self.corner(corner)
            .get(&local)
            .copied()
            .ok_or(AutotileError::MissingCornerCoverage { corner, local })
    }

    /// Fail unless every reachable corner-local id has a source.
    pub fn check_complete(&self) -> Result<(), AutotileError> {
        for corner in Corner::ALL {
            for local in corner.reachable_local_ids() {
                if !self.corner(corner).contains_key(&local) {
                    return Err(AutotileError::MissingCornerCoverage { corner, local });
                }
            }
        }
        Ok(())
    }
}

/// See [`CornerIndex::build`].
pub fn index_by_corner(pattern: &Pattern) -> CornerIndex {
    CornerIndex::build(pattern)
}

/// See [`CornerIndex::lookup`].
pub fn lookup_by_corner(
    index: &CornerIndex,
    corner: Corner,
    wang_id: WangId,
) -> Result<WangId, AutotileError> {
    index.lookup(corner, wang_id)
}
