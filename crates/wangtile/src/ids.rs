//! Wang id algebra
//!
//! A [`WangId`] packs the occupancy of a cell's 8 neighbors into one byte,
//! clockwise from north:
//!   7|0|1
//!   6|X|2
//!   5|4|3
//! - Even bits (0,2,4,6) = Edges (N, E, S, W)
//! - Odd bits (1,3,5,7) = Corners (NE, SE, SW, NW)
//!
//! The id only means something when X itself is occupied; derivation returns
//! `None` when it is not. Corner layouts reuse the odd bits with a different
//! sampling origin, see [`derive_corner`].

use crate::AutotileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;
use wangtile_core::Occupancy;

/// Neighbor occupancy bits of a single cell
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WangId(pub u8);

impl WangId {
    pub const EMPTY: Self = WangId(0);
    pub const FULL: Self = WangId(0xFF);

    pub const N: Self = WangId(1 << 0);
    pub const NE: Self = WangId(1 << 1);
    pub const E: Self = WangId(1 << 2);
    pub const SE: Self = WangId(1 << 3);
    pub const S: Self = WangId(1 << 4);
    pub const SW: Self = WangId(1 << 5);
    pub const W: Self = WangId(1 << 6);
    pub const NW: Self = WangId(1 << 7);

    /// N | E | S | W
    pub const CARDINAL: Self = WangId(0b0101_0101);
    /// NE | SE | SW | NW
    pub const DIAGONAL: Self = WangId(0b1010_1010);

    /// Neighbor offsets in bit order, y growing downwards
    pub const OFFSETS: [(i32, i32); 8] = [
        (0, -1),  // 0 = N
        (1, -1),  // 1 = NE
        (1, 0),   // 2 = E
        (1, 1),   // 3 = SE
        (0, 1),   // 4 = S
        (-1, 1),  // 5 = SW
        (-1, 0),  // 6 = W
        (-1, -1), // 7 = NW
    ];

    const NAMES: [&'static str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

    /// Pack neighbor occupancy, clockwise from north.
    pub const fn encode(
        n: bool,
        ne: bool,
        e: bool,
        se: bool,
        s: bool,
        sw: bool,
        w: bool,
        nw: bool,
    ) -> Self {
        WangId(
            (n as u8)
                | (ne as u8) << 1
                | (e as u8) << 2
                | (se as u8) << 3
                | (s as u8) << 4
                | (sw as u8) << 5
                | (w as u8) << 6
                | (nw as u8) << 7,
        )
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set in `self`
    pub const fn contains(self, other: WangId) -> bool {
        self.0 & other.0 == other.0
    }

    /// Is neighbor bit `index` (0..8) set?
    pub const fn is_set(self, index: usize) -> bool {
        self.0 & (1 << index) != 0
    }

    /// Keep only the cardinal bits.
    pub const fn project_edge(self) -> Self {
        WangId(self.0 & Self::CARDINAL.0)
    }

    /// Keep only the diagonal bits.
    pub const fn project_corner(self) -> Self {
        WangId(self.0 & Self::DIAGONAL.0)
    }

    /// Clear every diagonal bit whose two flanking cardinal bits are not both set.
    ///
    /// Only cardinal bits are inspected and only diagonal bits are cleared, so
    /// the four checks are independent of each other.
    pub fn project_blob(self) -> Self {
        let mut result = self;
        for corner in Corner::ALL {
            let (a, b) = corner.flanks();
            if !self.contains(a | b) {
                result = result & !corner.bit();
            }
        }
        result
    }

    /// Iterate all 256 ids in ascending order
    pub fn all() -> impl Iterator<Item = WangId> {
        (0..=u8::MAX).map(WangId)
    }
}

impl BitOr for WangId {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        WangId(self.0 | rhs.0)
    }
}

impl BitAnd for WangId {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        WangId(self.0 & rhs.0)
    }
}

impl Not for WangId {
    type Output = Self;

    fn not(self) -> Self {
        WangId(!self.0)
    }
}

impl From<u8> for WangId {
    fn from(bits: u8) -> Self {
        WangId(bits)
    }
}

impl From<WangId> for u8 {
    fn from(id: WangId) -> Self {
        id.0
    }
}

/// Renders compass names, e.g. `N|NE|E`, or `0` when nothing is set.
impl fmt::Display for WangId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0");
        }
        let mut first = true;
        for (i, name) in Self::NAMES.iter().enumerate() {
            if self.is_set(i) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for WangId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WangId({:#010b} {})", self.0, self)
    }
}

/// One of the four diagonal corners of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    NE,
    SE,
    SW,
    NW,
}

impl Corner {
    /// Clockwise from north-east
    pub const ALL: [Corner; 4] = [Corner::NE, Corner::SE, Corner::SW, Corner::NW];

    /// Position in [`Corner::ALL`]
    pub const fn index(self) -> usize {
        match self {
            Corner::NE => 0,
            Corner::SE => 1,
            Corner::SW => 2,
            Corner::NW => 3,
        }
    }

    /// The diagonal bit of this corner
    pub const fn bit(self) -> WangId {
        match self {
            Corner::NE => WangId::NE,
            Corner::SE => WangId::SE,
            Corner::SW => WangId::SW,
            Corner::NW => WangId::NW,
        }
    }

    /// The diagonally opposite corner
    pub const fn opposite(self) -> Corner {
        match self {
            Corner::NE => Corner::SW,
            Corner::SE => Corner::NW,
            Corner::SW => Corner::NE,
            Corner::NW => Corner::SE,
        }
    }

    /// The two cardinal bits next to this corner
    pub const fn flanks(self) -> (WangId, WangId) {
        match self {
            Corner::NE => (WangId::N, WangId::E),
            Corner::SE => (WangId::E, WangId::S),
            Corner::SW => (WangId::S, WangId::W),
            Corner::NW => (WangId::W, WangId::N),
        }
    }

    /// The three bits that decide this corner's appearance
    pub const fn mask(self) -> WangId {
        let (a, b) = self.flanks();
        WangId(a.0 | b.0 | self.bit().0)
    }

    /// Project a full id into this corner's local space: blob-normalise, then mask.
    pub fn project(self, wang_id: WangId) -> WangId {
        wang_id.project_blob() & self.mask()
    }

    /// The corner-local ids a blob-normalised id can produce:
    /// neither flank, either flank, both flanks, both flanks plus the corner.
    pub const fn reachable_local_ids(self) -> [WangId; 5] {
        let (a, b) = self.flanks();
        [
            WangId::EMPTY,
            a,
            b,
            WangId(a.0 | b.0),
            WangId(a.0 | b.0 | self.bit().0),
        ]
    }
}

impl FromStr for Corner {
    type Err = AutotileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ne" => Ok(Corner::NE),
            "se" => Ok(Corner::SE),
            "sw" => Ok(Corner::SW),
            "nw" => Ok(Corner::NW),
            _ => Err(AutotileError::Configuration(format!("unknown corner '{s}'"))),
        }
    }
}

/// Occupancy of the cell `(dx, dy)` away from `(x, y)`.
///
/// Cells past the `i32` coordinate range do not exist and read as off.
fn is_set_at<P>(probe: &P, x: i32, y: i32, dx: i32, dy: i32) -> bool
where
    P: Occupancy + ?Sized,
{
    match (x.checked_add(dx), y.checked_add(dy)) {
        (Some(x), Some(y)) => probe.is_set(x, y),
        _ => false,
    }
}

/// Gather the full 8-neighborhood of `(x, y)`.
pub fn neighborhood<P>(probe: &P, x: i32, y: i32) -> WangId
where
    P: Occupancy + ?Sized,
{
    let mut bits = 0u8;
    for (i, &(dx, dy)) in WangId::OFFSETS.iter().enumerate() {
        if is_set_at(probe, x, y, dx, dy) {
            bits |= 1 << i;
        }
    }
    WangId(bits)
}

/// 2-edge id: cardinal neighbors only, `None` if the cell is unoccupied.
pub fn derive_edge<P>(probe: &P, x: i32, y: i32) -> Option<WangId>
where
    P: Occupancy + ?Sized,
{
    if !probe.is_set(x, y) {
        return None;
    }
    Some(WangId::encode(
        is_set_at(probe, x, y, 0, -1),
        false,
        is_set_at(probe, x, y, 1, 0),
        false,
        is_set_at(probe, x, y, 0, 1),
        false,
        is_set_at(probe, x, y, -1, 0),
        false,
    ))
}

/// 2-corner id with the cell as its own upper-left corner.
///
/// The cell itself is NW, its east neighbor NE, south-east SE and south SW.
/// `None` only when the result is zero and the cell is unoccupied.
pub fn derive_corner<P>(probe: &P, x: i32, y: i32) -> Option<WangId>
where
    P: Occupancy + ?Sized,
{
    let own = probe.is_set(x, y);
    let id = WangId::encode(
        false,
        is_set_at(probe, x, y, 1, 0),
        false,
        is_set_at(probe, x, y, 1, 1),
        false,
        is_set_at(probe, x, y, 0, 1),
        false,
        own,
    );
    if id == WangId::EMPTY && !own {
        None
    } else {
        Some(id)
    }
}

/// 47-tile blob id: the full neighborhood, blob-normalised.
pub fn derive_blob<P>(probe: &P, x: i32, y: i32) -> Option<WangId>
where
    P: Occupancy + ?Sized,
{
    if !probe.is_set(x, y) {
        return None;
    }
    Some(neighborhood(probe, x, y).project_blob())
}
