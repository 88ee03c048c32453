//! Per-position tile variants
//!
//! Variant rules remap a terrain's resolved tile index based on where it is
//! drawn. Rules are tried in order; the first one that both matches the
//! position and has an entry for the tile wins.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Which coordinate a parity rule looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityAxis {
    X,
    Y,
    /// `x + y`, i.e. a checkerboard
    XY,
}

impl ParityAxis {
    fn value(self, x: i32, y: i32) -> i32 {
        match self {
            ParityAxis::X => x,
            ParityAxis::Y => y,
            ParityAxis::XY => x.wrapping_add(y),
        }
    }
}

/// A remap from tile index to replacement tile index, gated on position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantRule {
    /// Remap wherever the tile is drawn
    Always { mapping: BTreeMap<u32, u32> },
    /// Remap on even (or odd) rows, columns or checkerboard squares
    Parity {
        axis: ParityAxis,
        #[serde(default)]
        odd: bool,
        mapping: BTreeMap<u32, u32>,
    },
    /// Remap `percent` of the time, chosen by position rather than by a
    /// shared random stream
    Chance {
        percent: u8,
        mapping: BTreeMap<u32, u32>,
    },
}

impl VariantRule {
    pub fn mapping(&self) -> &BTreeMap<u32, u32> {
        match self {
            VariantRule::Always { mapping }
            | VariantRule::Parity { mapping, .. }
            | VariantRule::Chance { mapping, .. } => mapping,
        }
    }

    /// Whether this rule fires for `tile` drawn at `(x, y)`
    pub fn matches(&self, terrain: &str, tile: u32, x: i32, y: i32) -> bool {
        match *self {
            VariantRule::Always { .. } => true,
            VariantRule::Parity { axis, odd, .. } => {
                axis.value(x, y).rem_euclid(2) == i32::from(odd)
            }
            VariantRule::Chance { percent, .. } => {
                let mut rng = SmallRng::seed_from_u64(variant_seed(terrain, tile, x, y));
                rng.gen_range(0..100u8) < percent
            }
        }
    }

    /// The replacement for `tile`, if this rule applies to it here
    pub fn apply(&self, terrain: &str, tile: u32, x: i32, y: i32) -> Option<u32> {
        let replacement = self.mapping().get(&tile).copied()?;
        self.matches(terrain, tile, x, y).then_some(replacement)
    }
}

/// FNV-1a (64 bit) over the terrain name, a `0xFF` separator, then the tile
/// index and coordinates as little-endian bytes.
///
/// The separator cannot appear in UTF-8, so distinct names never collide by
/// concatenation.
pub fn variant_seed(terrain: &str, tile: u32, x: i32, y: i32) -> u64 {
    let bytes = terrain
        .as_bytes()
        .iter()
        .copied()
        .chain([0xFF])
        .chain(tile.to_le_bytes())
        .chain(x.to_le_bytes())
        .chain(y.to_le_bytes());
    bytes.fold(FNV_OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Run `rules` in order over `tile` and return the first replacement, or the
/// tile itself.
pub fn vary(rules: &[VariantRule], terrain: &str, tile: u32, x: i32, y: i32) -> u32 {
    rules
        .iter()
        .find_map(|rule| rule.apply(terrain, tile, x, y))
        .unwrap_or(tile)
}
