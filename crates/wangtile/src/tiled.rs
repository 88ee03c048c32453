//! Import of Tiled terrain and wang set data
//!
//! Tiled stores a wang set's tiles as eight color slots, clockwise from the
//! top, which lines up with [`WangId`] bit order. Legacy terrains store four
//! corner slots as `[top-left, top-right, bottom-left, bottom-right]`.
//! Both are turned into [`TerrainDef`]s with explicit patterns.

use crate::config::{PatternDef, TerrainDef};
use crate::ids::{Corner, WangId};
use crate::layout::Layout;
use crate::pattern::Pattern;
use crate::AutotileError;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

/// The color Tiled assigns second; the first defaults to red and usually
/// marks "empty" in two-color sets.
pub const DEFAULT_WANG_COLOR: u32 = 2;

/// The subset of a Tiled JSON tileset this crate reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TiledTileset {
    pub name: String,
    #[serde(default)]
    pub terrains: Vec<TiledNamed>,
    #[serde(default)]
    pub tiles: Vec<TiledTile>,
    #[serde(default)]
    pub wangsets: Vec<TiledWangset>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TiledNamed {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TiledTile {
    pub id: u32,
    /// Terrain index per corner, `-1` for none
    #[serde(default)]
    pub terrain: Option<[i32; 4]>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TiledWangset {
    pub name: String,
    #[serde(default)]
    pub cornercolors: Vec<TiledNamed>,
    #[serde(default)]
    pub edgecolors: Vec<TiledNamed>,
    #[serde(default)]
    pub wangtiles: Vec<TiledWangTile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TiledWangTile {
    pub tileid: u32,
    pub wangid: Vec<u32>,
}

/// Set bit `i` wherever slot `i` of a wang id color array is `color`
pub fn wang_id_from_tiled_colors(wangid: &[u32], color: u32) -> WangId {
    let bits = wangid
        .iter()
        .take(8)
        .enumerate()
        .filter(|&(_, &slot)| slot == color)
        .fold(0u8, |bits, (i, _)| bits | 1 << i);
    WangId(bits)
}

/// Corner id for one terrain of a legacy `[nw, ne, sw, se]` terrain quad
pub fn wang_id_from_tiled_terrain(quad: [i32; 4], terrain: i32) -> WangId {
    let [nw, ne, sw, se] = quad;
    [(ne, Corner::NE), (se, Corner::SE), (sw, Corner::SW), (nw, Corner::NW)]
        .into_iter()
        .filter(|&(slot, _)| slot == terrain)
        .fold(WangId::EMPTY, |id, (_, corner)| id | corner.bit())
}

/// Which layout a wang set's color lists imply, if any
pub fn layout_for_wangset(corner_colors: usize, edge_colors: usize) -> Option<Layout> {
    match (corner_colors > 0, edge_colors > 0) {
        (true, true) => Some(Layout::Blob),
        (true, false) => Some(Layout::Corner),
        (false, true) => Some(Layout::Edge),
        (false, false) => None,
    }
}

/// Parse a Tiled JSON tileset
pub fn parse_tileset(json: &str) -> Result<TiledTileset, AutotileError> {
    serde_json::from_str(json).map_err(|e| AutotileError::Parse(e.to_string()))
}

/// Build terrain definitions from a tileset placed at `firstgid`.
///
/// Terrains are named `{tileset}{terrain}` and wang sets `{tileset}{wangset}`.
/// Patterns only hold what the tileset defines; sets that do not cover their
/// whole layout fail later, in [`TerrainDef::build`].
pub fn terrain_defs(
    tileset: &TiledTileset,
    firstgid: u32,
    color: u32,
) -> Result<Vec<TerrainDef>, AutotileError> {
    let mut defs = legacy_terrain_defs(tileset, firstgid)?;
    for wangset in &tileset.wangsets {
        let Some(layout) = layout_for_wangset(wangset.cornercolors.len(), wangset.edgecolors.len())
        else {
            warn!(tileset = %tileset.name, wangset = %wangset.name, "wang set has no colors");
            continue;
        };
        let pairs = wangset
            .wangtiles
            .iter()
            .map(|tile| {
                global_tile(tile.tileid, firstgid)
                    .map(|gid| (wang_id_from_tiled_colors(&tile.wangid, color), gid))
            })
            .collect::<Result<Vec<_>, _>>()?;
        defs.push(explicit_def(
            format!("{}{}", tileset.name, wangset.name),
            layout,
            Pattern::from_pairs(pairs),
        ));
    }
    Ok(defs)
}

fn legacy_terrain_defs(
    tileset: &TiledTileset,
    firstgid: u32,
) -> Result<Vec<TerrainDef>, AutotileError> {
    let mut patterns: Vec<BTreeMap<WangId, u32>> = vec![BTreeMap::new(); tileset.terrains.len()];
    for tile in &tileset.tiles {
        let Some(quad) = tile.terrain else {
            continue;
        };
        let gid = global_tile(tile.id, firstgid)?;
        let mut seen = quad.to_vec();
        seen.sort_unstable();
        seen.dedup();
        for terrain in seen {
            let Some(pattern) = usize::try_from(terrain)
                .ok()
                .and_then(|index| patterns.get_mut(index))
            else {
                continue;
            };
            pattern.insert(wang_id_from_tiled_terrain(quad, terrain), gid);
        }
    }
    Ok(tileset
        .terrains
        .iter()
        .zip(patterns)
        .map(|(terrain, pattern)| {
            explicit_def(
                format!("{}{}", tileset.name, terrain.name),
                Layout::Corner,
                Pattern::from_pairs(pattern),
            )
        })
        .collect())
}

fn global_tile(local: u32, firstgid: u32) -> Result<u32, AutotileError> {
    local.checked_add(firstgid).ok_or_else(|| {
        AutotileError::Configuration(format!("tile {local} at firstgid {firstgid} overflows"))
    })
}

fn explicit_def(name: String, layout: Layout, pattern: Pattern) -> TerrainDef {
    let mut def = TerrainDef::new(name, layout);
    def.pattern = Some(PatternDef::Explicit(pattern));
    def
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_to_wang_id() {
        assert_eq!(
            wang_id_from_tiled_colors(&[2, 0, 2, 0, 1, 0, 1, 0], 2),
            WangId::N | WangId::E
        );
        assert_eq!(wang_id_from_tiled_colors(&[2; 8], 2), WangId::FULL);
        assert_eq!(wang_id_from_tiled_colors(&[], 2), WangId::EMPTY);
    }

    #[test]
    fn test_terrain_quad_to_wang_id() {
        assert_eq!(wang_id_from_tiled_terrain([0, 0, 0, 0], 0), WangId::DIAGONAL);
        assert_eq!(wang_id_from_tiled_terrain([0, 1, -1, 1], 1), WangId::NE | WangId::SE);
        assert_eq!(wang_id_from_tiled_terrain([0, 1, -1, 1], 0), WangId::NW);
        assert_eq!(wang_id_from_tiled_terrain([-1, -1, 2, -1], 2), WangId::SW);
    }

    #[test]
    fn test_layout_detection() {
        assert_eq!(layout_for_wangset(1, 0), Some(Layout::Corner));
        assert_eq!(layout_for_wangset(0, 2), Some(Layout::Edge));
        assert_eq!(layout_for_wangset(1, 1), Some(Layout::Blob));
        assert_eq!(layout_for_wangset(0, 0), None);
    }

    #[test]
    fn test_tileset_import() {
        let json = r#"{
            "name": "ground",
            "terrains": [{"name": "grass"}, {"name": "water"}],
            "tiles": [
                {"id": 0, "terrain": [0, 0, 0, 0]},
                {"id": 1, "terrain": [1, 0, 0, 0]},
                {"id": 2}
            ],
            "wangsets": [
                {
                    "name": "road",
                    "edgecolors": [{"name": "off"}, {"name": "on"}],
                    "wangtiles": [
                        {"tileid": 5, "wangid": [2, 0, 1, 0, 1, 0, 1, 0]},
                        {"tileid": 6, "wangid": [2, 0, 2, 0, 1, 0, 1, 0]}
                    ]
                },
                {"name": "empty"}
            ]
        }"#;
        let tileset = parse_tileset(json).unwrap();
        let defs = terrain_defs(&tileset, 10, DEFAULT_WANG_COLOR).unwrap();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["groundgrass", "groundwater", "groundroad"]);

        let grass = defs[0].resolve_pattern().unwrap();
        assert_eq!(grass.get(WangId::DIAGONAL).unwrap(), 10);
        assert_eq!(grass.get(WangId::NE | WangId::SE | WangId::SW).unwrap(), 11);
        let water = defs[1].resolve_pattern().unwrap();
        assert_eq!(water.get(WangId::NW).unwrap(), 11);
        assert_eq!(water.len(), 1);

        assert_eq!(defs[2].layout, Layout::Edge);
        let road = defs[2].resolve_pattern().unwrap();
        assert_eq!(road.get(WangId::N).unwrap(), 15);
        assert_eq!(road.get(WangId::N | WangId::E).unwrap(), 16);
        // Two tiles cannot cover a 16-tile edge layout.
        assert!(defs[2].build().is_err());
    }

    #[test]
    fn test_firstgid_overflow() {
        let json = r#"{
            "name": "big",
            "terrains": [{"name": "grass"}],
            "tiles": [{"id": 3, "terrain": [0, 0, 0, 0]}]
        }"#;
        let tileset = parse_tileset(json).unwrap();
        assert!(terrain_defs(&tileset, u32::MAX - 3, DEFAULT_WANG_COLOR).is_ok());
        assert!(matches!(
            terrain_defs(&tileset, u32::MAX - 2, DEFAULT_WANG_COLOR),
            Err(AutotileError::Configuration(_))
        ));

        let json = r#"{
            "name": "big",
            "wangsets": [{
                "name": "road",
                "edgecolors": [{"name": "off"}, {"name": "on"}],
                "wangtiles": [{"tileid": 1, "wangid": [2, 0, 1, 0, 1, 0, 1, 0]}]
            }]
        }"#;
        let tileset = parse_tileset(json).unwrap();
        assert!(matches!(
            terrain_defs(&tileset, u32::MAX, DEFAULT_WANG_COLOR),
            Err(AutotileError::Configuration(_))
        ));
    }
}
