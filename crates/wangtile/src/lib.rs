//! Wang id autotiling
//!
//! This crate turns a neighborhood occupancy probe into a tile index for one
//! of three standard autotile layouts, and synthesises a full 47-tile blob
//! atlas from a five-tile source sheet.
//!
//! # Features
//! - 2-edge, 2-corner (Brigitt's Cross) and 47-tile blob layouts
//! - Immutable built-in pattern tables plus explicit per-terrain patterns
//! - Bounded-radius refresh after an edit, with per-position variant rules
//! - Blob atlas synthesis from crossroads and corner source tiles
//!
//! # Example
//!
//! ```rust,ignore
//! use wangtile::{Layout, Terrain, TileAction};
//! use wangtile_core::{Grid, Overflow, Rect};
//!
//! let terrain = Terrain::from_layout("walls", Layout::Blob);
//! let mut grid = Grid::new(Rect::new(0, 0, 10, 10), Overflow::AlwaysOff)?;
//! grid.set(5, 5);
//!
//! // Re-derive the 3x3 square around the edited cell
//! let mut actions: Vec<TileAction> = Vec::new();
//! terrain.query(&grid).refresh_around(5, 5, 1, &mut actions)?;
//! ```

pub mod config;
pub mod ids;
pub mod layout;
pub mod pattern;
pub mod subtiles;
pub mod terrain;
pub mod tiled;
pub mod variant;

// Re-export main types at crate root
pub use config::{load_config, parse_config, save_config, AutotileConfig, PatternDef, TerrainDef};
pub use ids::{derive_blob, derive_corner, derive_edge, neighborhood, Corner, WangId};
pub use layout::Layout;
pub use pattern::{index_by_corner, lookup_by_corner, BuiltinPattern, CornerIndex, Pattern};
pub use subtiles::{
    in_dst_coords, load_subtiles, synthesize, synthesize_blob, Blit, CornerFrames, Frame,
    PixelRect, SourceSheet, SubtileBases, SubtileGeometry,
};
pub use terrain::{
    Terrain, TerrainQuery, Terrains, TileAction, TileOccupancy, TileSink, DEFAULT_REFRESH_RADIUS,
};
pub use tiled::{layout_for_wangset, wang_id_from_tiled_colors, wang_id_from_tiled_terrain};
pub use variant::{variant_seed, ParityAxis, VariantRule};

// Re-export wangtile_core
pub use wangtile_core;

use thiserror::Error;
use wangtile_core::CoreError;

/// Errors raised by autotile configuration, lookup and synthesis
#[derive(Debug, Error)]
pub enum AutotileError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid subtile geometry: {0}")]
    InvalidGeometry(String),
    #[error("No source tile covers the {corner:?} corner with local id {local}")]
    MissingCornerCoverage { corner: Corner, local: WangId },
    #[error("No tile for wang id {0}; was it projected for this layout?")]
    LookupMiss(WangId),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}
