//! Terrains and the autotile query engine
//!
//! A [`Terrain`] is a named layout + pattern pair, plus the variant rules
//! applied to its output. The host owns an occupancy probe and a tile sink;
//! [`TerrainQuery`] ties a terrain to a probe and pushes the re-derived tile
//! of every cell an edit can affect into the sink.

use crate::ids::WangId;
use crate::layout::Layout;
use crate::pattern::Pattern;
use crate::variant::{self, VariantRule};
use crate::AutotileError;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{trace, warn};
use uuid::Uuid;
use wangtile_core::{Occupancy, Pointwise, Rect};

/// No layout looks further than the immediate neighbors of a cell
pub const DEFAULT_REFRESH_RADIUS: i32 = 1;

/// A coherent set of tiles drawn with one layout
#[derive(Debug, Clone, Serialize)]
pub struct Terrain {
    id: Uuid,
    name: String,
    layout: Layout,
    pattern: Pattern,
    additional_tiles: BTreeSet<u32>,
    variants: Vec<VariantRule>,
    /// Tiles that count as "this terrain is here"
    #[serde(skip)]
    tiles: BTreeSet<u32>,
}

impl Terrain {
    /// Create a terrain.
    ///
    /// `additional_tiles` are recognised as occupied on top of the pattern's
    /// own output; variant tiles belong here.
    pub fn new(
        name: impl Into<String>,
        layout: Layout,
        pattern: Pattern,
        additional_tiles: impl IntoIterator<Item = u32>,
    ) -> Self {
        let mut terrain = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            layout,
            pattern,
            additional_tiles: additional_tiles.into_iter().collect(),
            variants: Vec::new(),
            tiles: BTreeSet::new(),
        };
        terrain.recognise_tiles();
        terrain
    }

    /// A terrain using the layout's built-in table
    pub fn from_layout(name: impl Into<String>, layout: Layout) -> Self {
        Self::new(name, layout, layout.default_pattern().clone(), [])
    }

    pub fn with_variants(mut self, variants: impl IntoIterator<Item = VariantRule>) -> Self {
        self.variants.extend(variants);
        self
    }

    fn recognise_tiles(&mut self) {
        let layout = self.layout;
        // A corner tile only stands for its own cell when the NW quadrant is filled.
        let own = self
            .pattern
            .iter()
            .filter(|(id, _)| layout != Layout::Corner || id.contains(WangId::NW))
            .map(|(_, tile)| tile);
        self.tiles = own.chain(self.additional_tiles.iter().copied()).collect();
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn variants(&self) -> &[VariantRule] {
        &self.variants
    }

    /// Every tile index this terrain recognises as occupied
    pub fn tiles(&self) -> &BTreeSet<u32> {
        &self.tiles
    }

    /// Replace the tile for one id. The previous table is left untouched.
    pub fn add_pattern(&mut self, wang_id: WangId, tile: u32) {
        self.pattern = self.pattern.with_tile(wang_id, tile);
        self.recognise_tiles();
    }

    pub fn add_variant(&mut self, rule: VariantRule) {
        self.variants.push(rule);
    }

    /// Whether a drawn tile means this terrain occupies its cell
    pub fn contains(&self, tile: u32) -> bool {
        self.tiles.contains(&tile)
    }

    /// Derived wang id at `(x, y)`, `None` if nothing is drawn there
    pub fn wang_id_at<P>(&self, probe: &P, x: i32, y: i32) -> Option<WangId>
    where
        P: Occupancy + ?Sized,
    {
        self.layout.derive(probe, x, y)
    }

    /// Base tile for a derived wang id, before variants
    pub fn tile_for(&self, wang_id: WangId) -> Result<u32, AutotileError> {
        self.pattern.get(self.layout.project(wang_id))
    }

    /// The tile to draw at `(x, y)`, or `None` to clear the cell
    pub fn tile_index_at<P>(&self, probe: &P, x: i32, y: i32) -> Result<Option<u32>, AutotileError>
    where
        P: Occupancy + ?Sized,
    {
        let Some(wang_id) = self.wang_id_at(probe, x, y) else {
            return Ok(None);
        };
        let tile = self.tile_for(wang_id)?;
        Ok(Some(self.vary(tile, x, y)))
    }

    /// Apply the variant rules to a base tile drawn at `(x, y)`
    pub fn vary(&self, tile: u32, x: i32, y: i32) -> u32 {
        let varied = variant::vary(&self.variants, &self.name, tile, x, y);
        if varied != tile && !self.contains(varied) {
            warn!(
                terrain = %self.name,
                tile,
                varied,
                "variant tile is not recognised by its terrain"
            );
        }
        varied
    }

    /// Bind this terrain to an occupancy probe
    pub fn query<'a, P>(&'a self, occupancy: &'a P) -> TerrainQuery<'a, P>
    where
        P: Occupancy + ?Sized,
    {
        TerrainQuery {
            terrain: self,
            occupancy,
            bounds: None,
        }
    }
}

/// One output of a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileAction {
    Put { tile: u32, x: i32, y: i32 },
    Remove { x: i32, y: i32 },
}

/// Receives the tiles a refresh decides on
pub trait TileSink {
    fn put_tile(&mut self, tile: u32, x: i32, y: i32);
    fn remove_tile(&mut self, x: i32, y: i32);
}

impl TileSink for Vec<TileAction> {
    fn put_tile(&mut self, tile: u32, x: i32, y: i32) {
        self.push(TileAction::Put { tile, x, y });
    }

    fn remove_tile(&mut self, x: i32, y: i32) {
        self.push(TileAction::Remove { x, y });
    }
}

/// A terrain bound to the probe that says where it is
pub struct TerrainQuery<'a, P: ?Sized> {
    terrain: &'a Terrain,
    occupancy: &'a P,
    bounds: Option<Rect>,
}

impl<'a, P> TerrainQuery<'a, P>
where
    P: Occupancy + ?Sized,
{
    /// Only ever emit actions for cells inside `bounds`
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn terrain(&self) -> &'a Terrain {
        self.terrain
    }

    pub fn wang_id_at(&self, x: i32, y: i32) -> Option<WangId> {
        self.terrain.wang_id_at(self.occupancy, x, y)
    }

    pub fn tile_index_at(&self, x: i32, y: i32) -> Result<Option<u32>, AutotileError> {
        self.terrain.tile_index_at(self.occupancy, x, y)
    }

    /// Re-derive one cell and report it to `sink`
    pub fn refresh_at<S>(&self, x: i32, y: i32, sink: &mut S) -> Result<(), AutotileError>
    where
        S: TileSink + ?Sized,
    {
        match self.tile_index_at(x, y)? {
            Some(tile) => {
                trace!(terrain = %self.terrain.name, x, y, tile, "put tile");
                sink.put_tile(tile, x, y);
            }
            None => {
                trace!(terrain = %self.terrain.name, x, y, "remove tile");
                sink.remove_tile(x, y);
            }
        }
        Ok(())
    }

    /// Re-derive the `(2 * radius + 1)` square centred on an edited cell,
    /// row by row.
    pub fn refresh_around<S>(
        &self,
        x: i32,
        y: i32,
        radius: i32,
        sink: &mut S,
    ) -> Result<(), AutotileError>
    where
        S: TileSink + ?Sized,
    {
        if radius < 0 {
            return Err(AutotileError::Configuration(format!(
                "refresh radius must not be negative, got {radius}"
            )));
        }
        let region = Rect::around(x, y, radius).ok_or_else(|| {
            AutotileError::Configuration(format!(
                "refresh of radius {radius} around ({x}, {y}) leaves the i32 coordinate range"
            ))
        })?;
        self.refresh_region(region, sink)
    }

    /// Re-derive every cell of `region` in row-major order
    pub fn refresh_region<S>(&self, region: Rect, sink: &mut S) -> Result<(), AutotileError>
    where
        S: TileSink + ?Sized,
    {
        let region = match self.bounds {
            Some(bounds) => bounds.intersection(&region),
            None => region,
        };
        if region.is_empty() {
            return Ok(());
        }
        for (x, y, _) in Pointwise::new(region)?.iter(None) {
            self.refresh_at(x, y, sink)?;
        }
        Ok(())
    }
}

/// Occupancy read back from drawn tiles: a cell is set when the terrain
/// recognises the tile there.
pub struct TileOccupancy<'a, F> {
    terrain: &'a Terrain,
    lookup: F,
}

impl<'a, F> TileOccupancy<'a, F>
where
    F: Fn(i32, i32) -> Option<u32>,
{
    pub fn new(terrain: &'a Terrain, lookup: F) -> Self {
        Self { terrain, lookup }
    }
}

impl<F> Occupancy for TileOccupancy<'_, F>
where
    F: Fn(i32, i32) -> Option<u32>,
{
    fn is_set(&self, x: i32, y: i32) -> bool {
        (self.lookup)(x, y).is_some_and(|tile| self.terrain.contains(tile))
    }
}

/// Named terrains of one project
#[derive(Debug, Clone, Default)]
pub struct Terrains {
    terrains: Vec<Terrain>,
}

impl Terrains {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a terrain. Names are unique.
    pub fn add(&mut self, terrain: Terrain) -> Result<Uuid, AutotileError> {
        if self.get(terrain.name()).is_some() {
            return Err(AutotileError::Configuration(format!(
                "duplicate terrain '{}'",
                terrain.name()
            )));
        }
        let id = terrain.id();
        self.terrains.push(terrain);
        Ok(id)
    }

    /// Get terrain by name
    pub fn get(&self, name: &str) -> Option<&Terrain> {
        self.terrains.iter().find(|t| t.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Terrain> {
        self.terrains.iter_mut().find(|t| t.name == name)
    }

    /// Get terrain by ID
    pub fn get_by_id(&self, id: Uuid) -> Option<&Terrain> {
        self.terrains.iter().find(|t| t.id == id)
    }

    /// The first terrain (in insertion order) that recognises `tile`
    pub fn terrain_for_tile(&self, tile: u32) -> Option<&Terrain> {
        self.terrains.iter().find(|t| t.contains(tile))
    }

    /// Remove terrain by name
    pub fn remove(&mut self, name: &str) -> Option<Terrain> {
        let pos = self.terrains.iter().position(|t| t.name == name)?;
        Some(self.terrains.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Terrain> {
        self.terrains.iter()
    }

    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }
}
