//! Blob atlas synthesis from corner subtiles
//!
//! Every blob tile is four corner subtiles, and each corner only has five
//! possible appearances. A five-tile source sheet (a crossroads plus four
//! convex islands) therefore contains every subtile needed to assemble all
//! 47 blob tiles. This module plans that assembly as a list of [`Blit`]s; the
//! host does the actual pixel copies.

use crate::ids::{Corner, WangId};
use crate::pattern::{BuiltinPattern, Pattern};
use crate::AutotileError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use wangtile_core::{Pointwise, Rect};

/// Pixel size of a tile and of its north-west subtile.
///
/// The other three subtiles are the remainder, so the four always partition
/// the tile exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtileGeometry {
    pub tile_width: i32,
    pub tile_height: i32,
    pub nw_width: i32,
    pub nw_height: i32,
}

impl SubtileGeometry {
    /// Split a tile into (rounded down) halves
    pub fn new(tile_width: i32, tile_height: i32) -> Result<Self, AutotileError> {
        Self::with_nw_subtile(tile_width, tile_height, tile_width / 2, tile_height / 2)
    }

    pub fn with_nw_subtile(
        tile_width: i32,
        tile_height: i32,
        nw_width: i32,
        nw_height: i32,
    ) -> Result<Self, AutotileError> {
        let geometry = Self {
            tile_width,
            tile_height,
            nw_width,
            nw_height,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), AutotileError> {
        if self.tile_width <= 0 || self.tile_height <= 0 {
            return Err(AutotileError::InvalidGeometry(format!(
                "tile size must be positive, got {}x{}",
                self.tile_width, self.tile_height
            )));
        }
        if !(0 < self.nw_width && self.nw_width < self.tile_width)
            || !(0 < self.nw_height && self.nw_height < self.tile_height)
        {
            return Err(AutotileError::InvalidGeometry(format!(
                "north-west subtile {}x{} must be strictly inside the {}x{} tile",
                self.nw_width, self.nw_height, self.tile_width, self.tile_height
            )));
        }
        Ok(())
    }

    /// Where `corner`'s subtile sits within one tile
    pub fn subtile(&self, corner: Corner) -> Rect {
        let east_width = self.tile_width - self.nw_width;
        let south_height = self.tile_height - self.nw_height;
        match corner {
            Corner::NE => Rect::new(self.nw_width, 0, east_width, self.nw_height),
            Corner::SE => Rect::new(self.nw_width, self.nw_height, east_width, south_height),
            Corner::SW => Rect::new(0, self.nw_height, self.nw_width, south_height),
            Corner::NW => Rect::new(0, 0, self.nw_width, self.nw_height),
        }
    }

    /// Size of a vertical strip holding `tiles` tiles
    pub fn strip_size(&self, tiles: usize) -> (i32, i32) {
        (self.tile_width, self.tile_height * tiles as i32)
    }
}

/// A tile-sized region of some host texture
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<H> {
    pub texture: H,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Source pixels per output pixel
    pub resolution: f32,
    /// Each quadrant is sized like the opposite corner's subtile, as on a
    /// nought tile standing in for the crossroads.
    pub inverted: bool,
}

impl<H> Frame<H> {
    pub fn new(texture: H, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            texture,
            x,
            y,
            width,
            height,
            resolution: 1.0,
            inverted: false,
        }
    }

    pub fn with_resolution(mut self, resolution: f32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    /// The part of this frame (in output pixels) that draws `corner`
    pub fn source_subtile(&self, geometry: &SubtileGeometry, corner: Corner) -> Rect {
        let subtile = geometry.subtile(corner);
        if !self.inverted {
            return subtile;
        }
        let size = geometry.subtile(corner.opposite());
        Rect::new(subtile.x, subtile.y, size.width, size.height)
    }

    /// A subtile rectangle (in output pixels) as a region of the source texture
    pub fn in_src_coords(&self, subtile: Rect) -> PixelRect {
        PixelRect::from(subtile)
            .scale(self.resolution)
            .offset(self.x as f32, self.y as f32)
    }
}

/// A rectangle in (possibly fractional) source pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

impl From<Rect> for PixelRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x as f32,
            y: rect.y as f32,
            width: rect.width as f32,
            height: rect.height as f32,
        }
    }
}

/// A subtile rectangle placed in the output tile whose top-left is `(x, y)`
pub fn in_dst_coords(subtile: Rect, x: i32, y: i32) -> Rect {
    Rect::new(subtile.x + x, subtile.y + y, subtile.width, subtile.height)
}

/// Source wang id -> the frame that draws it
pub type SubtileBases<H> = BTreeMap<WangId, Frame<H>>;

/// Per corner: corner-local id -> the source frame showing that appearance
#[derive(Debug, Clone)]
pub struct CornerFrames<'a, H> {
    corners: [BTreeMap<WangId, &'a Frame<H>>; 4],
}

impl<'a, H> CornerFrames<'a, H> {
    /// Index `bases` under each corner's local projection.
    ///
    /// Later source ids win when two share a corner appearance.
    pub fn load(bases: &'a SubtileBases<H>) -> Self {
        let mut corners: [BTreeMap<WangId, &'a Frame<H>>; 4] = Default::default();
        for corner in Corner::ALL {
            for (&source, frame) in bases {
                corners[corner.index()].insert(corner.project(source), frame);
            }
        }
        Self { corners }
    }

    /// The frame showing `wang_id`'s appearance at `corner`
    pub fn frame(&self, corner: Corner, wang_id: WangId) -> Result<&'a Frame<H>, AutotileError> {
        let local = corner.project(wang_id);
        self.corners[corner.index()]
            .get(&local)
            .copied()
            .ok_or(AutotileError::MissingCornerCoverage { corner, local })
    }

    /// Fail unless every corner appearance a blob tile can need is present.
    pub fn check_complete(&self) -> Result<(), AutotileError> {
        for corner in Corner::ALL {
            for local in corner.reachable_local_ids() {
                self.frame(corner, local)?;
            }
        }
        Ok(())
    }
}

/// See [`CornerFrames::load`].
pub fn load_subtiles<H>(bases: &SubtileBases<H>) -> CornerFrames<'_, H> {
    CornerFrames::load(bases)
}

/// A sheet of equally sized source tiles, read left to right, top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSheet<H> {
    pub texture: H,
    /// The sheet's region of the texture
    pub bounds: Rect,
    /// Top, right, bottom, left
    pub margin: [i32; 4],
    /// Gap between tiles, horizontal then vertical
    pub spacing: (i32, i32),
    pub resolution: f32,
}

impl<H: Clone> SourceSheet<H> {
    pub fn new(texture: H, bounds: Rect) -> Self {
        Self {
            texture,
            bounds,
            margin: [0; 4],
            spacing: (0, 0),
            resolution: 1.0,
        }
    }

    pub fn with_margin(mut self, margin: i32) -> Self {
        self.margin = [margin; 4];
        self
    }

    pub fn with_spacing(mut self, x: i32, y: i32) -> Self {
        self.spacing = (x, y);
        self
    }

    pub fn with_resolution(mut self, resolution: f32) -> Self {
        self.resolution = resolution;
        self
    }

    fn tiles(&self, geometry: &SubtileGeometry) -> Result<Pointwise, AutotileError> {
        let [top, right, bottom, left] = self.margin;
        let inner = Rect::new(
            self.bounds.x + left,
            self.bounds.y + top,
            self.bounds.width - left - right,
            self.bounds.height - top - bottom,
        );
        Ok(Pointwise::new(inner)?.with_stride(
            geometry.tile_width + self.spacing.0,
            geometry.tile_height + self.spacing.1,
        )?)
    }

    /// The frame of the `tile`th tile on the sheet
    pub fn frame(&self, tile: u32, geometry: &SubtileGeometry) -> Result<Frame<H>, AutotileError> {
        let tiles = self.tiles(geometry)?;
        let capacity = tiles.col_count() * tiles.row_count();
        let (x, y) = tiles
            .nth(tile as usize)
            .filter(|_| (tile as usize) < capacity)
            .ok_or_else(|| {
                AutotileError::Configuration(format!(
                    "tile {tile} is outside of a {capacity} tile source sheet"
                ))
            })?;
        Ok(
            Frame::new(self.texture.clone(), x, y, geometry.tile_width, geometry.tile_height)
                .with_resolution(self.resolution),
        )
    }

    /// Resolve each tile of `pattern` to its frame on this sheet
    pub fn bases(
        &self,
        pattern: &Pattern,
        geometry: &SubtileGeometry,
    ) -> Result<SubtileBases<H>, AutotileError> {
        pattern
            .iter()
            .map(|(wang_id, tile)| self.frame(tile, geometry).map(|frame| (wang_id, frame)))
            .collect()
    }
}

/// One subtile copy: `src` of `frame`'s texture into `dst` of the atlas
#[derive(Debug, Clone, PartialEq)]
pub struct Blit<H> {
    pub frame: Frame<H>,
    pub src: PixelRect,
    pub dst: Rect,
}

/// Plan the atlas for `output`, one tile per row of a vertical strip whose
/// top-left is `offset`.
///
/// Nothing is planned unless `bases` covers every corner appearance.
pub fn synthesize<H: Clone>(
    bases: &SubtileBases<H>,
    geometry: &SubtileGeometry,
    output: &Pattern,
    offset: (i32, i32),
) -> Result<Vec<Blit<H>>, AutotileError> {
    geometry.validate()?;
    let frames = CornerFrames::load(bases);
    frames.check_complete()?;

    let mut blits = Vec::with_capacity(output.len() * Corner::ALL.len());
    for (wang_id, tile) in output.iter() {
        let tile_x = offset.0;
        let tile_y = offset.1 + tile as i32 * geometry.tile_height;
        for corner in Corner::ALL {
            let frame = frames.frame(corner, wang_id)?;
            blits.push(Blit {
                frame: frame.clone(),
                src: frame.in_src_coords(frame.source_subtile(geometry, corner)),
                dst: in_dst_coords(geometry.subtile(corner), tile_x, tile_y),
            });
        }
    }
    debug!(
        sources = bases.len(),
        tiles = output.len(),
        blits = blits.len(),
        "planned subtile atlas"
    );
    Ok(blits)
}

/// Plan the full 47-tile blob atlas
pub fn synthesize_blob<H: Clone>(
    bases: &SubtileBases<H>,
    geometry: &SubtileGeometry,
    offset: (i32, i32),
) -> Result<Vec<Blit<H>>, AutotileError> {
    synthesize(bases, geometry, BuiltinPattern::Blob.pattern(), offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpg_bases() -> SubtileBases<&'static str> {
        let sheet = SourceSheet::new("rpg", Rect::new(0, 0, 96, 16));
        let geometry = SubtileGeometry::new(16, 16).unwrap();
        sheet
            .bases(BuiltinPattern::RpgMaker.pattern(), &geometry)
            .unwrap()
    }

    #[test]
    fn test_geometry_partitions_tile() {
        let geometry = SubtileGeometry::with_nw_subtile(5, 3, 2, 1).unwrap();
        let rects: Vec<Rect> = Corner::ALL.iter().map(|&c| geometry.subtile(c)).collect();
        let area: usize = rects.iter().map(Rect::area).sum();
        assert_eq!(area, 15);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(rects.iter().filter(|r| r.contains(x, y)).count(), 1);
            }
        }
        assert_eq!(geometry.subtile(Corner::NW), Rect::new(0, 0, 2, 1));
        assert_eq!(geometry.subtile(Corner::SE), Rect::new(2, 1, 3, 2));
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(matches!(
            SubtileGeometry::new(0, 16),
            Err(AutotileError::InvalidGeometry(_))
        ));
        assert!(SubtileGeometry::new(1, 16).is_err());
        assert!(SubtileGeometry::with_nw_subtile(16, 16, 16, 8).is_err());
        assert!(SubtileGeometry::with_nw_subtile(16, 16, 8, 0).is_err());
    }

    #[test]
    fn test_src_coords_scale_then_offset() {
        let frame = Frame::new((), 100, 50, 16, 16).with_resolution(2.0);
        let src = frame.in_src_coords(Rect::new(8, 0, 8, 8));
        assert_eq!(
            src,
            PixelRect {
                x: 116.0,
                y: 50.0,
                width: 16.0,
                height: 16.0
            }
        );
        assert_eq!(in_dst_coords(Rect::new(8, 0, 8, 8), 0, 32), Rect::new(8, 32, 8, 8));
    }

    #[test]
    fn test_sheet_frames() {
        let geometry = SubtileGeometry::new(16, 16).unwrap();
        let sheet = SourceSheet::new("t", Rect::new(0, 0, 72, 38))
            .with_margin(2)
            .with_spacing(1, 1);
        let frame = sheet.frame(3, &geometry).unwrap();
        assert_eq!((frame.x, frame.y), (2 + 3 * 17, 2));
        let frame = sheet.frame(4, &geometry).unwrap();
        assert_eq!((frame.x, frame.y), (2, 2 + 17));
        assert!(matches!(
            sheet.frame(8, &geometry),
            Err(AutotileError::Configuration(_))
        ));
    }

    #[test]
    fn test_synthesize_full_blob() {
        let bases = rpg_bases();
        let geometry = SubtileGeometry::new(16, 16).unwrap();
        let blits = synthesize_blob(&bases, &geometry, (0, 0)).unwrap();
        assert_eq!(blits.len(), 188);
        assert_eq!(geometry.strip_size(47), (16, 752));

        // Tile 0, the isolated blob: NE comes from the island open to the NE.
        let ne = &blits[0];
        assert_eq!(ne.frame.x, 3 * 16);
        assert_eq!(ne.dst, Rect::new(8, 0, 8, 8));
        assert_eq!(ne.src.x, 3.0 * 16.0 + 8.0);

        // Tile 46, fully connected: each corner from the island whose
        // interior faces it.
        let xs: Vec<i32> = blits[184..].iter().map(|b| b.frame.x).collect();
        assert_eq!(xs, vec![4 * 16, 2 * 16, 3 * 16, 5 * 16]);
        for blit in &blits[184..] {
            assert!(blit.dst.y == 46 * 16 || blit.dst.y == 46 * 16 + 8);
        }

        // The crossroads draws all four corners of the plus-shaped tile.
        let cross = BuiltinPattern::Blob.pattern().get(WangId::CARDINAL).unwrap() as i32;
        let from_cross: Vec<&Blit<&str>> = blits
            .iter()
            .filter(|b| b.dst.y / 16 == cross)
            .collect();
        assert_eq!(from_cross.len(), 4);
        assert!(from_cross.iter().all(|b| b.frame.x == 16));
        // Corner order within a tile.
        let order: Vec<Rect> = blits[..4].iter().map(|b| b.dst).collect();
        assert_eq!(
            order,
            vec![
                Rect::new(8, 0, 8, 8),
                Rect::new(8, 8, 8, 8),
                Rect::new(0, 8, 8, 8),
                Rect::new(0, 0, 8, 8),
            ]
        );
    }

    #[test]
    fn test_synthesize_with_offset() {
        let bases = rpg_bases();
        let geometry = SubtileGeometry::new(16, 16).unwrap();
        let blits = synthesize_blob(&bases, &geometry, (32, 4)).unwrap();
        assert_eq!(blits[3].dst, Rect::new(32, 4, 8, 8));
        assert_eq!(blits[187].dst, Rect::new(32, 4 + 46 * 16, 8, 8));
    }

    #[test]
    fn test_incomplete_sources_abort() {
        let mut bases = rpg_bases();
        bases.remove(&WangId(0b1100_0001));
        let geometry = SubtileGeometry::new(16, 16).unwrap();
        assert!(matches!(
            synthesize_blob(&bases, &geometry, (0, 0)),
            Err(AutotileError::MissingCornerCoverage { .. })
        ));
    }

    #[test]
    fn test_corner_frames_lookup() {
        let bases = rpg_bases();
        let frames = load_subtiles(&bases);
        assert!(frames.check_complete().is_ok());
        let full = frames.frame(Corner::SW, WangId::FULL).unwrap();
        assert_eq!(full.x, 3 * 16);
        let inner = frames.frame(Corner::SW, WangId::CARDINAL).unwrap();
        assert_eq!(inner.x, 16);
        // NW isolated: the top-left island, tile 2.
        let isolated = frames.frame(Corner::NW, WangId::EMPTY).unwrap();
        assert_eq!(isolated.x, 2 * 16);
    }

    #[test]
    fn test_inverted_crossroads() {
        let geometry = SubtileGeometry::with_nw_subtile(16, 16, 6, 4).unwrap();
        let frame = Frame::new("nought", 0, 0, 16, 16).inverted();
        assert_eq!(frame.source_subtile(&geometry, Corner::NW), Rect::new(0, 0, 10, 12));
        assert_eq!(frame.source_subtile(&geometry, Corner::NE), Rect::new(6, 0, 6, 12));
        assert_eq!(frame.source_subtile(&geometry, Corner::SE), Rect::new(6, 4, 6, 4));
        assert_eq!(frame.source_subtile(&geometry, Corner::SW), Rect::new(0, 4, 10, 4));

        // A nought tile in place of the crossroads draws the same slots.
        let mut bases = rpg_bases();
        let nought = Frame::new("nought", 0, 16, 16, 16).inverted();
        bases.insert(WangId::CARDINAL, nought.clone());
        let blits = synthesize_blob(&bases, &geometry, (0, 0)).unwrap();
        assert_eq!(blits.len(), 188);
        let from_nought: Vec<&Blit<&str>> =
            blits.iter().filter(|b| b.frame == nought).collect();
        assert!(!from_nought.is_empty());
        for blit in from_nought {
            let corner = Corner::ALL
                .into_iter()
                .find(|&c| {
                    let slot = geometry.subtile(c);
                    blit.dst.x == slot.x && blit.dst.y % 16 == slot.y
                })
                .unwrap();
            let size = geometry.subtile(corner.opposite());
            assert_eq!(blit.src.width, size.width as f32);
            assert_eq!(blit.src.height, size.height as f32);
            assert_eq!(blit.src.y, 16.0 + geometry.subtile(corner).y as f32);
        }
        let plain_bases = rpg_bases();
        let plain = synthesize_blob(&plain_bases, &geometry, (0, 0)).unwrap();
        let dsts: Vec<Rect> = blits.iter().map(|b| b.dst).collect();
        let plain_dsts: Vec<Rect> = plain.iter().map(|b| b.dst).collect();
        assert_eq!(dsts, plain_dsts);
    }
}
