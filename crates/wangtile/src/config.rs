//! JSON terrain configuration
//!
//! A project describes its terrains as data; [`AutotileConfig::build`] turns
//! that description into a validated [`Terrains`] registry.

use crate::layout::Layout;
use crate::pattern::{BuiltinPattern, Pattern};
use crate::terrain::{Terrain, Terrains};
use crate::variant::VariantRule;
use crate::AutotileError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Where a terrain's wang id -> tile table comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternDef {
    Builtin(BuiltinPattern),
    Explicit(Pattern),
}

/// One terrain as written in a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainDef {
    pub name: String,
    #[serde(default)]
    pub layout: Layout,
    /// Defaults to the layout's built-in table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternDef>,
    /// Added to every tile of `pattern`, for terrains sharing one tileset
    #[serde(default)]
    pub first_tile: u32,
    /// Absolute tile indices, not shifted by `first_tile`
    #[serde(default)]
    pub additional_tiles: Vec<u32>,
    #[serde(default)]
    pub variants: Vec<VariantRule>,
}

impl TerrainDef {
    pub fn new(name: impl Into<String>, layout: Layout) -> Self {
        Self {
            name: name.into(),
            layout,
            pattern: None,
            first_tile: 0,
            additional_tiles: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// The pattern this terrain draws with, offset by `first_tile`
    pub fn resolve_pattern(&self) -> Result<Pattern, AutotileError> {
        let base = match &self.pattern {
            None => self.layout.default_pattern(),
            Some(PatternDef::Builtin(builtin)) => builtin.pattern(),
            Some(PatternDef::Explicit(pattern)) => pattern,
        };
        base.offset(self.first_tile)
            .map_err(|e| AutotileError::Configuration(format!("terrain '{}': {e}", self.name)))
    }

    /// Build the terrain, rejecting patterns with holes for this layout
    pub fn build(&self) -> Result<Terrain, AutotileError> {
        let pattern = self.resolve_pattern()?;
        pattern
            .check_total(self.layout)
            .map_err(|e| AutotileError::Configuration(format!("terrain '{}': {e}", self.name)))?;
        Ok(Terrain::new(
            self.name.clone(),
            self.layout,
            pattern,
            self.additional_tiles.iter().copied(),
        )
        .with_variants(self.variants.iter().cloned()))
    }
}

/// Configuration for autotiling in a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutotileConfig {
    #[serde(default)]
    pub terrains: Vec<TerrainDef>,
}

impl AutotileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_terrain(&mut self, terrain: TerrainDef) {
        self.terrains.push(terrain);
    }

    /// Get terrain definition by name
    pub fn get_terrain(&self, name: &str) -> Option<&TerrainDef> {
        self.terrains.iter().find(|t| t.name == name)
    }

    pub fn to_json(&self) -> Result<String, AutotileError> {
        serde_json::to_string_pretty(self).map_err(|e| AutotileError::Parse(e.to_string()))
    }

    /// Validate every terrain and collect them into a registry
    pub fn build(&self) -> Result<Terrains, AutotileError> {
        let mut terrains = Terrains::new();
        for def in &self.terrains {
            terrains.add(def.build()?)?;
        }
        info!(terrains = terrains.len(), "built autotile terrains");
        Ok(terrains)
    }
}

/// Load a config from a JSON file
pub fn load_config(path: &Path) -> Result<AutotileConfig, AutotileError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| AutotileError::Io(e.to_string()))?;

    parse_config(&content)
}

/// Parse a config from a JSON string
pub fn parse_config(json: &str) -> Result<AutotileConfig, AutotileError> {
    serde_json::from_str(json).map_err(|e| AutotileError::Parse(e.to_string()))
}

/// Save a config to a JSON file
pub fn save_config(config: &AutotileConfig, path: &Path) -> Result<(), AutotileError> {
    let content = config.to_json()?;
    std::fs::write(path, content).map_err(|e| AutotileError::Io(e.to_string()))
}
