use thiserror::Error;

use super::rendering::ScreenRect;

pub const TILE_SIZE: u32 = 128;
pub const MAX_TILE_DEFINITIONS: usize = 256;
pub const TILE_NAME_MAX_LEN: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileSetError {
    #[error("tileset full ({capacity} definitions)")]
    Full { capacity: usize },
}

/// Map layers, listed in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileLayer {
    Ground,
    Paths,
    Decoration,
    Objects,
    /// Logic only, never drawn.
    Collision,
}

impl TileLayer {
    pub const ALL: [TileLayer; 5] = [
        TileLayer::Ground,
        TileLayer::Paths,
        TileLayer::Decoration,
        TileLayer::Objects,
        TileLayer::Collision,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TileLayer::Ground => "ground",
            TileLayer::Paths => "paths",
            TileLayer::Decoration => "decoration",
            TileLayer::Objects => "objects",
            TileLayer::Collision => "collision",
        }
    }

    pub fn is_rendered(self) -> bool {
        self != TileLayer::Collision
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileDefId(pub u16);

/// A tile type: where it sits in the atlas and whether it can be walked on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDef {
    pub atlas_col: u32,
    pub atlas_row: u32,
    pub walkable: bool,
    name: String,
}

impl TileDef {
    /// Names longer than [`TILE_NAME_MAX_LEN`] characters are truncated.
    pub fn new(atlas_col: u32, atlas_row: u32, walkable: bool, name: &str) -> Self {
        Self {
            atlas_col,
            atlas_row,
            walkable,
            name: name.chars().take(TILE_NAME_MAX_LEN).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_rect(&self, tile_size: u32) -> ScreenRect {
        ScreenRect {
            x: (self.atlas_col * tile_size) as i32,
            y: (self.atlas_row * tile_size) as i32,
            width: tile_size,
            height: tile_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub def: Option<TileDefId>,
    pub layer: TileLayer,
}

impl Tile {
    pub fn empty(layer: TileLayer) -> Self {
        Self { def: None, layer }
    }

    pub fn new(def: TileDefId, layer: TileLayer) -> Self {
        Self {
            def: Some(def),
            layer,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.def.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TileSet {
    defs: Vec<TileDef>,
    capacity: usize,
}

impl Default for TileSet {
    fn default() -> Self {
        Self::with_capacity(MAX_TILE_DEFINITIONS)
    }
}

impl TileSet {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(usize::from(u16::MAX) + 1);
        Self {
            defs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, def: TileDef) -> Result<TileDefId, TileSetError> {
        if self.defs.len() >= self.capacity {
            return Err(TileSetError::Full {
                capacity: self.capacity,
            });
        }
        let id = TileDefId(self.defs.len() as u16);
        self.defs.push(def);
        Ok(id)
    }

    pub fn get(&self, id: TileDefId) -> Option<&TileDef> {
        self.defs.get(usize::from(id.0))
    }

    /// Empty tiles and unknown ids are not walkable.
    pub fn is_walkable(&self, tile: &Tile) -> bool {
        tile.def
            .and_then(|id| self.get(id))
            .is_some_and(|def| def.walkable)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
