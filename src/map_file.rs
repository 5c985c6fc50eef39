//! Tile maps stored as TOML.
//!
//! ```toml
//! tile_width = 64.0
//!
//! [[layers]]
//! name = "ground"
//! rows = ["....", ".##."]
//!
//! [[layers]]
//! name = "walk"
//! width = 4
//! gids = [0, 0, 7, 7, 0, 0, 0, 0]
//! ```
//!
//! A layer gives either `rows` (`.` empty, anything else a tile) or raw
//! `gids` with a `width`.

use anyhow::{Context, bail};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use tracing::{debug, info};

use tilewalk_navigation::{TileLayer, TileMapData};

#[derive(Debug, Clone, Deserialize)]
pub struct MapFile {
    pub tile_width: f32,
    #[serde(default)]
    pub layers: Vec<LayerFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayerFile {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<String>,
    #[serde(default)]
    pub width: Option<usize>,
    #[serde(default)]
    pub gids: Vec<u32>,
}

impl LayerFile {
    fn into_layer(self) -> anyhow::Result<TileLayer> {
        match (self.rows.is_empty(), self.width) {
            (false, _) => Ok(TileLayer::from_rows(self.name, &self.rows)),
            (true, Some(width)) if width > 0 => {
                let height = self.gids.len() / width;
                Ok(TileLayer::new(self.name, width, height, self.gids))
            }
            _ => bail!("layer '{}' needs either `rows` or `width` + `gids`", self.name),
        }
    }
}

impl MapFile {
    pub fn into_map(self) -> anyhow::Result<TileMapData> {
        let mut map = TileMapData::new(self.tile_width);
        for layer in self.layers {
            let layer = layer.into_layer()?;
            debug!(name = %layer.name, width = layer.width, height = layer.height, "Loaded layer");
            map = map.with_layer(layer);
        }
        Ok(map)
    }
}

fn parse(source: Config) -> anyhow::Result<TileMapData> {
    let file: MapFile = source.try_deserialize().context("map file has the wrong shape")?;
    file.into_map()
}

pub fn load_map(path: &str) -> anyhow::Result<TileMapData> {
    let source = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .build()
        .with_context(|| format!("reading map file {}", path))?;
    let map = parse(source)?;
    info!(path, tile_width = map.tile_width, layers = map.layers.len(), "Map loaded");
    Ok(map)
}

#[cfg(test)]
fn parse_map(toml: &str) -> anyhow::Result<TileMapData> {
    let source = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?;
    parse(source)
}
