//! # Engine Configuration
//!
//! `EngineConfig` collects every tunable of the engine. It is plain serde data,
//! usually read from a JSON file; every field has a default so a config file
//! only needs to name what it changes.
//!
//! ```
//! use voxel_engine_core::engine_state::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "floor_level": -8, "worker_count": 2 }"#).unwrap();
//! assert_eq!(config.floor_level, -8);
//! assert_eq!(config.chunk_shape, Default::default());
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    thread,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::voxels::{
    block::BlockTable,
    chunk::{ChunkShape, MAX_CHUNK_BITS},
    voxel::Voxel,
};

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config JSON")]
    Json(#[from] serde_json::Error),
    #[error("chunk shape {0:?} exceeds {max} index bits", max = MAX_CHUNK_BITS)]
    InvalidShape(ChunkShape),
    #[error("block table has {0} entries, expected 1 to 256")]
    InvalidBlockTable(usize),
    #[error("unknown block {0:?}")]
    UnknownBlock(String),
}

/// Tunables of an [`EngineState`](super::EngineState).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shape shared by every chunk of the world.
    pub chunk_shape: ChunkShape,
    /// Mesh worker threads. Zero runs mesh builds inline in `finish_pending`.
    pub worker_count: usize,
    /// Number of chunk meshes kept resident.
    pub mesh_cache_capacity: usize,
    /// Ungenerated space below this height reads as the floor block.
    pub floor_level: i32,
    /// Name of the floor block in `blocks`.
    pub floor_block: String,
    /// Block id to atlas tile table, ordered by id.
    pub blocks: BlockTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            chunk_shape: ChunkShape::default(),
            worker_count: thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1).max(1))
                .unwrap_or(1),
            mesh_cache_capacity: 10000,
            floor_level: 0,
            floor_block: "stone".to_string(),
            blocks: BlockTable::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the config for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_shape.total_bits() > MAX_CHUNK_BITS {
            return Err(ConfigError::InvalidShape(self.chunk_shape));
        }
        if self.blocks.is_empty() || self.blocks.len() > 256 {
            return Err(ConfigError::InvalidBlockTable(self.blocks.len()));
        }
        self.floor_voxel()?;
        Ok(())
    }

    /// The voxel ungenerated space below `floor_level` reads as.
    pub fn floor_voxel(&self) -> Result<Voxel, ConfigError> {
        self.blocks
            .id_of(&self.floor_block)
            .map(Voxel::solid)
            .ok_or_else(|| ConfigError::UnknownBlock(self.floor_block.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{block_type::BlockType, BlockDefinition};

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert!(config.worker_count >= 1);
        assert_eq!(config.floor_voxel().unwrap(), Voxel::solid(BlockType::STONE.id()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{
                "chunk_shape": { "x_bits": 4, "y_bits": 6, "z_bits": 4 },
                "floor_block": "dirt",
                "worker_count": 0
            }"#,
        )
        .unwrap();

        assert_eq!(config.chunk_shape.dimensions(), [16, 64, 16]);
        assert_eq!(config.worker_count, 0);
        assert_eq!(config.mesh_cache_capacity, 10000);
        assert_eq!(config.floor_voxel().unwrap(), Voxel::solid(BlockType::DIRT.id()));
    }

    #[test]
    fn custom_block_table() {
        let config = EngineConfig::from_json(
            r#"{
                "floor_block": "rock",
                "blocks": [
                    { "name": "air", "tiles": [0, 0, 0, 0, 0, 0] },
                    { "name": "rock", "tiles": [7, 7, 8, 7, 7, 7] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.floor_voxel().unwrap(), Voxel::solid(1));
        assert_eq!(
            config.blocks.definitions()[1],
            BlockDefinition {
                name: "rock".to_string(),
                tiles: [7, 7, 8, 7, 7, 7],
            }
        );
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig {
            floor_level: -3,
            ..EngineConfig::default()
        };
        assert_eq!(EngineConfig::from_json(&config.to_json().unwrap()).unwrap(), config);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "floor_block": "lava" }"#),
            Err(ConfigError::UnknownBlock(name)) if name == "lava"
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "chunk_shape": { "x_bits": 9, "y_bits": 9, "z_bits": 9 } }"#),
            Err(ConfigError::InvalidShape(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "blocks": [] }"#),
            Err(ConfigError::InvalidBlockTable(0))
        ));
        assert!(matches!(EngineConfig::from_json("{ nope"), Err(ConfigError::Json(_))));
        assert!(matches!(
            EngineConfig::load("/nonexistent/engine.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
