//! # Errors
//!
//! Error types returned by the world core. Nothing here is fatal: generation
//! errors are recovered with a fallback chunk, mutation errors go back to the
//! gameplay caller, configuration errors are reported at startup.

use cgmath::Point3;
use thiserror::Error;

use crate::voxels::{
    block::{block_type::BlockType, tool::ToolRequirement},
    chunk::ChunkPos,
};

/// Failure inside the terrain pipeline for one chunk.
#[derive(Debug, Error, PartialEq)]
pub enum GenerationError {
    #[error("noise produced a non-finite value at column ({x}, {z})")]
    NonFiniteNoise { x: i32, z: i32 },
}

/// Rejected query or mutation against the world.
#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("chunk {pos} is not resident")]
    ChunkNotResident { pos: ChunkPos },

    #[error("y = {y} is outside the build range")]
    OutOfBuildRange { y: i32 },

    #[error("cannot place {block} at {pos:?}: occupied by {occupant}")]
    Occupied {
        pos: Point3<i32>,
        block: BlockType,
        occupant: BlockType,
    },

    #[error("cannot place {block} at {pos:?}: {reason}")]
    PlacementRestricted {
        pos: Point3<i32>,
        block: BlockType,
        reason: &'static str,
    },

    #[error("nothing to mine at {pos:?}")]
    NothingToMine { pos: Point3<i32> },

    #[error("{block} cannot be mined")]
    Unmineable { block: BlockType },

    #[error("{block} requires {requirement:?}")]
    ToolRequired {
        block: BlockType,
        requirement: ToolRequirement,
    },
}

/// Invalid world configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse world config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("radii must satisfy render ({render}) <= load ({load}) <= retain ({retain})")]
    InvalidRadii { render: u32, load: u32, retain: u32 },

    #[error("radius {radius} exceeds the maximum of {max} chunks")]
    RadiusTooLarge { radius: u32, max: u32 },

    #[error("max_resident_chunks must be greater than zero")]
    ZeroResidentLimit,
}

/// A block name that does not match any [`BlockType`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown block type `{0}`")]
pub struct UnknownBlockType(pub String);
