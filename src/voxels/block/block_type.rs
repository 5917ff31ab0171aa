//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification and conversion
//! between block types and their stable textual names.

use std::{fmt, str::FromStr};

use phf::phf_map;

use crate::error::UnknownBlockType;

/// Enumerates all possible block types in the voxel world.
///
/// Each variant represents a distinct type of block with its own properties
/// and behavior. Block types carry no per-instance state; everything that
/// varies between types lives in the registry (see [`BlockType::properties`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent.
    Air,
    /// A grass-topped soil block.
    Grass,
    /// A basic dirt block.
    Dirt,
    /// The default underground material.
    Stone,
    /// Loose sand found in deserts, beaches and under water.
    Sand,
    /// Clay found along rivers and in swamps.
    Clay,
    /// Loose gravel.
    Gravel,
    /// Snow cover for cold biomes and high peaks.
    Snow,
    /// Frozen water.
    Ice,
    /// The unbreakable floor of the world.
    Bedrock,
    /// A tree trunk.
    Wood,
    /// Processed wood.
    Planks,
    /// Tree foliage.
    Leaves,
    /// Still water.
    Water,
    /// Molten rock.
    Lava,
    /// Shallow ore.
    CoalOre,
    /// Mid-depth ore.
    IronOre,
    /// Deep ore.
    GoldOre,
    /// The deepest and rarest ore.
    DiamondOre,
    /// Desert plant that hurts on contact.
    Cactus,
    /// Decorative flower.
    Flower,
    /// Decorative tall grass.
    TallGrass,
    /// Small mushroom.
    Mushroom,
    /// Giant mushroom cap.
    MushroomCap,
    /// Volcanic ash cover.
    Ash,
    /// Cooled volcanic rock.
    Basalt,
    /// Very hard volcanic glass.
    Obsidian,
    /// Light-emitting crystal.
    Glowstone,
    /// Placeable light source.
    Torch,
    /// Tree seedling dropped by leaves.
    Sapling,
    /// Crafting material dropped by leaves.
    Stick,
    /// Placeable crafting station.
    CraftingTable,
}

/// Lookup from stable block names to block types, built at compile time.
static BLOCK_TYPES_BY_NAME: phf::Map<&'static str, BlockType> = phf_map! {
    "air" => BlockType::Air,
    "grass" => BlockType::Grass,
    "dirt" => BlockType::Dirt,
    "stone" => BlockType::Stone,
    "sand" => BlockType::Sand,
    "clay" => BlockType::Clay,
    "gravel" => BlockType::Gravel,
    "snow" => BlockType::Snow,
    "ice" => BlockType::Ice,
    "bedrock" => BlockType::Bedrock,
    "wood" => BlockType::Wood,
    "planks" => BlockType::Planks,
    "leaves" => BlockType::Leaves,
    "water" => BlockType::Water,
    "lava" => BlockType::Lava,
    "coal_ore" => BlockType::CoalOre,
    "iron_ore" => BlockType::IronOre,
    "gold_ore" => BlockType::GoldOre,
    "diamond_ore" => BlockType::DiamondOre,
    "cactus" => BlockType::Cactus,
    "flower" => BlockType::Flower,
    "tall_grass" => BlockType::TallGrass,
    "mushroom" => BlockType::Mushroom,
    "mushroom_cap" => BlockType::MushroomCap,
    "ash" => BlockType::Ash,
    "basalt" => BlockType::Basalt,
    "obsidian" => BlockType::Obsidian,
    "glowstone" => BlockType::Glowstone,
    "torch" => BlockType::Torch,
    "sapling" => BlockType::Sapling,
    "stick" => BlockType::Stick,
    "crafting_table" => BlockType::CraftingTable,
};

impl BlockType {
    /// Every block type, in declaration order.
    pub const ALL: [BlockType; 32] = [
        BlockType::Air,
        BlockType::Grass,
        BlockType::Dirt,
        BlockType::Stone,
        BlockType::Sand,
        BlockType::Clay,
        BlockType::Gravel,
        BlockType::Snow,
        BlockType::Ice,
        BlockType::Bedrock,
        BlockType::Wood,
        BlockType::Planks,
        BlockType::Leaves,
        BlockType::Water,
        BlockType::Lava,
        BlockType::CoalOre,
        BlockType::IronOre,
        BlockType::GoldOre,
        BlockType::DiamondOre,
        BlockType::Cactus,
        BlockType::Flower,
        BlockType::TallGrass,
        BlockType::Mushroom,
        BlockType::MushroomCap,
        BlockType::Ash,
        BlockType::Basalt,
        BlockType::Obsidian,
        BlockType::Glowstone,
        BlockType::Torch,
        BlockType::Sapling,
        BlockType::Stick,
        BlockType::CraftingTable,
    ];

    /// Returns the stable snake_case name of this block type.
    pub const fn name(self) -> &'static str {
        match self {
            BlockType::Air => "air",
            BlockType::Grass => "grass",
            BlockType::Dirt => "dirt",
            BlockType::Stone => "stone",
            BlockType::Sand => "sand",
            BlockType::Clay => "clay",
            BlockType::Gravel => "gravel",
            BlockType::Snow => "snow",
            BlockType::Ice => "ice",
            BlockType::Bedrock => "bedrock",
            BlockType::Wood => "wood",
            BlockType::Planks => "planks",
            BlockType::Leaves => "leaves",
            BlockType::Water => "water",
            BlockType::Lava => "lava",
            BlockType::CoalOre => "coal_ore",
            BlockType::IronOre => "iron_ore",
            BlockType::GoldOre => "gold_ore",
            BlockType::DiamondOre => "diamond_ore",
            BlockType::Cactus => "cactus",
            BlockType::Flower => "flower",
            BlockType::TallGrass => "tall_grass",
            BlockType::Mushroom => "mushroom",
            BlockType::MushroomCap => "mushroom_cap",
            BlockType::Ash => "ash",
            BlockType::Basalt => "basalt",
            BlockType::Obsidian => "obsidian",
            BlockType::Glowstone => "glowstone",
            BlockType::Torch => "torch",
            BlockType::Sapling => "sapling",
            BlockType::Stick => "stick",
            BlockType::CraftingTable => "crafting_table",
        }
    }

    /// Looks up a block type by its stable name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPES_BY_NAME.get(name).copied()
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, BlockType::Air)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownBlockType(s.to_owned()))
    }
}
