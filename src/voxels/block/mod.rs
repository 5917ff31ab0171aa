//! # Block Module
//!
//! This module provides the block registry: a static table of metadata for
//! every [`BlockType`]. The table is an exhaustive `match`, so adding a block
//! type without describing it is a compile error.
//!
//! Every query here is pure. Randomised queries (drops) take the random
//! source as an argument so callers decide how it is seeded.

use block_type::BlockType;
use tool::{Tool, ToolKind, ToolRequirement, ToolTier};

pub mod block_type;
pub mod tool;

/// Hardness sentinel marking a block that can never be mined.
pub const UNMINEABLE_HARDNESS: f64 = 100.0;

/// Seconds needed to break a block of hardness 1 by hand.
const BASE_MINING_SECONDS: f64 = 1.5;

/// One candidate of a chance-based drop list.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DropChance {
    pub block: BlockType,
    /// Probability in `[0, 1]` that this candidate drops.
    pub chance: f64,
}

/// What a block yields when mined.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DropRule {
    /// The block drops one of itself.
    SelfDrop,
    /// The block drops nothing.
    Nothing,
    /// The block drops exactly one of another type.
    Single(BlockType),
    /// Each candidate is rolled independently, so several may drop at once.
    Chance(&'static [DropChance]),
}

/// A stack of items produced by mining.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ItemDrop {
    pub block: BlockType,
    pub count: u32,
}

/// Static metadata shared by every block of one type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockProperties {
    pub solid: bool,
    pub transparent: bool,
    pub liquid: bool,
    /// Tool needed to harvest the block at all.
    pub required_tool: Option<ToolRequirement>,
    /// Tool kind that speeds up mining when there is no hard requirement.
    pub preferred_tool: Option<ToolKind>,
    /// Mining time multiplier, [`UNMINEABLE_HARDNESS`] for unmineable blocks.
    pub hardness: f64,
    pub drops: DropRule,
    pub stack_size: u32,
}

impl BlockProperties {
    const fn solid(hardness: f64, preferred_tool: Option<ToolKind>) -> Self {
        BlockProperties {
            solid: true,
            transparent: false,
            liquid: false,
            required_tool: None,
            preferred_tool,
            hardness,
            drops: DropRule::SelfDrop,
            stack_size: 64,
        }
    }

    const fn plant() -> Self {
        BlockProperties {
            solid: false,
            transparent: true,
            liquid: false,
            required_tool: None,
            preferred_tool: None,
            hardness: 0.0,
            drops: DropRule::SelfDrop,
            stack_size: 64,
        }
    }

    const fn liquid() -> Self {
        BlockProperties {
            solid: false,
            transparent: true,
            liquid: true,
            required_tool: None,
            preferred_tool: None,
            hardness: UNMINEABLE_HARDNESS,
            drops: DropRule::Nothing,
            stack_size: 1,
        }
    }

    const fn requires(mut self, kind: ToolKind, min_tier: ToolTier) -> Self {
        self.required_tool = Some(ToolRequirement { kind, min_tier });
        self.preferred_tool = Some(kind);
        self
    }

    const fn drops(mut self, drops: DropRule) -> Self {
        self.drops = drops;
        self
    }

    const fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }
}

const LEAF_DROPS: &[DropChance] = &[
    DropChance { block: BlockType::Stick, chance: 0.1 },
    DropChance { block: BlockType::Sapling, chance: 0.05 },
    DropChance { block: BlockType::Leaves, chance: 0.2 },
];

const MUSHROOM_CAP_DROPS: &[DropChance] = &[DropChance {
    block: BlockType::Mushroom,
    chance: 0.3,
}];

const TALL_GRASS_DROPS: &[DropChance] = &[DropChance {
    block: BlockType::Sapling,
    chance: 0.02,
}];

/// Contact damage dealt by a block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Damage {
    pub damage: u32,
    pub cooldown_ms: u64,
}

/// Light given off by a block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LightEmission {
    /// 0..=15
    pub intensity: u8,
    pub color: [u8; 3],
}

/// How a block alters the movement of whatever stands in or on it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MovementEffect {
    /// Multiplier applied to movement speed, below 1.
    pub slowdown: Option<f64>,
    pub slippery: bool,
    /// Multiplier applied to movement speed, above 1.
    pub speed_boost: Option<f64>,
}

/// Constraints checked before a block may be placed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementRestrictions {
    pub must_be_on_solid: bool,
    pub cannot_be_underwater: bool,
    pub cannot_be_next_to_solid: bool,
}

/// Heat exchanged with an entity touching the block.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TemperatureEffect {
    /// Positive warms, negative chills.
    pub degrees_per_second: f64,
}

impl BlockType {
    /// Returns the registry entry for this block type.
    pub const fn properties(self) -> BlockProperties {
        use BlockType::*;
        use ToolKind::*;
        match self {
            Air => BlockProperties {
                solid: false,
                transparent: true,
                liquid: false,
                required_tool: None,
                preferred_tool: None,
                hardness: 0.0,
                drops: DropRule::Nothing,
                stack_size: 0,
            },
            Grass => BlockProperties::solid(0.6, Some(Shovel)).drops(DropRule::Single(Dirt)),
            Dirt => BlockProperties::solid(0.5, Some(Shovel)),
            Stone => BlockProperties::solid(1.5, None).requires(Pickaxe, ToolTier::Wood),
            Sand => BlockProperties::solid(0.5, Some(Shovel)),
            Clay => BlockProperties::solid(0.6, Some(Shovel)),
            Gravel => BlockProperties::solid(0.6, Some(Shovel)),
            Snow => BlockProperties::solid(0.2, Some(Shovel)),
            Ice => BlockProperties::solid(0.5, Some(Pickaxe))
                .transparent()
                .drops(DropRule::Nothing),
            Bedrock => BlockProperties::solid(UNMINEABLE_HARDNESS, None).drops(DropRule::Nothing),
            Wood => BlockProperties::solid(2.0, Some(Axe)),
            Planks => BlockProperties::solid(2.0, Some(Axe)),
            Leaves => BlockProperties::solid(0.2, None)
                .transparent()
                .drops(DropRule::Chance(LEAF_DROPS)),
            Water | Lava => BlockProperties::liquid(),
            CoalOre => BlockProperties::solid(3.0, None).requires(Pickaxe, ToolTier::Wood),
            IronOre => BlockProperties::solid(3.0, None).requires(Pickaxe, ToolTier::Stone),
            GoldOre => BlockProperties::solid(3.0, None).requires(Pickaxe, ToolTier::Iron),
            DiamondOre => BlockProperties::solid(3.0, None).requires(Pickaxe, ToolTier::Iron),
            Cactus => BlockProperties::solid(0.4, None).transparent(),
            Flower | Mushroom | Sapling | Torch => BlockProperties::plant(),
            TallGrass => BlockProperties::plant().drops(DropRule::Chance(TALL_GRASS_DROPS)),
            MushroomCap => BlockProperties::solid(0.2, Some(Axe))
                .drops(DropRule::Chance(MUSHROOM_CAP_DROPS)),
            Ash => BlockProperties::solid(0.5, Some(Shovel)),
            Basalt => BlockProperties::solid(1.25, None).requires(Pickaxe, ToolTier::Wood),
            Obsidian => BlockProperties::solid(50.0, None).requires(Pickaxe, ToolTier::Diamond),
            Glowstone => BlockProperties::solid(0.3, None).transparent(),
            Stick => BlockProperties::plant(),
            CraftingTable => BlockProperties::solid(2.5, Some(Axe)),
        }
    }

    #[inline]
    pub const fn is_solid(self) -> bool {
        self.properties().solid
    }

    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.properties().transparent
    }

    #[inline]
    pub const fn is_liquid(self) -> bool {
        self.properties().liquid
    }

    #[inline]
    pub const fn hardness(self) -> f64 {
        self.properties().hardness
    }

    #[inline]
    pub const fn required_tool(self) -> Option<ToolRequirement> {
        self.properties().required_tool
    }

    /// Returns true when the block can never be mined.
    #[inline]
    pub fn is_unmineable(self) -> bool {
        self.hardness() >= UNMINEABLE_HARDNESS
    }

    /// Returns true when placing a block into this cell replaces it outright.
    #[inline]
    pub const fn is_replaceable(self) -> bool {
        matches!(self, BlockType::Air | BlockType::Water | BlockType::TallGrass)
    }

    pub const fn is_damaging(self) -> Option<Damage> {
        match self {
            BlockType::Lava => Some(Damage { damage: 4, cooldown_ms: 500 }),
            BlockType::Cactus => Some(Damage { damage: 1, cooldown_ms: 1000 }),
            _ => None,
        }
    }

    pub const fn light_emission(self) -> Option<LightEmission> {
        match self {
            BlockType::Lava => Some(LightEmission { intensity: 15, color: [255, 120, 20] }),
            BlockType::Glowstone => Some(LightEmission { intensity: 15, color: [255, 230, 160] }),
            BlockType::Torch => Some(LightEmission { intensity: 14, color: [255, 200, 120] }),
            _ => None,
        }
    }

    pub const fn movement_effect(self) -> MovementEffect {
        match self {
            BlockType::Water => MovementEffect {
                slowdown: Some(0.5),
                slippery: false,
                speed_boost: None,
            },
            BlockType::Lava => MovementEffect {
                slowdown: Some(0.3),
                slippery: false,
                speed_boost: None,
            },
            BlockType::Snow => MovementEffect {
                slowdown: Some(0.9),
                slippery: false,
                speed_boost: None,
            },
            BlockType::Ice => MovementEffect {
                slowdown: None,
                slippery: true,
                speed_boost: Some(1.2),
            },
            _ => MovementEffect {
                slowdown: None,
                slippery: false,
                speed_boost: None,
            },
        }
    }

    pub const fn placement_restrictions(self) -> PlacementRestrictions {
        match self {
            BlockType::Flower | BlockType::TallGrass | BlockType::Sapling | BlockType::Torch => {
                PlacementRestrictions {
                    must_be_on_solid: true,
                    cannot_be_underwater: true,
                    cannot_be_next_to_solid: false,
                }
            }
            BlockType::Mushroom => PlacementRestrictions {
                must_be_on_solid: true,
                cannot_be_underwater: false,
                cannot_be_next_to_solid: false,
            },
            BlockType::Cactus => PlacementRestrictions {
                must_be_on_solid: true,
                cannot_be_underwater: true,
                cannot_be_next_to_solid: true,
            },
            _ => PlacementRestrictions {
                must_be_on_solid: false,
                cannot_be_underwater: false,
                cannot_be_next_to_solid: false,
            },
        }
    }

    pub const fn temperature_effect(self) -> Option<TemperatureEffect> {
        match self {
            BlockType::Lava => Some(TemperatureEffect { degrees_per_second: 8.0 }),
            BlockType::Ice => Some(TemperatureEffect { degrees_per_second: -2.0 }),
            BlockType::Snow => Some(TemperatureEffect { degrees_per_second: -1.0 }),
            _ => None,
        }
    }

    /// Seconds needed to mine this block with `tool`.
    ///
    /// Returns `None` when the block is unmineable or the tool does not meet
    /// the block's requirement. Above the minimum tier the time strictly
    /// decreases as the tier goes up.
    pub fn mining_time(self, tool: Option<Tool>) -> Option<f64> {
        let properties = self.properties();
        if self.is_unmineable() {
            return None;
        }
        if let Some(requirement) = properties.required_tool {
            if !requirement.is_met_by(tool) {
                return None;
            }
        }

        let speed = match (tool, properties.preferred_tool) {
            (Some(tool), Some(kind)) if tool.kind == kind => tool.tier.speed(),
            _ => 1.0,
        };
        Some(properties.hardness * BASE_MINING_SECONDS / speed)
    }
}

/// Rolls the drops of `block_type`.
///
/// Chance candidates are rolled independently against a uniform draw in
/// `[0, 1)`, so a chance of 1 always drops and a chance of 0 never does.
pub fn compute_drops(block_type: BlockType, rng: &mut fastrand::Rng) -> Vec<ItemDrop> {
    roll_drop_rule(block_type, block_type.properties().drops, rng)
}

/// Rolls `rule` as if it were attached to `source`.
pub fn roll_drop_rule(source: BlockType, rule: DropRule, rng: &mut fastrand::Rng) -> Vec<ItemDrop> {
    match rule {
        DropRule::SelfDrop => vec![ItemDrop { block: source, count: 1 }],
        DropRule::Nothing => Vec::new(),
        DropRule::Single(block) => vec![ItemDrop { block, count: 1 }],
        DropRule::Chance(candidates) => candidates
            .iter()
            .filter(|candidate| rng.f64() < candidate.chance)
            .map(|candidate| ItemDrop { block: candidate.block, count: 1 })
            .collect(),
    }
}
