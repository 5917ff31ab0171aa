//! # Tool Module
//!
//! Tools used to mine blocks, and the tier ladder that gates which blocks a
//! tool can harvest.

/// The kind of tool a block prefers or requires.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Rock and ore.
    Pickaxe,
    /// Wood and plants.
    Axe,
    /// Soil, sand and snow.
    Shovel,
}

/// Material tier of a tool, ordered from weakest to strongest.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolTier {
    /// Bare hands.
    Hand,
    Wood,
    Stone,
    Iron,
    Diamond,
}

impl ToolTier {
    /// Mining speed multiplier of this tier.
    pub const fn speed(self) -> f64 {
        match self {
            ToolTier::Hand => 1.0,
            ToolTier::Wood => 2.0,
            ToolTier::Stone => 4.0,
            ToolTier::Iron => 6.0,
            ToolTier::Diamond => 8.0,
        }
    }
}

/// A tool held by the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tool {
    pub kind: ToolKind,
    pub tier: ToolTier,
}

impl Tool {
    pub const fn new(kind: ToolKind, tier: ToolTier) -> Self {
        Tool { kind, tier }
    }
}

/// The minimum tool needed to harvest a block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolRequirement {
    pub kind: ToolKind,
    pub min_tier: ToolTier,
}

impl ToolRequirement {
    /// Returns true when `tool` is of the required kind and at least the minimum tier.
    /// Requirements at [`ToolTier::Hand`] are met by anything, including no tool.
    pub fn is_met_by(&self, tool: Option<Tool>) -> bool {
        match tool {
            Some(tool) if tool.kind == self.kind => tool.tier >= self.min_tier,
            _ => self.min_tier == ToolTier::Hand,
        }
    }
}
