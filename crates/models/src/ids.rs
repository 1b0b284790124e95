/// String ids of the items the streaming core treats specially.
pub mod item {
    pub const NORMAL_BLOCK: &str = "3dash:blocks/normal";
    pub const GRID_BLOCK: &str = "3dash:blocks/grid";
    pub const HALF_BLOCK: &str = "3dash:blocks/half";
    pub const COSMIC_GRID_BLOCK: &str = "3dash:blocks/cosmicGrid";
    pub const SLOPE: &str = "3dash:hazards/slope";
    pub const SPEED_PORTAL_NORMAL: &str = "3dash:portals/speed/normal";
    pub const SPEED_PORTAL_FAST: &str = "3dash:portals/speed/fast";
    pub const SPEED_PORTAL_SUPER: &str = "3dash:portals/speed/super";
    pub const COLOR_TRIGGER: &str = "3dash:triggers/color";
    pub const FINISH_TRIGGER: &str = "3dash:triggers/finish";
}

/// Item ids of official levels, indexed by item type index.
const OFFICIAL: [&str; 36] = [
    "3dash:blocks/normal",
    "3dash:hazards/spike",
    "3dash:blocks/grid",
    "3dash:blocks/half",
    "3dash:hazards/slope",
    "3dash:decoration/chain",
    "3dash:hazards/spikeball",
    "3dash:hazards/sawblade",
    "3dash:hazards/spikeGroup",
    "3dash:pads/yellow",
    "3dash:pads/cyan",
    "3dash:pads/magenta",
    "3dash:pads/red",
    "3dash:orbs/yellow",
    "3dash:orbs/cyan",
    "3dash:orbs/magenta",
    "3dash:orbs/red",
    "3dash:orbs/green",
    "3dash:orbs/black",
    "3dash:portals/mode/cube",
    "3dash:portals/mode/ship",
    "3dash:portals/mode/wave",
    "3dash:portals/mode/hedron",
    "3dash:portals/gravity/normal",
    "3dash:portals/gravity/reverse",
    "3dash:portals/speed/normal",
    "3dash:portals/speed/fast",
    "3dash:portals/speed/super",
    "3dash:portals/size/normal",
    "3dash:portals/size/small",
    "3dash:triggers/finish",
    "3dash:triggers/color",
    "3dash:portals/mode/ufo",
    "3dash:blocks/cosmicGrid",
    "3dash:hazards/cosmicSpike",
    "3dash:decoration/cosmicChain",
];

/// Item ids of custom (editor) levels, indexed by item type index.
const CUSTOM: [&str; 36] = [
    "3dash:blocks/normal",
    "3dash:blocks/grid",
    "3dash:blocks/half",
    "3dash:hazards/spike",
    "3dash:hazards/spikeGroup",
    "3dash:hazards/sawblade",
    "3dash:hazards/spikeball",
    "3dash:hazards/slope",
    "3dash:pads/magenta",
    "3dash:pads/yellow",
    "3dash:pads/red",
    "3dash:pads/cyan",
    "3dash:orbs/magenta",
    "3dash:orbs/yellow",
    "3dash:orbs/red",
    "3dash:orbs/cyan",
    "3dash:orbs/green",
    "3dash:orbs/black",
    "3dash:portals/gravity/normal",
    "3dash:portals/gravity/reverse",
    "3dash:portals/mode/cube",
    "3dash:portals/mode/ship",
    "3dash:portals/mode/wave",
    "3dash:portals/mode/ufo",
    "3dash:portals/mode/hedron",
    "3dash:portals/size/normal",
    "3dash:portals/size/small",
    "3dash:portals/speed/normal",
    "3dash:portals/speed/fast",
    "3dash:portals/speed/super",
    "3dash:decoration/chain",
    "3dash:triggers/color",
    "3dash:triggers/finish",
    "3dash:blocks/cosmicGrid",
    "3dash:hazards/cosmicSpike",
    "3dash:decoration/cosmicChain",
];

/// Mapping between numeric item type indices in level data and string ids.
/// Official and custom content use different index orders.
pub struct ItemIds;

impl ItemIds {
    fn table(official: bool) -> &'static [&'static str] {
        if official { &OFFICIAL } else { &CUSTOM }
    }

    /// String id for a type index, or `None` when out of range.
    pub fn get(official: bool, index: usize) -> Option<&'static str> {
        Self::table(official).get(index).copied()
    }

    /// Type index for a string id.
    pub fn index(official: bool, id: &str) -> Option<usize> {
        Self::table(official).iter().position(|&candidate| candidate == id)
    }

    /// Number of known item types.
    pub fn count(official: bool) -> usize {
        Self::table(official).len()
    }
}
