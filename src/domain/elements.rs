//! Element Definitions
//!
//! An element is a fixed-size descriptor of physical constants plus a
//! behavior kind. The engine never matches on concrete element ids outside
//! this file and the base behaviors; everything else goes through
//! `ElementProps` so callers can register their own content.
//!
//! Temperatures are on the Kelvin scale.

pub type ElementId = u8;
pub type CategoryId = u8;
pub type ElementFlags = u32;

/// Ids are `u8`; lookup tables are sized for every id
pub const MAX_ELEMENTS: usize = 256;
/// Never registered: reactions use it as their "leave the aggressor alone" marker
pub const EL_RESERVED: ElementId = 255;
/// Registrable ids are `0..MAX_ELEMENT_ID_COUNT`
pub const MAX_ELEMENT_ID_COUNT: usize = EL_RESERVED as usize;

// === Categories ===
pub const CAT_SOLID: CategoryId = 0;
pub const CAT_POWDER: CategoryId = 1;
pub const CAT_LIQUID: CategoryId = 2;
pub const CAT_GAS: CategoryId = 3;
pub const CAT_ENERGY: CategoryId = 4;

// === Property flags ===
pub const PROP_NONE: ElementFlags = 0;
/// Carries sparks / powers conductive walls
pub const PROP_CONDUCTS: ElementFlags = 1 << 0;
/// Energy particles may share the pixel
pub const PROP_PHOTPASS: ElementFlags = 1 << 1;
/// `life` counts down by one every tick while positive
pub const PROP_LIFE_DEC: ElementFlags = 1 << 2;
/// Killed whenever `life <= 0` at the start of its update
pub const PROP_LIFE_KILL: ElementFlags = 1 << 3;
/// Killed when the countdown reaches zero (not when it starts at zero)
pub const PROP_LIFE_KILL_DEC: ElementFlags = 1 << 4;
/// Does not exchange heat with the coarse air field
pub const PROP_NOAMBHEAT: ElementFlags = 1 << 5;

pub const MIN_TEMP: f32 = 0.0;
pub const MAX_TEMP: f32 = 9999.0;
/// 22 °C
pub const ROOM_TEMP: f32 = 295.15;

/// One phase-change rule: cross `threshold` and become `to`.
/// `to == EL_NONE` means the particle disappears.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub threshold: f32,
    pub to: ElementId,
}

impl Transition {
    pub const fn new(threshold: f32, to: ElementId) -> Self {
        Self { threshold, to }
    }
}

/// Registration descriptor, one per element id.
///
/// `falldown`: 0 = moves only along its velocity, 1 = powder (slides
/// diagonally), 2 = liquid (spreads sideways).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementProps {
    pub color: u32,
    pub category: CategoryId,
    pub flags: ElementFlags,

    // Air coupling
    pub advection: f32,
    pub air_drag: f32,
    pub air_loss: f32,
    pub hot_air: f32,

    // Motion
    pub loss: f32,
    pub collision: f32,
    pub gravity: f32,
    pub diffusion: f32,
    pub falldown: u8,
    pub weight: i32,

    // Material
    pub hardness: u16,
    pub flammable: u16,
    pub meltable: u16,
    pub heat_conduct: u8,

    // Spawn defaults
    pub default_temp: f32,
    pub default_life: i32,
    pub default_tmp: i32,

    pub low_pressure: Option<Transition>,
    pub high_pressure: Option<Transition>,
    pub low_temp: Option<Transition>,
    pub high_temp: Option<Transition>,
}

impl ElementProps {
    /// Immovable, inert, room temperature. Base for every descriptor below.
    pub const INERT: ElementProps = ElementProps {
        color: 0xFF00_0000,
        category: CAT_SOLID,
        flags: PROP_NONE,
        advection: 0.0,
        air_drag: 0.0,
        air_loss: 0.90,
        hot_air: 0.0,
        loss: 0.0,
        collision: 0.0,
        gravity: 0.0,
        diffusion: 0.0,
        falldown: 0,
        weight: 100,
        hardness: 0,
        flammable: 0,
        meltable: 0,
        heat_conduct: 0,
        default_temp: ROOM_TEMP,
        default_life: 0,
        default_tmp: 0,
        low_pressure: None,
        high_pressure: None,
        low_temp: None,
        high_temp: None,
    };

    #[inline]
    pub fn has(&self, flag: ElementFlags) -> bool {
        self.flags & flag != 0
    }

    #[inline]
    pub fn is_energy(&self) -> bool {
        self.category == CAT_ENERGY
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        self.category == CAT_SOLID
    }

    #[inline]
    pub fn is_liquid(&self) -> bool {
        self.category == CAT_LIQUID
    }

    #[inline]
    pub fn is_gas(&self) -> bool {
        self.category == CAT_GAS
    }

    /// Bit used by wall passability masks
    #[inline]
    pub fn category_bit(&self) -> u8 {
        1 << self.category
    }

    /// Per-particle heat capacity term shared by conduction and air coupling
    #[inline]
    pub fn heat_capacity(&self) -> f32 {
        if self.heat_conduct == 0 {
            return 0.0;
        }
        96.645 / self.heat_conduct as f32 * (self.weight.unsigned_abs().max(1)) as f32
    }
}

// === Base content ===

pub const EL_NONE: ElementId = 0;
pub const EL_DUST: ElementId = 1;
pub const EL_WATER: ElementId = 2;
pub const EL_ICE: ElementId = 3;
pub const EL_STEAM: ElementId = 4;
pub const EL_STONE: ElementId = 5;
pub const EL_LAVA: ElementId = 6;
pub const EL_METAL: ElementId = 7;
pub const EL_GLASS: ElementId = 8;
pub const EL_GAS: ElementId = 9;
pub const EL_FIRE: ElementId = 10;
pub const EL_PHOTON: ElementId = 11;
pub const EL_SPARK: ElementId = 12;
pub const EL_CLONE: ElementId = 13;
pub const EL_VOID: ElementId = 14;

pub const BASE_ELEMENT_COUNT: usize = 15;

/// How the base registry wires behaviors; bundles name these as strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorKind {
    None,
    /// Table-driven neighbour reactions only
    Reactive,
    Fire,
    Photon,
    Spark,
    UtilityClone,
    UtilityVoid,
}

pub const BASE_KEYS: [&str; BASE_ELEMENT_COUNT] = [
    "base:none",
    "base:dust",
    "base:water",
    "base:ice",
    "base:steam",
    "base:stone",
    "base:lava",
    "base:metal",
    "base:glass",
    "base:gas",
    "base:fire",
    "base:photon",
    "base:spark",
    "base:clone",
    "base:void",
];

pub const BASE_BEHAVIORS: [BehaviorKind; BASE_ELEMENT_COUNT] = [
    BehaviorKind::None,
    BehaviorKind::None,
    BehaviorKind::Reactive,
    BehaviorKind::None,
    BehaviorKind::None,
    BehaviorKind::None,
    BehaviorKind::None,
    BehaviorKind::None,
    BehaviorKind::None,
    BehaviorKind::None,
    BehaviorKind::Fire,
    BehaviorKind::Photon,
    BehaviorKind::Spark,
    BehaviorKind::UtilityClone,
    BehaviorKind::UtilityVoid,
];

pub const BASE_ELEMENTS: [ElementProps; BASE_ELEMENT_COUNT] = [
    // NONE: never simulated, only here so id 0 resolves
    ElementProps {
        weight: 0,
        air_loss: 1.0,
        ..ElementProps::INERT
    },
    // DUST
    ElementProps {
        color: 0xFFA0_9070,
        category: CAT_POWDER,
        advection: 0.7,
        air_drag: 0.02,
        air_loss: 0.96,
        loss: 0.80,
        gravity: 0.1,
        falldown: 1,
        weight: 85,
        flammable: 10,
        heat_conduct: 70,
        ..ElementProps::INERT
    },
    // WATER: `life` unused, `tmp` unused
    ElementProps {
        color: 0xFF20_50D0,
        category: CAT_LIQUID,
        flags: PROP_CONDUCTS,
        advection: 0.6,
        air_drag: 0.01,
        air_loss: 0.98,
        loss: 0.95,
        gravity: 0.1,
        falldown: 2,
        weight: 30,
        heat_conduct: 29,
        low_temp: Some(Transition::new(273.15, EL_ICE)),
        high_temp: Some(Transition::new(373.0, EL_STEAM)),
        ..ElementProps::INERT
    },
    // ICE
    ElementProps {
        color: 0xFFA0_C0FF,
        heat_conduct: 46,
        meltable: 1,
        hardness: 20,
        default_temp: 252.05,
        high_temp: Some(Transition::new(273.15, EL_WATER)),
        ..ElementProps::INERT
    },
    // STEAM
    ElementProps {
        color: 0xFFA0_A0FF,
        category: CAT_GAS,
        advection: 1.0,
        air_drag: 0.01,
        air_loss: 0.99,
        hot_air: 0.0003,
        loss: 0.30,
        collision: -0.1,
        gravity: -0.1,
        diffusion: 0.75,
        weight: 1,
        heat_conduct: 48,
        default_temp: 395.15,
        low_temp: Some(Transition::new(371.0, EL_WATER)),
        ..ElementProps::INERT
    },
    // STONE
    ElementProps {
        color: 0xFFA0_A0A0,
        category: CAT_POWDER,
        advection: 0.4,
        air_drag: 0.04,
        air_loss: 0.94,
        loss: 0.95,
        collision: -0.1,
        gravity: 0.3,
        falldown: 1,
        weight: 90,
        heat_conduct: 150,
        meltable: 5,
        high_temp: Some(Transition::new(983.0, EL_LAVA)),
        ..ElementProps::INERT
    },
    // LAVA
    ElementProps {
        color: 0xFFE0_5010,
        category: CAT_LIQUID,
        advection: 0.3,
        air_drag: 0.02,
        air_loss: 0.95,
        hot_air: 0.0003,
        loss: 0.80,
        gravity: 0.15,
        falldown: 2,
        weight: 45,
        heat_conduct: 60,
        default_temp: 1795.15,
        low_temp: Some(Transition::new(983.0, EL_STONE)),
        ..ElementProps::INERT
    },
    // METAL
    ElementProps {
        color: 0xFF40_4060,
        flags: PROP_CONDUCTS,
        hardness: 1,
        heat_conduct: 251,
        meltable: 1,
        high_temp: Some(Transition::new(1273.0, EL_LAVA)),
        ..ElementProps::INERT
    },
    // GLASS
    ElementProps {
        color: 0x40C0_E0E0,
        flags: PROP_PHOTPASS,
        hardness: 150,
        heat_conduct: 150,
        high_temp: Some(Transition::new(1973.0, EL_LAVA)),
        ..ElementProps::INERT
    },
    // GAS
    ElementProps {
        color: 0xFFE0_FF20,
        category: CAT_GAS,
        advection: 1.0,
        air_drag: 0.01,
        air_loss: 0.99,
        hot_air: 0.001,
        loss: 0.30,
        collision: -0.1,
        diffusion: 0.75,
        weight: 1,
        flammable: 600,
        heat_conduct: 42,
        ..ElementProps::INERT
    },
    // FIRE: `life` = remaining burn ticks
    ElementProps {
        color: 0xFFFF_1000,
        category: CAT_GAS,
        flags: PROP_LIFE_DEC | PROP_LIFE_KILL,
        advection: 0.9,
        air_drag: 0.04,
        air_loss: 0.97,
        hot_air: 0.001,
        loss: 0.20,
        gravity: -0.1,
        falldown: 1,
        weight: 2,
        heat_conduct: 88,
        default_temp: 695.15,
        default_life: 120,
        low_temp: Some(Transition::new(373.15, EL_NONE)),
        ..ElementProps::INERT
    },
    // PHOTON: `life` = remaining travel ticks
    ElementProps {
        color: 0xFFFF_FFFF,
        category: CAT_ENERGY,
        flags: PROP_LIFE_DEC | PROP_LIFE_KILL_DEC | PROP_NOAMBHEAT,
        air_loss: 1.0,
        loss: 1.0,
        collision: -0.99,
        weight: -1,
        heat_conduct: 251,
        default_temp: 1195.15,
        default_life: 680,
        ..ElementProps::INERT
    },
    // SPARK: `life` = ticks until it fizzles, `ctype` = conductor it rides
    ElementProps {
        color: 0xFFFF_FF80,
        category: CAT_ENERGY,
        flags: PROP_LIFE_DEC | PROP_LIFE_KILL | PROP_NOAMBHEAT,
        air_loss: 1.0,
        weight: -1,
        default_life: 4,
        ..ElementProps::INERT
    },
    // CLONE: `ctype` = element it duplicates (0 until it touches one)
    ElementProps {
        color: 0xFFFF_CC00,
        hardness: 1,
        heat_conduct: 251,
        ..ElementProps::INERT
    },
    // VOID
    ElementProps {
        color: 0xFF79_0B0B,
        flags: PROP_NOAMBHEAT,
        ..ElementProps::INERT
    },
];

/// Clamp into the engine's temperature range
#[inline]
pub fn clamp_temp(t: f32) -> f32 {
    if t.is_nan() {
        return MIN_TEMP;
    }
    t.clamp(MIN_TEMP, MAX_TEMP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_tables_line_up() {
        assert_eq!(BASE_KEYS.len(), BASE_ELEMENTS.len());
        assert_eq!(BASE_BEHAVIORS.len(), BASE_ELEMENTS.len());
        assert!(BASE_ELEMENTS[EL_PHOTON as usize].is_energy());
        assert!(BASE_ELEMENTS[EL_SPARK as usize].is_energy());
        assert!(!BASE_ELEMENTS[EL_WATER as usize].is_energy());
    }

    #[test]
    fn transition_targets_are_base_ids() {
        for props in BASE_ELEMENTS.iter() {
            for t in [props.low_temp, props.high_temp, props.low_pressure, props.high_pressure]
                .into_iter()
                .flatten()
            {
                assert!((t.to as usize) < BASE_ELEMENT_COUNT);
            }
        }
    }

    #[test]
    fn clamp_temp_is_idempotent() {
        for t in [-50.0, 0.0, 300.0, 12_000.0, f32::NAN] {
            let once = clamp_temp(t);
            assert_eq!(clamp_temp(once), once);
            assert!((MIN_TEMP..=MAX_TEMP).contains(&once));
        }
    }

    #[test]
    fn insulators_have_no_heat_capacity() {
        assert_eq!(BASE_ELEMENTS[EL_SPARK as usize].heat_capacity(), 0.0);
        assert!(BASE_ELEMENTS[EL_METAL as usize].heat_capacity() > 0.0);
    }
}
