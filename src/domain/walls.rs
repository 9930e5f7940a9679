//! Wall catalog
//!
//! Walls live on the coarse grid. The core only ever asks the catalog
//! yes/no questions (may this category enter, does it block air/heat, does
//! it conduct), so new wall kinds are just new table rows.

use crate::elements::{CAT_ENERGY, CAT_GAS, CAT_LIQUID, CAT_POWDER, CAT_SOLID};

pub type WallId = u8;

pub const WL_NONE: WallId = 0;
/// Blocks particles, air and heat
pub const WL_WALL: WallId = 1;
/// Blocks particles; sparks touching it power the cell
pub const WL_CONDUCTIVE: WallId = 2;
/// Solid wall while unpowered, open while powered
pub const WL_EWALL: WallId = 3;
/// Open; powers its cell while a particle sits inside
pub const WL_DETECTOR: WallId = 4;
/// Blocks particles, pushes air with the cell's fan velocity
pub const WL_FAN: WallId = 5;
pub const WL_ALLOW_AIR: WallId = 6;
pub const WL_ALLOW_LIQUID: WallId = 7;
pub const WL_ALLOW_POWDER: WallId = 8;
pub const WL_ALLOW_GAS: WallId = 9;
pub const WL_ALLOW_ENERGY: WallId = 10;
/// Particles pass, air does not
pub const WL_BLOCK_AIR: WallId = 11;

pub const WALL_COUNT: usize = 12;

/// Bit per element category, see `ElementProps::category_bit`
pub type CategoryMask = u8;

pub const MASK_NONE: CategoryMask = 0;
pub const MASK_ALL: CategoryMask = (1 << CAT_SOLID)
    | (1 << CAT_POWDER)
    | (1 << CAT_LIQUID)
    | (1 << CAT_GAS)
    | (1 << CAT_ENERGY);

#[derive(Clone, Copy, Debug)]
pub struct WallProps {
    pub name: &'static str,
    /// Categories that may enter (or stay in) the cell
    pub passes: CategoryMask,
    pub blocks_air: bool,
    pub blocks_heat: bool,
    pub conductive: bool,
    /// Behaves like `WL_NONE` while its electricity countdown is non-zero
    pub opens_when_powered: bool,
    pub detector: bool,
    pub fan: bool,
}

const OPEN: WallProps = WallProps {
    name: "none",
    passes: MASK_ALL,
    blocks_air: false,
    blocks_heat: false,
    conductive: false,
    opens_when_powered: false,
    detector: false,
    fan: false,
};

pub const WALLS: [WallProps; WALL_COUNT] = [
    OPEN,
    WallProps { name: "wall", passes: MASK_NONE, blocks_air: true, blocks_heat: true, ..OPEN },
    WallProps { name: "conductive", passes: MASK_NONE, blocks_air: true, blocks_heat: true, conductive: true, ..OPEN },
    WallProps { name: "ewall", passes: MASK_NONE, blocks_air: true, blocks_heat: true, opens_when_powered: true, ..OPEN },
    WallProps { name: "detector", detector: true, ..OPEN },
    WallProps { name: "fan", passes: MASK_NONE, fan: true, ..OPEN },
    WallProps { name: "allow_air", passes: MASK_NONE, ..OPEN },
    WallProps { name: "allow_liquid", passes: 1 << CAT_LIQUID, blocks_air: true, ..OPEN },
    WallProps { name: "allow_powder", passes: 1 << CAT_POWDER, blocks_air: true, ..OPEN },
    WallProps { name: "allow_gas", passes: 1 << CAT_GAS, blocks_air: true, ..OPEN },
    WallProps { name: "allow_energy", passes: 1 << CAT_ENERGY, blocks_air: true, ..OPEN },
    WallProps { name: "block_air", blocks_air: true, blocks_heat: true, ..OPEN },
];

/// Catalog lookup; unknown ids behave as no wall
#[inline]
pub fn wall_props(id: WallId) -> &'static WallProps {
    WALLS.get(id as usize).unwrap_or(&WALLS[WL_NONE as usize])
}

#[inline]
pub fn is_valid_wall(id: WallId) -> bool {
    (id as usize) < WALL_COUNT
}

impl WallProps {
    /// Can a particle of the given category bit occupy this cell?
    #[inline]
    pub fn allows(&self, category_bit: CategoryMask, powered: bool) -> bool {
        if self.opens_when_powered && powered {
            return true;
        }
        self.passes & category_bit != 0
    }

    #[inline]
    pub fn blocks_air_now(&self, powered: bool) -> bool {
        self.blocks_air && !(self.opens_when_powered && powered)
    }

    #[inline]
    pub fn blocks_heat_now(&self, powered: bool) -> bool {
        self.blocks_heat && !(self.opens_when_powered && powered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BASE_ELEMENTS, EL_PHOTON, EL_WATER};

    #[test]
    fn plain_wall_blocks_everything() {
        let w = wall_props(WL_WALL);
        assert!(!w.allows(MASK_ALL, false));
        assert!(w.blocks_air_now(false));
        assert!(w.blocks_heat_now(false));
    }

    #[test]
    fn ewall_opens_when_powered() {
        let w = wall_props(WL_EWALL);
        let water = BASE_ELEMENTS[EL_WATER as usize].category_bit();
        assert!(!w.allows(water, false));
        assert!(w.allows(water, true));
        assert!(!w.blocks_air_now(true));
    }

    #[test]
    fn filtered_walls_pass_only_their_category() {
        let w = wall_props(WL_ALLOW_LIQUID);
        assert!(w.allows(BASE_ELEMENTS[EL_WATER as usize].category_bit(), false));
        assert!(!w.allows(BASE_ELEMENTS[EL_PHOTON as usize].category_bit(), false));
    }

    #[test]
    fn unknown_wall_is_open() {
        assert!(wall_props(200).allows(MASK_ALL, false));
        assert!(!is_valid_wall(200));
    }
}
