use crate::domain::walls::{wall_props, WallId, WallProps, CategoryMask, WL_NONE};

use super::FieldGrid;

/// Countdown written into `emap` when a cell is powered
pub const EMAP_POWERED: u8 = 16;

impl FieldGrid {
    #[inline]
    pub fn wall_at(&self, cx: u32, cy: u32) -> WallId {
        *fast!(self.wall, [self.index(cx, cy)])
    }

    #[inline]
    pub fn wall_props_at(&self, cx: u32, cy: u32) -> &'static WallProps {
        wall_props(self.wall_at(cx, cy))
    }

    /// Place (or clear with `WL_NONE`) a wall. Masks follow immediately.
    pub fn set_wall(&mut self, cx: u32, cy: u32, wall: WallId) {
        let idx = self.index(cx, cy);
        fast!(self.wall, [idx] = wall);
        if wall == WL_NONE {
            self.fvx[idx] = 0.0;
            self.fvy[idx] = 0.0;
        }
        self.refresh_mask(idx);
    }

    pub fn set_fan_velocity(&mut self, cx: u32, cy: u32, fvx: f32, fvy: f32) {
        let idx = self.index(cx, cy);
        self.fvx[idx] = fvx;
        self.fvy[idx] = fvy;
    }

    #[inline]
    pub fn emap_at(&self, cx: u32, cy: u32) -> u8 {
        *fast!(self.emap, [self.index(cx, cy)])
    }

    #[inline]
    pub fn is_powered(&self, cx: u32, cy: u32) -> bool {
        self.emap_at(cx, cy) > 0
    }

    /// Start the electricity countdown on a cell
    #[inline]
    pub fn power(&mut self, cx: u32, cy: u32) {
        let idx = self.index(cx, cy);
        fast!(self.emap, [idx] = EMAP_POWERED);
    }

    /// One tick of electricity decay
    pub fn decay_emap(&mut self) {
        for e in self.emap.iter_mut() {
            *e = e.saturating_sub(1);
        }
    }

    /// May a particle with this category bit occupy cell `(cx, cy)`?
    #[inline]
    pub fn wall_allows(&self, cx: u32, cy: u32, category_bit: CategoryMask) -> bool {
        let idx = self.index(cx, cy);
        let wall = *fast!(self.wall, [idx]);
        if wall == WL_NONE {
            return true;
        }
        wall_props(wall).allows(category_bit, *fast!(self.emap, [idx]) > 0)
    }

    #[inline]
    pub fn blocks_air(&self, cx: u32, cy: u32) -> bool {
        *fast!(self.block_air, [self.index(cx, cy)])
    }

    #[inline]
    pub fn blocks_heat(&self, cx: u32, cy: u32) -> bool {
        *fast!(self.block_heat, [self.index(cx, cy)])
    }

    #[inline]
    fn refresh_mask(&mut self, idx: usize) {
        let props = wall_props(self.wall[idx]);
        let powered = self.emap[idx] > 0;
        self.block_air[idx] = props.blocks_air_now(powered);
        self.block_heat[idx] = props.blocks_heat_now(powered);
    }

    /// Recompute air/heat blocking from walls and current electricity
    pub fn refresh_wall_masks(&mut self) {
        for idx in 0..self.size {
            self.refresh_mask(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::walls::{WL_EWALL, WL_WALL};
    use crate::elements::{BASE_ELEMENTS, EL_DUST};
    use crate::spatial::fields::FieldGrid;

    #[test]
    fn masks_follow_wall_placement() {
        let mut g = FieldGrid::new(16, 16).unwrap();
        g.set_wall(1, 1, WL_WALL);
        assert!(g.blocks_air(1, 1));
        assert!(g.blocks_heat(1, 1));
        g.set_wall(1, 1, 0);
        assert!(!g.blocks_air(1, 1));
    }

    #[test]
    fn ewall_opens_while_powered_then_closes() {
        let mut g = FieldGrid::new(16, 16).unwrap();
        let dust = BASE_ELEMENTS[EL_DUST as usize].category_bit();
        g.set_wall(2, 2, WL_EWALL);
        assert!(!g.wall_allows(2, 2, dust));
        g.power(2, 2);
        g.refresh_wall_masks();
        assert!(g.wall_allows(2, 2, dust));
        assert!(!g.blocks_air(2, 2));
        for _ in 0..16 {
            g.decay_emap();
        }
        g.refresh_wall_masks();
        assert!(!g.wall_allows(2, 2, dust));
        assert!(g.blocks_air(2, 2));
    }
}
