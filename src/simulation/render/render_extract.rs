use crate::domain::walls::WL_NONE;
use crate::spatial::fields::CELL;
use crate::systems::behaviors::blend_argb;

use super::Simulation;

const BACKGROUND: u32 = 0xFF00_0000;
const WALL_COLOR: u32 = 0xFF80_8080;
const WALL_POWERED_COLOR: u32 = 0xFFC0_C0FF;
/// Glow halo painted onto the four neighbours, alpha carries the strength
const GLOW_ALPHA: u32 = 0x40;

/// Repaint the frame buffer: background, then walls, then every live
/// particle in slot order using its element's `graphics`
pub(super) fn render(sim: &mut Simulation) {
    let w = sim.width as usize;
    let h = sim.height as usize;
    sim.colors.fill(BACKGROUND);

    let cells_x = sim.fields.cells_x();
    let cells_y = sim.fields.cells_y();
    for cy in 0..cells_y {
        for cx in 0..cells_x {
            if sim.fields.wall_at(cx, cy) == WL_NONE {
                continue;
            }
            let color = if sim.fields.is_powered(cx, cy) { WALL_POWERED_COLOR } else { WALL_COLOR };
            let (x0, y0) = ((cx * CELL) as usize, (cy * CELL) as usize);
            for y in y0..(y0 + CELL as usize).min(h) {
                sim.colors[y * w + x0..(x0 + CELL as usize).min(w) + y * w].fill(color);
            }
        }
    }

    for slot in sim.parts.live_slots() {
        let p = sim.parts.part(slot);
        let (x, y) = p.pixel();
        if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
            continue;
        }
        let props = sim.content.element(p.element);
        let px = sim.behaviors.get(p.element).graphics(p, props);
        let idx = y as usize * w + x as usize;
        sim.colors[idx] = px.color;
        if px.glow {
            let halo = (GLOW_ALPHA << 24) | (px.color & 0x00FF_FFFF);
            for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                if nx < 0 || ny < 0 || nx as usize >= w || ny as usize >= h {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                sim.colors[n] = blend_argb(sim.colors[n], halo);
            }
        }
    }
}
