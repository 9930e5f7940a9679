use crate::domain::walls::{wall_props, WallId};
use crate::spatial::fields::{FieldGrid, MAX_PRESSURE, MIN_PRESSURE};

use super::AIR_VADV;

/// Heat advects further than momentum
const HEAT_ADV_DIST: f32 = 0.7;

/// Normalised 3x3 Gaussian, weight `exp(-2 (i^2 + j^2))`, row major
pub fn gaussian() -> [f32; 9] {
    let mut k = [0.0f32; 9];
    let mut sum = 0.0;
    for j in -1i32..=1 {
        for i in -1i32..=1 {
            let w = (-2.0 * (i * i + j * j) as f32).exp();
            k[((j + 1) * 3 + (i + 1)) as usize] = w;
            sum += w;
        }
    }
    for w in k.iter_mut() {
        *w /= sum;
    }
    k
}

/// Read-only view of the fields for one smoothing/advection pass.
/// Shared across rows, so it must stay `Sync`.
pub struct AirView<'a> {
    w: usize,
    h: usize,
    kernel: [f32; 9],
    pv: &'a [f32],
    vx: &'a [f32],
    vy: &'a [f32],
    hv: &'a [f32],
    wall: &'a [WallId],
    fvx: &'a [f32],
    fvy: &'a [f32],
    block_air: &'a [bool],
    block_heat: &'a [bool],
}

impl<'a> AirView<'a> {
    pub fn of(fields: &'a FieldGrid, kernel: [f32; 9], w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            kernel,
            pv: &fields.pv,
            vx: &fields.vx,
            vy: &fields.vy,
            hv: &fields.hv,
            wall: &fields.wall,
            fvx: &fields.fvx,
            fvy: &fields.fvy,
            block_air: &fields.block_air,
            block_heat: &fields.block_heat,
        }
    }

    /// Does the cell nearest to `(tx, ty)` block air? Off-grid counts as blocked.
    #[inline]
    fn blocks_near(&self, tx: f32, ty: f32) -> bool {
        let rx = (tx + 0.5).floor();
        let ry = (ty + 0.5).floor();
        if rx < 0.0 || ry < 0.0 || rx >= self.w as f32 || ry >= self.h as f32 {
            return true;
        }
        self.block_air[ry as usize * self.w + rx as usize]
    }

    /// Bilinear sample of `src` at cell `(i, j)` with fractions `(fx, fy)`
    #[inline]
    fn bilinear(&self, src: &[f32], i: usize, j: usize, fx: f32, fy: f32) -> f32 {
        let idx = j * self.w + i;
        (1.0 - fx) * (1.0 - fy) * src[idx]
            + fx * (1.0 - fy) * src[idx + 1]
            + (1.0 - fx) * fy * src[idx + self.w]
            + fx * fy * src[idx + self.w + 1]
    }

    /// Source point for advecting `(x, y)` back along `(dx, dy)`. Long
    /// back-traces walk cell by cell and stop in front of the first wall.
    fn trace_back(&self, x: usize, y: usize, dx: f32, dy: f32) -> (f32, f32) {
        let far_x = x as f32 - dx * AIR_VADV;
        let far_y = y as f32 - dy * AIR_VADV;
        if (dx * AIR_VADV).abs() <= 1.0 && (dy * AIR_VADV).abs() <= 1.0 {
            return (far_x, far_y);
        }

        let (step_x, step_y, limit) = if dx.abs() > dy.abs() {
            (if dx < 0.0 { 1.0 } else { -1.0 }, -dy / dx.abs(), (dx * AIR_VADV).abs() as usize)
        } else {
            (-dx / dy.abs(), if dy < 0.0 { 1.0 } else { -1.0 }, (dy * AIR_VADV).abs() as usize)
        };
        let (mut tx, mut ty) = (x as f32, y as f32);
        for _ in 0..limit {
            tx += step_x;
            ty += step_y;
            if self.blocks_near(tx, ty) {
                return (tx - step_x, ty - step_y);
            }
        }
        (far_x, far_y)
    }

    /// Smooth + advect one row of pressure and velocity into the outputs
    pub fn air_row(&self, y: usize, out_p: &mut [f32], out_vx: &mut [f32], out_vy: &mut [f32]) {
        let (w, h) = (self.w, self.h);
        for x in 0..w {
            let idx = y * w + x;
            let blocked = self.block_air[idx];

            let (mut dp, mut dx, mut dy) = (0.0f32, 0.0f32, 0.0f32);
            for j in 0..3usize {
                for i in 0..3usize {
                    let f = self.kernel[j * 3 + i];
                    let src = match inner_neighbour(x + i, y + j, w, h, 1) {
                        Some(n) if !self.block_air[n] => n,
                        _ => idx,
                    };
                    dp += self.pv[src] * f;
                    dx += self.vx[src] * f;
                    dy += self.vy[src] * f;
                }
            }

            let (tx, ty) = self.trace_back(x, y, dx, dy);
            let (ci, cj) = (tx.floor(), ty.floor());
            if !blocked && ci >= 2.0 && cj >= 2.0 && ci <= (w as f32 - 3.0) && cj <= (h as f32 - 3.0) {
                let (fx, fy) = (tx - ci, ty - cj);
                let (ci, cj) = (ci as usize, cj as usize);
                dx = dx * (1.0 - AIR_VADV) + AIR_VADV * self.bilinear(self.vx, ci, cj, fx, fy);
                dy = dy * (1.0 - AIR_VADV) + AIR_VADV * self.bilinear(self.vy, ci, cj, fx, fy);
            }

            if wall_props(self.wall[idx]).fan {
                dx += self.fvx[idx];
                dy += self.fvy[idx];
            }

            out_p[x] = dp.clamp(MIN_PRESSURE, MAX_PRESSURE);
            out_vx[x] = dx.clamp(MIN_PRESSURE, MAX_PRESSURE);
            out_vy[x] = dy.clamp(MIN_PRESSURE, MAX_PRESSURE);
        }
    }

    /// Smooth + advect one row of air heat. Heat-blocked cells are neither
    /// read by the kernel nor by the advection sample.
    pub fn heat_row(&self, y: usize, out: &mut [f32]) {
        let (w, h) = (self.w, self.h);
        for x in 0..w {
            let idx = y * w + x;

            let (mut dh, mut dx, mut dy) = (0.0f32, 0.0f32, 0.0f32);
            for j in 0..3usize {
                for i in 0..3usize {
                    let f = self.kernel[j * 3 + i];
                    let src = match inner_neighbour(x + i, y + j, w, h, 2) {
                        Some(n) if !self.block_heat[n] => n,
                        _ => idx,
                    };
                    dh += self.hv[src] * f;
                    dx += self.vx[src] * f;
                    dy += self.vy[src] * f;
                }
            }

            let tx = x as f32 - dx * HEAT_ADV_DIST;
            let ty = y as f32 - dy * HEAT_ADV_DIST;
            let (ci, cj) = (tx.floor(), ty.floor());
            if ci >= 2.0 && cj >= 2.0 && ci < (w as f32 - 3.0) && cj < (h as f32 - 3.0) {
                let (fx, fy) = (tx - ci, ty - cj);
                let base = cj as usize * w + ci as usize;
                let own = dh;
                let sample = |n: usize| if self.block_heat[n] { own } else { self.hv[n] };
                dh = dh * (1.0 - AIR_VADV)
                    + AIR_VADV
                        * ((1.0 - fx) * (1.0 - fy) * sample(base)
                            + fx * (1.0 - fy) * sample(base + 1)
                            + (1.0 - fx) * fy * sample(base + w)
                            + fx * fy * sample(base + w + 1));
            }
            out[x] = dh;
        }
    }
}

/// Index of kernel tap `(sx - 1, sy - 1)` when it lies at least one cell
/// from the left/top edge and `far` cells from the right/bottom edge.
#[inline]
fn inner_neighbour(sx: usize, sy: usize, w: usize, h: usize, far: usize) -> Option<usize> {
    if sx < 2 || sy < 2 || sx + far > w || sy + far > h {
        return None;
    }
    Some((sy - 1) * w + sx - 1)
}
