//! Air - coarse pressure / velocity / heat solver
//!
//! One `update_air` per tick:
//! 1. damp the outer rows/columns (pressure x0.8, velocity x0.9)
//! 2. zero the velocity faces of air-blocking cells
//! 3. pressure from velocity divergence
//! 4. velocity from pressure gradient (faces touching a blocker stay zero)
//! 5. 3x3 kernel smoothing + semi-Lagrangian advection into scratch buffers,
//!    then copy back
//!
//! Step 5 only reads the arrays produced by 1-4 and writes scratch, so rows
//! are independent; with the `parallel` feature they run on rayon.
//!
//! Blocked cells are never read through: the kernel substitutes the cell's
//! own value for a blocked neighbour, and advection stops its back-trace
//! before entering one.

mod heat;
mod kernel;

use crate::core::config::AirMode;
use crate::spatial::fields::FieldGrid;

use kernel::{gaussian, AirView};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pressure gained per unit of velocity divergence
pub const AIR_TSTEPP: f32 = 0.3;
/// Velocity gained per unit of pressure gradient
pub const AIR_TSTEPV: f32 = 0.4;
/// Advection blend / distance factor
pub const AIR_VADV: f32 = 0.3;
pub const AIR_VLOSS: f32 = 0.999;
pub const AIR_PLOSS: f32 = 0.9999;

const EDGE_PRESSURE_DAMP: f32 = 0.8;
const EDGE_VELOCITY_DAMP: f32 = 0.9;

/// Solver scratch. Owned by the simulation so buffers are allocated once.
pub struct AirSolver {
    kernel: [f32; 9],
    opv: Vec<f32>,
    ovx: Vec<f32>,
    ovy: Vec<f32>,
    ohv: Vec<f32>,
}

impl AirSolver {
    pub fn new(size: usize) -> Self {
        Self {
            kernel: gaussian(),
            opv: vec![0.0; size],
            ovx: vec![0.0; size],
            ovy: vec![0.0; size],
            ohv: vec![0.0; size],
        }
    }

    fn fit(&mut self, size: usize) {
        if self.opv.len() != size {
            *self = Self::new(size);
        }
    }

    /// One pressure/velocity step, then the air mode's overrides
    pub fn update_air(&mut self, fields: &mut FieldGrid, mode: AirMode) {
        if mode == AirMode::NoUpdate {
            return;
        }
        self.fit(fields.size());
        let w = fields.cells_x() as usize;
        let h = fields.cells_y() as usize;

        damp_edges(fields, w, h);
        zero_blocked_faces(fields, w, h);
        pressure_from_divergence(fields, w, h);
        velocity_from_gradient(fields, w, h);
        self.smooth_and_advect(fields, w, h);

        match mode {
            AirMode::On | AirMode::NoUpdate => {}
            AirMode::NoPressure => fields.pv.fill(0.0),
            AirMode::NoVelocity => {
                fields.vx.fill(0.0);
                fields.vy.fill(0.0);
            }
            AirMode::Off => {
                fields.pv.fill(0.0);
                fields.vx.fill(0.0);
                fields.vy.fill(0.0);
            }
        }
    }

    fn smooth_and_advect(&mut self, fields: &mut FieldGrid, w: usize, h: usize) {
        {
            let view = AirView::of(fields, self.kernel, w, h);
            #[cfg(feature = "parallel")]
            {
                self.opv
                    .par_chunks_mut(w)
                    .zip(self.ovx.par_chunks_mut(w))
                    .zip(self.ovy.par_chunks_mut(w))
                    .enumerate()
                    .for_each(|(y, ((p, vx), vy))| view.air_row(y, p, vx, vy));
            }
            #[cfg(not(feature = "parallel"))]
            {
                for (y, ((p, vx), vy)) in self
                    .opv
                    .chunks_mut(w)
                    .zip(self.ovx.chunks_mut(w))
                    .zip(self.ovy.chunks_mut(w))
                    .enumerate()
                {
                    view.air_row(y, p, vx, vy);
                }
            }
        }
        fields.pv.copy_from_slice(&self.opv);
        fields.vx.copy_from_slice(&self.ovx);
        fields.vy.copy_from_slice(&self.ovy);
    }

    /// Air heat: edges pinned to the ambient baseline, kernel smoothing
    /// that respects heat-blocking walls, advection with the air, and
    /// buoyancy pushing air up under hotter air when gravity is vertical
    pub fn update_air_heat(&mut self, fields: &mut FieldGrid, gravity_vertical: bool) {
        self.fit(fields.size());
        let w = fields.cells_x() as usize;
        let h = fields.cells_y() as usize;
        heat::pin_edges(fields, w, h);
        {
            let view = AirView::of(fields, self.kernel, w, h);
            #[cfg(feature = "parallel")]
            {
                self.ohv
                    .par_chunks_mut(w)
                    .enumerate()
                    .for_each(|(y, out)| view.heat_row(y, out));
            }
            #[cfg(not(feature = "parallel"))]
            {
                for (y, out) in self.ohv.chunks_mut(w).enumerate() {
                    view.heat_row(y, out);
                }
            }
        }
        if gravity_vertical {
            heat::buoyancy(fields, w, h);
        }
        fields.hv.copy_from_slice(&self.ohv);
    }
}

/// Rows / columns touched by edge damping: the first `lead` and the last two
fn edge_lines(n: usize, lead: usize) -> impl Iterator<Item = usize> {
    let head = 0..lead.min(n);
    let tail = n.saturating_sub(2).max(lead.min(n))..n;
    head.chain(tail)
}

fn damp_edges(fields: &mut FieldGrid, w: usize, h: usize) {
    for y in 0..h {
        for x in edge_lines(w, 3) {
            fields.pv[y * w + x] *= EDGE_PRESSURE_DAMP;
        }
        for x in edge_lines(w, 2) {
            fields.vx[y * w + x] *= EDGE_VELOCITY_DAMP;
            fields.vy[y * w + x] *= EDGE_VELOCITY_DAMP;
        }
    }
    for x in 0..w {
        for y in edge_lines(h, 3) {
            fields.pv[y * w + x] *= EDGE_PRESSURE_DAMP;
        }
        for y in edge_lines(h, 2) {
            fields.vx[y * w + x] *= EDGE_VELOCITY_DAMP;
            fields.vy[y * w + x] *= EDGE_VELOCITY_DAMP;
        }
    }
}

/// A blocked cell owns no flow through any of its faces
fn zero_blocked_faces(fields: &mut FieldGrid, w: usize, h: usize) {
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            if !fields.block_air[idx] {
                continue;
            }
            fields.vx[idx] = 0.0;
            fields.vy[idx] = 0.0;
            if x > 0 {
                fields.vx[idx - 1] = 0.0;
            }
            if y > 0 {
                fields.vy[idx - w] = 0.0;
            }
        }
    }
}

fn pressure_from_divergence(fields: &mut FieldGrid, w: usize, h: usize) {
    for y in 1..h {
        for x in 1..w {
            let idx = y * w + x;
            let dp = (fields.vx[idx - 1] - fields.vx[idx]) + (fields.vy[idx - w] - fields.vy[idx]);
            let pv = fast_mut!(fields.pv, [idx]);
            *pv = *pv * AIR_PLOSS + dp * AIR_TSTEPP;
        }
    }
}

fn velocity_from_gradient(fields: &mut FieldGrid, w: usize, h: usize) {
    for y in 0..h.saturating_sub(1) {
        for x in 0..w.saturating_sub(1) {
            let idx = y * w + x;
            let dx = fields.pv[idx] - fields.pv[idx + 1];
            let dy = fields.pv[idx] - fields.pv[idx + w];
            fields.vx[idx] = fields.vx[idx] * AIR_VLOSS + dx * AIR_TSTEPV;
            fields.vy[idx] = fields.vy[idx] * AIR_VLOSS + dy * AIR_TSTEPV;
            if fields.block_air[idx] || fields.block_air[idx + 1] {
                fields.vx[idx] = 0.0;
            }
            if fields.block_air[idx] || fields.block_air[idx + w] {
                fields.vy[idx] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::walls::WL_WALL;
    use crate::spatial::fields::Field;

    fn grid() -> FieldGrid {
        FieldGrid::new(128, 64).unwrap()
    }

    #[test]
    fn kernel_sums_to_one() {
        let k = gaussian();
        let s: f32 = k.iter().sum();
        assert!((s - 1.0).abs() < 1e-6);
        assert!(k[4] > k[1] && k[1] > k[0]);
    }

    #[test]
    fn pressure_spreads_in_open_air() {
        let mut f = grid();
        let mut air = AirSolver::new(f.size());
        f.set(Field::Pressure, 16, 8, 100.0);
        air.update_air(&mut f, AirMode::On);
        assert!(f.get(Field::Pressure, 16, 8) < 100.0);
        assert!(f.get(Field::Pressure, 17, 8) > 0.0);
        assert!(f.get(Field::VelocityX, 16, 8) > 0.0);
    }

    #[test]
    fn blocking_column_leaks_nothing() {
        let mut f = grid();
        let mut air = AirSolver::new(f.size());
        for cy in 0..f.cells_y() {
            f.set_wall(16, cy, WL_WALL);
        }
        for cy in 0..f.cells_y() {
            for cx in 0..16 {
                f.set(Field::Pressure, cx, cy, 50.0);
            }
        }
        for _ in 0..20 {
            air.update_air(&mut f, AirMode::On);
        }
        for cy in 0..f.cells_y() {
            for cx in 17..f.cells_x() {
                assert_eq!(f.get(Field::Pressure, cx, cy), 0.0, "leak at ({cx}, {cy})");
                assert_eq!(f.get(Field::VelocityX, cx, cy), 0.0);
            }
        }
    }

    #[test]
    fn air_modes_override_fields() {
        let mut f = grid();
        let mut air = AirSolver::new(f.size());
        f.set(Field::Pressure, 10, 10, 20.0);
        f.set(Field::VelocityX, 10, 10, 3.0);
        air.update_air(&mut f, AirMode::NoPressure);
        assert!(f.field_slice(Field::Pressure).iter().all(|&v| v == 0.0));
        assert!(f.field_slice(Field::VelocityX).iter().any(|&v| v != 0.0));

        air.update_air(&mut f, AirMode::Off);
        assert!(f.field_slice(Field::VelocityX).iter().all(|&v| v == 0.0));

        f.set(Field::Pressure, 10, 10, 7.0);
        air.update_air(&mut f, AirMode::NoUpdate);
        assert_eq!(f.get(Field::Pressure, 10, 10), 7.0);
    }

    #[test]
    fn fan_pushes_air() {
        let mut f = grid();
        let mut air = AirSolver::new(f.size());
        f.set_wall(10, 10, crate::domain::walls::WL_FAN);
        f.set_fan_velocity(10, 10, 2.0, 0.0);
        air.update_air(&mut f, AirMode::On);
        assert!(f.get(Field::VelocityX, 10, 10) > 0.0);
    }

    #[test]
    fn heat_relaxes_to_ambient_at_edges() {
        let mut f = grid();
        let mut air = AirSolver::new(f.size());
        f.set(Field::Heat, 0, 5, 5000.0);
        f.set(Field::Heat, 20, 10, 5000.0);
        air.update_air_heat(&mut f, true);
        assert!((f.get(Field::Heat, 0, 5) - f.get(Field::Ambient, 0, 5)).abs() < 1e-2);
        assert!(f.get(Field::Heat, 20, 10) < 5000.0);
        assert!(f.get(Field::Heat, 21, 10) > f.get(Field::Ambient, 21, 10));
    }

    #[test]
    fn heat_wall_blocks_conduction() {
        let mut f = grid();
        let mut air = AirSolver::new(f.size());
        let ambient = f.get(Field::Ambient, 0, 0);
        for cy in 0..f.cells_y() {
            f.set_wall(16, cy, WL_WALL);
            for cx in 3..16 {
                f.set(Field::Heat, cx, cy, 2000.0);
            }
        }
        for _ in 0..10 {
            air.update_air_heat(&mut f, false);
        }
        for cy in 0..f.cells_y() {
            for cx in 17..f.cells_x() {
                assert!((f.get(Field::Heat, cx, cy) - ambient).abs() < 1e-2, "heat leak at ({cx}, {cy})");
            }
        }
    }

    #[test]
    fn edge_lines_cover_both_ends() {
        assert_eq!(edge_lines(10, 3).collect::<Vec<_>>(), vec![0, 1, 2, 8, 9]);
        assert_eq!(edge_lines(10, 2).collect::<Vec<_>>(), vec![0, 1, 8, 9]);
        assert_eq!(edge_lines(3, 3).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(edge_lines(1, 2).collect::<Vec<_>>(), vec![0]);
    }
}
