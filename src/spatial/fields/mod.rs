//! Coarse field grid
//!
//! Structure of arrays, one entry per `CELL x CELL` block of fine pixels:
//! pressure, air velocity, air heat, the ambient heat baseline, wall ids,
//! wall electricity and fan velocity, plus the per-tick air/heat blocking
//! masks derived from the walls.
//!
//! Accessors take coarse coordinates and do not validate them in release
//! builds; staying in range is the caller's obligation.

mod walls;

use crate::core::config::DEFAULT_AMBIENT_TEMP;
use crate::core::error::EngineError;
use crate::domain::walls::WallId;

/// Fine pixels per coarse cell edge
pub const CELL: u32 = 4;

pub const MAX_PRESSURE: f32 = 256.0;
pub const MIN_PRESSURE: f32 = -256.0;

/// Scalar fields reachable through the generic primitives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Pressure,
    VelocityX,
    VelocityY,
    Heat,
    Ambient,
}

pub struct FieldGrid {
    cells_x: u32,
    cells_y: u32,
    size: usize,

    pub(crate) pv: Vec<f32>,
    pub(crate) vx: Vec<f32>,
    pub(crate) vy: Vec<f32>,
    pub(crate) hv: Vec<f32>,
    pub(crate) ambient: Vec<f32>,

    pub(crate) wall: Vec<WallId>,
    pub(crate) emap: Vec<u8>,
    pub(crate) fvx: Vec<f32>,
    pub(crate) fvy: Vec<f32>,
    pub(crate) block_air: Vec<bool>,
    pub(crate) block_heat: Vec<bool>,
}

impl FieldGrid {
    /// Fine-pixel dimensions must be non-zero multiples of `CELL`
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        if width == 0 || height == 0 || width % CELL != 0 || height % CELL != 0 {
            return Err(EngineError::BadDimensions { width, height, cell: CELL });
        }
        let cells_x = width / CELL;
        let cells_y = height / CELL;
        let size = (cells_x * cells_y) as usize;
        Ok(Self {
            cells_x,
            cells_y,
            size,
            pv: vec![0.0; size],
            vx: vec![0.0; size],
            vy: vec![0.0; size],
            hv: vec![DEFAULT_AMBIENT_TEMP; size],
            ambient: vec![DEFAULT_AMBIENT_TEMP; size],
            wall: vec![0; size],
            emap: vec![0; size],
            fvx: vec![0.0; size],
            fvy: vec![0.0; size],
            block_air: vec![false; size],
            block_heat: vec![false; size],
        })
    }

    #[inline]
    pub fn cells_x(&self) -> u32 {
        self.cells_x
    }

    #[inline]
    pub fn cells_y(&self) -> u32 {
        self.cells_y
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn in_bounds(&self, cx: i32, cy: i32) -> bool {
        cx >= 0 && cy >= 0 && (cx as u32) < self.cells_x && (cy as u32) < self.cells_y
    }

    #[inline(always)]
    pub fn index(&self, cx: u32, cy: u32) -> usize {
        (cy * self.cells_x + cx) as usize
    }

    /// Coarse cell holding fine pixel `(x, y)`
    #[inline(always)]
    pub fn cell_of(x: i32, y: i32) -> (u32, u32) {
        (x as u32 / CELL, y as u32 / CELL)
    }

    #[inline(always)]
    fn slice(&self, field: Field) -> &[f32] {
        match field {
            Field::Pressure => &self.pv,
            Field::VelocityX => &self.vx,
            Field::VelocityY => &self.vy,
            Field::Heat => &self.hv,
            Field::Ambient => &self.ambient,
        }
    }

    #[inline(always)]
    fn slice_mut(&mut self, field: Field) -> &mut [f32] {
        match field {
            Field::Pressure => &mut self.pv,
            Field::VelocityX => &mut self.vx,
            Field::VelocityY => &mut self.vy,
            Field::Heat => &mut self.hv,
            Field::Ambient => &mut self.ambient,
        }
    }

    // === Generic primitives ===

    #[inline]
    pub fn get(&self, field: Field, cx: u32, cy: u32) -> f32 {
        let idx = self.index(cx, cy);
        *fast!(self.slice(field), [idx])
    }

    #[inline]
    pub fn set(&mut self, field: Field, cx: u32, cy: u32, value: f32) {
        let idx = self.index(cx, cy);
        fast!(self.slice_mut(field), [idx] = value);
    }

    #[inline]
    pub fn add(&mut self, field: Field, cx: u32, cy: u32, delta: f32) {
        let idx = self.index(cx, cy);
        *fast_mut!(self.slice_mut(field), [idx]) += delta;
    }

    /// Move the cell towards `target` by `weight` (0 = keep, 1 = replace)
    #[inline]
    pub fn blend(&mut self, field: Field, cx: u32, cy: u32, target: f32, weight: f32) {
        let idx = self.index(cx, cy);
        let v = fast_mut!(self.slice_mut(field), [idx]);
        *v += (target - *v) * weight;
    }

    /// Hand `fraction` of the cell's value out evenly to its in-range,
    /// non air-blocked 4-neighbours. The total is conserved.
    pub fn diffuse(&mut self, field: Field, cx: u32, cy: u32, fraction: f32) {
        let (cxi, cyi) = (cx as i32, cy as i32);
        let mut targets = [0usize; 4];
        let mut n = 0;
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let (nx, ny) = (cxi + dx, cyi + dy);
            if !self.in_bounds(nx, ny) {
                continue;
            }
            let ni = self.index(nx as u32, ny as u32);
            if self.block_air[ni] {
                continue;
            }
            targets[n] = ni;
            n += 1;
        }
        if n == 0 {
            return;
        }
        let idx = self.index(cx, cy);
        let data = self.slice_mut(field);
        let out = data[idx] * fraction;
        data[idx] -= out;
        let share = out / n as f32;
        for &t in &targets[..n] {
            data[t] += share;
        }
    }

    /// Pressure at the cell holding fine pixel `(x, y)`
    #[inline]
    pub fn pressure_at_pixel(&self, x: i32, y: i32) -> f32 {
        let (cx, cy) = Self::cell_of(x, y);
        self.get(Field::Pressure, cx, cy)
    }

    /// Clamp pressure and velocity into `[MIN_PRESSURE, MAX_PRESSURE]` and
    /// air heat into the temperature range. Idempotent.
    pub fn clamp_fields(&mut self) {
        use crate::elements::clamp_temp;
        for v in self.pv.iter_mut().chain(self.vx.iter_mut()).chain(self.vy.iter_mut()) {
            *v = clamp_pressure(*v);
        }
        for h in self.hv.iter_mut() {
            *h = clamp_temp(*h);
        }
    }

    /// Zero air, reset heat to the ambient baseline; walls are kept
    pub fn reset_air(&mut self) {
        self.pv.fill(0.0);
        self.vx.fill(0.0);
        self.vy.fill(0.0);
        self.hv.copy_from_slice(&self.ambient);
    }

    /// Everything back to construction state with `ambient` as baseline
    pub fn reset(&mut self, ambient: f32) {
        self.ambient.fill(ambient);
        self.reset_air();
        self.wall.fill(0);
        self.emap.fill(0);
        self.fvx.fill(0.0);
        self.fvy.fill(0.0);
        self.block_air.fill(false);
        self.block_heat.fill(false);
    }

    // === Raw access for bulk copy ===

    pub fn field_slice(&self, field: Field) -> &[f32] {
        self.slice(field)
    }

    pub fn field_ptr(&self, field: Field) -> *const f32 {
        self.slice(field).as_ptr()
    }

    pub fn walls_slice(&self) -> &[WallId] {
        &self.wall
    }
}

/// NaN pressure collapses to zero
#[inline]
pub fn clamp_pressure(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(MIN_PRESSURE, MAX_PRESSURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> FieldGrid {
        FieldGrid::new(32, 16).unwrap()
    }

    #[test]
    fn dimensions_follow_cell_size() {
        let g = grid();
        assert_eq!((g.cells_x(), g.cells_y()), (8, 4));
        assert!(FieldGrid::new(30, 16).is_err());
        assert!(FieldGrid::new(0, 16).is_err());
        assert_eq!(FieldGrid::cell_of(7, 13), (1, 3));
    }

    #[test]
    fn primitives_read_modify_write() {
        let mut g = grid();
        g.set(Field::Pressure, 2, 1, 4.0);
        g.add(Field::Pressure, 2, 1, 1.0);
        assert_eq!(g.get(Field::Pressure, 2, 1), 5.0);
        g.blend(Field::Pressure, 2, 1, 1.0, 0.5);
        assert_eq!(g.get(Field::Pressure, 2, 1), 3.0);
    }

    #[test]
    fn diffuse_conserves_total() {
        let mut g = grid();
        g.set(Field::Pressure, 0, 0, 8.0);
        g.diffuse(Field::Pressure, 0, 0, 0.5);
        assert_eq!(g.get(Field::Pressure, 0, 0), 4.0);
        assert_eq!(g.get(Field::Pressure, 1, 0), 2.0);
        assert_eq!(g.get(Field::Pressure, 0, 1), 2.0);
        let total: f32 = g.field_slice(Field::Pressure).iter().sum();
        assert_eq!(total, 8.0);
    }

    #[test]
    fn clamp_is_idempotent() {
        let mut g = grid();
        g.set(Field::Pressure, 1, 1, 900.0);
        g.set(Field::VelocityX, 1, 1, f32::NAN);
        g.set(Field::Heat, 1, 1, -40.0);
        g.clamp_fields();
        let snapshot = (g.pv.clone(), g.vx.clone(), g.hv.clone());
        g.clamp_fields();
        assert_eq!(snapshot, (g.pv.clone(), g.vx.clone(), g.hv.clone()));
        assert_eq!(g.get(Field::Pressure, 1, 1), MAX_PRESSURE);
        assert_eq!(g.get(Field::VelocityX, 1, 1), 0.0);
        assert_eq!(g.get(Field::Heat, 1, 1), 0.0);
    }

    #[test]
    fn reset_restores_baseline() {
        let mut g = grid();
        g.set(Field::Heat, 3, 3, 1000.0);
        g.set_wall(3, 3, 1);
        g.reset(300.0);
        assert_eq!(g.get(Field::Heat, 3, 3), 300.0);
        assert_eq!(g.wall_at(3, 3), 0);
    }
}
