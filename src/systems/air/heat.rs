use crate::spatial::fields::FieldGrid;

/// Air heat difference divided by this becomes upward velocity
const BUOYANCY_DIV: f32 = 5000.0;

/// Outer two rows and columns go back to the ambient baseline
pub(super) fn pin_edges(fields: &mut FieldGrid, w: usize, h: usize) {
    let cols = [0, 1, w.saturating_sub(2), w.saturating_sub(1)];
    let rows = [0, 1, h.saturating_sub(2), h.saturating_sub(1)];
    for y in 0..h {
        for &x in &cols {
            let idx = y * w + x;
            fields.hv[idx] = fields.ambient[idx];
        }
    }
    for &y in &rows {
        for x in 0..w {
            let idx = y * w + x;
            fields.hv[idx] = fields.ambient[idx];
        }
    }
}

/// Air under hotter air is pushed upwards (vertical gravity only)
pub(super) fn buoyancy(fields: &mut FieldGrid, w: usize, h: usize) {
    for y in 1..h {
        for x in 0..w {
            let idx = y * w + x;
            let above = idx - w;
            let diff = fields.hv[above] - fields.hv[idx];
            if diff > 0.0 && !fields.block_heat[above] {
                fields.vy[idx] -= diff / BUOYANCY_DIV;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::fields::Field;

    #[test]
    fn hot_air_above_lifts_the_cell_below() {
        let mut f = FieldGrid::new(32, 32).unwrap();
        let ambient = f.get(Field::Heat, 4, 4);
        f.set(Field::Heat, 4, 3, ambient + 500.0);
        buoyancy(&mut f, 8, 8);
        assert!((f.get(Field::VelocityY, 4, 4) + 0.1).abs() < 1e-5);
        assert_eq!(f.get(Field::VelocityY, 4, 2), 0.0);
    }
}
