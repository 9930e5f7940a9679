use crate::core::parts::Particle;
use crate::core::random::SimRng;
use crate::elements::ElementProps;
use crate::spatial::fields::{Field, FieldGrid};

/// Particle pushes on the air of its cell: the cell keeps `air_loss` of its
/// own velocity and picks up `air_drag` of the particle's. Hot elements add
/// pressure.
#[inline]
pub fn drag_air(fields: &mut FieldGrid, cell: (u32, u32), p: &Particle, props: &ElementProps) {
    let (cx, cy) = cell;
    let ax = fields.get(Field::VelocityX, cx, cy);
    let ay = fields.get(Field::VelocityY, cx, cy);
    fields.set(Field::VelocityX, cx, cy, ax * props.air_loss + props.air_drag * p.vx);
    fields.set(Field::VelocityY, cx, cy, ay * props.air_loss + props.air_drag * p.vy);
    if props.hot_air != 0.0 {
        fields.add(Field::Pressure, cx, cy, props.hot_air);
    }
}

/// Velocity update: `loss` damping, air advection, gravity, then random
/// diffusion for elements that have it
#[inline]
pub fn accelerate(
    p: &mut Particle,
    props: &ElementProps,
    air: (f32, f32),
    gravity: (f32, f32),
    rng: &mut SimRng,
) {
    p.vx *= props.loss;
    p.vy *= props.loss;
    p.vx += props.advection * air.0 + gravity.0;
    p.vy += props.advection * air.1 + gravity.1;
    if props.diffusion != 0.0 {
        p.vx += props.diffusion * rng.signed_unit();
        p.vy += props.diffusion * rng.signed_unit();
    }
    if !p.vx.is_finite() {
        p.vx = 0.0;
    }
    if !p.vy.is_finite() {
        p.vy = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BASE_ELEMENTS, EL_DUST, EL_FIRE, EL_WATER};

    #[test]
    fn resting_liquid_gains_exactly_gravity() {
        let water = &BASE_ELEMENTS[EL_WATER as usize];
        let mut p = Particle { element: EL_WATER, ..Particle::DEAD };
        let mut rng = SimRng::new(3);
        accelerate(&mut p, water, (0.0, 0.0), (0.0, water.gravity), &mut rng);
        assert_eq!((p.vx, p.vy), (0.0, 0.1));
    }

    #[test]
    fn air_carries_light_particles() {
        let dust = &BASE_ELEMENTS[EL_DUST as usize];
        let mut p = Particle { element: EL_DUST, ..Particle::DEAD };
        let mut rng = SimRng::new(3);
        accelerate(&mut p, dust, (2.0, 0.0), (0.0, 0.0), &mut rng);
        assert!((p.vx - 1.4).abs() < 1e-6);
    }

    #[test]
    fn moving_particle_drags_air_and_heats_it() {
        let fire = &BASE_ELEMENTS[EL_FIRE as usize];
        let mut fields = FieldGrid::new(8, 8).unwrap();
        fields.set(Field::VelocityX, 1, 1, 1.0);
        let p = Particle { element: EL_FIRE, vx: 2.0, ..Particle::DEAD };
        drag_air(&mut fields, (1, 1), &p, fire);
        let expect = 1.0 * fire.air_loss + fire.air_drag * 2.0;
        assert!((fields.get(Field::VelocityX, 1, 1) - expect).abs() < 1e-6);
        assert!(fields.get(Field::Pressure, 1, 1) > 0.0);
    }
}
