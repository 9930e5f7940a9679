//! Temperature - conduction, air coupling and phase transitions
//!
//! Conduction is stochastic: a particle joins an exchange with probability
//! `heat_conduct / 250` per tick. When it does, it and every conducting
//! Plain neighbour settle at their heat-capacity weighted mean.
//!
//! Air coupling moves a fixed fraction of the particle/air difference into
//! the particle and takes the same amount out of the coarse cell.

mod perf;

pub use perf::{reset_heat_perf_counters, take_heat_perf_counters};

use crate::core::parts::ParticleStore;
use crate::core::random::SimRng;
use crate::domain::content::ContentRegistry;
use crate::elements::{clamp_temp, ElementId, ElementProps, PROP_NOAMBHEAT};
use crate::spatial::fields::{Field, FieldGrid};
use crate::systems::behaviors::NEIGHBOURS;

/// Share of the particle/air difference exchanged per tick
pub const AIR_HEAT_RATE: f32 = 0.04;
/// Per-tick cap on one particle/air exchange
pub const AIR_HEAT_MAX_STEP: f32 = 250.0;
/// Denominator of the conduction roll
const CONDUCT_ROLL: u32 = 250;

/// Exchange heat between `slot` and the coarse air cell it sits in
pub fn couple_air(parts: &mut ParticleStore, fields: &mut FieldGrid, props: &ElementProps, slot: usize) {
    if props.heat_conduct == 0 || props.has(PROP_NOAMBHEAT) {
        return;
    }
    let p = parts.part_mut(slot);
    let (x, y) = p.pixel();
    let (cx, cy) = FieldGrid::cell_of(x, y);
    let air = fields.get(Field::Heat, cx, cy);
    let step = ((air - p.temp) * AIR_HEAT_RATE).clamp(-AIR_HEAT_MAX_STEP, AIR_HEAT_MAX_STEP);
    p.temp = clamp_temp(p.temp + step);
    fields.add(Field::Heat, cx, cy, -step);
}

/// Heat-capacity weighted equilibration of `slot` with its conducting
/// Plain neighbours. Returns true when an exchange happened.
pub fn conduct(
    parts: &mut ParticleStore,
    content: &ContentRegistry,
    rng: &mut SimRng,
    slot: usize,
) -> bool {
    let p = *parts.part(slot);
    let props = content.element(p.element);
    if props.heat_conduct == 0 || rng.below(CONDUCT_ROLL) >= props.heat_conduct as u32 {
        return false;
    }

    let own_cap = props.heat_capacity();
    let mut heat = p.temp * own_cap;
    let mut cap = own_cap;
    let mut group = [0usize; 8];
    let mut n = 0;

    let (x, y) = p.pixel();
    for (dx, dy) in NEIGHBOURS {
        let (nx, ny) = (x + dx, y + dy);
        if !parts.in_bounds(nx, ny) {
            continue;
        }
        let Some(o) = parts.occupancy().plain_at(nx, ny) else {
            continue;
        };
        let other = parts.part(o);
        let c = content.element(other.element).heat_capacity();
        if c <= 0.0 {
            continue;
        }
        heat += other.temp * c;
        cap += c;
        group[n] = o;
        n += 1;
    }
    if n == 0 || cap <= 0.0 {
        return false;
    }

    let settled = clamp_temp(heat / cap);
    parts.part_mut(slot).temp = settled;
    for &o in &group[..n] {
        parts.part_mut(o).temp = settled;
    }
    perf::count_conduction();
    true
}

/// Element a particle with `props` turns into at `temp` and `pressure`, if
/// any. `EL_NONE` means the particle should vanish. Temperature rules are
/// skipped when `heat` is off; pressure rules always apply.
pub fn transition_target(props: &ElementProps, temp: f32, pressure: f32, heat: bool) -> Option<ElementId> {
    let hit = if heat {
        props
            .high_temp
            .filter(|t| temp > t.threshold)
            .or_else(|| props.low_temp.filter(|t| temp < t.threshold))
    } else {
        None
    };
    let hit = hit
        .or_else(|| props.high_pressure.filter(|t| pressure > t.threshold))
        .or_else(|| props.low_pressure.filter(|t| pressure < t.threshold));
    if hit.is_some() {
        perf::count_transition();
    }
    hit.map(|t| t.to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parts::SlotHint;
    use crate::elements::{Transition, EL_ICE, EL_METAL, EL_STEAM, EL_WATER, ROOM_TEMP};

    fn store_with(content: &ContentRegistry, cells: &[(i32, i32, ElementId, f32)]) -> (ParticleStore, Vec<usize>) {
        let mut parts = ParticleStore::new(16, 16, 32);
        let slots = cells
            .iter()
            .map(|&(x, y, el, t)| {
                let s = parts
                    .create(SlotHint::Auto, x, y, el, content.element(el).is_energy())
                    .unwrap();
                parts.part_mut(s).temp = t;
                s
            })
            .collect();
        (parts, slots)
    }

    #[test]
    fn conduction_conserves_weighted_heat() {
        let content = ContentRegistry::from_builtin();
        let (mut parts, s) = store_with(&content, &[(4, 4, EL_METAL, 1000.0), (5, 4, EL_METAL, 200.0)]);
        let mut rng = SimRng::new(1);
        // metal conducts at 251/250: always rolls in
        assert!(conduct(&mut parts, &content, &mut rng, s[0]));
        assert!((parts.part(s[0]).temp - 600.0).abs() < 1e-2);
        assert_eq!(parts.part(s[0]).temp, parts.part(s[1]).temp);
    }

    #[test]
    fn lone_particle_keeps_its_heat() {
        let content = ContentRegistry::from_builtin();
        let (mut parts, s) = store_with(&content, &[(4, 4, EL_METAL, 1000.0)]);
        let mut rng = SimRng::new(1);
        assert!(!conduct(&mut parts, &content, &mut rng, s[0]));
        assert_eq!(parts.part(s[0]).temp, 1000.0);
    }

    #[test]
    fn air_coupling_moves_heat_both_ways() {
        let content = ContentRegistry::from_builtin();
        let (mut parts, s) = store_with(&content, &[(1, 1, EL_METAL, ROOM_TEMP + 100.0)]);
        let mut fields = FieldGrid::new(16, 16).unwrap();
        let before = fields.get(Field::Heat, 0, 0) + parts.part(s[0]).temp;
        couple_air(&mut parts, &mut fields, content.element(EL_METAL), s[0]);
        assert!((parts.part(s[0]).temp - (ROOM_TEMP + 96.0)).abs() < 1e-3);
        let after = fields.get(Field::Heat, 0, 0) + parts.part(s[0]).temp;
        assert!((before - after).abs() < 1e-3);
    }

    #[test]
    fn transitions_follow_thresholds() {
        let content = ContentRegistry::from_builtin();
        let water = content.element(EL_WATER);
        assert_eq!(transition_target(water, 400.0, 0.0, true), Some(EL_STEAM));
        assert_eq!(transition_target(water, 250.0, 0.0, true), Some(EL_ICE));
        assert_eq!(transition_target(water, 300.0, 0.0, true), None);
        assert_eq!(transition_target(water, 400.0, 0.0, false), None);

        let crushable = ElementProps {
            high_pressure: Some(Transition::new(10.0, EL_WATER)),
            ..ElementProps::INERT
        };
        assert_eq!(transition_target(&crushable, 300.0, 11.0, false), Some(EL_WATER));
    }
}
