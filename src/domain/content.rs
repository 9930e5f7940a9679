use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;
use crate::elements::{
    BehaviorKind, CategoryId, ElementFlags, ElementId, ElementProps, Transition, BASE_BEHAVIORS,
    BASE_ELEMENTS, BASE_KEYS, CAT_ENERGY, CAT_GAS, CAT_LIQUID, CAT_POWDER, CAT_SOLID, EL_FIRE,
    EL_GAS, EL_LAVA, EL_NONE, EL_STEAM, EL_STONE, EL_WATER, MAX_ELEMENT_ID_COUNT, PROP_CONDUCTS,
    PROP_LIFE_DEC, PROP_LIFE_KILL, PROP_LIFE_KILL_DEC, PROP_NOAMBHEAT, PROP_NONE, PROP_PHOTPASS,
};
use crate::reactions::{Reaction, REACTION_LUT_SIZE};

/// Every registered element descriptor plus the lookup tables derived from
/// them. Owned by the simulation behind an `Arc`; swapping content means
/// building a new registry.
#[derive(Clone)]
pub struct ContentRegistry {
    elements: Vec<ElementProps>,
    behavior_kind_by_id: Vec<BehaviorKind>,
    reaction_lut: Vec<Option<Reaction>>,
    element_key_to_id: HashMap<String, ElementId>,
    element_manifest: Vec<ContentManifestElement>,
}

impl ContentRegistry {
    pub fn from_bundle_json(json: &str) -> Result<Self, EngineError> {
        let bundle: BundleRoot = serde_json::from_str(json)?;
        Self::from_bundle(bundle)
    }

    /// The base element set with its reaction table
    pub fn from_builtin() -> Self {
        let elements = BASE_ELEMENTS.to_vec();
        let mut element_key_to_id = HashMap::new();
        let mut element_manifest = Vec::with_capacity(elements.len());

        for (idx, props) in elements.iter().enumerate() {
            let key = BASE_KEYS[idx].to_string();
            element_key_to_id.insert(key.clone(), idx as ElementId);
            element_manifest.push(manifest_entry(idx as ElementId, key, props));
        }

        let mut registry = Self {
            elements,
            behavior_kind_by_id: BASE_BEHAVIORS.to_vec(),
            reaction_lut: vec![None; REACTION_LUT_SIZE],
            element_key_to_id,
            element_manifest,
        };

        // Water quenches lava into stone and boils off
        registry.set_reaction(EL_WATER, EL_LAVA, Reaction::new(EL_STONE, EL_STEAM, 128, EL_NONE));
        // Fire spreads through gas (also handled by flammability, this is the fast path)
        registry.set_reaction(EL_FIRE, EL_GAS, Reaction::new(EL_FIRE, Reaction::NO_CHANGE, 200, EL_NONE));

        registry
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn is_valid_element_id(&self, id: ElementId) -> bool {
        (id as usize) < self.elements.len()
    }

    /// Live particle types (anything registered except `EL_NONE`)
    #[inline]
    pub fn is_particle(&self, id: ElementId) -> bool {
        id != EL_NONE && self.is_valid_element_id(id)
    }

    pub fn props(&self, id: ElementId) -> Option<&ElementProps> {
        self.elements.get(id as usize)
    }

    /// Descriptor lookup for ids already known to be registered (the
    /// dispatch loop only sees ids that passed `create`)
    #[inline]
    pub fn element(&self, id: ElementId) -> &ElementProps {
        &self.elements[id as usize]
    }

    pub fn behavior_kind(&self, id: ElementId) -> BehaviorKind {
        self.behavior_kind_by_id
            .get(id as usize)
            .copied()
            .unwrap_or(BehaviorKind::None)
    }

    pub fn reaction(&self, aggressor: ElementId, victim: ElementId) -> Option<&Reaction> {
        let idx = ((aggressor as usize) << 8) | (victim as usize);
        self.reaction_lut.get(idx)?.as_ref()
    }

    pub fn set_reaction(&mut self, aggressor: ElementId, victim: ElementId, reaction: Reaction) {
        let idx = ((aggressor as usize) << 8) | (victim as usize);
        self.reaction_lut[idx] = Some(reaction);
    }

    pub fn clear_reaction(&mut self, aggressor: ElementId, victim: ElementId) {
        let idx = ((aggressor as usize) << 8) | (victim as usize);
        self.reaction_lut[idx] = None;
    }

    /// True when `aggressor` has any reaction at all (lets the reaction
    /// behavior skip its neighbour scan)
    pub fn has_reactions(&self, aggressor: ElementId) -> bool {
        let base = (aggressor as usize) << 8;
        self.reaction_lut[base..base + 256].iter().any(Option::is_some)
    }

    pub fn id_by_key(&self, key: &str) -> Option<ElementId> {
        self.element_key_to_id.get(key).copied()
    }

    pub fn key_of(&self, id: ElementId) -> Option<&str> {
        self.element_manifest.get(id as usize).map(|m| m.key.as_str())
    }

    /// Register a new element under the next free id.
    ///
    /// Transition targets must already be registered (or be the new id
    /// itself).
    pub fn register_element(
        &mut self,
        key: &str,
        props: ElementProps,
        behavior: BehaviorKind,
    ) -> Result<ElementId, EngineError> {
        let next = self.elements.len();
        if next >= MAX_ELEMENT_ID_COUNT {
            return Err(EngineError::TooManyElements(next as u16));
        }
        let id = next as ElementId;
        if let Some(existing) = self.element_key_to_id.get(key) {
            return Err(EngineError::DuplicateElement(*existing));
        }
        for t in [props.low_pressure, props.high_pressure, props.low_temp, props.high_temp]
            .into_iter()
            .flatten()
        {
            if (t.to as usize) > next {
                return Err(EngineError::BadTransition { id, target: t.to as u16 });
            }
        }

        self.elements.push(props);
        self.behavior_kind_by_id.push(behavior);
        self.element_key_to_id.insert(key.to_string(), id);
        self.element_manifest.push(manifest_entry(id, key.to_string(), &props));
        debug!("registered element {} as id {}", key, id);
        Ok(id)
    }

    pub fn manifest_json(&self) -> String {
        let out = ContentManifest {
            format_version: 1,
            elements: &self.element_manifest,
        };
        serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
    }

    fn from_bundle(bundle: BundleRoot) -> Result<Self, EngineError> {
        let mut max_id: u16 = 0;
        for el in bundle.elements.iter() {
            if el.id > max_id {
                max_id = el.id;
            }
        }

        if max_id as usize >= MAX_ELEMENT_ID_COUNT {
            return Err(EngineError::TooManyElements(max_id));
        }

        let len = (max_id as usize) + 1;
        let mut props_by_id: Vec<Option<ElementProps>> = vec![None; len];
        let mut behavior_by_id: Vec<Option<BehaviorKind>> = vec![None; len];
        let mut manifest_by_id: Vec<Option<ContentManifestElement>> = vec![None; len];

        let mut element_key_to_id = HashMap::new();

        for el in bundle.elements.into_iter() {
            let id = el.id as ElementId;
            let idx = id as usize;
            if props_by_id[idx].is_some() {
                return Err(EngineError::DuplicateElement(id));
            }

            let category = category_from_str(&el.category)?;
            let behavior = match el.behavior.as_deref() {
                None => BehaviorKind::None,
                Some(s) => behavior_kind_from_str(s)?,
            };

            let transition = |t: Option<BundleTransition>| -> Result<Option<Transition>, EngineError> {
                match t {
                    None => Ok(None),
                    Some(t) if t.to_id > max_id => Err(EngineError::BadTransition { id, target: t.to_id }),
                    Some(t) => Ok(Some(Transition::new(t.threshold as f32, t.to_id as ElementId))),
                }
            };

            let props = ElementProps {
                color: el.color,
                category,
                flags: flags_from_bundle(&el.flags),
                advection: el.advection as f32,
                air_drag: el.air_drag as f32,
                air_loss: el.air_loss as f32,
                hot_air: el.hot_air as f32,
                loss: el.loss as f32,
                collision: el.collision as f32,
                gravity: el.gravity as f32,
                diffusion: el.diffusion as f32,
                falldown: el.falldown,
                weight: el.weight,
                hardness: el.hardness,
                flammable: el.flammable,
                meltable: el.meltable,
                heat_conduct: el.heat_conduct,
                default_temp: el.default_temp as f32,
                default_life: el.default_life,
                default_tmp: el.default_tmp,
                low_pressure: transition(el.low_pressure)?,
                high_pressure: transition(el.high_pressure)?,
                low_temp: transition(el.low_temp)?,
                high_temp: transition(el.high_temp)?,
            };

            props_by_id[idx] = Some(props);
            behavior_by_id[idx] = Some(behavior);

            let key = el.key;
            element_key_to_id.insert(key.clone(), id);

            manifest_by_id[idx] = Some(ContentManifestElement {
                id,
                key,
                pack: el.pack,
                name: el.name,
                color: el.color,
                hidden: el.hidden,
            });
        }

        if props_by_id.get(EL_NONE as usize).and_then(|v| *v).is_none() {
            return Err(EngineError::MissingElement(EL_NONE as usize));
        }

        for (k, v) in bundle.element_key_to_id.into_iter() {
            if v as usize >= MAX_ELEMENT_ID_COUNT {
                return Err(EngineError::TooManyElements(v));
            }
            let id8 = v as ElementId;
            match element_key_to_id.get(&k) {
                Some(existing) if *existing == id8 => {}
                Some(existing) => {
                    return Err(EngineError::KeyMismatch {
                        key: k,
                        map: v,
                        elements: *existing,
                    });
                }
                None => {
                    element_key_to_id.insert(k, id8);
                }
            }
        }

        let mut elements = Vec::with_capacity(props_by_id.len());
        let mut behavior_kind_by_id = Vec::with_capacity(props_by_id.len());
        let mut element_manifest = Vec::with_capacity(props_by_id.len());

        for idx in 0..props_by_id.len() {
            let props = props_by_id[idx].ok_or(EngineError::MissingElement(idx))?;
            let kind = behavior_by_id[idx].unwrap_or(BehaviorKind::None);
            let meta = manifest_by_id[idx]
                .clone()
                .ok_or(EngineError::MissingElement(idx))?;

            elements.push(props);
            behavior_kind_by_id.push(kind);
            element_manifest.push(meta);
        }

        let mut reaction_lut = vec![None; REACTION_LUT_SIZE];
        for r in bundle.reactions.into_iter() {
            for id in [Some(r.aggressor_id), Some(r.victim_id), Some(r.result_victim_id), r.result_aggressor_id, r.spawn_id]
                .into_iter()
                .flatten()
            {
                if id > max_id {
                    return Err(EngineError::MissingElement(id as usize));
                }
            }

            let aggressor = r.aggressor_id as ElementId;
            let victim = r.victim_id as ElementId;
            let aggressor_becomes = match r.result_aggressor_id {
                None => Reaction::NO_CHANGE,
                Some(v) => v as ElementId,
            };
            let spawn = r.spawn_id.map(|v| v as ElementId).unwrap_or(EL_NONE);

            let idx = ((aggressor as usize) << 8) | (victim as usize);
            reaction_lut[idx] = Some(Reaction::new(
                r.result_victim_id as ElementId,
                aggressor_becomes,
                chance_to_u8(r.chance),
                spawn,
            ));
        }

        info!("content bundle loaded: {} elements", elements.len());

        Ok(Self {
            elements,
            behavior_kind_by_id,
            reaction_lut,
            element_key_to_id,
            element_manifest,
        })
    }
}

impl Default for ContentRegistry {
    fn default() -> Self {
        Self::from_builtin()
    }
}

fn manifest_entry(id: ElementId, key: String, props: &ElementProps) -> ContentManifestElement {
    let mut it = key.splitn(2, ':');
    let pack = it.next().map(|s| s.to_string());
    let name = it.next().map(|s| s.to_string());
    ContentManifestElement {
        id,
        key,
        pack,
        name,
        color: props.color,
        hidden: id == EL_NONE,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentManifest<'a> {
    format_version: u32,
    elements: &'a [ContentManifestElement],
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentManifestElement {
    id: ElementId,
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    color: u32,
    hidden: bool,
}

fn chance_to_u8(chance: f64) -> u8 {
    let v = (chance * 255.0).round();
    if v <= 0.0 {
        0
    } else if v >= 255.0 {
        255
    } else {
        v as u8
    }
}

fn behavior_kind_from_str(s: &str) -> Result<BehaviorKind, EngineError> {
    match s {
        "reactive" => Ok(BehaviorKind::Reactive),
        "fire" => Ok(BehaviorKind::Fire),
        "energy_photon" => Ok(BehaviorKind::Photon),
        "energy_spark" => Ok(BehaviorKind::Spark),
        "utility_clone" => Ok(BehaviorKind::UtilityClone),
        "utility_void" => Ok(BehaviorKind::UtilityVoid),
        _ => Err(EngineError::UnknownBehavior(s.to_string())),
    }
}

fn category_from_str(s: &str) -> Result<CategoryId, EngineError> {
    match s {
        "solid" => Ok(CAT_SOLID),
        "powder" => Ok(CAT_POWDER),
        "liquid" => Ok(CAT_LIQUID),
        "gas" => Ok(CAT_GAS),
        "energy" => Ok(CAT_ENERGY),
        _ => Err(EngineError::UnknownCategory(s.to_string())),
    }
}

fn flags_from_bundle(f: &BundleElementFlags) -> ElementFlags {
    let mut flags = PROP_NONE;
    if f.conducts {
        flags |= PROP_CONDUCTS;
    }
    if f.photpass {
        flags |= PROP_PHOTPASS;
    }
    if f.life_dec {
        flags |= PROP_LIFE_DEC;
    }
    if f.life_kill {
        flags |= PROP_LIFE_KILL;
    }
    if f.life_kill_dec {
        flags |= PROP_LIFE_KILL_DEC;
    }
    if f.no_amb_heat {
        flags |= PROP_NOAMBHEAT;
    }
    flags
}

fn default_air_loss() -> f64 {
    0.9
}

fn default_temp() -> f64 {
    crate::elements::ROOM_TEMP as f64
}

fn default_weight() -> i32 {
    100
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleRoot {
    elements: Vec<BundleElement>,
    #[serde(default)]
    element_key_to_id: HashMap<String, u16>,
    #[serde(default)]
    reactions: Vec<BundleReaction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleElement {
    id: u16,
    key: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    pack: Option<String>,
    category: String,
    color: u32,
    #[serde(default)]
    flags: BundleElementFlags,
    #[serde(default)]
    advection: f64,
    #[serde(default)]
    air_drag: f64,
    #[serde(default = "default_air_loss")]
    air_loss: f64,
    #[serde(default)]
    hot_air: f64,
    #[serde(default)]
    loss: f64,
    #[serde(default)]
    collision: f64,
    #[serde(default)]
    gravity: f64,
    #[serde(default)]
    diffusion: f64,
    #[serde(default)]
    falldown: u8,
    #[serde(default = "default_weight")]
    weight: i32,
    #[serde(default)]
    hardness: u16,
    #[serde(default)]
    flammable: u16,
    #[serde(default)]
    meltable: u16,
    #[serde(default)]
    heat_conduct: u8,
    #[serde(default = "default_temp")]
    default_temp: f64,
    #[serde(default)]
    default_life: i32,
    #[serde(default)]
    default_tmp: i32,
    #[serde(default)]
    low_pressure: Option<BundleTransition>,
    #[serde(default)]
    high_pressure: Option<BundleTransition>,
    #[serde(default)]
    low_temp: Option<BundleTransition>,
    #[serde(default)]
    high_temp: Option<BundleTransition>,
    #[serde(default)]
    behavior: Option<String>,
    #[serde(default)]
    hidden: bool,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BundleElementFlags {
    conducts: bool,
    photpass: bool,
    life_dec: bool,
    life_kill: bool,
    life_kill_dec: bool,
    no_amb_heat: bool,
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleTransition {
    threshold: f64,
    to_id: u16,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleReaction {
    aggressor_id: u16,
    victim_id: u16,
    #[serde(default)]
    result_aggressor_id: Option<u16>,
    result_victim_id: u16,
    #[serde(default)]
    spawn_id: Option<u16>,
    chance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BASE_ELEMENT_COUNT, CAT_POWDER, EL_DUST};

    const TINY_BUNDLE: &str = r#"{
        "elements": [
            {"id": 0, "key": "t:none", "category": "solid", "color": 0, "weight": 0},
            {"id": 1, "key": "t:salt", "category": "powder", "color": 4294967295,
             "gravity": 0.1, "falldown": 1, "weight": 40, "heatConduct": 20,
             "highTemp": {"threshold": 1000.0, "toId": 2}},
            {"id": 2, "key": "t:brine", "category": "liquid", "color": 255,
             "flags": {"conducts": true}, "behavior": "reactive"}
        ],
        "elementKeyToId": {"t:salt": 1},
        "reactions": [
            {"aggressorId": 2, "victimId": 1, "resultVictimId": 0, "chance": 1.0}
        ]
    }"#;

    #[test]
    fn builtin_registry_resolves_keys() {
        let reg = ContentRegistry::from_builtin();
        assert_eq!(reg.element_count(), BASE_ELEMENT_COUNT);
        assert_eq!(reg.id_by_key("base:dust"), Some(EL_DUST));
        assert_eq!(reg.key_of(EL_WATER), Some("base:water"));
        assert!(reg.reaction(EL_WATER, EL_LAVA).is_some());
        assert!(reg.has_reactions(EL_WATER));
        assert!(!reg.has_reactions(EL_DUST));
    }

    #[test]
    fn cleared_reaction_stops_matching() {
        let mut reg = ContentRegistry::from_builtin();
        reg.clear_reaction(EL_WATER, EL_LAVA);
        assert!(reg.reaction(EL_WATER, EL_LAVA).is_none());
    }

    #[test]
    fn bundle_parses_props_transitions_and_reactions() {
        let reg = ContentRegistry::from_bundle_json(TINY_BUNDLE).unwrap();
        assert_eq!(reg.element_count(), 3);
        let salt = reg.props(1).unwrap();
        assert_eq!(salt.category, CAT_POWDER);
        assert_eq!(salt.high_temp, Some(Transition::new(1000.0, 2)));
        assert!(reg.props(2).unwrap().has(PROP_CONDUCTS));
        assert_eq!(reg.behavior_kind(2), BehaviorKind::Reactive);
        let r = reg.reaction(2, 1).unwrap();
        assert_eq!(r.victim_becomes, EL_NONE);
        assert_eq!(r.chance, 255);
    }

    #[test]
    fn bundle_rejects_dangling_transition() {
        let json = r#"{"elements": [
            {"id": 0, "key": "t:none", "category": "solid", "color": 0,
             "lowTemp": {"threshold": 1.0, "toId": 9}}
        ]}"#;
        assert!(matches!(
            ContentRegistry::from_bundle_json(json),
            Err(EngineError::BadTransition { .. })
        ));
    }

    #[test]
    fn bundle_rejects_holes_and_unknown_categories() {
        let hole = r#"{"elements": [
            {"id": 0, "key": "t:none", "category": "solid", "color": 0},
            {"id": 2, "key": "t:x", "category": "solid", "color": 0}
        ]}"#;
        assert!(matches!(
            ContentRegistry::from_bundle_json(hole),
            Err(EngineError::MissingElement(1))
        ));

        let bad_cat = r#"{"elements": [
            {"id": 0, "key": "t:none", "category": "plasma", "color": 0}
        ]}"#;
        assert!(matches!(
            ContentRegistry::from_bundle_json(bad_cat),
            Err(EngineError::UnknownCategory(_))
        ));
    }

    #[test]
    fn register_element_appends_and_rejects_duplicates() {
        let mut reg = ContentRegistry::from_builtin();
        let props = ElementProps {
            category: CAT_POWDER,
            ..ElementProps::INERT
        };
        let id = reg.register_element("mod:salt", props, BehaviorKind::None).unwrap();
        assert_eq!(id as usize, BASE_ELEMENT_COUNT);
        assert_eq!(reg.id_by_key("mod:salt"), Some(id));
        assert!(reg.register_element("mod:salt", props, BehaviorKind::None).is_err());
    }

    #[test]
    fn registration_stops_below_the_reserved_id() {
        let mut reg = ContentRegistry::from_builtin();
        let mut last = 0;
        for i in BASE_ELEMENT_COUNT..MAX_ELEMENT_ID_COUNT {
            last = reg.register_element(&format!("mod:e{i}"), ElementProps::INERT, BehaviorKind::None).unwrap();
        }
        assert_eq!(last, 254);
        assert!(matches!(
            reg.register_element("mod:overflow", ElementProps::INERT, BehaviorKind::None),
            Err(EngineError::TooManyElements(255))
        ));
        assert_ne!(last, Reaction::NO_CHANGE);
    }

    #[test]
    fn manifest_lists_every_element() {
        let reg = ContentRegistry::from_builtin();
        let v: serde_json::Value = serde_json::from_str(&reg.manifest_json()).unwrap();
        assert_eq!(v["formatVersion"], 1);
        assert_eq!(v["elements"].as_array().unwrap().len(), BASE_ELEMENT_COUNT);
        assert_eq!(v["elements"][0]["hidden"], true);
    }
}
