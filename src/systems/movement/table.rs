use std::collections::HashMap;

use crate::domain::content::ContentRegistry;
use crate::elements::{ElementId, ElementProps, CAT_POWDER, PROP_PHOTPASS};

use super::hooks::{MoveHook, MoveQuery};
use super::{MoveRule, MoveVerdict};

/// Static (mover, occupant) table plus the hooks behind `Dynamic` entries.
/// Rebuilt whenever content changes; hooks survive the rebuild.
#[derive(Clone)]
pub struct MoveRules {
    n: usize,
    table: Vec<MoveRule>,
    hooks: HashMap<(ElementId, ElementId), MoveHook>,
}

impl MoveRules {
    pub fn build(content: &ContentRegistry) -> Self {
        let mut rules = Self {
            n: 0,
            table: Vec::new(),
            hooks: HashMap::new(),
        };
        rules.rebuild(content);
        rules
    }

    pub fn rebuild(&mut self, content: &ContentRegistry) {
        let n = content.element_count();
        let mut table = vec![MoveRule::Block; n * n];
        for m in 0..n {
            let mover = content.element(m as ElementId);
            for o in 0..n {
                let occupant = content.element(o as ElementId);
                table[m * n + o] = static_rule(mover, occupant);
            }
        }
        self.n = n;
        self.table = table;
        for &(m, o) in self.hooks.keys() {
            if (m as usize) < n && (o as usize) < n {
                self.table[m as usize * n + o as usize] = MoveRule::Dynamic;
            }
        }
    }

    #[inline]
    pub fn rule(&self, mover: ElementId, occupant: ElementId) -> MoveRule {
        let (m, o) = (mover as usize, occupant as usize);
        if m >= self.n || o >= self.n {
            return MoveRule::Block;
        }
        *fast!(self.table, [m * self.n + o])
    }

    /// Override one pair with a fixed rule (clears any hook for it)
    pub fn set_rule(&mut self, mover: ElementId, occupant: ElementId, rule: MoveRule) {
        let (m, o) = (mover as usize, occupant as usize);
        if m >= self.n || o >= self.n {
            return;
        }
        self.hooks.remove(&(mover, occupant));
        self.table[m * self.n + o] = rule;
    }

    /// Route a pair through `hook`
    pub fn set_hook(&mut self, mover: ElementId, occupant: ElementId, hook: MoveHook) {
        self.hooks.insert((mover, occupant), hook);
        let (m, o) = (mover as usize, occupant as usize);
        if m < self.n && o < self.n {
            self.table[m * self.n + o] = MoveRule::Dynamic;
        }
    }

    /// Resolve a table rule to a verdict, consulting the hook when needed
    #[inline]
    pub fn resolve(&self, rule: MoveRule, query: &MoveQuery) -> MoveVerdict {
        match rule {
            MoveRule::Allow => MoveVerdict::Allow,
            MoveRule::AllowButSlow => MoveVerdict::AllowButSlow,
            MoveRule::Block => MoveVerdict::Block,
            MoveRule::Dynamic => self
                .hooks
                .get(&(query.mover.element, query.occupant.element))
                .and_then(|hook| (**hook)(query))
                .unwrap_or(MoveVerdict::Block),
        }
    }
}

fn static_rule(mover: &ElementProps, occupant: &ElementProps) -> MoveRule {
    if mover.is_energy() {
        return if occupant.is_energy() || occupant.has(PROP_PHOTPASS) {
            MoveRule::Allow
        } else {
            MoveRule::Block
        };
    }
    if occupant.is_energy() {
        return MoveRule::Allow;
    }
    if occupant.is_solid() || mover.weight <= occupant.weight {
        return MoveRule::Block;
    }
    if mover.category == CAT_POWDER && occupant.is_liquid() {
        return MoveRule::AllowButSlow;
    }
    MoveRule::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{EL_DUST, EL_GAS, EL_GLASS, EL_METAL, EL_PHOTON, EL_STONE, EL_WATER};

    #[test]
    fn base_table_rules() {
        let content = ContentRegistry::from_builtin();
        let rules = MoveRules::build(&content);
        assert_eq!(rules.rule(EL_DUST, EL_WATER), MoveRule::AllowButSlow);
        assert_eq!(rules.rule(EL_WATER, EL_DUST), MoveRule::Block);
        assert_eq!(rules.rule(EL_WATER, EL_GAS), MoveRule::Allow);
        assert_eq!(rules.rule(EL_STONE, EL_METAL), MoveRule::Block);
        assert_eq!(rules.rule(EL_DUST, EL_DUST), MoveRule::Block);
        assert_eq!(rules.rule(EL_PHOTON, EL_GLASS), MoveRule::Allow);
        assert_eq!(rules.rule(EL_PHOTON, EL_METAL), MoveRule::Block);
        assert_eq!(rules.rule(EL_PHOTON, EL_PHOTON), MoveRule::Allow);
        assert_eq!(rules.rule(200, EL_DUST), MoveRule::Block);
    }

    #[test]
    fn hooks_survive_rebuild() {
        let content = ContentRegistry::from_builtin();
        let mut rules = MoveRules::build(&content);
        rules.set_hook(EL_WATER, EL_DUST, crate::systems::movement::move_hook(|_q| Some(MoveVerdict::Allow)));
        rules.rebuild(&content);
        assert_eq!(rules.rule(EL_WATER, EL_DUST), MoveRule::Dynamic);
        rules.set_rule(EL_WATER, EL_DUST, MoveRule::Block);
        assert_eq!(rules.rule(EL_WATER, EL_DUST), MoveRule::Block);
    }
}
