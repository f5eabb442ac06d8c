use std::collections::{HashMap, HashSet};

use tracing::info;

use super::actor::{Actor, ActorId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HitReport {
    pub(crate) attacker: ActorId,
    pub(crate) target: ActorId,
    pub(crate) damage: u32,
    pub(crate) knocked_out: bool,
}

/// Matches exposed attack hitboxes against body boxes once per tick.
///
/// Each attacker keeps the set of targets its current swing already
/// connected with; the set is dropped as soon as the hitbox disappears, so
/// one swing damages a given target at most once.
#[derive(Debug, Default)]
pub(crate) struct CombatResolver {
    hit_ledger: HashMap<ActorId, HashSet<ActorId>>,
}

impl CombatResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn hits_recorded(&self, attacker: ActorId) -> usize {
        self.hit_ledger.get(&attacker).map_or(0, HashSet::len)
    }

    pub(crate) fn resolve(&mut self, actors: &mut [Box<dyn Actor>]) -> Vec<HitReport> {
        let mut reports = Vec::new();

        for attacker_index in 0..actors.len() {
            let attacker = &actors[attacker_index];
            let attacker_id = attacker.id();
            let hitbox = attacker
                .attack_bounding_box()
                .filter(|_| attacker.is_alive());
            let Some(hitbox) = hitbox else {
                self.hit_ledger.remove(&attacker_id);
                continue;
            };
            let power = attacker.current_attack_power();
            if power == 0 {
                continue;
            }
            let attacker_x = attacker.position().x;
            let attacker_is_ai = !attacker.is_player_controlled();

            for target_index in 0..actors.len() {
                if target_index == attacker_index {
                    continue;
                }
                let target = &mut actors[target_index];
                if !target.is_alive() || (attacker_is_ai && !target.is_player_controlled()) {
                    continue;
                }
                let target_id = target.id();
                let already_hit = self
                    .hit_ledger
                    .get(&attacker_id)
                    .is_some_and(|hit| hit.contains(&target_id));
                if already_hit || !hitbox.overlaps(&target.bounding_box()) {
                    continue;
                }

                target.take_damage(power, Some(attacker_x));
                target.provoke(attacker_id);
                self.hit_ledger
                    .entry(attacker_id)
                    .or_default()
                    .insert(target_id);

                let report = HitReport {
                    attacker: attacker_id,
                    target: target_id,
                    damage: power,
                    knocked_out: !target.is_alive(),
                };
                info!(
                    attacker = attacker_id.0,
                    target = target_id.0,
                    damage = power,
                    hp_left = target.vitals().hp,
                    knocked_out = report.knocked_out,
                    "actor_hit"
                );
                reports.push(report);
            }
        }

        self.hit_ledger
            .retain(|attacker, _| actors.iter().any(|actor| actor.id() == *attacker));
        reports
    }
}
