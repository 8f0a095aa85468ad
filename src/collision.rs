/// Projectile ↔ adversary collision resolution.
///
/// Resolution happens in two steps: `find_hits` computes the complete list
/// of matched pairs from one view of the world, then `remove_hits` filters
/// both live collections from that same list.  Neither collection is ever
/// re-derived from a separately mutated copy of the other.

use std::collections::BTreeSet;

use crate::entities::{EntityId, World};

/// One projectile consuming one adversary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub projectile: EntityId,
    pub adversary: EntityId,
}

/// All matched pairs for this tick.
///
/// Projectiles are visited in id order; each one consumes the first
/// overlapping adversary (in id order) not already consumed.  So every
/// projectile and every adversary appears in at most one hit.
pub fn find_hits(world: &World) -> Vec<Hit> {
    let mut consumed: BTreeSet<EntityId> = BTreeSet::new();
    let mut hits = Vec::new();

    for projectile in world.projectiles.values() {
        let target = world
            .adversaries
            .values()
            .find(|a| !consumed.contains(&a.id) && projectile.rect.overlaps(&a.rect));
        if let Some(adversary) = target {
            consumed.insert(adversary.id);
            hits.push(Hit {
                projectile: projectile.id,
                adversary: adversary.id,
            });
        }
    }

    hits
}

/// Remove every entity named in `hits`, one filter pass per collection.
pub fn remove_hits(world: &World, hits: &[Hit]) -> World {
    if hits.is_empty() {
        return world.clone();
    }
    let dead_projectiles: BTreeSet<EntityId> = hits.iter().map(|h| h.projectile).collect();
    let dead_adversaries: BTreeSet<EntityId> = hits.iter().map(|h| h.adversary).collect();

    World {
        projectiles: world
            .projectiles
            .iter()
            .filter(|(id, _)| !dead_projectiles.contains(id))
            .map(|(id, p)| (*id, p.clone()))
            .collect(),
        adversaries: world
            .adversaries
            .iter()
            .filter(|(id, _)| !dead_adversaries.contains(id))
            .map(|(id, a)| (*id, a.clone()))
            .collect(),
        ..world.clone()
    }
}

/// Detect and remove this tick's collisions.  Returns the new world and
/// the hits that were applied.
pub fn resolve(world: &World) -> (World, Vec<Hit>) {
    let hits = find_hits(world);
    for hit in &hits {
        log::debug!("projectile {} hit adversary {}", hit.projectile, hit.adversary);
    }
    (remove_hits(world, &hits), hits)
}
