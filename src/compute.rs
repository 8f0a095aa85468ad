/// Per-tick world rules.
///
/// Every public function takes an immutable reference to the current
/// `World` and returns a brand-new `World`.  Side effects are limited to the
/// injected RNG, so callers control determinism (tests use a seeded RNG).

use rand::Rng;

use crate::collision::{self, Hit};
use crate::config::Rules;
use crate::entities::{EntityId, Rect, Timestamp, World};
use crate::input::InputSample;
use crate::spawn::SpawnController;

/// What happened during one world tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Projectile fired this tick, if any.
    pub fired: Option<EntityId>,
    /// Adversary spawned this tick, if any.
    pub spawned: Option<EntityId>,
    /// Collisions resolved this tick.
    pub hits: Vec<Hit>,
    /// First adversary found past the bottom boundary.  Ends the round.
    pub breach: Option<EntityId>,
}

// ── Input-driven steps ───────────────────────────────────────────────────────

/// Apply held move controls.  Left and right together cancel out.
pub fn move_player(world: &World, input: InputSample, rules: &Rules) -> World {
    let mut dx = 0.0;
    if input.left {
        dx -= rules.player_speed;
    }
    if input.right {
        dx += rules.player_speed;
    }
    if dx == 0.0 {
        return world.clone();
    }

    let mut next = world.clone();
    next.place_player(world.player.rect.x + dx, rules);
    next
}

/// True when the fire cooldown has elapsed at `now`.
pub fn can_fire(world: &World, now: Timestamp, rules: &Rules) -> bool {
    world
        .last_fired_at
        .map_or(true, |last| now.millis_since(last) >= rules.fire_cooldown_ms)
}

/// Fire one projectile from the player's nose if the cooldown allows it.
pub fn player_fire(world: &World, now: Timestamp, rules: &Rules) -> (World, Option<EntityId>) {
    if !can_fire(world, now, rules) {
        return (world.clone(), None);
    }
    let player = &world.player.rect;
    let rect = Rect::new(
        player.x + player.width / 2.0 - rules.projectile_width / 2.0,
        player.y,
        rules.projectile_width,
        rules.projectile_height,
    );
    let mut next = world.clone();
    let id = next.insert_projectile(rect, now);
    (next, Some(id))
}

/// Possibly add one adversary.
pub fn spawn_adversary(
    world: &World,
    spawner: &SpawnController,
    rng: &mut impl Rng,
) -> (World, Option<EntityId>) {
    match spawner.roll(rng) {
        Some(rect) => {
            let mut next = world.clone();
            let id = next.insert_adversary(rect);
            log::debug!("spawned adversary {id} at x={:.1}", rect.x);
            (next, Some(id))
        }
        None => (world.clone(), None),
    }
}

// ── Movement & bounds ────────────────────────────────────────────────────────

/// Projectiles travel up, adversaries travel down.
pub fn advance(world: &World, rules: &Rules) -> World {
    World {
        projectiles: world
            .projectiles
            .iter()
            .map(|(id, p)| {
                let mut p = p.clone();
                p.rect = p.rect.translated(0.0, -rules.projectile_speed);
                (*id, p)
            })
            .collect(),
        adversaries: world
            .adversaries
            .iter()
            .map(|(id, a)| {
                let mut a = a.clone();
                a.rect = a.rect.translated(0.0, rules.adversary_speed);
                (*id, a)
            })
            .collect(),
        ..world.clone()
    }
}

/// Drop projectiles that have fully left through the top and adversaries
/// whose top edge reached the bottom.  Returns the first such adversary.
pub fn discard_out_of_bounds(world: &World, rules: &Rules) -> (World, Option<EntityId>) {
    let breach = world
        .adversaries
        .values()
        .find(|a| a.rect.y >= rules.world_height)
        .map(|a| a.id);

    let next = World {
        projectiles: world
            .projectiles
            .iter()
            .filter(|(_, p)| p.rect.bottom() > 0.0)
            .map(|(id, p)| (*id, p.clone()))
            .collect(),
        adversaries: world
            .adversaries
            .iter()
            .filter(|(_, a)| a.rect.y < rules.world_height)
            .map(|(id, a)| (*id, a.clone()))
            .collect(),
        ..world.clone()
    };
    (next, breach)
}

// ── Per-tick pipeline ────────────────────────────────────────────────────────

/// Advance the world by one tick:
/// move player → fire → spawn → advance → collide → discard.
pub fn tick(
    world: &World,
    input: InputSample,
    now: Timestamp,
    rules: &Rules,
    spawner: &SpawnController,
    rng: &mut impl Rng,
) -> (World, TickReport) {
    let world = move_player(world, input, rules);

    let (world, fired) = if input.fire {
        player_fire(&world, now, rules)
    } else {
        (world, None)
    };

    let (world, spawned) = spawn_adversary(&world, spawner, rng);
    let world = advance(&world, rules);
    let (world, hits) = collision::resolve(&world);
    let (mut world, breach) = discard_out_of_bounds(&world, rules);
    world.frame += 1;

    (
        world,
        TickReport {
            fired,
            spawned,
            hits,
            breach,
        },
    )
}
