/// All game entity types — pure data, no game rules.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::Rules;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in world units; `(x, y)` is the top-left corner and
/// y grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// A copy of this rect shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// A copy of this rect with its x replaced.
    pub fn with_x(&self, x: f32) -> Self {
        Self { x, ..*self }
    }

    /// Strict AABB overlap; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

// ── Identity & time ───────────────────────────────────────────────────────────

/// Stable identifier of a projectile or adversary.  Allocated from a
/// per-world counter, never reused while the world lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Milliseconds on the simulation clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is later.
    pub fn millis_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn plus_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

// ── Round state ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundState {
    #[default]
    Menu,
    Playing,
    GameOver,
}

// ── Player, projectiles, adversaries ──────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub rect: Rect,
    /// When the projectile was fired.  Used only for the fire cooldown.
    pub created_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Adversary {
    pub id: EntityId,
    pub rect: Rect,
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Everything that moves.  Cloneable so the per-tick functions in
/// `compute` can return a new world without mutating the previous one.
///
/// Live collections are keyed by id; a `BTreeMap` keeps iteration in id
/// (creation) order so collision resolution is deterministic.
#[derive(Clone, Debug)]
pub struct World {
    pub(crate) player: Player,
    pub(crate) projectiles: BTreeMap<EntityId, Projectile>,
    pub(crate) adversaries: BTreeMap<EntityId, Adversary>,
    /// Creation time of the most recently fired projectile, whether or not
    /// it is still alive.
    pub(crate) last_fired_at: Option<Timestamp>,
    pub(crate) next_id: u64,
    pub(crate) frame: u64,
}

impl World {
    /// Fresh world: player at home, nothing else alive.
    pub fn new(rules: &Rules) -> Self {
        Self {
            player: Player {
                rect: Rect::new(
                    rules.player_home_x,
                    rules.player_home_y,
                    rules.player_width,
                    rules.player_height,
                ),
            },
            projectiles: BTreeMap::new(),
            adversaries: BTreeMap::new(),
            last_fired_at: None,
            next_id: 0,
            frame: 0,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> + '_ {
        self.projectiles.values()
    }

    pub fn adversaries(&self) -> impl Iterator<Item = &Adversary> + '_ {
        self.adversaries.values()
    }

    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    pub fn adversary(&self, id: EntityId) -> Option<&Adversary> {
        self.adversaries.get(&id)
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn adversary_count(&self) -> usize {
        self.adversaries.len()
    }

    pub fn last_fired_at(&self) -> Option<Timestamp> {
        self.last_fired_at
    }

    /// Number of world ticks applied since the round began.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Move the player horizontally, clamped to the world.
    pub fn place_player(&mut self, x: f32, rules: &Rules) {
        let x = x.min(rules.player_max_x()).max(0.0);
        self.player.rect = self.player.rect.with_x(x);
    }

    /// Add a projectile.  Records `created_at` as the latest fire time.
    pub fn insert_projectile(&mut self, rect: Rect, created_at: Timestamp) -> EntityId {
        let id = self.allocate_id();
        self.projectiles.insert(id, Projectile { id, rect, created_at });
        self.last_fired_at = Some(created_at);
        id
    }

    pub fn insert_adversary(&mut self, rect: Rect) -> EntityId {
        let id = self.allocate_id();
        self.adversaries.insert(id, Adversary { id, rect });
        id
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}
