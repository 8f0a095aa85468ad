/// Simulation constants and the tunable `Rules` built from them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default values for every rule.  Units are logical world units per tick
/// unless stated otherwise.
pub mod consts {
    /// Logical world size.
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    /// Player home position (top-left corner).
    pub const PLAYER_HOME_X: f32 = 375.0;
    pub const PLAYER_HOME_Y: f32 = 520.0;
    pub const PLAYER_SPEED: f32 = 5.0;

    pub const PROJECTILE_WIDTH: f32 = 4.0;
    pub const PROJECTILE_HEIGHT: f32 = 10.0;
    pub const PROJECTILE_SPEED: f32 = 8.0;
    /// Minimum time between two projectile creations (ms).
    pub const FIRE_COOLDOWN_MS: u64 = 200;

    pub const ADVERSARY_SIZE: f32 = 40.0;
    pub const ADVERSARY_SPEED: f32 = 2.0;
    /// Independent per-tick chance of a new adversary.
    pub const SPAWN_PROBABILITY: f64 = 0.02;

    pub const POINTS_PER_HIT: u32 = 10;

    /// Fixed simulation step (ms), ≈60 Hz.
    pub const TICK_INTERVAL_MS: u64 = 16;

    pub const LEADERBOARD_CAPACITY: usize = 10;
    pub const LEADERBOARD_NAME: &str = "Player";

    /// How long a key stays "held" after its last press/repeat event on
    /// terminals that never report releases.  The OS key-repeat rate is
    /// ≥ 15 Hz, so 133 ms is always refreshed before expiry.
    pub const DEFAULT_HOLD_WINDOW_MS: u64 = 133;
}

use consts::*;

/// Every tunable simulation value.  `Rules::default()` matches `consts`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub world_width: f32,
    pub world_height: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_home_x: f32,
    pub player_home_y: f32,
    pub player_speed: f32,
    pub projectile_width: f32,
    pub projectile_height: f32,
    pub projectile_speed: f32,
    pub fire_cooldown_ms: u64,
    pub adversary_size: f32,
    pub adversary_speed: f32,
    pub spawn_probability: f64,
    pub points_per_hit: u32,
    pub tick_interval_ms: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_home_x: PLAYER_HOME_X,
            player_home_y: PLAYER_HOME_Y,
            player_speed: PLAYER_SPEED,
            projectile_width: PROJECTILE_WIDTH,
            projectile_height: PROJECTILE_HEIGHT,
            projectile_speed: PROJECTILE_SPEED,
            fire_cooldown_ms: FIRE_COOLDOWN_MS,
            adversary_size: ADVERSARY_SIZE,
            adversary_speed: ADVERSARY_SPEED,
            spawn_probability: SPAWN_PROBABILITY,
            points_per_hit: POINTS_PER_HIT,
            tick_interval_ms: TICK_INTERVAL_MS,
        }
    }
}

impl Rules {
    /// Read rules from a JSON file.  Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let rules: Rules = serde_json::from_str(&text)?;
        rules.validate()?;
        log::info!("loaded rules from {}", path.display());
        Ok(rules)
    }

    /// Reject rule sets under which the world invariants cannot hold.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("player_speed", self.player_speed),
            ("projectile_width", self.projectile_width),
            ("projectile_height", self.projectile_height),
            ("projectile_speed", self.projectile_speed),
            ("adversary_size", self.adversary_size),
            ("adversary_speed", self.adversary_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if self.player_width > self.world_width {
            return Err(Error::Config("player is wider than the world".into()));
        }
        if self.adversary_size > self.world_width {
            return Err(Error::Config("adversary is wider than the world".into()));
        }
        if !(0.0..=self.world_width - self.player_width).contains(&self.player_home_x) {
            return Err(Error::Config(format!(
                "player_home_x {} is outside [0, {}]",
                self.player_home_x,
                self.world_width - self.player_width
            )));
        }
        if !(0.0..=1.0).contains(&self.spawn_probability) {
            return Err(Error::Config(format!(
                "spawn_probability must be within [0, 1], got {}",
                self.spawn_probability
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be non-zero".into()));
        }
        Ok(())
    }

    /// Rightmost legal player x.
    pub fn player_max_x(&self) -> f32 {
        self.world_width - self.player_width
    }
}
