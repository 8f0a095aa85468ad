use rand::Rng;

use crate::config::Rules;
use crate::entities::Rect;

/// Decides, once per tick, whether a new adversary enters the world.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnController {
    probability: f64,
    size: f32,
    max_x: f32,
}

impl SpawnController {
    pub fn new(rules: &Rules) -> Self {
        Self {
            // NaN survives `clamp` and would panic in `gen_bool`.
            probability: if rules.spawn_probability.is_nan() {
                0.0
            } else {
                rules.spawn_probability.clamp(0.0, 1.0)
            },
            size: rules.adversary_size,
            max_x: (rules.world_width - rules.adversary_size).max(0.0),
        }
    }

    /// With the configured probability, the rect of a new adversary placed
    /// at a uniformly random x, fully inside the world width, entering from
    /// just above the top boundary.
    pub fn roll(&self, rng: &mut impl Rng) -> Option<Rect> {
        if !rng.gen_bool(self.probability) {
            return None;
        }
        let x = rng.gen_range(0.0..=self.max_x);
        Some(Rect::new(x, -self.size, self.size, self.size))
    }
}
