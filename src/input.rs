/// Held-control tracking.
///
/// Input model: instead of acting on each key event, we remember every
/// control that is currently down and sample the whole set once per tick.
/// This lets Fire and a move control be held at the same time with no
/// interference.
///
/// Two classes of input source are supported:
/// * **Press/release capable** — a control is held from press to release.
/// * **Press-only** (classic terminals, where OS key-repeat shows up as
///   repeated presses) — configure a hold window; a control expires once no
///   press or repeat has arrived for that long.

use std::collections::HashMap;
use std::time::Duration;

use crate::entities::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    MoveLeft,
    MoveRight,
    Fire,
}

/// The controls held at one instant.  Immutable once sampled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSample {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl InputSample {
    pub const NONE: InputSample = InputSample {
        left: false,
        right: false,
        fire: false,
    };

    pub fn is_held(&self, control: Control) -> bool {
        match control {
            Control::MoveLeft => self.left,
            Control::MoveRight => self.right,
            Control::Fire => self.fire,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InputState {
    /// Each held control → the last time a press/repeat was seen.
    held: HashMap<Control, Timestamp>,
    hold_window_ms: Option<u64>,
}

impl InputState {
    /// Press/release input: controls stay held until released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Press-only input: controls expire `window` after their last press.
    pub fn with_hold_window(window: Duration) -> Self {
        Self {
            held: HashMap::new(),
            hold_window_ms: Some(u64::try_from(window.as_millis()).unwrap_or(u64::MAX)),
        }
    }

    /// Press or key-repeat.
    pub fn press(&mut self, control: Control, at: Timestamp) {
        self.held.insert(control, at);
    }

    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, control: Control, now: Timestamp) -> bool {
        self.held
            .get(&control)
            .map(|&last| match self.hold_window_ms {
                Some(window) => now.millis_since(last) <= window,
                None => true,
            })
            .unwrap_or(false)
    }

    /// Read the held set once for a tick.
    pub fn sample(&self, now: Timestamp) -> InputSample {
        InputSample {
            left: self.is_held(Control::MoveLeft, now),
            right: self.is_held(Control::MoveRight, now),
            fire: self.is_held(Control::Fire, now),
        }
    }
}
