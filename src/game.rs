/// Round state machine and the command surface.
///
/// ```text
///   Menu ──start──▶ Playing ──adversary reaches bottom──▶ GameOver
///    ▲                 │                                     │
///    └──────exit───────┴─────────────exit────────────────────┤
///                      ▲                                     │
///                      └───────────────replay────────────────┘
/// ```
///
/// `Game` exclusively owns the world, the score and the round state.  The
/// outside sees them only through `Snapshot`.  Commands that do not apply
/// in the current state return `false` and change nothing.

use rand::Rng;

use crate::compute::{self, TickReport};
use crate::config::consts::LEADERBOARD_NAME;
use crate::config::Rules;
use crate::entities::{Adversary, EntityId, Player, Projectile, Rect, RoundState, Timestamp, World};
use crate::input::InputSample;
use crate::score::{Leaderboard, LeaderboardEntry, ScoreTracker};
use crate::spawn::SpawnController;
use crate::store::{HighScoreStore, LeaderboardStore};

// ── Presentation boundary ─────────────────────────────────────────────────────

/// Read-only view handed to the presentation layer.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub state: RoundState,
    pub score: u32,
    pub best_score: u32,
    world: &'a World,
}

impl<'a> Snapshot<'a> {
    pub fn player(&self) -> &'a Player {
        self.world.player()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &'a Projectile> + 'a {
        self.world.projectiles()
    }

    pub fn adversaries(&self) -> impl Iterator<Item = &'a Adversary> + 'a {
        self.world.adversaries()
    }
}

/// Anything that presents a snapshot once per tick.
pub trait RenderSink {
    type Error;

    fn present(&mut self, snapshot: &Snapshot<'_>) -> Result<(), Self::Error>;
}

// ── Tick results ──────────────────────────────────────────────────────────────

/// How a finished round was committed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub score: u32,
    /// Set when the round beat the previous best.
    pub new_best: Option<u32>,
    /// Leaderboard position of this round, if it made the board.
    pub rank: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Not playing; nothing happened.
    Idle,
    Running(TickReport),
    RoundOver(TickReport, RoundSummary),
}

// ── Game ──────────────────────────────────────────────────────────────────────

pub struct Game<H, L> {
    rules: Rules,
    spawner: SpawnController,
    state: RoundState,
    world: World,
    score: ScoreTracker,
    leaderboard: Leaderboard,
    last_round: Option<RoundSummary>,
    high_scores: H,
    boards: L,
}

impl<H: HighScoreStore, L: LeaderboardStore> Game<H, L> {
    /// A game sitting in the menu, with best score and leaderboard loaded.
    /// Fails with `Error::Config` when `rules` do not validate.
    pub fn new(rules: Rules, high_scores: H, boards: L) -> crate::Result<Self> {
        rules.validate()?;
        let mut game = Self {
            spawner: SpawnController::new(&rules),
            world: World::new(&rules),
            rules,
            state: RoundState::Menu,
            score: ScoreTracker::default(),
            leaderboard: Leaderboard::new(),
            last_round: None,
            high_scores,
            boards,
        };
        let best = game.load_best();
        game.score.reset(best);
        game.leaderboard = game.load_leaderboard();
        Ok(game)
    }

    // ── Commands ─────────────────────────────────────────────────────────────

    /// Menu → Playing.
    pub fn start(&mut self) -> bool {
        if self.state != RoundState::Menu {
            return false;
        }
        self.begin_round();
        true
    }

    /// GameOver → Playing.
    pub fn replay(&mut self) -> bool {
        if self.state != RoundState::GameOver {
            return false;
        }
        self.begin_round();
        true
    }

    /// Playing or GameOver → Menu.  Leaving a round early commits nothing.
    pub fn exit(&mut self) -> bool {
        match self.state {
            RoundState::Playing | RoundState::GameOver => {
                if self.state == RoundState::Playing {
                    log::info!("round abandoned at score {}", self.score.score());
                }
                self.state = RoundState::Menu;
                true
            }
            RoundState::Menu => false,
        }
    }

    // ── Simulation ───────────────────────────────────────────────────────────

    /// Run one tick.  Does nothing outside `Playing`.
    pub fn tick(&mut self, now: Timestamp, input: InputSample, rng: &mut impl Rng) -> TickOutcome {
        if self.state != RoundState::Playing {
            return TickOutcome::Idle;
        }

        let (world, report) =
            compute::tick(&self.world, input, now, &self.rules, &self.spawner, rng);
        self.world = world;
        self.score.credit(report.hits.len(), self.rules.points_per_hit);

        if let Some(id) = report.breach {
            log::info!("adversary {id} reached the bottom");
            let summary = self.end_round();
            return TickOutcome::RoundOver(report, summary);
        }
        TickOutcome::Running(report)
    }

    /// Tick, then present the result if the round is still running.
    pub fn step<S: RenderSink>(
        &mut self,
        now: Timestamp,
        input: InputSample,
        rng: &mut impl Rng,
        sink: &mut S,
    ) -> Result<TickOutcome, S::Error> {
        let outcome = self.tick(now, input, rng);
        if self.state == RoundState::Playing {
            sink.present(&self.snapshot())?;
        }
        Ok(outcome)
    }

    /// Place an adversary directly, bypassing the spawn roll.  Only while
    /// playing; for scripted scenarios.
    pub fn inject_adversary(&mut self, rect: Rect) -> Option<EntityId> {
        (self.state == RoundState::Playing).then(|| self.world.insert_adversary(rect))
    }

    // ── Read access ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            state: self.state,
            score: self.score.score(),
            best_score: self.score.best(),
            world: &self.world,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn best_score(&self) -> u32 {
        self.score.best()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Summary of the most recently finished round.
    pub fn last_round(&self) -> Option<&RoundSummary> {
        self.last_round.as_ref()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn high_score_store(&self) -> &H {
        &self.high_scores
    }

    pub fn leaderboard_store(&self) -> &L {
        &self.boards
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    fn begin_round(&mut self) {
        // A failed write leaves the store behind this session's best.
        let best = self.load_best().max(self.score.best());
        self.world = World::new(&self.rules);
        self.score.reset(best);
        self.state = RoundState::Playing;
        log::info!("round started (best {best})");
    }

    fn end_round(&mut self) -> RoundSummary {
        self.state = RoundState::GameOver;
        let score = self.score.score();

        let mut board = self.load_leaderboard();
        let rank = board.insert(LeaderboardEntry::new(LEADERBOARD_NAME, score));
        if let Err(e) = self.boards.set(board.entries()) {
            log::warn!("could not save leaderboard: {e}");
        }
        self.leaderboard = board;

        let new_best = self.score.finish();
        if let Some(best) = new_best {
            log::info!("new best score {best}");
            if let Err(e) = self.high_scores.set(best) {
                log::warn!("could not save best score: {e}");
            }
        }

        log::info!("round over: score {score}, rank {rank:?}");
        let summary = RoundSummary { score, new_best, rank };
        self.last_round = Some(summary.clone());
        summary
    }

    fn load_best(&self) -> u32 {
        self.high_scores.get().unwrap_or_else(|e| {
            log::warn!("ignoring unreadable best score: {e}");
            0
        })
    }

    fn load_leaderboard(&self) -> Leaderboard {
        match self.boards.get() {
            Ok(entries) => Leaderboard::from_entries(entries),
            Err(e) => {
                log::warn!("ignoring unreadable leaderboard: {e}");
                Leaderboard::new()
            }
        }
    }
}
