use std::convert::Infallible;

use space_shooter::entities::*;
use space_shooter::input::InputSample;
use space_shooter::score::LeaderboardEntry;
use space_shooter::store::{HighScoreStore, LeaderboardStore, MemoryStore};
use space_shooter::{Error, Game, RenderSink, Rules, Snapshot, TickOutcome};

use rand::rngs::StdRng;
use rand::SeedableRng;

type MemGame = Game<MemoryStore, MemoryStore>;

const FIRE: InputSample = InputSample { left: false, right: false, fire: true };

fn quiet_rules() -> Rules {
    Rules {
        spawn_probability: 0.0,
        ..Rules::default()
    }
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn ms(t: u64) -> Timestamp {
    Timestamp::from_millis(t)
}

fn new_game() -> MemGame {
    Game::new(quiet_rules(), MemoryStore::new(), MemoryStore::new()).unwrap()
}

/// Drop an adversary onto the player's nose and fire into it.
fn score_hit<H: HighScoreStore, L: LeaderboardStore>(
    game: &mut Game<H, L>,
    clock: &mut u64,
    rng: &mut StdRng,
) {
    *clock += 200;
    game.inject_adversary(Rect::new(380.0, 480.0, 40.0, 40.0)).unwrap();
    match game.tick(ms(*clock), FIRE, rng) {
        TickOutcome::Running(report) => assert_eq!(report.hits.len(), 1),
        other => panic!("expected a running tick, got {other:?}"),
    }
}

/// Let an adversary slip past the bottom.
fn lose_round<H: HighScoreStore, L: LeaderboardStore>(
    game: &mut Game<H, L>,
    clock: &mut u64,
    rng: &mut StdRng,
) -> space_shooter::RoundSummary {
    *clock += 16;
    game.inject_adversary(Rect::new(0.0, 598.0, 40.0, 40.0)).unwrap();
    match game.tick(ms(*clock), InputSample::NONE, rng) {
        TickOutcome::RoundOver(_, summary) => summary,
        other => panic!("expected the round to end, got {other:?}"),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[test]
fn new_game_starts_in_menu() {
    let g = new_game();
    assert_eq!(g.state(), RoundState::Menu);
    assert_eq!(g.score(), 0);
}

#[test]
fn new_game_loads_best_and_leaderboard() {
    let mut boards = MemoryStore::new();
    boards.entries = vec![LeaderboardEntry::new("Player", 40)];
    let g = Game::new(quiet_rules(), MemoryStore::with_best(70), boards).unwrap();
    assert_eq!(g.best_score(), 70);
    assert_eq!(g.leaderboard().len(), 1);
    assert_eq!(g.leaderboard().entries()[0].rank, 1);
}

#[test]
fn new_game_rejects_invalid_rules() {
    let bad = [
        Rules { player_width: 900.0, ..quiet_rules() },
        Rules { spawn_probability: f64::NAN, ..quiet_rules() },
    ];
    for rules in bad {
        let result = Game::new(rules, MemoryStore::new(), MemoryStore::new());
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

#[test]
fn commands_in_menu() {
    let mut g = new_game();
    assert!(!g.replay());
    assert!(!g.exit());
    assert_eq!(g.state(), RoundState::Menu);
    assert!(g.start());
    assert_eq!(g.state(), RoundState::Playing);
}

#[test]
fn commands_while_playing() {
    let mut g = new_game();
    g.start();
    assert!(!g.start());
    assert!(!g.replay());
    assert_eq!(g.state(), RoundState::Playing);
}

#[test]
fn commands_after_game_over() {
    let mut g = new_game();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    lose_round(&mut g, &mut clock, &mut rng);
    assert_eq!(g.state(), RoundState::GameOver);
    assert!(!g.start());
    assert!(g.replay());
    assert_eq!(g.state(), RoundState::Playing);
}

#[test]
fn exit_from_playing_commits_nothing() {
    let mut g = new_game();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    score_hit(&mut g, &mut clock, &mut rng);
    assert!(g.exit());
    assert_eq!(g.state(), RoundState::Menu);
    assert_eq!(g.leaderboard_store().leaderboard_writes, 0);
    assert_eq!(g.high_score_store().best_writes, 0);
}

#[test]
fn exit_from_game_over_returns_to_menu() {
    let mut g = new_game();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    lose_round(&mut g, &mut clock, &mut rng);
    assert!(g.exit());
    assert_eq!(g.state(), RoundState::Menu);
    assert_eq!(g.leaderboard_store().leaderboard_writes, 1);
}

#[test]
fn inject_only_while_playing() {
    let mut g = new_game();
    assert!(g.inject_adversary(Rect::new(0.0, 0.0, 40.0, 40.0)).is_none());
    g.start();
    assert!(g.inject_adversary(Rect::new(0.0, 0.0, 40.0, 40.0)).is_some());
}

// ── Ticking ───────────────────────────────────────────────────────────────────

#[test]
fn tick_outside_playing_is_idle() {
    let mut g = new_game();
    assert_eq!(g.tick(ms(0), FIRE, &mut seeded_rng()), TickOutcome::Idle);
    assert_eq!(g.world().frame(), 0);
    assert_eq!(g.world().projectile_count(), 0);
}

#[test]
fn adversary_reaching_bottom_ends_round() {
    let mut g = new_game();
    let mut rng = seeded_rng();
    g.start();
    g.inject_adversary(Rect::new(100.0, -40.0, 40.0, 40.0)).unwrap();

    let mut ticks = 0u64;
    let summary = loop {
        ticks += 1;
        match g.tick(ms(ticks * 16), InputSample::NONE, &mut rng) {
            TickOutcome::Running(_) => assert!(ticks < 1000, "round never ended"),
            TickOutcome::RoundOver(report, summary) => {
                assert!(report.breach.is_some());
                break summary;
            }
            TickOutcome::Idle => panic!("idle while playing"),
        }
    };

    // -40 + 2·320 = 600
    assert_eq!(ticks, 320);
    assert_eq!(g.state(), RoundState::GameOver);
    assert_eq!(g.score(), 0);
    assert_eq!(summary.score, 0);
    assert_eq!(summary.rank, Some(1));

    let stored = &g.leaderboard_store().entries;
    assert_eq!(stored, &vec![LeaderboardEntry { name: "Player".into(), score: 0, rank: 1 }]);
    assert_eq!(g.leaderboard_store().leaderboard_writes, 1);
    assert_eq!(g.high_score_store().best_writes, 0);
}

#[test]
fn no_world_mutation_after_game_over() {
    let mut g = new_game();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    lose_round(&mut g, &mut clock, &mut rng);

    let frame = g.world().frame();
    for i in 1..=10 {
        assert_eq!(g.tick(ms(clock + i * 16), FIRE, &mut rng), TickOutcome::Idle);
    }
    assert_eq!(g.world().frame(), frame);
    assert_eq!(g.world().projectile_count(), 0);
    assert_eq!(g.leaderboard_store().leaderboard_writes, 1);
}

#[test]
fn overlapping_pair_scores_ten_once() {
    let mut g = new_game();
    let mut rng = seeded_rng();
    g.start();
    // Two adversaries under the same projectile: only one is consumed.
    g.inject_adversary(Rect::new(380.0, 480.0, 40.0, 40.0)).unwrap();
    g.inject_adversary(Rect::new(382.0, 478.0, 40.0, 40.0)).unwrap();
    let outcome = g.tick(ms(0), FIRE, &mut rng);
    let TickOutcome::Running(report) = outcome else {
        panic!("round ended unexpectedly");
    };
    assert_eq!(report.hits.len(), 1);
    assert_eq!(g.score(), 10);
    assert_eq!(g.world().adversary_count(), 1);
    assert_eq!(g.world().projectile_count(), 0);
}

// ── Best score ────────────────────────────────────────────────────────────────

#[test]
fn beating_best_score_saves_it_once() {
    let mut g = Game::new(quiet_rules(), MemoryStore::with_best(50), MemoryStore::new()).unwrap();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    assert_eq!(g.best_score(), 50);
    for _ in 0..8 {
        score_hit(&mut g, &mut clock, &mut rng);
    }
    assert_eq!(g.score(), 80);
    // The best is only committed at round end.
    assert_eq!(g.high_score_store().best_writes, 0);

    let summary = lose_round(&mut g, &mut clock, &mut rng);
    assert_eq!(summary.new_best, Some(80));
    assert_eq!(g.best_score(), 80);
    assert_eq!(g.high_score_store().best, Some(80));
    assert_eq!(g.high_score_store().best_writes, 1);
}

#[test]
fn lower_score_leaves_best_alone() {
    let mut g = Game::new(quiet_rules(), MemoryStore::with_best(50), MemoryStore::new()).unwrap();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    for _ in 0..3 {
        score_hit(&mut g, &mut clock, &mut rng);
    }
    let summary = lose_round(&mut g, &mut clock, &mut rng);
    assert_eq!(summary.score, 30);
    assert_eq!(summary.new_best, None);
    assert_eq!(g.high_score_store().best_writes, 0);
    assert_eq!(g.best_score(), 50);
}

#[test]
fn replay_resets_round() {
    let mut g = new_game();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    score_hit(&mut g, &mut clock, &mut rng);
    g.inject_adversary(Rect::new(600.0, 100.0, 40.0, 40.0)).unwrap();
    lose_round(&mut g, &mut clock, &mut rng);
    assert_eq!(g.score(), 10);

    assert!(g.replay());
    assert_eq!(g.score(), 0);
    assert_eq!(g.best_score(), 10);
    assert_eq!(g.world().frame(), 0);
    assert_eq!(g.world().adversary_count(), 0);
    assert_eq!(g.world().projectile_count(), 0);
    assert_eq!(g.world().player().rect.x, 375.0);
}

// ── Leaderboard ───────────────────────────────────────────────────────────────

#[test]
fn round_lands_between_existing_entries() {
    let mut boards = MemoryStore::new();
    boards.entries = vec![LeaderboardEntry::new("Ace", 50), LeaderboardEntry::new("Bo", 20)];
    let mut g = Game::new(quiet_rules(), MemoryStore::new(), boards).unwrap();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    for _ in 0..3 {
        score_hit(&mut g, &mut clock, &mut rng);
    }
    let summary = lose_round(&mut g, &mut clock, &mut rng);
    assert_eq!(summary.rank, Some(2));

    let names: Vec<_> = g.leaderboard_store().entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Ace", "Player", "Bo"]);
    let ranks: Vec<_> = g.leaderboard_store().entries.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
}

#[test]
fn full_board_of_higher_scores_drops_round() {
    let mut boards = MemoryStore::new();
    boards.entries = (1..=10).map(|i| LeaderboardEntry::new(format!("P{i}"), i * 100)).collect();
    let mut g = Game::new(quiet_rules(), MemoryStore::new(), boards).unwrap();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    let summary = lose_round(&mut g, &mut clock, &mut rng);
    assert_eq!(summary.rank, None);
    let stored = &g.leaderboard_store().entries;
    assert_eq!(stored.len(), 10);
    assert_eq!(stored[0].score, 1000);
    assert!(stored.iter().all(|e| e.name != "Player"));
}

// ── Failing storage ───────────────────────────────────────────────────────────

struct BrokenStore;

fn disk_full() -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
}

impl HighScoreStore for BrokenStore {
    fn get(&self) -> space_shooter::Result<u32> {
        Err(Error::Parse { what: "best score", value: "garbage".into() })
    }

    fn set(&mut self, _score: u32) -> space_shooter::Result<()> {
        Err(disk_full())
    }
}

impl LeaderboardStore for BrokenStore {
    fn get(&self) -> space_shooter::Result<Vec<LeaderboardEntry>> {
        Err(disk_full())
    }

    fn set(&mut self, _entries: &[LeaderboardEntry]) -> space_shooter::Result<()> {
        Err(disk_full())
    }
}

#[test]
fn broken_storage_is_not_fatal() {
    let mut g = Game::new(quiet_rules(), BrokenStore, BrokenStore).unwrap();
    assert_eq!(g.best_score(), 0);
    assert!(g.leaderboard().is_empty());

    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    score_hit(&mut g, &mut clock, &mut rng);
    let summary = lose_round(&mut g, &mut clock, &mut rng);

    assert_eq!(summary.new_best, Some(10));
    assert_eq!(summary.rank, Some(1));
    assert_eq!(g.best_score(), 10);
    assert_eq!(g.leaderboard().len(), 1);
    assert_eq!(g.state(), RoundState::GameOver);
}

/// Reads fine, never persists a new best.
struct ReadOnlyStore;

impl HighScoreStore for ReadOnlyStore {
    fn get(&self) -> space_shooter::Result<u32> {
        Ok(0)
    }

    fn set(&mut self, _score: u32) -> space_shooter::Result<()> {
        Err(disk_full())
    }
}

#[test]
fn unsaved_best_survives_replay() {
    let mut g = Game::new(quiet_rules(), ReadOnlyStore, MemoryStore::new()).unwrap();
    let (mut clock, mut rng) = (0, seeded_rng());
    g.start();
    score_hit(&mut g, &mut clock, &mut rng);
    lose_round(&mut g, &mut clock, &mut rng);
    assert_eq!(g.best_score(), 10);

    assert!(g.replay());
    assert_eq!(g.best_score(), 10);
    assert_eq!(g.snapshot().best_score, 10);

    // A lower round is not a new best just because the store lags behind
    let summary = lose_round(&mut g, &mut clock, &mut rng);
    assert_eq!(summary.score, 0);
    assert_eq!(summary.new_best, None);
    assert_eq!(g.best_score(), 10);
}

// ── RenderSink ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    frames: Vec<(RoundState, u32, usize, usize)>,
}

impl RenderSink for Recorder {
    type Error = Infallible;

    fn present(&mut self, snapshot: &Snapshot<'_>) -> Result<(), Infallible> {
        self.frames.push((
            snapshot.state,
            snapshot.score,
            snapshot.projectiles().count(),
            snapshot.adversaries().count(),
        ));
        Ok(())
    }
}

#[test]
fn step_presents_once_per_running_tick() {
    let mut g = new_game();
    let mut rng = seeded_rng();
    let mut sink = Recorder::default();

    // Not playing: nothing presented.
    g.step(ms(0), FIRE, &mut rng, &mut sink).unwrap();
    assert!(sink.frames.is_empty());

    g.start();
    for i in 1..=3 {
        g.step(ms(i * 16), FIRE, &mut rng, &mut sink).unwrap();
    }
    assert_eq!(sink.frames.len(), 3);
    assert!(sink.frames.iter().all(|f| f.0 == RoundState::Playing));
    assert_eq!(sink.frames[0].2, 1); // first shot

    g.inject_adversary(Rect::new(0.0, 598.0, 40.0, 40.0)).unwrap();
    let outcome = g.step(ms(64), InputSample::NONE, &mut rng, &mut sink).unwrap();
    assert!(matches!(outcome, TickOutcome::RoundOver(..)));
    assert_eq!(sink.frames.len(), 3);
}

#[test]
fn snapshot_reflects_world() {
    let mut g = new_game();
    g.start();
    g.inject_adversary(Rect::new(10.0, 10.0, 40.0, 40.0)).unwrap();
    let snap = g.snapshot();
    assert_eq!(snap.state, RoundState::Playing);
    assert_eq!(snap.player().rect.x, 375.0);
    assert_eq!(snap.adversaries().count(), 1);
    assert_eq!(snap.projectiles().count(), 0);
}
