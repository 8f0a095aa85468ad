/// Round score, best score and the top-10 leaderboard.

use serde::{Deserialize, Serialize};

use crate::config::consts::LEADERBOARD_CAPACITY;

// ── ScoreTracker ──────────────────────────────────────────────────────────────

/// Score of the current round next to the persisted best.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    score: u32,
    best: u32,
}

impl ScoreTracker {
    pub fn new(best: u32) -> Self {
        Self { score: 0, best }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Round start: score back to zero, best refreshed from storage.
    pub fn reset(&mut self, best: u32) {
        self.score = 0;
        self.best = best;
    }

    /// Credit `hits` collisions worth `points` each.
    pub fn credit(&mut self, hits: usize, points: u32) {
        let hits = u32::try_from(hits).unwrap_or(u32::MAX);
        self.score = self.score.saturating_add(hits.saturating_mul(points));
    }

    /// Round end.  Returns the new best when the round beat it.
    pub fn finish(&mut self) -> Option<u32> {
        if self.score > self.best {
            self.best = self.score;
            Some(self.best)
        } else {
            None
        }
    }
}

// ── Leaderboard ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// 1-based position.
    #[serde(default)]
    pub rank: usize,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
            rank: 0,
        }
    }
}

/// Entries sorted descending by score, at most `LEADERBOARD_CAPACITY`
/// long, ranked 1..N.  Every constructor and mutator keeps that shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from untrusted entries (e.g. read from storage): re-sort,
    /// truncate and re-rank.
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        let mut board = Self { entries };
        board.normalize();
        board
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Add an entry, then re-sort, truncate and re-rank.  Returns the rank
    /// the entry landed on, or `None` if it fell off the bottom.
    pub fn insert(&mut self, entry: LeaderboardEntry) -> Option<usize> {
        // Stable sort: a new entry ties behind existing entries of equal score.
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let index = pos.unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
        self.normalize();
        (index < self.entries.len()).then_some(index + 1)
    }

    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(LEADERBOARD_CAPACITY);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }
    }
}
