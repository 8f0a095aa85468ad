/// Persistence ports for the best score and the leaderboard, with a
/// file-backed and an in-memory implementation.
///
/// Stores report failures; the game decides what to do with them (it
/// logs and carries on, see `game`).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::score::LeaderboardEntry;

pub trait HighScoreStore {
    /// Stored best score, 0 if none has been stored yet.
    fn get(&self) -> Result<u32>;
    fn set(&mut self, score: u32) -> Result<()>;
}

pub trait LeaderboardStore {
    /// Stored leaderboard, empty if none has been stored yet.
    fn get(&self) -> Result<Vec<LeaderboardEntry>>;
    fn set(&mut self, entries: &[LeaderboardEntry]) -> Result<()>;
}

// ── FileStore ─────────────────────────────────────────────────────────────────

const BEST_SCORE_FILE: &str = "best_score";
const LEADERBOARD_FILE: &str = "leaderboard.json";

/// Stores both values as files in one directory: the best score as a plain
/// decimal number, the leaderboard as a JSON array.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$HOME/.space_shooter`, or `./.space_shooter` without a home.
    pub fn default_dir() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".space_shooter")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_optional(&self, name: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.dir.join(name)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(name), contents)?;
        Ok(())
    }
}

impl HighScoreStore for FileStore {
    fn get(&self) -> Result<u32> {
        let Some(text) = self.read_optional(BEST_SCORE_FILE)? else {
            return Ok(0);
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        trimmed.parse().map_err(|_| Error::Parse {
            what: "best score",
            value: trimmed.to_string(),
        })
    }

    fn set(&mut self, score: u32) -> Result<()> {
        self.write(BEST_SCORE_FILE, &score.to_string())
    }
}

impl LeaderboardStore for FileStore {
    fn get(&self) -> Result<Vec<LeaderboardEntry>> {
        match self.read_optional(LEADERBOARD_FILE)? {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(Vec::new()),
        }
    }

    fn set(&mut self, entries: &[LeaderboardEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        self.write(LEADERBOARD_FILE, &json)
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// Keeps everything in memory and counts writes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub best: Option<u32>,
    pub entries: Vec<LeaderboardEntry>,
    pub best_writes: usize,
    pub leaderboard_writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(best: u32) -> Self {
        Self {
            best: Some(best),
            ..Self::default()
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn get(&self) -> Result<u32> {
        Ok(self.best.unwrap_or(0))
    }

    fn set(&mut self, score: u32) -> Result<()> {
        self.best = Some(score);
        self.best_writes += 1;
        Ok(())
    }
}

impl LeaderboardStore for MemoryStore {
    fn get(&self) -> Result<Vec<LeaderboardEntry>> {
        Ok(self.entries.clone())
    }

    fn set(&mut self, entries: &[LeaderboardEntry]) -> Result<()> {
        self.entries = entries.to_vec();
        self.leaderboard_writes += 1;
        Ok(())
    }
}
