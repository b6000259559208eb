use crate::game::{efficiency, Game, GameMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Record of a single solved puzzle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: u64,
    pub mode: GameMode,
    pub moves: u32,
    pub time_secs: u64,
    /// Greedy estimate for the puzzle
    pub gods_number: usize,
    pub difficulty: u8,
    pub compressibility: u8,
    pub seed: u64,
    pub hints_used: usize,
    /// Unix timestamp when the puzzle was solved
    pub timestamp: u64,
}

impl GameRecord {
    pub fn efficiency(&self) -> Option<f64> {
        efficiency(self.gods_number, self.moves)
    }
}

/// Aggregates for one mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeSummary {
    pub solves: usize,
    pub best_moves: Option<u32>,
    pub best_time_secs: Option<u64>,
    pub avg_efficiency: Option<f64>,
}

/// Solve history, stored as a JSON array of records
#[derive(Debug)]
pub struct StatsManager {
    pub history: Vec<GameRecord>,
    next_id: u64,
    /// `None` keeps everything in memory
    path: Option<PathBuf>,
}

impl StatsManager {
    /// A manager that never touches the filesystem
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            history: Vec::new(),
            next_id: 1,
            path: None,
        }
    }

    /// Get the records file path
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gauss_records.json")
    }

    /// Load records from the default location
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load records from `path`. A missing or unreadable file starts an empty history.
    pub fn load_from(path: PathBuf) -> Self {
        let history: Vec<GameRecord> = match fs::read_to_string(&path) {
            Ok(json) if json.trim().is_empty() => Vec::new(),
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                warn!(path = %path.display(), "ignoring unreadable records file: {}", err);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        let next_id = history.iter().map(|r| r.id).max().unwrap_or(0) + 1;

        Self {
            history,
            next_id,
            path: Some(path),
        }
    }

    /// Write records back to disk
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.history).map_err(io::Error::other)?;
        fs::write(path, json)
    }

    /// Record a solved game
    pub fn record_game(&mut self, game: &Game) -> &GameRecord {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let record = GameRecord {
            id: self.next_id,
            mode: game.mode(),
            moves: game.move_count(),
            time_secs: game.elapsed().as_secs(),
            gods_number: game.estimate().move_count,
            difficulty: game.config().difficulty,
            compressibility: game.config().compressibility,
            seed: game.seed(),
            hints_used: game.hints_used(),
            timestamp,
        };
        debug!(id = record.id, moves = record.moves, mode = %record.mode, "recording solve");

        self.next_id += 1;
        self.history.push(record);
        &self.history[self.history.len() - 1]
    }

    pub fn summary(&self, mode: GameMode) -> ModeSummary {
        let records: Vec<&GameRecord> = self.history.iter().filter(|r| r.mode == mode).collect();
        let efficiencies: Vec<f64> = records.iter().filter_map(|r| r.efficiency()).collect();

        ModeSummary {
            solves: records.len(),
            best_moves: records.iter().map(|r| r.moves).min(),
            best_time_secs: records.iter().map(|r| r.time_secs).min(),
            avg_efficiency: if efficiencies.is_empty() {
                None
            } else {
                Some(efficiencies.iter().sum::<f64>() / efficiencies.len() as f64)
            },
        }
    }

    /// Most recent records first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &GameRecord> {
        self.history.iter().rev().take(limit)
    }
}

/// Format seconds as MM:SS, or H:MM:SS past an hour
pub fn format_time(secs: u64) -> String {
    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let secs = secs % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{:02}:{:02}", mins, secs)
    }
}
