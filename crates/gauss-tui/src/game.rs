use clap::ValueEnum;
use gauss_core::{
    estimate, generate_seeded, hint, EngineResult, Estimate, Generated, GeneratorConfig, Matrix,
    MatrixRecord, Rating,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::info;

/// How a solve is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Fewest-moves challenge
    Fmc,
    /// Race the clock
    Timed,
}

impl GameMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "fmc" => Some(GameMode::Fmc),
            "timed" => Some(GameMode::Timed),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            GameMode::Fmc => GameMode::Timed,
            GameMode::Timed => GameMode::Fmc,
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::Fmc => write!(f, "fmc"),
            GameMode::Timed => write!(f, "timed"),
        }
    }
}

/// One puzzle being played
#[derive(Clone)]
pub struct Game {
    matrix: Matrix,
    config: GeneratorConfig,
    seed: u64,
    /// Greedy estimate for the puzzle as generated
    estimate: Estimate,
    mode: GameMode,
    start_time: Instant,
    /// Time banked before `start_time` (loaded games)
    elapsed: Duration,
    completed: bool,
    hints_used: usize,
    rejected: usize,
    /// Accepted transformations, in order
    moves: Vec<String>,
}

impl Game {
    pub fn new(generated: Generated, config: GeneratorConfig, mode: GameMode) -> Self {
        let estimate = estimate(&generated.matrix);
        info!(
            seed = generated.seed,
            difficulty = config.difficulty,
            compressibility = config.compressibility,
            gods_number = estimate.move_count,
            "new puzzle"
        );

        Self {
            matrix: generated.matrix,
            config,
            seed: generated.seed,
            estimate,
            mode,
            start_time: Instant::now(),
            elapsed: Duration::ZERO,
            completed: false,
            hints_used: 0,
            rejected: 0,
            moves: Vec::new(),
        }
    }

    /// A fresh copy of this puzzle regenerated from its seed
    pub fn restart(&self) -> Self {
        Self::new(
            generate_seeded(&self.config, self.seed),
            self.config,
            self.mode,
        )
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn estimate(&self) -> &Estimate {
        &self.estimate
    }

    pub fn rating(&self) -> Rating {
        self.estimate.rating(self.matrix.size())
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    pub fn move_count(&self) -> u32 {
        self.matrix.move_count()
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn hints_used(&self) -> usize {
        self.hints_used
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn elapsed(&self) -> Duration {
        if self.completed {
            self.elapsed
        } else {
            self.elapsed + self.start_time.elapsed()
        }
    }

    /// Format the elapsed time as MM:SS
    pub fn elapsed_string(&self) -> String {
        let secs = self.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Apply a typed transformation. Rejections leave the puzzle unchanged.
    pub fn apply(&mut self, text: &str) -> EngineResult<u32> {
        match self.matrix.apply_str(text) {
            Ok(count) => {
                self.moves.push(text.trim().to_string());
                if self.matrix.is_solved() && !self.completed {
                    self.elapsed += self.start_time.elapsed();
                    self.completed = true;
                    info!(seed = self.seed, moves = count, "puzzle solved");
                }
                Ok(count)
            }
            Err(err) => {
                self.rejected += 1;
                Err(err)
            }
        }
    }

    /// Next greedy move from the current position
    pub fn hint(&mut self) -> Option<String> {
        let next = hint(&self.matrix);
        if next.is_some() {
            self.hints_used += 1;
        }
        next
    }

    /// Moves saved against the estimate, as a percentage (100 means on par)
    pub fn efficiency(&self) -> Option<f64> {
        efficiency(self.estimate.move_count, self.move_count())
    }

    /// Serialize the game state for saving
    pub fn serialize(&self) -> String {
        let state = SaveState {
            matrix: self.matrix.to_record(),
            difficulty: self.config.difficulty,
            compressibility: self.config.compressibility,
            seed: self.seed,
            mode: self.mode,
            estimate: self.estimate.clone(),
            elapsed_secs: self.elapsed().as_secs(),
            hints_used: self.hints_used,
            rejected: self.rejected,
            moves: self.moves.clone(),
        };
        serde_json::to_string_pretty(&state).unwrap_or_default()
    }

    /// Deserialize a saved game state
    pub fn deserialize(json: &str) -> Option<Self> {
        let state: SaveState = serde_json::from_str(json).ok()?;
        let matrix = Matrix::from_record(state.matrix).ok()?;
        let config = GeneratorConfig::new(
            i64::from(state.difficulty),
            i64::from(state.compressibility),
        )
        .with_size(matrix.size());
        let completed = matrix.is_solved();

        Some(Self {
            matrix,
            config,
            seed: state.seed,
            estimate: state.estimate,
            mode: state.mode,
            start_time: Instant::now(),
            elapsed: Duration::from_secs(state.elapsed_secs),
            completed,
            hints_used: state.hints_used,
            rejected: state.rejected,
            moves: state.moves,
        })
    }
}

/// `estimate / moves` as a percentage; `None` before any move
pub fn efficiency(gods_number: usize, moves: u32) -> Option<f64> {
    if moves == 0 {
        None
    } else {
        Some(gods_number as f64 / f64::from(moves) * 100.0)
    }
}

#[derive(Serialize, Deserialize)]
struct SaveState {
    matrix: MatrixRecord,
    difficulty: u8,
    compressibility: u8,
    seed: u64,
    mode: GameMode,
    estimate: Estimate,
    elapsed_secs: u64,
    hints_used: usize,
    rejected: usize,
    #[serde(default)]
    moves: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauss_core::ErrorKind;

    fn structured_game() -> Game {
        let config = GeneratorConfig::new(10, 0);
        Game::new(generate_seeded(&config, 42), config, GameMode::Fmc)
    }

    #[test]
    fn test_follow_plan_to_completion() {
        let mut game = structured_game();
        let plan = game.estimate().operations.clone();
        assert!(!game.is_completed());

        for op in &plan {
            game.apply(op).unwrap();
        }

        assert!(game.is_completed());
        assert_eq!(game.move_count() as usize, plan.len());
        assert_eq!(game.moves(), plan.as_slice());
        assert_eq!(game.efficiency(), Some(100.0));
    }

    #[test]
    fn test_rejected_move_counts_but_changes_nothing() {
        let mut game = structured_game();
        let before = game.matrix().clone();

        let err = game.apply("R1 = R1 * R2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeError);
        assert_eq!(game.matrix(), &before);
        assert_eq!(game.rejected(), 1);
        assert_eq!(game.move_count(), 0);
    }

    #[test]
    fn test_restart_regenerates_from_seed() {
        let mut game = structured_game();
        game.apply("R1 = R1 * 2").unwrap();

        let fresh = game.restart();
        assert_eq!(fresh.seed(), game.seed());
        assert_eq!(fresh.move_count(), 0);
        assert_eq!(fresh.matrix(), structured_game().matrix());
    }

    #[test]
    fn test_hint_counts_usage() {
        let mut game = structured_game();
        let first = game.estimate().operations.first().cloned();
        assert_eq!(game.hint(), first);
        assert_eq!(game.hints_used(), usize::from(first.is_some()));
    }

    #[test]
    fn test_save_round_trip() {
        let mut game = structured_game();
        game.apply("R3 = R3 + R1").unwrap();
        game.set_mode(GameMode::Timed);

        let restored = Game::deserialize(&game.serialize()).unwrap();
        assert_eq!(restored.matrix(), game.matrix());
        assert_eq!(restored.seed(), game.seed());
        assert_eq!(restored.mode(), GameMode::Timed);
        assert_eq!(restored.config(), game.config());
        assert_eq!(restored.estimate(), game.estimate());
        assert_eq!(restored.moves(), game.moves());
    }

    #[test]
    fn test_deserialize_rejects_bad_matrix() {
        let mut state: serde_json::Value = serde_json::from_str(&structured_game().serialize()).unwrap();
        state["matrix"]["augmented"] = serde_json::json!([1, 2]);
        assert!(Game::deserialize(&state.to_string()).is_none());
        assert!(Game::deserialize("not json").is_none());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(GameMode::parse("FMC"), Some(GameMode::Fmc));
        assert_eq!(GameMode::parse("timed"), Some(GameMode::Timed));
        assert_eq!(GameMode::parse("blitz"), None);
        assert_eq!(GameMode::Fmc.toggle(), GameMode::Timed);
    }

    #[test]
    fn test_efficiency() {
        assert_eq!(efficiency(6, 0), None);
        assert_eq!(efficiency(6, 12), Some(50.0));
    }
}
