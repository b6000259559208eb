//! Seeded generation of solvable puzzles.

use crate::matrix::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Size of the validated puzzle
pub const MATRIX_SIZE: usize = 3;
/// Upper bound of the difficulty and compressibility scales
pub const MAX_PARAMETER: u8 = 100;

/// Structural regime chosen from compressibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    /// Small values (1..=3) on and above the diagonal only
    Structured,
    /// Values 1..=6 with some forced zeros
    Moderate,
    /// Uniform values up to the difficulty ceiling
    Incompressible,
}

impl Regime {
    pub fn from_compressibility(compressibility: u8) -> Self {
        match compressibility {
            0..=9 => Regime::Structured,
            10..=49 => Regime::Moderate,
            _ => Regime::Incompressible,
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Structured => write!(f, "Structured"),
            Regime::Moderate => write!(f, "Moderate"),
            Regime::Incompressible => write!(f, "Incompressible"),
        }
    }
}

/// Configuration for puzzle generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Coefficient magnitude control, 0..=100
    pub difficulty: u8,
    /// Structure control, 0..=100
    pub compressibility: u8,
    /// Number of unknowns
    pub size: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            difficulty: 50,
            compressibility: 50,
            size: MATRIX_SIZE,
        }
    }
}

impl GeneratorConfig {
    /// Clamp both parameters into `0..=100`.
    pub fn new(difficulty: i64, compressibility: i64) -> Self {
        Self {
            difficulty: clamp_parameter(difficulty),
            compressibility: clamp_parameter(compressibility),
            size: MATRIX_SIZE,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size.max(1);
        self
    }

    /// Largest coefficient (and solution entry) drawn: `10 + difficulty`.
    pub fn max_coefficient(&self) -> i64 {
        10 + i64::from(self.difficulty.min(MAX_PARAMETER))
    }

    pub fn regime(&self) -> Regime {
        Regime::from_compressibility(self.compressibility)
    }
}

fn clamp_parameter(value: i64) -> u8 {
    value.clamp(0, i64::from(MAX_PARAMETER)) as u8
}

/// A freshly generated puzzle and the seed that reproduces it
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub matrix: Matrix,
    pub seed: u64,
}

/// Puzzle generator.
///
/// Each puzzle is built from its own seed, so any single puzzle can be
/// replayed with [`generate`] regardless of what the generator produced
/// before it.
pub struct Generator {
    config: GeneratorConfig,
    pending: Option<u64>,
    seeds: StdRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a new generator with default configuration and a fresh seed stream
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    /// Create a generator with custom configuration
    pub fn with_config(config: GeneratorConfig) -> Self {
        Self {
            config,
            pending: None,
            seeds: StdRng::seed_from_u64(fresh_seed()),
        }
    }

    /// Create a generator whose first puzzle uses `seed` and whose later
    /// puzzles follow deterministically from it
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: GeneratorConfig::default(),
            pending: Some(seed),
            seeds: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a puzzle with the given parameters (clamped into range)
    pub fn generate(&mut self, difficulty: i64, compressibility: i64) -> Generated {
        self.config = GeneratorConfig::new(difficulty, compressibility).with_size(self.config.size);
        self.generate_with_config()
    }

    /// Generate a puzzle with the current configuration
    pub fn generate_with_config(&mut self) -> Generated {
        let seed = self.pending.take().unwrap_or_else(|| self.seeds.next_u64());
        generate_seeded(&self.config, seed)
    }
}

/// Generate one puzzle. Without a seed, a fresh one is drawn and returned.
pub fn generate(difficulty: i64, compressibility: i64, seed: Option<u64>) -> Generated {
    let config = GeneratorConfig::new(difficulty, compressibility);
    generate_seeded(&config, seed.unwrap_or_else(fresh_seed))
}

/// Generate the unique puzzle for `config` and `seed`.
pub fn generate_seeded(config: &GeneratorConfig, seed: u64) -> Generated {
    build(config, seed).0
}

/// Build the puzzle along with its hidden solution vector.
pub(crate) fn build(config: &GeneratorConfig, seed: u64) -> (Generated, Vec<i64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = config.size.max(1);
    let max_coeff = config.max_coefficient();
    let regime = config.regime();

    let values: Vec<Vec<i64>> = match regime {
        Regime::Structured => (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if j >= i { rng.gen_range(1..=3) } else { 0 })
                    .collect()
            })
            .collect(),
        Regime::Moderate => {
            let mut values: Vec<Vec<i64>> = (0..n)
                .map(|_| (0..n).map(|_| rng.gen_range(1..=6)).collect())
                .collect();
            for row in values.iter_mut() {
                if rng.gen_bool(0.4) {
                    let j = rng.gen_range(0..n);
                    row[j] = 0;
                }
            }
            values
        }
        Regime::Incompressible => (0..n)
            .map(|_| (0..n).map(|_| rng.gen_range(1..=max_coeff)).collect())
            .collect(),
    };

    let solution: Vec<i64> = (0..n).map(|_| rng.gen_range(1..=max_coeff)).collect();

    // exact integer products, so the augmented column carries no rounding
    let outputs: Vec<f64> = values
        .iter()
        .map(|row| row.iter().zip(&solution).map(|(a, s)| a * s).sum::<i64>() as f64)
        .collect();

    let coefficients: Vec<Vec<f64>> = values
        .iter()
        .map(|row| row.iter().map(|&v| v as f64).collect())
        .collect();

    debug!(
        seed,
        regime = %regime,
        difficulty = config.difficulty,
        compressibility = config.compressibility,
        "generated puzzle"
    );

    let matrix = Matrix::from_parts(coefficients, outputs, Some(seed));
    (Generated { matrix, seed }, solution)
}

/// Draw a seed from the OS, falling back to a process-local counter
fn fresh_seed() -> u64 {
    let mut seed_bytes = [0u8; 8];
    getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
        static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
        let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        seed_bytes = counter.to_le_bytes();
    });
    u64::from_le_bytes(seed_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn as_f64(solution: &[i64]) -> Vec<f64> {
        solution.iter().map(|&s| s as f64).collect()
    }

    #[test]
    fn test_same_seed_same_matrix() {
        let a = generate(0, 100, Some(42));
        let b = generate(0, 100, Some(42));
        assert_eq!(a, b);
        assert_eq!(a.seed, 42);
        assert_eq!(a.matrix.seed(), Some(42));
        assert_eq!(a.matrix.move_count(), 0);
    }

    #[test]
    fn test_unseeded_returns_replayable_seed() {
        let a = generate(30, 30, None);
        let b = generate(30, 30, Some(a.seed));
        assert_eq!(a.matrix, b.matrix);
    }

    #[test]
    fn test_generator_first_puzzle_matches_seed() {
        let mut generator = Generator::with_seed(7);
        let first = generator.generate(60, 80);
        assert_eq!(first, generate(60, 80, Some(7)));

        let second = generator.generate(60, 80);
        assert_eq!(second, generate(60, 80, Some(second.seed)));
    }

    #[test]
    fn test_parameters_are_clamped() {
        let config = GeneratorConfig::new(-20, 400);
        assert_eq!(config.difficulty, 0);
        assert_eq!(config.compressibility, 100);
        assert_eq!(config.max_coefficient(), 10);
        assert_eq!(GeneratorConfig::new(100, 0).max_coefficient(), 110);
        assert_eq!(generate(-5, 250, Some(3)), generate(0, 100, Some(3)));
    }

    #[test]
    fn test_regime_boundaries() {
        assert_eq!(Regime::from_compressibility(0), Regime::Structured);
        assert_eq!(Regime::from_compressibility(9), Regime::Structured);
        assert_eq!(Regime::from_compressibility(10), Regime::Moderate);
        assert_eq!(Regime::from_compressibility(49), Regime::Moderate);
        assert_eq!(Regime::from_compressibility(50), Regime::Incompressible);
        assert_eq!(Regime::from_compressibility(100), Regime::Incompressible);
    }

    #[test]
    fn test_structured_is_upper_triangular() {
        for seed in 0..20 {
            let m = generate(100, 5, Some(seed)).matrix;
            for (i, row) in m.coefficients().iter().enumerate() {
                for (j, &v) in row.iter().enumerate() {
                    if j < i {
                        assert_eq!(v, 0.0);
                    } else {
                        assert!((1.0..=3.0).contains(&v));
                    }
                }
            }
        }
    }

    #[test]
    fn test_moderate_value_range() {
        for seed in 0..20 {
            let m = generate(100, 30, Some(seed)).matrix;
            assert!(m
                .coefficients()
                .iter()
                .flatten()
                .all(|v| (0.0..=6.0).contains(v) && v.fract() == 0.0));
        }
    }

    #[test]
    fn test_incompressible_value_range() {
        for seed in 0..20 {
            let m = generate(25, 75, Some(seed)).matrix;
            assert!(m
                .coefficients()
                .iter()
                .flatten()
                .all(|v| (1.0..=35.0).contains(v)));
        }
    }

    #[test]
    fn test_other_sizes() {
        let config = GeneratorConfig::new(10, 100).with_size(5);
        let (generated, solution) = build(&config, 11);
        assert_eq!(generated.matrix.size(), 5);
        assert!(generated.matrix.is_satisfied_by(&as_f64(&solution)));
    }

    proptest! {
        #[test]
        fn generation_is_deterministic(d in 0i64..=100, c in 0i64..=100, seed in any::<u64>()) {
            prop_assert_eq!(generate(d, c, Some(seed)), generate(d, c, Some(seed)));
        }

        #[test]
        fn hidden_solution_satisfies_system(d in 0i64..=100, c in 0i64..=100, seed in any::<u64>()) {
            let config = GeneratorConfig::new(d, c);
            let (generated, solution) = build(&config, seed);
            let max = config.max_coefficient();
            prop_assert!(solution.iter().all(|&s| (1..=max).contains(&s)));
            prop_assert!(generated.matrix.is_satisfied_by(&as_f64(&solution)));
        }
    }
}
