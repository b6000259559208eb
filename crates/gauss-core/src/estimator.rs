//! Greedy move-count estimation ("God's number").
//!
//! The estimate is an upper bound produced by a fixed two-phase elimination:
//! normalize and clear below each pivot left to right, then clear above each
//! pivot right to left. It runs no search and makes no optimality claim; use
//! it for difficulty labels, not as the minimum number of moves.

use crate::canonical::{canonicalize, format_number};
use crate::matrix::Matrix;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Result of running the greedy plan on a copy of a matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    /// Number of operations in the plan
    pub move_count: usize,
    /// The plan, in transformation syntax
    pub operations: Vec<String>,
    /// Whether replaying the plan reaches the identity (zero pivots can stall it)
    pub solves: bool,
}

impl Estimate {
    pub fn rating(&self, size: usize) -> Rating {
        Rating::from_moves(self.move_count, size)
    }
}

/// Coarse difficulty label derived from an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rating {
    Solved,
    Easy,
    Medium,
    Hard,
}

impl Rating {
    /// Bands scale with the matrix size: up to `n` moves is easy, up to `2n`
    /// medium, anything longer hard.
    pub fn from_moves(moves: usize, size: usize) -> Self {
        let n = size.max(1);
        match moves {
            0 => Rating::Solved,
            m if m <= n => Rating::Easy,
            m if m <= 2 * n => Rating::Medium,
            _ => Rating::Hard,
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rating::Solved => write!(f, "Solved"),
            Rating::Easy => write!(f, "Easy"),
            Rating::Medium => write!(f, "Medium"),
            Rating::Hard => write!(f, "Hard"),
        }
    }
}

/// Estimate the moves needed to solve `matrix`. The caller's matrix is not touched.
pub fn estimate(matrix: &Matrix) -> Estimate {
    let mut plan = Plan {
        work: matrix.clone(),
        operations: Vec::new(),
    };
    plan.run();

    Estimate {
        move_count: plan.operations.len(),
        solves: plan.work.is_solved(),
        operations: plan.operations,
    }
}

/// First move of the greedy plan, or `None` if there is nothing to do.
pub fn hint(matrix: &Matrix) -> Option<String> {
    estimate(matrix).operations.into_iter().next()
}

struct Plan {
    work: Matrix,
    operations: Vec<String>,
}

impl Plan {
    fn run(&mut self) {
        let n = self.work.size();

        // Forward: unit pivots, zeros below
        for col in 0..n {
            let diag = self.cell(col, col);
            if diag != 0.0 && diag != 1.0 && !self.push(normalize_op(col, diag)) {
                return;
            }

            for row in col + 1..n {
                let val = self.cell(row, col);
                if val != 0.0 && !self.push(eliminate_op(row, col, val)) {
                    return;
                }
            }
        }

        // Backward: zeros above
        for col in (0..n).rev() {
            for row in (0..col).rev() {
                let val = self.cell(row, col);
                if val != 0.0 && !self.push(eliminate_op(row, col, val)) {
                    return;
                }
            }
        }
    }

    fn cell(&self, row: usize, col: usize) -> f64 {
        canonicalize(self.work.coefficients()[row][col])
    }

    /// Apply and record an operation; `false` stops the plan.
    fn push(&mut self, op: String) -> bool {
        match self.work.apply_str(&op) {
            Ok(_) => {
                self.operations.push(op);
                true
            }
            Err(err) => {
                warn!(operation = %op, "greedy plan produced a rejected operation: {}", err);
                false
            }
        }
    }
}

/// `R(c+1) = R(c+1) * (1/diag)`, falling back to dividing by the pivot when
/// the two-decimal reciprocal would not land exactly on 1.
fn normalize_op(col: usize, diag: f64) -> String {
    let factor = canonicalize(1.0 / diag);
    if canonicalize(factor * diag) == 1.0 {
        format!("R{r} = R{r} * {}", format_number(factor), r = col + 1)
    } else {
        format!("R{r} = R{r} / {}", format_number(diag), r = col + 1)
    }
}

/// `R(row+1) = R(row+1) - val * R(col+1)`
fn eliminate_op(row: usize, col: usize, val: f64) -> String {
    if val < 0.0 {
        format!(
            "R{r} = R{r} + {} * R{p}",
            format_number(-val),
            r = row + 1,
            p = col + 1
        )
    } else {
        format!(
            "R{r} = R{r} - {} * R{p}",
            format_number(val),
            r = row + 1,
            p = col + 1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{build, GeneratorConfig};
    use proptest::prelude::*;

    fn matrix(rows: Vec<Vec<f64>>, aug: Vec<f64>) -> Matrix {
        Matrix::new(rows, aug).unwrap()
    }

    fn replay(matrix: &Matrix, ops: &[String]) -> Matrix {
        let mut fresh = matrix.clone();
        for op in ops {
            fresh.apply_str(op).unwrap();
        }
        fresh
    }

    #[test]
    fn test_identity_plus_noise() {
        let m = matrix(
            vec![
                vec![2.0, 1.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
            vec![5.0, 1.0, 7.0],
        );
        let before = m.clone();
        let est = estimate(&m);

        assert_eq!(m, before);
        assert_eq!(est.operations, vec!["R1 = R1 * 0.5", "R1 = R1 - 0.5 * R2"]);
        assert_eq!(est.move_count, est.operations.len());
        assert!(est.solves);

        let solved = replay(&m, &est.operations);
        assert!(solved.is_solved());
        assert_eq!(solved.augmented(), &[2.0, 1.0, 7.0]);
        assert_eq!(solved.move_count() as usize, est.move_count);
    }

    #[test]
    fn test_solved_matrix_needs_nothing() {
        let m = matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0]], vec![3.0, 4.0]);
        let est = estimate(&m);
        assert_eq!(est.move_count, 0);
        assert!(est.operations.is_empty());
        assert!(est.solves);
        assert_eq!(est.rating(2), Rating::Solved);
        assert_eq!(hint(&m), None);
    }

    #[test]
    fn test_non_terminating_reciprocal_divides() {
        let m = matrix(vec![vec![3.0, 0.0], vec![0.0, 1.0]], vec![6.0, 1.0]);
        let est = estimate(&m);
        assert_eq!(est.operations, vec!["R1 = R1 / 3"]);
        assert!(replay(&m, &est.operations).is_solved());
    }

    #[test]
    fn test_negative_entries_use_addition() {
        let m = matrix(vec![vec![1.0, 0.0], vec![-2.0, 1.0]], vec![1.0, 0.0]);
        let est = estimate(&m);
        assert_eq!(est.operations, vec!["R2 = R2 + 2 * R1"]);
        assert!(replay(&m, &est.operations).is_solved());
    }

    #[test]
    fn test_zero_pivot_stalls_without_error() {
        let m = matrix(vec![vec![0.0, 1.0], vec![1.0, 0.0]], vec![2.0, 3.0]);
        let est = estimate(&m);
        assert!(!est.solves);
        assert_eq!(est.move_count, est.operations.len());
    }

    #[test]
    fn test_hint_is_first_operation() {
        let m = matrix(vec![vec![4.0, 2.0], vec![2.0, 3.0]], vec![8.0, 7.0]);
        assert_eq!(hint(&m).as_deref(), Some("R1 = R1 * 0.25"));
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(Rating::from_moves(0, 3), Rating::Solved);
        assert_eq!(Rating::from_moves(3, 3), Rating::Easy);
        assert_eq!(Rating::from_moves(6, 3), Rating::Medium);
        assert_eq!(Rating::from_moves(9, 3), Rating::Hard);
    }

    #[test]
    fn test_fractional_factors_are_rounded() {
        let m = matrix(vec![vec![1.0, 0.0], vec![1.5, 1.0]], vec![1.0, 0.0]);
        assert_eq!(hint(&m).as_deref(), Some("R2 = R2 - 1.5 * R1"));
    }

    #[test]
    fn test_structured_puzzles_are_solved_by_plan() {
        for seed in 0..50 {
            let (generated, solution) = build(&GeneratorConfig::new(0, 0), seed);
            let est = estimate(&generated.matrix);
            assert!(est.move_count < 9, "seed {}", seed);

            let solved = replay(&generated.matrix, &est.operations);
            assert!(est.solves);
            assert!(solved.is_solved());
            let expected: Vec<f64> = solution.iter().map(|&s| s as f64).collect();
            assert!(generated.matrix.is_satisfied_by(&expected));
        }
    }

    proptest! {
        #[test]
        fn plan_replays_exactly(d in 0i64..=100, c in 0i64..=100, seed in any::<u64>()) {
            let (generated, _) = build(&GeneratorConfig::new(d, c), seed);
            let est = estimate(&generated.matrix);
            prop_assert_eq!(est.move_count, est.operations.len());
            prop_assert!(est.move_count <= 9);

            let replayed = replay(&generated.matrix, &est.operations);
            prop_assert_eq!(replayed.is_solved(), est.solves);
            prop_assert_eq!(generated.matrix.move_count(), 0);
        }
    }
}
