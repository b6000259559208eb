//! Solved-state detection.
//!
//! A puzzle is solved when its coefficient block is exactly the identity
//! under canonical comparison. The augmented column is not inspected; once
//! the block is the identity it holds the solution by construction.

use crate::canonical::canonicalize;
use crate::matrix::Matrix;

/// The value cell `(row, col)` takes in the identity matrix.
pub fn identity_value(row: usize, col: usize) -> f64 {
    if row == col {
        1.0
    } else {
        0.0
    }
}

/// `true` if `value` already matches the identity at `(row, col)`.
pub fn cell_in_place(row: usize, col: usize, value: f64) -> bool {
    canonicalize(value) == identity_value(row, col)
}

/// `true` if every cell of `rows` matches the identity.
pub fn is_identity(rows: &[Vec<f64>]) -> bool {
    rows.iter().enumerate().all(|(i, row)| {
        row.len() == rows.len()
            && row
                .iter()
                .enumerate()
                .all(|(j, &value)| cell_in_place(i, j, value))
    })
}

/// `true` if the matrix's coefficient block is the identity.
pub fn is_solved(matrix: &Matrix) -> bool {
    is_identity(matrix.coefficients())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_detection() {
        assert!(is_identity(&[vec![1.0]]));
        assert!(is_identity(&[vec![1.0, 0.0], vec![0.0, 1.0]]));
        assert!(is_identity(&[
            vec![0.999_999, 0.001, 0.0],
            vec![-0.004, 1.0, 0.0],
            vec![0.0, 0.0, 1.004],
        ]));
        assert!(!is_identity(&[vec![1.0, 0.01], vec![0.0, 1.0]]));
        assert!(!is_identity(&[vec![0.0, 1.0], vec![1.0, 0.0]]));
        assert!(!is_identity(&[vec![1.0, 0.0]]));
    }

    #[test]
    fn test_augmented_column_is_ignored() {
        let m = Matrix::new(
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![123.45, -7.0],
        )
        .unwrap();
        assert!(is_solved(&m));
    }

    #[test]
    fn test_cell_in_place() {
        assert!(cell_in_place(0, 0, 1.0));
        assert!(cell_in_place(0, 1, 0.004));
        assert!(!cell_in_place(1, 1, 0.99));
    }
}
