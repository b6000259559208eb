//! The puzzle state.

use crate::canonical::{canonical_eq, canonicalize, canonicalize_row, format_number};
use crate::error::{EngineError, EngineResult};
use crate::eval::{evaluate_row, RowDomain, ScalarDomain};
use crate::expr::Transformation;
use crate::row::dot;
use crate::rref;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A square linear system `coefficients · x = augmented` plus its move counter.
///
/// All cells are canonical. The only way to change a matrix after
/// construction is [`Matrix::apply`] (or [`Matrix::apply_str`]), which
/// either commits a whole transformation or changes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRecord", into = "MatrixRecord")]
pub struct Matrix {
    size: usize,
    coefficients: Vec<Vec<f64>>,
    augmented: Vec<f64>,
    move_count: u32,
    seed: Option<u64>,
}

/// Plain serialized form of a [`Matrix`], exchanged with session storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRecord {
    pub size: usize,
    pub coefficients: Vec<Vec<f64>>,
    pub augmented: Vec<f64>,
    #[serde(default)]
    pub move_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Matrix {
    /// Build a matrix from a coefficient block and augmented column.
    ///
    /// Fails with a domain error if the block is empty or not square, the
    /// augmented column has the wrong length, or any cell is not finite.
    pub fn new(coefficients: Vec<Vec<f64>>, augmented: Vec<f64>) -> EngineResult<Self> {
        let size = coefficients.len();
        Self::validate(size, &coefficients, &augmented)?;
        Ok(Self::from_parts(coefficients, augmented, None))
    }

    /// Rebuild a matrix from its serialized record.
    pub fn from_record(record: MatrixRecord) -> EngineResult<Self> {
        Self::validate(record.size, &record.coefficients, &record.augmented)?;
        let mut matrix = Self::from_parts(record.coefficients, record.augmented, record.seed);
        matrix.move_count = record.move_count;
        Ok(matrix)
    }

    /// Snapshot as a plain record.
    pub fn to_record(&self) -> MatrixRecord {
        self.clone().into()
    }

    pub(crate) fn from_parts(
        coefficients: Vec<Vec<f64>>,
        augmented: Vec<f64>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            size: coefficients.len(),
            coefficients: coefficients.iter().map(|r| canonicalize_row(r)).collect(),
            augmented: canonicalize_row(&augmented),
            move_count: 0,
            seed,
        }
    }

    fn validate(size: usize, coefficients: &[Vec<f64>], augmented: &[f64]) -> EngineResult<()> {
        if size == 0 {
            return Err(EngineError::domain("Matrix must have at least one row"));
        }
        if coefficients.len() != size {
            return Err(EngineError::domain(format!(
                "Matrix not correctly sized: expected {} coefficient rows, found {}",
                size,
                coefficients.len()
            )));
        }
        if let Some((i, row)) = coefficients.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(EngineError::domain(format!(
                "Matrix not correctly sized: row {} has {} entries, expected {}",
                i + 1,
                row.len(),
                size
            )));
        }
        if augmented.len() != size {
            return Err(EngineError::domain(format!(
                "Matrix not correctly sized: expected {} augmented entries, found {}",
                size,
                augmented.len()
            )));
        }
        let all_finite = coefficients.iter().flatten().chain(augmented).all(|x| x.is_finite());
        if !all_finite {
            return Err(EngineError::domain("Matrix cells must be finite numbers"));
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    pub fn augmented(&self) -> &[f64] {
        &self.augmented
    }

    /// Coefficient row `index` (0-based)
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.coefficients.get(index).map(Vec::as_slice)
    }

    /// Number of transformations committed so far
    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    /// Seed of the generator stream this puzzle came from, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// `true` once the coefficient block is the identity.
    pub fn is_solved(&self) -> bool {
        rref::is_solved(self)
    }

    /// Check `coefficients · solution == augmented` under canonical comparison.
    pub fn is_satisfied_by(&self, solution: &[f64]) -> bool {
        solution.len() == self.size
            && self
                .coefficients
                .iter()
                .zip(&self.augmented)
                .all(|(row, &y)| canonical_eq(dot(row, solution), y))
    }

    /// Parse `text` and apply it. See [`Matrix::apply`].
    pub fn apply_str(&mut self, text: &str) -> EngineResult<u32> {
        let result = Transformation::parse(text, self.size).and_then(|t| self.apply(&t));
        if let Err(err) = &result {
            debug!(kind = %err.kind(), input = text, "transformation rejected: {}", err);
        }
        result
    }

    /// Apply a transformation to both the coefficient row and the augmented
    /// entry of its target, returning the new move count.
    ///
    /// The expression is evaluated in both domains before anything is
    /// written. On error the matrix, including its move count, is untouched.
    pub fn apply(&mut self, transformation: &Transformation) -> EngineResult<u32> {
        let highest = transformation
            .expr
            .highest_row()
            .unwrap_or(0)
            .max(transformation.target);
        if highest >= self.size {
            return Err(EngineError::Range {
                index: highest + 1,
                size: self.size,
            });
        }

        let row = evaluate_row(&transformation.expr, &RowDomain::new(&self.coefficients))?;
        let value = evaluate_row(&transformation.expr, &ScalarDomain::new(&self.augmented))?;
        let move_count = self
            .move_count
            .checked_add(1)
            .ok_or_else(|| EngineError::domain("Move counter is exhausted"))?;

        let target = transformation.target;
        self.coefficients[target] = canonicalize_row(&row);
        self.augmented[target] = canonicalize(value);
        self.move_count = move_count;

        debug!(
            transformation = %transformation,
            move_count = self.move_count,
            "transformation applied"
        );
        Ok(self.move_count)
    }
}

impl TryFrom<MatrixRecord> for Matrix {
    type Error = EngineError;

    fn try_from(record: MatrixRecord) -> EngineResult<Self> {
        Self::from_record(record)
    }
}

impl From<Matrix> for MatrixRecord {
    fn from(matrix: Matrix) -> Self {
        Self {
            size: matrix.size,
            coefficients: matrix.coefficients,
            augmented: matrix.augmented,
            move_count: matrix.move_count,
            seed: matrix.seed,
        }
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (row, y)) in self.coefficients.iter().zip(&self.augmented).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row.iter().map(|&x| format_number(x)).collect();
            write!(f, "[{}] | {}", cells.join(", "), format_number(*y))?;
        }
        Ok(())
    }
}
