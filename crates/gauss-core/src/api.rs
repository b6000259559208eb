//! Plain-data operations for hosts that keep puzzles outside the engine
//! (session stores, request handlers, front-ends). Everything here takes and
//! returns serializable records.

use crate::error::ErrorKind;
use crate::estimator::estimate;
use crate::generator::generate;
use crate::matrix::{Matrix, MatrixRecord};
use serde::{Deserialize, Serialize};

/// Outcome of [`apply`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    pub ok: bool,
    /// The updated matrix, present only when `ok`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<MatrixRecord>,
    pub move_count: u32,
    pub is_solved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Apply `text` to `matrix`. On failure the matrix is unchanged and the
/// response carries the error kind and message.
pub fn apply(matrix: &mut Matrix, text: &str) -> ApplyResponse {
    match matrix.apply_str(text) {
        Ok(move_count) => ApplyResponse {
            ok: true,
            matrix: Some(matrix.to_record()),
            move_count,
            is_solved: matrix.is_solved(),
            error_kind: None,
            message: None,
        },
        Err(err) => ApplyResponse {
            ok: false,
            matrix: None,
            move_count: matrix.move_count(),
            is_solved: matrix.is_solved(),
            error_kind: Some(err.kind()),
            message: Some(err.to_string()),
        },
    }
}

/// A freshly generated puzzle with its replay seed and greedy estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPuzzle {
    pub matrix: MatrixRecord,
    pub seed: u64,
    pub gods_number: usize,
    pub operations: Vec<String>,
}

pub fn new_puzzle(difficulty: i64, compressibility: i64, seed: Option<u64>) -> NewPuzzle {
    let generated = generate(difficulty, compressibility, seed);
    let est = estimate(&generated.matrix);
    NewPuzzle {
        matrix: generated.matrix.to_record(),
        seed: generated.seed,
        gods_number: est.move_count,
        operations: est.operations,
    }
}
