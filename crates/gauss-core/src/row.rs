//! Element-wise algebra over coefficient rows.
//!
//! All functions assume equal-length operands; the evaluator only ever
//! combines rows of the same matrix.

/// `a + b`, element-wise.
pub fn add_rows(a: &[f64], b: &[f64]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// `a - b`, element-wise.
pub fn subtract_rows(a: &[f64], b: &[f64]) -> Vec<f64> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// `row * k`.
pub fn scale_row(row: &[f64], k: f64) -> Vec<f64> {
    row.iter().map(|x| x * k).collect()
}

/// `row / k`. The caller rejects `k == 0` before getting here.
pub fn divide_row(row: &[f64], k: f64) -> Vec<f64> {
    row.iter().map(|x| x / k).collect()
}

/// Dot product, used when checking a candidate solution.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
