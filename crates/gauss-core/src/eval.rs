//! Dual-domain evaluation of transformation expressions.
//!
//! One expression tree is evaluated twice: over coefficient rows
//! ([`RowDomain`]) and over the augmented column ([`ScalarDomain`]). Operand
//! typing lives in the shared interpreter, not in the algebras, so a tree is
//! accepted or rejected identically in both domains. Only the arithmetic on
//! row elements differs.

use crate::error::{EngineError, EngineResult};
use crate::expr::{BinaryOp, Expr};
use crate::row::{add_rows, divide_row, scale_row, subtract_rows};

/// The operations a domain must provide for row references.
pub trait Algebra {
    /// What a row reference resolves to in this domain
    type Element: Clone;

    fn resolve(&self, row: usize) -> Self::Element;
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn subtract(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn scale(&self, a: &Self::Element, k: f64) -> Self::Element;
    /// `k` is never zero here
    fn divide(&self, a: &Self::Element, k: f64) -> Self::Element;
    fn is_finite(&self, a: &Self::Element) -> bool;
}

/// Rows resolve to coefficient vectors.
pub struct RowDomain<'a> {
    rows: &'a [Vec<f64>],
}

impl<'a> RowDomain<'a> {
    pub fn new(rows: &'a [Vec<f64>]) -> Self {
        Self { rows }
    }
}

impl Algebra for RowDomain<'_> {
    type Element = Vec<f64>;

    fn resolve(&self, row: usize) -> Vec<f64> {
        self.rows[row].clone()
    }

    fn add(&self, a: &Vec<f64>, b: &Vec<f64>) -> Vec<f64> {
        add_rows(a, b)
    }

    fn subtract(&self, a: &Vec<f64>, b: &Vec<f64>) -> Vec<f64> {
        subtract_rows(a, b)
    }

    fn scale(&self, a: &Vec<f64>, k: f64) -> Vec<f64> {
        scale_row(a, k)
    }

    fn divide(&self, a: &Vec<f64>, k: f64) -> Vec<f64> {
        divide_row(a, k)
    }

    fn is_finite(&self, a: &Vec<f64>) -> bool {
        a.iter().all(|x| x.is_finite())
    }
}

/// Rows resolve to their augmented-column entry.
pub struct ScalarDomain<'a> {
    values: &'a [f64],
}

impl<'a> ScalarDomain<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        Self { values }
    }
}

impl Algebra for ScalarDomain<'_> {
    type Element = f64;

    fn resolve(&self, row: usize) -> f64 {
        self.values[row]
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn subtract(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn scale(&self, a: &f64, k: f64) -> f64 {
        a * k
    }

    fn divide(&self, a: &f64, k: f64) -> f64 {
        a / k
    }

    fn is_finite(&self, a: &f64) -> bool {
        a.is_finite()
    }
}

/// An intermediate value: a plain literal scalar, or something derived from rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<E> {
    Scalar(f64),
    Row(E),
}

/// Evaluate `expr` in `algebra`, requiring a row-valued result.
pub fn evaluate_row<A: Algebra>(expr: &Expr, algebra: &A) -> EngineResult<A::Element> {
    match evaluate(expr, algebra)? {
        Value::Row(e) => Ok(e),
        Value::Scalar(_) => Err(EngineError::domain(
            "Transformation result is not a row: the right side must reference at least one row",
        )),
    }
}

/// Evaluate `expr` in `algebra`.
pub fn evaluate<A: Algebra>(expr: &Expr, algebra: &A) -> EngineResult<Value<A::Element>> {
    let value = match expr {
        Expr::Number(n) => Value::Scalar(*n),
        Expr::Row(i) => Value::Row(algebra.resolve(*i)),
        Expr::Negate(inner) => match evaluate(inner, algebra)? {
            Value::Scalar(s) => Value::Scalar(-s),
            Value::Row(e) => Value::Row(algebra.scale(&e, -1.0)),
        },
        Expr::Binary { op, left, right } => {
            let l = evaluate(left, algebra)?;
            let r = evaluate(right, algebra)?;
            apply_binary(*op, l, r, algebra)?
        }
    };

    let finite = match &value {
        Value::Scalar(s) => s.is_finite(),
        Value::Row(e) => algebra.is_finite(e),
    };
    if !finite {
        return Err(EngineError::domain("Result is too large to represent"));
    }
    Ok(value)
}

fn apply_binary<A: Algebra>(
    op: BinaryOp,
    left: Value<A::Element>,
    right: Value<A::Element>,
    algebra: &A,
) -> EngineResult<Value<A::Element>> {
    use Value::{Row, Scalar};

    let result = match (op, left, right) {
        (BinaryOp::Add, Scalar(a), Scalar(b)) => Scalar(a + b),
        (BinaryOp::Subtract, Scalar(a), Scalar(b)) => Scalar(a - b),
        (BinaryOp::Multiply, Scalar(a), Scalar(b)) => Scalar(a * b),
        (BinaryOp::Divide, Scalar(a), Scalar(b)) => Scalar(a / nonzero(b)?),

        (BinaryOp::Add, Row(a), Row(b)) => Row(algebra.add(&a, &b)),
        (BinaryOp::Subtract, Row(a), Row(b)) => Row(algebra.subtract(&a, &b)),
        (BinaryOp::Multiply, Row(a), Scalar(k)) | (BinaryOp::Multiply, Scalar(k), Row(a)) => {
            Row(algebra.scale(&a, k))
        }
        (BinaryOp::Divide, Row(a), Scalar(k)) => Row(algebra.divide(&a, nonzero(k)?)),

        (BinaryOp::Add, _, _) => {
            return Err(EngineError::type_error("Can only add rows to rows"))
        }
        (BinaryOp::Subtract, _, _) => {
            return Err(EngineError::type_error("Can only subtract rows from rows"))
        }
        (BinaryOp::Multiply, Row(_), Row(_)) => {
            return Err(EngineError::type_error("Row can only be multiplied by a scalar"))
        }
        (BinaryOp::Divide, Row(_), Row(_)) => {
            return Err(EngineError::type_error("Row can only be divided by a scalar"))
        }
        (BinaryOp::Divide, Scalar(_), Row(_)) => {
            return Err(EngineError::type_error("Cannot divide a scalar by a row"))
        }
    };
    Ok(result)
}

fn nonzero(k: f64) -> EngineResult<f64> {
    if k == 0.0 {
        Err(EngineError::domain("Division by zero"))
    } else {
        Ok(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::expr::parse;

    fn rows() -> Vec<Vec<f64>> {
        vec![
            vec![2.0, 0.0, 0.0],
            vec![0.0, 3.0, 0.0],
            vec![1.0, 1.0, 1.0],
        ]
    }

    const AUG: [f64; 3] = [4.0, 9.0, 6.0];

    fn both(text: &str) -> (EngineResult<Vec<f64>>, EngineResult<f64>) {
        let t = parse(text, 3).unwrap();
        let rows = rows();
        (
            evaluate_row(&t.expr, &RowDomain::new(&rows)),
            evaluate_row(&t.expr, &ScalarDomain::new(&AUG)),
        )
    }

    #[test]
    fn test_linear_combination_in_both_domains() {
        let (r, s) = both("R3 = R3 - 0.5 * R1 + R2 / 3");
        assert_eq!(r.unwrap(), vec![0.0, 2.0, 1.0]);
        assert_eq!(s.unwrap(), 6.0 - 2.0 + 3.0);
    }

    #[test]
    fn test_scalar_subexpressions_allowed() {
        let (r, s) = both("R1 = R1 * (1 + 1) / 4");
        assert_eq!(r.unwrap(), vec![1.0, 0.0, 0.0]);
        assert_eq!(s.unwrap(), 2.0);

        let (r, s) = both("R2 = -(-R2)");
        assert_eq!(r.unwrap(), vec![0.0, 3.0, 0.0]);
        assert_eq!(s.unwrap(), 9.0);
    }

    #[test]
    fn test_both_domains_reject_identically() {
        let cases = [
            ("R1 = R1 * R2", ErrorKind::TypeError),
            ("R1 = R1 / R2", ErrorKind::TypeError),
            ("R1 = 2 / R1", ErrorKind::TypeError),
            ("R1 = R1 + 2", ErrorKind::TypeError),
            ("R1 = 2 - R1", ErrorKind::TypeError),
            ("R1 = R1 / 0", ErrorKind::DomainError),
            ("R1 = R1 * (1 / (2 - 2))", ErrorKind::DomainError),
            ("R1 = 5", ErrorKind::DomainError),
            ("R1 = 2 * 3 - 1", ErrorKind::DomainError),
        ];
        for (text, kind) in cases {
            let (r, s) = both(text);
            assert_eq!(r.unwrap_err().kind(), kind, "row domain: {}", text);
            assert_eq!(s.unwrap_err().kind(), kind, "scalar domain: {}", text);
        }
    }

    #[test]
    fn test_overflow_is_domain_error() {
        let big = "9".repeat(200);
        let (r, s) = both(&format!("R1 = R1 * {big} * {big}"));
        assert_eq!(r.unwrap_err().kind(), ErrorKind::DomainError);
        assert_eq!(s.unwrap_err().kind(), ErrorKind::DomainError);
    }
}
