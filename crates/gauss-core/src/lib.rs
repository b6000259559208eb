//! Gauss - a row-reduction puzzle engine
//!
//! Generates solvable linear systems with tunable difficulty and structure,
//! applies player-written row transformations such as `R2 = R2 - 3 * R1`,
//! and detects when the coefficient block has been reduced to the identity.
//!
//! ```
//! use gauss_core::{estimate, generate};
//!
//! let puzzle = generate(20, 5, Some(42));
//! let mut matrix = puzzle.matrix;
//! for op in estimate(&matrix).operations {
//!     matrix.apply_str(&op).unwrap();
//! }
//! assert!(matrix.is_solved());
//! ```

pub mod api;
pub mod canonical;
pub mod error;
pub mod estimator;
pub mod eval;
pub mod expr;
pub mod generator;
pub mod matrix;
pub mod row;
pub mod rref;

pub use api::{apply, new_puzzle, ApplyResponse, NewPuzzle};
pub use canonical::{canonical_eq, canonicalize, format_number};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use estimator::{estimate, hint, Estimate, Rating};
pub use expr::{parse, Expr, Transformation};
pub use generator::{generate, generate_seeded, Generated, Generator, GeneratorConfig, Regime};
pub use matrix::{Matrix, MatrixRecord};
pub use rref::is_solved;
