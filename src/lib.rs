//! Two-phase 3x3x3 cube solver.
//!
//! The solver reduces an arbitrary legal cube into the subgroup generated
//! by U, D and the four half turns, then finishes inside that subgroup.
//! Both phases run iterative-deepening A* over compact integer coordinates
//! backed by precomputed move and pruning tables.
//!
//! Construction builds the tables once; a [`Solver`] is then cheap to query
//! and safe to share across threads:
//!
//! ```no_run
//! use twophase::{Config, Solver};
//!
//! let solver = Solver::new(Config::default());
//! let solution = solver
//!     .solve("UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB")
//!     .unwrap();
//! assert!(solution.is_empty());
//! ```

pub mod coord;
pub mod cubie;
pub mod error;
pub mod facelet;
pub mod moves;
pub mod solver;
pub mod tables;

pub use cubie::CubieCube;
pub use error::SolveError;
pub use moves::{format_maneuver, parse_maneuver, random_scramble, Move, ALL_MOVES};
pub use solver::{Config, SolveReport, Solver};
