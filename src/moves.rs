//! The move alphabet: 18 face turns encoded as `face * 3 + amount`.
//!
//! Faces are ordered U, R, F, D, L, B; amounts are clockwise quarter, half,
//! counter-clockwise quarter. The enum discriminants are the table indices
//! used everywhere downstream, so the declaration order is load-bearing.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::SolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Move {
    U1,
    U2,
    U3,
    R1,
    R2,
    R3,
    F1,
    F2,
    F3,
    D1,
    D2,
    D3,
    L1,
    L2,
    L3,
    B1,
    B2,
    B3,
}

use Move::*;

/// All moves in the canonical try-order of the search: faces U, R, F, D, L,
/// B, and within each face clockwise, half, counter-clockwise.
pub const ALL_MOVES: [Move; 18] = [
    U1, U2, U3, R1, R2, R3, F1, F2, F3, D1, D2, D3, L1, L2, L3, B1, B2, B3,
];

/// The ten moves generating the restricted group: quarter and half turns of
/// U and D, half turns of the other four faces. Same relative order as
/// [`ALL_MOVES`].
pub const PHASE2_MOVES: [Move; 10] = [U1, U2, U3, R2, F2, D1, D2, D3, L2, B2];

const FACE_CHARS: [char; 6] = ['U', 'R', 'F', 'D', 'L', 'B'];
const AMOUNT_SUFFIXES: [&str; 3] = ["", "2", "'"];

impl Move {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn face(self) -> usize {
        self as usize / 3
    }

    /// 0 = clockwise quarter, 1 = half, 2 = counter-clockwise quarter.
    #[inline]
    pub fn amount(self) -> usize {
        self as usize % 3
    }

    /// Whether the move keeps the restricted group closed.
    #[inline]
    pub fn is_phase2(self) -> bool {
        let f = self.face();
        f == 0 || f == 3 || self.amount() == 1
    }

    /// The move undoing this one.
    pub fn inverse(self) -> Move {
        ALL_MOVES[self.face() * 3 + (2 - self.amount())]
    }

    /// Successor legality: a move may not repeat the previous face, and of
    /// an opposite-face pair only the smaller-index face may come first.
    /// This removes both `R R'`-style cancellations and `U D` / `D U`
    /// duplicates from the search tree.
    #[inline]
    pub fn follows(self, prev: Move) -> bool {
        let f = self.face();
        let p = prev.face();
        f != p && f != p + 3
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            FACE_CHARS[self.face()],
            AMOUNT_SUFFIXES[self.amount()]
        )
    }
}

impl FromStr for Move {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Move, SolveError> {
        let err = || SolveError::InvalidManeuver {
            token: s.to_owned(),
        };
        let mut chars = s.chars();
        let face = match chars.next() {
            Some(c) => FACE_CHARS.iter().position(|&f| f == c).ok_or_else(err)?,
            None => return Err(err()),
        };
        let amount = match chars.as_str() {
            "" => 0,
            "2" => 1,
            "'" => 2,
            _ => return Err(err()),
        };
        Ok(ALL_MOVES[face * 3 + amount])
    }
}

/// Parse a whitespace-separated maneuver such as `R U R' U'`.
pub fn parse_maneuver(s: &str) -> Result<Vec<Move>, SolveError> {
    s.split_whitespace().map(Move::from_str).collect()
}

/// Render a maneuver as a whitespace-separated token string.
pub fn format_maneuver(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Draw a random scramble of `len` moves obeying successor legality, so the
/// scramble never contains trivially cancelling neighbors.
pub fn random_scramble(len: usize, rng: &mut impl Rng) -> Vec<Move> {
    let mut out: Vec<Move> = Vec::with_capacity(len);
    while out.len() < len {
        let m = ALL_MOVES[rng.random_range(0..ALL_MOVES.len())];
        if let Some(&prev) = out.last() {
            if !m.follows(prev) {
                continue;
            }
        }
        out.push(m);
    }
    out
}
