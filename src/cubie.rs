//! Cubie-level cube model: where each corner and edge piece sits and how it
//! is oriented. Face turns are applied by composing with one of 18
//! precomputed basis cubies.
//!
//! Corner slots are URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB (0..8); edge
//! slots are UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR (0..12). The
//! last four edge slots form the UD slice.

use std::sync::OnceLock;

use crate::error::SolveError;
use crate::moves::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubieCube {
    /// cp[i] = which corner piece sits in slot i.
    pub cp: [u8; 8],
    /// co[i] = clockwise twist of the piece in slot i, mod 3.
    pub co: [u8; 8],
    /// ep[i] = which edge piece sits in slot i.
    pub ep: [u8; 12],
    /// eo[i] = flip of the piece in slot i, mod 2.
    pub eo: [u8; 12],
}

impl CubieCube {
    pub const SOLVED: CubieCube = CubieCube {
        cp: [0, 1, 2, 3, 4, 5, 6, 7],
        co: [0; 8],
        ep: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        eo: [0; 12],
    };

    pub fn is_solved(&self) -> bool {
        *self == Self::SOLVED
    }

    /// Group composition: the state reached by performing `rhs` after
    /// `self`. For each slot i, `rhs.cp[i]` names the slot whose content
    /// moves into i, and `rhs.co[i]` is the twist the move adds there.
    pub fn multiplied(&self, rhs: &CubieCube) -> CubieCube {
        let mut out = CubieCube::SOLVED;
        for i in 0..8 {
            let from = rhs.cp[i] as usize;
            out.cp[i] = self.cp[from];
            out.co[i] = (self.co[from] + rhs.co[i]) % 3;
        }
        for i in 0..12 {
            let from = rhs.ep[i] as usize;
            out.ep[i] = self.ep[from];
            out.eo[i] = (self.eo[from] + rhs.eo[i]) % 2;
        }
        out
    }

    pub fn apply(&mut self, m: Move) {
        *self = self.multiplied(&move_cubies()[m.index()]);
    }

    pub fn apply_all(&mut self, moves: &[Move]) {
        for &m in moves {
            self.apply(m);
        }
    }

    /// Check the reachability invariants: every piece present exactly once,
    /// twist sum divisible by 3, flip sum even, and corner permutation
    /// parity equal to edge permutation parity.
    pub fn verify(&self) -> Result<(), SolveError> {
        let invalid = |reason: String| SolveError::InvalidCube { reason };

        let mut corner_seen = [false; 8];
        for &c in &self.cp {
            if c >= 8 || corner_seen[c as usize] {
                return Err(invalid("corner piece missing or duplicated".into()));
            }
            corner_seen[c as usize] = true;
        }
        let mut edge_seen = [false; 12];
        for &e in &self.ep {
            if e >= 12 || edge_seen[e as usize] {
                return Err(invalid("edge piece missing or duplicated".into()));
            }
            edge_seen[e as usize] = true;
        }

        let twist: u32 = self.co.iter().map(|&o| o as u32).sum();
        if self.co.iter().any(|&o| o >= 3) || twist % 3 != 0 {
            return Err(invalid(format!("corner twist sum {twist} is not divisible by 3")));
        }
        let flip: u32 = self.eo.iter().map(|&o| o as u32).sum();
        if self.eo.iter().any(|&o| o >= 2) || flip % 2 != 0 {
            return Err(invalid(format!("edge flip sum {flip} is odd")));
        }

        if permutation_parity(&self.cp) != permutation_parity(&self.ep) {
            return Err(invalid(
                "corner and edge permutation parities differ".into(),
            ));
        }
        Ok(())
    }
}

/// Inversion count mod 2.
pub(crate) fn permutation_parity(perm: &[u8]) -> u8 {
    let mut inversions = 0u32;
    for i in 0..perm.len() {
        for j in i + 1..perm.len() {
            if perm[j] < perm[i] {
                inversions += 1;
            }
        }
    }
    (inversions % 2) as u8
}

/// The 18 basis cubies indexed by `Move`. Quarter turns are hard-coded;
/// half and counter-clockwise turns are the quarter turn composed with
/// itself once and twice.
pub(crate) fn move_cubies() -> &'static [CubieCube; 18] {
    static CUBIES: OnceLock<[CubieCube; 18]> = OnceLock::new();
    CUBIES.get_or_init(|| {
        let quarters = [
            // U
            CubieCube {
                cp: [3, 0, 1, 2, 4, 5, 6, 7],
                co: [0; 8],
                ep: [3, 0, 1, 2, 4, 5, 6, 7, 8, 9, 10, 11],
                eo: [0; 12],
            },
            // R
            CubieCube {
                cp: [4, 1, 2, 0, 7, 5, 6, 3],
                co: [2, 0, 0, 1, 1, 0, 0, 2],
                ep: [8, 1, 2, 3, 11, 5, 6, 7, 4, 9, 10, 0],
                eo: [0; 12],
            },
            // F
            CubieCube {
                cp: [1, 5, 2, 3, 0, 4, 6, 7],
                co: [1, 2, 0, 0, 2, 1, 0, 0],
                ep: [0, 9, 2, 3, 4, 8, 6, 7, 1, 5, 10, 11],
                eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
            },
            // D
            CubieCube {
                cp: [0, 1, 2, 3, 5, 6, 7, 4],
                co: [0; 8],
                ep: [0, 1, 2, 3, 5, 6, 7, 4, 8, 9, 10, 11],
                eo: [0; 12],
            },
            // L
            CubieCube {
                cp: [0, 2, 6, 3, 4, 1, 5, 7],
                co: [0, 1, 2, 0, 0, 2, 1, 0],
                ep: [0, 1, 10, 3, 4, 5, 9, 7, 8, 2, 6, 11],
                eo: [0; 12],
            },
            // B
            CubieCube {
                cp: [0, 1, 3, 7, 4, 5, 2, 6],
                co: [0, 0, 1, 2, 0, 0, 2, 1],
                ep: [0, 1, 2, 11, 4, 5, 6, 10, 8, 9, 3, 7],
                eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
            },
        ];
        let mut all = [CubieCube::SOLVED; 18];
        for (face, quarter) in quarters.iter().enumerate() {
            let half = quarter.multiplied(quarter);
            let ccw = half.multiplied(quarter);
            all[face * 3] = *quarter;
            all[face * 3 + 1] = half;
            all[face * 3 + 2] = ccw;
        }
        all
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{parse_maneuver, ALL_MOVES};

    #[test]
    fn quarter_turns_have_order_four() {
        for face in 0..6 {
            let m = ALL_MOVES[face * 3];
            let mut c = CubieCube::SOLVED;
            for turns in 1..=4 {
                c.apply(m);
                assert_eq!(c.is_solved(), turns == 4, "{m} at {turns} turns");
            }
        }
    }

    #[test]
    fn derived_turns_match_repeated_quarters() {
        for face in 0..6 {
            let quarter = ALL_MOVES[face * 3];
            let half = ALL_MOVES[face * 3 + 1];
            let ccw = ALL_MOVES[face * 3 + 2];

            let mut a = CubieCube::SOLVED;
            a.apply(half);
            let mut b = CubieCube::SOLVED;
            b.apply_all(&[quarter, quarter]);
            assert_eq!(a, b);

            let mut a = CubieCube::SOLVED;
            a.apply_all(&[quarter, ccw]);
            assert!(a.is_solved());
        }
    }

    #[test]
    fn quarter_turns_cycle_four_edges() {
        // Each face turn is a 4-cycle on edges, so its half turn is a pair
        // of swaps, never the identity.
        for face in 0..6 {
            let quarter = ALL_MOVES[face * 3];
            let mut once = CubieCube::SOLVED;
            once.apply(quarter);
            assert_eq!(
                once.ep.iter().zip(&CubieCube::SOLVED.ep).filter(|(a, b)| a != b).count(),
                4,
                "face {face}"
            );
            let mut twice = once;
            twice.apply(quarter);
            assert_ne!(twice.ep, CubieCube::SOLVED.ep, "face {face}");
        }
    }

    #[test]
    fn sexy_move_has_order_six() {
        let sexy = parse_maneuver("R U R' U'").unwrap();
        let mut c = CubieCube::SOLVED;
        for reps in 1..=6 {
            c.apply_all(&sexy);
            assert_eq!(c.is_solved(), reps == 6);
        }
    }

    #[test]
    fn orientation_sums_stay_invariant() {
        let scramble = parse_maneuver("R U2 F' D B2 L F2 D' B U' R2 L'").unwrap();
        let mut c = CubieCube::SOLVED;
        for &m in &scramble {
            c.apply(m);
            assert!(c.verify().is_ok());
        }
    }

    #[test]
    fn verify_rejects_lone_twist() {
        let mut c = CubieCube::SOLVED;
        c.co[0] = 1;
        assert!(matches!(c.verify(), Err(SolveError::InvalidCube { .. })));
    }

    #[test]
    fn verify_rejects_lone_flip() {
        let mut c = CubieCube::SOLVED;
        c.eo[5] = 1;
        assert!(matches!(c.verify(), Err(SolveError::InvalidCube { .. })));
    }

    #[test]
    fn verify_rejects_parity_mismatch() {
        let mut c = CubieCube::SOLVED;
        c.ep.swap(0, 1);
        assert!(matches!(c.verify(), Err(SolveError::InvalidCube { .. })));
    }

    #[test]
    fn verify_rejects_duplicate_piece() {
        let mut c = CubieCube::SOLVED;
        c.cp[1] = 0;
        assert!(matches!(c.verify(), Err(SolveError::InvalidCube { .. })));
    }

    #[test]
    fn parity_flips_with_each_quarter_turn() {
        for face in 0..6 {
            let mut c = CubieCube::SOLVED;
            c.apply(ALL_MOVES[face * 3]);
            assert_eq!(permutation_parity(&c.cp), 1);
            assert_eq!(permutation_parity(&c.ep), 1);
            c.apply(ALL_MOVES[face * 3]);
            assert_eq!(permutation_parity(&c.cp), 0);
        }
    }
}
