//! Precomputed transition and pruning tables.
//!
//! Move tables map a coordinate and a move to the successor coordinate;
//! pruning tables hold lower bounds on the distance to the phase target,
//! computed by breadth-first search over coordinate product graphs. Both
//! are built once at solver construction and never mutated afterwards.

use std::time::Instant;

use crate::coord::{
    self, N_FLIP, N_PERM4, N_PERM8, N_SLICE, N_TWIST,
};
use crate::cubie::CubieCube;
use crate::moves::{Move, ALL_MOVES, PHASE2_MOVES};

const UNVISITED: u8 = 0x0F;

/// Distance table packed two 4-bit entries per byte. All depths the
/// two-phase decomposition produces fit a nibble; construction asserts it.
pub struct PruningTable {
    data: Vec<u8>,
}

impl PruningTable {
    fn new(entries: usize) -> PruningTable {
        PruningTable {
            data: vec![0xFF; entries.div_ceil(2)],
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        let byte = self.data[index >> 1];
        if index & 1 == 0 {
            byte & 0x0F
        } else {
            byte >> 4
        }
    }

    fn set(&mut self, index: usize, value: u8) {
        let byte = &mut self.data[index >> 1];
        if index & 1 == 0 {
            *byte = (*byte & 0xF0) | value;
        } else {
            *byte = (*byte & 0x0F) | (value << 4);
        }
    }
}

/// All move and pruning tables of both phases.
pub struct Tables {
    // Phase 1: successor coordinate per (coordinate, move), all 18 moves.
    pub twist_move: Vec<u16>,
    pub flip_move: Vec<u16>,
    pub slice_move: Vec<u16>,
    // Phase 2: restricted-group coordinates over the 10 phase-2 columns.
    // Out-of-group moves have no column, so they cannot be expressed here.
    pub corner_move: Vec<u16>,
    pub edge8_move: Vec<u16>,
    pub slice_perm_move: Vec<u16>,

    pub twist_slice_prune: PruningTable,
    pub flip_slice_prune: PruningTable,
    pub corner_slice_prune: PruningTable,
    pub edge8_slice_prune: PruningTable,
}

impl Tables {
    pub fn new() -> Tables {
        let started = Instant::now();

        let twist_move = build_move_table(N_TWIST, &ALL_MOVES, coord::set_twist, coord::twist);
        let flip_move = build_move_table(N_FLIP, &ALL_MOVES, coord::set_flip, coord::flip);
        let slice_move = build_move_table(N_SLICE, &ALL_MOVES, coord::set_slice, coord::slice);
        let corner_move = build_move_table(
            N_PERM8,
            &PHASE2_MOVES,
            coord::set_corner_perm,
            coord::corner_perm,
        );
        let edge8_move = build_move_table(
            N_PERM8,
            &PHASE2_MOVES,
            coord::set_edge8_perm,
            coord::edge8_perm,
        );
        let slice_perm_move = build_move_table(
            N_PERM4,
            &PHASE2_MOVES,
            coord::set_slice_perm,
            coord::slice_perm,
        );
        log::debug!("move tables built in {:?}", started.elapsed());

        let twist_slice_prune = build_pruning_table(
            N_TWIST,
            N_SLICE,
            ALL_MOVES.len(),
            &twist_move,
            &slice_move,
            "twist-slice",
        );
        let flip_slice_prune = build_pruning_table(
            N_FLIP,
            N_SLICE,
            ALL_MOVES.len(),
            &flip_move,
            &slice_move,
            "flip-slice",
        );
        let corner_slice_prune = build_pruning_table(
            N_PERM8,
            N_PERM4,
            PHASE2_MOVES.len(),
            &corner_move,
            &slice_perm_move,
            "corner-slice",
        );
        let edge8_slice_prune = build_pruning_table(
            N_PERM8,
            N_PERM4,
            PHASE2_MOVES.len(),
            &edge8_move,
            &slice_perm_move,
            "edge8-slice",
        );

        log::info!("solver tables ready in {:?}", started.elapsed());
        Tables {
            twist_move,
            flip_move,
            slice_move,
            corner_move,
            edge8_move,
            slice_perm_move,
            twist_slice_prune,
            flip_slice_prune,
            corner_slice_prune,
            edge8_slice_prune,
        }
    }

    /// Admissible lower bound on the moves needed to reach the restricted
    /// group: the larger of two projected true distances.
    #[inline]
    pub fn phase1_bound(&self, twist: usize, flip: usize, slice: usize) -> u8 {
        self.twist_slice_prune
            .get(twist * N_SLICE + slice)
            .max(self.flip_slice_prune.get(flip * N_SLICE + slice))
    }

    /// Admissible lower bound on the moves needed to finish within the
    /// restricted group.
    #[inline]
    pub fn phase2_bound(&self, corner: usize, edge8: usize, slice_perm: usize) -> u8 {
        self.corner_slice_prune
            .get(corner * N_PERM4 + slice_perm)
            .max(self.edge8_slice_prune.get(edge8 * N_PERM4 + slice_perm))
    }
}

/// For every coordinate value, realize a canonical cubie state, apply each
/// move and re-rank. The resulting flat table is indexed by
/// `coordinate * moves.len() + move_column`.
fn build_move_table(
    count: usize,
    moves: &[Move],
    set: impl Fn(&mut CubieCube, u16),
    get: impl Fn(&CubieCube) -> u16,
) -> Vec<u16> {
    let mut table = vec![0u16; count * moves.len()];
    for value in 0..count {
        let mut cube = CubieCube::SOLVED;
        set(&mut cube, value as u16);
        for (column, &m) in moves.iter().enumerate() {
            let mut moved = cube;
            moved.apply(m);
            table[value * moves.len() + column] = get(&moved);
        }
    }
    table
}

/// Backward BFS from the target pair over the product graph of two move
/// tables, by repeated whole-table scans. Every generating move set is
/// closed under inversion, so forward propagation from the target yields
/// true distances. The scan order makes construction deterministic.
fn build_pruning_table(
    n_a: usize,
    n_b: usize,
    columns: usize,
    a_move: &[u16],
    b_move: &[u16],
    label: &str,
) -> PruningTable {
    let started = Instant::now();
    let total = n_a * n_b;
    let mut table = PruningTable::new(total);
    table.set(0, 0);
    let mut filled = 1usize;
    let mut depth = 0u8;

    loop {
        let mut grown = 0usize;
        for a in 0..n_a {
            for b in 0..n_b {
                if table.get(a * n_b + b) != depth {
                    continue;
                }
                for column in 0..columns {
                    let next_a = a_move[a * columns + column] as usize;
                    let next_b = b_move[b * columns + column] as usize;
                    let next = next_a * n_b + next_b;
                    if table.get(next) == UNVISITED {
                        table.set(next, depth + 1);
                        grown += 1;
                    }
                }
            }
        }
        if grown == 0 {
            break;
        }
        filled += grown;
        depth += 1;
        assert!(
            depth < UNVISITED,
            "{label} pruning depth overflows nibble storage"
        );
    }

    log::info!(
        "{label} pruning table: {filled}/{total} entries, max depth {depth}, built in {:?}",
        started.elapsed()
    );
    table
}

#[cfg(test)]
pub(crate) fn shared() -> std::sync::Arc<Tables> {
    use std::sync::{Arc, OnceLock};
    static TABLES: OnceLock<Arc<Tables>> = OnceLock::new();
    TABLES.get_or_init(|| Arc::new(Tables::new())).clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{random_scramble, PHASE2_MOVES};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn scrambled_cubes(count: usize, len: usize, moves: &[Move], seed: u64) -> Vec<CubieCube> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let mut cube = CubieCube::SOLVED;
                while cube.is_solved() {
                    let mut scramble = random_scramble(len, &mut rng);
                    scramble.retain(|m| moves.contains(m));
                    cube = CubieCube::SOLVED;
                    cube.apply_all(&scramble);
                }
                cube
            })
            .collect()
    }

    #[test]
    fn phase1_move_tables_commute_with_cubie_moves() {
        let tables = shared();
        for cube in scrambled_cubes(25, 30, &ALL_MOVES, 11) {
            for (i, &m) in ALL_MOVES.iter().enumerate() {
                let mut moved = cube;
                moved.apply(m);
                let t = coord::twist(&cube) as usize;
                let f = coord::flip(&cube) as usize;
                let s = coord::slice(&cube) as usize;
                assert_eq!(tables.twist_move[t * 18 + i], coord::twist(&moved));
                assert_eq!(tables.flip_move[f * 18 + i], coord::flip(&moved));
                assert_eq!(tables.slice_move[s * 18 + i], coord::slice(&moved));
            }
        }
    }

    #[test]
    fn phase2_move_tables_commute_with_cubie_moves() {
        let tables = shared();
        for cube in scrambled_cubes(25, 40, &PHASE2_MOVES, 13) {
            for (column, &m) in PHASE2_MOVES.iter().enumerate() {
                let mut moved = cube;
                moved.apply(m);
                let c = coord::corner_perm(&cube) as usize;
                let e = coord::edge8_perm(&cube) as usize;
                let s = coord::slice_perm(&cube) as usize;
                assert_eq!(tables.corner_move[c * 10 + column], coord::corner_perm(&moved));
                assert_eq!(tables.edge8_move[e * 10 + column], coord::edge8_perm(&moved));
                assert_eq!(
                    tables.slice_perm_move[s * 10 + column],
                    coord::slice_perm(&moved)
                );
            }
        }
    }

    #[test]
    fn pruning_is_zero_exactly_at_the_target() {
        let tables = shared();
        assert_eq!(tables.phase1_bound(0, 0, 0), 0);
        assert_eq!(tables.phase2_bound(0, 0, 0), 0);
        // A state outside the restricted group must get a positive bound.
        let mut cube = CubieCube::SOLVED;
        cube.apply(Move::R1);
        let bound = tables.phase1_bound(
            coord::twist(&cube) as usize,
            coord::flip(&cube) as usize,
            coord::slice(&cube) as usize,
        );
        assert_eq!(bound, 1);
    }

    #[test]
    fn phase1_bound_is_admissible_on_short_scrambles() {
        let tables = shared();
        let mut rng = SmallRng::seed_from_u64(17);
        for len in 1..=6 {
            for _ in 0..10 {
                let mut cube = CubieCube::SOLVED;
                cube.apply_all(&random_scramble(len, &mut rng));
                let bound = tables.phase1_bound(
                    coord::twist(&cube) as usize,
                    coord::flip(&cube) as usize,
                    coord::slice(&cube) as usize,
                ) as usize;
                assert!(bound <= len, "bound {bound} exceeds scramble length {len}");
            }
        }
    }

    #[test]
    fn phase2_bound_is_admissible_on_short_scrambles() {
        let tables = shared();
        let mut rng = SmallRng::seed_from_u64(19);
        for len in 1..=6 {
            for _ in 0..10 {
                let mut scramble = random_scramble(30, &mut rng);
                scramble.retain(|m| m.is_phase2());
                scramble.truncate(len);
                let mut cube = CubieCube::SOLVED;
                cube.apply_all(&scramble);
                let bound = tables.phase2_bound(
                    coord::corner_perm(&cube) as usize,
                    coord::edge8_perm(&cube) as usize,
                    coord::slice_perm(&cube) as usize,
                ) as usize;
                assert!(bound <= scramble.len());
            }
        }
    }

    #[test]
    fn pruning_changes_by_at_most_one_per_move() {
        let tables = shared();
        for cube in scrambled_cubes(20, 25, &ALL_MOVES, 23) {
            let here = tables.phase1_bound(
                coord::twist(&cube) as usize,
                coord::flip(&cube) as usize,
                coord::slice(&cube) as usize,
            ) as i32;
            for &m in &ALL_MOVES {
                let mut moved = cube;
                moved.apply(m);
                let there = tables.phase1_bound(
                    coord::twist(&moved) as usize,
                    coord::flip(&moved) as usize,
                    coord::slice(&moved) as usize,
                ) as i32;
                assert!((here - there).abs() <= 1);
            }
        }
    }
}
