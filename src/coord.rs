//! Integer coordinates over cubie states.
//!
//! Each coordinate is a bijection between an equivalence class of cubie
//! states and a dense integer range with the solved state at 0. The forward
//! maps run during search setup; the inverse maps exist to realize canonical
//! cubie states while the move tables are built.

use crate::cubie::{permutation_parity, CubieCube};

pub const N_TWIST: usize = 2187; // 3^7
pub const N_FLIP: usize = 2048; // 2^11
pub const N_SLICE: usize = 495; // C(12, 4)
pub const N_PERM8: usize = 40320; // 8!
pub const N_PERM4: usize = 24; // 4!

const FACTORIALS: [usize; 9] = [1, 1, 2, 6, 24, 120, 720, 5040, 40320];

pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut out = 1;
    for i in 0..k {
        out = out * (n - i) / (i + 1);
    }
    out
}

/// Corner orientations as a base-3 number over the first seven slots; the
/// eighth is determined by the twist-sum rule.
pub fn twist(cube: &CubieCube) -> u16 {
    cube.co[..7].iter().fold(0, |acc, &o| 3 * acc + o as u16)
}

pub fn set_twist(cube: &mut CubieCube, mut value: u16) {
    let mut sum = 0u16;
    for i in (0..7).rev() {
        cube.co[i] = (value % 3) as u8;
        sum += value % 3;
        value /= 3;
    }
    cube.co[7] = ((3 - sum % 3) % 3) as u8;
}

/// Edge orientations as a base-2 number over the first eleven slots.
pub fn flip(cube: &CubieCube) -> u16 {
    cube.eo[..11].iter().fold(0, |acc, &o| 2 * acc + o as u16)
}

pub fn set_flip(cube: &mut CubieCube, mut value: u16) {
    let mut sum = 0u16;
    for i in (0..11).rev() {
        cube.eo[i] = (value % 2) as u8;
        sum += value % 2;
        value /= 2;
    }
    cube.eo[11] = (sum % 2) as u8;
}

/// Rank of the 4-subset of slots occupied by UD-slice edges, in the
/// combinatorial number system. 0 means all four sit in the slice.
pub fn slice(cube: &CubieCube) -> u16 {
    let mut rank = 0;
    let mut picked = 0;
    for j in (0..12).rev() {
        if cube.ep[j] >= 8 {
            rank += binomial(11 - j, picked + 1);
            picked += 1;
        }
    }
    rank as u16
}

pub fn set_slice(cube: &mut CubieCube, value: u16) {
    let mut remaining = value as usize;
    let mut to_place = 4usize;
    let mut ep = [u8::MAX; 12];
    for (j, slot) in ep.iter_mut().enumerate() {
        if to_place == 0 {
            break;
        }
        let weight = binomial(11 - j, to_place);
        if remaining >= weight {
            *slot = (8 + 4 - to_place) as u8;
            remaining -= weight;
            to_place -= 1;
        }
    }
    let mut next_other = 0u8;
    for slot in ep.iter_mut() {
        if *slot == u8::MAX {
            *slot = next_other;
            next_other += 1;
        }
    }
    cube.ep = ep;
}

fn rank_permutation(perm: &[u8]) -> usize {
    let n = perm.len();
    let mut rank = 0;
    for i in 0..n {
        let smaller_after = perm[i + 1..].iter().filter(|&&x| x < perm[i]).count();
        rank += smaller_after * FACTORIALS[n - 1 - i];
    }
    rank
}

fn unrank_permutation(mut rank: usize, out: &mut [u8]) {
    let n = out.len();
    let mut available: Vec<u8> = (0..n as u8).collect();
    for (i, slot) in out.iter_mut().enumerate() {
        let weight = FACTORIALS[n - 1 - i];
        *slot = available.remove(rank / weight);
        rank %= weight;
    }
}

/// Factorial-base rank of the full corner permutation.
pub fn corner_perm(cube: &CubieCube) -> u16 {
    rank_permutation(&cube.cp) as u16
}

pub fn set_corner_perm(cube: &mut CubieCube, value: u16) {
    unrank_permutation(value as usize, &mut cube.cp);
}

/// Factorial-base rank of the eight non-slice edges. Defined only for
/// states in the restricted group, where slots 0..8 hold edges 0..8.
pub fn edge8_perm(cube: &CubieCube) -> u16 {
    debug_assert!(cube.ep[..8].iter().all(|&e| e < 8));
    rank_permutation(&cube.ep[..8]) as u16
}

pub fn set_edge8_perm(cube: &mut CubieCube, value: u16) {
    unrank_permutation(value as usize, &mut cube.ep[..8]);
    for (i, slot) in cube.ep[8..].iter_mut().enumerate() {
        *slot = (8 + i) as u8;
    }
}

/// Factorial-base rank of the four UD-slice edges within the slice slots.
/// Defined only for states in the restricted group.
pub fn slice_perm(cube: &CubieCube) -> u16 {
    debug_assert!(cube.ep[8..].iter().all(|&e| e >= 8));
    let within: [u8; 4] = [
        cube.ep[8] - 8,
        cube.ep[9] - 8,
        cube.ep[10] - 8,
        cube.ep[11] - 8,
    ];
    rank_permutation(&within) as u16
}

pub fn set_slice_perm(cube: &mut CubieCube, value: u16) {
    for (i, slot) in cube.ep[..8].iter_mut().enumerate() {
        *slot = i as u8;
    }
    let mut within = [0u8; 4];
    unrank_permutation(value as usize, &mut within);
    for i in 0..4 {
        cube.ep[8 + i] = within[i] + 8;
    }
}

pub fn corner_parity(cube: &CubieCube) -> u8 {
    permutation_parity(&cube.cp)
}
