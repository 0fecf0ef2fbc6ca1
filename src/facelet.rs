//! Facelet codec: 54-character face strings to cubie states and back.
//!
//! The string lists the U, R, F, D, L, B faces in that order, each 3x3 face
//! row-major from its top-left sticker. The reference orientation is fixed
//! by the centers, so facelets 4, 13, 22, 31, 40 and 49 must read
//! U, R, F, D, L, B.

use crate::cubie::CubieCube;
use crate::error::SolveError;

pub const SOLVED_FACELETS: &str =
    "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB";

const FACE_LETTERS: [u8; 6] = [b'U', b'R', b'F', b'D', b'L', b'B'];

// Facelet positions of each corner slot, clockwise starting from the U/D
// sticker, and the face colors the slot holds when solved.
const CORNER_FACELETS: [[usize; 3]; 8] = [
    [8, 9, 20],   // URF
    [6, 18, 38],  // UFL
    [0, 36, 47],  // ULB
    [2, 45, 11],  // UBR
    [29, 26, 15], // DFR
    [27, 44, 24], // DLF
    [33, 53, 42], // DBL
    [35, 17, 51], // DRB
];
const CORNER_COLORS: [[u8; 3]; 8] = [
    [0, 1, 2],
    [0, 2, 4],
    [0, 4, 5],
    [0, 5, 1],
    [3, 2, 1],
    [3, 4, 2],
    [3, 5, 4],
    [3, 1, 5],
];

const EDGE_FACELETS: [[usize; 2]; 12] = [
    [5, 10],  // UR
    [7, 19],  // UF
    [3, 37],  // UL
    [1, 46],  // UB
    [32, 16], // DR
    [28, 25], // DF
    [30, 43], // DL
    [34, 52], // DB
    [23, 12], // FR
    [21, 41], // FL
    [50, 39], // BL
    [48, 14], // BR
];
const EDGE_COLORS: [[u8; 2]; 12] = [
    [0, 1],
    [0, 2],
    [0, 4],
    [0, 5],
    [3, 1],
    [3, 2],
    [3, 4],
    [3, 5],
    [2, 1],
    [2, 4],
    [5, 4],
    [5, 1],
];

fn face_index(letter: u8) -> Option<u8> {
    FACE_LETTERS.iter().position(|&f| f == letter).map(|i| i as u8)
}

/// Decode a facelet string into a cubie state, rejecting malformed strings
/// with [`SolveError::InvalidFacelet`] and well-formed but unreachable
/// states with [`SolveError::InvalidCube`].
pub fn parse(s: &str) -> Result<CubieCube, SolveError> {
    let malformed = |reason: String| SolveError::InvalidFacelet { reason };

    let bytes = s.as_bytes();
    if bytes.len() != 54 {
        return Err(malformed(format!("expected 54 facelets, got {}", bytes.len())));
    }

    let mut colors = [0u8; 54];
    let mut counts = [0usize; 6];
    for (i, &b) in bytes.iter().enumerate() {
        match face_index(b) {
            Some(f) => {
                colors[i] = f;
                counts[f as usize] += 1;
            }
            None => {
                return Err(malformed(format!(
                    "unknown face letter `{}` at position {i}",
                    b as char
                )))
            }
        }
    }
    for f in 0..6 {
        if counts[f] != 9 {
            return Err(malformed(format!(
                "face `{}` appears {} times, expected 9",
                FACE_LETTERS[f] as char, counts[f]
            )));
        }
        if colors[f * 9 + 4] != f as u8 {
            return Err(malformed(format!(
                "center facelet {} must be `{}`",
                f * 9 + 4,
                FACE_LETTERS[f] as char
            )));
        }
    }

    let mut cube = CubieCube::SOLVED;

    for slot in 0..8 {
        let positions = CORNER_FACELETS[slot];
        // Exactly one sticker of every corner is U or D; its position within
        // the slot is the twist.
        let ori = (0..3)
            .find(|&o| matches!(colors[positions[o]], 0 | 3))
            .ok_or_else(|| {
                malformed(format!("corner slot {slot} has no U or D sticker"))
            })?;
        let c1 = colors[positions[(ori + 1) % 3]];
        let c2 = colors[positions[(ori + 2) % 3]];
        let piece = (0..8)
            .find(|&j| CORNER_COLORS[j][1] == c1 && CORNER_COLORS[j][2] == c2)
            .ok_or_else(|| {
                malformed(format!("corner slot {slot} matches no corner piece"))
            })?;
        cube.cp[slot] = piece as u8;
        cube.co[slot] = ori as u8;
    }

    for slot in 0..12 {
        let positions = EDGE_FACELETS[slot];
        let pair = (colors[positions[0]], colors[positions[1]]);
        let mut matched = None;
        for j in 0..12 {
            let target = EDGE_COLORS[j];
            if pair == (target[0], target[1]) {
                matched = Some((j as u8, 0));
                break;
            }
            if pair == (target[1], target[0]) {
                matched = Some((j as u8, 1));
                break;
            }
        }
        let (piece, flip) = matched.ok_or_else(|| {
            malformed(format!("edge slot {slot} matches no edge piece"))
        })?;
        cube.ep[slot] = piece;
        cube.eo[slot] = flip;
    }

    cube.verify()?;
    Ok(cube)
}

/// Render a cubie state back into its facelet string.
pub fn render(cube: &CubieCube) -> String {
    let mut out = [0u8; 54];
    for f in 0..6 {
        out[f * 9 + 4] = FACE_LETTERS[f];
    }
    for slot in 0..8 {
        let piece = cube.cp[slot] as usize;
        let ori = cube.co[slot] as usize;
        for k in 0..3 {
            out[CORNER_FACELETS[slot][(k + ori) % 3]] =
                FACE_LETTERS[CORNER_COLORS[piece][k] as usize];
        }
    }
    for slot in 0..12 {
        let piece = cube.ep[slot] as usize;
        let flip = cube.eo[slot] as usize;
        for k in 0..2 {
            out[EDGE_FACELETS[slot][(k + flip) % 2]] =
                FACE_LETTERS[EDGE_COLORS[piece][k] as usize];
        }
    }
    out.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{random_scramble, Move};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn solved_round_trip() {
        assert_eq!(parse(SOLVED_FACELETS).unwrap(), CubieCube::SOLVED);
        assert_eq!(render(&CubieCube::SOLVED), SOLVED_FACELETS);
    }

    #[test]
    fn quarter_turns_render_known_facelets() {
        // Ground truth written out sticker by sticker, so a wrong move
        // basis or codec table cannot hide behind its own round trip.
        let expected = [
            ("U", "UUUUUUUUUBBBRRRRRRRRRFFFFFFDDDDDDDDDFFFLLLLLLLLLBBBBBB"),
            ("R", "UUFUUFUUFRRRRRRRRRFFDFFDFFDDDBDDBDDBLLLLLLLLLUBBUBBUBB"),
            ("F", "UUUUUULLLURRURRURRFFFFFFFFFRRRDDDDDDLLDLLDLLDBBBBBBBBB"),
            ("D", "UUUUUUUUURRRRRRFFFFFFFFFLLLDDDDDDDDDLLLLLLBBBBBBBBBRRR"),
            ("L", "BUUBUUBUURRRRRRRRRUFFUFFUFFFDDFDDFDDLLLLLLLLLBBDBBDBBD"),
            ("B", "RRRUUUUUURRDRRDRRDFFFFFFFFFDDDDDDLLLULLULLULLBBBBBBBBB"),
        ];
        for (token, facelets) in expected {
            let m = token.parse::<Move>().unwrap();
            let mut cube = CubieCube::SOLVED;
            cube.apply(m);
            assert_eq!(render(&cube), facelets, "{token} turn");
            assert_eq!(parse(facelets).unwrap(), cube, "{token} turn");
        }
    }

    #[test]
    fn scrambled_round_trips() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut cube = CubieCube::SOLVED;
            cube.apply_all(&random_scramble(30, &mut rng));
            let s = render(&cube);
            assert_eq!(parse(&s).unwrap(), cube);
            assert_eq!(render(&parse(&s).unwrap()), s);
        }
    }

    #[test]
    fn rejects_wrong_length() {
        let err = parse(&SOLVED_FACELETS[..53]).unwrap_err();
        assert!(matches!(err, SolveError::InvalidFacelet { .. }));
    }

    #[test]
    fn rejects_unknown_letter() {
        let mut s = SOLVED_FACELETS.to_owned();
        s.replace_range(8..9, "X");
        assert!(matches!(
            parse(&s),
            Err(SolveError::InvalidFacelet { .. })
        ));
    }

    #[test]
    fn rejects_bad_color_counts() {
        let mut s = SOLVED_FACELETS.to_owned();
        s.replace_range(0..1, "R");
        assert!(matches!(
            parse(&s),
            Err(SolveError::InvalidFacelet { .. })
        ));
    }

    #[test]
    fn rejects_moved_centers() {
        let mut bytes = SOLVED_FACELETS.as_bytes().to_vec();
        // Swap the U and D centers together with two edge stickers so every
        // color still appears nine times.
        bytes.swap(4, 31);
        bytes.swap(1, 28);
        let s: String = bytes.iter().map(|&b| b as char).collect();
        assert!(matches!(
            parse(&s),
            Err(SolveError::InvalidFacelet { .. })
        ));
    }

    #[test]
    fn rejects_flipped_edge() {
        let mut bytes = SOLVED_FACELETS.as_bytes().to_vec();
        bytes.swap(5, 10); // flip the UR edge in place
        let s: String = bytes.iter().map(|&b| b as char).collect();
        assert!(matches!(parse(&s), Err(SolveError::InvalidCube { .. })));
    }

    #[test]
    fn rejects_twisted_corner() {
        let mut bytes = SOLVED_FACELETS.as_bytes().to_vec();
        // Rotate the URF stickers cyclically: a lone corner twist.
        let (a, b, c) = (bytes[8], bytes[9], bytes[20]);
        bytes[8] = c;
        bytes[9] = a;
        bytes[20] = b;
        let s: String = bytes.iter().map(|&b| b as char).collect();
        assert!(matches!(parse(&s), Err(SolveError::InvalidCube { .. })));
    }
}
