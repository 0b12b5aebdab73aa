//! Game constants and solver defaults.
//!
//! The lid has [`LID_HOLES`] = 5 numbered holes. The die has [`DIE_FACES`] = 6
//! faces: a six sends a stick out of play, any other face targets the hole with
//! that number, which is either free (stick goes in) or occupied (stick comes out).

/// Number of faces on the die.
pub const DIE_FACES: u32 = 6;

/// Holes in the lid (faces 1..=5). A configuration never has more sticks in the lid.
pub const LID_HOLES: u32 = 5;

/// Convergence tolerance ε: iteration stops once max |U(s) − U'(s)| ≤ ε.
pub const EPSILON: f64 = 1e-10;

/// Default cap on the number of sweeps before reporting non-convergence.
///
/// Totals up to 30 sticks converge in a few hundred sweeps.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Largest total the server, the CLI and stored tables accept. The state count grows roughly
/// as 12·n², so this keeps a solve well under a second.
pub const MAX_TOTAL_STICKS: u32 = 64;

/// Storage format magic number: "SUP6" in little-endian.
pub const STATE_FILE_MAGIC: u32 = 0x3650_5553;

/// Storage format version.
pub const STATE_FILE_VERSION: u32 = 1;

/// Byte length of the storage header.
pub const STATE_FILE_HEADER_LEN: usize = 32;

/// Probability of a single die face.
#[inline(always)]
pub fn face_probability(faces: u32) -> f64 {
    faces as f64 / DIE_FACES as f64
}
