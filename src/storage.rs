//! Binary I/O for solved strategy tables.
//!
//! Format (little-endian):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | magic `"SUP6"` |
//! | 4 | 4 | version |
//! | 8 | 4 | total sticks |
//! | 12 | 4 | number of states |
//! | 16 | 8 | sweeps run |
//! | 24 | 8 | final Δ (f64) |
//! | 32 | 8·N | U in state-space order (f64) |
//! | 32+8N | N | π in state-space order (1 = continue, 0 = stop) |
//!
//! Loading memory-maps the file, bounds the stored total by
//! [`MAX_TOTAL_STICKS`], checks the state count in closed form, and only then
//! generates the state space for that total.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use memmap2::Mmap;
use tracing::{info, warn};

use crate::constants::*;
use crate::error::{Error, Result};
use crate::state_space::{state_count, StateSpace};
use crate::types::Action;
use crate::value_iteration::{solve_with_config, Solution, SolverConfig};

/// Header of a stored table.
#[derive(Clone, Copy, Debug, PartialEq)]
struct StateFileHeader {
    magic: u32,
    version: u32,
    total: u32,
    num_states: u32,
    iterations: u64,
    final_delta: f64,
}

impl StateFileHeader {
    fn to_bytes(self) -> [u8; STATE_FILE_HEADER_LEN] {
        let mut buf = [0u8; STATE_FILE_HEADER_LEN];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.version.to_le_bytes());
        buf[8..12].copy_from_slice(&self.total.to_le_bytes());
        buf[12..16].copy_from_slice(&self.num_states.to_le_bytes());
        buf[16..24].copy_from_slice(&self.iterations.to_le_bytes());
        buf[24..32].copy_from_slice(&self.final_delta.to_le_bytes());
        buf
    }

    fn from_bytes(buf: &[u8]) -> Self {
        let u32_at = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        let u64_at = |i: usize| {
            let mut b = [0u8; 8];
            b.copy_from_slice(&buf[i..i + 8]);
            u64::from_le_bytes(b)
        };
        Self {
            magic: u32_at(0),
            version: u32_at(4),
            total: u32_at(8),
            num_states: u32_at(12),
            iterations: u64_at(16),
            final_delta: f64::from_bits(u64_at(24)),
        }
    }
}

/// Default table path for a total: `data/strategy_tables/super6_n{total}.bin`.
pub fn state_file_path(total: u32) -> PathBuf {
    PathBuf::from(format!("data/strategy_tables/super6_n{}.bin", total))
}

/// Expected file size for `num_states` states.
pub fn state_file_len(num_states: usize) -> usize {
    STATE_FILE_HEADER_LEN + num_states * (std::mem::size_of::<f64>() + 1)
}

/// Write a solved table to `path`, creating parent directories.
pub fn save_solution(solution: &Solution, path: &Path) -> Result<()> {
    let start_time = Instant::now();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("create directory {}", parent.display()), e))?;
        }
    }

    let file = File::create(path).map_err(|e| Error::io(format!("create {}", path.display()), e))?;
    let mut f = BufWriter::new(file);
    let write_err = |e: std::io::Error| Error::io(format!("write {}", path.display()), e);

    let header = StateFileHeader {
        magic: STATE_FILE_MAGIC,
        version: STATE_FILE_VERSION,
        total: solution.total(),
        num_states: solution.states().len() as u32,
        iterations: solution.iterations() as u64,
        final_delta: solution.final_delta(),
    };
    f.write_all(&header.to_bytes()).map_err(write_err)?;
    for value in solution.values() {
        f.write_all(&value.to_le_bytes()).map_err(write_err)?;
    }
    let policy: Vec<u8> = solution.policy().iter().map(|a| a.to_byte()).collect();
    f.write_all(&policy).map_err(write_err)?;
    f.flush().map_err(write_err)?;

    info!(
        path = %path.display(),
        states = solution.states().len(),
        elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "saved strategy table"
    );
    Ok(())
}

/// Load a table written by [`save_solution`].
pub fn load_solution(path: &Path) -> Result<Solution> {
    let start_time = Instant::now();
    let invalid = |reason: String| Error::InvalidStateFile {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
    let metadata = file
        .metadata()
        .map_err(|e| Error::io(format!("stat {}", path.display()), e))?;
    if (metadata.len() as usize) < STATE_FILE_HEADER_LEN {
        return Err(invalid(format!("file too short ({} bytes)", metadata.len())));
    }

    // SAFETY: the mapping is read-only and dropped before returning; the tables
    // are copied out.
    let mmap = unsafe { Mmap::map(&file) }
        .map_err(|e| Error::io(format!("memory map {}", path.display()), e))?;

    let header = StateFileHeader::from_bytes(&mmap[..STATE_FILE_HEADER_LEN]);
    if header.magic != STATE_FILE_MAGIC || header.version != STATE_FILE_VERSION {
        return Err(invalid(format!(
            "bad magic/version (magic=0x{:08x} version={})",
            header.magic, header.version
        )));
    }

    let num_states = header.num_states as usize;
    let expected_len = state_file_len(num_states);
    if mmap.len() != expected_len {
        return Err(invalid(format!(
            "size mismatch: expected {}, got {}",
            expected_len,
            mmap.len()
        )));
    }

    if header.total == 0 || header.total > MAX_TOTAL_STICKS {
        return Err(invalid(format!(
            "stored total {} outside 1..={}",
            header.total, MAX_TOTAL_STICKS
        )));
    }
    let expected_states = state_count(header.total);
    if expected_states != num_states {
        return Err(invalid(format!(
            "state count {} does not match {} states for total {}",
            num_states, expected_states, header.total
        )));
    }
    let space = StateSpace::new(header.total)
        .map_err(|e| invalid(format!("stored total {} is not solvable: {}", header.total, e)))?;

    let values_end = STATE_FILE_HEADER_LEN + num_states * std::mem::size_of::<f64>();
    let values: Vec<f64> = mmap[STATE_FILE_HEADER_LEN..values_end]
        .chunks_exact(8)
        .map(|chunk| {
            let mut b = [0u8; 8];
            b.copy_from_slice(chunk);
            f64::from_le_bytes(b)
        })
        .collect();
    if let Some(bad) = values.iter().position(|v| !(v.abs() <= 1.0 + 1e-9)) {
        return Err(invalid(format!("value {} at slot {} outside [-1, 1]", values[bad], bad)));
    }

    let policy = mmap[values_end..]
        .iter()
        .enumerate()
        .map(|(slot, &byte)| {
            Action::from_byte(byte).ok_or_else(|| invalid(format!("policy byte {} at slot {}", byte, slot)))
        })
        .collect::<Result<Vec<Action>>>()?;

    info!(
        path = %path.display(),
        total = header.total,
        states = num_states,
        elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "loaded strategy table via mmap"
    );

    Solution::from_parts(
        space,
        values,
        policy,
        header.iterations as usize,
        header.final_delta,
    )
}

/// Load the table for `total` from `path` if it is present and valid, otherwise
/// solve and save it. A present but unreadable file is logged and replaced.
pub fn load_or_compute(total: u32, path: &Path, config: &SolverConfig) -> Result<Solution> {
    if path.exists() {
        match load_solution(path) {
            Ok(solution) if solution.total() == total => return Ok(solution),
            Ok(solution) => warn!(
                path = %path.display(),
                stored = solution.total(),
                requested = total,
                "stored table is for a different total, recomputing"
            ),
            Err(e) => warn!(path = %path.display(), error = %e, "ignoring stored table"),
        }
    }
    let solution = solve_with_config(total, config)?;
    save_solution(&solution, path)?;
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = StateFileHeader {
            magic: STATE_FILE_MAGIC,
            version: STATE_FILE_VERSION,
            total: 7,
            num_states: 112,
            iterations: 63,
            final_delta: 3.5e-11,
        };
        assert_eq!(StateFileHeader::from_bytes(&header.to_bytes()), header);
    }

    #[test]
    fn test_magic_spells_sup6() {
        assert_eq!(&STATE_FILE_MAGIC.to_le_bytes(), b"SUP6");
    }

    #[test]
    fn test_state_file_path() {
        assert_eq!(
            state_file_path(12),
            PathBuf::from("data/strategy_tables/super6_n12.bin")
        );
    }

    #[test]
    fn test_load_nonexistent() {
        assert!(matches!(
            load_solution(Path::new("/tmp/nonexistent_super6_table_xyz.bin")),
            Err(Error::Io { .. })
        ));
    }
}
