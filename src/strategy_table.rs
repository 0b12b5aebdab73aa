//! The solved strategy as a flat table, one row per configuration.
//!
//! Columns: `lid`, `player1`, `player2`, `forced`, `value`, `strategy`
//! (true = continue), `prob` (win probability `0.5·value + 0.5`). Rows keep the
//! generator's order.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{win_probability, Configuration};
use crate::value_iteration::Solution;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyRow {
    pub lid: u32,
    pub player1: u32,
    pub player2: u32,
    pub forced: bool,
    pub value: f64,
    pub strategy: bool,
    pub prob: f64,
}

impl StrategyRow {
    pub fn configuration(&self) -> Configuration {
        Configuration::new(self.lid, self.player1, self.player2, self.forced)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyTable {
    pub rows: Vec<StrategyRow>,
}

impl StrategyTable {
    pub fn from_solution(solution: &Solution) -> Self {
        let rows = solution
            .iter()
            .map(|(c, value, action)| StrategyRow {
                lid: c.lid,
                player1: c.player1,
                player2: c.player2,
                forced: c.forced,
                value,
                strategy: action.is_continue(),
                prob: win_probability(value),
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching `forced`, in table order.
    pub fn with_forced(&self, forced: bool) -> impl Iterator<Item = &StrategyRow> {
        self.rows.iter().filter(move |r| r.forced == forced)
    }

    /// Free-choice rows with the given number of sticks in the lid.
    pub fn lid_slice(&self, lid: u32) -> impl Iterator<Item = &StrategyRow> {
        self.rows.iter().filter(move |r| r.lid == lid && !r.forced)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = create_writer(path)?;
        serde_json::to_writer_pretty(&mut writer, &self.rows)?;
        writer
            .flush()
            .map_err(|e| Error::io(format!("flush {}", path.display()), e))
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let writer = create_writer(path)?;
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer
            .flush()
            .map_err(|e| Error::io(format!("flush {}", path.display()), e))?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<StrategyRow>, csv::Error>>()?;
        Ok(Self { rows })
    }
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("create directory {}", parent.display()), e))?;
        }
    }
    let file = File::create(path).map_err(|e| Error::io(format!("create {}", path.display()), e))?;
    Ok(BufWriter::new(file))
}

/// Print the free-choice rows for one lid value, one line per hand split.
pub fn write_lid_slice<W: Write>(out: &mut W, table: &StrategyTable, lid: u32) -> std::io::Result<()> {
    writeln!(out, "{:>10}  {:>10}  {:>8}  strategy", "situation", "value", "prob")?;
    for row in table.lid_slice(lid) {
        let situation = format!("{}/{}/{}", row.lid, row.player1, row.player2);
        writeln!(
            out,
            "{:>10}  {:>10.6}  {:>8.6}  {}",
            situation,
            row.value,
            row.prob,
            if row.strategy { "continue" } else { "stop" }
        )?;
    }
    Ok(())
}
