use crate::board::{BOARD_SIZE, NUM_STATES};
use crate::error::{Error, Result};
use chrono::offset::Local;
use log::{debug, info};
use ndarray::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const NUM_ACTIONS: usize = BOARD_SIZE;

/// Dense action-value table indexed by `[state_index, cell]`.
///
/// All 3^9 raw encodings get a row even though only 5,478 of them are
/// reachable in legal play; 19683 x 9 doubles is roughly 1.4 MB and buys
/// O(1) lookup without hashing. Rows for unreachable states stay at zero.
#[derive(Clone, Debug)]
pub struct QTable {
    values: Array2<f64>,
    learning_rate: f64,
    discount_rate: f64,
}

#[derive(Serialize)]
struct JsonEntry {
    state: usize,
    action: usize,
    value: f64,
}

impl QTable {
    pub fn new(learning_rate: f64, discount_rate: f64) -> Self {
        QTable {
            values: Array2::zeros((NUM_STATES, NUM_ACTIONS)),
            learning_rate,
            discount_rate,
        }
    }

    /// Builds a table from a snapshot previously written by [`QTable::save`].
    pub fn from_disk(path: &Path, learning_rate: f64, discount_rate: f64) -> Result<Self> {
        let mut q = QTable::new(learning_rate, discount_rate);
        q.load(path)?;
        Ok(q)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[[state, action]]
    }

    /// Overwrites one entry. Training goes through [`QTable::update`]; this
    /// is for seeding known values.
    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        self.values[[state, action]] = value;
    }

    /// Highest-valued action among `legal_actions`. Ties go to the action
    /// listed first, so an ascending list favours the lowest cell.
    pub fn best_action(&self, state: usize, legal_actions: &[usize]) -> Option<usize> {
        let row = self.values.row(state);
        legal_actions
            .iter()
            .copied()
            .reduce(|best, action| if row[action] > row[best] { action } else { best })
    }

    /// Maximum over all nine actions of `state`, legal or not.
    pub fn max_value(&self, state: usize) -> f64 {
        self.values
            .row(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Q(s,a) += alpha * (reward + gamma * max_a' Q(s',a') - Q(s,a)), with the
    /// look-ahead term dropped when `next_state` is `None`.
    pub fn update(&mut self, state: usize, action: usize, reward: f64, next_state: Option<usize>) {
        let max_next = next_state.map_or(0.0, |next| self.max_value(next));
        let expected = reward + self.discount_rate * max_next;
        let value = &mut self.values[[state, action]];
        *value += self.learning_rate * (expected - *value);
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_pickle::to_writer(&mut writer, &self.values, serde_pickle::SerOptions::new())?;
        writer.flush()?;
        info!("saved q-table to {}", path.display());
        Ok(())
    }

    /// Replaces the table with the snapshot at `path`. On any failure the
    /// current values are kept.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        let loaded: Array2<f64> =
            serde_pickle::from_reader(reader, serde_pickle::DeOptions::new())?;
        let (rows, cols) = loaded.dim();
        if (rows, cols) != (NUM_STATES, NUM_ACTIONS) {
            return Err(Error::ShapeMismatch {
                rows,
                cols,
                expected_rows: NUM_STATES,
                expected_cols: NUM_ACTIONS,
            });
        }
        self.values = loaded;
        info!("loaded q-table from {}", path.display());
        Ok(())
    }

    /// Archives a snapshot as `qtable-<date>.pickle` under `dir`.
    pub fn save_dated(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let today = Local::now().date_naive();
        let filename = "qtable-".to_owned() + &today.to_string() + ".pickle";
        let path: PathBuf = [dir, Path::new(&filename)].iter().collect();
        self.save(&path)?;
        Ok(path)
    }

    /// Dumps the non-zero entries as JSON for inspection.
    pub fn export_json(&self, path: &Path) -> Result<usize> {
        let entries: Vec<JsonEntry> = self
            .values
            .indexed_iter()
            .filter(|(_, &value)| value != 0.0)
            .map(|((state, action), &value)| JsonEntry {
                state,
                action,
                value,
            })
            .collect();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &entries)?;
        writer.flush()?;
        debug!("exported {} q-values to {}", entries.len(), path.display());
        Ok(entries.len())
    }
}
