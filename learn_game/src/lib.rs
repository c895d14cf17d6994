//! Tabular Q-learning for 3x3 tic-tac-toe.
//!
//! A [`Trainer`] plays self-play episodes against a uniform-random opponent
//! and fills a dense [`QTable`] keyed by the base-3 board encoding. The
//! trained table can be saved, reloaded, evaluated, and played against.

use log::{info, warn};
use std::path::Path;

pub mod board;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod players;
pub mod policy;
pub mod q_table;
pub mod trainer;

pub use board::{Board, IsGameOver, Marks};
pub use config::{TrainingConfig, Variant};
pub use error::{Error, Result};
pub use evaluation::{evaluate, play_match, EvaluationReport};
pub use players::{ComputerPlayerRL, Player, RandomPlayer};
pub use policy::EpsilonGreedy;
pub use q_table::QTable;
pub use trainer::{EpisodeOutcome, Trainer, TrainingReport};

/// Trains a fresh table with `config`.
pub fn train_agent(config: &TrainingConfig) -> Result<(QTable, TrainingReport)> {
    let mut q = QTable::new(config.learning_rate, config.discount_rate);
    let mut trainer = Trainer::new(config.clone())?;
    let report = trainer.train(&mut q)?;
    Ok((q, report))
}

/// Exploration rate the agent keeps once training is over: the decayed value
/// when `report` comes from a run just finished, otherwise the configured
/// floor a loaded table was trained down to.
pub fn play_epsilon(config: &TrainingConfig, report: Option<&TrainingReport>) -> f64 {
    report.map_or(config.min_epsilon, |report| report.final_epsilon)
}

/// Loads the table at `path`, or trains a new one when it cannot be read.
/// A failed load is never fatal; the report is `Some` only if training ran.
pub fn load_or_train(
    path: &Path,
    config: &TrainingConfig,
) -> Result<(QTable, Option<TrainingReport>)> {
    match QTable::from_disk(path, config.learning_rate, config.discount_rate) {
        Ok(q) => {
            info!("using existing q-table, skipping training");
            Ok((q, None))
        }
        Err(err) => {
            warn!("could not load q-table from {}: {err}; training from scratch", path.display());
            let (q, report) = train_agent(config)?;
            Ok((q, Some(report)))
        }
    }
}
