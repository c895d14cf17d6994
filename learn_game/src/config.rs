use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How seats are assigned during self-play.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// The agent always plays nought and moves first against a random cross.
    #[default]
    FixedRole,
    /// The agent's mark is drawn per episode (cross moves first) and moves
    /// that hand the opponent an immediate win are penalised.
    RandomizedRole,
}

impl FromStr for Variant {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fixed" | "fixed_role" => Ok(Variant::FixedRole),
            "randomized" | "randomized_role" => Ok(Variant::RandomizedRole),
            other => Err(format!("unknown variant '{other}' (expected 'fixed' or 'randomized')")),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Variant::FixedRole => write!(f, "fixed"),
            Variant::RandomizedRole => write!(f, "randomized"),
        }
    }
}

/// Flat hyperparameter set handed over by the training driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub discount_rate: f64,
    pub epsilon: f64,
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
    pub episodes: usize,
    pub report_every: usize,
    pub variant: Variant,
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            learning_rate: 0.1,
            discount_rate: 0.9,
            epsilon: 0.7,
            epsilon_decay: 0.999_999,
            min_epsilon: 0.01,
            episodes: 10_010_000,
            report_every: 10_000,
            variant: Variant::FixedRole,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TrainingConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |value: f64| (0.0..=1.0).contains(&value);
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidConfig("learning_rate must be in (0, 1]".into()));
        }
        if !in_unit(self.discount_rate) {
            return Err(Error::InvalidConfig("discount_rate must be in [0, 1]".into()));
        }
        if !in_unit(self.epsilon) {
            return Err(Error::InvalidConfig("epsilon must be in [0, 1]".into()));
        }
        if !(self.epsilon_decay > 0.0 && self.epsilon_decay <= 1.0) {
            return Err(Error::InvalidConfig("epsilon_decay must be in (0, 1]".into()));
        }
        if !in_unit(self.min_epsilon) {
            return Err(Error::InvalidConfig("min_epsilon must be in [0, 1]".into()));
        }
        if self.report_every == 0 {
            return Err(Error::InvalidConfig("report_every must be > 0".into()));
        }
        Ok(())
    }
}
