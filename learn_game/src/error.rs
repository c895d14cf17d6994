use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode q-table: {0}")]
    Pickle(#[from] serde_pickle::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("q-table has shape ({rows}, {cols}), expected ({expected_rows}, {expected_cols})")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("illegal move at position {pos}")]
    IllegalMove { pos: usize },

    #[error("no legal moves left on the board")]
    NoLegalMoves,
}

pub type Result<T> = std::result::Result<T, Error>;
