use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Mine count must stay below the number of board cells")]
    TooManyMines,
    #[error("Board dimensions must be nonzero")]
    EmptyBoard,
}

pub type Result<T> = core::result::Result<T, GameError>;
