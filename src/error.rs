use thiserror::Error;

pub type Result<T> = std::result::Result<T, LifeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifeError {
    #[error("invalid grid dimension {width}x{height}: both sides must be positive")]
    InvalidDimension { width: u32, height: u32 },
    #[error("cell ({row}, {col}) is outside the {height}x{width} grid")]
    OutOfRange {
        row: u32,
        col: u32,
        height: u32,
        width: u32,
    },
    #[error("frame request refused by host: {0}")]
    Schedule(String),
}
