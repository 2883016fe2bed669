use thiserror::Error;

/// Every failure is local to the call that produced it. None of them are
/// retryable with different parameters: a round is replayed exactly or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FairError {
    #[error("invalid seed format: {0}")]
    InvalidSeedFormat(String),
    #[error("invalid sampling range: max_exclusive must be positive, got {max_exclusive}")]
    InvalidRange { max_exclusive: u64 },
    #[error("invalid mine count: {mines} mines on a board of {board_size}")]
    InvalidMineCount { mines: u32, board_size: u32 },
    #[error("invalid row count: {rows} (allowed 1..={max})", max = crate::games::MAX_PATH_ROWS)]
    InvalidRowCount { rows: u32 },
    #[error("invalid payout table: {0}")]
    InvalidPayoutTable(String),
    #[error("server seed has been revealed and retired")]
    SeedRetired,
    #[error("server seed has not been committed yet")]
    NotCommitted,
    #[error("{pending} round(s) still pending against the current seeds")]
    NotYetSettled { pending: usize },
    #[error("round {0} is not pending")]
    UnknownRound(u64),
}

pub type FairResult<T> = Result<T, FairError>;
