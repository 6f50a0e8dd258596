use thiserror::Error;

/// Lookup failures from a creature data provider.
///
/// Callers degrade on these (skip a move, keep the current form, fall back to
/// a default creature) instead of propagating them into battle state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("unknown species `{0}`")]
    UnknownSpecies(String),
    #[error("unknown move `{0}`")]
    UnknownMove(String),
}

/// Failures of the persistence store.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save file version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Rejected battle requests. None of these mutate run state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("an encounter is already in progress")]
    Busy,
    #[error("the encounter is not accepting actions")]
    NotInProgress,
    #[error("no move in slot {index}")]
    InvalidMove { index: usize },
    #[error("{move_name} has no PP left")]
    NoPp { move_name: String },
    #[error("party slot {index} cannot be sent out")]
    InvalidSwap { index: usize },
    #[error("the party has no creature able to battle")]
    EmptyParty,
}
