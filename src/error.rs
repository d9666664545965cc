//! Error types for the game engine.
//!
//! Only rejections live here. Partial or refused coin grants caused by the
//! daily cap are reported through [`crate::ledger::CreditStatus`] instead,
//! since they never abort the calling operation.

use thiserror::Error;

/// Failures raised by a storage backend. Reads never fail (they fall back to
/// defaults), so these only come out of writes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached (e.g. `window.localStorage` is
    /// disabled by the browser).
    #[error("storage backend unavailable")]
    Unavailable,

    /// The backend rejected the write (quota exceeded and friends).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The value could not be encoded as JSON.
    #[error("failed to encode value for key {key}: {reason}")]
    Encode { key: String, reason: String },
}

/// Every rejection the engine can hand back to a caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("invalid transfer amount: minimum is 1")]
    InvalidTransferAmount,

    #[error("transfer of {amount} exceeds the per-transfer cap of {cap}")]
    TransferCapExceeded { amount: u64, cap: u64 },

    #[error("recipient wallet {0} is not known on this device")]
    RecipientUnresolvable(String),

    #[error("{0} is not owned")]
    NotOwned(String),

    #[error("ability {ability} is on cooldown for another {remaining_ms} ms")]
    OnCooldown { ability: String, remaining_ms: u64 },

    #[error("unknown ability: {0}")]
    UnknownAbility(String),

    #[error("{0} is already owned")]
    AlreadyOwned(String),

    #[error("unknown skin: {0}")]
    UnknownSkin(String),

    #[error("unknown case: {0}")]
    UnknownCase(String),

    #[error("level {required} required, current level is {current}")]
    LevelTooLow { required: u64, current: u64 },

    #[error("case {case_id} can only be opened {limit} times per day")]
    CaseDailyLimit { case_id: String, limit: u32 },

    #[error("next card available in {remaining_ms} ms")]
    CardNotReady { remaining_ms: u64 },

    #[error("inventory item not found: {0}")]
    ItemNotFound(String),

    #[error("inventory item {0} is not a case")]
    NotACase(String),

    #[error("inventory item {0} is not a coin parcel")]
    NotACoinParcel(String),

    #[error("unknown wallet: {0}")]
    UnknownWallet(String),

    #[error("secret words do not match any wallet")]
    InvalidPhrase,

    #[error("invalid save data: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for engine operations.
pub type GameResult<T> = Result<T, GameError>;
