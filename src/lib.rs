//! FlowGame: the state engine behind a browser clicker game with loot cases,
//! timed abilities, an hourly card draw and a local wallet bank.
//!
//! All state lives in a flat key/value [`storage::Storage`]. Components are
//! borrowing views over a [`storage::Store`] and write every mutation through
//! immediately; [`engine::Engine`] ties them to a clock, a random source and
//! the periodic scheduler.

pub mod abilities;
pub mod achievements;
pub mod bank;
pub mod cards;
pub mod cases;
pub mod clicker;
pub mod collection;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod ledger;
pub mod rewards;
pub mod save;
pub mod scheduler;
pub mod storage;
pub mod time;

pub use config::GameConfig;
pub use engine::{Engine, Job, Notification};
pub use error::{GameError, GameResult, StorageError};
pub use ledger::{Credit, CreditSource, CreditStatus, GUEST_ACCOUNT};
pub use save::SaveSnapshot;
pub use storage::{MemoryStorage, Storage, Store};
pub use time::{Clock, ManualClock, Millis, SystemClock};
