//! Login session marker with an explicit expiry.

use serde::{Deserialize, Serialize};

use crate::error::GameResult;
use crate::storage::{keys, Storage, Store};
use crate::time::Millis;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub account: String,
    pub expires_at: Millis,
}

pub(crate) fn start<S: Storage>(
    store: &Store<S>,
    account: &str,
    now: Millis,
    ttl: Millis,
) -> GameResult<Session> {
    let session = Session {
        account: account.to_string(),
        expires_at: now.saturating_add(ttl),
    };
    store.write(keys::SESSION, &session)?;
    tracing::info!(account, expires_at = session.expires_at, "session started");
    Ok(session)
}

/// The logged-in account, `None` when absent or expired.
pub(crate) fn current<S: Storage>(store: &Store<S>, now: Millis) -> Option<String> {
    let session: Session = store.read(keys::SESSION, None)?;
    if now < session.expires_at {
        Some(session.account)
    } else {
        None
    }
}

pub(crate) fn end<S: Storage>(store: &Store<S>) {
    store.remove(keys::SESSION);
}
