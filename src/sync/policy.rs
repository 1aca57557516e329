//! Last-writer-wins decision function.
//!
//! Pure and deterministic: both timestamps arrive already normalized to UTC,
//! and equal timestamps always skip so a repeated sync is a no-op.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Upload,
    Download,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Push,
    Pull,
    SkipLocalNotNewer,
    SkipRemoteNotNewer,
    SkipNoRemote,
}

impl SyncAction {
    pub fn is_transfer(self) -> bool {
        matches!(self, SyncAction::Push | SyncAction::Pull)
    }
}

/// The chosen action together with the timestamps that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: SyncAction,
    pub local: Option<DateTime<Utc>>,
    pub remote: Option<DateTime<Utc>>,
}

/// Local absence under `Upload` is a caller precondition, not an outcome:
/// the engine refuses to start an upload without a local file.
pub fn decide(
    local: Option<DateTime<Utc>>,
    remote: Option<DateTime<Utc>>,
    intent: Intent,
) -> Decision {
    let action = match intent {
        Intent::Upload => match (local, remote) {
            (_, None) => SyncAction::Push,
            (Some(local), Some(remote)) if local > remote => SyncAction::Push,
            _ => SyncAction::SkipLocalNotNewer,
        },
        Intent::Download => match (local, remote) {
            (_, None) => SyncAction::SkipNoRemote,
            (None, Some(_)) => SyncAction::Pull,
            (Some(local), Some(remote)) if remote > local => SyncAction::Pull,
            _ => SyncAction::SkipRemoteNotNewer,
        },
    };

    Decision {
        action,
        local,
        remote,
    }
}
