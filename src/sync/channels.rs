//! Channel namespace: numbered subdirectories under the shared base dir.
//!
//! Channels are discovered, not declared. Whatever numeric directories exist
//! on the server right now is the channel set; discovery failure falls back
//! to the built-in defaults instead of failing the caller.

use crate::common::errors::SyncError;
use crate::remote::{RemoteError, RemoteSession};

pub const DEFAULT_CHANNELS: [u32; 5] = [1, 2, 3, 4, 5];

pub fn channel_dir(base: &str, channel: u32) -> String {
    format!("{base}/{channel}")
}

/// Enters `base/channel`, creating the directory on first use.
///
/// A 550-family reply to MKD means someone else created it first; that is
/// success. Every other failure is fatal to the operation.
pub fn ensure_channel_dir(
    session: &mut dyn RemoteSession,
    base: &str,
    channel: u32,
) -> Result<(), SyncError> {
    let dir = channel_dir(base, channel);

    match session.cwd(&dir) {
        Ok(()) => return Ok(()),
        Err(RemoteError::Unavailable(_)) => {
            tracing::debug!(dir = %dir, "channel directory missing, creating");
        }
        Err(err) => {
            return Err(SyncError::RemoteDirectory {
                path: dir,
                source: err,
            })
        }
    }

    match session.mkdir(&dir) {
        Ok(()) | Err(RemoteError::Unavailable(_)) => {}
        Err(err) => {
            return Err(SyncError::RemoteDirectory {
                path: dir,
                source: err,
            })
        }
    }

    session.cwd(&dir).map_err(|err| SyncError::RemoteDirectory {
        path: dir.clone(),
        source: err,
    })
}

/// Numeric directory names under `base`, sorted and deduplicated.
///
/// Never fails: an unreachable or empty base directory yields the default
/// channel set so a player can still pick one.
pub fn list_channels(session: &mut dyn RemoteSession, base: &str) -> Vec<u32> {
    let names = match session.cwd(base).and_then(|()| session.name_list(None)) {
        Ok(names) => names,
        Err(err) => {
            tracing::debug!(base, error = %err, "channel discovery failed, using defaults");
            return DEFAULT_CHANNELS.to_vec();
        }
    };

    let mut channels: Vec<u32> = names
        .iter()
        .filter_map(|name| {
            // Some servers list full paths; the channel is the last segment.
            let name = name.rsplit('/').next().unwrap_or(name.as_str());
            // Digits only: a signed name like "+6" is not a channel.
            if !name.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            name.parse().ok()
        })
        .collect();

    if channels.is_empty() {
        tracing::debug!(base, "no channels on server, using defaults");
        return DEFAULT_CHANNELS.to_vec();
    }

    channels.sort_unstable();
    channels.dedup();
    channels
}
