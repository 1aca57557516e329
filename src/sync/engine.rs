//! One-shot sync operations: dial, resolve, decide, transfer, close.
//!
//! Each entry point is a single user-triggered operation with exactly one
//! session for its whole lifetime. Operations are not reentrant and nothing
//! runs in the background; the caller is expected to run one at a time.

use crate::common::errors::SyncError;
use crate::remote::{dialer, Connector, Credentials, Endpoint, Session};
use crate::status::StatusSink;
use crate::sync::policy::{self, Decision, Intent, SyncAction};
use crate::sync::{channels, timestamp, transfer};
use std::path::PathBuf;
use std::time::Duration;

/// Everything needed to reach the shared server.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    pub endpoints: Vec<Endpoint>,
    pub credentials: Credentials,
    pub base_dir: String,
    pub dial_timeout: Duration,
}

/// One (channel, game) sync request.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub profile: ConnectionProfile,
    pub channel: u32,
    /// `<gameId><slotSuffix>`, the single artifact name on both sides.
    pub file_name: String,
    pub local_path: PathBuf,
}

/// What happened, for the presentation layer to narrate.
#[derive(Debug)]
pub struct SyncOutcome {
    pub endpoint: Endpoint,
    pub decision: Decision,
    pub bytes: Option<u64>,
}

/// Uploads the local save state when it is strictly newer than the server's.
pub fn push_artifact(
    connector: &dyn Connector,
    request: &SyncRequest,
    status: &dyn StatusSink,
) -> Result<SyncOutcome, SyncError> {
    if !request.local_path.exists() {
        return Err(SyncError::LocalArtifactMissing {
            path: request.local_path.clone(),
        });
    }

    let mut session = open_channel_session(connector, request, status)?;
    let endpoint = session.endpoint().clone();

    let remote = timestamp::resolve(session.remote(), &request.file_name);
    let local = read_local_mtime(request)?;

    let decision = policy::decide(local, remote, Intent::Upload);
    tracing::debug!(?decision, "upload decision");

    let bytes = match decision.action {
        SyncAction::Push => Some(transfer::push(
            session.remote(),
            &request.local_path,
            &request.file_name,
        )?),
        _ => None,
    };

    finish(session);
    Ok(SyncOutcome {
        endpoint,
        decision,
        bytes,
    })
}

/// Downloads the server save state when it is strictly newer than the local
/// one. A missing local file is fine here; a missing remote file is a skip,
/// never an error.
pub fn pull_artifact(
    connector: &dyn Connector,
    request: &SyncRequest,
    status: &dyn StatusSink,
) -> Result<SyncOutcome, SyncError> {
    let mut session = open_channel_session(connector, request, status)?;
    let endpoint = session.endpoint().clone();

    let remote = timestamp::resolve(session.remote(), &request.file_name);
    let local = read_local_mtime(request)?;

    let decision = policy::decide(local, remote, Intent::Download);
    tracing::debug!(?decision, "download decision");

    let bytes = match decision.action {
        SyncAction::Pull => Some(transfer::pull(
            session.remote(),
            &request.file_name,
            &request.local_path,
        )?),
        _ => None,
    };

    finish(session);
    Ok(SyncOutcome {
        endpoint,
        decision,
        bytes,
    })
}

/// Lists the channels currently on the server.
pub fn list_channels(
    connector: &dyn Connector,
    profile: &ConnectionProfile,
    status: &dyn StatusSink,
) -> Result<Vec<u32>, SyncError> {
    let mut session = dialer::dial(
        connector,
        &profile.endpoints,
        &profile.credentials,
        profile.dial_timeout,
        status,
    )?;
    let found = channels::list_channels(session.remote(), &profile.base_dir);
    finish(session);
    Ok(found)
}

/// Creates a channel directory on the server. Idempotent: an existing
/// directory is success.
pub fn create_channel(
    connector: &dyn Connector,
    profile: &ConnectionProfile,
    channel: u32,
    status: &dyn StatusSink,
) -> Result<(), SyncError> {
    let mut session = dialer::dial(
        connector,
        &profile.endpoints,
        &profile.credentials,
        profile.dial_timeout,
        status,
    )?;
    let result = channels::ensure_channel_dir(session.remote(), &profile.base_dir, channel);
    finish(session);
    result
}

fn open_channel_session(
    connector: &dyn Connector,
    request: &SyncRequest,
    status: &dyn StatusSink,
) -> Result<Session, SyncError> {
    let profile = &request.profile;
    let mut session = dialer::dial(
        connector,
        &profile.endpoints,
        &profile.credentials,
        profile.dial_timeout,
        status,
    )?;
    channels::ensure_channel_dir(session.remote(), &profile.base_dir, request.channel)?;
    Ok(session)
}

fn read_local_mtime(request: &SyncRequest) -> Result<Option<chrono::DateTime<chrono::Utc>>, SyncError> {
    timestamp::local_mtime(&request.local_path).map_err(|e| SyncError::Transfer {
        name: request.file_name.clone(),
        source: e.into(),
    })
}

fn finish(session: Session) {
    if let Err(err) = session.close() {
        tracing::debug!(error = %err, "session close failed");
    }
}
