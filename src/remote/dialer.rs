//! Ordered failover dial across the configured host list.

use super::{Connector, Credentials, Endpoint, RemoteError, Session};
use crate::common::errors::SyncError;
use crate::status::StatusSink;
use std::time::Duration;

/// Returns the first endpoint that both connects and authenticates.
///
/// Network-level failures move on to the next host. An authentication
/// rejection stops the whole dial: the credentials are the same for every
/// host, so retrying elsewhere would only lock the account out faster.
pub fn dial(
    connector: &dyn Connector,
    endpoints: &[Endpoint],
    credentials: &Credentials,
    timeout: Duration,
    status: &dyn StatusSink,
) -> Result<Session, SyncError> {
    if !credentials.is_complete() {
        return Err(SyncError::MissingCredentials);
    }

    status.set_status("Connecting to the save server... (this can take a couple of minutes)");
    let result = dial_in_order(connector, endpoints, credentials, timeout);
    status.clear_status();
    result
}

fn dial_in_order(
    connector: &dyn Connector,
    endpoints: &[Endpoint],
    credentials: &Credentials,
    timeout: Duration,
) -> Result<Session, SyncError> {
    let mut last_error: Option<RemoteError> = None;

    for endpoint in endpoints {
        tracing::debug!(%endpoint, "dialing");

        let mut remote = match connector.connect(endpoint, timeout) {
            Ok(remote) => remote,
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "connect failed, trying next host");
                last_error = Some(err);
                continue;
            }
        };

        match remote.login(&credentials.username, &credentials.password) {
            Ok(()) => {
                tracing::info!(%endpoint, "connected");
                return Ok(Session::new(remote, endpoint.clone()));
            }
            Err(RemoteError::AuthRejected(message)) => {
                let _ = remote.close();
                return Err(SyncError::AuthenticationFailure {
                    endpoint: endpoint.to_string(),
                    message,
                });
            }
            Err(err) => {
                tracing::warn!(%endpoint, error = %err, "login did not complete, trying next host");
                let _ = remote.close();
                last_error = Some(err);
            }
        }
    }

    Err(SyncError::DialFailure {
        tried: endpoints.iter().map(ToString::to_string).collect(),
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no hosts configured".to_string()),
    })
}
