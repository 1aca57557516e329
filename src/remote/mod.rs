//! Protocol-facing types and traits.
//!
//! The engine only ever talks to the server through [`RemoteSession`] and
//! [`Connector`], so every decision path can be exercised against a scripted
//! mock while `ftp.rs` carries the one real implementation.

pub mod dialer;
pub mod ftp;

use chrono::NaiveDateTime;
use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;
use thiserror::Error;

/// One dial candidate, drawn from the ordered host list in the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    /// Parses `host` or `host:port`, falling back to `default_port`.
    pub fn parse(spec: &str, default_port: u16) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return None;
        }
        match spec.rsplit_once(':') {
            Some((host, port)) => {
                let host = host.trim();
                if host.is_empty() {
                    return None;
                }
                let port = port.trim().parse().ok()?;
                Some(Self {
                    host: host.to_string(),
                    port,
                })
            }
            None => Some(Self {
                host: spec.to_string(),
                port: default_port,
            }),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Passed by value into each dial attempt, never cached beyond one session.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

// Keeps the password out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Transport failures, classified by the server's own status codes rather
/// than by error-text matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// DNS, refused connection, timeout. The dialer keeps trying on these.
    #[error("network error: {0}")]
    Network(String),
    /// Bad credentials. Fatal everywhere, so the dialer stops immediately.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),
    /// 550-family: the path does not exist, or already does (MKD).
    #[error("remote path unavailable: {0}")]
    Unavailable(String),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// An authenticated, path-addressable file session.
///
/// Mirrors the protocol primitives the engine needs and nothing more:
/// navigation, listing, mtime query, and whole-file binary transfer.
pub trait RemoteSession {
    fn login(&mut self, username: &str, password: &str) -> Result<(), RemoteError>;
    fn cwd(&mut self, dir: &str) -> Result<(), RemoteError>;
    fn mkdir(&mut self, dir: &str) -> Result<(), RemoteError>;
    /// Bare entry names, optionally scoped to `path`.
    fn name_list(&mut self, path: Option<&str>) -> Result<Vec<String>, RemoteError>;
    /// Long-format listing lines, optionally filtered to `path`.
    fn dir_list(&mut self, path: Option<&str>) -> Result<Vec<String>, RemoteError>;
    /// Precise modification-time query. The returned value is already UTC.
    fn mod_time(&mut self, path: &str) -> Result<NaiveDateTime, RemoteError>;
    fn store(&mut self, name: &str, source: &mut dyn Read) -> Result<u64, RemoteError>;
    fn retrieve(&mut self, name: &str, sink: &mut dyn Write) -> Result<u64, RemoteError>;
    fn close(&mut self) -> Result<(), RemoteError>;
}

/// Opens an unauthenticated session against one endpoint.
pub trait Connector {
    fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, RemoteError>;
}

/// Scoped ownership of one authenticated session.
///
/// `close()` reports the quit outcome; `Drop` covers every other exit path
/// so an early `?` can never leak a live connection.
pub struct Session {
    inner: Option<Box<dyn RemoteSession>>,
    endpoint: Endpoint,
}

impl Session {
    pub(crate) fn new(inner: Box<dyn RemoteSession>, endpoint: Endpoint) -> Self {
        Self {
            inner: Some(inner),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn remote(&mut self) -> &mut dyn RemoteSession {
        self.inner
            .as_mut()
            .expect("session is live until close() consumes it")
            .as_mut()
    }

    pub fn close(mut self) -> Result<(), RemoteError> {
        match self.inner.take() {
            Some(mut session) => session.close(),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint)
            .field("live", &self.inner.is_some())
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(mut session) = self.inner.take() {
            if let Err(err) = session.close() {
                tracing::debug!(endpoint = %self.endpoint, error = %err, "session close during drop failed");
            }
        }
    }
}
