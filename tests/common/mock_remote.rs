//! Scripted in-memory remote for exercising the engine without a server.

use chrono::NaiveDateTime;
use savepass::remote::{Connector, Credentials, Endpoint, RemoteError, RemoteSession};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Behavior of one scripted session.
#[derive(Clone)]
pub struct RemoteScript {
    pub login_error: Option<RemoteError>,
    /// Directories whose cwd fails with 550 until mkdir marks them created.
    pub missing_dirs: Vec<String>,
    pub mkdir_error: Option<RemoteError>,
    /// Precise-tier answer; `None` means the file has no MDTM entry.
    pub mdtm: Option<NaiveDateTime>,
    pub mdtm_transport_error: bool,
    pub listing: Vec<String>,
    pub listing_error: Option<RemoteError>,
    /// `None` makes name listing fail at the transport level.
    pub names: Option<Vec<String>>,
    pub retrieve_body: Option<Vec<u8>>,
    pub stored: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl Default for RemoteScript {
    fn default() -> Self {
        Self {
            login_error: None,
            missing_dirs: Vec::new(),
            mkdir_error: None,
            mdtm: None,
            mdtm_transport_error: false,
            listing: Vec::new(),
            listing_error: None,
            names: Some(Vec::new()),
            retrieve_body: None,
            stored: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

pub struct MockSession {
    script: RemoteScript,
    created: Vec<String>,
    log: CallLog,
}

impl MockSession {
    pub fn new(script: RemoteScript, log: CallLog) -> Self {
        Self {
            script,
            created: Vec::new(),
            log,
        }
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

impl RemoteSession for MockSession {
    fn login(&mut self, username: &str, _password: &str) -> Result<(), RemoteError> {
        self.record(format!("login {username}"));
        match &self.script.login_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn cwd(&mut self, dir: &str) -> Result<(), RemoteError> {
        self.record(format!("cwd {dir}"));
        let missing = self.script.missing_dirs.iter().any(|d| d == dir)
            && !self.created.iter().any(|d| d == dir);
        if missing {
            Err(RemoteError::Unavailable(format!(
                "{dir}: No such file or directory"
            )))
        } else {
            Ok(())
        }
    }

    fn mkdir(&mut self, dir: &str) -> Result<(), RemoteError> {
        self.record(format!("mkdir {dir}"));
        match &self.script.mkdir_error {
            Some(err @ RemoteError::Unavailable(_)) => {
                // Another client won the race; the directory exists now.
                self.created.push(dir.to_string());
                Err(err.clone())
            }
            Some(err) => Err(err.clone()),
            None => {
                self.created.push(dir.to_string());
                Ok(())
            }
        }
    }

    fn name_list(&mut self, path: Option<&str>) -> Result<Vec<String>, RemoteError> {
        self.record(format!("nlst {path:?}"));
        match &self.script.names {
            Some(names) => Ok(names.clone()),
            None => Err(RemoteError::Network("listing failed".to_string())),
        }
    }

    fn dir_list(&mut self, path: Option<&str>) -> Result<Vec<String>, RemoteError> {
        self.record(format!("list {path:?}"));
        match &self.script.listing_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.script.listing.clone()),
        }
    }

    fn mod_time(&mut self, path: &str) -> Result<NaiveDateTime, RemoteError> {
        self.record(format!("mdtm {path}"));
        if self.script.mdtm_transport_error {
            return Err(RemoteError::Network("connection reset".to_string()));
        }
        match self.script.mdtm {
            Some(t) => Ok(t),
            None => Err(RemoteError::Unavailable(format!("{path}: no such file"))),
        }
    }

    fn store(&mut self, name: &str, source: &mut dyn Read) -> Result<u64, RemoteError> {
        let mut body = Vec::new();
        source
            .read_to_end(&mut body)
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        self.record(format!("stor {name}"));
        let len = body.len() as u64;
        self.script.stored.lock().unwrap().push((name.to_string(), body));
        Ok(len)
    }

    fn retrieve(&mut self, name: &str, sink: &mut dyn Write) -> Result<u64, RemoteError> {
        self.record(format!("retr {name}"));
        match &self.script.retrieve_body {
            Some(body) => {
                sink.write_all(body)
                    .map_err(|e| RemoteError::Network(e.to_string()))?;
                Ok(body.len() as u64)
            }
            None => Err(RemoteError::Unavailable(format!("{name}: no such file"))),
        }
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        self.record("quit".to_string());
        Ok(())
    }
}

/// Hands out one scripted outcome per connect attempt, in order.
pub struct MockConnector {
    outcomes: Mutex<VecDeque<Result<RemoteScript, RemoteError>>>,
    log: CallLog,
}

impl MockConnector {
    pub fn new(outcomes: Vec<Result<RemoteScript, RemoteError>>) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::from(outcomes)),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn single(script: RemoteScript) -> Self {
        Self::new(vec![Ok(script)])
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Connector for MockConnector {
    fn connect(
        &self,
        endpoint: &Endpoint,
        _timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, RemoteError> {
        self.log.lock().unwrap().push(format!("connect {endpoint}"));
        match self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted connect attempt")
        {
            Ok(script) => Ok(Box::new(MockSession::new(script, self.log.clone()))),
            Err(err) => Err(err),
        }
    }
}

pub fn endpoints(hosts: &[&str]) -> Vec<Endpoint> {
    hosts
        .iter()
        .map(|host| Endpoint {
            host: host.to_string(),
            port: 21,
        })
        .collect()
}

pub fn test_credentials() -> Credentials {
    Credentials {
        username: "player".to_string(),
        password: "hunter2".to_string(),
    }
}
