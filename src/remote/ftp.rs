//! suppaftp-backed implementation of the remote session traits.

use super::{Connector, Endpoint, RemoteError, RemoteSession};
use chrono::NaiveDateTime;
use std::io::{Read, Write};
use std::net::ToSocketAddrs;
use std::time::Duration;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};

pub struct FtpConnector;

impl Connector for FtpConnector {
    fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Duration,
    ) -> Result<Box<dyn RemoteSession>, RemoteError> {
        let addrs = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(|e| RemoteError::Network(format!("resolving {}: {}", endpoint, e)))?;

        let mut last_error = None;
        for addr in addrs {
            match FtpStream::connect_timeout(addr, timeout) {
                Ok(stream) => return Ok(Box::new(FtpRemote { stream })),
                Err(err) => last_error = Some(map_ftp_error(err)),
            }
        }

        Err(last_error
            .unwrap_or_else(|| RemoteError::Network(format!("no addresses for {}", endpoint))))
    }
}

pub struct FtpRemote {
    stream: FtpStream,
}

impl RemoteSession for FtpRemote {
    fn login(&mut self, username: &str, password: &str) -> Result<(), RemoteError> {
        self.stream
            .login(username, password)
            .map_err(map_ftp_error)?;
        // Save states are raw binary; ASCII mode would mangle them.
        self.stream
            .transfer_type(FileType::Binary)
            .map_err(map_ftp_error)
    }

    fn cwd(&mut self, dir: &str) -> Result<(), RemoteError> {
        self.stream.cwd(dir).map_err(map_ftp_error)
    }

    fn mkdir(&mut self, dir: &str) -> Result<(), RemoteError> {
        self.stream.mkdir(dir).map_err(map_ftp_error)
    }

    fn name_list(&mut self, path: Option<&str>) -> Result<Vec<String>, RemoteError> {
        self.stream.nlst(path).map_err(map_ftp_error)
    }

    fn dir_list(&mut self, path: Option<&str>) -> Result<Vec<String>, RemoteError> {
        self.stream.list(path).map_err(map_ftp_error)
    }

    fn mod_time(&mut self, path: &str) -> Result<NaiveDateTime, RemoteError> {
        self.stream.mdtm(path).map_err(map_ftp_error)
    }

    fn store(&mut self, name: &str, source: &mut dyn Read) -> Result<u64, RemoteError> {
        let mut reader = source;
        self.stream
            .put_file(name, &mut reader)
            .map_err(map_ftp_error)
    }

    fn retrieve(&mut self, name: &str, sink: &mut dyn Write) -> Result<u64, RemoteError> {
        self.stream
            .retr(name, |reader| {
                std::io::copy(reader, &mut *sink).map_err(FtpError::ConnectionError)
            })
            .map_err(map_ftp_error)
    }

    fn close(&mut self) -> Result<(), RemoteError> {
        self.stream.quit().map_err(map_ftp_error)
    }
}

/// Classifies by the reply's status code, not its text.
fn map_ftp_error(err: FtpError) -> RemoteError {
    match err {
        FtpError::ConnectionError(io) => RemoteError::Network(io.to_string()),
        FtpError::UnexpectedResponse(response) => {
            let message = String::from_utf8_lossy(&response.body).trim().to_string();
            match response.status {
                Status::NotLoggedIn => RemoteError::AuthRejected(message),
                Status::FileUnavailable => RemoteError::Unavailable(message),
                _ => RemoteError::Protocol(message),
            }
        }
        other => RemoteError::Protocol(other.to_string()),
    }
}
