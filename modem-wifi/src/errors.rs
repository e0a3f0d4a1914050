use std::fmt;
use std::io;

use thiserror::Error;

/// Outcome code of a WiFi command, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Timeout,
    GenericError,
    /// The scan returned records but at least one line could not be parsed.
    ScanHadLostNetworks,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Success => "success",
            Status::Timeout => "timeout",
            Status::GenericError => "generic error",
            Status::ScanHadLostNetworks => "scan had lost networks",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum WifiError {
    #[error("modem did not answer in time")]
    Timeout,

    #[error("modem sent an unexpected response")]
    UnexpectedResponse,

    /// Records up to `found` are valid, but the modem reported more.
    #[error("{found} networks parsed, some scan lines were discarded")]
    LostNetworks { found: usize },

    #[error("serial transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("failed to open serial port: {0}")]
    Open(#[from] serialport::Error),
}

impl WifiError {
    pub fn status(&self) -> Status {
        match self {
            WifiError::Timeout => Status::Timeout,
            WifiError::LostNetworks { .. } => Status::ScanHadLostNetworks,
            WifiError::UnexpectedResponse
            | WifiError::Transport(_)
            | WifiError::Open(_) => Status::GenericError,
        }
    }
}

pub type Result<T> = std::result::Result<T, WifiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_maps_errors_to_status_codes() {
        assert_eq!(WifiError::Timeout.status(), Status::Timeout);
        assert_eq!(
            WifiError::UnexpectedResponse.status(),
            Status::GenericError
        );
        assert_eq!(
            WifiError::LostNetworks { found: 2 }.status(),
            Status::ScanHadLostNetworks
        );
        assert_eq!(
            WifiError::from(io::Error::from(io::ErrorKind::BrokenPipe)).status(),
            Status::GenericError
        );
    }
}
