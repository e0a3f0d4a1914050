//! `AT+CWSTASCAN` command family (section 25 of the A76XX AT manual).
//!
//! | Command     | Forms     | Methods                                              |
//! |-------------|-----------|------------------------------------------------------|
//! | CWSTASCAN   | R / W / E | [`is_show_signal`], [`set_show_signal`], [`scan_wifi`] |
//! | CWSTASCANEX | -         | not supported                                        |
//!
//! [`is_show_signal`]: WifiCommands::is_show_signal
//! [`set_show_signal`]: WifiCommands::set_show_signal
//! [`scan_wifi`]: WifiCommands::scan_wifi

use tracing::{debug, trace, warn};

use crate::errors::{Result, Status, WifiError};
use crate::record::NetworkRecord;
use crate::transport::{ModemTransport, ResponseOutcome, RSP_ERROR, RSP_OK};

pub const CMD_QUERY_SHOW_SIGNAL: &str = "AT+CWSTASCAN?";
pub const CMD_SET_SHOW_SIGNAL: &str = "AT+CWSTASCAN=";
pub const CMD_SCAN: &str = "AT+CWSTASCAN";

const RSP_SHOW_SIGNAL: &str = "+CWSTASCAN: ";
const RSP_SCAN: &str = "+CWSTASCAN:";

/// How long scan result lines are read after the modem acknowledged the scan.
pub const SCAN_READ_WINDOW_MS: u64 = 1000;

/// Longest scan line handled in one piece. Longer lines are split and the
/// pieces fail to parse.
pub const LINE_BUFFER_LEN: usize = 64;

/// Lines shorter than this cannot hold a record (a BSSID alone is 17
/// characters) and are skipped without counting as lost. This is the
/// threshold the modem firmware integration has always used, not a derived
/// bound.
pub const MIN_RECORD_LINE_LEN: usize = 10;

/// Result of a scan that got past the modem's acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of records written to the front of the caller's buffer.
    pub found: usize,
    /// At least one line could not be parsed, so `found` is a lower bound.
    pub lost_networks: bool,
}

impl ScanReport {
    pub fn status(&self) -> Status {
        if self.lost_networks {
            Status::ScanHadLostNetworks
        } else {
            Status::Success
        }
    }

    /// Turns a partial scan into [`WifiError::LostNetworks`].
    pub fn into_result(self) -> Result<usize> {
        if self.lost_networks {
            Err(WifiError::LostNetworks { found: self.found })
        } else {
            Ok(self.found)
        }
    }
}

/// Issues WiFi commands over a [`ModemTransport`].
///
/// Every call blocks until the modem answered, the transport timed out or
/// the scan window closed. No state is kept between calls.
pub struct WifiCommands<T> {
    transport: T,
}

impl<T: ModemTransport> WifiCommands<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Queries whether the modem appends signal levels to scan results.
    pub fn is_show_signal(&mut self) -> Result<bool> {
        self.transport.send_command(&[CMD_QUERY_SHOW_SIGNAL])?;
        match self.transport.wait_response(&[RSP_SHOW_SIGNAL, RSP_ERROR])? {
            ResponseOutcome::MatchedFirst => {
                let value = self.transport.parse_int_clear()?;
                debug!(value, "show signal setting");
                Ok(value != 0)
            }
            ResponseOutcome::Timeout => Err(WifiError::Timeout),
            outcome => {
                debug!(?outcome, "unexpected response to {CMD_QUERY_SHOW_SIGNAL}");
                Err(WifiError::UnexpectedResponse)
            }
        }
    }

    pub fn set_show_signal(&mut self, enabled: bool) -> Result<()> {
        let value = if enabled { "1" } else { "0" };
        self.transport.send_command(&[CMD_SET_SHOW_SIGNAL, value])?;
        expect_ok(self.transport.wait_response(&[RSP_OK, RSP_ERROR])?)
    }

    /// Triggers a scan and fills `networks` from the front.
    ///
    /// Lines are read while the modem has data buffered, `networks` has room
    /// and [`SCAN_READ_WINDOW_MS`] has not elapsed. A line that fails to
    /// parse is dropped and flags the report; it does not end the scan.
    /// Running out of room is not a loss.
    pub fn scan_wifi(&mut self, networks: &mut [NetworkRecord]) -> Result<ScanReport> {
        self.transport.send_command(&[CMD_SCAN])?;
        match self.transport.wait_response(&[RSP_SCAN, RSP_ERROR])? {
            ResponseOutcome::MatchedFirst => self.read_scan_results(networks),
            ResponseOutcome::Timeout => Err(WifiError::Timeout),
            outcome => {
                debug!(?outcome, "unexpected response to {CMD_SCAN}");
                Err(WifiError::UnexpectedResponse)
            }
        }
    }

    fn read_scan_results(&mut self, networks: &mut [NetworkRecord]) -> Result<ScanReport> {
        let started = self.transport.millis();
        let deadline = started.saturating_add(SCAN_READ_WINDOW_MS);
        let mut report = ScanReport {
            found: 0,
            lost_networks: false,
        };
        let mut line = [0u8; LINE_BUFFER_LEN];

        while self.transport.available()? > 0
            && report.found < networks.len()
            && self.transport.millis() < deadline
        {
            let mut len = self.transport.read_line_into(&mut line, b'\n')?;
            if len == 0 {
                continue;
            }
            if line[len - 1] == b'\r' {
                len -= 1;
            }
            let line = &line[..len];
            if len < MIN_RECORD_LINE_LEN {
                trace!(line = %String::from_utf8_lossy(line), "skipping short line");
                continue;
            }

            match NetworkRecord::parse(line) {
                Ok(record) => {
                    trace!(%record, "scan record");
                    networks[report.found] = record;
                    report.found += 1;
                }
                Err(err) => {
                    warn!(
                        line = %String::from_utf8_lossy(line),
                        "discarding scan line: {err}"
                    );
                    report.lost_networks = true;
                }
            }
        }

        debug!(
            found = report.found,
            lost_networks = report.lost_networks,
            capacity = networks.len(),
            elapsed_ms = self.transport.millis().saturating_sub(started),
            "wifi scan finished"
        );
        Ok(report)
    }
}

fn expect_ok(outcome: ResponseOutcome) -> Result<()> {
    match outcome {
        ResponseOutcome::MatchedFirst => Ok(()),
        ResponseOutcome::Timeout => Err(WifiError::Timeout),
        ResponseOutcome::MatchedOther(_) | ResponseOutcome::Error => {
            Err(WifiError::UnexpectedResponse)
        }
    }
}
