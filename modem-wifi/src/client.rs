//! Caller-facing WiFi API of the modem.

use crate::commands::WifiCommands;
use crate::config::SerialConfig;
use crate::errors::Result;
use crate::record::NetworkRecord;
use crate::serial::SerialTransport;
use crate::transport::ModemTransport;

/// WiFi scanning through a cellular modem.
///
/// Failures come back as [`WifiError`](crate::WifiError) values; use
/// [`WifiError::status`](crate::WifiError::status) to branch on the kind.
/// The client is not meant to be shared: one caller drives it at a time.
pub struct WifiClient<T> {
    wifi_cmd: WifiCommands<T>,
}

impl WifiClient<SerialTransport> {
    /// Opens the modem's AT port.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        Ok(Self::new(SerialTransport::open(config)?))
    }
}

impl<T: ModemTransport> WifiClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            wifi_cmd: WifiCommands::new(transport),
        }
    }

    pub fn is_show_signal(&mut self) -> Result<bool> {
        self.wifi_cmd.is_show_signal()
    }

    pub fn set_show_signal(&mut self, enabled: bool) -> Result<()> {
        self.wifi_cmd.set_show_signal(enabled)
    }

    /// Scans into `networks` and returns the filled prefix.
    ///
    /// If some lines were dropped this returns
    /// [`WifiError::LostNetworks`](crate::WifiError::LostNetworks); the
    /// first `found` entries of `networks` are still valid.
    pub fn scan_wifi<'a>(
        &mut self,
        networks: &'a mut [NetworkRecord],
    ) -> Result<&'a [NetworkRecord]> {
        let found = self.wifi_cmd.scan_wifi(networks)?.into_result()?;
        Ok(&networks[..found])
    }

    pub fn into_transport(self) -> T {
        self.wifi_cmd.into_transport()
    }
}
