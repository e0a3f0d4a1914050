//! WiFi access point scanning through the `AT+CWSTASCAN` commands of
//! A76XX cellular modems.

pub mod client;
pub mod commands;
pub mod config;
pub mod errors;
pub mod record;
pub mod serial;
pub mod transport;

pub use client::WifiClient;
pub use errors::{Result, Status, WifiError};
pub use record::{Bssid, NetworkRecord, ParseRecordError};
pub use transport::{ModemTransport, ResponseOutcome};
