use std::num::NonZeroUsize;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB2";
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial link to the modem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Path to the modem's AT port
    pub device: String,

    pub baud_rate: u32,

    /// How long a single port read may block
    pub read_timeout: Duration,

    /// How long to wait for the modem to answer a command
    pub response_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(100),
            response_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Maximum number of networks kept from one scan
    pub capacity: usize,

    /// Print results as JSON instead of a table
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowSignal,
    SetShowSignal(bool),
    Scan(ScanConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub serial: SerialConfig,
    pub action: Action,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let serial = SerialConfig {
            device: cli.device.clone(),
            baud_rate: cli.baud,
            response_timeout: Duration::from_millis(cli.response_timeout_ms),
            ..SerialConfig::default()
        };

        let action = match &cli.command {
            Command::ShowSignal => Action::ShowSignal,
            Command::SetShowSignal { state } => {
                Action::SetShowSignal(*state == Toggle::On)
            }
            Command::Scan { capacity, json } => Action::Scan(ScanConfig {
                capacity: capacity.get(),
                json: *json,
            }),
        };

        Self { serial, action }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "WiFi scanning through an A76XX modem")]
pub struct Cli {
    #[arg(
        long,
        env = "MODEM_WIFI_DEVICE",
        default_value = DEFAULT_DEVICE,
        global = true,
        help = "Path to the modem AT port"
    )]
    pub device: String,

    #[arg(long, default_value_t = DEFAULT_BAUD_RATE, global = true)]
    pub baud: u32,

    #[arg(
        long = "response-timeout-ms",
        default_value = "5000",
        global = true,
        help = "How long to wait for the modem to answer a command"
    )]
    pub response_timeout_ms: u64,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print whether scan results include signal levels
    ShowSignal,
    /// Enable or disable signal levels in scan results
    SetShowSignal {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Scan for access points
    Scan {
        /// Maximum number of networks to keep
        #[arg(short, long, default_value = "32")]
        capacity: NonZeroUsize,

        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_builds_a_scan_config_from_cli() {
        let cli = Cli::parse_from([
            "orb-modem-wifi",
            "--device",
            "/dev/ttyACM0",
            "scan",
            "--capacity",
            "4",
            "--json",
        ]);

        let config = Config::from_cli(&cli);

        assert_eq!(config.serial.device, "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.serial.response_timeout, Duration::from_secs(5));
        assert_eq!(
            config.action,
            Action::Scan(ScanConfig {
                capacity: 4,
                json: true
            })
        );
    }

    #[test]
    fn it_parses_set_show_signal() {
        let cli = Cli::parse_from(["orb-modem-wifi", "set-show-signal", "off"]);
        assert_eq!(Config::from_cli(&cli).action, Action::SetShowSignal(false));
    }

    #[test]
    fn it_rejects_a_zero_capacity() {
        let res = Cli::try_parse_from(["orb-modem-wifi", "scan", "--capacity", "0"]);
        assert!(res.is_err());
    }
}
