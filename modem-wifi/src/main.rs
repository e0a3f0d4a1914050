#![forbid(unsafe_code)]

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use tracing::{info, warn};

use orb_modem_wifi::config::{Action, Cli, Config, ScanConfig};
use orb_modem_wifi::{NetworkRecord, WifiClient, WifiError};

mod logging;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    let config = Config::from_cli(&cli);

    let mut client = WifiClient::open(&config.serial)
        .wrap_err_with(|| format!("failed to open modem at {}", config.serial.device))?;

    match config.action {
        Action::ShowSignal => {
            let enabled = client
                .is_show_signal()
                .wrap_err("failed to query AT+CWSTASCAN")?;
            println!("{}", if enabled { "enabled" } else { "disabled" });
        }
        Action::SetShowSignal(enabled) => {
            client
                .set_show_signal(enabled)
                .wrap_err("failed to set AT+CWSTASCAN")?;
            info!(enabled, "updated show signal setting");
        }
        Action::Scan(scan) => run_scan(&mut client, &scan)?,
    }

    Ok(())
}

fn run_scan<T>(client: &mut WifiClient<T>, scan: &ScanConfig) -> Result<()>
where
    T: orb_modem_wifi::ModemTransport,
{
    let mut networks = vec![NetworkRecord::default(); scan.capacity];
    let found = match client.scan_wifi(&mut networks) {
        Ok(found) => found.len(),
        Err(WifiError::LostNetworks { found }) => {
            warn!(found, "some scan lines could not be parsed");
            found
        }
        Err(e) => return Err(e).wrap_err("wifi scan failed"),
    };
    let networks = &networks[..found];

    if scan.json {
        println!("{}", serde_json::to_string_pretty(networks)?);
    } else {
        println!("{:<17}  {:>7}  {:>6}", "BSSID", "CHANNEL", "SIGNAL");
        for network in networks {
            println!(
                "{:<17}  {:>7}  {:>6}",
                network.bssid.to_string(),
                network.channel,
                network.signal
            );
        }
    }
    info!(found, capacity = scan.capacity, "scan complete");

    Ok(())
}
