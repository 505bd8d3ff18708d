//! Blackjack dealer.
//!
//! Advertises itself with UDP offers and plays every connecting player on
//! its own session thread.

use std::net::IpAddr;

use anyhow::{Error, anyhow};
use bj_server::config::ServerConfig;
use blackjack::Dealer;
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a blackjack dealer

USAGE:
  bj_server [OPTIONS]

OPTIONS:
  --name       NAME        Name advertised to players     [default: env DEALER_NAME or Byte the Dealer]
  --bind       IP          Interface for the game port    [default: env DEALER_BIND_IP or 0.0.0.0]
  --seed       N           Seed for reproducible shuffles [default: env DEALER_SEED or random]

FLAGS:
  --no-broadcast           Don't send UDP offers
  -h, --help               Print help information

ENVIRONMENT:
  DEALER_BROADCAST_ADDR        Broadcast address for offers (default 255.255.255.255)
  DEALER_EXTRA_TARGETS         More offer targets, comma-separated IP or IP:PORT
  DEALER_READ_TIMEOUT_SECS     Seconds to wait for a decision (default 30)
  DEALER_REQUEST_TIMEOUT_SECS  Seconds to wait for a request (default 30)
  DEALER_BROADCAST             Set to false to disable offers
  RUST_LOG                     Log level (default info)
";

struct Args {
    name: Option<String>,
    bind: Option<IpAddr>,
    seed: Option<u64>,
    no_broadcast: bool,
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        name: pargs.opt_value_from_str("--name")?,
        bind: pargs.opt_value_from_str("--bind")?,
        seed: pargs.opt_value_from_str("--seed")?,
        no_broadcast: pargs.contains("--no-broadcast"),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let config = ServerConfig::from_env(args.name, args.bind, args.seed, args.no_broadcast)?;
    config.validate()?;

    let dealer = Dealer::bind(config.dealer_config())
        .map_err(|e| anyhow!("Failed to bind to {}: {}", config.bind_ip, e))?;
    let addr = dealer.local_addr()?;

    // Catching signals for exit.
    let handle = dealer.handle()?;
    set_handler(move || handle.shutdown())?;

    info!(
        "{} is dealing on port {}. Press Ctrl+C to stop.",
        config.server_name,
        addr.port()
    );
    dealer.run()?;
    info!("Shutting down dealer...");

    Ok(())
}
