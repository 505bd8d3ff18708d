//! A console blackjack player.
//!
//! Finds a dealer through its UDP offers (or connects directly), asks for
//! some rounds and plays them from the terminal or automatically.

use anyhow::{Context, Result};
use bj_client::{
    commands::{COMMANDS_HELP, Command, parse_command, parse_rounds, parse_yes},
    stats::Stats,
    strategy::stand_on_17,
};
use blackjack::{
    Client, Decision, ProtocolConfig,
    net::{client::RoundView, discovery::listen_for_offer},
};
use ctrlc::set_handler;
use log::debug;
use pico_args::Arguments;
use std::{
    io::{self, Write},
    net::SocketAddr,
    time::Duration,
};

const HELP: &str = "\
Play blackjack against a dealer on the local network

USAGE:
  bj_client [OPTIONS]

OPTIONS:
  --name NAME                 Player name                     [default: your user name]
  --rounds N                  Rounds to request (1-255)       [default: ask]
  --server IP:PORT            Connect directly, skip discovery
  --discovery-timeout SECS    How long to wait for an offer   [default: 10]

FLAGS:
  --auto                Hit below 17 without prompting, play one session
  --json                Print final statistics as JSON
  -h, --help            Print help information
";

struct Args {
    name: String,
    rounds: Option<u8>,
    server: Option<SocketAddr>,
    discovery_timeout: Duration,
    auto: bool,
    json: bool,
}

fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        name: pargs
            .opt_value_from_str("--name")?
            .unwrap_or_else(whoami::username),
        rounds: pargs.opt_value_from_fn("--rounds", parse_rounds)?,
        server: pargs.opt_value_from_str("--server")?,
        discovery_timeout: Duration::from_secs(
            pargs.value_from_str("--discovery-timeout").unwrap_or(10),
        ),
        auto: pargs.contains("--auto"),
        json: pargs.contains("--json"),
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_target(false)
        .init();

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let config = ProtocolConfig::default();
    let mut stats = Stats::default();

    loop {
        let rounds = match args.rounds {
            Some(rounds) => rounds,
            None => prompt_rounds()?,
        };

        let addr = match args.server {
            Some(addr) => addr,
            None => {
                println!("Listening for offers on UDP port {}...", config.discovery_port);
                let dealer = listen_for_offer(&config, args.discovery_timeout)
                    .context("No dealer found")?;
                println!("Received offer from \"{}\" at {}", dealer.name, dealer.addr);
                dealer.addr
            }
        };

        if let Err(e) = play_session(args, &config, addr, rounds, &mut stats) {
            println!("Session ended early: {e}");
        }
        println!("{stats}");

        if args.auto || !prompt_play_again()? {
            break;
        }
    }

    if args.json {
        println!("{}", serde_json::to_string(&stats)?);
    }
    Ok(())
}

fn play_session(
    args: &Args,
    config: &ProtocolConfig,
    addr: SocketAddr,
    rounds: u8,
    stats: &mut Stats,
) -> Result<()> {
    let mut client = Client::connect(&addr, config)
        .with_context(|| format!("Couldn't connect to {addr}"))?;
    client.request(rounds, &args.name)?;
    debug!("requested {rounds} round(s) as {}", args.name);

    for round in 1..=rounds {
        println!("\n--- Round {round}/{rounds} ---");
        let report = if args.auto {
            client.play_round(|view| stand_on_17(view.player))?
        } else {
            client.play_round(prompt_decision)?
        };
        println!("Your hand:   {}", report.player);
        println!("Dealer hand: {}", report.dealer);
        println!("Result: {}", report.outcome);
        stats.record(report.outcome);
    }
    Ok(())
}

fn read_line() -> io::Result<Option<String>> {
    io::stdout().flush()?;
    let mut input = String::new();
    match io::stdin().read_line(&mut input)? {
        0 => Ok(None),
        _ => Ok(Some(input)),
    }
}

fn prompt_rounds() -> Result<u8> {
    loop {
        print!("How many rounds? ");
        let Some(input) = read_line()? else {
            std::process::exit(0);
        };
        match parse_rounds(&input) {
            Ok(rounds) => return Ok(rounds),
            Err(e) => println!("{e}"),
        }
    }
}

fn prompt_play_again() -> Result<bool> {
    print!("Play again? [y/N] ");
    Ok(read_line()?.is_some_and(|input| parse_yes(&input)))
}

fn prompt_decision(view: &RoundView) -> Decision {
    println!("Your hand:   {}", view.player);
    println!("Dealer hand: {}", view.dealer);
    loop {
        print!("Hit or stand? ");
        let input = match read_line() {
            Ok(Some(input)) => input,
            // Closed stdin means nobody is there to play.
            Ok(None) | Err(_) => std::process::exit(0),
        };
        match parse_command(&input) {
            Ok(Command::Decide(decision)) => return decision,
            Ok(Command::Help) => println!("{COMMANDS_HELP}"),
            Ok(Command::Quit) => std::process::exit(0),
            Err(e) => println!("{e}"),
        }
    }
}
