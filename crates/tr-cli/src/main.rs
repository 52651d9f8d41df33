//! Tri-Reel terminal slot machine
//!
//! Usage:
//!   trireel                     - Play interactively (same as `play`)
//!   trireel simulate -n 10000   - Run spins on a virtual clock and report rates
//!   trireel stats               - Show the saved balance and statistics
//!   trireel reset               - Restore default balance and statistics

mod display;
mod play;
mod simulate;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use tr_machine::{
    JsonFileStore, KeyValueStore, MachineConfig, MemoryStore, SlotMachine, TimingProfile,
};

#[derive(Parser)]
#[command(name = "trireel", version, about = "Three-reel slot machine")]
struct Cli {
    /// Machine config file (.json, .yaml or .yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Session file (defaults to the user data directory)
    #[arg(long, global = true, conflicts_with = "memory")]
    store: Option<PathBuf>,

    /// Keep the session in memory only
    #[arg(long, global = true)]
    memory: bool,

    /// RNG seed for reproducible sessions
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Reel animation speed
    #[arg(long, global = true, value_enum)]
    profile: Option<Profile>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively
    Play,
    /// Run many spins without animation and report the results
    Simulate {
        /// Number of spins
        #[arg(short = 'n', long, default_value_t = 10_000)]
        spins: u64,
        /// Difficulty level (1-5)
        #[arg(short, long)]
        level: Option<i64>,
        /// Bet per spin (1-100)
        #[arg(short, long)]
        bet: Option<i64>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the saved balance and statistics
    Stats,
    /// Restore default balance and statistics
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Normal,
    Turbo,
    Instant,
}

impl From<Profile> for TimingProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Normal => TimingProfile::Normal,
            Profile::Turbo => TimingProfile::Turbo,
            Profile::Instant => TimingProfile::Instant,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.take() {
        None | Some(Commands::Play) => play::run(open_machine(&cli, config)),
        Some(Commands::Simulate {
            spins,
            level,
            bet,
            json,
        }) => {
            let report = simulate::run(config, spins, level, bet)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
            Ok(())
        }
        Some(Commands::Stats) => {
            let machine = open_machine(&cli, config);
            let ledger = machine.ledger();
            println!("Balance: {}", ledger.player_balance());
            print!("{}", display::stats_table(ledger.stats()));
            Ok(())
        }
        Some(Commands::Reset { yes }) => {
            let mut machine = open_machine(&cli, config);
            let done = machine.reset(&mut |message: &str| yes || ask(message))?;
            if done {
                println!("Session reset.");
            }
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<MachineConfig> {
    let mut config = MachineConfig::load_or_default(cli.config.as_deref())
        .with_context(|| format!("Failed to load config {:?}", cli.config))?;
    if let Some(profile) = cli.profile {
        config = config.with_profile(profile.into());
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

fn open_machine(cli: &Cli, config: MachineConfig) -> SlotMachine {
    let store: Arc<dyn KeyValueStore> = if cli.memory {
        Arc::new(MemoryStore::new())
    } else {
        let path = cli
            .store
            .clone()
            .unwrap_or_else(tr_state::default_store_path);
        log::info!("Session file: {}", path.display());
        Arc::new(JsonFileStore::open(path))
    };
    SlotMachine::new(config, store)
}

fn ask(message: &str) -> bool {
    confirm(&mut io::stdin().lock(), &mut io::stdout(), message)
}

/// Yes/no prompt; anything but "y" is a no. A prompt that cannot be shown
/// still reads the answer.
fn confirm(input: &mut impl BufRead, out: &mut impl Write, message: &str) -> bool {
    write!(out, "{message} [y/N] ").and_then(|()| out.flush()).ok();
    let mut answer = String::new();
    input.read_line(&mut answer).is_ok() && answer.trim().eq_ignore_ascii_case("y")
}
