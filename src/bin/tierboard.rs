//! Command line tier board persisted into a local file cache.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tier_board::{
    board::{BoardCache, Change, FileCache, RenderScope, Tier, TierBoard, TierStore, delete_prompt},
    config::BoardConfig,
};

#[derive(Parser)]
#[command(name = "tierboard")]
#[command(about = "Rank players into five tiers, persisted between runs")]
struct Args {
    /// Directory holding the board cache (overrides the config file)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every tier
    Show,
    /// Add a player to tier 1
    Add {
        /// Player name; surrounding whitespace is trimmed
        name: String,
    },
    /// Move a player to the end of another tier
    Move {
        /// Tier the player is currently in
        #[arg(value_parser = parse_tier)]
        from: Tier,
        /// Position of the player inside `from`, starting at 0
        index: usize,
        /// Destination tier
        #[arg(value_parser = parse_tier)]
        to: Tier,
    },
    /// Delete a player after confirmation
    Delete {
        #[arg(value_parser = parse_tier)]
        tier: Tier,
        /// Position of the player inside `tier`, starting at 0
        index: usize,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Replace the cached board with the seed roster
    Reset,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = BoardConfig::load();
    let cache_dir = args.cache_dir.unwrap_or(config.cache_dir);
    debug!(cache_dir = %cache_dir.display(), "opening tier board cache");

    let mut store = TierStore::hydrate(FileCache::new(cache_dir), config.seed.clone());

    let change = match args.command {
        Command::Show => {
            print_board(store.board());
            return Ok(());
        }
        Command::Add { name } => store.add_player(&name)?,
        Command::Move { from, index, to } => store.move_player(from, index, to)?,
        Command::Delete { tier, index, yes } => {
            if yes {
                store.delete_player(tier, index, &mut |_: &str| true)?
            } else {
                store.delete_player(tier, index, &mut ask_on_stdin)?
            }
        }
        Command::Reset => {
            store.reset(config.seed).context("writing tier board cache")?;
            print_board(store.board());
            return Ok(());
        }
    };

    report(&store, &change);
    Ok(())
}

fn report<C: BoardCache>(store: &TierStore<C>, change: &Change) {
    match change.render_scope() {
        RenderScope::Nothing => println!("Nothing changed."),
        RenderScope::Tier(tier) => print_tier(tier, store.board().tier(tier)),
        RenderScope::All => print_board(store.board()),
    }
}

fn print_board(board: &TierBoard) {
    for tier in Tier::all() {
        print_tier(tier, board.tier(tier));
    }
}

fn print_tier(tier: Tier, names: &[String]) {
    println!("Tier {tier}");
    for (index, name) in names.iter().enumerate() {
        println!("  [{index}] {name}");
    }
}

/// Ask for a yes/no answer; anything but `y`/`yes` declines.
fn ask_on_stdin(player: &str) -> bool {
    print!("{} [y/N] ", delete_prompt(player));
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn parse_tier(value: &str) -> Result<Tier, String> {
    let number: u8 = value
        .parse()
        .map_err(|_| format!("`{value}` is not a tier number"))?;
    Tier::new(number).map_err(|err| err.to_string())
}

/// Logs go to stderr so they never mix with the printed board.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
