//! CLI frontend for the cognitive-game difficulty engines.
//!
//! State lives in a JSON file (configs plus attempt history) that is loaded
//! before each command and written back after it.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cg_core::UserId;
use cg_engine::{MemorySessionResult, TrainCompletion, TrainSessionResult, WordAttempt};

use commands::Session;

#[derive(Parser)]
#[command(
    name = "cg",
    about = "Adaptive difficulty for the cognitive games",
    version,
    propagate_version = true
)]
struct Cli {
    /// State file holding configs and attempt history
    #[arg(long, global = true, default_value = "cg-state.json")]
    state: PathBuf,

    /// Engine configuration (JSON); missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Command that turns a prompt on stdin into a completion on stdout
    #[arg(long, global = true)]
    provider_cmd: Option<String>,

    /// Seconds to wait for the content generator
    #[arg(long, global = true)]
    timeout_secs: Option<f64>,

    /// User id
    #[arg(short, long, global = true, default_value = "1")]
    user: u64,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Log decision inputs (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Word-progression game
    #[command(subcommand)]
    Word(WordCommand),

    /// Walk game
    #[command(subcommand)]
    Walk(WalkCommand),

    /// Memory-card game
    #[command(subcommand)]
    Memory(MemoryCommand),

    /// Train-routing game
    #[command(subcommand)]
    Train(TrainCommand),

    /// Show the config in effect for a game
    Config {
        /// Game: words, walk, memory, train
        game: String,
    },

    /// Delete a game's config; history is kept
    Reset {
        /// Game: words, walk, memory, train
        game: String,
    },

    /// Aggregate statistics for a game
    Stats {
        /// Game: words, walk, memory, train (default: all)
        game: Option<String>,
    },
}

#[derive(Subcommand)]
enum WordCommand {
    /// Decide the tier and draw the next word
    Next,

    /// Record a played word
    Submit(WordSubmit),
}

#[derive(Args)]
struct WordSubmit {
    /// The target word
    word: String,

    /// The word was not built
    #[arg(long)]
    failed: bool,

    /// Wrong letters placed
    #[arg(long, default_value = "0")]
    errors: u32,

    /// Seconds taken
    #[arg(long, default_value = "0")]
    time: f64,

    /// Hints used
    #[arg(long, default_value = "0")]
    hints: u32,
}

#[derive(Subcommand)]
enum WalkCommand {
    /// Plan the next session
    Start,

    /// Record a finished session
    Submit(WalkSubmit),
}

#[derive(Args)]
struct WalkSubmit {
    /// Tier the session was played at
    #[arg(long)]
    tier: String,

    /// Correct balls caught
    #[arg(long)]
    hits: u32,

    /// Wrong balls caught
    #[arg(long, default_value = "0")]
    wrong: u32,

    /// Correct balls missed
    #[arg(long, default_value = "0")]
    missed: u32,

    /// The session was abandoned before the end
    #[arg(long)]
    abandoned: bool,

    /// Seconds played
    #[arg(long, default_value = "0")]
    duration: f64,
}

#[derive(Subcommand)]
enum MemoryCommand {
    /// Show the next board
    Next,

    /// Record a finished session
    Submit(MemorySubmit),
}

#[derive(Args)]
struct MemorySubmit {
    /// Pairs found
    #[arg(long)]
    pairs_found: u32,

    /// Pairs on the board
    #[arg(long)]
    total_pairs: u32,

    /// Cards turned over
    #[arg(long)]
    flips: u32,

    /// Seconds used
    #[arg(long)]
    elapsed: f64,

    /// Seconds allowed
    #[arg(long)]
    time_limit: u32,

    /// Not every pair was found
    #[arg(long)]
    incomplete: bool,
}

#[derive(Subcommand)]
enum TrainCommand {
    /// Show the next session's settings
    Next,

    /// Record a finished session
    Submit(TrainSubmit),
}

#[derive(Args)]
struct TrainSubmit {
    /// Trains routed correctly
    #[arg(long)]
    correct: u32,

    /// Trains routed wrongly
    #[arg(long, default_value = "0")]
    wrong: u32,

    /// Trains that appeared
    #[arg(long)]
    spawned: Option<u32>,

    /// The clock ran out
    #[arg(long)]
    timeout: bool,

    /// Seconds played
    #[arg(long, default_value = "0")]
    elapsed: f64,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let session = Session::open(
        &cli.state,
        cli.config.as_deref(),
        cli.provider_cmd.as_deref(),
        cli.timeout_secs,
    )
    .map_err(|e| miette::miette!("{e}"))?;

    let user = UserId(cli.user);
    let json = cli.json;

    let result = match cli.command {
        Commands::Word(WordCommand::Next) => commands::word::next(&session, user, json),
        Commands::Word(WordCommand::Submit(w)) => commands::word::submit(
            &session,
            user,
            &WordAttempt {
                word: w.word,
                success: !w.failed,
                errors: w.errors,
                time_secs: w.time,
                hints: w.hints,
            },
            json,
        ),
        Commands::Walk(WalkCommand::Start) => commands::walk::start(&session, user, json),
        Commands::Walk(WalkCommand::Submit(w)) => commands::walk::submit(
            &session,
            user,
            &commands::walk::Played {
                tier: w.tier,
                hits: w.hits,
                wrong: w.wrong,
                missed: w.missed,
                completed: !w.abandoned,
                duration_secs: w.duration,
            },
            json,
        ),
        Commands::Memory(MemoryCommand::Next) => {
            commands::config::run(&session, user, "memory", json)
        }
        Commands::Memory(MemoryCommand::Submit(m)) => commands::memory::submit(
            &session,
            user,
            &MemorySessionResult {
                completed: !m.incomplete,
                pairs_found: m.pairs_found,
                total_pairs: m.total_pairs,
                total_flips: m.flips,
                elapsed_secs: m.elapsed,
                time_limit_secs: m.time_limit,
            },
            json,
        ),
        Commands::Train(TrainCommand::Next) => {
            commands::config::run(&session, user, "train", json)
        }
        Commands::Train(TrainCommand::Submit(t)) => commands::train::submit(
            &session,
            user,
            &TrainSessionResult {
                correct: t.correct,
                wrong: t.wrong,
                total_spawned: t.spawned,
                completion: if t.timeout {
                    TrainCompletion::Timeout
                } else {
                    TrainCompletion::Completed
                },
                elapsed_secs: t.elapsed,
            },
            json,
        ),
        Commands::Config { game } => commands::config::run(&session, user, &game, json),
        Commands::Reset { game } => commands::reset::run(&session, user, &game),
        Commands::Stats { game } => commands::stats::run(&session, user, game.as_deref(), json),
    };

    result
        .and_then(|()| session.save())
        .map_err(|e| miette::miette!("{e}"))
}
