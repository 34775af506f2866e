//! Command-line front end for the Legend in the Mist roll engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "litm",
    about = "Legend in the Mist roll calculator",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify tag names written in bracket notation
    Classify {
        /// Tags such as "[Brave++]" or "[--Coward-2]"
        #[arg(required = true)]
        tags: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the target tags in a challenge's tag text
    Targets {
        /// Text with inline tags such as "[Ogre-3] [Spiked Club]"
        text: String,
    },

    /// Compute the power of a roll session
    Power {
        /// Session JSON file
        #[arg(short, long)]
        session: PathBuf,

        /// Engine configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Commit a roll session and roll 2d6 + power
    Roll {
        /// Session JSON file
        #[arg(short, long)]
        session: PathBuf,

        /// Engine configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// RNG seed for a reproducible roll
        #[arg(long)]
        seed: Option<u64>,

        /// Roll type: quick, tracked, mitigate
        #[arg(short = 't', long = "type", default_value = "tracked")]
        roll_type: String,

        /// Roll title
        #[arg(long, default_value = "Roll")]
        title: String,

        /// Roll as the GM, bypassing moderation
        #[arg(long)]
        gm: bool,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify { tags, json } => commands::classify::run(&tags, json),
        Commands::Targets { text } => commands::targets::run(&text),
        Commands::Power {
            session,
            config,
            json,
        } => commands::power::run(&session, config.as_deref(), json),
        Commands::Roll {
            session,
            config,
            seed,
            roll_type,
            title,
            gm,
        } => commands::roll::run(&commands::roll::RollArgs {
            session: &session,
            config: config.as_deref(),
            seed,
            roll_type: &roll_type,
            title: &title,
            gm,
        }),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
