use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catena_cli::commands::{chain, commit, demo, prove, status, verify};

#[derive(Parser)]
#[command(name = "catena")]
#[command(about = "Catena - chained functional commitments with provable steps", long_about = None)]
struct Cli {
    /// State directory holding the commitment, proof, and chain logs.
    #[arg(long, short, global = true, default_value = "catena-data")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression and commit the resulting closure
    Commit {
        /// Inline JSON expression
        #[arg(long)]
        expr: Option<String>,

        /// Path to a JSON expression file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Apply the committed function under HEAD to an input
    Chain {
        /// The exact prior commitment (0x-prefixed hex)
        commitment: String,

        /// Input value (integer, bool, nil, or JSON)
        input: String,
    },
    /// Prove the most recent unproven chain step
    Prove,
    /// Verify a proof by its identifier
    Verify {
        /// Proof identifier (pf-prefixed token)
        identifier: String,
    },
    /// Show head, store sizes, and the step audit trail
    Status,
    /// Run the counter transcript end to end (ephemeral)
    Demo,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "catena=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Commit { expr, file } => {
            commit::run(&cli.dir, expr.as_deref(), file.as_ref()).map(|_| ())
        }
        Commands::Chain { commitment, input } => {
            chain::run(&cli.dir, &commitment, &input).map(|_| ())
        }
        Commands::Prove => prove::run(&cli.dir).map(|_| ()),
        Commands::Verify { identifier } => verify::run(&cli.dir, &identifier).map(|_| ()),
        Commands::Status => status::run(&cli.dir),
        Commands::Demo => demo::run(),
    }
}
