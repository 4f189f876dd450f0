mod clipboard;
mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, slots::SlotsSubcommand, user::UserSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "slotdesk",
    about = "Workflow pages and twenty saved slots per editor, behind a sign-in",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from slotdesk.yaml or .git/)
    #[arg(long, global = true, env = "SLOTDESK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create slotdesk.yaml and the data directory
    Init,

    /// Manage sign-in accounts
    User {
        #[command(subcommand)]
        subcommand: UserSubcommand,
    },

    /// Read and write saved slots
    Slots {
        #[command(subcommand)]
        subcommand: SlotsSubcommand,
    },

    /// Inspect and validate slotdesk.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Launch the web server
    Serve {
        /// Port to listen on (default: server.port from slotdesk.yaml)
        #[arg(long)]
        port: Option<u16>,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::User { subcommand } => cmd::user::run(&root, subcommand, cli.json),
        Commands::Slots { subcommand } => cmd::slots::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port, no_open } => cmd::serve::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
