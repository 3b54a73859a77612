use clap::{Parser, Subcommand};
use spotlight_store::StoreConfig;
use tracing::Level;

mod commands;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default ./spotlight.toml is used if present
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output as JSON
    #[clap(long, global = true)]
    json: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved store configuration
    Config,

    /// Show store location, persisted schema version and status without changing anything
    Status,

    /// Create the store if needed and apply pending schema upgrades
    Init,
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level INFO or higher.
            .with_max_level(Level::INFO)
            .init();
    }

    let config = match StoreConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Config => commands::config::run(&config, cli.json),
        Commands::Status => commands::store::status(&config, cli.json),
        Commands::Init => commands::store::init(&config, cli.json),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}
