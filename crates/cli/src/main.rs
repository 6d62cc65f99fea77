//! Briar CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the HTTP gateway
//! - `ask`    — Send a single question from the terminal
//! - `doctor` — Diagnose configuration and data health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "briar",
    about = "Briar — the school assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question from the terminal
    Ask {
        /// The question to ask
        message: String,

        /// Response mode: quick, info, or guide
        #[arg(short, long, default_value = "quick")]
        mode: String,
    },

    /// Diagnose configuration and data health
    Doctor {
        /// Also send a one-token test request to the model backend
        #[arg(long)]
        ping: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { message, mode } => commands::ask::run(&message, &mode).await?,
        Commands::Doctor { ping } => commands::doctor::run(ping).await?,
    }

    Ok(())
}
