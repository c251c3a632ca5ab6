mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use unifictl::ControllerError;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.debug);

    let result = match cli.command {
        Commands::Start(args) => commands::start::execute(args, &cli.global).await,
        Commands::Stop(args) => commands::stop::execute(args, &cli.global).await,
        Commands::Backup(args) => commands::backup::execute(args, &cli.global).await,
        Commands::Restore(args) => commands::restore::execute(args, &cli.global).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        if e
            .downcast_ref::<ControllerError>()
            .is_some_and(ControllerError::is_precondition)
        {
            eprintln!("Nothing was changed.");
        }
        std::process::exit(1);
    }
}

/// Log to stderr so stdout only carries command output.
fn init_tracing(debug: bool) {
    let default = if debug { "unifictl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
