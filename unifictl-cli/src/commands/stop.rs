use clap::Args;
use unifictl::StopOutcome;

use crate::cli::PrefixArgs;

#[derive(Args, Debug)]
pub struct StopArgs {
    #[command(flatten)]
    pub prefix: PrefixArgs,
}

pub async fn execute(args: StopArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let manager = global.create_manager()?;

    match manager.stop(&args.prefix.server_prefix).await? {
        StopOutcome::Stopped { container } => println!("Server [{}] has stopped", container),
        StopOutcome::NotRunning { container } => {
            println!("Server [{}] not running, nothing to stop", container)
        }
    }
    Ok(())
}
