use clap::Args;
use std::path::PathBuf;

use crate::cli::PrefixArgs;

#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Source backup archive
    #[arg(long, value_name = "ARCHIVE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub prefix: PrefixArgs,
}

/// Destructive: the existing data volume is deleted before extraction.
pub async fn execute(args: RestoreArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let manager = global.create_manager()?;

    let report = manager.restore(&args.prefix.server_prefix, &args.file).await?;

    if let Some(image) = &report.pulled_image {
        println!("Pulled image [{}]", image);
    }
    if report.removed_previous {
        println!("Removed existing data volume [{}]", report.volume);
    }
    println!(
        "Data volume [{}] successfully restored from [{}]",
        report.volume,
        report.archive.display()
    );
    Ok(())
}
