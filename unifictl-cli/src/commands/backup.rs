use clap::Args;
use std::path::PathBuf;

use crate::cli::PrefixArgs;

#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Target backup archive
    #[arg(long, value_name = "ARCHIVE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub prefix: PrefixArgs,
}

pub async fn execute(args: BackupArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let manager = global.create_manager()?;

    let report = manager.backup(&args.prefix.server_prefix, &args.file).await?;

    if let Some(image) = &report.pulled_image {
        println!("Pulled image [{}]", image);
    }
    println!(
        "Backup of [{}] successfully created at [{}]",
        report.volume,
        report.archive.display()
    );
    Ok(())
}
