use clap::Args;

use crate::cli::PrefixArgs;

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Disable Docker host networking (may break ability to locate local network devices)
    #[arg(long)]
    pub no_host_network: bool,

    #[command(flatten)]
    pub prefix: PrefixArgs,
}

pub async fn execute(args: StartArgs, global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let manager = global.create_manager()?;
    let prefix = &args.prefix.server_prefix;

    let report = manager.start(prefix, !args.no_host_network).await?;

    if let Some(image) = &report.pulled_image {
        println!("Pulled image [{}]", image);
    }
    for volume in &report.created_volumes {
        println!("Created volume [{}]", volume);
    }
    println!("Started server [{}] as [{}]", report.image, report.container);
    println!("Running as container ID [{}]", report.container_id);
    Ok(())
}
