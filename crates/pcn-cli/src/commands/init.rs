//! `pcn init`: Write a sample scenario file.

use clap::Args;
use std::path::PathBuf;

use crate::scenario::SAMPLE;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let scenario_path = args.dir.join("pcn.toml");

    if scenario_path.exists() {
        anyhow::bail!("scenario file already exists at {}", scenario_path.display());
    }

    std::fs::create_dir_all(&args.dir)?;
    std::fs::write(&scenario_path, SAMPLE)?;

    println!("Wrote sample scenario to {}", scenario_path.display());
    println!("Edit pcn.toml to describe your network.");
    println!("Run 'pcn run --scenario {}' to replay it.", scenario_path.display());
    Ok(())
}
