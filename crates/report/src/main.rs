use clap::Parser;

use bordertally_infra::ResidencyConfig;
use bordertally_report::Args;

fn main() -> anyhow::Result<()> {
    bordertally_observability::init();

    let args = Args::parse();
    let config = ResidencyConfig::from_env()?;
    let report = bordertally_report::run(&args, config)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
