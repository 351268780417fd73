use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use rolegate_cli::{
    cli::RolegateCli,
    command::{Outcome, run},
    config::{ConfigLoader, ConfigOverrides},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> Result<ExitCode> {
    let cli = RolegateCli::parse();

    let config = ConfigLoader::new(ConfigOverrides {
        store: cli.store.clone(),
        config: cli.config.clone(),
        program_id: cli.program_id,
        log: cli.log.clone(),
    })
    .load()?;

    let filter = EnvFilter::try_new(&config.log).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli, config).await? {
        Outcome::Success => Ok(ExitCode::SUCCESS),
        Outcome::Denied => Ok(ExitCode::FAILURE),
    }
}
