use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use flexi_logger::{Logger, LoggerHandle, WriteMode, colored_default_format};
use log::Level;

pub mod config;
use config::{Cli, load_config, setup_resolver};
pub mod http_probe;
use http_probe::prelude::*;
pub mod report;
use report::{RECORD_HEADER, Summary, banner, format_record};
pub mod runner;
use runner::run_all;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let logger_handle = configure_logging(&cli).context("Unable to configure logging")?;

    let run_result = run(&cli).await;

    // Handle needs to be kept alive until end of program
    logger_handle.flush();

    run_result
}

fn configure_logging(cli: &Cli) -> anyhow::Result<LoggerHandle> {
    // log_level() returns None iff verbosity < 0, i.e. being most quiet seems reasonable
    let cli_level = cli.verbose.log_level().unwrap_or(Level::Error);

    Logger::try_with_env_or_str(cli_level.to_string())
        .context("Failed to parse logger spec from env RUST_LOG or cli level")?
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_stderr(colored_default_format)
        .start()
        .context("Failed to start logger handle")
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let app_config = load_config(cli).context("Invalid configuration")?;
    let resolver =
        setup_resolver(&app_config.dns_hosts).context("Failed to set up the DNS resolver")?;
    log::info!("Using DNS hosts: {:?}", app_config.dns_hosts);

    println!(
        "{}",
        banner(
            &app_config.target(),
            app_config.requests,
            app_config.concurrency,
            Utc::now()
        )
    );
    println!();
    println!("{RECORD_HEADER}");

    let connector = Arc::new(TcpConnector::new(resolver));
    let mut probes = run_all(
        app_config.requests,
        app_config.concurrency,
        &app_config.template,
        connector,
    );

    let mut results = Vec::with_capacity(probes.remaining());
    while let Some(result) = probes.next().await.context("Probe run aborted")? {
        println!("{}", format_record(&result));
        results.push(result);
    }
    log::info!("All {} probes finished", results.len());

    println!();
    println!("{}", Summary::from_results(&results));
    Ok(())
}
