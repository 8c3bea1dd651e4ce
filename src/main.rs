use std::process::ExitCode;

use chained_hash::{
    config::{Config, Loader},
    mmap::{self, Report},
    Result, Table,
};
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn with_decoder(config: Config, table: Table) -> Result<(Table, Report)> {
    chained_hash::tokio::with_decoder(config.keys_file, table).await
}

fn run(config: Config) -> Result<Report> {
    let mut table = Table::new()?;
    let report = match config.loader {
        Loader::Mmap => mmap::with_mmap(&config.keys_file, &mut table, config.threads)?,
        Loader::Tokio => with_decoder(config, table)?.1,
    };
    Ok(report)
}

fn main() -> ExitCode {
    init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        keys_file = %config.keys_file.display(),
        threads = config.threads,
        loader = ?config.loader,
        "starting bulk load"
    );

    match run(config) {
        Ok(report) => {
            println!(
                "{} keys, {} distinct, {} mismatches",
                report.keys, report.distinct, report.mismatches
            );
            if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            tracing::error!(%error, "bulk load failed");
            ExitCode::FAILURE
        }
    }
}
