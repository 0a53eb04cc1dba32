use std::process::ExitCode;

use clap::Parser;
use cplink_tps_bench::args::Cli;
use cplink_tps_bench::commands::run_cli;
use cplink_tps_bench::tracing_utils::configure_tracing;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    configure_tracing(cli.log_level.as_deref());

    match run_cli(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
