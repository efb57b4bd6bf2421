//! calbridge server entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use calbridge_core::tracing::{TracingConfig, init_tracing};
use calbridge_server::{ServerConfig, run};

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();

    if let Err(e) = init_tracing(TracingConfig::server(config.debug, config.log_json)) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
