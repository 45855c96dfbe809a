// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use bondclip::api::ApiClient;
use bondclip::config::ClientConfig;
use bondclip::error::{ApiError, WorkflowError};
use bondclip::{cli, commands};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Service failures already carry a sanitized message; full detail is in the log.
            if e.is::<ApiError>() || e.is::<WorkflowError>() {
                eprintln!("Error: {}", e);
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    if let Some(("init", sub)) = matches.subcommand() {
        commands::setup::init(&matches, sub)?;
        return Ok(());
    }

    let cfg = ClientConfig::resolve(&matches)?;
    let client = ApiClient::from_config(&cfg)?;

    match matches.subcommand() {
        Some(("bond", sub)) => commands::bonds::handle(&client, &cfg.session, sub).await?,
        Some(("costs", sub)) => commands::costs::handle(&client, sub).await?,
        Some(("analysis", sub)) => commands::analysis::handle(&client, sub).await?,
        Some(("schedule", sub)) => commands::schedule::handle(&client, sub).await?,
        Some(("config", sub)) => commands::setup::handle(&cfg, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
