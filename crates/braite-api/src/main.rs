//! Braite CLI and REST API entry point.
//!
//! Binary name: `braite`
//!
//! Parses CLI arguments, initializes tracing and configuration, then
//! dispatches to the command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use braite_infra::config::load_config;
use braite_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need config or logging
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "braite", &mut std::io::stdout());
        return Ok(());
    }

    let options = TracingOptions {
        json: cli.json_logs,
        otel: cli.otel,
        ..TracingOptions::from_verbosity(cli.verbose, cli.quiet)
    };
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let mut config = load_config(&cli.config).await;

    let result = match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cli::serve::serve(config).await
        }
        Commands::Ask {
            query,
            session,
            json,
        } => cli::ask::ask(&config, query, session, json).await,
        Commands::Config => cli::config::show_config(&config),
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
