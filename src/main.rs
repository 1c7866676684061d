mod application;
mod domain;
mod infrastructure;
mod presentation;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use crate::infrastructure::http_client::HyperHttpClient;
use crate::presentation::cli::Cli;

/// jolt: a command-line HTTP client
///
/// Builds one request from the command line, turning `key=value` and
/// `key:=value` params into a nested JSON body, prints the response and can
/// drop into a prompt that queries fields of the JSON response. Requests and
/// variables can be saved to a config file and replayed later.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match HyperHttpClient::new() {
        Ok(http_client) => cli.run(&http_client.create_request_service()).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        eprintln!("{}", format!("{:#}", err).red());
        std::process::exit(1);
    }
}
