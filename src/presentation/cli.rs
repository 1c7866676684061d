use crate::application::builders::request_builder::{RequestBuilder, parse_headers};
use crate::application::interactive::InteractiveSession;
use crate::application::services::HttpRequestService;
use crate::domain::entities::{Method, Request, SavedRequest};
use crate::infrastructure::config::ConfigStore;
use crate::infrastructure::output;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;

/// CLI configuration for jolt
#[derive(Parser, Debug)]
#[command(name = "jolt", version)]
#[command(
    about = "Command-line HTTP client with JSON params and an interactive response prompt",
    long_about = None
)]
pub struct Cli {
    /// Config file holding variables and saved requests
    #[arg(long, global = true, env = "JOLT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a GET request (params are ignored)
    #[command(visible_alias = "g")]
    Get(RequestArgs),

    /// Send a POST request with params as the JSON body
    #[command(visible_alias = "p")]
    Post(RequestArgs),

    /// Send a PUT request with params as the JSON body
    Put(RequestArgs),

    /// Send a PATCH request with params as the JSON body
    Patch(RequestArgs),

    /// Send a DELETE request with params as the JSON body
    Delete(RequestArgs),

    /// Replay a saved request, appending extra params and headers
    #[command(visible_alias = "u")]
    Use(UseArgs),

    /// Print the config file
    Config,

    /// Read and write variables
    #[command(visible_alias = "v", subcommand)]
    Var(VarCommand),
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    pub url: String,

    /// Body params: key=value for strings, key:=value for booleans and integers,
    /// dotted keys for nested objects (user.name=ada)
    pub params: Vec<String>,

    /// Content type alias (json, html) or a full MIME type
    #[arg(short = 't', long = "type", default_value = "json")]
    pub content_type: String,

    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Raw JSON body, replaces params
    #[arg(short = 'd', long = "data")]
    pub body: Option<String>,

    /// Save the request under this name instead of sending it
    #[arg(short, long)]
    pub save: Option<String>,

    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Args, Debug)]
pub struct UseArgs {
    /// Name of the saved request
    pub name: String,

    /// Extra params appended to the saved ones
    pub params: Vec<String>,

    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Args, Debug, Default)]
pub struct DisplayArgs {
    /// Query the response body after printing it
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the outgoing request instead of the response body
    #[arg(long = "request-info", visible_alias = "ri")]
    pub request_info: bool,

    #[arg(short, long)]
    pub verbose: bool,

    /// Write the response body to a file
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum VarCommand {
    /// Set a variable
    Set {
        name: String,
        value: String,
        #[arg(long, default_value = "")]
        space: String,
    },
    /// Print a variable
    Get {
        name: String,
        #[arg(long, default_value = "")]
        space: String,
    },
}

impl Cli {
    pub async fn run(self, request_service: &HttpRequestService) -> Result<()> {
        let config_path = self.config;
        let (method, args) = match self.command {
            Commands::Get(args) => (Method::Get, args),
            Commands::Post(args) => (Method::Post, args),
            Commands::Put(args) => (Method::Put, args),
            Commands::Patch(args) => (Method::Patch, args),
            Commands::Delete(args) => (Method::Delete, args),
            Commands::Use(args) => return handle_use(args, config_path, request_service).await,
            Commands::Config => return print_config(config_path),
            Commands::Var(command) => return handle_var(command, config_path),
        };

        handle_request(method, args, config_path, request_service).await
    }
}

async fn handle_request(
    method: Method,
    args: RequestArgs,
    config_path: Option<PathBuf>,
    request_service: &HttpRequestService,
) -> Result<()> {
    let saved = SavedRequest {
        uri: args.url,
        method: method.to_string(),
        headers: parse_headers(&args.headers)?.into_iter().collect(),
        params: args.params,
        content_type: args.content_type,
        data: args.body,
    };

    if let Some(name) = args.save {
        // Build once so a request that could never be sent is not stored
        build_request(&saved)?;

        let store = config_store(config_path)?;
        let mut config = store.load_or_create()?;
        config.save_request(&name, saved);
        store.save(&config)?;
        println!("{}", format!("Saved request '{}'", name).green());
        return Ok(());
    }

    send(&saved, &args.display, request_service).await
}

async fn handle_use(
    args: UseArgs,
    config_path: Option<PathBuf>,
    request_service: &HttpRequestService,
) -> Result<()> {
    let store = config_store(config_path)?;
    let config = store.load_or_create()?;
    let mut saved = config.saved_request(&args.name)?.clone();
    debug!(name = %args.name, extra_params = args.params.len(), "replaying saved request");

    saved.params.extend(args.params);
    saved.headers.extend(parse_headers(&args.headers)?);

    send(&saved, &args.display, request_service).await
}

fn print_config(config_path: Option<PathBuf>) -> Result<()> {
    let store = config_store(config_path)?;
    let config = store.load_or_create()?;
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

fn handle_var(command: VarCommand, config_path: Option<PathBuf>) -> Result<()> {
    let store = config_store(config_path)?;
    let mut config = store.load_or_create()?;

    match command {
        VarCommand::Set { name, value, space } => {
            config.set_var(&space, &name, &value);
            store.save(&config)?;
        }
        VarCommand::Get { name, space } => {
            println!("{}", config.get_var(&space, &name)?);
        }
    }
    Ok(())
}

fn build_request(saved: &SavedRequest) -> Result<Request> {
    let mut builder = RequestBuilder::new().method(&saved.method)?.url(&saved.uri)?;
    for (name, value) in &saved.headers {
        builder = builder.header(name, value);
    }

    builder
        .content_type(&saved.content_type)
        .params(&saved.params)?
        .body(&saved.data)?
        .build()
}

async fn send(
    saved: &SavedRequest,
    display: &DisplayArgs,
    request_service: &HttpRequestService,
) -> Result<()> {
    let request = build_request(saved)?;
    let sent = request.clone();
    let response = request_service.send_request(request).await?;

    if display.verbose {
        output::print_status(&response);
    }

    if display.request_info {
        output::print_request_info(&sent);
        return Ok(());
    }

    match &display.output {
        Some(path) => {
            std::fs::write(path, &response.body)
                .with_context(|| format!("Failed to write response to {}", path))?;
            if display.verbose {
                println!("Saved response to {}", path);
            }
        }
        None => output::print_response_body(&response.body),
    }

    if display.interactive {
        let body = response.body;
        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let color = stdout.is_terminal();
            InteractiveSession::new(body.as_bytes())
                .with_color(color)
                .run(stdin.lock(), stdout.lock())
        })
        .await
        .context("Interactive session stopped unexpectedly")??;
    }

    Ok(())
}

fn config_store(path: Option<PathBuf>) -> Result<ConfigStore> {
    let path = match path {
        Some(path) => path,
        None => ConfigStore::default_path()?,
    };
    debug!(path = %path.display(), "using config file");
    Ok(ConfigStore::new(path))
}
