//! bitbucket-mcp - MCP server exposing Bitbucket Cloud to AI assistants.

use std::sync::Arc;

use anyhow::Context;
use bitbucket_api::BitbucketClient;
use bitbucket_core::{Config, Settings, TransportKind};
use bitbucket_mcp::{sse, McpServer, ToolHandler};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Keys accepted by `config get` / `config set`, in display order.
const CONFIG_KEYS: &[&str] = &[
    "bitbucket.url",
    "bitbucket.username",
    "bitbucket.workspace",
    "server.transport",
    "server.host",
    "server.port",
];

#[derive(Parser)]
#[command(name = "bitbucket-mcp")]
#[command(author, version, about = "MCP server for Bitbucket Cloud", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server (default)
    Serve {
        /// Transport: stdio or sse
        #[arg(short, long)]
        transport: Option<TransportKind>,

        /// Host to bind (sse)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (sse)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Get a configuration value (e.g. bitbucket.workspace)
    Get { key: String },

    /// Set a configuration value (e.g. server.port 9000)
    Set { key: String, value: String },

    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON-RPC in stdio mode, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => serve(None, None, None).await,
        Some(Commands::Serve {
            transport,
            host,
            port,
        }) => serve(transport, host, port).await,
        Some(Commands::Config { command }) => run_config(command),
    }
}

async fn serve(
    transport: Option<TransportKind>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let Settings {
        bitbucket,
        mut server,
    } = Config::load()?
        .resolve()
        .context("Failed to resolve settings")?;

    if let Some(transport) = transport {
        server.transport = transport;
    }
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    tracing::info!(
        url = %bitbucket.base_url,
        workspace = ?bitbucket.default_workspace,
        transport = %server.transport,
        "Starting bitbucket-mcp"
    );

    let client = BitbucketClient::new(&bitbucket)?;
    let handler = Arc::new(ToolHandler::new(Arc::new(bitbucket), Arc::new(client)));

    match server.transport {
        TransportKind::Stdio => McpServer::new(handler).run_stdio().await?,
        TransportKind::Sse => sse::serve(handler, &server.host, server.port).await?,
    }

    Ok(())
}

fn run_config(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load()?;
            println!("# {}", Config::config_path()?.display());
            for key in CONFIG_KEYS {
                match config.get(key)? {
                    Some(value) => println!("{} = {}", key, value),
                    None => println!("{} = (not set)", key),
                }
            }
        }
        ConfigCommands::Get { key } => match Config::load()?.get(&key)? {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("'{}' is not set", key),
        },
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }
        ConfigCommands::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }

    Ok(())
}
