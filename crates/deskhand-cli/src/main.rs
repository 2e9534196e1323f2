//! deskhand -- desktop automation MCP server.

use clap::{Parser, Subcommand};
use deskhand_desktop::register_desktop_tools;
use deskhand_toolkit::platform::Platform;
use deskhand_tools::{DispatcherConfig, McpServer, ToolRegistry};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "deskhand", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the MCP protocol over stdin/stdout
    Serve {
        /// Maximum accepted argument payload size in bytes
        #[arg(long, default_value_t = 1_048_576)]
        max_input_bytes: usize,
    },

    /// Print the registered tools and their schemas as JSON
    Tools,
}

/// Build the startup registry against the detected platform backends.
fn build_registry() -> anyhow::Result<ToolRegistry> {
    let platform = Platform::detect();
    let registry = ToolRegistry::new();
    register_desktop_tools(&registry, &platform)?;
    tracing::info!(tools = registry.tool_count(), os = std::env::consts::OS, "registry ready");
    Ok(registry)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr: stdout is the JSON-RPC channel.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { max_input_bytes } => {
            let registry = build_registry()?;
            let server = McpServer::new(
                registry,
                DispatcherConfig {
                    max_input_bytes,
                },
            );
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let stdout = tokio::io::stdout();
            server.run(stdin, stdout).await
        }
        Commands::Tools => {
            let registry = build_registry()?;
            let listing = serde_json::to_string_pretty(&registry.list_tools())?;
            println!("{listing}");
            Ok(())
        }
    }
}
