use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::PathBuf;

use exchange_gateway::config::load_config;
use exchange_gateway::routing::RouteTable;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the exchange edge gateway", long_about = None)]
struct Cli {
    /// Admin API base URL
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key (Bearer token)
    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway system status
    Status,
    /// List the mount table in match order
    Routes,
    /// List registered upstream applications
    Upstreams,
    /// Dry-run a path through the mount table
    Resolve {
        /// Path to resolve, e.g. /trading/orders/
        path: String,
    },
    /// Validate a configuration file offline and print its table
    Check {
        /// Path to the TOML configuration file
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Check never touches the network
    if let Commands::Check { config } = &cli.command {
        return check_config(config);
    }

    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match &cli.command {
        Commands::Status => {
            let res = client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Routes => {
            let res = client
                .get(format!("{}/admin/routes", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Upstreams => {
            let res = client
                .get(format!("{}/admin/upstreams", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Resolve { path } => {
            let res = client
                .get(format!("{}/admin/resolve", cli.url))
                .query(&[("path", path)])
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Check { .. } => unreachable!("handled above"),
    }

    Ok(())
}

fn check_config(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    let table = RouteTable::from_config(&config.mounts);

    println!("Configuration OK: {}", path.display());
    println!(
        "{} upstream(s), {} top-level mount(s)",
        config.upstreams.len(),
        config.mounts.len()
    );
    println!();
    println!("Match order:");
    for route in table.flatten() {
        let destination = match &route.upstream {
            Some(upstream) => format!("→ {}", upstream),
            None => "→ (empty delegation)".to_string(),
        };
        println!("  {:<30} {:<20} {}", route.trail, display_prefix(&route.prefix), destination);
    }

    Ok(())
}

fn display_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        "\"\"".to_string()
    } else {
        prefix.to_string()
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
