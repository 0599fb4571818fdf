//! chaingql CLI — inspect and query the explorer's GraphQL providers.
//!
//! Usage:
//! ```bash
//! # Show the resolved provider pool
//! chaingql providers --config explorer.json
//!
//! # Check every provider in rotation order
//! chaingql probe --config explorer.json --testnet
//!
//! # Run a query through the resilient client
//! chaingql query --query '{ blocks(count: 1) { totalCount } }'
//! ```

mod logging;
mod settings;

use std::env;
use std::process;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};

use chaingql_client::{build_registry, ClientOptions};
use chaingql_core::{
    load_config, select_from_entropy, ExplorerConfig, GraphqlRequest, TransportError,
};
use chaingql_http::HttpLink;

use crate::logging::init_tracing;
use crate::settings::CliSettings;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "providers" => cmd_providers(&args[2..]),
        "probe" => cmd_probe(&args[2..]).await,
        "query" => cmd_query(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("chaingql {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chaingql {}", env!("CARGO_PKG_VERSION"));
    println!("Inspect and query NCOG Earth Chain GraphQL providers\n");
    println!("USAGE:");
    println!("    chaingql <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    providers  Print the resolved provider pool and selection policy");
    println!("    probe      Send {{ __typename }} to the active provider and each rotation candidate");
    println!("    query      Run a query through the resilient client and print its data");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("FLAGS:");
    println!("    --config <FILE>       Settings file (default: built-in NCOG Earth Chain profiles)");
    println!("    --testnet             Use the testnet provider list");
    println!("    --client <NAME>       Registered client to query (default: the default client)");
    println!("    --query <GRAPHQL>     Query document  [required for query]");
    println!("    --variables <JSON>    Query variables as a JSON object");
}

/// Read settings, install logging and finalize the configuration.
fn load(args: &[String]) -> Result<ExplorerConfig> {
    let settings = CliSettings::load(parse_flag(args, "--config").as_deref())?;
    init_tracing(&settings.log);

    let use_testnet = has_flag(args, "--testnet") || settings.explorer.use_testnet;
    load_config(&settings.explorer, use_testnet).context("invalid provider configuration")
}

fn cmd_providers(args: &[String]) -> Result<()> {
    let config = load(args)?;

    let network = if config.use_testnet { "testnet" } else { "mainnet" };
    println!("Providers ({network}, selection: {}):\n", config.selection);
    for (index, provider) in config.providers.iter().enumerate() {
        println!("  [{index}] {}", provider.http);
        if let Some(ws) = provider.stream_endpoint() {
            println!("      ws: {ws}");
        }
    }

    if let (Some(testnet), false) = (&config.testnet, config.use_testnet) {
        println!("\nTestnet providers (selection: {}):\n", config.testnet_selection);
        for (index, provider) in testnet.iter().enumerate() {
            println!("  [{index}] {}", provider.http);
        }
    }

    println!(
        "\nRetry: {} attempts, {}ms initial backoff, {}ms cap",
        config.retry.max_attempts,
        config.retry.initial_backoff.as_millis(),
        config.retry.max_backoff.as_millis()
    );
    Ok(())
}

async fn cmd_probe(args: &[String]) -> Result<()> {
    let config = load(args)?;
    let mut candidate = select_from_entropy(&config.providers, config.selection)?;
    let request = GraphqlRequest::new("{ __typename }");

    println!("Probing {} provider(s)...\n", config.providers.len());

    let mut failures = 0;
    for step in 0..config.providers.len() {
        let label = if step == 0 { "active" } else { "candidate" };
        let link = HttpLink::default_for(candidate.endpoint())?;

        let start = Instant::now();
        let outcome = link.send(&request).await;
        let latency = start.elapsed();

        match outcome {
            Ok(_) => println!(
                "  [{}] {:<9} OK      {:>5}ms  {}",
                candidate.index(),
                label,
                latency.as_millis(),
                candidate.endpoint()
            ),
            Err(e) => {
                failures += 1;
                println!(
                    "  [{}] {:<9} {:<7} {:>5}ms  {}\n      {e}",
                    candidate.index(),
                    label,
                    status_label(&e),
                    latency.as_millis(),
                    candidate.endpoint()
                );
            }
        }
        candidate = candidate.next_candidate(&config.providers);
    }

    if failures == config.providers.len() {
        bail!("no provider answered");
    }
    Ok(())
}

async fn cmd_query(args: &[String]) -> Result<()> {
    let query = parse_flag(args, "--query").ok_or_else(|| anyhow!("--query is required"))?;
    let mut request = GraphqlRequest::new(query);
    if let Some(raw) = parse_flag(args, "--variables") {
        let variables: serde_json::Value =
            serde_json::from_str(&raw).context("--variables must be valid JSON")?;
        if !variables.is_object() {
            bail!("--variables must be a JSON object");
        }
        request = request.with_variables(variables);
    }

    let config = load(args)?;
    let registry = build_registry(&config, ClientOptions::from_config(&config))?;
    let client = match parse_flag(args, "--client") {
        Some(name) => registry.get(&name).ok_or_else(|| {
            anyhow!(
                "no client named '{name}' (registered: {})",
                registry.names().join(", ")
            )
        })?,
        None => registry.default_client(),
    };

    let response = client
        .query(request)
        .await
        .with_context(|| format!("query against {} failed", client.endpoint()))?;
    let data = response.data.unwrap_or_default();
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn status_label(error: &TransportError) -> String {
    match error {
        TransportError::Transport { kind, .. } => kind.to_string(),
        TransportError::Server { status, .. } | TransportError::Request { status, .. } => {
            format!("HTTP {status}")
        }
        TransportError::Graphql(_) => "graphql".into(),
        _ => "invalid".into(),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaingql_core::FailureKind;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_values_and_switches() {
        let args = args(&["--config", "explorer.json", "--testnet", "--query"]);
        assert_eq!(parse_flag(&args, "--config").as_deref(), Some("explorer.json"));
        assert_eq!(parse_flag(&args, "--query"), None);
        assert_eq!(parse_flag(&args, "--client"), None);
        assert!(has_flag(&args, "--testnet"));
        assert!(!has_flag(&args, "--variables"));
    }

    #[test]
    fn probe_status_labels() {
        let refused = TransportError::Transport {
            kind: FailureKind::ConnectionRefused,
            message: "refused".into(),
        };
        assert_eq!(status_label(&refused), "connection refused");
        let server = TransportError::Server {
            status: 503,
            body: String::new(),
        };
        assert_eq!(status_label(&server), "HTTP 503");
    }
}
