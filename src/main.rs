use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use txguard::client::{BearerToken, EtherscanClient, PolicyEventClient};
use txguard::config::{Command, Config};
use txguard::domain::{Classification, EventKind, Network};
use txguard::monitor::{Monitor, MonitorSummary};
use txguard::observability::init_tracing;
use txguard::payload::{expect_kind, load_event};
use txguard::report::{self, PREFIX};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %config.endpoint,
        "Starting txguard"
    );

    let result = run(&config).await;
    if let Err(ref e) = result {
        error!(error = %e, "Invocation failed");
    }
    result
}

async fn run(config: &Config) -> anyhow::Result<()> {
    // Missing and blank tokens are both rejected here
    let token = BearerToken::new(config.token.clone().unwrap_or_default())?;
    let client = PolicyEventClient::new(&config.endpoint, token, config.request_timeout())?;

    match &config.command {
        Command::Check { payload } => submit_payload(&client, payload, EventKind::Broadcasted).await,
        Command::Simulate { payload } => {
            submit_payload(&client, payload, EventKind::Prebroadcast).await
        }
        Command::Monitor {
            address,
            lookback_hours,
            etherscan_url,
            etherscan_api_key,
            network,
        } => {
            let source =
                EtherscanClient::new(etherscan_url, etherscan_api_key, config.request_timeout())?;
            let monitor = Monitor::new(Arc::new(source), Arc::new(client), Network::new(network));

            println!(
                "{} Scanning {} for the last {} hours...",
                PREFIX,
                address.to_lowercase(),
                lookback_hours
            );

            let summary = monitor
                .run(address, chrono::Duration::hours(i64::from(*lookback_hours)))
                .await?;
            print_summary(&summary);
            Ok(())
        }
    }
}

/// Load one event from disk, submit it and print the decision.
async fn submit_payload(
    client: &PolicyEventClient,
    path: &Path,
    expected: EventKind,
) -> anyhow::Result<()> {
    let event = load_event(path)?;
    expect_kind(&event, expected)?;

    let decision = client.evaluate(&event).await?;

    if let Classification::Unrecognized(action) = decision.classify() {
        warn!(action = %action, "Unrecognized policy action");
    }

    for line in report::render(&decision) {
        println!("{}", line);
    }
    Ok(())
}

fn print_summary(summary: &MonitorSummary) {
    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(decision) => println!(
                "{} {} -> {} (event {})",
                PREFIX,
                outcome.hash,
                decision.action_to_take.as_str().to_uppercase(),
                decision.event_id_or_na()
            ),
            Err(e) => println!("{} {} -> failed: {}", PREFIX, outcome.hash, e),
        }
    }

    println!(
        "{} {} transactions: {} automated, {} manual review, {} unrecognized, {} failed",
        PREFIX,
        summary.scanned,
        summary.automated,
        summary.manual_review,
        summary.unrecognized,
        summary.failed
    );
}
