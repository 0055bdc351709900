use clap::Parser;
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod core;
mod error;
mod providers;
mod source;
mod store;

use crate::config::Config;
use crate::core::provider::DnsProvider;
use crate::core::reconciler;
use crate::core::record::RecordRef;
use crate::error::Error;
use crate::providers::cloudflare::{error::map_error, CloudflareProvider};

/// Points a hostname's A records at the IPs that passed the external
/// speed test, by reconciling the provider's records against the
/// measured-good set.
#[derive(Parser)]
#[command(name = "dns-reconcile")]
struct Args {
    /// Results file written by the speed-test tool
    #[arg(long, default_value = "ip_filtered.csv")]
    input: PathBuf,

    /// Local cache of provider record ids
    #[arg(long, default_value = "dns_records.csv")]
    store: PathBuf,

    /// Proceed even when no IP qualified. This deletes every managed record.
    #[arg(long)]
    allow_empty: bool,

    /// Compare the local store against the provider's records before the pass
    #[arg(long)]
    verify: bool,
}

/// An empty desired set is ambiguous between "no good IPs found" and
/// "delete everything"; reconciling it would delete every managed record,
/// so it needs the explicit flag.
fn check_desired(desired: &BTreeSet<IpAddr>, allow_empty: bool) -> Result<(), Error> {
    if desired.is_empty() && !allow_empty {
        return Err(Error::EmptyDesiredSet);
    }
    Ok(())
}

async fn verify_store(provider: &dyn DnsProvider, existing: &[RecordRef]) {
    match provider.list_records().await {
        Ok(remote) => {
            for rec in existing {
                if !remote.iter().any(|r| r.id == rec.id) {
                    warn!(id = %rec.id, "Store lists a record the provider no longer has");
                }
            }
            for rec in &remote {
                if !existing.iter().any(|r| r.id == rec.id) {
                    warn!(id = %rec.id, ip = %rec.ip, "Provider has a record missing from the store");
                }
            }
        }
        Err(e) => warn!("Consistency check failed: {e}"),
    }
}

/// Runs one reconciliation pass and returns the number of failed operations.
/// The store is persisted with the best-known state even under partial
/// failure.
async fn run(args: &Args) -> Result<usize, Error> {
    let config = Config::from_env()?;

    let desired = source::read_valid_ips(&args.input)?;
    check_desired(&desired, args.allow_empty)?;

    // A store that cannot be read must abort before any remote change.
    let existing = store::load(&args.store)?;

    let provider = CloudflareProvider::new(config).map_err(map_error)?;
    info!(
        provider = provider.name(),
        desired = desired.len(),
        known = existing.len(),
        "Starting reconciliation pass"
    );

    if args.verify {
        verify_store(&provider, &existing).await;
    }

    let outcome = reconciler::reconcile(&provider, &desired, &existing).await;
    store::save(&args.store, &outcome.records)?;

    for failure in &outcome.failures {
        error!(?failure.op, "{}", failure.error);
    }
    info!(
        records = outcome.records.len(),
        failures = outcome.failures.len(),
        "Pass complete; store persisted"
    );
    Ok(outcome.failures.len())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!("{failed} operation(s) failed; the store reflects the best-known state");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
