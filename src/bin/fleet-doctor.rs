// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fleet Doctor
//!
//! Diagnoses a NetBox snapshot against the switch policy and repairs the
//! interfaces that can be repaired automatically.
//!
//! - Snapshot → Diagnose → Karte → Repair → NetBox API
//!
//! Run with: cargo run --bin fleet-doctor --features netbox
//!
//! Prerequisites:
//! 1. A snapshot document (via FLEET_DOCTOR_SNAPSHOT, default: snapshot.json)
//! 2. NetBox API accessible (via NETBOX_URL environment variable)
//! 3. NetBox API token set (via NETBOX_API_TOKEN environment variable)
//!
//! Set FLEET_DOCTOR_DIAGNOSE_ONLY=1 to stop after the report.

use anyhow::{Context, Result};
use fleet_doctor::{
    adapters::NetBoxClient, Category, Diagnose, DoctorConfig, Repair, RepairStatus, Snapshot,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting fleet-doctor");

    let config = DoctorConfig::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded:");
    info!("  - Snapshot: {}", config.snapshot_path.display());
    info!("  - NetBox URL: {}", config.netbox.base_url);
    info!("  - Managed VLAN group: {}", config.policy.managed_vlan_group);
    info!("  - Concurrency: {}", config.repair.concurrency);

    let snapshot = Snapshot::load(&config.snapshot_path).with_context(|| {
        format!(
            "Failed to load snapshot from {}",
            config.snapshot_path.display()
        )
    })?;
    info!(
        "Snapshot loaded: {} interfaces",
        snapshot.interface_count()
    );

    let karte = Diagnose::new(&snapshot, &config.policy).run().summarize();
    if karte.is_empty() {
        info!("Fleet is healthy, nothing to report");
        return Ok(());
    }
    info!("Karte {}:\n{}", karte.run_id, karte);

    if config.diagnose_only {
        info!("Diagnose-only run, no repairs sent");
        return Ok(());
    }

    let (repairable, remarks) = karte.partition();
    if remarks.count(Category::Warn) > 0 {
        warn!(
            "{} entries need operator attention and will not be repaired",
            remarks.count(Category::Warn)
        );
    }
    if repairable.is_empty() {
        info!("Nothing to repair automatically");
        return Ok(());
    }

    let client = NetBoxClient::new(config.netbox.clone()).context("Failed to create NetBox client")?;
    client
        .health_check()
        .await
        .context("NetBox is not reachable")?;

    let outcomes = Repair::new(client, config.repair.clone())
        .by_karte(&repairable)
        .await;

    let failed: Vec<_> = outcomes
        .iter()
        .filter(|o| matches!(o.status, RepairStatus::Failed { .. }))
        .collect();
    for outcome in &failed {
        error!(
            "{} {}: {}",
            outcome.hostname,
            outcome.interface_name.as_deref().unwrap_or("-"),
            outcome.status
        );
    }

    if failed.is_empty() {
        info!("All {} repairs applied", outcomes.len());
        Ok(())
    } else {
        anyhow::bail!("{} of {} repairs failed", failed.len(), outcomes.len())
    }
}
