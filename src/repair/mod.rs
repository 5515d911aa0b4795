// Copyright (c) 2025 - Cowboy AI, Inc.
//! Repair Executor
//!
//! Turns a [`Karte`] into calls against a [`SourceOfTruth`].
//!
//! ```text
//! Karte ──► RepairRequest::from_assessment (pure)
//!              │
//!              ▼
//!        buffered stream (bounded concurrency, order preserved)
//!              │
//!              ▼
//!        timeout + retry with exponential backoff
//!              │
//!              ▼
//!        Vec<RepairOutcome>, one per entry
//! ```
//!
//! A failing entry never blocks or rolls back the others. Transport errors,
//! timeouts, 5xx and 429 are retried; any other non-2xx status is final.

mod request;
mod source;

pub use request::{InterfaceUpdate, RepairRequest};
pub use source::{RecordingSource, SourceOfTruth};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::errors::TransportError;
use crate::karte::{Assessment, Karte};

/// Executor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Calls in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, doubled for each further one
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Upper bound on any single delay
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RepairConfig {
    /// Delay before retry number `retry` (0 for the first retry)
    pub fn backoff(&self, retry: u32) -> Duration {
        let delay = self
            .base_backoff_ms
            .saturating_mul(2u64.saturating_pow(retry))
            .min(self.max_backoff_ms);
        Duration::from_millis(delay)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Final state of one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairStatus {
    /// 2xx from the source of truth
    Applied(u16),
    /// Gave up; `status` is the last HTTP status if any was received
    Failed { status: Option<u16>, message: String },
    /// Nothing to apply for this entry
    Skipped,
}

impl RepairStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied(status) => write!(f, "applied ({})", status),
            Self::Failed {
                status: Some(status),
                message,
            } => write!(f, "failed ({}): {}", status, message),
            Self::Failed { status: None, message } => write!(f, "failed: {}", message),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Result for one karte entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairOutcome {
    pub hostname: String,
    pub interface_name: Option<String>,
    pub request: Option<RepairRequest>,
    pub status: RepairStatus,
    /// Calls made, including retries
    pub attempts: u32,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn is_retryable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Applies karte entries through a source of truth
pub struct Repair<S> {
    source: S,
    config: RepairConfig,
}

impl<S: SourceOfTruth> Repair<S> {
    pub fn new(source: S, config: RepairConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Apply every entry, returning one outcome per entry in karte order
    pub async fn by_karte(&self, karte: &Karte) -> Vec<RepairOutcome> {
        info!(
            "Repairing {} entries of karte {} ({} in flight)",
            karte.len(),
            karte.run_id,
            self.config.concurrency
        );

        let outcomes: Vec<RepairOutcome> = stream::iter(karte.iter())
            .map(|assessment| self.repair_one(assessment))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let applied = outcomes.iter().filter(|o| o.status.is_success()).count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o.status, RepairStatus::Failed { .. }))
            .count();
        info!(
            "Repair finished: {} applied, {} failed, {} skipped",
            applied,
            failed,
            outcomes.len() - applied - failed
        );

        outcomes
    }

    async fn repair_one(&self, assessment: &Assessment) -> RepairOutcome {
        let Some(request) = RepairRequest::from_assessment(assessment) else {
            return RepairOutcome {
                hostname: assessment.hostname.clone(),
                interface_name: assessment.interface_name.clone(),
                request: None,
                status: RepairStatus::Skipped,
                attempts: 0,
            };
        };

        let (status, attempts) = self.call_with_retry(&request).await;
        let target = format!(
            "{} {}",
            assessment.hostname,
            assessment.interface_name.as_deref().unwrap_or("-")
        );
        match &status {
            RepairStatus::Applied(_) => info!("{}: {} {}", target, request, status),
            _ => error!("{}: {} {}", target, request, status),
        }

        RepairOutcome {
            hostname: assessment.hostname.clone(),
            interface_name: assessment.interface_name.clone(),
            request: Some(request),
            status,
            attempts,
        }
    }

    async fn call_with_retry(&self, request: &RepairRequest) -> (RepairStatus, u32) {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let timeout = self.config.timeout();
            let result = match tokio::time::timeout(timeout, self.source.execute(request)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
            };

            let (retryable, status) = match result {
                Ok(code) if is_success(code) => return (RepairStatus::Applied(code), attempt),
                Ok(code) => (
                    is_retryable_status(code),
                    RepairStatus::Failed {
                        status: Some(code),
                        message: format!("source of truth answered {}", code),
                    },
                ),
                Err(e) => (
                    e.is_retryable(),
                    RepairStatus::Failed {
                        status: None,
                        message: e.to_string(),
                    },
                ),
            };

            let retry = attempt - 1;
            if !retryable || retry >= self.config.max_retries {
                return (status, attempt);
            }

            let delay = self.config.backoff(retry);
            warn!(
                "{} {} (attempt {}), retrying in {:?}",
                request, status, attempt, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InterfaceState, ObjectId};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    fn config() -> RepairConfig {
        RepairConfig {
            concurrency: 2,
            timeout_secs: 5,
            max_retries: 2,
            base_backoff_ms: 10,
            max_backoff_ms: 100,
        }
    }

    fn change(id: u64) -> Assessment {
        let current = InterfaceState::new(ObjectId::new(id), format!("ge-0/0/{}", id));
        let mut desired = current.clone();
        desired.is_enabled = true;
        Assessment::interface_change("minami3", &current, desired, Vec::new(), Vec::new())
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let config = config();
        assert_eq!(config.backoff(0), Duration::from_millis(10));
        assert_eq!(config.backoff(2), Duration::from_millis(40));
        assert_eq!(config.backoff(10), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcomes_follow_karte_order() {
        let current = InterfaceState::new(ObjectId::new(9), "ge-0/0/9");
        let karte = Karte::new(vec![
            change(1),
            Assessment::interface_warning("minami3", &current, Vec::new(), Vec::new()),
            change(2),
        ]);

        let repair = Repair::new(RecordingSource::new(), config());
        let outcomes = repair.by_karte(&karte).await;

        let statuses: Vec<RepairStatus> = outcomes.iter().map(|o| o.status.clone()).collect();
        assert_eq!(
            statuses,
            vec![
                RepairStatus::Applied(200),
                RepairStatus::Skipped,
                RepairStatus::Applied(200)
            ]
        );
        assert_eq!(repair.source().requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_errors_are_retried() {
        let source =
            RecordingSource::new().script(ObjectId::new(1), vec![Ok(503), Ok(502), Ok(200)]);
        let repair = Repair::new(source, config());

        let outcomes = repair.by_karte(&Karte::new(vec![change(1)])).await;
        assert_eq!(outcomes[0].status, RepairStatus::Applied(200));
        assert_eq!(outcomes[0].attempts, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_errors_are_final() {
        let source = RecordingSource::new().script(ObjectId::new(1), vec![Ok(400), Ok(200)]);
        let repair = Repair::new(source, config());

        let outcomes = repair.by_karte(&Karte::new(vec![change(1), change(2)])).await;
        assert_eq!(outcomes[0].attempts, 1);
        assert!(matches!(
            outcomes[0].status,
            RepairStatus::Failed { status: Some(400), .. }
        ));
        // the failure does not hold back the next entry
        assert_eq!(outcomes[1].status, RepairStatus::Applied(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_bounded() {
        let source = RecordingSource::new().script(
            ObjectId::new(1),
            vec![Err(TransportError::Unavailable("connection refused".to_string()))],
        );
        let repair = Repair::new(source, config());

        let outcomes = repair.by_karte(&Karte::new(vec![change(1)])).await;
        assert_eq!(outcomes[0].attempts, 3);
        assert!(matches!(
            outcomes[0].status,
            RepairStatus::Failed { status: None, .. }
        ));
    }

    struct Stalled;

    #[async_trait]
    impl SourceOfTruth for Stalled {
        async fn update_interface(&self, _update: &InterfaceUpdate) -> Result<u16, TransportError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(200)
        }

        async fn delete_interface(&self, _id: ObjectId) -> Result<u16, TransportError> {
            Ok(204)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_are_reported_per_entry() {
        let mut config = config();
        config.max_retries = 0;
        let repair = Repair::new(Stalled, config);

        let outcomes = repair.by_karte(&Karte::new(vec![change(1)])).await;
        assert_eq!(
            outcomes[0].status,
            RepairStatus::Failed {
                status: None,
                message: TransportError::Timeout(5000).to_string(),
            }
        );
    }
}
