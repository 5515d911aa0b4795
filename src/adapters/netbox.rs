// Copyright (c) 2025 - Cowboy AI, Inc.

//! NetBox DCIM Client
//!
//! Implements [`SourceOfTruth`] against the NetBox REST API, so the repair
//! executor can apply a karte to a live NetBox:
//!
//! ```text
//! RepairRequest::Update(body) = PATCH  /api/dcim/interfaces/{id}/
//! RepairRequest::Delete { id } = DELETE /api/dcim/interfaces/{id}/
//! health_check()               = GET    /api/status/
//! ```
//!
//! Non-2xx answers are handed back as statuses; only failures to reach
//! NetBox at all become [`TransportError`]s.
//!
//! # Example
//!
//! ```rust,no_run
//! use fleet_doctor::adapters::{NetBoxClient, NetBoxConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NetBoxConfig {
//!         base_url: "https://netbox.example.net".to_string(),
//!         api_token: "your-token-here".to_string(),
//!         timeout_secs: 30,
//!     };
//!
//!     let client = NetBoxClient::new(config)?;
//!     client.health_check().await?;
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

pub use crate::config::NetBoxConfig;
use crate::domain::ObjectId;
use crate::errors::{DoctorError, DoctorResult, TransportError};
use crate::repair::{InterfaceUpdate, SourceOfTruth};

/// HTTP client for one NetBox instance
pub struct NetBoxClient {
    config: NetBoxConfig,
    client: Client,
}

impl NetBoxClient {
    /// Create a client with token authentication and a request timeout
    pub fn new(config: NetBoxConfig) -> DoctorResult<Self> {
        info!("Connecting to NetBox at {}", config.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Token {}", config.api_token)).map_err(|e| {
                DoctorError::Configuration(format!("Invalid API token: {}", e))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                DoctorError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &NetBoxConfig {
        &self.config
    }

    /// Verify NetBox answers before any change is sent
    pub async fn health_check(&self) -> Result<(), TransportError> {
        let url = self.url("/api/status/");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status().is_success() {
            debug!("NetBox health check passed");
            Ok(())
        } else {
            Err(TransportError::Unavailable(format!(
                "NetBox returned status: {}",
                response.status()
            )))
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn interface_url(&self, id: ObjectId) -> String {
        self.url(&format!("/api/dcim/interfaces/{}/", id.value()))
    }

    fn transport_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.config.timeout_secs.saturating_mul(1000))
        } else if err.is_connect() || err.is_request() {
            TransportError::Unavailable(format!("NetBox API error: {}", err))
        } else {
            TransportError::InvalidRequest(format!("NetBox API error: {}", err))
        }
    }
}

#[async_trait]
impl SourceOfTruth for NetBoxClient {
    async fn update_interface(&self, update: &InterfaceUpdate) -> Result<u16, TransportError> {
        let url = self.interface_url(update.id);
        let response = self
            .client
            .patch(&url)
            .json(update)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        debug!("PATCH {} -> {}", url, status);
        Ok(status)
    }

    async fn delete_interface(&self, id: ObjectId) -> Result<u16, TransportError> {
        let url = self.interface_url(id);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        debug!("DELETE {} -> {}", url, status);
        Ok(status)
    }
}
