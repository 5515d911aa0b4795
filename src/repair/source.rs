// Copyright (c) 2025 - Cowboy AI, Inc.
//! Source-of-Truth Seam
//!
//! The executor only knows this trait. The NetBox client implements it
//! over HTTP; [`RecordingSource`] implements it in memory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use super::request::{InterfaceUpdate, RepairRequest};
use crate::domain::ObjectId;
use crate::errors::TransportError;

/// Something that accepts interface changes and answers with an HTTP status
///
/// Non-2xx statuses are returned, not raised: the executor decides what
/// they mean.
#[async_trait]
pub trait SourceOfTruth: Send + Sync {
    async fn update_interface(&self, update: &InterfaceUpdate) -> Result<u16, TransportError>;

    async fn delete_interface(&self, id: ObjectId) -> Result<u16, TransportError>;

    /// Dispatch one request
    async fn execute(&self, request: &RepairRequest) -> Result<u16, TransportError> {
        match request {
            RepairRequest::Update(update) => self.update_interface(update).await,
            RepairRequest::Delete { id } => self.delete_interface(*id).await,
        }
    }
}

/// In-memory source of truth - records requests and answers with canned statuses
///
/// Useful for dry runs and tests. Statuses default to 200; per-object
/// scripts are consumed one answer per call, the last answer repeating.
#[derive(Debug, Default)]
pub struct RecordingSource {
    requests: Mutex<Vec<RepairRequest>>,
    scripts: Mutex<HashMap<ObjectId, Vec<Result<u16, TransportError>>>>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls for `id` with `answers`, in order
    pub fn script(self, id: ObjectId, answers: Vec<Result<u16, TransportError>>) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(id, answers);
        }
        self
    }

    /// Every request seen so far, in arrival order
    pub fn requests(&self) -> Vec<RepairRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn answer(&self, request: RepairRequest) -> Result<u16, TransportError> {
        let id = request.object_id();
        info!("[RecordingSource] {}", request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let Ok(mut scripts) = self.scripts.lock() else {
            return Err(TransportError::Unavailable("poisoned script".to_string()));
        };
        match scripts.get_mut(&id) {
            Some(answers) if answers.len() > 1 => answers.remove(0),
            Some(answers) => answers.first().cloned().unwrap_or(Ok(200)),
            None => Ok(200),
        }
    }
}

#[async_trait]
impl SourceOfTruth for RecordingSource {
    async fn update_interface(&self, update: &InterfaceUpdate) -> Result<u16, TransportError> {
        self.answer(RepairRequest::Update(update.clone()))
    }

    async fn delete_interface(&self, id: ObjectId) -> Result<u16, TransportError> {
        self.answer(RepairRequest::Delete { id })
    }
}
