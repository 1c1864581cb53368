//! In-memory transport that records every request.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use serde_json::value::RawValue;

use crate::github::{ProtectionTransport, TransportError, TransportResponse};
use crate::repository::TargetRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub path: String,
    pub body: String,
}

/// Answers 200 for every branch unless told otherwise.
#[derive(Default)]
pub struct RecordingTransport {
    script: HashMap<String, Result<TransportResponse, TransportError>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request for `branch` never completes.
    pub fn failing(mut self, branch: &str) -> Self {
        self.script.insert(
            branch.to_string(),
            Err(TransportError {
                target: branch.to_string(),
                message: "connection reset by peer".to_string(),
            }),
        );
        self
    }

    /// The request for `branch` completes with the given status and body.
    pub fn responding(mut self, branch: &str, status: u16, body: &str) -> Self {
        self.script.insert(
            branch.to_string(),
            Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
        );
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProtectionTransport for RecordingTransport {
    async fn put_protection(
        &self,
        target: &TargetRef,
        payload: &RawValue,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            path: target.protection_path(),
            body: payload.get().to_string(),
        });

        self.script
            .get(&target.branch)
            .cloned()
            .unwrap_or_else(|| {
                Ok(TransportResponse {
                    status: 200,
                    body: "{}".to_string(),
                })
            })
    }
}
