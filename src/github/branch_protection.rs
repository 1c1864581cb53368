use async_trait::async_trait;
use serde_json::value::RawValue;
use tracing::{debug, error};

use crate::github::{Github, ProtectionTransport, TransportError, TransportResponse};
use crate::repository::TargetRef;

#[async_trait]
impl ProtectionTransport for Github {
    async fn put_protection(
        &self,
        target: &TargetRef,
        payload: &RawValue,
    ) -> Result<TransportResponse, TransportError> {
        let path = target.protection_path();
        debug!("PUT {}", path);

        let transport_error = |e: octocrab::Error| {
            error!("Request for {} failed: {:?}", target, e);
            TransportError {
                target: target.to_string(),
                message: e.to_string(),
            }
        };

        let response = self
            .client
            ._put(path.as_str(), Some(payload))
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(transport_error)?;

        debug!("PUT {} answered {}", path, status);
        Ok(TransportResponse { status, body })
    }
}
