use anyhow::Context as _;
use aws_sdk_iotdataplane::Client;
use aws_sdk_iotdataplane::primitives::Blob;

use crate::domain::repository::UnlockPublisher;
use crate::domain::types::{UNLOCK_QOS, UnlockPayload};
use crate::error::EntryCodeServiceError;

/// Publishes unlock messages through the IoT Core data-plane endpoint.
#[derive(Clone)]
pub struct IotUnlockPublisher {
    pub client: Client,
}

impl UnlockPublisher for IotUnlockPublisher {
    async fn publish(
        &self,
        topic: &str,
        payload: &UnlockPayload,
    ) -> Result<(), EntryCodeServiceError> {
        let body = encode_payload(payload)?;
        self.client
            .publish()
            .topic(topic)
            .qos(UNLOCK_QOS)
            .payload(Blob::new(body))
            .send()
            .await
            .with_context(|| format!("publish to {topic}"))
            .map_err(EntryCodeServiceError::Publish)?;
        Ok(())
    }
}

fn encode_payload(payload: &UnlockPayload) -> Result<Vec<u8>, EntryCodeServiceError> {
    serde_json::to_vec(payload)
        .context("serialize unlock payload")
        .map_err(EntryCodeServiceError::Publish)
}
