use anyhow::{Context, Result};
use serde::Serialize;

use crate::{models::CreateOutboxEntity, store::OutboxStatus};

/// Builds a pending outbox row. The caller writes it in the same transaction as the change it announces.
pub fn event<T: Serialize>(event_type: &str, payload: &T) -> Result<CreateOutboxEntity> {
    let payload = serde_json::to_string(payload).context("Failed to serialize outbox payload")?;

    Ok(CreateOutboxEntity {
        event_type: event_type.to_string(),
        payload,
        status: OutboxStatus::Pending.as_str().to_string(),
    })
}
