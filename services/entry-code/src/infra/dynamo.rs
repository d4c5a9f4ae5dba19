use std::collections::HashMap;

use anyhow::{Context as _, anyhow};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValuesOnConditionCheckFailure};
use chrono::{DateTime, Utc};

use crate::domain::repository::EntryCodeRepository;
use crate::domain::types::{CodeRecord, ExpiryUpdate};
use crate::error::EntryCodeServiceError;

// ── Table schema ──────────────────────────────────────────────────────────────

/// Partition key (number).
pub const ATTR_ENTRY_CODE: &str = "entryCode";
/// Sort key (string).
pub const ATTR_CONTACT_ADDRESS: &str = "contactAddress";
pub const ATTR_ACTIVE: &str = "active";
pub const ATTR_ONE_TIME_USE: &str = "oneTimeUse";
/// Expiry in epoch milliseconds; absent means the code never expires.
pub const ATTR_EXPIRY_TIME: &str = "expiryTime-TTL";

const KEY_CONDITION: &str = "#entryCode = :entryCode and #contactAddress = :contactAddress";
const ELIGIBLE_FILTER: &str =
    "#active = :true and (#expiryTime >= :now or attribute_not_exists(#expiryTime))";
const SCHEDULE_EXPIRY_CONDITION: &str = "#oneTimeUse = :true and \
     (#expiryTime >= :newExpiryTime or attribute_not_exists(#expiryTime))";

// ── EntryCode repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DynamoEntryCodeRepository {
    pub client: Client,
    pub table_name: String,
}

impl std::fmt::Debug for DynamoEntryCodeRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoEntryCodeRepository")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl EntryCodeRepository for DynamoEntryCodeRepository {
    async fn find_eligible(
        &self,
        entry_code: u64,
        contact_address: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CodeRecord>, EntryCodeServiceError> {
        let response = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression(KEY_CONDITION)
            .filter_expression(ELIGIBLE_FILTER)
            .expression_attribute_names("#entryCode", ATTR_ENTRY_CODE)
            .expression_attribute_names("#contactAddress", ATTR_CONTACT_ADDRESS)
            .expression_attribute_names("#active", ATTR_ACTIVE)
            .expression_attribute_names("#expiryTime", ATTR_EXPIRY_TIME)
            .expression_attribute_values(":entryCode", AttributeValue::N(entry_code.to_string()))
            .expression_attribute_values(
                ":contactAddress",
                AttributeValue::S(contact_address.to_owned()),
            )
            .expression_attribute_values(":true", AttributeValue::Bool(true))
            .expression_attribute_values(":now", millis(now))
            .send()
            .await
            .context("query entry codes")?;

        // Full primary key in the key condition: at most one item.
        response
            .items()
            .first()
            .map(record_from_item)
            .transpose()
            .map_err(Into::into)
    }

    async fn schedule_expiry(
        &self,
        entry_code: u64,
        contact_address: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ExpiryUpdate, EntryCodeServiceError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_ENTRY_CODE, AttributeValue::N(entry_code.to_string()))
            .key(ATTR_CONTACT_ADDRESS, AttributeValue::S(contact_address.to_owned()))
            .update_expression("SET #expiryTime = :newExpiryTime")
            .condition_expression(SCHEDULE_EXPIRY_CONDITION)
            .expression_attribute_names("#expiryTime", ATTR_EXPIRY_TIME)
            .expression_attribute_names("#oneTimeUse", ATTR_ONE_TIME_USE)
            .expression_attribute_values(":true", AttributeValue::Bool(true))
            .expression_attribute_values(":newExpiryTime", millis(expires_at))
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .send()
            .await;

        match result {
            Ok(_) => Ok(ExpiryUpdate::Applied),
            Err(err) => {
                if let Some(UpdateItemError::ConditionalCheckFailedException(ex)) =
                    err.as_service_error()
                {
                    return Ok(ExpiryUpdate::ConditionFailed {
                        current: ex.item().and_then(|item| expiry_from_item(item).ok().flatten()),
                    });
                }
                Err(anyhow::Error::new(err)
                    .context("schedule entry code expiry")
                    .into())
            }
        }
    }
}

fn millis(at: DateTime<Utc>) -> AttributeValue {
    AttributeValue::N(at.timestamp_millis().to_string())
}

fn record_from_item(item: &HashMap<String, AttributeValue>) -> anyhow::Result<CodeRecord> {
    let entry_code = item
        .get(ATTR_ENTRY_CODE)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| anyhow!("entry code item without numeric {ATTR_ENTRY_CODE}"))?;
    let contact_address = item
        .get(ATTR_CONTACT_ADDRESS)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| anyhow!("entry code item without {ATTR_CONTACT_ADDRESS}"))?;
    Ok(CodeRecord {
        entry_code,
        contact_address,
        active: bool_attr(item, ATTR_ACTIVE),
        one_time_use: bool_attr(item, ATTR_ONE_TIME_USE),
        expires_at: expiry_from_item(item)?,
    })
}

/// Missing or non-boolean flags read as `false`.
fn bool_attr(item: &HashMap<String, AttributeValue>, name: &str) -> bool {
    item.get(name)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .unwrap_or(false)
}

fn expiry_from_item(
    item: &HashMap<String, AttributeValue>,
) -> anyhow::Result<Option<DateTime<Utc>>> {
    let Some(value) = item.get(ATTR_EXPIRY_TIME) else {
        return Ok(None);
    };
    let raw = value
        .as_n()
        .map_err(|_| anyhow!("{ATTR_EXPIRY_TIME} is not a number"))?;
    // Stored numbers may carry a fractional part.
    let ms = raw
        .parse::<f64>()
        .with_context(|| format!("{ATTR_EXPIRY_TIME} {raw:?} does not parse"))?;
    DateTime::from_timestamp_millis(ms as i64)
        .map(Some)
        .ok_or_else(|| anyhow!("{ATTR_EXPIRY_TIME} {raw} out of range"))
}
