use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stored entry code, one per (entry code, contact address) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    pub entry_code: u64,
    pub contact_address: String,
    pub active: bool,
    pub one_time_use: bool,
    /// `None` means the code never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CodeRecord {
    /// Active and not yet expired at `now`. Expiry is inclusive of `now`.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|exp| exp >= now)
    }
}

/// Per-invocation input extracted from the contact-flow event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub entry_code: u64,
    pub contact_address: String,
    pub received_at: DateTime<Utc>,
}

/// How a valid code was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeUse {
    /// Multi-use code; the record was left untouched.
    Reusable,
    /// Single-use code; this invocation scheduled its expiry.
    Consumed { expires_at: DateTime<Utc> },
    /// Single-use code whose expiry another invocation already scheduled.
    AlreadyPending,
}

/// Result of the conditional expiry write on a single-use code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryUpdate {
    Applied,
    /// The store rejected the write's condition; carries the stored expiry when returned.
    ConditionFailed { current: Option<DateTime<Utc>> },
}

/// Message published to the buzzer device.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UnlockPayload {
    pub secret: String,
    #[serde(rename = "customerAddress")]
    pub customer_address: String,
    #[serde(rename = "entryCode")]
    pub entry_code: u64,
    pub event: &'static str,
}

impl std::fmt::Debug for UnlockPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockPayload")
            .field("secret", &"<redacted>")
            .field("customer_address", &self.customer_address)
            .field("entry_code", &self.entry_code)
            .field("event", &self.event)
            .finish()
    }
}

impl UnlockPayload {
    pub fn new(secret: String, ctx: &RequestContext) -> Self {
        Self {
            secret,
            customer_address: ctx.contact_address.clone(),
            entry_code: ctx.entry_code,
            event: UNLOCK_EVENT,
        }
    }
}

/// Delay in seconds before a consumed single-use code stops validating.
pub const GRACE_WINDOW_SECS: i64 = 300;

/// Event tag the device firmware matches on.
pub const UNLOCK_EVENT: &str = "unlock";

/// MQTT QoS for unlock messages (at most once).
pub const UNLOCK_QOS: i32 = 0;
