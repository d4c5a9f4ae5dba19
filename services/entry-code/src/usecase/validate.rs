use chrono::Duration;
use tracing::{debug, info};

use crate::domain::repository::EntryCodeRepository;
use crate::domain::types::{CodeUse, ExpiryUpdate, GRACE_WINDOW_SECS, RequestContext};
use crate::error::EntryCodeServiceError;

pub struct ValidateEntryCodeUseCase<R: EntryCodeRepository> {
    pub codes: R,
}

impl<R: EntryCodeRepository> ValidateEntryCodeUseCase<R> {
    /// Accept or reject the code in `ctx`, consuming it when it is single-use.
    ///
    /// Only a missing eligible record yields [`EntryCodeServiceError::InvalidCode`].
    /// Losing the race to consume a single-use code still counts as accepted.
    pub async fn execute(&self, ctx: &RequestContext) -> Result<CodeUse, EntryCodeServiceError> {
        debug!(
            entry_code = ctx.entry_code,
            contact_address = %ctx.contact_address,
            "validating entry code"
        );

        // 1. Active, unexpired record for the pair → 410 if none
        let record = self
            .codes
            .find_eligible(ctx.entry_code, &ctx.contact_address, ctx.received_at)
            .await?
            .ok_or(EntryCodeServiceError::InvalidCode)?;

        // 2. Multi-use codes are accepted as-is
        if !record.one_time_use {
            return Ok(CodeUse::Reusable);
        }

        // 3. Single-use: push expiry to the end of the grace window
        let expires_at = ctx.received_at + Duration::seconds(GRACE_WINDOW_SECS);
        match self
            .codes
            .schedule_expiry(ctx.entry_code, &ctx.contact_address, expires_at)
            .await?
        {
            ExpiryUpdate::Applied => {
                info!(
                    entry_code = ctx.entry_code,
                    expires_at = %expires_at,
                    "single-use entry code consumed"
                );
                Ok(CodeUse::Consumed { expires_at })
            }
            ExpiryUpdate::ConditionFailed { current } => {
                info!(
                    entry_code = ctx.entry_code,
                    pending_expiry = ?current,
                    "code expiration already pending"
                );
                Ok(CodeUse::AlreadyPending)
            }
        }
    }
}
