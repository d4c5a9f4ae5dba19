use tracing::{error, info};

use crate::domain::repository::{EntryCodeRepository, SecretPort, UnlockPublisher};
use crate::domain::types::{CodeUse, RequestContext, UnlockPayload};
use crate::error::EntryCodeServiceError;
use crate::usecase::validate::ValidateEntryCodeUseCase;

pub struct UnlockInput {
    pub ctx: RequestContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockOutput {
    pub code_use: CodeUse,
}

pub struct UnlockUseCase<R, S, P>
where
    R: EntryCodeRepository,
    S: SecretPort,
    P: UnlockPublisher,
{
    pub codes: R,
    pub secrets: S,
    pub publisher: P,
    pub secret_name: String,
    pub topic: String,
}

impl<R, S, P> UnlockUseCase<R, S, P>
where
    R: EntryCodeRepository,
    S: SecretPort,
    P: UnlockPublisher,
{
    pub async fn execute(&self, input: UnlockInput) -> Result<UnlockOutput, EntryCodeServiceError> {
        let ctx = input.ctx;
        let validator = ValidateEntryCodeUseCase { codes: &self.codes };

        // 1. Secret lookup and validation have no data dependency; run both
        let (secret, validation) = tokio::join!(
            self.secrets.resolve(&self.secret_name),
            validator.execute(&ctx)
        );

        // 2. Without the secret no unlock message can be built; fail the invocation
        let secret = match secret {
            Ok(secret) => secret,
            Err(e) => {
                if let Err(EntryCodeServiceError::Validation(cause)) = &validation {
                    error!(
                        error = %format_args!("{cause:#}"),
                        kind = "VALIDATION",
                        "entry code validation failed alongside secret resolution"
                    );
                }
                return Err(e);
            }
        };
        let code_use = validation?;

        // 3. Publish the unlock message → 408 on failure
        let payload = UnlockPayload::new(secret, &ctx);
        self.publisher.publish(&self.topic, &payload).await?;

        info!(
            entry_code = ctx.entry_code,
            topic = %self.topic,
            "unlock message published"
        );
        Ok(UnlockOutput { code_use })
    }
}
