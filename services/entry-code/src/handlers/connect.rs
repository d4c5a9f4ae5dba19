use chrono::{DateTime, Utc};
use lambda_runtime::LambdaEvent;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span};

use crate::domain::repository::{EntryCodeRepository, SecretPort, UnlockPublisher};
use crate::domain::types::RequestContext;
use crate::error::EntryCodeServiceError;
use crate::state::AppState;
use crate::usecase::unlock::{UnlockInput, UnlockUseCase};

// ── Inbound contact-flow event ────────────────────────────────────────────────

/// Amazon Connect contact-flow invocation payload. Only the fields this
/// function reads are modelled; everything else is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConnectEvent {
    pub details: ConnectDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConnectDetails {
    pub contact_data: ContactData,
    pub parameters: ConnectParameters,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ContactData {
    pub customer_endpoint: Option<CustomerEndpoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomerEndpoint {
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConnectParameters {
    pub entry_code: Option<String>,
}

impl ConnectEvent {
    /// Extract the request context. The entry code must be a base-10 unsigned
    /// integer (surrounding whitespace allowed) and the address non-empty.
    pub fn into_context(
        self,
        received_at: DateTime<Utc>,
    ) -> Result<RequestContext, EntryCodeServiceError> {
        let entry_code = self
            .details
            .parameters
            .entry_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or(EntryCodeServiceError::MalformedEvent("missing entry code"))?
            .parse::<u64>()
            .map_err(|_| EntryCodeServiceError::MalformedEvent("entry code is not numeric"))?;
        let contact_address = self
            .details
            .contact_data
            .customer_endpoint
            .and_then(|endpoint| endpoint.address)
            .filter(|address| !address.trim().is_empty())
            .ok_or(EntryCodeServiceError::MalformedEvent("missing contact address"))?;
        Ok(RequestContext {
            entry_code,
            contact_address,
            received_at,
        })
    }
}

// ── Outbound result ───────────────────────────────────────────────────────────

/// Result returned to the contact flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectResponse {
    pub status: u16,
    #[serde(rename = "Message", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl ConnectResponse {
    pub fn ok() -> Self {
        Self {
            status: 200,
            message: None,
            error_code: None,
        }
    }

    pub fn failure(message: &str, error_code: &'static str) -> Self {
        Self {
            status: 400,
            message: Some(message.to_owned()),
            error_code: Some(error_code),
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Run one invocation against the given use case.
///
/// Business failures become a 400 result; only a fatal error (secret
/// resolution) is returned as `Err`.
pub async fn respond<R, S, P>(
    usecase: &UnlockUseCase<R, S, P>,
    event: ConnectEvent,
    received_at: DateTime<Utc>,
) -> Result<ConnectResponse, EntryCodeServiceError>
where
    R: EntryCodeRepository,
    S: SecretPort,
    P: UnlockPublisher,
{
    let ctx = match event.into_context(received_at) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.into_response()),
    };
    let span = info_span!(
        "entry_code",
        entry_code = ctx.entry_code,
        contact_address = %ctx.contact_address
    );
    async move {
        match usecase.execute(UnlockInput { ctx }).await {
            Ok(_) => Ok(ConnectResponse::ok()),
            Err(e) if e.is_fatal() => {
                tracing::error!(error = ?e, kind = e.kind(), "invocation failed");
                Err(e)
            }
            Err(e) => Ok(e.into_response()),
        }
    }
    .instrument(span)
    .await
}

/// Lambda entry point for Amazon Connect invocations.
pub async fn handle_connect_event(
    state: &AppState,
    event: LambdaEvent<ConnectEvent>,
) -> Result<ConnectResponse, lambda_runtime::Error> {
    let (payload, context) = event.into_parts();
    let span = info_span!("invocation", request_id = %context.request_id);
    async move {
        debug!(?payload, "received contact-flow event");
        let usecase = UnlockUseCase {
            codes: state.code_repo(),
            secrets: state.secret_port(),
            publisher: state.unlock_publisher(),
            secret_name: state.secret_parameter_name.clone(),
            topic: state.mqtt_topic.clone(),
        };
        respond(&usecase, payload, Utc::now())
            .await
            .map_err(lambda_runtime::Error::from)
    }
    .instrument(span)
    .await
}
