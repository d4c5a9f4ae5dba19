#![recursion_limit = "256"]

use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::info;

use buzzer_core::tracing::init_tracing;
use buzzer_entry_code::config::EntryCodeConfig;
use buzzer_entry_code::handlers::connect::{ConnectEvent, handle_connect_event};
use buzzer_entry_code::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = EntryCodeConfig::from_env()?;
    let state = Arc::new(AppState::connect(&config).await);

    info!(
        table_name = %config.table_name,
        topic = %config.mqtt_topic,
        max_attempts = config.max_attempts,
        call_timeout_ms = ?config.call_timeout_ms,
        "entry-code function initialised"
    );

    run(service_fn(move |event: LambdaEvent<ConnectEvent>| {
        let state = Arc::clone(&state);
        async move { handle_connect_event(&state, event).await }
    }))
    .await
}
