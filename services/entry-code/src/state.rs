use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;

use crate::config::EntryCodeConfig;
use crate::infra::dynamo::DynamoEntryCodeRepository;
use crate::infra::iot::IotUnlockPublisher;
use crate::infra::ssm::SsmSecretPort;

/// SDK clients and names shared by every invocation of a warm container.
#[derive(Clone)]
pub struct AppState {
    pub dynamo: aws_sdk_dynamodb::Client,
    pub ssm: aws_sdk_ssm::Client,
    pub iot: aws_sdk_iotdataplane::Client,
    pub table_name: String,
    pub secret_parameter_name: String,
    pub mqtt_topic: String,
}

impl AppState {
    /// Build the SDK clients from the ambient AWS environment.
    pub async fn connect(config: &EntryCodeConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts));
        if let Some(timeout_ms) = config.call_timeout_ms {
            loader = loader.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_millis(timeout_ms))
                    .build(),
            );
        }
        let sdk_config = loader.load().await;

        let iot_config = aws_sdk_iotdataplane::config::Builder::from(&sdk_config)
            .endpoint_url(config.mqtt_endpoint.clone())
            .build();

        Self {
            dynamo: aws_sdk_dynamodb::Client::new(&sdk_config),
            ssm: aws_sdk_ssm::Client::new(&sdk_config),
            iot: aws_sdk_iotdataplane::Client::from_conf(iot_config),
            table_name: config.table_name.clone(),
            secret_parameter_name: config.secret_parameter_name.clone(),
            mqtt_topic: config.mqtt_topic.clone(),
        }
    }

    pub fn code_repo(&self) -> DynamoEntryCodeRepository {
        DynamoEntryCodeRepository {
            client: self.dynamo.clone(),
            table_name: self.table_name.clone(),
        }
    }

    pub fn secret_port(&self) -> SsmSecretPort {
        SsmSecretPort {
            client: self.ssm.clone(),
        }
    }

    pub fn unlock_publisher(&self) -> IotUnlockPublisher {
        IotUnlockPublisher {
            client: self.iot.clone(),
        }
    }
}
