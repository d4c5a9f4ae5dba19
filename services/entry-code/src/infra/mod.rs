pub mod dynamo;
pub mod iot;
pub mod ssm;
