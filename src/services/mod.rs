//! Service facades.
//!
//! Each facade is built from an [`crate::AwsConfig`] and owns one
//! [`crate::ServiceClient`].

pub mod dynamodb;
pub mod lambda;
pub mod parameter_store;
pub mod s3;
pub mod secrets_manager;
pub mod sqs;

pub use dynamodb::DynamoDbService;
pub use lambda::LambdaService;
pub use parameter_store::ParameterStoreService;
pub use s3::S3Service;
pub use secrets_manager::SecretsManagerService;
pub use sqs::SqsService;
