//! AWS Service Facade
//!
//! Thin, opinionated wrappers over six AWS services: S3, DynamoDB, SQS,
//! SSM Parameter Store, Secrets Manager and Lambda.
//!
//! # Features
//!
//! - **One configuration**: region, endpoint override and credentials set once
//!   on [`AwsConfig`] and shared by every facade
//! - **AWS Signature V4**: hand-rolled signing over a pooled `reqwest` client
//! - **Plain items**: DynamoDB items go in and come out as plain JSON
//! - **Emulator friendly**: endpoint overrides switch S3 to path-style
//!   addressing for LocalStack and MinIO
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use aws_facade::{AwsConfig, Region, S3Service};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), aws_facade::AwsError> {
//!     let mut config = AwsConfig::new();
//!     config.set_region(Region::EuWest1)?;
//!
//!     let s3 = S3Service::new(&config)?;
//!     s3.put_object("Hello World!", "my-bucket", "hello.txt").await?;
//!
//!     let text = s3.get_str_file_content("my-bucket", "hello.txt").await?;
//!     assert_eq!(text, "Hello World!");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod mocks;
pub mod services;
pub mod signing;
pub mod transport;
pub mod types;
pub mod xml;

// Re-export main types at crate root
pub use client::{ClientFactory, Service, ServiceClient};
pub use config::{AwsConfig, ConfigSnapshot, Region};
pub use credentials::{
    AwsCredentials, ChainCredentialsProvider, CredentialsProvider, EnvCredentialsProvider,
    ProfileCredentialsProvider, StaticCredentialsProvider,
};
pub use error::{
    AwsError, CredentialsError, ErrorKind, NetworkError, ResponseError, ServiceError,
    SigningError,
};
pub use services::{
    DynamoDbService, LambdaService, ParameterStoreService, S3Service, SecretsManagerService,
    SqsService,
};
pub use signing::{AwsSigner, AwsSignerV4};
pub use transport::{HttpRequest, HttpResponse, HttpTransport};
pub use types::{
    AttributeDefinition, AttributeValue, FilterType, GetItemOutput, InvocationType, InvokeOutput,
    Item, KeySchemaElement, KeyType, MessageBody, ParameterType, ProvisionedThroughput,
    ScalarAttributeType, ScanOutput, SecretListEntry, SendMessageOutput,
};
