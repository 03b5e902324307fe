//! Parameter Store facade.

use crate::client::{ClientFactory, Service, ServiceClient};
use crate::config::AwsConfig;
use crate::error::AwsError;
use crate::types::ParameterType;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Most names `GetParameters` accepts per call.
pub const MAX_NAMES_PER_CALL: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetParametersOutput {
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(default)]
    invalid_parameters: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Parameter {
    name: String,
    value: String,
}

/// Split names into request-sized chunks, preserving order.
pub(crate) fn chunk_names<'a, S: AsRef<str>>(names: &'a [S]) -> Vec<Vec<&'a str>> {
    names
        .chunks(MAX_NAMES_PER_CALL)
        .map(|chunk| chunk.iter().map(AsRef::as_ref).collect())
        .collect()
}

/// Facade over SSM Parameter Store.
#[derive(Debug)]
pub struct ParameterStoreService {
    client: ServiceClient,
}

impl ParameterStoreService {
    /// Create the facade from a configured [`AwsConfig`].
    pub fn new(config: &AwsConfig) -> Result<Self, AwsError> {
        Self::with_factory(config, &ClientFactory::new())
    }

    /// Create the facade with a custom client factory.
    pub fn with_factory(config: &AwsConfig, factory: &ClientFactory) -> Result<Self, AwsError> {
        if !config.is_configured() {
            return Err(AwsError::MissingConfiguration);
        }
        Ok(Self {
            client: factory.from_snapshot(Service::Ssm, &config.to_snapshot())?,
        })
    }

    /// Underlying service client.
    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Fetch decrypted values for any number of parameter names.
    ///
    /// Names are sent in chunks of [`MAX_NAMES_PER_CALL`]. Unknown names are
    /// missing from the result.
    #[instrument(skip(self, names), fields(count = names.len()))]
    pub async fn get_parameters_values_from_list<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<HashMap<String, String>, AwsError> {
        let mut values = HashMap::with_capacity(names.len());

        for chunk in chunk_names(names) {
            let response = self
                .client
                .json_call(
                    "GetParameters",
                    &json!({
                        "Names": chunk,
                        "WithDecryption": true,
                    }),
                )
                .await?;
            let output: GetParametersOutput = serde_json::from_value(response)?;

            if !output.invalid_parameters.is_empty() {
                warn!(names = ?output.invalid_parameters, "Parameters not found");
            }

            values.extend(output.parameters.into_iter().map(|p| (p.name, p.value)));
        }

        debug!(found = values.len(), "Fetched parameters");
        Ok(values)
    }

    /// Create a parameter. Fails if it already exists.
    #[instrument(skip(self, value))]
    pub async fn create_parameter(
        &self,
        name: &str,
        value: &str,
        parameter_type: ParameterType,
    ) -> Result<bool, AwsError> {
        self.put_parameter(name, value, parameter_type, false).await
    }

    /// Create a parameter, replacing any existing value.
    #[instrument(skip(self, value))]
    pub async fn create_parameter_with_overwrite(
        &self,
        name: &str,
        value: &str,
        parameter_type: ParameterType,
    ) -> Result<bool, AwsError> {
        self.put_parameter(name, value, parameter_type, true).await
    }

    /// Delete a parameter.
    #[instrument(skip(self))]
    pub async fn delete_parameter(&self, name: &str) -> Result<bool, AwsError> {
        self.client
            .json_call("DeleteParameter", &json!({ "Name": name }))
            .await?;
        Ok(true)
    }

    async fn put_parameter(
        &self,
        name: &str,
        value: &str,
        parameter_type: ParameterType,
        overwrite: bool,
    ) -> Result<bool, AwsError> {
        let mut input = json!({
            "Name": name,
            "Value": value,
            "Type": parameter_type.as_str(),
        });
        if overwrite {
            input["Overwrite"] = json!(true);
        }

        let response = self.client.json_call("PutParameter", &input).await?;
        debug!(version = ?response.get("Version"), "Parameter stored");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_chunk_names_exact_split() {
        let names: Vec<String> = (0..23).map(|i| format!("/app/p{}", i)).collect();
        let chunks = chunk_names(&names);
        let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 3]);
    }

    #[test]
    fn test_chunk_names_empty() {
        let names: Vec<&str> = Vec::new();
        assert!(chunk_names(&names).is_empty());
    }

    proptest! {
        #[test]
        fn chunking_preserves_names_and_bounds_size(count in 0usize..100) {
            let names: Vec<String> = (0..count).map(|i| format!("p{}", i)).collect();
            let chunks = chunk_names(&names);

            prop_assert_eq!(chunks.len(), (count + MAX_NAMES_PER_CALL - 1) / MAX_NAMES_PER_CALL);
            prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= MAX_NAMES_PER_CALL));

            let flattened: Vec<&str> = chunks.into_iter().flatten().collect();
            let expected: Vec<&str> = names.iter().map(String::as_str).collect();
            prop_assert_eq!(flattened, expected);
        }
    }
}
