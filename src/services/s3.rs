//! Object storage facade.

use crate::client::{ClientFactory, Service, ServiceClient};
use crate::config::{AwsConfig, Region};
use crate::error::{service_error, AwsError, ResponseError};
use crate::signing::uri_encode_path;
use crate::transport::HttpResponse;
use crate::xml;
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, instrument};
use url::Url;

/// Facade over S3 buckets and objects.
#[derive(Debug)]
pub struct S3Service {
    client: ServiceClient,
}

impl S3Service {
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
            client: factory.from_snapshot(Service::S3, &config.to_snapshot())?,
        })
    }

    /// Underlying service client.
    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    /// Store an object. String bodies are stored as UTF-8.
    #[instrument(skip(self, body))]
    pub async fn put_object(
        &self,
        body: impl Into<Bytes>,
        bucket: &str,
        key: &str,
    ) -> Result<bool, AwsError> {
        let body: Bytes = body.into();
        let url = self.object_url(bucket, Some(key), &[])?;

        let mut headers = HashMap::new();
        headers.insert("content-length".to_string(), body.len().to_string());

        self.execute("PUT", &url, headers, Some(body)).await?;
        debug!("Object stored");
        Ok(true)
    }

    /// Read an object's bytes.
    #[instrument(skip(self))]
    pub async fn get_file_content(&self, bucket: &str, key: &str) -> Result<Bytes, AwsError> {
        let url = self.object_url(bucket, Some(key), &[])?;
        let response = self.execute("GET", &url, HashMap::new(), None).await?;
        Ok(response.body)
    }

    /// Read an object as UTF-8 text.
    pub async fn get_str_file_content(&self, bucket: &str, key: &str) -> Result<String, AwsError> {
        let bytes = self.get_file_content(bucket, key).await?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            AwsError::Response(ResponseError::InvalidUtf8 {
                context: format!("s3://{}/{}", bucket, key),
                message: e.to_string(),
            })
        })
    }

    /// Server-side copy. The destination bucket defaults to the source bucket.
    #[instrument(skip(self))]
    pub async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_key: &str,
        dst_bucket: Option<&str>,
    ) -> Result<bool, AwsError> {
        let dst_bucket = dst_bucket.unwrap_or(src_bucket);
        let url = self.object_url(dst_bucket, Some(dst_key), &[])?;

        let mut headers = HashMap::new();
        headers.insert(
            "x-amz-copy-source".to_string(),
            format!("/{}/{}", src_bucket, uri_encode_path(src_key)),
        );

        let response = self.execute("PUT", &url, headers, None).await?;

        // A copy can fail after S3 has already sent 200.
        if xml::is_error_document(&response.body) {
            return Err(self.error_from(&response));
        }
        Ok(true)
    }

    /// Copy, then delete the source.
    ///
    /// Not atomic: if the delete fails the copy is left in place and the
    /// delete error is returned.
    #[instrument(skip(self))]
    pub async fn move_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_key: &str,
        dst_bucket: Option<&str>,
    ) -> Result<bool, AwsError> {
        self.copy_object(src_bucket, src_key, dst_key, dst_bucket)
            .await?;
        self.delete_object(src_bucket, src_key).await
    }

    /// Delete an object.
    #[instrument(skip(self))]
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<bool, AwsError> {
        let url = self.object_url(bucket, Some(key), &[])?;
        self.execute("DELETE", &url, HashMap::new(), None).await?;
        Ok(true)
    }

    /// Create a bucket in the client's region.
    #[instrument(skip(self))]
    pub async fn create_bucket(&self, bucket: &str) -> Result<bool, AwsError> {
        let url = self.object_url(bucket, None, &[])?;

        let mut headers = HashMap::new();
        let body = if self.client.region() == Region::UsEast1.as_str() {
            None
        } else {
            let xml = xml::build_create_bucket_xml(self.client.region());
            headers.insert("content-type".to_string(), "application/xml".to_string());
            headers.insert("content-length".to_string(), xml.len().to_string());
            Some(Bytes::from(xml))
        };

        self.execute("PUT", &url, headers, body).await?;
        Ok(true)
    }

    /// Delete an empty bucket.
    #[instrument(skip(self))]
    pub async fn delete_bucket(&self, bucket: &str) -> Result<bool, AwsError> {
        let url = self.object_url(bucket, None, &[])?;
        self.execute("DELETE", &url, HashMap::new(), None).await?;
        Ok(true)
    }

    /// True if the bucket exists and is reachable. Any error counts as absent.
    #[instrument(skip(self))]
    pub async fn bucket_exists(&self, bucket: &str) -> bool {
        let result = match self.object_url(bucket, None, &[]) {
            Ok(url) => self.execute("HEAD", &url, HashMap::new(), None).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Bucket check failed");
                false
            }
        }
    }

    /// True if the object exists. Any error counts as absent.
    #[instrument(skip(self))]
    pub async fn object_exists(&self, bucket: &str, key: &str) -> bool {
        let result = match self.object_url(bucket, Some(key), &[]) {
            Ok(url) => self.execute("HEAD", &url, HashMap::new(), None).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(_) => true,
            Err(e) => {
                debug!(error = %e, "Object check failed");
                false
            }
        }
    }

    /// Keys on the first `ListObjectsV2` page only (at most 1000).
    ///
    /// Use [`S3Service::list_all_object_keys`] for buckets that may be larger.
    #[instrument(skip(self))]
    pub async fn list_object_keys(&self, bucket: &str) -> Result<Vec<String>, AwsError> {
        Ok(self.list_page(bucket, None).await?.keys)
    }

    /// Every key in the bucket, following continuation tokens.
    #[instrument(skip(self))]
    pub async fn list_all_object_keys(&self, bucket: &str) -> Result<Vec<String>, AwsError> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.list_page(bucket, token.as_deref()).await?;
            keys.extend(page.keys);

            match page.next_continuation_token {
                Some(next) if page.is_truncated => token = Some(next),
                _ => break,
            }
        }

        debug!(count = keys.len(), "Listed bucket");
        Ok(keys)
    }

    async fn list_page(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<xml::ListObjectsPage, AwsError> {
        let mut query = vec![("list-type", "2")];
        if let Some(token) = continuation_token {
            query.push(("continuation-token", token));
        }

        let url = self.object_url(bucket, None, &query)?;
        let response = self.execute("GET", &url, HashMap::new(), None).await?;
        let body = String::from_utf8_lossy(&response.body);
        xml::parse_list_objects_v2(&body)
    }

    /// URL for a bucket or object.
    ///
    /// Path-style when the endpoint is overridden or the bucket name contains
    /// dots; virtual-hosted otherwise.
    fn object_url(
        &self,
        bucket: &str,
        key: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<Url, AwsError> {
        if bucket.is_empty() {
            return Err(AwsError::validation("bucket name must not be empty"));
        }
        if key == Some("") {
            return Err(AwsError::validation("object key must not be empty"));
        }
        if is_dot_segment(bucket) {
            return Err(AwsError::validation(format!(
                "invalid bucket name '{}'",
                bucket
            )));
        }
        if let Some(key) = key.filter(|k| has_dot_segment(k)) {
            return Err(AwsError::validation(format!(
                "object key '{}' has a '.' or '..' segment and cannot be addressed by URL",
                key
            )));
        }

        let encoded_key = key.map(uri_encode_path).unwrap_or_default();

        if self.client.uses_path_style() || bucket.contains('.') {
            let path = match key {
                Some(_) => format!("{}/{}", bucket, encoded_key),
                None => bucket.to_string(),
            };
            return ServiceClient::build_url(self.client.endpoint(), &path, query);
        }

        let mut base = self.client.endpoint().clone();
        let host = format!("{}.{}", bucket, base.host_str().unwrap_or_default());
        base.set_host(Some(&host))
            .map_err(|e| AwsError::validation(format!("invalid bucket name '{}': {}", bucket, e)))?;
        ServiceClient::build_url(&base, &encoded_key, query)
    }

    async fn execute(
        &self,
        method: &str,
        url: &Url,
        headers: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Result<HttpResponse, AwsError> {
        let response = self.client.send_to(method, url, headers, body).await?;
        if !response.is_success() {
            return Err(self.error_from(&response));
        }
        Ok(response)
    }

    fn error_from(&self, response: &HttpResponse) -> AwsError {
        let parsed = if response.body.is_empty() {
            None
        } else {
            xml::parse_error_response(&String::from_utf8_lossy(&response.body)).ok()
        };

        let (code, message, body_request_id) = match parsed {
            Some(e) if !e.code.is_empty() => (e.code, e.message, e.request_id),
            _ => (
                format!("Http{}", response.status),
                format!("HTTP {} with no error document", response.status),
                None,
            ),
        };

        service_error(
            Service::S3.signing_name(),
            response.status,
            &code,
            message,
            response.request_id().map(String::from).or(body_request_id),
        )
    }
}

fn is_dot_segment(segment: &str) -> bool {
    segment == "." || segment == ".."
}

/// True when a key has a `.` or `..` segment.
///
/// The URL parser resolves these (and their `%2E` spellings) before the
/// request is signed, so the request would address a different key.
fn has_dot_segment(key: &str) -> bool {
    key.split('/').any(is_dot_segment)
}
