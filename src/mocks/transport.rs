//! Mock HTTP transport for testing.

use crate::error::{AwsError, NetworkError};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Canned HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Bytes,
}

impl MockResponse {
    /// Response with a status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// 200 with an empty body.
    pub fn ok() -> Self {
        Self::new(200, Bytes::new())
    }

    /// 200 with a body.
    pub fn ok_with_body(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    /// 204 No Content.
    pub fn no_content() -> Self {
        Self::new(204, Bytes::new())
    }

    /// 200 with a JSON body, as the JSON-protocol services answer.
    pub fn json(value: serde_json::Value) -> Self {
        Self::ok_with_body(value.to_string())
            .with_header("content-type", "application/x-amz-json-1.0")
    }

    /// JSON-protocol error with `__type` and `message`.
    pub fn json_error(status: u16, error_type: &str, message: &str) -> Self {
        Self::new(
            status,
            serde_json::json!({ "__type": error_type, "message": message }).to_string(),
        )
    }

    /// Error response with a raw body.
    pub fn error(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, body)
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Builder for [`MockTransport`].
#[derive(Default)]
pub struct MockResponseBuilder {
    responses: Vec<MockResponse>,
}

impl MockResponseBuilder {
    /// Queue a response.
    pub fn respond(mut self, response: MockResponse) -> Self {
        self.responses.push(response);
        self
    }

    /// Build the transport.
    pub fn build(self) -> MockTransport {
        MockTransport::with_responses(self.responses)
    }
}

/// HTTP transport that records requests and replays queued responses.
///
/// Responses are returned in FIFO order. When the queue is empty the default
/// response is used, or a connection error if there is none.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    default_response: Option<MockResponse>,
}

impl MockTransport {
    /// Transport with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport with queued responses.
    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    /// Transport that answers every request with the same response.
    pub fn with_default(response: MockResponse) -> Self {
        Self {
            default_response: Some(response),
            ..Self::default()
        }
    }

    /// Builder.
    pub fn builder() -> MockResponseBuilder {
        MockResponseBuilder::default()
    }

    /// Queue another response.
    pub fn queue_response(&self, response: MockResponse) {
        self.responses.lock().push_back(response);
    }

    /// All recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests sent.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Recorded requests whose `x-amz-target` ends with `.{operation}`.
    pub fn requests_for(&self, operation: &str) -> Vec<HttpRequest> {
        let suffix = format!(".{}", operation);
        self.requests
            .lock()
            .iter()
            .filter(|r| {
                r.get_header("x-amz-target")
                    .map_or(false, |t| t.ends_with(&suffix))
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AwsError> {
        self.requests.lock().push(request);

        let next = self
            .responses
            .lock()
            .pop_front()
            .or_else(|| self.default_response.clone());

        match next {
            Some(mock) => Ok(HttpResponse {
                status: mock.status,
                headers: mock.headers,
                body: mock.body,
            }),
            None => Err(AwsError::Network(NetworkError::ConnectionFailed {
                message: "No mock response available".to_string(),
            })),
        }
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued_responses", &self.responses.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}
