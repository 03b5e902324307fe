//! XML handling for S3 responses and request bodies.

use crate::error::{AwsError, ResponseError};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Error document returned by S3.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3ErrorResponse {
    /// Error code, e.g. `NoSuchKey`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Request ID echoed in the body.
    pub request_id: Option<String>,
}

/// One page of a `ListObjectsV2` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsPage {
    /// Object keys on this page.
    pub keys: Vec<String>,
    /// True when more keys follow.
    pub is_truncated: bool,
    /// Token for the next page.
    pub next_continuation_token: Option<String>,
}

fn xml_error(e: impl std::fmt::Display) -> AwsError {
    AwsError::Response(ResponseError::XmlParseError {
        message: e.to_string(),
    })
}

/// True when `body` is an S3 `<Error>` document.
///
/// `CopyObject` can answer 200 and still carry one of these.
pub fn is_error_document(body: &[u8]) -> bool {
    let mut reader = Reader::from_reader(body);
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => return e.name().as_ref() == b"Error",
            Ok(Event::Eof) | Err(_) => return false,
            _ => {}
        }
        buf.clear();
    }
}

/// Parse an S3 error document.
pub fn parse_error_response(xml: &str) -> Result<S3ErrorResponse, AwsError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut output = S3ErrorResponse::default();
    let mut current_element = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current_element = String::from_utf8_lossy(e.name().as_ref()).to_string();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(xml_error)?.to_string();
                match current_element.as_str() {
                    "Code" => output.code = text,
                    "Message" => output.message = text,
                    "RequestId" => output.request_id = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current_element.clear(),
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(output)
}

/// Parse the keys and continuation state of a `ListObjectsV2` page.
///
/// Text is not trimmed: keys may begin or end with whitespace, or be nothing
/// but whitespace. Whitespace between elements is ignored.
pub fn parse_list_objects_v2(xml: &str) -> Result<ListObjectsPage, AwsError> {
    let mut reader = Reader::from_str(xml);

    let mut page = ListObjectsPage::default();
    let mut in_contents = false;
    let mut current_element = String::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "Contents" {
                    in_contents = true;
                }
                current_element = name;
                text.clear();
            }
            Ok(Event::Text(e)) => {
                if !current_element.is_empty() {
                    text.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match (in_contents, name.as_ref()) {
                    (true, b"Key") => page.keys.push(std::mem::take(&mut text)),
                    (true, b"Contents") => in_contents = false,
                    (false, b"IsTruncated") => page.is_truncated = text.trim() == "true",
                    (false, b"NextContinuationToken") => {
                        page.next_continuation_token = Some(text.trim().to_string())
                    }
                    _ => {}
                }
                current_element.clear();
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(page)
}

/// Escape text for inclusion in an XML element.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// `CreateBucket` body pinning the bucket to a region.
pub fn build_create_bucket_xml(region: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<CreateBucketConfiguration xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
    <LocationConstraint>{}</LocationConstraint>
</CreateBucketConfiguration>"#,
        escape_xml(region)
    )
}
