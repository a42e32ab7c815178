use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::types::{Entity, ExtractionRequest, ProcessedDocument, RemoteExtractionClient};
use super::ExtractionError;

/// Document AI REST client (`projects.locations.processors.process`).
///
/// Holds settings only. The blocking HTTP client is built and dropped inside
/// each call, so this value can be created and dropped on an async runtime
/// thread; `process_document` itself must run where blocking is allowed.
#[derive(Debug, Clone)]
pub struct DocumentAiClient {
    endpoint: String,
    access_token: Option<String>,
    timeout_secs: u64,
}

impl DocumentAiClient {
    /// `endpoint` is the regional API root, e.g. `https://us-documentai.googleapis.com`.
    pub fn new(
        endpoint: &str,
        access_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ExtractionError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ExtractionError::Configuration(format!(
                "Endpoint must be an http(s) URL: {endpoint}"
            )));
        }
        if timeout_secs == 0 {
            return Err(ExtractionError::Configuration(
                "Request timeout must be at least one second".into(),
            ));
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            access_token,
            timeout_secs,
        })
    }

    fn http_client(&self) -> Result<reqwest::blocking::Client, ExtractionError> {
        reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Http(e.to_string()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn process_url(&self, processor_name: &str) -> Result<String, ExtractionError> {
        validate_processor_name(processor_name)?;
        Ok(format!("{}/v1/{}:process", self.endpoint, processor_name))
    }
}

/// Reject resource paths that are not `projects/*/locations/*/processors/*`.
pub fn validate_processor_name(name: &str) -> Result<(), ExtractionError> {
    let parts: Vec<&str> = name.split('/').collect();
    let well_formed = parts.len() == 6
        && parts[0] == "projects"
        && parts[2] == "locations"
        && parts[4] == "processors"
        && [parts[1], parts[3], parts[5]]
            .iter()
            .all(|p| !p.trim().is_empty());

    if well_formed {
        Ok(())
    } else {
        Err(ExtractionError::Configuration(format!(
            "Invalid processor name: {name}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequestBody<'a> {
    raw_document: RawDocumentBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocumentBody<'a> {
    content: String,
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct ProcessResponseBody {
    #[serde(default)]
    document: Option<WireDocument>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    #[serde(default)]
    text: String,
    #[serde(default)]
    entities: Vec<WireEntity>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireEntity {
    #[serde(rename = "type", default)]
    entity_type: String,
    #[serde(default)]
    mention_text: String,
    #[serde(default)]
    normalized_value: Option<WireNormalizedValue>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    properties: Vec<WireEntity>,
}

#[derive(Deserialize, Default)]
struct WireNormalizedValue {
    #[serde(default)]
    text: Option<String>,
}

impl From<WireEntity> for Entity {
    fn from(wire: WireEntity) -> Self {
        Entity {
            entity_type: wire.entity_type,
            mention_text: wire.mention_text,
            normalized_text: wire.normalized_value.and_then(|n| n.text),
            confidence: wire.confidence,
            properties: wire.properties.into_iter().map(Entity::from).collect(),
        }
    }
}

/// Decode a `:process` response body into a `ProcessedDocument`.
/// Unknown fields are ignored; a missing `document` yields an empty one.
pub fn parse_process_response(body: &str) -> Result<ProcessedDocument, ExtractionError> {
    let parsed: ProcessResponseBody = serde_json::from_str(body)
        .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;
    let document = parsed.document.unwrap_or_default();

    Ok(ProcessedDocument {
        text: document.text,
        entities: document.entities.into_iter().map(Entity::from).collect(),
    })
}

impl RemoteExtractionClient for DocumentAiClient {
    fn process_document(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<ProcessedDocument, ExtractionError> {
        let url = self.process_url(request.processor_name)?;
        let token = self
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ExtractionError::MissingCredentials)?;

        let body = ProcessRequestBody {
            raw_document: RawDocumentBody {
                content: base64::engine::general_purpose::STANDARD.encode(request.content),
                mime_type: request.mime_type,
            },
        };

        tracing::debug!(
            processor = request.processor_name,
            bytes = request.content.len(),
            mime_type = request.mime_type,
            "Sending document to extraction processor"
        );

        let client = self.http_client()?;
        let response = client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ExtractionError::Connection(self.endpoint.clone())
                } else if e.is_timeout() {
                    ExtractionError::Timeout(self.timeout_secs)
                } else {
                    ExtractionError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let err = ExtractionError::Service {
                status: status.as_u16(),
                body,
            };
            tracing::warn!(
                status = status.as_u16(),
                auth_or_quota = err.is_auth_or_quota(),
                "Extraction processor returned an error status"
            );
            return Err(err);
        }

        let text = response
            .text()
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        parse_process_response(&text)
    }
}
