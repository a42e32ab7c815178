use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// A single field or field group reported by the extraction processor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: String,
    pub mention_text: String,
    pub normalized_text: Option<String>,
    pub confidence: Option<f32>,
    #[serde(default)]
    pub properties: Vec<Entity>,
}

impl Entity {
    pub fn text(entity_type: &str, mention_text: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            mention_text: mention_text.to_string(),
            ..Default::default()
        }
    }

    pub fn group(entity_type: &str, properties: Vec<Entity>) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            properties,
            ..Default::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_normalized(mut self, normalized: &str) -> Self {
        self.normalized_text = Some(normalized.to_string());
        self
    }

    /// Normalized value when the processor produced a non-empty one,
    /// otherwise the raw mention.
    pub fn value_text(&self) -> &str {
        match self.normalized_text.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => &self.mention_text,
        }
    }
}

/// Processor output for one document: full text plus top-level entities
/// in the order the processor reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub text: String,
    pub entities: Vec<Entity>,
}

/// Request handed to the remote processor.
#[derive(Debug, Clone)]
pub struct ExtractionRequest<'a> {
    /// `projects/{project}/locations/{location}/processors/{processor}`
    pub processor_name: &'a str,
    pub content: &'a [u8],
    pub mime_type: &'a str,
}

/// Remote document-understanding service abstraction (allows mocking).
///
/// Implementations are synchronous; the processor moves calls onto a
/// blocking worker.
pub trait RemoteExtractionClient {
    fn process_document(
        &self,
        request: &ExtractionRequest<'_>,
    ) -> Result<ProcessedDocument, ExtractionError>;
}

/// Mock client for testing: returns a configured document or error.
pub struct MockExtractionClient {
    document: ProcessedDocument,
    failure_status: Option<u16>,
    calls: std::sync::atomic::AtomicUsize,
}

impl MockExtractionClient {
    pub fn new(document: ProcessedDocument) -> Self {
        Self {
            document,
            failure_status: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Fail every call with a service error carrying `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            document: ProcessedDocument::default(),
            failure_status: Some(status),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl RemoteExtractionClient for MockExtractionClient {
    fn process_document(
        &self,
        _request: &ExtractionRequest<'_>,
    ) -> Result<ProcessedDocument, ExtractionError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match self.failure_status {
            Some(status) => Err(ExtractionError::Service {
                status,
                body: "mock failure".into(),
            }),
            None => Ok(self.document.clone()),
        }
    }
}
