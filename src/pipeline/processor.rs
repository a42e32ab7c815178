//! Referral processing orchestrator.
//!
//! Single entry point that drives the pipeline:
//! validate → remote extraction → entity tree → raw view → normalize.
//!
//! The remote service sits behind `RemoteExtractionClient`, so the
//! orchestrator is fully testable with `MockExtractionClient`.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::ProcessorConfig;
use crate::pipeline::extraction::{
    DocumentAiClient, ExtractionError, ExtractionRequest, ProcessedDocument,
    RemoteExtractionClient,
};
use crate::pipeline::import::{mime_matches, validate_document, DocumentFormat, ValidationError};
use crate::pipeline::normalize::{normalize_document, ExtractedReferralData, Normalizer};

/// Mime type assumed when the caller does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/pdf";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while processing a referral document.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Extraction service failed: {0}")]
    Remote(#[from] ExtractionError),

    #[error("Extraction worker failed: {0}")]
    Worker(String),
}

impl ProcessingError {
    /// The caller can fix this by sending a different file.
    pub fn is_resubmittable(&self) -> bool {
        matches!(self, Self::Validation(e) if e.is_resubmittable())
    }

    /// Service-side or runtime failure; resubmitting the same file will not help.
    pub fn requires_investigation(&self) -> bool {
        !self.is_resubmittable()
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Orchestrates referral processing for one configured remote processor.
///
/// Holds no per-request state; one instance serves concurrent calls.
#[derive(Clone)]
pub struct ReferralProcessor {
    client: Arc<dyn RemoteExtractionClient + Send + Sync>,
    processor_name: String,
    normalizer: Arc<Normalizer>,
}

impl ReferralProcessor {
    pub fn new(
        client: Arc<dyn RemoteExtractionClient + Send + Sync>,
        processor_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            processor_name: processor_name.into(),
            normalizer: Arc::new(Normalizer::new()),
        }
    }

    /// Replace the default normalizer (e.g. custom marker rules).
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    pub fn processor_name(&self) -> &str {
        &self.processor_name
    }

    /// Full pipeline from raw bytes.
    ///
    /// 1. Validate size and magic number (no network on failure)
    /// 2. Send to the remote processor on a blocking worker
    /// 3. Build the entity tree and normalize it
    pub async fn process(
        &self,
        content: Vec<u8>,
        mime_type: &str,
    ) -> Result<ExtractedReferralData, ProcessingError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "process_referral",
            request_id = %request_id,
            bytes = content.len(),
            mime_type
        );

        async {
            self.check(&content, mime_type)?;

            let client = Arc::clone(&self.client);
            let processor_name = self.processor_name.clone();
            let mime = mime_type.to_string();
            let worker_span = tracing::Span::current();

            let document = tokio::task::spawn_blocking(move || {
                let _entered = worker_span.enter();
                client.process_document(&ExtractionRequest {
                    processor_name: &processor_name,
                    content: &content,
                    mime_type: &mime,
                })
            })
            .await
            .map_err(|e| ProcessingError::Worker(e.to_string()))??;

            Ok::<_, ProcessingError>(self.finish(&document))
        }
        .instrument(span)
        .await
    }

    /// Same pipeline on the calling thread.
    ///
    /// Blocks on the remote call; from async code use `process` instead.
    pub fn process_blocking(
        &self,
        content: &[u8],
        mime_type: &str,
    ) -> Result<ExtractedReferralData, ProcessingError> {
        let request_id = Uuid::new_v4();
        let _span = tracing::info_span!(
            "process_referral",
            request_id = %request_id,
            bytes = content.len(),
            mime_type
        )
        .entered();

        self.check(content, mime_type)?;

        let document = self.client.process_document(&ExtractionRequest {
            processor_name: &self.processor_name,
            content,
            mime_type,
        })?;

        Ok(self.finish(&document))
    }

    fn check(&self, content: &[u8], mime_type: &str) -> Result<DocumentFormat, ProcessingError> {
        let format = validate_document(content).inspect_err(|e| {
            tracing::info!(reason = %e, "Document rejected before extraction");
        })?;

        tracing::debug!(format = format.as_str(), "Document accepted");

        if !mime_matches(mime_type, format) {
            tracing::warn!(
                declared = mime_type,
                detected = format.mime_type(),
                "Declared mime type disagrees with file content"
            );
        }

        Ok(format)
    }

    fn finish(&self, document: &ProcessedDocument) -> ExtractedReferralData {
        let record = normalize_document(&self.normalizer, document);

        tracing::info!(
            entities = document.entities.len(),
            diagnosis_codes = record.clinical.diagnosis_codes.len(),
            confidence = ?record.confidence_score,
            "Referral normalized"
        );

        record
    }
}

/// Build a processor backed by the Document AI REST client.
pub fn build_processor(config: &ProcessorConfig) -> Result<ReferralProcessor, ExtractionError> {
    let client = DocumentAiClient::new(
        &config.api_endpoint(),
        config.access_token.clone(),
        config.timeout_secs,
    )?;

    tracing::info!(
        endpoint = client.endpoint(),
        processor = %config.processor_name(),
        "Extraction processor configured"
    );

    Ok(ReferralProcessor::new(Arc::new(client), config.processor_name()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::{Entity, MockExtractionClient};
    use crate::pipeline::normalize::{MarkerField, MarkerRule};

    const PROCESSOR: &str = "projects/p/locations/us/processors/abc";

    fn pdf_bytes() -> Vec<u8> {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.resize(512, b' ');
        bytes
    }

    fn referral() -> ProcessedDocument {
        ProcessedDocument {
            text: "REFERRAL ORDER".into(),
            entities: vec![
                Entity::group(
                    "patient",
                    vec![
                        Entity::text("name", "John Doe"),
                        Entity::text("date_of_birth", "01/15/1980"),
                    ],
                )
                .with_confidence(0.95),
                Entity::text("diagnosis", "Low back pain ICD-10: M54.5").with_confidence(0.85),
                Entity::text("order_details", "Priority: STAT"),
            ],
        }
    }

    fn processor_with(mock: Arc<MockExtractionClient>) -> ReferralProcessor {
        ReferralProcessor::new(mock, PROCESSOR)
    }

    #[tokio::test]
    async fn too_small_file_never_reaches_remote() {
        let mock = Arc::new(MockExtractionClient::new(referral()));
        let processor = processor_with(mock.clone());

        let err = processor
            .process(vec![0x25; 99], DEFAULT_MIME_TYPE)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessingError::Validation(ValidationError::TooSmall { size: 99 })
        ));
        assert!(err.is_resubmittable());
        assert!(!err.requires_investigation());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn unsupported_format_never_reaches_remote() {
        let mock = Arc::new(MockExtractionClient::new(referral()));
        let processor = processor_with(mock.clone());

        let err = processor
            .process(vec![b'x'; 4096], "text/plain")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessingError::Validation(ValidationError::UnsupportedFormat)
        ));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn remote_failure_propagates() {
        let mock = Arc::new(MockExtractionClient::failing(403));
        let processor = processor_with(mock.clone());

        let err = processor
            .process(pdf_bytes(), DEFAULT_MIME_TYPE)
            .await
            .unwrap_err();

        match &err {
            ProcessingError::Remote(ExtractionError::Service { status, .. }) => {
                assert_eq!(*status, 403)
            }
            other => panic!("expected remote service error, got {other:?}"),
        }
        assert!(err.requires_investigation());
        assert!(!err.is_resubmittable());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn empty_remote_document_yields_empty_record() {
        let mock = Arc::new(MockExtractionClient::new(ProcessedDocument::default()));
        let processor = processor_with(mock.clone());

        let record = processor.process(pdf_bytes(), DEFAULT_MIME_TYPE).await.unwrap();

        assert!(record.is_empty());
        assert_eq!(record.document_type, "referral_order");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn processes_referral_end_to_end() {
        let mock = Arc::new(MockExtractionClient::new(referral()));
        let processor = processor_with(mock.clone());

        let record = processor.process(pdf_bytes(), DEFAULT_MIME_TYPE).await.unwrap();

        assert_eq!(record.patient.first_name.as_deref(), Some("John"));
        assert_eq!(record.patient.last_name.as_deref(), Some("Doe"));
        assert_eq!(
            record.patient.date_of_birth,
            chrono::NaiveDate::from_ymd_opt(1980, 1, 15)
        );
        assert_eq!(record.clinical.diagnosis_codes, vec!["M54.5".to_string()]);
        assert_eq!(record.raw_text.as_deref(), Some("REFERRAL ORDER"));
        assert!((record.confidence_score.unwrap() - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn declared_mime_mismatch_is_not_rejected() {
        let mock = Arc::new(MockExtractionClient::new(referral()));
        let processor = processor_with(mock.clone());

        let record = processor.process(pdf_bytes(), "image/png").await;

        assert!(record.is_ok());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn custom_normalizer_is_used() {
        let mock = Arc::new(MockExtractionClient::new(referral()));
        let processor = processor_with(mock).with_normalizer(Normalizer::with_rules(vec![
            MarkerRule::literal("STAT", MarkerField::Urgency, "urgent"),
        ]));

        let record = processor.process(pdf_bytes(), DEFAULT_MIME_TYPE).await.unwrap();

        assert_eq!(record.clinical.urgency.as_deref(), Some("urgent"));
        assert_eq!(record.clinical.specialty_requested, None);
    }

    #[test]
    fn blocking_path_matches_async_path() {
        let mock = Arc::new(MockExtractionClient::new(referral()));
        let processor = processor_with(mock.clone());

        let record = processor
            .process_blocking(&pdf_bytes(), DEFAULT_MIME_TYPE)
            .unwrap();

        assert_eq!(record.patient.full_name.as_deref(), Some("John Doe"));
        assert_eq!(mock.call_count(), 1);

        let err = processor
            .process_blocking(&[0u8; 10], DEFAULT_MIME_TYPE)
            .unwrap_err();
        assert!(err.is_resubmittable());
        assert_eq!(mock.call_count(), 1);
    }

    /// Settings pointing at a local port nothing listens on.
    fn unreachable_config() -> ProcessorConfig {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        ProcessorConfig {
            project_id: "acme-health".into(),
            location: "us".into(),
            processor_id: "f00d".into(),
            access_token: Some("token".into()),
            endpoint_override: Some(endpoint),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn production_processor_lives_inside_runtime() {
        let processor = build_processor(&unreachable_config()).unwrap();

        let err = processor
            .process(pdf_bytes(), DEFAULT_MIME_TYPE)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProcessingError::Remote(ExtractionError::Connection(_))
        ));
        assert!(err.requires_investigation());
        drop(processor);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn production_processor_rejects_invalid_file_inside_runtime() {
        let processor = build_processor(&unreachable_config()).unwrap();

        let err = processor
            .process(vec![0u8; 10], DEFAULT_MIME_TYPE)
            .await
            .unwrap_err();

        assert!(err.is_resubmittable());
        drop(processor);
    }

    #[test]
    fn build_processor_uses_configured_resource_path() {
        let config = ProcessorConfig {
            project_id: "acme-health".into(),
            location: "eu".into(),
            processor_id: "f00d".into(),
            access_token: Some("token".into()),
            endpoint_override: None,
            timeout_secs: 30,
        };

        let processor = build_processor(&config).unwrap();

        assert_eq!(
            processor.processor_name(),
            "projects/acme-health/locations/eu/processors/f00d"
        );
    }
}
