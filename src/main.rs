use std::path::PathBuf;

use anyhow::{bail, Context};

use referral_intake::{build_processor, config, init_tracing, ProcessorConfig, DEFAULT_MIME_TYPE};

/// Process one referral document and print the normalized record as JSON.
///
/// Usage: `referral-intake <file> [mime-type]`
///
/// # Environment Variables
/// - `DOCUMENT_AI_PROJECT_ID`, `DOCUMENT_AI_PROCESSOR_ID`: required
/// - `DOCUMENT_AI_LOCATION`: processor region (default: "us")
/// - `DOCUMENT_AI_ACCESS_TOKEN`: OAuth bearer token
/// - `DOCUMENT_AI_ENDPOINT`: API root override
/// - `DOCUMENT_AI_TIMEOUT_SECS`: request timeout (default: 120)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("usage: {} <file> [mime-type]", config::APP_NAME);
    };
    let mime_type = args.next().unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    let content =
        std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;

    let processor_config = ProcessorConfig::from_env()?;
    let processor = build_processor(&processor_config)?;

    tracing::info!(
        "{} v{} processing {}",
        config::APP_NAME,
        config::APP_VERSION,
        path.display()
    );

    let record = processor.process(content, &mime_type).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
