pub mod config;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

pub use config::{ConfigError, ProcessorConfig};
pub use pipeline::normalize::ExtractedReferralData;
pub use pipeline::processor::{
    build_processor, ProcessingError, ReferralProcessor, DEFAULT_MIME_TYPE,
};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `config::default_log_filter()`.
/// Calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
