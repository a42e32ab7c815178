/// Application-level constants
pub const APP_NAME: &str = "referral-intake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default request timeout for the extraction processor, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Processor region used when `DOCUMENT_AI_LOCATION` is unset.
pub const DEFAULT_LOCATION: &str = "us";

pub const ENV_PROJECT_ID: &str = "DOCUMENT_AI_PROJECT_ID";
pub const ENV_LOCATION: &str = "DOCUMENT_AI_LOCATION";
pub const ENV_PROCESSOR_ID: &str = "DOCUMENT_AI_PROCESSOR_ID";
pub const ENV_ACCESS_TOKEN: &str = "DOCUMENT_AI_ACCESS_TOKEN";
pub const ENV_ENDPOINT: &str = "DOCUMENT_AI_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "DOCUMENT_AI_TIMEOUT_SECS";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "referral_intake=info"
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Connection settings for the remote extraction processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub project_id: String,
    pub location: String,
    pub processor_id: String,
    /// OAuth bearer token. Minting one is left to the deployment
    /// (e.g. `gcloud auth print-access-token`).
    pub access_token: Option<String>,
    /// Full API root, replacing the regional default.
    pub endpoint_override: Option<String>,
    pub timeout_secs: u64,
}

impl ProcessorConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: ENV_TIMEOUT_SECS,
                    value: raw,
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            project_id: require(ENV_PROJECT_ID)?,
            location: get(ENV_LOCATION).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            processor_id: require(ENV_PROCESSOR_ID)?,
            access_token: get(ENV_ACCESS_TOKEN),
            endpoint_override: get(ENV_ENDPOINT),
            timeout_secs,
        })
    }

    /// `projects/{project}/locations/{location}/processors/{processor}`
    pub fn processor_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/processors/{}",
            self.project_id, self.location, self.processor_id
        )
    }

    /// Regional API root unless overridden.
    pub fn api_endpoint(&self) -> String {
        match &self.endpoint_override {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}-documentai.googleapis.com", self.location),
        }
    }
}
