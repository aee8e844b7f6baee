//! Run configuration.
//!
//! Every field has a built-in default, so an empty config runs the job against
//! the production bucket, table and topic. A TOML file and `SALESFLOW_*`
//! environment variables may override any of them.

use std::path::{Path, PathBuf};

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use serde::{Deserialize, Serialize};
use thiserror::Error;


pub const DEFAULT_BUCKET: &str = "my-sales-bucket";
pub const DEFAULT_OBJECT_KEY: &str = "sales_data.csv";
pub const DEFAULT_RAW_PATH: &str = "/tmp/sales_data.csv";
pub const DEFAULT_TRANSFORMED_PATH: &str = "/tmp/transformed_sales_data.csv";
pub const DEFAULT_TABLE: &str = "SalesData";
pub const DEFAULT_TOPIC_ARN: &str = "arn:aws:sns:us-west-2:123456789012:SalesDataNotification";
pub const DEFAULT_MESSAGE: &str = "Sales data processed!";
pub const DEFAULT_REGION: &str = "us-west-2";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub paths: PathsConfig,
    pub table: TableConfig,
    pub notification: NotificationConfig,
    pub aws: AwsSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub bucket: String,
    pub key: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            key: DEFAULT_OBJECT_KEY.to_string(),
        }
    }
}

/// Local hand-off files. Both are left in place after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub raw: PathBuf,
    pub transformed: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw: PathBuf::from(DEFAULT_RAW_PATH),
            transformed: PathBuf::from(DEFAULT_TRANSFORMED_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableConfig {
    pub name: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_TABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationConfig {
    pub topic_arn: String,
    pub message: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            topic_arn: DEFAULT_TOPIC_ARN.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AwsSettings {
    pub region: String,
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub force_path_style: bool,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            force_path_style: false,
        }
    }
}

// Keeps secrets out of log lines and panic messages.
impl std::fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSettings")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl AwsSettings {
    /// Resolves the shared SDK config. Static keys are used when both halves
    /// are present; otherwise the SDK's default credential chain applies.
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&self.access_key_id, &self.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                self.session_token.clone(),
                None,
                "salesflow-static",
            );
            loader = loader.credentials_provider(SharedCredentialsProvider::new(credentials));
        }

        if let Some(endpoint) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        loader.load().await
    }
}

impl PipelineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Applies `SALESFLOW_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides using `lookup` to resolve variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| -> Result<Option<String>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: "value is empty".into(),
                }),
                Some(value) => Ok(Some(value)),
            }
        };

        if let Some(value) = get("SALESFLOW_BUCKET")? {
            self.source.bucket = value;
        }
        if let Some(value) = get("SALESFLOW_OBJECT_KEY")? {
            self.source.key = value;
        }
        if let Some(value) = get("SALESFLOW_RAW_PATH")? {
            self.paths.raw = PathBuf::from(value);
        }
        if let Some(value) = get("SALESFLOW_TRANSFORMED_PATH")? {
            self.paths.transformed = PathBuf::from(value);
        }
        if let Some(value) = get("SALESFLOW_TABLE")? {
            self.table.name = value;
        }
        if let Some(value) = get("SALESFLOW_TOPIC_ARN")? {
            self.notification.topic_arn = value;
        }
        if let Some(value) = get("SALESFLOW_MESSAGE")? {
            self.notification.message = value;
        }
        if let Some(value) = get("SALESFLOW_AWS_REGION")? {
            self.aws.region = value;
        }
        if let Some(value) = get("SALESFLOW_AWS_ENDPOINT_URL")? {
            self.aws.endpoint_url = Some(value);
        }
        if let Some(value) = get("SALESFLOW_AWS_ACCESS_KEY_ID")? {
            self.aws.access_key_id = Some(value);
        }
        if let Some(value) = get("SALESFLOW_AWS_SECRET_ACCESS_KEY")? {
            self.aws.secret_access_key = Some(value);
        }
        if let Some(value) = get("SALESFLOW_AWS_SESSION_TOKEN")? {
            self.aws.session_token = Some(value);
        }
        if let Some(value) = get("SALESFLOW_S3_FORCE_PATH_STYLE")? {
            self.aws.force_path_style = parse_bool("SALESFLOW_S3_FORCE_PATH_STYLE", &value)?;
        }

        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("expected a boolean, got `{other}`"),
        }),
    }
}
