//! Pub/sub publishing for run-completion notifications.

use std::fmt;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sns::error::{DisplayErrorContext, SdkError};
use aws_sdk_sns::Client;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("sdk error: {0}")]
    Sdk(String),
}

impl TopicError {
    fn from_sdk(err: impl fmt::Display) -> Self {
        Self::Sdk(err.to_string())
    }

    /// Service errors carry the service's own message; timeouts, dispatch
    /// and response failures keep their full source chain.
    fn from_sdk_error<E, R>(err: SdkError<E, R>) -> Self
    where
        E: std::error::Error + 'static,
        R: fmt::Debug,
    {
        match err {
            SdkError::ServiceError(service) => Self::from_sdk(service.err()),
            other => Self::from_sdk(DisplayErrorContext(other)),
        }
    }
}

#[async_trait]
pub trait Topic: Send + Sync {
    fn topic_arn(&self) -> &str;

    /// Publishes `message` and returns the service-assigned message id, if any.
    async fn publish(&self, message: &str) -> Result<Option<String>, TopicError>;
}

#[derive(Debug, Clone)]
pub struct SnsTopic {
    client: Client,
    topic_arn: String,
}

impl SnsTopic {
    pub fn new(sdk_config: &SdkConfig, topic_arn: impl Into<String>) -> Result<Self, TopicError> {
        let topic_arn = topic_arn.into();
        if !topic_arn.starts_with("arn:") {
            return Err(TopicError::Configuration(format!(
                "topic ARN must start with `arn:`; got `{topic_arn}`"
            )));
        }

        Ok(Self {
            client: Client::new(sdk_config),
            topic_arn,
        })
    }
}

#[async_trait]
impl Topic for SnsTopic {
    fn topic_arn(&self) -> &str {
        &self.topic_arn
    }

    async fn publish(&self, message: &str) -> Result<Option<String>, TopicError> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(message)
            .send()
            .await
            .map_err(TopicError::from_sdk_error)?;
        Ok(output.message_id().map(str::to_string))
    }
}

/// Topic that records every published message in memory.
#[derive(Debug, Default)]
pub struct MemoryTopic {
    topic_arn: String,
    published: Mutex<Vec<String>>,
}

impl MemoryTopic {
    pub fn new(topic_arn: impl Into<String>) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            published: Mutex::new(Vec::new()),
        }
    }

    pub async fn published(&self) -> Vec<String> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl Topic for MemoryTopic {
    fn topic_arn(&self) -> &str {
        &self.topic_arn
    }

    async fn publish(&self, message: &str) -> Result<Option<String>, TopicError> {
        let mut published = self.published.lock().await;
        published.push(message.to_string());
        Ok(Some(format!("memory-{}", published.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sns::operation::publish::PublishError;

    #[test]
    fn transport_failures_keep_their_cause() {
        let err = TopicError::from_sdk_error(SdkError::<PublishError, ()>::timeout_error(
            "connect timed out",
        ));
        match err {
            TopicError::Sdk(message) => assert!(message.contains("connect timed out"), "{message}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn memory_topic_records_messages_in_order() {
        let topic = MemoryTopic::new("arn:aws:sns:us-west-2:000000000000:Test");
        let first = topic.publish("one").await.unwrap();
        let second = topic.publish("two").await.unwrap();

        assert_eq!(first.as_deref(), Some("memory-1"));
        assert_eq!(second.as_deref(), Some("memory-2"));
        assert_eq!(topic.published().await, vec!["one", "two"]);
    }

    #[test]
    fn sns_topic_rejects_non_arn() {
        let sdk_config = SdkConfig::builder().build();
        let err = SnsTopic::new(&sdk_config, "SalesDataNotification").unwrap_err();
        assert!(matches!(err, TopicError::Configuration(_)));
    }
}
