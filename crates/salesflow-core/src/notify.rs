use salesflow_topic::Topic;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct NotifySummary {
    pub topic: String,
    pub message_id: Option<String>,
}

/// Publishes `message` once. The message is fixed and says nothing about how
/// many rows the run handled.
pub async fn notify(topic: &dyn Topic, message: &str) -> Result<NotifySummary> {
    let message_id = topic.publish(message).await?;
    info!(
        topic = topic.topic_arn(),
        message_id = message_id.as_deref().unwrap_or("-"),
        "published completion notification"
    );

    Ok(NotifySummary {
        topic: topic.topic_arn().to_string(),
        message_id,
    })
}
