//! Key-value table access for loaded sales items.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::Client;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::trace;

pub use aws_sdk_dynamodb::types::AttributeValue;

/// A table item as attribute name -> value.
pub type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("sdk error: {0}")]
    Sdk(String),
    #[error("item is missing key attribute `{0}`")]
    MissingKey(String),
}

impl TableError {
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
pub trait ItemTable: Send + Sync {
    fn table_name(&self) -> &str;

    /// Unconditional write; an existing item with the same key is replaced.
    async fn put_item(&self, item: Item) -> Result<(), TableError>;
}

#[derive(Debug, Clone)]
pub struct DynamoDbTable {
    client: Client,
    table_name: String,
}

impl DynamoDbTable {
    pub fn new(sdk_config: &SdkConfig, table_name: impl Into<String>) -> Result<Self, TableError> {
        let table_name = table_name.into();
        if table_name.is_empty() {
            return Err(TableError::Configuration(
                "table name cannot be empty".into(),
            ));
        }

        Ok(Self {
            client: Client::new(sdk_config),
            table_name,
        })
    }
}

#[async_trait]
impl ItemTable for DynamoDbTable {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn put_item(&self, item: Item) -> Result<(), TableError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(TableError::from_sdk_error)?;
        Ok(())
    }
}

/// In-memory table keyed by a single partition-key attribute.
#[derive(Debug)]
pub struct MemoryTable {
    table_name: String,
    partition_key: String,
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    items: BTreeMap<String, Item>,
    writes: usize,
}

impl MemoryTable {
    pub fn new(table_name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key: partition_key.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Item> {
        self.state.lock().await.items.get(key).cloned()
    }

    /// Stored items ordered by key.
    pub async fn items(&self) -> Vec<Item> {
        self.state.lock().await.items.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of successful `put_item` calls, overwrites included.
    pub async fn writes(&self) -> usize {
        self.state.lock().await.writes
    }
}

#[async_trait]
impl ItemTable for MemoryTable {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn put_item(&self, item: Item) -> Result<(), TableError> {
        let key = match item.get(&self.partition_key) {
            Some(AttributeValue::S(value)) | Some(AttributeValue::N(value)) => value.clone(),
            _ => return Err(TableError::MissingKey(self.partition_key.clone())),
        };

        trace!(table = %self.table_name, key = %key, "memory put_item");
        let mut state = self.state.lock().await;
        state.items.insert(key, item);
        state.writes += 1;
        Ok(())
    }
}
