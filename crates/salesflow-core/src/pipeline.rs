use std::sync::Arc;

use chrono::{DateTime, Utc};
use salesflow_bucket::{BucketStore, S3BucketStore, S3Config};
use salesflow_table::{DynamoDbTable, ItemTable};
use salesflow_topic::{SnsTopic, Topic};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extract::{extract, ExtractSummary};
use crate::load::{load_file, LoadSummary};
use crate::notify::{notify, NotifySummary};
use crate::transform::{transform_file, TransformSummary};

/// Outcome of one completed run. Logged, never published.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub extract: ExtractSummary,
    pub transform: TransformSummary,
    pub load: LoadSummary,
    pub notify: NotifySummary,
}

pub struct Pipeline {
    config: PipelineConfig,
    bucket: Arc<dyn BucketStore>,
    table: Arc<dyn ItemTable>,
    topic: Arc<dyn Topic>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        bucket: Arc<dyn BucketStore>,
        table: Arc<dyn ItemTable>,
        topic: Arc<dyn Topic>,
    ) -> Self {
        Self {
            config,
            bucket,
            table,
            topic,
        }
    }

    /// Builds AWS-backed S3, DynamoDB and SNS clients from `config`.
    pub async fn connect(config: PipelineConfig) -> Result<Self> {
        let sdk_config = config.aws.load_sdk_config().await;

        let bucket = S3BucketStore::new(
            &sdk_config,
            S3Config {
                bucket: config.source.bucket.clone(),
                force_path_style: config.aws.force_path_style,
            },
        )?;
        let table = DynamoDbTable::new(&sdk_config, config.table.name.clone())?;
        let topic = SnsTopic::new(&sdk_config, config.notification.topic_arn.clone())?;

        Ok(Self::new(
            config,
            Arc::new(bucket),
            Arc::new(table),
            Arc::new(topic),
        ))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract, transform, load, notify. Each step finishes before the next
    /// begins; the first error ends the run.
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        self.run_steps(run_id).instrument(span).await
    }

    async fn run_steps(&self, run_id: Uuid) -> Result<RunReport> {
        let started_at = Utc::now();
        let paths = &self.config.paths;

        // 1. fetch the raw export
        let extract = extract(self.bucket.as_ref(), &self.config.source.key, &paths.raw)
            .instrument(info_span!("extract"))
            .await?;

        // 2. derive TotalAmount into the second file
        let transform = info_span!("transform")
            .in_scope(|| transform_file(&paths.raw, &paths.transformed))?;

        // 3. one put per row
        let load = load_file(self.table.as_ref(), &paths.transformed)
            .instrument(info_span!("load"))
            .await?;

        // 4. always exactly one notification
        let notify = notify(self.topic.as_ref(), &self.config.notification.message)
            .instrument(info_span!("notify"))
            .await?;

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            extract,
            transform,
            load,
            notify,
        };

        info!(
            rows = report.transform.rows,
            items_written = report.load.items_written,
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "run complete"
        );

        Ok(report)
    }
}
