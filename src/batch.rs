use crate::{
    client::Client,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery},
    Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

const RESOURCE: &str = "batch";

/// A batch of asynchronously executed jobs, e.g. a batch deletion or
/// migration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    /// the id of the batch
    pub id: String,
    /// the type of the batch, e.g. `instance-deletion`
    #[serde(rename = "type")]
    pub batch_type: String,
    /// number of batch execution jobs required to complete the batch
    pub total_jobs: u64,
    /// number of batch execution jobs already created by the seed job
    #[serde(default)]
    pub jobs_created: u64,
    /// number of batch execution jobs created per seed job invocation
    pub batch_jobs_per_seed: u64,
    /// invocations executed per batch job
    pub invocations_per_batch_job: u64,
    /// the job definition of the seed job
    pub seed_job_definition_id: Option<String>,
    /// the job definition of the monitor job
    pub monitor_job_definition_id: Option<String>,
    /// the job definition of the execution jobs
    pub batch_job_definition_id: Option<String>,
    /// whether the batch is suspended
    #[serde(default)]
    pub suspended: bool,
    /// the tenant of the batch
    pub tenant_id: Option<String>,
    /// the user that created the batch
    pub create_user_id: Option<String>,
}

/// A batch together with the progress of its jobs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatistics {
    /// the batch
    #[serde(flatten)]
    pub batch: Batch,
    /// jobs not yet executed
    pub remaining_jobs: u64,
    /// jobs executed successfully
    pub completed_jobs: u64,
    /// jobs that failed without retries left
    pub failed_jobs: u64,
}

/// Keys batches can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchSortKey {
    /// batch id
    BatchId,
    /// tenant id
    TenantId,
}

/// Filter for batch queries, shared by batch statistics queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    batch_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    batch_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    suspended: Option<bool>,
}

impl ListQuery for BatchQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = BatchSortKey;
    type Item = Batch;
}

impl BatchQuery {
    /// An empty filter matching all batches.
    pub fn new() -> Self {
        BatchQuery::default()
    }

    /// Filter by batch id.
    pub fn with_batch_id<T: Into<String>>(mut self, batch_id: T) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// Filter by batch type.
    pub fn with_type<T: Into<String>>(mut self, batch_type: T) -> Self {
        self.batch_type = Some(batch_type.into());
        self
    }

    /// Only include batches of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include batches without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.without_tenant_id = true;
        self
    }

    /// Only include suspended (`true`) or active (`false`) batches.
    pub fn with_suspended(mut self, suspended: bool) -> Self {
        self.suspended = Some(suspended);
        self
    }
}

/// Filter for batch statistics queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchStatisticsQuery(BatchQuery);

impl From<BatchQuery> for BatchStatisticsQuery {
    fn from(query: BatchQuery) -> Self {
        BatchStatisticsQuery(query)
    }
}

impl ListQuery for BatchStatisticsQuery {
    const PATH: &'static [&'static str] = &[RESOURCE, "statistics"];
    type SortKey = BatchSortKey;
    type Item = BatchStatistics;
}

/// Queries batches.
pub type GetBatchListBuilder = ListBuilder<BatchQuery>;
/// Counts batches.
pub type CountBatchesBuilder = CountBuilder<BatchQuery>;
/// Queries batch statistics.
pub type GetBatchStatisticsBuilder = ListBuilder<BatchStatisticsQuery>;

impl Client {
    /// Queries batches matching a filter.
    pub fn get_batch_list(&self, query: BatchQuery) -> GetBatchListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts batches matching a filter.
    pub fn count_batches(&self, query: BatchQuery) -> CountBatchesBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Queries the progress of batches matching a filter.
    pub fn get_batch_statistics(&self, query: BatchQuery) -> GetBatchStatisticsBuilder {
        ListBuilder::new(self.clone(), query.into())
    }

    /// Retrieves a single batch.
    pub fn get_batch<T: Into<String>>(&self, id: T) -> GetBatchBuilder {
        GetBatchBuilder::new(self.clone(), id)
    }

    /// Activates a batch.
    pub fn activate_batch<T: Into<String>>(&self, id: T) -> BatchSuspensionBuilder {
        BatchSuspensionBuilder::new(self.clone(), id, false)
    }

    /// Suspends a batch; its jobs are not executed while suspended.
    pub fn suspend_batch<T: Into<String>>(&self, id: T) -> BatchSuspensionBuilder {
        BatchSuspensionBuilder::new(self.clone(), id, true)
    }

    /// Deletes a batch.
    pub fn delete_batch<T: Into<String>>(&self, id: T) -> DeleteBatchBuilder {
        DeleteBatchBuilder::new(self.clone(), id)
    }
}

/// Retrieves a single batch.
#[derive(Debug)]
pub struct GetBatchBuilder {
    client: Client,
    id: String,
}

impl GetBatchBuilder {
    /// Create a new get batch builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetBatchBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get batch request.
    #[tracing::instrument(skip(self), name = "get_batch", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Batch> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct SuspensionRequest {
    suspended: bool,
}

/// Activates or suspends a batch.
#[derive(Debug)]
pub struct BatchSuspensionBuilder {
    client: Client,
    id: String,
    request: SuspensionRequest,
}

impl BatchSuspensionBuilder {
    /// Create a new suspension builder; `suspended` selects the target state.
    pub fn new<T: Into<String>>(client: Client, id: T, suspended: bool) -> Self {
        BatchSuspensionBuilder {
            client,
            id: id.into(),
            request: SuspensionRequest { suspended },
        }
    }

    /// Submit the suspension request.
    #[tracing::instrument(skip(self), name = "update_batch_suspension", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        debug!(suspended = self.request.suspended, "updating batch suspension state");
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "suspended"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteBatchQuery {
    #[serde(skip_serializing_if = "is_false")]
    cascade: bool,
}

/// Deletes a batch.
#[derive(Debug)]
pub struct DeleteBatchBuilder {
    client: Client,
    id: String,
    query: DeleteBatchQuery,
}

impl DeleteBatchBuilder {
    /// Create a new delete batch builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteBatchBuilder {
            client,
            id: id.into(),
            query: DeleteBatchQuery::default(),
        }
    }

    /// Also delete the historic batch and its job log.
    pub fn with_cascade(mut self, cascade: bool) -> Self {
        self.query.cascade = cascade;
        self
    }

    /// Submit the delete batch request.
    #[tracing::instrument(skip(self), name = "delete_batch", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .query(&self.query)
            .send_empty()
            .await
    }
}
