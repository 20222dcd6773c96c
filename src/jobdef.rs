use crate::{
    client::Client,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery},
    util, Result,
};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::trace;

const RESOURCE: &str = "job-definition";

/// The definition of the jobs created for an activity, e.g. its timer or
/// asynchronous continuation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDefinition {
    /// the id of the job definition
    pub id: String,
    /// the process definition of the job definition
    pub process_definition_id: Option<String>,
    /// the process definition key of the job definition
    pub process_definition_key: Option<String>,
    /// the activity the jobs are created for
    pub activity_id: Option<String>,
    /// the type of the jobs, e.g. `timer-intermediate-transition`
    pub job_type: String,
    /// the configuration of the jobs, e.g. a timer expression
    pub job_configuration: Option<String>,
    /// priority overriding the priorities of new jobs
    pub overriding_job_priority: Option<i64>,
    /// whether the job definition is suspended
    #[serde(default)]
    pub suspended: bool,
    /// the tenant of the job definition
    pub tenant_id: Option<String>,
    /// the deployment of the job definition
    pub deployment_id: Option<String>,
}

/// Keys job definitions can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobDefinitionSortKey {
    /// job definition id
    JobDefinitionId,
    /// activity id
    ActivityId,
    /// process definition id
    ProcessDefinitionId,
    /// process definition key
    ProcessDefinitionKey,
    /// job type
    JobType,
    /// job configuration
    JobConfiguration,
    /// tenant id
    TenantId,
}

/// Filter for job definition queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDefinitionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    job_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    job_definition_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    activity_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_configuration: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    active: bool,
    #[serde(skip_serializing_if = "is_false")]
    suspended: bool,
    #[serde(skip_serializing_if = "is_false")]
    with_overriding_job_priority: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
}

impl ListQuery for JobDefinitionQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = JobDefinitionSortKey;
    type Item = JobDefinition;
}

impl JobDefinitionQuery {
    /// An empty filter matching all job definitions.
    pub fn new() -> Self {
        JobDefinitionQuery::default()
    }

    /// Filter by job definition id.
    pub fn with_job_definition_id<T: Into<String>>(mut self, id: T) -> Self {
        self.job_definition_id = Some(id.into());
        self
    }

    /// Filter by a list of job definition ids.
    pub fn with_job_definition_ids(mut self, ids: Vec<String>) -> Self {
        self.job_definition_id_in = ids;
        self
    }

    /// Only include job definitions of one of the activities.
    pub fn with_activity_ids(mut self, activity_ids: Vec<String>) -> Self {
        self.activity_id_in = activity_ids;
        self
    }

    /// Filter by process definition id.
    pub fn with_process_definition_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_definition_id = Some(id.into());
        self
    }

    /// Filter by process definition key.
    pub fn with_process_definition_key<T: Into<String>>(mut self, key: T) -> Self {
        self.process_definition_key = Some(key.into());
        self
    }

    /// Filter by job type.
    pub fn with_job_type<T: Into<String>>(mut self, job_type: T) -> Self {
        self.job_type = Some(job_type.into());
        self
    }

    /// Filter by job configuration.
    pub fn with_job_configuration<T: Into<String>>(mut self, configuration: T) -> Self {
        self.job_configuration = Some(configuration.into());
        self
    }

    /// Only include active job definitions.
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Only include suspended job definitions.
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Only include job definitions with an overriding job priority.
    pub fn with_overriding_job_priority(mut self) -> Self {
        self.with_overriding_job_priority = true;
        self
    }

    /// Only include job definitions of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include job definitions without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.without_tenant_id = true;
        self
    }
}

/// Queries job definitions.
pub type GetJobDefinitionListBuilder = ListBuilder<JobDefinitionQuery>;
/// Counts job definitions.
pub type CountJobDefinitionsBuilder = CountBuilder<JobDefinitionQuery>;

impl Client {
    /// Queries job definitions matching a filter.
    pub fn get_job_definition_list(&self, query: JobDefinitionQuery) -> GetJobDefinitionListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts job definitions matching a filter.
    pub fn count_job_definitions(&self, query: JobDefinitionQuery) -> CountJobDefinitionsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single job definition.
    pub fn get_job_definition<T: Into<String>>(&self, id: T) -> GetJobDefinitionBuilder {
        GetJobDefinitionBuilder::new(self.clone(), id)
    }

    /// Activates a job definition.
    pub fn activate_job_definition<T: Into<String>>(
        &self,
        id: T,
    ) -> JobDefinitionSuspensionBuilder {
        JobDefinitionSuspensionBuilder::new(self.clone(), id, false)
    }

    /// Suspends a job definition; new jobs are created suspended.
    pub fn suspend_job_definition<T: Into<String>>(
        &self,
        id: T,
    ) -> JobDefinitionSuspensionBuilder {
        JobDefinitionSuspensionBuilder::new(self.clone(), id, true)
    }

    /// Sets the retries of all failed jobs of a job definition.
    pub fn set_job_definition_retries<T: Into<String>>(
        &self,
        id: T,
        retries: u32,
    ) -> SetJobDefinitionRetriesBuilder {
        SetJobDefinitionRetriesBuilder::new(self.clone(), id, retries)
    }

    /// Sets or clears the overriding priority of a job definition.
    pub fn set_job_definition_priority<T: Into<String>>(
        &self,
        id: T,
    ) -> SetJobDefinitionPriorityBuilder {
        SetJobDefinitionPriorityBuilder::new(self.clone(), id)
    }
}

/// Retrieves a single job definition.
#[derive(Debug)]
pub struct GetJobDefinitionBuilder {
    client: Client,
    id: String,
}

impl GetJobDefinitionBuilder {
    /// Create a new get job definition builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetJobDefinitionBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get job definition request.
    #[tracing::instrument(skip(self), name = "get_job_definition", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<JobDefinition> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuspensionRequest {
    suspended: bool,
    #[serde(skip_serializing_if = "is_false")]
    include_jobs: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    execution_date: Option<DateTime<Utc>>,
}

/// Activates or suspends a job definition.
#[derive(Debug)]
pub struct JobDefinitionSuspensionBuilder {
    client: Client,
    id: String,
    request: SuspensionRequest,
}

impl JobDefinitionSuspensionBuilder {
    /// Create a new suspension builder; `suspended` selects the target state.
    pub fn new<T: Into<String>>(client: Client, id: T, suspended: bool) -> Self {
        JobDefinitionSuspensionBuilder {
            client,
            id: id.into(),
            request: SuspensionRequest {
                suspended,
                ..Default::default()
            },
        }
    }

    /// Also activate or suspend existing jobs.
    pub fn with_include_jobs(mut self, include_jobs: bool) -> Self {
        self.request.include_jobs = include_jobs;
        self
    }

    /// Apply the change at the given time instead of immediately.
    pub fn with_execution_date(mut self, execution_date: DateTime<Utc>) -> Self {
        self.request.execution_date = Some(execution_date);
        self
    }

    /// Submit the suspension request.
    #[tracing::instrument(skip(self), name = "update_job_definition_suspension", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "suspended"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct RetriesRequest {
    retries: u32,
}

/// Sets the retries of all failed jobs of a job definition.
#[derive(Debug)]
pub struct SetJobDefinitionRetriesBuilder {
    client: Client,
    id: String,
    request: RetriesRequest,
}

impl SetJobDefinitionRetriesBuilder {
    /// Create a new set retries builder.
    pub fn new<T: Into<String>>(client: Client, id: T, retries: u32) -> Self {
        SetJobDefinitionRetriesBuilder {
            client,
            id: id.into(),
            request: RetriesRequest { retries },
        }
    }

    /// Submit the set retries request.
    #[tracing::instrument(skip(self), name = "set_job_definition_retries", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "retries"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct PriorityRequest {
    priority: Option<i64>,
    #[serde(skip_serializing_if = "is_false")]
    include_jobs: bool,
}

/// Sets or clears the overriding priority of a job definition.
#[derive(Debug)]
pub struct SetJobDefinitionPriorityBuilder {
    client: Client,
    id: String,
    request: PriorityRequest,
}

impl SetJobDefinitionPriorityBuilder {
    /// Create a new set priority builder; without a priority the overriding
    /// priority is cleared.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        SetJobDefinitionPriorityBuilder {
            client,
            id: id.into(),
            request: PriorityRequest::default(),
        }
    }

    /// Set the overriding priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.request.priority = Some(priority);
        self
    }

    /// Also apply the priority to existing jobs.
    pub fn with_include_jobs(mut self, include_jobs: bool) -> Self {
        self.request.include_jobs = include_jobs;
        self
    }

    /// Submit the set priority request.
    #[tracing::instrument(skip(self), name = "set_job_definition_priority", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        if self.request.priority.is_none() && self.request.include_jobs {
            return Err(crate::Error::InvalidParameters(
                "`include_jobs` requires a priority",
            ));
        }
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "jobPriority"])
            .json(&self.request)
            .send_empty()
            .await
    }
}
