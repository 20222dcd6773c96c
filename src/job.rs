use crate::{
    batch::Batch,
    client::Client,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery},
    util, Error, Result,
};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const RESOURCE: &str = "job";

/// A job executed by the engine's job executor, e.g. a timer or an
/// asynchronous continuation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// the id of the job
    pub id: String,
    /// the job definition of the job
    pub job_definition_id: Option<String>,
    /// the process instance the job belongs to
    pub process_instance_id: Option<String>,
    /// the process definition of the job
    pub process_definition_id: Option<String>,
    /// the process definition key of the job
    pub process_definition_key: Option<String>,
    /// the execution the job belongs to
    pub execution_id: Option<String>,
    /// the message of the exception of the last failed execution
    pub exception_message: Option<String>,
    /// the activity whose execution failed
    pub failed_activity_id: Option<String>,
    /// remaining retries
    pub retries: i32,
    /// when the job becomes executable
    #[serde(default, with = "util::timestamp::option")]
    pub due_date: Option<DateTime<Utc>>,
    /// whether the job is suspended
    #[serde(default)]
    pub suspended: bool,
    /// the priority of the job
    #[serde(default)]
    pub priority: i64,
    /// the tenant of the job
    pub tenant_id: Option<String>,
    /// when the job was created
    #[serde(default, with = "util::timestamp::option")]
    pub create_time: Option<DateTime<Utc>>,
}

/// Keys jobs can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum JobSortKey {
    /// job id
    JobId,
    /// execution id
    ExecutionId,
    /// process instance id
    ProcessInstanceId,
    /// process definition id
    ProcessDefinitionId,
    /// process definition key
    ProcessDefinitionKey,
    /// priority
    JobPriority,
    /// remaining retries
    JobRetries,
    /// due date
    JobDueDate,
    /// tenant id
    TenantId,
}

/// Filter for job queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    job_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_instance_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    with_retries_left: bool,
    #[serde(skip_serializing_if = "is_false")]
    executable: bool,
    #[serde(skip_serializing_if = "is_false")]
    timers: bool,
    #[serde(skip_serializing_if = "is_false")]
    messages: bool,
    #[serde(skip_serializing_if = "is_false")]
    with_exception: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_activity_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    no_retries_left: bool,
    #[serde(skip_serializing_if = "is_false")]
    active: bool,
    #[serde(skip_serializing_if = "is_false")]
    suspended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority_lower_than_or_equals: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority_higher_than_or_equals: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
}

impl ListQuery for JobQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = JobSortKey;
    type Item = Job;
}

impl JobQuery {
    /// An empty filter matching all jobs.
    pub fn new() -> Self {
        JobQuery::default()
    }

    /// Filter by job id.
    pub fn with_job_id<T: Into<String>>(self, job_id: T) -> Self {
        JobQuery {
            job_id: Some(job_id.into()),
            ..self
        }
    }

    /// Filter by a list of job ids.
    pub fn with_job_ids(self, job_ids: Vec<String>) -> Self {
        JobQuery { job_ids, ..self }
    }

    /// Filter by job definition id.
    pub fn with_job_definition_id<T: Into<String>>(self, id: T) -> Self {
        JobQuery {
            job_definition_id: Some(id.into()),
            ..self
        }
    }

    /// Filter by process instance id.
    pub fn with_process_instance_id<T: Into<String>>(self, id: T) -> Self {
        JobQuery {
            process_instance_id: Some(id.into()),
            ..self
        }
    }

    /// Only include jobs of one of the process instances.
    pub fn with_process_instance_ids(self, process_instance_ids: Vec<String>) -> Self {
        JobQuery {
            process_instance_ids,
            ..self
        }
    }

    /// Filter by execution id.
    pub fn with_execution_id<T: Into<String>>(self, id: T) -> Self {
        JobQuery {
            execution_id: Some(id.into()),
            ..self
        }
    }

    /// Filter by process definition id.
    pub fn with_process_definition_id<T: Into<String>>(self, id: T) -> Self {
        JobQuery {
            process_definition_id: Some(id.into()),
            ..self
        }
    }

    /// Filter by process definition key.
    pub fn with_process_definition_key<T: Into<String>>(self, key: T) -> Self {
        JobQuery {
            process_definition_key: Some(key.into()),
            ..self
        }
    }

    /// Filter by activity id.
    pub fn with_activity_id<T: Into<String>>(self, activity_id: T) -> Self {
        JobQuery {
            activity_id: Some(activity_id.into()),
            ..self
        }
    }

    /// Only include jobs with retries left.
    pub fn with_retries_left(self) -> Self {
        JobQuery {
            with_retries_left: true,
            ..self
        }
    }

    /// Only include jobs that are due and have retries left.
    pub fn executable(self) -> Self {
        JobQuery {
            executable: true,
            ..self
        }
    }

    /// Only include timers.
    pub fn timers(self) -> Self {
        JobQuery {
            timers: true,
            ..self
        }
    }

    /// Only include messages, i.e. asynchronous continuations.
    pub fn messages(self) -> Self {
        JobQuery {
            messages: true,
            ..self
        }
    }

    /// Only include jobs that failed with an exception.
    pub fn with_exception(self) -> Self {
        JobQuery {
            with_exception: true,
            ..self
        }
    }

    /// Filter by exception message.
    pub fn with_exception_message<T: Into<String>>(self, message: T) -> Self {
        JobQuery {
            exception_message: Some(message.into()),
            ..self
        }
    }

    /// Filter by failed activity id.
    pub fn with_failed_activity_id<T: Into<String>>(self, activity_id: T) -> Self {
        JobQuery {
            failed_activity_id: Some(activity_id.into()),
            ..self
        }
    }

    /// Only include jobs without retries left.
    pub fn no_retries_left(self) -> Self {
        JobQuery {
            no_retries_left: true,
            ..self
        }
    }

    /// Only include active jobs.
    pub fn active(self) -> Self {
        JobQuery {
            active: true,
            ..self
        }
    }

    /// Only include suspended jobs.
    pub fn suspended(self) -> Self {
        JobQuery {
            suspended: true,
            ..self
        }
    }

    /// Only include jobs with at most the priority.
    pub fn with_priority_lower_than_or_equals(self, priority: i64) -> Self {
        JobQuery {
            priority_lower_than_or_equals: Some(priority),
            ..self
        }
    }

    /// Only include jobs with at least the priority.
    pub fn with_priority_higher_than_or_equals(self, priority: i64) -> Self {
        JobQuery {
            priority_higher_than_or_equals: Some(priority),
            ..self
        }
    }

    /// Only include jobs of the given tenants.
    pub fn with_tenant_ids(self, tenant_id_in: Vec<String>) -> Self {
        JobQuery {
            tenant_id_in,
            ..self
        }
    }

    /// Only include jobs without a tenant.
    pub fn without_tenant_id(self) -> Self {
        JobQuery {
            without_tenant_id: true,
            ..self
        }
    }
}

/// Queries jobs.
pub type GetJobListBuilder = ListBuilder<JobQuery>;
/// Counts jobs.
pub type CountJobsBuilder = CountBuilder<JobQuery>;

impl Client {
    /// Queries jobs matching a filter.
    pub fn get_job_list(&self, query: JobQuery) -> GetJobListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts jobs matching a filter.
    pub fn count_jobs(&self, query: JobQuery) -> CountJobsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single job.
    pub fn get_job<T: Into<String>>(&self, id: T) -> GetJobBuilder {
        GetJobBuilder::new(self.clone(), id)
    }

    /// Executes a job synchronously.
    pub fn execute_job<T: Into<String>>(&self, id: T) -> ExecuteJobBuilder {
        ExecuteJobBuilder::new(self.clone(), id)
    }

    /// Sets the due date of a job.
    pub fn set_job_due_date<T: Into<String>>(&self, id: T) -> SetJobDueDateBuilder {
        SetJobDueDateBuilder::new(self.clone(), id)
    }

    /// Recalculates the due date of a timer job from its definition.
    pub fn recalculate_job_due_date<T: Into<String>>(
        &self,
        id: T,
    ) -> RecalculateJobDueDateBuilder {
        RecalculateJobDueDateBuilder::new(self.clone(), id)
    }

    /// Sets the priority of a job.
    pub fn set_job_priority<T: Into<String>>(&self, id: T, priority: i64) -> SetJobPriorityBuilder {
        SetJobPriorityBuilder::new(self.clone(), id, priority)
    }

    /// Sets the retries of a job.
    pub fn set_job_retries<T: Into<String>>(&self, id: T, retries: u32) -> SetJobRetriesBuilder {
        SetJobRetriesBuilder::new(self.clone(), id, retries)
    }

    /// Sets the retries of several jobs asynchronously in a batch.
    pub fn set_job_retries_async(&self, retries: u32) -> SetJobRetriesAsyncBuilder {
        SetJobRetriesAsyncBuilder::new(self.clone(), retries)
    }

    /// Activates a job.
    pub fn activate_job<T: Into<String>>(&self, id: T) -> JobSuspensionBuilder {
        JobSuspensionBuilder::new(self.clone(), id, false)
    }

    /// Suspends a job.
    pub fn suspend_job<T: Into<String>>(&self, id: T) -> JobSuspensionBuilder {
        JobSuspensionBuilder::new(self.clone(), id, true)
    }

    /// Deletes a job.
    pub fn delete_job<T: Into<String>>(&self, id: T) -> DeleteJobBuilder {
        DeleteJobBuilder::new(self.clone(), id)
    }

    /// Retrieves the stack trace of the last failed execution of a job.
    pub fn get_job_stacktrace<T: Into<String>>(&self, id: T) -> GetJobStacktraceBuilder {
        GetJobStacktraceBuilder::new(self.clone(), id)
    }
}

/// Retrieves a single job.
#[derive(Debug)]
pub struct GetJobBuilder {
    client: Client,
    id: String,
}

impl GetJobBuilder {
    /// Create a new get job builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetJobBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get job request.
    #[tracing::instrument(skip(self), name = "get_job", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Job> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

/// Executes a job synchronously.
#[derive(Debug)]
pub struct ExecuteJobBuilder {
    client: Client,
    id: String,
}

impl ExecuteJobBuilder {
    /// Create a new execute job builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        ExecuteJobBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the execute job request.
    #[tracing::instrument(skip(self), name = "execute_job", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        debug!("executing job");
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "execute"])
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DueDateRequest {
    #[serde(rename = "duedate", with = "util::timestamp::option")]
    due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "is_false")]
    cascade: bool,
}

/// Sets the due date of a job.
#[derive(Debug)]
pub struct SetJobDueDateBuilder {
    client: Client,
    id: String,
    request: DueDateRequest,
}

impl SetJobDueDateBuilder {
    /// Create a new set due date builder; without a due date the job is due
    /// immediately.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        SetJobDueDateBuilder {
            client,
            id: id.into(),
            request: DueDateRequest::default(),
        }
    }

    /// Set the new due date.
    pub fn with_due_date(self, due_date: DateTime<Utc>) -> Self {
        SetJobDueDateBuilder {
            request: DueDateRequest {
                due_date: Some(due_date),
                ..self.request
            },
            ..self
        }
    }

    /// Shift the due dates of follow-up timer jobs by the same offset.
    pub fn with_cascade(self, cascade: bool) -> Self {
        SetJobDueDateBuilder {
            request: DueDateRequest {
                cascade,
                ..self.request
            },
            ..self
        }
    }

    /// Submit the set due date request.
    #[tracing::instrument(skip(self), name = "set_job_due_date", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "duedate"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecalculateQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    creation_date_based: Option<bool>,
}

/// Recalculates the due date of a timer job.
#[derive(Debug)]
pub struct RecalculateJobDueDateBuilder {
    client: Client,
    id: String,
    query: RecalculateQuery,
}

impl RecalculateJobDueDateBuilder {
    /// Create a new recalculate due date builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        RecalculateJobDueDateBuilder {
            client,
            id: id.into(),
            query: RecalculateQuery::default(),
        }
    }

    /// Base the due date on the creation time (the default) or on the current
    /// time.
    pub fn with_creation_date_based(self, creation_date_based: bool) -> Self {
        RecalculateJobDueDateBuilder {
            query: RecalculateQuery {
                creation_date_based: Some(creation_date_based),
            },
            ..self
        }
    }

    /// Submit the recalculate due date request.
    #[tracing::instrument(skip(self), name = "recalculate_job_due_date", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(
                Method::POST,
                [RESOURCE, self.id.as_str(), "duedate", "recalculate"],
            )
            .query(&self.query)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct PriorityRequest {
    priority: i64,
}

/// Sets the priority of a job.
#[derive(Debug)]
pub struct SetJobPriorityBuilder {
    client: Client,
    id: String,
    request: PriorityRequest,
}

impl SetJobPriorityBuilder {
    /// Create a new set priority builder.
    pub fn new<T: Into<String>>(client: Client, id: T, priority: i64) -> Self {
        SetJobPriorityBuilder {
            client,
            id: id.into(),
            request: PriorityRequest { priority },
        }
    }

    /// Submit the set priority request.
    #[tracing::instrument(skip(self), name = "set_job_priority", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "priority"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct RetriesRequest {
    retries: u32,
}

/// Sets the retries of a job; setting retries on a failed job resolves its
/// incident.
#[derive(Debug)]
pub struct SetJobRetriesBuilder {
    client: Client,
    id: String,
    request: RetriesRequest,
}

impl SetJobRetriesBuilder {
    /// Create a new set retries builder.
    pub fn new<T: Into<String>>(client: Client, id: T, retries: u32) -> Self {
        SetJobRetriesBuilder {
            client,
            id: id.into(),
            request: RetriesRequest { retries },
        }
    }

    /// Submit the set retries request.
    #[tracing::instrument(skip(self), name = "set_job_retries", fields(id = %self.id), err)]
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
struct RetriesAsyncRequest {
    retries: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    job_ids: Vec<String>,
}

/// Sets the retries of several jobs in a batch.
#[derive(Debug)]
pub struct SetJobRetriesAsyncBuilder {
    client: Client,
    request: RetriesAsyncRequest,
}

impl SetJobRetriesAsyncBuilder {
    /// Create a new set retries async builder.
    pub fn new(client: Client, retries: u32) -> Self {
        SetJobRetriesAsyncBuilder {
            client,
            request: RetriesAsyncRequest {
                retries,
                job_ids: Vec::new(),
            },
        }
    }

    /// Set the jobs to update.
    pub fn with_job_ids(self, job_ids: Vec<String>) -> Self {
        SetJobRetriesAsyncBuilder {
            request: RetriesAsyncRequest {
                job_ids,
                ..self.request
            },
            ..self
        }
    }

    /// Submit the batch.
    #[tracing::instrument(skip(self), name = "set_job_retries_async", err)]
    pub async fn send(self) -> Result<Batch> {
        if self.request.job_ids.is_empty() {
            return Err(Error::InvalidParameters("`job_ids` must be set"));
        }
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, "retries"])
            .json(&self.request)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct SuspensionRequest {
    suspended: bool,
}

/// Activates or suspends a job.
#[derive(Debug)]
pub struct JobSuspensionBuilder {
    client: Client,
    id: String,
    request: SuspensionRequest,
}

impl JobSuspensionBuilder {
    /// Create a new suspension builder; `suspended` selects the target state.
    pub fn new<T: Into<String>>(client: Client, id: T, suspended: bool) -> Self {
        JobSuspensionBuilder {
            client,
            id: id.into(),
            request: SuspensionRequest { suspended },
        }
    }

    /// Submit the suspension request.
    #[tracing::instrument(skip(self), name = "update_job_suspension", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "suspended"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

/// Deletes a job.
#[derive(Debug)]
pub struct DeleteJobBuilder {
    client: Client,
    id: String,
}

impl DeleteJobBuilder {
    /// Create a new delete job builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteJobBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the delete job request.
    #[tracing::instrument(skip(self), name = "delete_job", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .send_empty()
            .await
    }
}

/// Retrieves the stack trace of the last failed execution of a job.
#[derive(Debug)]
pub struct GetJobStacktraceBuilder {
    client: Client,
    id: String,
}

impl GetJobStacktraceBuilder {
    /// Create a new get stacktrace builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetJobStacktraceBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get stacktrace request.
    #[tracing::instrument(skip(self), name = "get_job_stacktrace", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<String> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "stacktrace"])
            .send_text()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn due_date_is_sent_in_engine_format() {
        let request = DueDateRequest {
            due_date: Some(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()),
            cascade: true,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"duedate":"2024-05-06T07:08:09.000+0000","cascade":true}"#
        );
        assert_eq!(
            serde_json::to_string(&DueDateRequest::default()).unwrap(),
            r#"{"duedate":null}"#
        );
    }
}
