use crate::{
    batch::Batch,
    client::Client,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery},
    util,
    variable::{Variable, Variables},
    Error, Result,
};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, time::Duration};
use tracing::{debug, trace};

const RESOURCE: &str = "external-task";

/// Grace period on top of the long-poll timeout for a fetch to be answered.
pub(crate) const LONG_POLL_TIMEOUT_OFFSET: Duration = Duration::from_secs(10);

/// A unit of work executed by an external worker.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTask {
    /// the id of the external task
    pub id: String,
    /// the id of the activity the task belongs to
    pub activity_id: Option<String>,
    /// the activity instance the task belongs to
    pub activity_instance_id: Option<String>,
    /// the message of the last reported failure
    pub error_message: Option<String>,
    /// the execution the task belongs to
    pub execution_id: Option<String>,
    /// when the current lock expires
    #[serde(default, with = "util::timestamp::option")]
    pub lock_expiration_time: Option<DateTime<Utc>>,
    /// the process definition of the task
    pub process_definition_id: Option<String>,
    /// the process definition key of the task
    pub process_definition_key: Option<String>,
    /// the version tag of the process definition
    pub process_definition_version_tag: Option<String>,
    /// the process instance of the task
    pub process_instance_id: Option<String>,
    /// the tenant of the task
    pub tenant_id: Option<String>,
    /// remaining retries; `None` if no failure was reported yet
    pub retries: Option<i32>,
    /// whether the task is suspended
    #[serde(default)]
    pub suspended: bool,
    /// the worker holding the lock
    pub worker_id: Option<String>,
    /// the priority of the task
    #[serde(default)]
    pub priority: i64,
    /// the topic of the task
    pub topic_name: Option<String>,
    /// the business key of the process instance
    pub business_key: Option<String>,
}

/// An external task locked for a worker by a fetch and lock request.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedExternalTask {
    /// the id of the external task
    pub id: String,
    /// the id of the activity the task belongs to
    pub activity_id: Option<String>,
    /// the activity instance the task belongs to
    pub activity_instance_id: Option<String>,
    /// the message of the last reported failure
    pub error_message: Option<String>,
    /// the details of the last reported failure
    pub error_details: Option<String>,
    /// the execution the task belongs to
    pub execution_id: Option<String>,
    /// when the lock expires
    #[serde(default, with = "util::timestamp::option")]
    pub lock_expiration_time: Option<DateTime<Utc>>,
    /// the process definition of the task
    pub process_definition_id: Option<String>,
    /// the process definition key of the task
    pub process_definition_key: Option<String>,
    /// the version tag of the process definition
    pub process_definition_version_tag: Option<String>,
    /// the process instance of the task
    pub process_instance_id: Option<String>,
    /// the tenant of the task
    pub tenant_id: Option<String>,
    /// remaining retries; `None` if no failure was reported yet
    pub retries: Option<i32>,
    /// the worker holding the lock
    pub worker_id: String,
    /// the priority of the task
    #[serde(default)]
    pub priority: i64,
    /// the topic of the task
    pub topic_name: String,
    /// the business key of the process instance
    pub business_key: Option<String>,
    /// the requested variables
    #[serde(default)]
    pub variables: Variables,
    /// extension properties of the activity, if requested
    #[serde(default)]
    pub extension_properties: HashMap<String, String>,
}

impl LockedExternalTask {
    /// Deserialize a fetched variable.
    pub fn variable<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<Result<T>> {
        self.variables.get(name).map(Variable::value_as)
    }
}

/// Keys external tasks can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExternalTaskSortKey {
    /// task id
    Id,
    /// lock expiration time
    LockExpirationTime,
    /// process instance id
    ProcessInstanceId,
    /// process definition id
    ProcessDefinitionId,
    /// process definition key
    ProcessDefinitionKey,
    /// priority
    TaskPriority,
    /// tenant id
    TenantId,
}

/// Filter for external task queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    external_task_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    external_task_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    worker_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    locked: bool,
    #[serde(skip_serializing_if = "is_false")]
    not_locked: bool,
    #[serde(skip_serializing_if = "is_false")]
    with_retries_left: bool,
    #[serde(skip_serializing_if = "is_false")]
    no_retries_left: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    lock_expiration_after: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    lock_expiration_before: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    activity_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_instance_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    active: bool,
    #[serde(skip_serializing_if = "is_false")]
    suspended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority_higher_than_or_equals: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority_lower_than_or_equals: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
}

impl ListQuery for ExternalTaskQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = ExternalTaskSortKey;
    type Item = ExternalTask;
}

impl ExternalTaskQuery {
    /// An empty filter matching all external tasks.
    pub fn new() -> Self {
        ExternalTaskQuery::default()
    }

    /// Filter by external task id.
    pub fn with_external_task_id<T: Into<String>>(mut self, id: T) -> Self {
        self.external_task_id = Some(id.into());
        self
    }

    /// Filter by a list of external task ids.
    pub fn with_external_task_ids(mut self, ids: Vec<String>) -> Self {
        self.external_task_id_in = ids;
        self
    }

    /// Filter by topic.
    pub fn with_topic_name<T: Into<String>>(mut self, topic_name: T) -> Self {
        self.topic_name = Some(topic_name.into());
        self
    }

    /// Filter by the worker holding the lock.
    pub fn with_worker_id<T: Into<String>>(mut self, worker_id: T) -> Self {
        self.worker_id = Some(worker_id.into());
        self
    }

    /// Only include currently locked tasks.
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Only include tasks not currently locked.
    pub fn not_locked(mut self) -> Self {
        self.not_locked = true;
        self
    }

    /// Only include tasks with retries left.
    pub fn with_retries_left(mut self) -> Self {
        self.with_retries_left = true;
        self
    }

    /// Only include tasks without retries left.
    pub fn no_retries_left(mut self) -> Self {
        self.no_retries_left = true;
        self
    }

    /// Only include tasks whose lock expires after the given time.
    pub fn with_lock_expiration_after(mut self, after: DateTime<Utc>) -> Self {
        self.lock_expiration_after = Some(after);
        self
    }

    /// Only include tasks whose lock expires before the given time.
    pub fn with_lock_expiration_before(mut self, before: DateTime<Utc>) -> Self {
        self.lock_expiration_before = Some(before);
        self
    }

    /// Filter by activity id.
    pub fn with_activity_id<T: Into<String>>(mut self, activity_id: T) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    /// Only include tasks of one of the activities.
    pub fn with_activity_ids(mut self, activity_ids: Vec<String>) -> Self {
        self.activity_id_in = activity_ids;
        self
    }

    /// Filter by execution id.
    pub fn with_execution_id<T: Into<String>>(mut self, id: T) -> Self {
        self.execution_id = Some(id.into());
        self
    }

    /// Filter by process instance id.
    pub fn with_process_instance_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_instance_id = Some(id.into());
        self
    }

    /// Only include tasks of one of the process instances.
    pub fn with_process_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.process_instance_id_in = ids;
        self
    }

    /// Filter by process definition id.
    pub fn with_process_definition_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_definition_id = Some(id.into());
        self
    }

    /// Only include active tasks.
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Only include suspended tasks.
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Only include tasks with at least the priority.
    pub fn with_priority_higher_than_or_equals(mut self, priority: i64) -> Self {
        self.priority_higher_than_or_equals = Some(priority);
        self
    }

    /// Only include tasks with at most the priority.
    pub fn with_priority_lower_than_or_equals(mut self, priority: i64) -> Self {
        self.priority_lower_than_or_equals = Some(priority);
        self
    }

    /// Only include tasks of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }
}

/// Queries external tasks.
pub type GetExternalTaskListBuilder = ListBuilder<ExternalTaskQuery>;
/// Counts external tasks.
pub type CountExternalTasksBuilder = CountBuilder<ExternalTaskQuery>;

impl Client {
    /// Queries external tasks matching a filter.
    pub fn get_external_task_list(&self, query: ExternalTaskQuery) -> GetExternalTaskListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts external tasks matching a filter.
    pub fn count_external_tasks(&self, query: ExternalTaskQuery) -> CountExternalTasksBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single external task.
    pub fn get_external_task<T: Into<String>>(&self, id: T) -> GetExternalTaskBuilder {
        GetExternalTaskBuilder::new(self.clone(), id)
    }

    /// Fetches and locks external tasks for a worker.
    pub fn fetch_and_lock<T: Into<String>>(&self, worker_id: T) -> FetchAndLockBuilder {
        FetchAndLockBuilder::new(self.clone(), worker_id)
    }

    /// Completes an external task.
    pub fn complete_external_task<T: Into<String>, W: Into<String>>(
        &self,
        id: T,
        worker_id: W,
    ) -> CompleteExternalTaskBuilder {
        CompleteExternalTaskBuilder::new(self.clone(), id, worker_id)
    }

    /// Reports a BPMN error for an external task.
    pub fn handle_external_task_bpmn_error<T: Into<String>, W: Into<String>, C: Into<String>>(
        &self,
        id: T,
        worker_id: W,
        error_code: C,
    ) -> HandleExternalTaskBpmnErrorBuilder {
        HandleExternalTaskBpmnErrorBuilder::new(self.clone(), id, worker_id, error_code)
    }

    /// Reports a failure of an external task.
    pub fn handle_external_task_failure<T: Into<String>, W: Into<String>>(
        &self,
        id: T,
        worker_id: W,
    ) -> HandleExternalTaskFailureBuilder {
        HandleExternalTaskFailureBuilder::new(self.clone(), id, worker_id)
    }

    /// Releases the lock of an external task.
    pub fn unlock_external_task<T: Into<String>>(&self, id: T) -> UnlockExternalTaskBuilder {
        UnlockExternalTaskBuilder::new(self.clone(), id)
    }

    /// Extends the lock of an external task.
    pub fn extend_external_task_lock<T: Into<String>, W: Into<String>>(
        &self,
        id: T,
        worker_id: W,
        new_duration: Duration,
    ) -> ExtendLockBuilder {
        ExtendLockBuilder::new(self.clone(), id, worker_id, new_duration)
    }

    /// Sets the priority of an external task.
    pub fn set_external_task_priority<T: Into<String>>(
        &self,
        id: T,
        priority: i64,
    ) -> SetExternalTaskPriorityBuilder {
        SetExternalTaskPriorityBuilder::new(self.clone(), id, priority)
    }

    /// Sets the retries of an external task.
    pub fn set_external_task_retries<T: Into<String>>(
        &self,
        id: T,
        retries: u32,
    ) -> SetExternalTaskRetriesBuilder {
        SetExternalTaskRetriesBuilder::new(self.clone(), id, retries)
    }

    /// Sets the retries of several external tasks at once, either directly
    /// ([`send`](SetExternalTasksRetriesBuilder::send)) or in a batch
    /// ([`send_async`](SetExternalTasksRetriesBuilder::send_async)).
    pub fn set_external_tasks_retries(&self, retries: u32) -> SetExternalTasksRetriesBuilder {
        SetExternalTasksRetriesBuilder::new(self.clone(), retries)
    }

    /// Lists the topic names of external tasks.
    pub fn get_external_task_topic_names(&self) -> GetTopicNamesBuilder {
        GetTopicNamesBuilder::new(self.clone())
    }

    /// Retrieves the error details of the last failure of an external task.
    pub fn get_external_task_error_details<T: Into<String>>(
        &self,
        id: T,
    ) -> GetExternalTaskErrorDetailsBuilder {
        GetExternalTaskErrorDetailsBuilder::new(self.clone(), id)
    }
}

/// Retrieves a single external task.
#[derive(Debug)]
pub struct GetExternalTaskBuilder {
    client: Client,
    id: String,
}

impl GetExternalTaskBuilder {
    /// Create a new get external task builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetExternalTaskBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get external task request.
    #[tracing::instrument(skip(self), name = "get_external_task", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<ExternalTask> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

/// A topic to fetch external tasks from.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTopic {
    topic_name: String,
    lock_duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Vec<String>>,
    #[serde(skip_serializing_if = "is_false")]
    local_variables: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    process_definition_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    process_definition_key_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_version_tag: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    process_variables: HashMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "is_false")]
    deserialize_values: bool,
    #[serde(skip_serializing_if = "is_false")]
    include_extension_properties: bool,
}

impl FetchTopic {
    /// Fetch tasks of the topic, locking them for the given duration.
    pub fn new<T: Into<String>>(topic_name: T, lock_duration: Duration) -> Self {
        FetchTopic {
            topic_name: topic_name.into(),
            lock_duration: lock_duration.as_millis() as u64,
            variables: None,
            local_variables: false,
            business_key: None,
            process_definition_id: None,
            process_definition_id_in: Vec::new(),
            process_definition_key: None,
            process_definition_key_in: Vec::new(),
            process_definition_version_tag: None,
            without_tenant_id: false,
            tenant_id_in: Vec::new(),
            process_variables: HashMap::new(),
            deserialize_values: false,
            include_extension_properties: false,
        }
    }

    /// The name of the topic.
    pub fn topic_name(&self) -> &str {
        &self.topic_name
    }

    /// Replace the lock duration.
    pub fn with_lock_duration(mut self, lock_duration: Duration) -> Self {
        self.lock_duration = lock_duration.as_millis() as u64;
        self
    }

    /// Only fetch the named variables; all variables are fetched by default.
    pub fn with_variables(mut self, variables: Vec<String>) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Only fetch variables local to the execution of the task.
    pub fn with_local_variables(mut self, local_variables: bool) -> Self {
        self.local_variables = local_variables;
        self
    }

    /// Only fetch tasks of process instances with the business key.
    pub fn with_business_key<T: Into<String>>(mut self, business_key: T) -> Self {
        self.business_key = Some(business_key.into());
        self
    }

    /// Only fetch tasks of the process definition.
    pub fn with_process_definition_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_definition_id = Some(id.into());
        self
    }

    /// Only fetch tasks of one of the process definitions.
    pub fn with_process_definition_ids(mut self, ids: Vec<String>) -> Self {
        self.process_definition_id_in = ids;
        self
    }

    /// Only fetch tasks of definitions with the key.
    pub fn with_process_definition_key<T: Into<String>>(mut self, key: T) -> Self {
        self.process_definition_key = Some(key.into());
        self
    }

    /// Only fetch tasks of definitions with one of the keys.
    pub fn with_process_definition_keys(mut self, keys: Vec<String>) -> Self {
        self.process_definition_key_in = keys;
        self
    }

    /// Only fetch tasks of definitions with the version tag.
    pub fn with_process_definition_version_tag<T: Into<String>>(mut self, version_tag: T) -> Self {
        self.process_definition_version_tag = Some(version_tag.into());
        self
    }

    /// Only fetch tasks without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.without_tenant_id = true;
        self
    }

    /// Only fetch tasks of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only fetch tasks whose process instance has a variable with the value.
    pub fn with_process_variable<T: Into<String>, V: Into<serde_json::Value>>(
        mut self,
        name: T,
        value: V,
    ) -> Self {
        self.process_variables.insert(name.into(), value.into());
        self
    }

    /// Deserialize `Object` variables on the server.
    pub fn with_deserialize_values(mut self, deserialize_values: bool) -> Self {
        self.deserialize_values = deserialize_values;
        self
    }

    /// Include the extension properties of the activity.
    pub fn with_include_extension_properties(mut self, include: bool) -> Self {
        self.include_extension_properties = include;
        self
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchAndLockRequest {
    worker_id: String,
    max_tasks: u32,
    #[serde(skip_serializing_if = "is_false")]
    use_priority: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    async_response_timeout: Option<u64>,
    topics: Vec<FetchTopic>,
}

/// Fetches and locks external tasks for a worker.
///
/// With a long-poll timeout the engine holds the request open until tasks
/// become available or the timeout elapses.
#[derive(Debug)]
pub struct FetchAndLockBuilder {
    client: Client,
    request: FetchAndLockRequest,
}

impl FetchAndLockBuilder {
    /// Create a new fetch and lock builder fetching a single task.
    pub fn new<T: Into<String>>(client: Client, worker_id: T) -> Self {
        FetchAndLockBuilder {
            client,
            request: FetchAndLockRequest {
                worker_id: worker_id.into(),
                max_tasks: 1,
                ..Default::default()
            },
        }
    }

    /// Set the maximum number of tasks to fetch.
    pub fn with_max_tasks(mut self, max_tasks: u32) -> Self {
        self.request.max_tasks = max_tasks;
        self
    }

    /// Fetch tasks with a higher priority first.
    pub fn with_use_priority(mut self, use_priority: bool) -> Self {
        self.request.use_priority = use_priority;
        self
    }

    /// Hold the request open for up to the given time while no tasks are
    /// available.
    ///
    /// The HTTP timeout of this request is raised to the long-poll timeout
    /// plus a grace period, so a response the engine sends at the end of the
    /// poll is still received.
    pub fn with_async_response_timeout(mut self, timeout: Duration) -> Self {
        self.request.async_response_timeout = Some(timeout.as_millis() as u64);
        self
    }

    /// Add a topic to fetch tasks from.
    pub fn with_topic(mut self, topic: FetchTopic) -> Self {
        self.request.topics.push(topic);
        self
    }

    /// Submit the fetch and lock request.
    #[tracing::instrument(skip(self), name = "fetch_and_lock", fields(worker_id = %self.request.worker_id), err)]
    pub async fn send(self) -> Result<Vec<LockedExternalTask>> {
        if self.request.topics.is_empty() {
            return Err(Error::InvalidParameters("at least one topic must be set"));
        }
        trace!(req = ?self.request, "request:");
        let mut request = self
            .client
            .request(Method::POST, [RESOURCE, "fetchAndLock"])
            .json(&self.request);
        if let Some(timeout) = self.request.async_response_timeout {
            request = request.timeout(Duration::from_millis(timeout) + LONG_POLL_TIMEOUT_OFFSET);
        }
        let tasks: Vec<LockedExternalTask> = request.send().await?;
        debug!(tasks = tasks.len(), "locked external tasks");
        Ok(tasks)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteRequest {
    worker_id: String,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    local_variables: Variables,
}

/// Completes an external task.
#[derive(Debug)]
pub struct CompleteExternalTaskBuilder {
    client: Client,
    id: String,
    request: CompleteRequest,
}

impl CompleteExternalTaskBuilder {
    /// Create a new complete external task builder.
    pub fn new<T: Into<String>, W: Into<String>>(client: Client, id: T, worker_id: W) -> Self {
        CompleteExternalTaskBuilder {
            client,
            id: id.into(),
            request: CompleteRequest {
                worker_id: worker_id.into(),
                ..Default::default()
            },
        }
    }

    /// Set a process variable.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Set process variables.
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.request.variables.extend(variables);
        self
    }

    /// Set a variable local to the execution of the task.
    pub fn with_local_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.local_variables.insert(name.into(), variable);
        self
    }

    /// Submit the completion.
    #[tracing::instrument(skip(self), name = "complete_external_task", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "complete"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct BpmnErrorRequest {
    worker_id: String,
    error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
}

/// Reports a BPMN error for an external task.
#[derive(Debug)]
pub struct HandleExternalTaskBpmnErrorBuilder {
    client: Client,
    id: String,
    request: BpmnErrorRequest,
}

impl HandleExternalTaskBpmnErrorBuilder {
    /// Create a new handle BPMN error builder.
    pub fn new<T: Into<String>, W: Into<String>, C: Into<String>>(
        client: Client,
        id: T,
        worker_id: W,
        error_code: C,
    ) -> Self {
        HandleExternalTaskBpmnErrorBuilder {
            client,
            id: id.into(),
            request: BpmnErrorRequest {
                worker_id: worker_id.into(),
                error_code: error_code.into(),
                ..Default::default()
            },
        }
    }

    /// Set the error message.
    pub fn with_error_message<T: Into<String>>(mut self, error_message: T) -> Self {
        self.request.error_message = Some(error_message.into());
        self
    }

    /// Set a variable passed to the catching event.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Submit the BPMN error.
    #[tracing::instrument(skip(self), name = "handle_external_task_bpmn_error", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        debug!(error_code = %self.request.error_code, "reporting bpmn error");
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "bpmnError"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureRequest {
    worker_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_details: Option<String>,
    retries: u32,
    retry_timeout: u64,
}

/// Reports a failure of an external task.
///
/// With no retries left an incident is created.
#[derive(Debug)]
pub struct HandleExternalTaskFailureBuilder {
    client: Client,
    id: String,
    request: FailureRequest,
}

impl HandleExternalTaskFailureBuilder {
    /// Create a new handle failure builder; by default no retries are left.
    pub fn new<T: Into<String>, W: Into<String>>(client: Client, id: T, worker_id: W) -> Self {
        HandleExternalTaskFailureBuilder {
            client,
            id: id.into(),
            request: FailureRequest {
                worker_id: worker_id.into(),
                ..Default::default()
            },
        }
    }

    /// Set the error message.
    pub fn with_error_message<T: Into<String>>(mut self, error_message: T) -> Self {
        self.request.error_message = Some(error_message.into());
        self
    }

    /// Set detailed error information, e.g. a stack trace.
    pub fn with_error_details<T: Into<String>>(mut self, error_details: T) -> Self {
        self.request.error_details = Some(error_details.into());
        self
    }

    /// Set the remaining retries.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.request.retries = retries;
        self
    }

    /// Set the time before the task may be fetched again.
    pub fn with_retry_timeout(mut self, retry_timeout: Duration) -> Self {
        self.request.retry_timeout = retry_timeout.as_millis() as u64;
        self
    }

    /// Submit the failure.
    #[tracing::instrument(skip(self), name = "handle_external_task_failure", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        debug!(retries = self.request.retries, message = ?self.request.error_message, "reporting failure");
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "failure"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

/// Releases the lock of an external task.
#[derive(Debug)]
pub struct UnlockExternalTaskBuilder {
    client: Client,
    id: String,
}

impl UnlockExternalTaskBuilder {
    /// Create a new unlock builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        UnlockExternalTaskBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the unlock request.
    #[tracing::instrument(skip(self), name = "unlock_external_task", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "unlock"])
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtendLockRequest {
    new_duration: u64,
    worker_id: String,
}

/// Extends the lock of an external task, counted from now.
#[derive(Debug)]
pub struct ExtendLockBuilder {
    client: Client,
    id: String,
    request: ExtendLockRequest,
}

impl ExtendLockBuilder {
    /// Create a new extend lock builder.
    pub fn new<T: Into<String>, W: Into<String>>(
        client: Client,
        id: T,
        worker_id: W,
        new_duration: Duration,
    ) -> Self {
        ExtendLockBuilder {
            client,
            id: id.into(),
            request: ExtendLockRequest {
                new_duration: new_duration.as_millis() as u64,
                worker_id: worker_id.into(),
            },
        }
    }

    /// Submit the extend lock request.
    #[tracing::instrument(skip(self), name = "extend_external_task_lock", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "extendLock"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct PriorityRequest {
    priority: i64,
}

/// Sets the priority of an external task.
#[derive(Debug)]
pub struct SetExternalTaskPriorityBuilder {
    client: Client,
    id: String,
    request: PriorityRequest,
}

impl SetExternalTaskPriorityBuilder {
    /// Create a new set priority builder.
    pub fn new<T: Into<String>>(client: Client, id: T, priority: i64) -> Self {
        SetExternalTaskPriorityBuilder {
            client,
            id: id.into(),
            request: PriorityRequest { priority },
        }
    }

    /// Submit the set priority request.
    #[tracing::instrument(skip(self), name = "set_external_task_priority", fields(id = %self.id), err)]
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

/// Sets the retries of an external task.
#[derive(Debug)]
pub struct SetExternalTaskRetriesBuilder {
    client: Client,
    id: String,
    request: RetriesRequest,
}

impl SetExternalTaskRetriesBuilder {
    /// Create a new set retries builder.
    pub fn new<T: Into<String>>(client: Client, id: T, retries: u32) -> Self {
        SetExternalTaskRetriesBuilder {
            client,
            id: id.into(),
            request: RetriesRequest { retries },
        }
    }

    /// Submit the set retries request.
    #[tracing::instrument(skip(self), name = "set_external_task_retries", fields(id = %self.id), err)]
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
struct BulkRetriesRequest {
    retries: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    external_task_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    process_instance_ids: Vec<String>,
}

/// Sets the retries of several external tasks, synchronously or in a batch.
#[derive(Debug)]
pub struct SetExternalTasksRetriesBuilder {
    client: Client,
    request: BulkRetriesRequest,
}

impl SetExternalTasksRetriesBuilder {
    /// Create a new bulk set retries builder.
    pub fn new(client: Client, retries: u32) -> Self {
        SetExternalTasksRetriesBuilder {
            client,
            request: BulkRetriesRequest {
                retries,
                ..Default::default()
            },
        }
    }

    /// Set the retries of the given external tasks.
    pub fn with_external_task_ids(mut self, ids: Vec<String>) -> Self {
        self.request.external_task_ids = ids;
        self
    }

    /// Set the retries of all external tasks of the given process instances.
    pub fn with_process_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.request.process_instance_ids = ids;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.request.external_task_ids.is_empty() && self.request.process_instance_ids.is_empty() {
            return Err(Error::InvalidParameters(
                "external task ids or process instance ids must be set",
            ));
        }
        Ok(())
    }

    /// Set the retries synchronously.
    #[tracing::instrument(skip(self), name = "set_external_task_retries_sync", err)]
    pub async fn send(self) -> Result<()> {
        self.validate()?;
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::PUT, [RESOURCE, "retries"])
            .json(&self.request)
            .send_empty()
            .await
    }

    /// Set the retries asynchronously in a batch.
    #[tracing::instrument(skip(self), name = "set_external_task_retries_async", err)]
    pub async fn send_async(self) -> Result<Batch> {
        self.validate()?;
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, "retries-async"])
            .json(&self.request)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicNamesQuery {
    #[serde(skip_serializing_if = "is_false")]
    with_locked_tasks: bool,
    #[serde(skip_serializing_if = "is_false")]
    with_unlocked_tasks: bool,
    #[serde(skip_serializing_if = "is_false")]
    with_retries_left: bool,
}

/// Lists the topic names of external tasks.
#[derive(Debug)]
pub struct GetTopicNamesBuilder {
    client: Client,
    query: TopicNamesQuery,
}

impl GetTopicNamesBuilder {
    /// Create a new get topic names builder.
    pub fn new(client: Client) -> Self {
        GetTopicNamesBuilder {
            client,
            query: TopicNamesQuery::default(),
        }
    }

    /// Only include topics with locked tasks.
    pub fn with_locked_tasks(mut self) -> Self {
        self.query.with_locked_tasks = true;
        self
    }

    /// Only include topics with unlocked tasks.
    pub fn with_unlocked_tasks(mut self) -> Self {
        self.query.with_unlocked_tasks = true;
        self
    }

    /// Only include topics with tasks that have retries left.
    pub fn with_retries_left(mut self) -> Self {
        self.query.with_retries_left = true;
        self
    }

    /// Submit the get topic names request.
    #[tracing::instrument(skip(self), name = "get_external_task_topic_names", err)]
    pub async fn send(self) -> Result<Vec<String>> {
        self.client
            .request(Method::GET, [RESOURCE, "topic-names"])
            .query(&self.query)
            .send()
            .await
    }
}

/// Retrieves the error details of the last failure of an external task.
#[derive(Debug)]
pub struct GetExternalTaskErrorDetailsBuilder {
    client: Client,
    id: String,
}

impl GetExternalTaskErrorDetailsBuilder {
    /// Create a new get error details builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetExternalTaskErrorDetailsBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get error details request.
    #[tracing::instrument(skip(self), name = "get_external_task_error_details", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<String> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "errorDetails"])
            .send_text()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fetch_topics_render_milliseconds() {
        let topic = FetchTopic::new("invoice", Duration::from_secs(30))
            .with_variables(vec!["amount".to_owned()])
            .with_process_variable("region", "emea");

        assert_eq!(
            serde_json::to_value(&topic).unwrap(),
            json!({
                "topicName": "invoice",
                "lockDuration": 30000,
                "variables": ["amount"],
                "processVariables": {"region": "emea"}
            })
        );
    }

    #[test]
    fn locked_task_variables_are_typed() {
        let task: LockedExternalTask = serde_json::from_value(json!({
            "activityId": "archive",
            "activityInstanceId": "archive:1",
            "errorMessage": null,
            "errorDetails": null,
            "executionId": "ex-1",
            "id": "et-1",
            "lockExpirationTime": "2024-01-02T03:04:05.000+0000",
            "processDefinitionId": "invoice:1:7",
            "processDefinitionKey": "invoice",
            "processInstanceId": "pi-1",
            "retries": null,
            "workerId": "worker-1",
            "priority": 0,
            "topicName": "invoice",
            "businessKey": null,
            "tenantId": null,
            "variables": {"amount": {"type": "Integer", "value": 30, "valueInfo": {}}}
        }))
        .unwrap();

        assert_eq!(task.variable::<i32>("amount").unwrap().unwrap(), 30);
        assert!(task.variable::<i32>("missing").is_none());
    }
}
