use crate::{
    client::Client,
    processdef::FormVariablesQuery,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery},
    util,
    variable::{Variable, VariableFilter, Variables},
    Error, Result,
};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const RESOURCE: &str = "task";

/// Delegation state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelegationState {
    /// the task was delegated and waits to be resolved
    Pending,
    /// the delegate resolved the task
    Resolved,
}

/// A user task.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// the id of the task
    pub id: String,
    /// the name of the task
    pub name: Option<String>,
    /// the user the task is assigned to
    pub assignee: Option<String>,
    /// the owner of the task
    pub owner: Option<String>,
    /// when the task was created
    #[serde(default, with = "util::timestamp::option")]
    pub created: Option<DateTime<Utc>>,
    /// the due date of the task
    #[serde(default, with = "util::timestamp::option")]
    pub due: Option<DateTime<Utc>>,
    /// the follow-up date of the task
    #[serde(default, with = "util::timestamp::option")]
    pub follow_up: Option<DateTime<Utc>>,
    /// the delegation state of the task
    pub delegation_state: Option<DelegationState>,
    /// the description of the task
    pub description: Option<String>,
    /// the execution the task belongs to
    pub execution_id: Option<String>,
    /// the parent task
    pub parent_task_id: Option<String>,
    /// the priority of the task
    pub priority: i32,
    /// the process definition of the task
    pub process_definition_id: Option<String>,
    /// the process instance of the task
    pub process_instance_id: Option<String>,
    /// the case execution of the task
    pub case_execution_id: Option<String>,
    /// the case definition of the task
    pub case_definition_id: Option<String>,
    /// the case instance of the task
    pub case_instance_id: Option<String>,
    /// the id of the task in the process model
    pub task_definition_key: Option<String>,
    /// whether the task is suspended
    #[serde(default)]
    pub suspended: bool,
    /// the form key of the task
    pub form_key: Option<String>,
    /// the tenant of the task
    pub tenant_id: Option<String>,
}

/// Keys tasks can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskSortKey {
    /// process instance id
    InstanceId,
    /// case instance id
    CaseInstanceId,
    /// due date
    DueDate,
    /// follow-up date
    FollowUpDate,
    /// execution id
    ExecutionId,
    /// assignee
    Assignee,
    /// creation time
    Created,
    /// description
    Description,
    /// task id
    Id,
    /// name
    Name,
    /// name, ignoring case
    NameCaseInsensitive,
    /// priority
    Priority,
    /// tenant id
    TenantId,
}

/// Filter for task queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    process_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_instance_business_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_definition_key_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    activity_instance_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_user: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    include_assigned_tasks: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    involved_user: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    assigned: bool,
    #[serde(skip_serializing_if = "is_false")]
    unassigned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_definition_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    task_definition_key_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_priority: Option<i32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    due_before: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    due_after: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    follow_up_before: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    follow_up_after: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    created_before: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    created_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delegation_state: Option<DelegationState>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
    #[serde(skip_serializing_if = "is_false")]
    active: bool,
    #[serde(skip_serializing_if = "is_false")]
    suspended: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    task_variables: Vec<VariableFilter>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_variables: Vec<VariableFilter>,
}

impl ListQuery for TaskQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = TaskSortKey;
    type Item = Task;
}

impl TaskQuery {
    /// An empty filter matching all tasks.
    pub fn new() -> Self {
        TaskQuery::default()
    }

    /// Filter by process instance id.
    pub fn with_process_instance_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_instance_id = Some(id.into());
        self
    }

    /// Filter by business key of the process instance.
    pub fn with_process_instance_business_key<T: Into<String>>(mut self, business_key: T) -> Self {
        self.process_instance_business_key = Some(business_key.into());
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

    /// Only include tasks of definitions with one of the keys.
    pub fn with_process_definition_keys(mut self, keys: Vec<String>) -> Self {
        self.process_definition_key_in = keys;
        self
    }

    /// Filter by process definition name.
    pub fn with_process_definition_name<T: Into<String>>(mut self, name: T) -> Self {
        self.process_definition_name = Some(name.into());
        self
    }

    /// Filter by execution id.
    pub fn with_execution_id<T: Into<String>>(mut self, id: T) -> Self {
        self.execution_id = Some(id.into());
        self
    }

    /// Only include tasks of the given activity instances.
    pub fn with_activity_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.activity_instance_id_in = ids;
        self
    }

    /// Filter by assignee.
    pub fn with_assignee<T: Into<String>>(mut self, assignee: T) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Filter by a `LIKE` pattern on the assignee.
    pub fn with_assignee_like<T: Into<String>>(mut self, assignee_like: T) -> Self {
        self.assignee_like = Some(assignee_like.into());
        self
    }

    /// Filter by owner.
    pub fn with_owner<T: Into<String>>(mut self, owner: T) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Only include tasks offered to the group.
    pub fn with_candidate_group<T: Into<String>>(mut self, group: T) -> Self {
        self.candidate_group = Some(group.into());
        self
    }

    /// Only include tasks offered to the user.
    pub fn with_candidate_user<T: Into<String>>(mut self, user: T) -> Self {
        self.candidate_user = Some(user.into());
        self
    }

    /// Also include assigned tasks in candidate queries.
    pub fn include_assigned_tasks(mut self) -> Self {
        self.include_assigned_tasks = true;
        self
    }

    /// Only include tasks the user is involved in.
    pub fn with_involved_user<T: Into<String>>(mut self, user: T) -> Self {
        self.involved_user = Some(user.into());
        self
    }

    /// Only include assigned tasks.
    pub fn assigned(mut self) -> Self {
        self.assigned = true;
        self
    }

    /// Only include unassigned tasks.
    pub fn unassigned(mut self) -> Self {
        self.unassigned = true;
        self
    }

    /// Filter by task definition key.
    pub fn with_task_definition_key<T: Into<String>>(mut self, key: T) -> Self {
        self.task_definition_key = Some(key.into());
        self
    }

    /// Only include tasks with one of the task definition keys.
    pub fn with_task_definition_keys(mut self, keys: Vec<String>) -> Self {
        self.task_definition_key_in = keys;
        self
    }

    /// Filter by name.
    pub fn with_name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by a `LIKE` pattern on the name.
    pub fn with_name_like<T: Into<String>>(mut self, name_like: T) -> Self {
        self.name_like = Some(name_like.into());
        self
    }

    /// Filter by description.
    pub fn with_description<T: Into<String>>(mut self, description: T) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Filter by priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Only include tasks with at least the priority.
    pub fn with_min_priority(mut self, priority: i32) -> Self {
        self.min_priority = Some(priority);
        self
    }

    /// Only include tasks with at most the priority.
    pub fn with_max_priority(mut self, priority: i32) -> Self {
        self.max_priority = Some(priority);
        self
    }

    /// Only include tasks due before the given time.
    pub fn with_due_before(mut self, before: DateTime<Utc>) -> Self {
        self.due_before = Some(before);
        self
    }

    /// Only include tasks due after the given time.
    pub fn with_due_after(mut self, after: DateTime<Utc>) -> Self {
        self.due_after = Some(after);
        self
    }

    /// Only include tasks with a follow-up date before the given time.
    pub fn with_follow_up_before(mut self, before: DateTime<Utc>) -> Self {
        self.follow_up_before = Some(before);
        self
    }

    /// Only include tasks with a follow-up date after the given time.
    pub fn with_follow_up_after(mut self, after: DateTime<Utc>) -> Self {
        self.follow_up_after = Some(after);
        self
    }

    /// Only include tasks created before the given time.
    pub fn with_created_before(mut self, before: DateTime<Utc>) -> Self {
        self.created_before = Some(before);
        self
    }

    /// Only include tasks created after the given time.
    pub fn with_created_after(mut self, after: DateTime<Utc>) -> Self {
        self.created_after = Some(after);
        self
    }

    /// Filter by delegation state.
    pub fn with_delegation_state(mut self, state: DelegationState) -> Self {
        self.delegation_state = Some(state);
        self
    }

    /// Only include tasks of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include tasks without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.without_tenant_id = true;
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

    /// Only include tasks with a matching task variable.
    pub fn with_task_variable(mut self, filter: VariableFilter) -> Self {
        self.task_variables.push(filter);
        self
    }

    /// Only include tasks whose process instance has a matching variable.
    pub fn with_process_variable(mut self, filter: VariableFilter) -> Self {
        self.process_variables.push(filter);
        self
    }
}

/// Queries tasks.
pub type GetTaskListBuilder = ListBuilder<TaskQuery>;
/// Counts tasks.
pub type CountTasksBuilder = CountBuilder<TaskQuery>;

/// A user or group related to a task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityLink {
    /// the user of the link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// the group of the link
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// the kind of link, e.g. `assignee`, `candidate` or `owner`
    #[serde(rename = "type")]
    pub link_type: String,
}

impl IdentityLink {
    /// A link to a user.
    pub fn user<T: Into<String>, L: Into<String>>(user_id: T, link_type: L) -> Self {
        IdentityLink {
            user_id: Some(user_id.into()),
            group_id: None,
            link_type: link_type.into(),
        }
    }

    /// A link to a group.
    pub fn group<T: Into<String>, L: Into<String>>(group_id: T, link_type: L) -> Self {
        IdentityLink {
            user_id: None,
            group_id: Some(group_id.into()),
            link_type: link_type.into(),
        }
    }
}

/// A comment on a task.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// the id of the comment
    pub id: String,
    /// the author of the comment
    pub user_id: Option<String>,
    /// the task the comment belongs to
    pub task_id: String,
    /// when the comment was written
    #[serde(default, with = "util::timestamp::option")]
    pub time: Option<DateTime<Utc>>,
    /// the comment text
    pub message: String,
}

impl Client {
    /// Queries tasks matching a filter.
    pub fn get_task_list(&self, query: TaskQuery) -> GetTaskListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts tasks matching a filter.
    pub fn count_tasks(&self, query: TaskQuery) -> CountTasksBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single task.
    pub fn get_task<T: Into<String>>(&self, id: T) -> GetTaskBuilder {
        GetTaskBuilder::new(self.clone(), id)
    }

    /// Creates a standalone task.
    pub fn create_task(&self) -> SaveTaskBuilder {
        SaveTaskBuilder::create(self.clone())
    }

    /// Updates a task; every property not set on the builder is cleared.
    pub fn update_task<T: Into<String>>(&self, id: T) -> SaveTaskBuilder {
        SaveTaskBuilder::update(self.clone(), id)
    }

    /// Deletes a standalone task.
    pub fn delete_task<T: Into<String>>(&self, id: T) -> DeleteTaskBuilder {
        DeleteTaskBuilder::new(self.clone(), id)
    }

    /// Claims a task for a user.
    pub fn claim_task<T: Into<String>, U: Into<String>>(&self, id: T, user_id: U) -> TaskUserBuilder {
        TaskUserBuilder::new(self.clone(), id, TaskUserAction::Claim, user_id)
    }

    /// Resets the assignee of a task.
    pub fn unclaim_task<T: Into<String>>(&self, id: T) -> UnclaimTaskBuilder {
        UnclaimTaskBuilder::new(self.clone(), id)
    }

    /// Sets the assignee of a task, regardless of a current assignee.
    pub fn set_task_assignee<T: Into<String>, U: Into<String>>(
        &self,
        id: T,
        user_id: U,
    ) -> TaskUserBuilder {
        TaskUserBuilder::new(self.clone(), id, TaskUserAction::SetAssignee, user_id)
    }

    /// Delegates a task to a user.
    pub fn delegate_task<T: Into<String>, U: Into<String>>(
        &self,
        id: T,
        user_id: U,
    ) -> TaskUserBuilder {
        TaskUserBuilder::new(self.clone(), id, TaskUserAction::Delegate, user_id)
    }

    /// Resolves a delegated task, handing it back to its owner.
    pub fn resolve_task<T: Into<String>>(&self, id: T) -> CompleteTaskBuilder {
        CompleteTaskBuilder::new(self.clone(), id, "resolve")
    }

    /// Completes a task.
    pub fn complete_task<T: Into<String>>(&self, id: T) -> CompleteTaskBuilder {
        CompleteTaskBuilder::new(self.clone(), id, "complete")
    }

    /// Completes a task by submitting its form.
    pub fn submit_task_form<T: Into<String>>(&self, id: T) -> CompleteTaskBuilder {
        CompleteTaskBuilder::new(self.clone(), id, "submit-form")
    }

    /// Retrieves the variables of the form of a task.
    pub fn get_task_form_variables<T: Into<String>>(&self, id: T) -> GetTaskFormVariablesBuilder {
        GetTaskFormVariablesBuilder::new(self.clone(), id)
    }

    /// Reports a BPMN error from a task.
    pub fn handle_task_bpmn_error<T: Into<String>, C: Into<String>>(
        &self,
        id: T,
        error_code: C,
    ) -> HandleTaskBpmnErrorBuilder {
        HandleTaskBpmnErrorBuilder::new(self.clone(), id, error_code)
    }

    /// Reports a BPMN escalation from a task.
    pub fn handle_task_escalation<T: Into<String>, C: Into<String>>(
        &self,
        id: T,
        escalation_code: C,
    ) -> HandleTaskEscalationBuilder {
        HandleTaskEscalationBuilder::new(self.clone(), id, escalation_code)
    }

    /// Lists the identity links of a task.
    pub fn get_task_identity_links<T: Into<String>>(&self, id: T) -> GetIdentityLinksBuilder {
        GetIdentityLinksBuilder::new(self.clone(), id)
    }

    /// Adds an identity link to a task.
    pub fn add_task_identity_link<T: Into<String>>(
        &self,
        id: T,
        link: IdentityLink,
    ) -> IdentityLinkBuilder {
        IdentityLinkBuilder::new(self.clone(), id, link, false)
    }

    /// Removes an identity link from a task.
    pub fn delete_task_identity_link<T: Into<String>>(
        &self,
        id: T,
        link: IdentityLink,
    ) -> IdentityLinkBuilder {
        IdentityLinkBuilder::new(self.clone(), id, link, true)
    }

    /// Lists the comments of a task.
    pub fn get_task_comments<T: Into<String>>(&self, id: T) -> GetCommentsBuilder {
        GetCommentsBuilder::new(self.clone(), id)
    }

    /// Retrieves a single comment of a task.
    pub fn get_task_comment<T: Into<String>, C: Into<String>>(
        &self,
        id: T,
        comment_id: C,
    ) -> GetCommentBuilder {
        GetCommentBuilder::new(self.clone(), id, comment_id)
    }

    /// Adds a comment to a task.
    pub fn create_task_comment<T: Into<String>, M: Into<String>>(
        &self,
        id: T,
        message: M,
    ) -> CreateCommentBuilder {
        CreateCommentBuilder::new(self.clone(), id, message)
    }
}

/// Retrieves a single task.
#[derive(Debug)]
pub struct GetTaskBuilder {
    client: Client,
    id: String,
}

impl GetTaskBuilder {
    /// Create a new get task builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetTaskBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get task request.
    #[tracing::instrument(skip(self), name = "get_task", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Task> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    assignee: Option<String>,
    owner: Option<String>,
    delegation_state: Option<DelegationState>,
    #[serde(with = "util::timestamp::option")]
    due: Option<DateTime<Utc>>,
    #[serde(with = "util::timestamp::option")]
    follow_up: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<i32>,
    parent_task_id: Option<String>,
    case_instance_id: Option<String>,
    tenant_id: Option<String>,
}

/// Creates a standalone task or updates an existing task.
///
/// The engine replaces all properties of the task, so unset properties are
/// sent as `null`.
#[derive(Debug)]
pub struct SaveTaskBuilder {
    client: Client,
    target: Option<String>,
    request: TaskRequest,
}

impl SaveTaskBuilder {
    /// Create a builder for a new task.
    pub fn create(client: Client) -> Self {
        SaveTaskBuilder {
            client,
            target: None,
            request: TaskRequest::default(),
        }
    }

    /// Create a builder updating an existing task.
    pub fn update<T: Into<String>>(client: Client, id: T) -> Self {
        SaveTaskBuilder {
            client,
            target: Some(id.into()),
            request: TaskRequest::default(),
        }
    }

    /// Set the id of a new task; generated by the engine if unset.
    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.request.id = Some(id.into());
        self
    }

    /// Set the name.
    pub fn with_name<T: Into<String>>(mut self, name: T) -> Self {
        self.request.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description<T: Into<String>>(mut self, description: T) -> Self {
        self.request.description = Some(description.into());
        self
    }

    /// Set the assignee.
    pub fn with_assignee<T: Into<String>>(mut self, assignee: T) -> Self {
        self.request.assignee = Some(assignee.into());
        self
    }

    /// Set the owner.
    pub fn with_owner<T: Into<String>>(mut self, owner: T) -> Self {
        self.request.owner = Some(owner.into());
        self
    }

    /// Set the delegation state.
    pub fn with_delegation_state(mut self, state: DelegationState) -> Self {
        self.request.delegation_state = Some(state);
        self
    }

    /// Set the due date.
    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.request.due = Some(due);
        self
    }

    /// Set the follow-up date.
    pub fn with_follow_up(mut self, follow_up: DateTime<Utc>) -> Self {
        self.request.follow_up = Some(follow_up);
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.request.priority = Some(priority);
        self
    }

    /// Set the parent task.
    pub fn with_parent_task_id<T: Into<String>>(mut self, parent_task_id: T) -> Self {
        self.request.parent_task_id = Some(parent_task_id.into());
        self
    }

    /// Link the task to a case instance.
    pub fn with_case_instance_id<T: Into<String>>(mut self, case_instance_id: T) -> Self {
        self.request.case_instance_id = Some(case_instance_id.into());
        self
    }

    /// Set the tenant.
    pub fn with_tenant_id<T: Into<String>>(mut self, tenant_id: T) -> Self {
        self.request.tenant_id = Some(tenant_id.into());
        self
    }

    /// Submit the task.
    #[tracing::instrument(skip(self), name = "save_task", err)]
    pub async fn send(self) -> Result<()> {
        trace!(req = ?self.request, "request:");
        let request = match &self.target {
            Some(id) => {
                debug!(%id, "updating task");
                self.client.request(Method::PUT, [RESOURCE, id.as_str()])
            }
            None => {
                debug!(id = ?self.request.id, "creating task");
                self.client.request(Method::POST, [RESOURCE, "create"])
            }
        };
        request.json(&self.request).send_empty().await
    }
}

/// Deletes a standalone task.
#[derive(Debug)]
pub struct DeleteTaskBuilder {
    client: Client,
    id: String,
}

impl DeleteTaskBuilder {
    /// Create a new delete task builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteTaskBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the delete task request.
    #[tracing::instrument(skip(self), name = "delete_task", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .send_empty()
            .await
    }
}

/// Operations assigning a task to a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskUserAction {
    /// claim an unassigned task
    Claim,
    /// set the assignee
    SetAssignee,
    /// delegate the task
    Delegate,
}

impl TaskUserAction {
    fn path(self) -> &'static str {
        match self {
            TaskUserAction::Claim => "claim",
            TaskUserAction::SetAssignee => "assignee",
            TaskUserAction::Delegate => "delegate",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserRequest {
    user_id: String,
}

/// Claims, assigns or delegates a task.
#[derive(Debug)]
pub struct TaskUserBuilder {
    client: Client,
    id: String,
    action: TaskUserAction,
    request: UserRequest,
}

impl TaskUserBuilder {
    /// Create a new task user builder.
    pub fn new<T: Into<String>, U: Into<String>>(
        client: Client,
        id: T,
        action: TaskUserAction,
        user_id: U,
    ) -> Self {
        TaskUserBuilder {
            client,
            id: id.into(),
            action,
            request: UserRequest {
                user_id: user_id.into(),
            },
        }
    }

    /// Submit the request.
    #[tracing::instrument(skip(self), name = "task_user", fields(id = %self.id, action = ?self.action), err)]
    pub async fn send(self) -> Result<()> {
        debug!(user_id = %self.request.user_id, "updating task user");
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), self.action.path()])
            .json(&self.request)
            .send_empty()
            .await
    }
}

/// Resets the assignee of a task.
#[derive(Debug)]
pub struct UnclaimTaskBuilder {
    client: Client,
    id: String,
}

impl UnclaimTaskBuilder {
    /// Create a new unclaim task builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        UnclaimTaskBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the unclaim request.
    #[tracing::instrument(skip(self), name = "unclaim_task", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "unclaim"])
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteTaskRequest {
    variables: Variables,
    #[serde(skip_serializing_if = "is_false")]
    with_variables_in_return: bool,
}

/// Completes, resolves or submits the form of a task.
#[derive(Debug)]
pub struct CompleteTaskBuilder {
    client: Client,
    id: String,
    operation: &'static str,
    request: CompleteTaskRequest,
}

impl CompleteTaskBuilder {
    /// Create a new builder for the `complete`, `resolve` or `submit-form`
    /// operation.
    pub fn new<T: Into<String>>(client: Client, id: T, operation: &'static str) -> Self {
        CompleteTaskBuilder {
            client,
            id: id.into(),
            operation,
            request: CompleteTaskRequest::default(),
        }
    }

    /// Set a variable.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Set variables.
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.request.variables.extend(variables);
        self
    }

    /// Return the process variables after completion; not supported by
    /// `resolve`.
    pub fn with_variables_in_return(mut self, with_variables_in_return: bool) -> Self {
        self.request.with_variables_in_return = with_variables_in_return;
        self
    }

    /// Submit the request. Variables are only returned when requested.
    #[tracing::instrument(skip(self), name = "complete_task", fields(id = %self.id, operation = self.operation), err)]
    pub async fn send(self) -> Result<Option<Variables>> {
        if self.operation == "resolve" && self.request.with_variables_in_return {
            return Err(Error::InvalidParameters(
                "resolving a task cannot return variables",
            ));
        }
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), self.operation])
            .json(&self.request)
            .send_optional()
            .await
    }
}

/// Retrieves the variables of a task form.
#[derive(Debug)]
pub struct GetTaskFormVariablesBuilder {
    client: Client,
    id: String,
    query: FormVariablesQuery,
}

impl GetTaskFormVariablesBuilder {
    /// Create a new get task form variables builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetTaskFormVariablesBuilder {
            client,
            id: id.into(),
            query: FormVariablesQuery::default(),
        }
    }

    /// Only fetch the named variables.
    pub fn with_variable_names(mut self, variable_names: Vec<String>) -> Self {
        self.query.variable_names = variable_names;
        self
    }

    /// Whether `Object` values are deserialized on the server.
    pub fn with_deserialize_values(mut self, deserialize_values: bool) -> Self {
        self.query.deserialize_values = (!deserialize_values).then_some(false);
        self
    }

    /// Submit the get task form variables request.
    #[tracing::instrument(skip(self), name = "get_task_form_variables", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Variables> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "form-variables"])
            .query(&self.query)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BpmnErrorRequest {
    error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
}

/// Reports a BPMN error from a task, to be caught by a boundary event.
#[derive(Debug)]
pub struct HandleTaskBpmnErrorBuilder {
    client: Client,
    id: String,
    request: BpmnErrorRequest,
}

impl HandleTaskBpmnErrorBuilder {
    /// Create a new handle BPMN error builder.
    pub fn new<T: Into<String>, C: Into<String>>(client: Client, id: T, error_code: C) -> Self {
        HandleTaskBpmnErrorBuilder {
            client,
            id: id.into(),
            request: BpmnErrorRequest {
                error_code: error_code.into(),
                error_message: None,
                variables: Variables::new(),
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
    #[tracing::instrument(skip(self), name = "handle_task_bpmn_error", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        debug!(error_code = %self.request.error_code, "reporting bpmn error");
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "bpmnError"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EscalationRequest {
    escalation_code: String,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
}

/// Reports a BPMN escalation from a task.
#[derive(Debug)]
pub struct HandleTaskEscalationBuilder {
    client: Client,
    id: String,
    request: EscalationRequest,
}

impl HandleTaskEscalationBuilder {
    /// Create a new handle escalation builder.
    pub fn new<T: Into<String>, C: Into<String>>(client: Client, id: T, escalation_code: C) -> Self {
        HandleTaskEscalationBuilder {
            client,
            id: id.into(),
            request: EscalationRequest {
                escalation_code: escalation_code.into(),
                variables: Variables::new(),
            },
        }
    }

    /// Set a variable passed to the catching event.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Submit the escalation.
    #[tracing::instrument(skip(self), name = "handle_task_escalation", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "bpmnEscalation"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
struct IdentityLinkQuery {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    link_type: Option<String>,
}

/// Lists the identity links of a task.
#[derive(Debug)]
pub struct GetIdentityLinksBuilder {
    client: Client,
    id: String,
    query: IdentityLinkQuery,
}

impl GetIdentityLinksBuilder {
    /// Create a new get identity links builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetIdentityLinksBuilder {
            client,
            id: id.into(),
            query: IdentityLinkQuery::default(),
        }
    }

    /// Only list links of the given type.
    pub fn with_type<T: Into<String>>(mut self, link_type: T) -> Self {
        self.query.link_type = Some(link_type.into());
        self
    }

    /// Submit the get identity links request.
    #[tracing::instrument(skip(self), name = "get_task_identity_links", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Vec<IdentityLink>> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "identity-links"])
            .query(&self.query)
            .send()
            .await
    }
}

/// Adds or removes an identity link of a task.
#[derive(Debug)]
pub struct IdentityLinkBuilder {
    client: Client,
    id: String,
    link: IdentityLink,
    delete: bool,
}

impl IdentityLinkBuilder {
    /// Create a new identity link builder; `delete` removes the link.
    pub fn new<T: Into<String>>(client: Client, id: T, link: IdentityLink, delete: bool) -> Self {
        IdentityLinkBuilder {
            client,
            id: id.into(),
            link,
            delete,
        }
    }

    /// Submit the identity link request.
    #[tracing::instrument(skip(self), name = "task_identity_link", fields(id = %self.id, delete = self.delete), err)]
    pub async fn send(self) -> Result<()> {
        if self.link.user_id.is_some() == self.link.group_id.is_some() {
            return Err(Error::InvalidParameters(
                "exactly one of user id and group id must be set",
            ));
        }
        let mut segments = vec![RESOURCE, self.id.as_str(), "identity-links"];
        if self.delete {
            segments.push("delete");
        }
        self.client
            .request(Method::POST, segments)
            .json(&self.link)
            .send_empty()
            .await
    }
}

/// Lists the comments of a task.
#[derive(Debug)]
pub struct GetCommentsBuilder {
    client: Client,
    id: String,
}

impl GetCommentsBuilder {
    /// Create a new get comments builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetCommentsBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get comments request.
    #[tracing::instrument(skip(self), name = "get_task_comments", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Vec<Comment>> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "comment"])
            .send()
            .await
    }
}

/// Retrieves a single comment of a task.
#[derive(Debug)]
pub struct GetCommentBuilder {
    client: Client,
    id: String,
    comment_id: String,
}

impl GetCommentBuilder {
    /// Create a new get comment builder.
    pub fn new<T: Into<String>, C: Into<String>>(client: Client, id: T, comment_id: C) -> Self {
        GetCommentBuilder {
            client,
            id: id.into(),
            comment_id: comment_id.into(),
        }
    }

    /// Submit the get comment request.
    #[tracing::instrument(skip(self), name = "get_task_comment", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Comment> {
        self.client
            .request(
                Method::GET,
                [RESOURCE, self.id.as_str(), "comment", self.comment_id.as_str()],
            )
            .send()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct CommentRequest {
    message: String,
}

/// Adds a comment to a task.
#[derive(Debug)]
pub struct CreateCommentBuilder {
    client: Client,
    id: String,
    request: CommentRequest,
}

impl CreateCommentBuilder {
    /// Create a new create comment builder.
    pub fn new<T: Into<String>, M: Into<String>>(client: Client, id: T, message: M) -> Self {
        CreateCommentBuilder {
            client,
            id: id.into(),
            request: CommentRequest {
                message: message.into(),
            },
        }
    }

    /// Submit the comment.
    #[tracing::instrument(skip(self), name = "create_task_comment", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Comment> {
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "comment", "create"])
            .json(&self.request)
            .send()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_parses_engine_payload() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-1",
            "name": "Approve Invoice",
            "assignee": "demo",
            "created": "2024-01-02T03:04:05.000+0000",
            "due": null,
            "followUp": null,
            "delegationState": "PENDING",
            "description": null,
            "executionId": "ex-1",
            "owner": null,
            "parentTaskId": null,
            "priority": 50,
            "processDefinitionId": "invoice:1:7",
            "processInstanceId": "pi-1",
            "taskDefinitionKey": "approve",
            "caseExecutionId": null,
            "caseInstanceId": null,
            "caseDefinitionId": null,
            "suspended": false,
            "formKey": "embedded:app:forms/approve.html",
            "tenantId": null
        }))
        .unwrap();

        assert_eq!(task.delegation_state, Some(DelegationState::Pending));
        assert_eq!(task.priority, 50);
        assert_eq!(
            task.created.map(|created| util::format_timestamp(&created)).as_deref(),
            Some("2024-01-02T03:04:05.000+0000")
        );
    }

    #[test]
    fn saved_task_clears_unset_properties() {
        let request = TaskRequest {
            name: Some("Review".to_owned()),
            priority: Some(10),
            ..Default::default()
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["name"], "Review");
        assert_eq!(body["assignee"], serde_json::Value::Null);
        assert_eq!(body["due"], serde_json::Value::Null);
        assert!(body.get("id").is_none());
    }
}
