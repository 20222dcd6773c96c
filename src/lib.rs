//! A rust client for the REST API of the [Camunda 7] process engine.
//!
//! ## What is Camunda 7?
//!
//! [Camunda 7] is a BPMN workflow and DMN decision engine. Process definitions
//! are deployed to the engine, which runs their instances, creates user tasks
//! for people and external tasks for services, and keeps a history of
//! everything that happened.
//!
//! Every REST operation is a builder obtained from a [`Client`]: set the
//! parameters with `with_*` methods and call `send()`.
//!
//! [Camunda 7]: https://docs.camunda.org/manual/latest/
//!
//! ## Example
//!
//! ```no_run
//! use camunda::{Client, DefinitionRef, LockedExternalTask, Variable};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a client for http://localhost:8080/engine-rest
//!     let client = Client::default();
//!
//!     // Deploy a process
//!     client
//!         .create_deployment("invoice")
//!         .with_resource_file("invoice.bpmn")
//!         .send()
//!         .await?;
//!
//!     // Start a new process instance
//!     client
//!         .start_process_instance(DefinitionRef::key("invoice"))
//!         .with_business_key("INV-1001")
//!         .with_variable("amount", Variable::integer(300))
//!         .send()
//!         .await?;
//!
//!     // Work on the external tasks of a topic
//!     client
//!         .external_task_worker()
//!         .with_topic("payment-service")
//!         .with_worker_id("payments")
//!         .with_handler(handle_task)
//!         .run()
//!         .await?;
//!
//!     Ok(())
//! }
//!
//! async fn handle_task(client: Client, task: LockedExternalTask) {
//!     // your task processing logic...
//!
//!     let _ = client
//!         .complete_external_task(&task.id, "payments")
//!         .send()
//!         .await;
//! }
//! ```
#![warn(
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    while_true
)]

pub(crate) mod activityinst;
pub(crate) mod auth;
pub(crate) mod authorization;
pub(crate) mod batch;
pub(crate) mod client;
pub(crate) mod condition;
pub(crate) mod decisiondef;
pub(crate) mod deployment;
pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod execution;
pub(crate) mod externaltask;
pub(crate) mod filter;
pub(crate) mod group;
pub(crate) mod identity;
pub(crate) mod incident;
pub(crate) mod job;
pub(crate) mod jobdef;
pub(crate) mod message;
pub(crate) mod migration;
pub(crate) mod processdef;
pub(crate) mod processinst;
pub(crate) mod request;
pub(crate) mod signal;
pub(crate) mod task;
pub(crate) mod tenant;
pub(crate) mod user;
pub(crate) mod util;
pub(crate) mod variable;
pub(crate) mod variableinst;
pub(crate) mod worker;

pub use activityinst::{ActivityInstance, TransitionInstance};
pub use auth::Credentials;
pub use authorization::{
    Authorization, AuthorizationCheckResult, AuthorizationQuery, AuthorizationSortKey,
    AuthorizationType, CheckAuthorizationBuilder, CountAuthorizationsBuilder,
    DeleteAuthorizationBuilder, GetAuthorizationBuilder, GetAuthorizationListBuilder,
    ResourceType, SaveAuthorizationBuilder,
};
pub use batch::{
    Batch, BatchQuery, BatchSortKey, BatchStatistics, BatchStatisticsQuery, BatchSuspensionBuilder,
    CountBatchesBuilder, DeleteBatchBuilder, GetBatchBuilder, GetBatchListBuilder,
    GetBatchStatisticsBuilder,
};
pub use client::{Client, ClientConfig};
pub use condition::EvaluateConditionBuilder;
pub use decisiondef::{
    CountDecisionDefinitionsBuilder, DecisionDefinition, DecisionDefinitionQuery,
    DecisionDefinitionSortKey, DecisionDefinitionXml, EvaluateDecisionBuilder,
    GetDecisionDefinitionBuilder, GetDecisionDefinitionListBuilder,
    GetDecisionDefinitionXmlBuilder, UpdateDecisionDefinitionHistoryTimeToLiveBuilder,
};
pub use deployment::{
    CountDeploymentsBuilder, CreateDeploymentBuilder, DeleteDeploymentBuilder, Deployment,
    DeploymentQuery, DeploymentResource, DeploymentSortKey, DeploymentWithDefinitions,
    GetDeploymentBuilder, GetDeploymentListBuilder, GetDeploymentResourceBuilder,
    GetDeploymentResourceDataBuilder, GetDeploymentResourcesBuilder, RedeployBuilder,
};
pub use engine::{GetEngineNamesBuilder, GetVersionBuilder, Version};
pub use error::{ApiError, Error, Result};
pub use execution::{
    CountExecutionsBuilder, EventSubscription, Execution, ExecutionQuery, ExecutionSortKey,
    GetExecutionBuilder, GetExecutionListBuilder, GetMessageSubscriptionBuilder,
    TriggerExecutionBuilder,
};
pub use externaltask::{
    CompleteExternalTaskBuilder, CountExternalTasksBuilder, ExtendLockBuilder, ExternalTask,
    ExternalTaskQuery, ExternalTaskSortKey, FetchAndLockBuilder, FetchTopic,
    GetExternalTaskBuilder, GetExternalTaskErrorDetailsBuilder, GetExternalTaskListBuilder,
    GetTopicNamesBuilder, HandleExternalTaskBpmnErrorBuilder, HandleExternalTaskFailureBuilder,
    LockedExternalTask, SetExternalTaskPriorityBuilder, SetExternalTaskRetriesBuilder,
    SetExternalTasksRetriesBuilder, UnlockExternalTaskBuilder,
};
pub use filter::{
    CountFiltersBuilder, DeleteFilterBuilder, ExecuteFilterBuilder, Filter, FilterQuery,
    FilterSortKey, GetFilterBuilder, GetFilterListBuilder, SaveFilterBuilder,
};
pub use group::{
    CountGroupsBuilder, DeleteGroupBuilder, GetGroupBuilder, GetGroupListBuilder, Group,
    GroupMemberBuilder, GroupQuery, GroupSortKey, SaveGroupBuilder,
};
pub use identity::{
    AuthenticationResult, GetIdentityGroupsBuilder, GroupUser, IdentityGroup, IdentityGroups,
    VerifyUserBuilder,
};
pub use incident::{
    ClearIncidentAnnotationBuilder, CountIncidentsBuilder, GetIncidentBuilder,
    GetIncidentListBuilder, Incident, IncidentQuery, IncidentSortKey, IncidentStatistics,
    IncidentType, ResolveIncidentBuilder, SetIncidentAnnotationBuilder,
};
pub use job::{
    CountJobsBuilder, DeleteJobBuilder, ExecuteJobBuilder, GetJobBuilder, GetJobListBuilder,
    GetJobStacktraceBuilder, Job, JobQuery, JobSortKey, JobSuspensionBuilder,
    RecalculateJobDueDateBuilder, SetJobDueDateBuilder, SetJobPriorityBuilder,
    SetJobRetriesAsyncBuilder, SetJobRetriesBuilder,
};
pub use jobdef::{
    CountJobDefinitionsBuilder, GetJobDefinitionBuilder, GetJobDefinitionListBuilder,
    JobDefinition, JobDefinitionQuery, JobDefinitionSortKey, JobDefinitionSuspensionBuilder,
    SetJobDefinitionPriorityBuilder, SetJobDefinitionRetriesBuilder,
};
pub use message::{CorrelateMessageBuilder, CorrelatedExecution, MessageCorrelationResult, ResultType};
pub use migration::{
    ExecuteMigrationBuilder, GenerateMigrationPlanBuilder, MigrationInstruction,
    MigrationInstructionReport, MigrationPlan, MigrationPlanReport, MigrationVariableReport,
    ValidateMigrationPlanBuilder,
};
pub use processdef::{
    ActivityStatistics, CountProcessDefinitionsBuilder, DeleteProcessDefinitionBuilder,
    GetActivityInstanceStatisticsBuilder, GetProcessDefinitionBuilder,
    GetProcessDefinitionListBuilder, GetProcessDefinitionStatisticsBuilder,
    GetProcessDefinitionXmlBuilder, GetStartFormVariablesBuilder,
    ProcessDefinition, ProcessDefinitionQuery, ProcessDefinitionSortKey,
    ProcessDefinitionStatistics, ProcessDefinitionSuspensionBuilder,
    ProcessDefinitionSuspensionByKeyBuilder, ProcessDefinitionXml, StartProcessInstanceBuilder,
    SubmitStartFormBuilder, UpdateProcessDefinitionHistoryTimeToLiveBuilder,
};
pub use processinst::{
    CountProcessInstancesBuilder, DeleteProcessInstanceBuilder, DeleteProcessInstancesAsyncBuilder,
    GetActivityInstanceBuilder, GetProcessInstanceBuilder, GetProcessInstanceListBuilder,
    Instruction, InstructionType, ModifyProcessInstanceBuilder, ProcessInstance,
    ProcessInstanceQuery, ProcessInstanceSortKey, ProcessInstanceSuspensionBuilder,
    ProcessInstanceWithVariables,
};
pub use request::{
    Count, CountBuilder, DefinitionRef, Link, ListBuilder, ListQuery, OptionsBuilder,
    ResourceOptions, SortOrder, Sorting,
};
pub use signal::ThrowSignalBuilder;
pub use task::{
    Comment, CompleteTaskBuilder, CountTasksBuilder, CreateCommentBuilder, DelegationState,
    DeleteTaskBuilder, GetCommentBuilder, GetCommentsBuilder, GetIdentityLinksBuilder,
    GetTaskBuilder, GetTaskFormVariablesBuilder, GetTaskListBuilder, HandleTaskBpmnErrorBuilder,
    HandleTaskEscalationBuilder, IdentityLink, IdentityLinkBuilder, SaveTaskBuilder, Task,
    TaskQuery, TaskSortKey, TaskUserAction, TaskUserBuilder, UnclaimTaskBuilder,
};
pub use tenant::{
    CountTenantsBuilder, DeleteTenantBuilder, GetTenantBuilder, GetTenantListBuilder,
    SaveTenantBuilder, Tenant, TenantMember, TenantMemberBuilder, TenantQuery, TenantSortKey,
};
pub use user::{
    CountUsersBuilder, CreateUserBuilder, GetUserListBuilder, GetUserProfileBuilder,
    UpdateUserCredentialsBuilder, UpdateUserProfileBuilder, UserAction, UserActionBuilder,
    UserProfile, UserQuery, UserSortKey,
};
pub use util::{format_timestamp, parse_timestamp};
pub use variable::{
    from_variables, to_variables, DeleteVariableBuilder, GetVariableBuilder,
    GetVariableDataBuilder, GetVariablesBuilder, ModifyVariablesBuilder, Operator,
    UpdateVariableBuilder, Variable, VariableFilter, VariableScope, Variables,
};
pub use variableinst::{
    CountVariableInstancesBuilder, GetVariableInstanceBuilder, GetVariableInstanceDataBuilder,
    GetVariableInstanceListBuilder, VariableInstance, VariableInstanceQuery,
    VariableInstanceSortKey,
};
pub use worker::ExternalTaskWorkerBuilder;
