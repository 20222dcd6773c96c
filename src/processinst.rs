use crate::{
    activityinst::ActivityInstance,
    batch::Batch,
    client::Client,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery},
    variable::{Variable, VariableFilter, Variables},
    Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const RESOURCE: &str = "process-instance";

/// A running process instance.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
    /// the id of the process instance
    pub id: String,
    /// the process definition the instance belongs to
    pub definition_id: String,
    /// the business key of the instance
    pub business_key: Option<String>,
    /// the case instance the instance is linked to
    pub case_instance_id: Option<String>,
    /// whether the instance has ended
    #[serde(default)]
    pub ended: bool,
    /// whether the instance is suspended
    #[serde(default)]
    pub suspended: bool,
    /// the tenant of the instance
    pub tenant_id: Option<String>,
}

/// A process instance together with its variables, as returned when starting
/// an instance.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProcessInstanceWithVariables {
    /// the process instance
    #[serde(flatten)]
    pub instance: ProcessInstance,
    /// variables of the instance once it reached its first wait state, if
    /// requested
    #[serde(default)]
    pub variables: Option<Variables>,
}

/// Keys process instances can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessInstanceSortKey {
    /// process instance id
    InstanceId,
    /// process definition key
    DefinitionKey,
    /// process definition id
    DefinitionId,
    /// tenant id
    TenantId,
    /// business key
    BusinessKey,
}

/// Filter for process instance queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstanceQuery {
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_instance_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_key_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    case_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_definition_key_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_definition_key_not_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    super_process_instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_process_instance: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    active: bool,
    #[serde(skip_serializing_if = "is_false")]
    suspended: bool,
    #[serde(skip_serializing_if = "is_false")]
    with_incident: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_message_like: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    activity_id_in: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    root_process_instances: bool,
    #[serde(skip_serializing_if = "is_false")]
    leaf_process_instances: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    variables: Vec<VariableFilter>,
}

impl ListQuery for ProcessInstanceQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = ProcessInstanceSortKey;
    type Item = ProcessInstance;
}

impl ProcessInstanceQuery {
    /// An empty filter matching all process instances.
    pub fn new() -> Self {
        ProcessInstanceQuery::default()
    }

    /// Filter by a list of process instance ids.
    pub fn with_process_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.process_instance_ids = ids;
        self
    }

    /// Filter by business key.
    pub fn with_business_key<T: Into<String>>(mut self, business_key: T) -> Self {
        self.business_key = Some(business_key.into());
        self
    }

    /// Filter by a `LIKE` pattern on the business key.
    pub fn with_business_key_like<T: Into<String>>(mut self, business_key_like: T) -> Self {
        self.business_key_like = Some(business_key_like.into());
        self
    }

    /// Filter by case instance.
    pub fn with_case_instance_id<T: Into<String>>(mut self, case_instance_id: T) -> Self {
        self.case_instance_id = Some(case_instance_id.into());
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

    /// Only include instances of definitions with one of the keys.
    pub fn with_process_definition_keys(mut self, keys: Vec<String>) -> Self {
        self.process_definition_key_in = keys;
        self
    }

    /// Exclude instances of definitions with one of the keys.
    pub fn without_process_definition_keys(mut self, keys: Vec<String>) -> Self {
        self.process_definition_key_not_in = keys;
        self
    }

    /// Filter by deployment.
    pub fn with_deployment_id<T: Into<String>>(mut self, deployment_id: T) -> Self {
        self.deployment_id = Some(deployment_id.into());
        self
    }

    /// Only include sub process instances of the given instance.
    pub fn with_super_process_instance<T: Into<String>>(mut self, id: T) -> Self {
        self.super_process_instance = Some(id.into());
        self
    }

    /// Only include the super process instance of the given instance.
    pub fn with_sub_process_instance<T: Into<String>>(mut self, id: T) -> Self {
        self.sub_process_instance = Some(id.into());
        self
    }

    /// Only include active instances.
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Only include suspended instances.
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Only include instances with an incident.
    pub fn with_incident(mut self) -> Self {
        self.with_incident = true;
        self
    }

    /// Only include instances with the given incident.
    pub fn with_incident_id<T: Into<String>>(mut self, incident_id: T) -> Self {
        self.incident_id = Some(incident_id.into());
        self
    }

    /// Only include instances with incidents of the given type.
    pub fn with_incident_type<T: Into<String>>(mut self, incident_type: T) -> Self {
        self.incident_type = Some(incident_type.into());
        self
    }

    /// Only include instances with incidents with the given message.
    pub fn with_incident_message<T: Into<String>>(mut self, incident_message: T) -> Self {
        self.incident_message = Some(incident_message.into());
        self
    }

    /// Only include instances with incidents matching a `LIKE` pattern.
    pub fn with_incident_message_like<T: Into<String>>(mut self, incident_message_like: T) -> Self {
        self.incident_message_like = Some(incident_message_like.into());
        self
    }

    /// Only include instances of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include instances without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.without_tenant_id = true;
        self
    }

    /// Only include instances with an active activity instance of one of
    /// the activities.
    pub fn with_activity_ids(mut self, activity_ids: Vec<String>) -> Self {
        self.activity_id_in = activity_ids;
        self
    }

    /// Only include instances without a super process instance.
    pub fn root_process_instances(mut self) -> Self {
        self.root_process_instances = true;
        self
    }

    /// Only include instances without sub process instances.
    pub fn leaf_process_instances(mut self) -> Self {
        self.leaf_process_instances = true;
        self
    }

    /// Only include instances with a matching variable; may be called several
    /// times.
    pub fn with_variable(mut self, filter: VariableFilter) -> Self {
        self.variables.push(filter);
        self
    }
}

/// Queries process instances.
pub type GetProcessInstanceListBuilder = ListBuilder<ProcessInstanceQuery>;
/// Counts process instances.
pub type CountProcessInstancesBuilder = CountBuilder<ProcessInstanceQuery>;

impl Client {
    /// Queries process instances matching a filter.
    pub fn get_process_instance_list(
        &self,
        query: ProcessInstanceQuery,
    ) -> GetProcessInstanceListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts process instances matching a filter.
    pub fn count_process_instances(&self, query: ProcessInstanceQuery) -> CountProcessInstancesBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single process instance.
    pub fn get_process_instance<T: Into<String>>(&self, id: T) -> GetProcessInstanceBuilder {
        GetProcessInstanceBuilder::new(self.clone(), id)
    }

    /// Deletes a running process instance.
    pub fn delete_process_instance<T: Into<String>>(&self, id: T) -> DeleteProcessInstanceBuilder {
        DeleteProcessInstanceBuilder::new(self.clone(), id)
    }

    /// Deletes several process instances asynchronously in a batch.
    pub fn delete_process_instances_async(&self) -> DeleteProcessInstancesAsyncBuilder {
        DeleteProcessInstancesAsyncBuilder::new(self.clone())
    }

    /// Retrieves the activity instance tree of a process instance.
    pub fn get_activity_instance<T: Into<String>>(&self, id: T) -> GetActivityInstanceBuilder {
        GetActivityInstanceBuilder::new(self.clone(), id)
    }

    /// Modifies the execution state of a process instance.
    pub fn modify_process_instance<T: Into<String>>(&self, id: T) -> ModifyProcessInstanceBuilder {
        ModifyProcessInstanceBuilder::new(self.clone(), id)
    }

    /// Activates a process instance.
    pub fn activate_process_instance<T: Into<String>>(
        &self,
        id: T,
    ) -> ProcessInstanceSuspensionBuilder {
        ProcessInstanceSuspensionBuilder::new(self.clone(), id, false)
    }

    /// Suspends a process instance.
    pub fn suspend_process_instance<T: Into<String>>(
        &self,
        id: T,
    ) -> ProcessInstanceSuspensionBuilder {
        ProcessInstanceSuspensionBuilder::new(self.clone(), id, true)
    }
}

/// Retrieves a single process instance.
#[derive(Debug)]
pub struct GetProcessInstanceBuilder {
    client: Client,
    id: String,
}

impl GetProcessInstanceBuilder {
    /// Create a new get process instance builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetProcessInstanceBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get process instance request.
    #[tracing::instrument(skip(self), name = "get_process_instance", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<ProcessInstance> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProcessInstanceQuery {
    #[serde(skip_serializing_if = "is_false")]
    skip_custom_listeners: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_io_mappings: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_subprocesses: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    fail_if_not_exists: Option<bool>,
}

/// Deletes a running process instance.
#[derive(Debug)]
pub struct DeleteProcessInstanceBuilder {
    client: Client,
    id: String,
    query: DeleteProcessInstanceQuery,
}

impl DeleteProcessInstanceBuilder {
    /// Create a new delete process instance builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteProcessInstanceBuilder {
            client,
            id: id.into(),
            query: DeleteProcessInstanceQuery::default(),
        }
    }

    /// Skip custom listeners.
    pub fn with_skip_custom_listeners(mut self, skip_custom_listeners: bool) -> Self {
        self.query.skip_custom_listeners = skip_custom_listeners;
        self
    }

    /// Skip input/output mappings.
    pub fn with_skip_io_mappings(mut self, skip_io_mappings: bool) -> Self {
        self.query.skip_io_mappings = skip_io_mappings;
        self
    }

    /// Do not delete sub process instances.
    pub fn with_skip_subprocesses(mut self, skip_subprocesses: bool) -> Self {
        self.query.skip_subprocesses = skip_subprocesses;
        self
    }

    /// Whether a missing instance is an error; defaults to `true` on the engine.
    pub fn with_fail_if_not_exists(mut self, fail_if_not_exists: bool) -> Self {
        self.query.fail_if_not_exists = Some(fail_if_not_exists);
        self
    }

    /// Submit the delete process instance request.
    #[tracing::instrument(skip(self), name = "delete_process_instance", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        trace!(query = ?self.query, "request:");
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .query(&self.query)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProcessInstancesAsyncRequest {
    process_instance_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delete_reason: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    skip_custom_listeners: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_subprocesses: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_io_mappings: bool,
}

/// Deletes several process instances asynchronously in a batch.
#[derive(Debug)]
pub struct DeleteProcessInstancesAsyncBuilder {
    client: Client,
    request: DeleteProcessInstancesAsyncRequest,
}

impl DeleteProcessInstancesAsyncBuilder {
    /// Create a new delete process instances async builder.
    pub fn new(client: Client) -> Self {
        DeleteProcessInstancesAsyncBuilder {
            client,
            request: DeleteProcessInstancesAsyncRequest::default(),
        }
    }

    /// Set the process instances to delete.
    pub fn with_process_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.request.process_instance_ids = ids;
        self
    }

    /// Set the reason recorded in the history.
    pub fn with_delete_reason<T: Into<String>>(mut self, delete_reason: T) -> Self {
        self.request.delete_reason = Some(delete_reason.into());
        self
    }

    /// Skip custom listeners.
    pub fn with_skip_custom_listeners(mut self, skip_custom_listeners: bool) -> Self {
        self.request.skip_custom_listeners = skip_custom_listeners;
        self
    }

    /// Do not delete sub process instances.
    pub fn with_skip_subprocesses(mut self, skip_subprocesses: bool) -> Self {
        self.request.skip_subprocesses = skip_subprocesses;
        self
    }

    /// Skip input/output mappings.
    pub fn with_skip_io_mappings(mut self, skip_io_mappings: bool) -> Self {
        self.request.skip_io_mappings = skip_io_mappings;
        self
    }

    /// Submit the batch deletion.
    #[tracing::instrument(skip(self), name = "delete_process_instances_async", err)]
    pub async fn send(self) -> Result<Batch> {
        if self.request.process_instance_ids.is_empty() {
            return Err(crate::Error::InvalidParameters(
                "at least one process instance id must be set",
            ));
        }
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, "delete"])
            .json(&self.request)
            .send()
            .await
    }
}

/// Retrieves the activity instance tree of a process instance.
#[derive(Debug)]
pub struct GetActivityInstanceBuilder {
    client: Client,
    id: String,
}

impl GetActivityInstanceBuilder {
    /// Create a new get activity instance builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetActivityInstanceBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get activity instance request.
    #[tracing::instrument(skip(self), name = "get_activity_instance", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<ActivityInstance> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "activity-instances"])
            .send()
            .await
    }
}

/// Kind of a modification instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InstructionType {
    /// enter an activity
    StartBeforeActivity,
    /// take the outgoing sequence flow of an activity
    StartAfterActivity,
    /// take a sequence flow
    StartTransition,
    /// cancel activity or transition instances
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct InstructionVariable {
    #[serde(flatten)]
    variable: Variable,
    #[serde(skip_serializing_if = "is_false")]
    local: bool,
}

/// A single step of a process instance modification, also used as start
/// instruction when starting a process instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    #[serde(rename = "type")]
    kind: InstructionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transition_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ancestor_activity_instance_id: Option<String>,
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    variables: std::collections::BTreeMap<String, InstructionVariable>,
}

impl Instruction {
    fn new(kind: InstructionType) -> Self {
        Instruction {
            kind,
            activity_id: None,
            transition_id: None,
            activity_instance_id: None,
            transition_instance_id: None,
            ancestor_activity_instance_id: None,
            variables: Default::default(),
        }
    }

    /// Enter the activity.
    pub fn start_before_activity<T: Into<String>>(activity_id: T) -> Self {
        Instruction {
            activity_id: Some(activity_id.into()),
            ..Instruction::new(InstructionType::StartBeforeActivity)
        }
    }

    /// Take the single outgoing sequence flow of the activity.
    pub fn start_after_activity<T: Into<String>>(activity_id: T) -> Self {
        Instruction {
            activity_id: Some(activity_id.into()),
            ..Instruction::new(InstructionType::StartAfterActivity)
        }
    }

    /// Take the sequence flow.
    pub fn start_transition<T: Into<String>>(transition_id: T) -> Self {
        Instruction {
            transition_id: Some(transition_id.into()),
            ..Instruction::new(InstructionType::StartTransition)
        }
    }

    /// Cancel all instances of the activity.
    pub fn cancel_activity<T: Into<String>>(activity_id: T) -> Self {
        Instruction {
            activity_id: Some(activity_id.into()),
            ..Instruction::new(InstructionType::Cancel)
        }
    }

    /// Cancel a single activity instance.
    pub fn cancel_activity_instance<T: Into<String>>(activity_instance_id: T) -> Self {
        Instruction {
            activity_instance_id: Some(activity_instance_id.into()),
            ..Instruction::new(InstructionType::Cancel)
        }
    }

    /// Cancel a single transition instance.
    pub fn cancel_transition_instance<T: Into<String>>(transition_instance_id: T) -> Self {
        Instruction {
            transition_instance_id: Some(transition_instance_id.into()),
            ..Instruction::new(InstructionType::Cancel)
        }
    }

    /// Start within the given ancestor activity instance.
    pub fn with_ancestor_activity_instance_id<T: Into<String>>(mut self, id: T) -> Self {
        self.ancestor_activity_instance_id = Some(id.into());
        self
    }

    /// Set a variable when starting; `local` variables are set on the new
    /// activity instance instead of its parent scope.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable, local: bool) -> Self {
        self.variables
            .insert(name.into(), InstructionVariable { variable, local });
        self
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyProcessInstanceRequest {
    #[serde(skip_serializing_if = "is_false")]
    skip_custom_listeners: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_io_mappings: bool,
    instructions: Vec<Instruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<String>,
}

/// Modifies the execution state of a process instance.
///
/// Instructions are executed in the order they were added.
#[derive(Debug)]
pub struct ModifyProcessInstanceBuilder {
    client: Client,
    id: String,
    request: ModifyProcessInstanceRequest,
}

impl ModifyProcessInstanceBuilder {
    /// Create a new modify process instance builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        ModifyProcessInstanceBuilder {
            client,
            id: id.into(),
            request: ModifyProcessInstanceRequest::default(),
        }
    }

    /// Append an instruction.
    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.request.instructions.push(instruction);
        self
    }

    /// Skip custom listeners.
    pub fn with_skip_custom_listeners(mut self, skip_custom_listeners: bool) -> Self {
        self.request.skip_custom_listeners = skip_custom_listeners;
        self
    }

    /// Skip input/output mappings.
    pub fn with_skip_io_mappings(mut self, skip_io_mappings: bool) -> Self {
        self.request.skip_io_mappings = skip_io_mappings;
        self
    }

    /// Record an annotation in the operation log.
    pub fn with_annotation<T: Into<String>>(mut self, annotation: T) -> Self {
        self.request.annotation = Some(annotation.into());
        self
    }

    /// Submit the modification.
    #[tracing::instrument(skip(self), name = "modify_process_instance", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        if self.request.instructions.is_empty() {
            return Err(crate::Error::InvalidParameters(
                "at least one instruction must be set",
            ));
        }
        debug!(instructions = self.request.instructions.len(), "modifying process instance");
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, self.id.as_str(), "modification"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct SuspensionRequest {
    suspended: bool,
}

/// Activates or suspends a process instance.
#[derive(Debug)]
pub struct ProcessInstanceSuspensionBuilder {
    client: Client,
    id: String,
    request: SuspensionRequest,
}

impl ProcessInstanceSuspensionBuilder {
    /// Create a new suspension builder; `suspended` selects the target state.
    pub fn new<T: Into<String>>(client: Client, id: T, suspended: bool) -> Self {
        ProcessInstanceSuspensionBuilder {
            client,
            id: id.into(),
            request: SuspensionRequest { suspended },
        }
    }

    /// Submit the suspension request.
    #[tracing::instrument(skip(self), name = "update_process_instance_suspension", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "suspended"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn instructions_serialize_engine_format() {
        let instruction = Instruction::start_before_activity("approve")
            .with_variable("amount", Variable::integer(10), true)
            .with_ancestor_activity_instance_id("root");

        assert_eq!(
            serde_json::to_value(&instruction).unwrap(),
            json!({
                "type": "startBeforeActivity",
                "activityId": "approve",
                "ancestorActivityInstanceId": "root",
                "variables": {
                    "amount": {"value": 10, "type": "Integer", "local": true}
                }
            })
        );
        assert_eq!(
            serde_json::to_value(Instruction::cancel_activity_instance("ai-1")).unwrap(),
            json!({"type": "cancel", "activityInstanceId": "ai-1"})
        );
    }

    #[test]
    fn started_instance_with_variables_parses() {
        let instance: ProcessInstanceWithVariables = serde_json::from_value(json!({
            "links": [],
            "id": "pi-1",
            "definitionId": "invoice:1:7",
            "businessKey": "order-9",
            "caseInstanceId": null,
            "ended": false,
            "suspended": false,
            "tenantId": null,
            "variables": {"approved": {"type": "Boolean", "value": true, "valueInfo": {}}}
        }))
        .unwrap();

        assert_eq!(instance.instance.id, "pi-1");
        assert_eq!(instance.instance.business_key.as_deref(), Some("order-9"));
        let variables = instance.variables.unwrap();
        assert_eq!(variables["approved"].value, json!(true));
    }
}
