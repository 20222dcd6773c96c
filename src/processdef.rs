use crate::{
    client::Client,
    incident::IncidentStatistics,
    processinst::{Instruction, ProcessInstance, ProcessInstanceWithVariables},
    request::{comma_separated, is_false, CountBuilder, DefinitionRef, ListBuilder, ListQuery},
    util,
    variable::{Variable, Variables},
    Result,
};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const RESOURCE: &str = "process-definition";

/// A deployed process definition.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinition {
    /// the id of the process definition
    pub id: String,
    /// the key of the process definition, i.e. the id of the BPMN process
    pub key: String,
    /// the category of the process definition
    pub category: Option<String>,
    /// the description of the process definition
    pub description: Option<String>,
    /// the name of the process definition
    pub name: Option<String>,
    /// the version of the process definition
    pub version: i32,
    /// the file name of the process definition
    pub resource: Option<String>,
    /// the deployment the process definition belongs to
    pub deployment_id: Option<String>,
    /// the file name of the process definition diagram, if any
    pub diagram: Option<String>,
    /// whether the definition is suspended
    #[serde(default)]
    pub suspended: bool,
    /// the tenant of the process definition
    pub tenant_id: Option<String>,
    /// the version tag of the process definition
    pub version_tag: Option<String>,
    /// history time to live in days
    pub history_time_to_live: Option<u32>,
    /// whether the process definition is startable in the tasklist
    #[serde(default)]
    pub startable_in_tasklist: bool,
}

/// The BPMN 2.0 XML of a process definition.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinitionXml {
    /// the id of the process definition
    pub id: String,
    /// the XML document
    pub bpmn20_xml: String,
}

/// Runtime statistics of one activity of a process definition.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStatistics {
    /// the id of the activity
    pub id: String,
    /// running instances of the activity
    pub instances: u64,
    /// failed jobs of the activity
    #[serde(default)]
    pub failed_jobs: u64,
    /// open incidents of the activity, by type
    #[serde(default)]
    pub incidents: Vec<IncidentStatistics>,
}

/// Runtime statistics of one process definition.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinitionStatistics {
    /// the id of the process definition
    pub id: String,
    /// running instances of the process definition
    pub instances: u64,
    /// failed jobs of the process definition
    #[serde(default)]
    pub failed_jobs: u64,
    /// open incidents, by type
    #[serde(default)]
    pub incidents: Vec<IncidentStatistics>,
    /// the process definition itself
    pub definition: ProcessDefinition,
}

/// Keys process definitions can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessDefinitionSortKey {
    /// category
    Category,
    /// key
    Key,
    /// id
    Id,
    /// name
    Name,
    /// version
    Version,
    /// deployment id
    DeploymentId,
    /// tenant id
    TenantId,
    /// version tag
    VersionTag,
}

/// Filter for process definition queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinitionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_definition_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    keys_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<i32>,
    #[serde(skip_serializing_if = "is_false")]
    latest_version: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    startable_by: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    active: bool,
    #[serde(skip_serializing_if = "is_false")]
    suspended: bool,
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
    #[serde(skip_serializing_if = "is_false")]
    include_process_definitions_without_tenant_id: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_tag_like: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_version_tag: bool,
    #[serde(skip_serializing_if = "is_false")]
    startable_in_tasklist: bool,
    #[serde(skip_serializing_if = "is_false")]
    not_startable_in_tasklist: bool,
}

impl ListQuery for ProcessDefinitionQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = ProcessDefinitionSortKey;
    type Item = ProcessDefinition;
}

impl ProcessDefinitionQuery {
    /// An empty filter matching all process definitions.
    pub fn new() -> Self {
        ProcessDefinitionQuery::default()
    }

    /// Filter by process definition id.
    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_definition_id = Some(id.into());
        self
    }

    /// Filter by a list of process definition ids.
    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.process_definition_id_in = ids;
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

    /// Filter by deployment.
    pub fn with_deployment_id<T: Into<String>>(mut self, deployment_id: T) -> Self {
        self.deployment_id = Some(deployment_id.into());
        self
    }

    /// Filter by key.
    pub fn with_key<T: Into<String>>(mut self, key: T) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Filter by a list of keys.
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys_in = keys;
        self
    }

    /// Filter by a `LIKE` pattern on the key.
    pub fn with_key_like<T: Into<String>>(mut self, key_like: T) -> Self {
        self.key_like = Some(key_like.into());
        self
    }

    /// Filter by category.
    pub fn with_category<T: Into<String>>(mut self, category: T) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by a `LIKE` pattern on the category.
    pub fn with_category_like<T: Into<String>>(mut self, category_like: T) -> Self {
        self.category_like = Some(category_like.into());
        self
    }

    /// Filter by version.
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = Some(version);
        self
    }

    /// Only include the latest version of each definition.
    pub fn latest_version(mut self) -> Self {
        self.latest_version = true;
        self
    }

    /// Filter by resource name.
    pub fn with_resource_name<T: Into<String>>(mut self, resource_name: T) -> Self {
        self.resource_name = Some(resource_name.into());
        self
    }

    /// Filter by a `LIKE` pattern on the resource name.
    pub fn with_resource_name_like<T: Into<String>>(mut self, resource_name_like: T) -> Self {
        self.resource_name_like = Some(resource_name_like.into());
        self
    }

    /// Only include definitions the user may start.
    pub fn with_startable_by<T: Into<String>>(mut self, user_id: T) -> Self {
        self.startable_by = Some(user_id.into());
        self
    }

    /// Only include active definitions.
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Only include suspended definitions.
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Only include definitions with the given incident.
    pub fn with_incident_id<T: Into<String>>(mut self, incident_id: T) -> Self {
        self.incident_id = Some(incident_id.into());
        self
    }

    /// Only include definitions with incidents of the given type.
    pub fn with_incident_type<T: Into<String>>(mut self, incident_type: T) -> Self {
        self.incident_type = Some(incident_type.into());
        self
    }

    /// Only include definitions with incidents with the given message.
    pub fn with_incident_message<T: Into<String>>(mut self, incident_message: T) -> Self {
        self.incident_message = Some(incident_message.into());
        self
    }

    /// Only include definitions with incidents matching a `LIKE` pattern.
    pub fn with_incident_message_like<T: Into<String>>(mut self, incident_message_like: T) -> Self {
        self.incident_message_like = Some(incident_message_like.into());
        self
    }

    /// Only include definitions of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include definitions without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.without_tenant_id = true;
        self
    }

    /// Include definitions without a tenant in a tenant filtered query.
    pub fn include_without_tenant_id(mut self) -> Self {
        self.include_process_definitions_without_tenant_id = true;
        self
    }

    /// Filter by version tag.
    pub fn with_version_tag<T: Into<String>>(mut self, version_tag: T) -> Self {
        self.version_tag = Some(version_tag.into());
        self
    }

    /// Filter by a `LIKE` pattern on the version tag.
    pub fn with_version_tag_like<T: Into<String>>(mut self, version_tag_like: T) -> Self {
        self.version_tag_like = Some(version_tag_like.into());
        self
    }

    /// Only include definitions without a version tag.
    pub fn without_version_tag(mut self) -> Self {
        self.without_version_tag = true;
        self
    }

    /// Only include definitions startable in the tasklist.
    pub fn startable_in_tasklist(mut self) -> Self {
        self.startable_in_tasklist = true;
        self
    }

    /// Only include definitions not startable in the tasklist.
    pub fn not_startable_in_tasklist(mut self) -> Self {
        self.not_startable_in_tasklist = true;
        self
    }
}

/// Queries process definitions.
pub type GetProcessDefinitionListBuilder = ListBuilder<ProcessDefinitionQuery>;
/// Counts process definitions.
pub type CountProcessDefinitionsBuilder = CountBuilder<ProcessDefinitionQuery>;

impl Client {
    /// Queries process definitions matching a filter.
    pub fn get_process_definition_list(
        &self,
        query: ProcessDefinitionQuery,
    ) -> GetProcessDefinitionListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts process definitions matching a filter.
    pub fn count_process_definitions(
        &self,
        query: ProcessDefinitionQuery,
    ) -> CountProcessDefinitionsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single process definition.
    pub fn get_process_definition(&self, definition: DefinitionRef) -> GetProcessDefinitionBuilder {
        GetProcessDefinitionBuilder::new(self.clone(), definition)
    }

    /// Retrieves the BPMN 2.0 XML of a process definition.
    pub fn get_process_definition_xml(
        &self,
        definition: DefinitionRef,
    ) -> GetProcessDefinitionXmlBuilder {
        GetProcessDefinitionXmlBuilder::new(self.clone(), definition)
    }

    /// Creates and starts an instance of a process definition.
    pub fn start_process_instance(&self, definition: DefinitionRef) -> StartProcessInstanceBuilder {
        StartProcessInstanceBuilder::new(self.clone(), definition)
    }

    /// Starts an instance of a process definition by submitting its start form.
    pub fn submit_start_form(&self, definition: DefinitionRef) -> SubmitStartFormBuilder {
        SubmitStartFormBuilder::new(self.clone(), definition)
    }

    /// Retrieves the variables of the start form of a process definition.
    pub fn get_start_form_variables(
        &self,
        definition: DefinitionRef,
    ) -> GetStartFormVariablesBuilder {
        GetStartFormVariablesBuilder::new(self.clone(), definition)
    }

    /// Activates a process definition.
    pub fn activate_process_definition(
        &self,
        definition: DefinitionRef,
    ) -> ProcessDefinitionSuspensionBuilder {
        ProcessDefinitionSuspensionBuilder::new(self.clone(), definition, false)
    }

    /// Suspends a process definition; no new instances can be started.
    pub fn suspend_process_definition(
        &self,
        definition: DefinitionRef,
    ) -> ProcessDefinitionSuspensionBuilder {
        ProcessDefinitionSuspensionBuilder::new(self.clone(), definition, true)
    }

    /// Activates all process definitions with a key.
    pub fn activate_process_definitions_by_key<T: Into<String>>(
        &self,
        key: T,
    ) -> ProcessDefinitionSuspensionByKeyBuilder {
        ProcessDefinitionSuspensionByKeyBuilder::new(self.clone(), key, false)
    }

    /// Suspends all process definitions with a key.
    pub fn suspend_process_definitions_by_key<T: Into<String>>(
        &self,
        key: T,
    ) -> ProcessDefinitionSuspensionByKeyBuilder {
        ProcessDefinitionSuspensionByKeyBuilder::new(self.clone(), key, true)
    }

    /// Deletes a process definition.
    pub fn delete_process_definition(
        &self,
        definition: DefinitionRef,
    ) -> DeleteProcessDefinitionBuilder {
        DeleteProcessDefinitionBuilder::new(self.clone(), definition)
    }

    /// Updates the history time to live of a process definition.
    pub fn update_process_definition_history_time_to_live(
        &self,
        definition: DefinitionRef,
    ) -> UpdateProcessDefinitionHistoryTimeToLiveBuilder {
        UpdateProcessDefinitionHistoryTimeToLiveBuilder::new(self.clone(), definition)
    }

    /// Retrieves runtime statistics for the activities of a process definition.
    pub fn get_activity_instance_statistics(
        &self,
        definition: DefinitionRef,
    ) -> GetActivityInstanceStatisticsBuilder {
        GetActivityInstanceStatisticsBuilder::new(self.clone(), definition)
    }

    /// Retrieves runtime statistics for all process definitions.
    pub fn get_process_definition_statistics(&self) -> GetProcessDefinitionStatisticsBuilder {
        GetProcessDefinitionStatisticsBuilder::new(self.clone())
    }
}

/// Retrieves a single process definition.
#[derive(Debug)]
pub struct GetProcessDefinitionBuilder {
    client: Client,
    definition: DefinitionRef,
}

impl GetProcessDefinitionBuilder {
    /// Create a new get process definition builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        GetProcessDefinitionBuilder { client, definition }
    }

    /// Submit the get process definition request.
    #[tracing::instrument(skip(self), name = "get_process_definition", err)]
    pub async fn send(self) -> Result<ProcessDefinition> {
        debug!(definition = ?self.definition, "fetching process definition");
        self.client
            .request(Method::GET, self.definition.segments(RESOURCE))
            .send()
            .await
    }
}

/// Retrieves the BPMN 2.0 XML of a process definition.
#[derive(Debug)]
pub struct GetProcessDefinitionXmlBuilder {
    client: Client,
    definition: DefinitionRef,
}

impl GetProcessDefinitionXmlBuilder {
    /// Create a new get process definition XML builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        GetProcessDefinitionXmlBuilder { client, definition }
    }

    /// Submit the get process definition XML request.
    #[tracing::instrument(skip(self), name = "get_process_definition_xml", err)]
    pub async fn send(self) -> Result<ProcessDefinitionXml> {
        self.client
            .request(Method::GET, self.definition.operation(RESOURCE, "xml"))
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartProcessInstanceRequest {
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    case_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    start_instructions: Vec<Instruction>,
    #[serde(skip_serializing_if = "is_false")]
    skip_custom_listeners: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_io_mappings: bool,
    #[serde(skip_serializing_if = "is_false")]
    with_variables_in_return: bool,
}

/// Creates and starts an instance of a process definition.
///
/// Without start instructions the instance starts at the default none start
/// event.
#[derive(Debug)]
pub struct StartProcessInstanceBuilder {
    client: Client,
    definition: DefinitionRef,
    request: StartProcessInstanceRequest,
}

impl StartProcessInstanceBuilder {
    /// Create a new start process instance builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        StartProcessInstanceBuilder {
            client,
            definition,
            request: StartProcessInstanceRequest::default(),
        }
    }

    /// Set a variable of the new instance.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Set variables of the new instance.
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.request.variables.extend(variables);
        self
    }

    /// Set the business key of the new instance.
    pub fn with_business_key<T: Into<String>>(mut self, business_key: T) -> Self {
        self.request.business_key = Some(business_key.into());
        self
    }

    /// Link the new instance to a case instance.
    pub fn with_case_instance_id<T: Into<String>>(mut self, case_instance_id: T) -> Self {
        self.request.case_instance_id = Some(case_instance_id.into());
        self
    }

    /// Start the instance at the given activity or transition instead of the
    /// default start event; may be called several times.
    pub fn with_start_instruction(mut self, instruction: Instruction) -> Self {
        self.request.start_instructions.push(instruction);
        self
    }

    /// Skip custom listeners; only valid with start instructions.
    pub fn with_skip_custom_listeners(mut self, skip_custom_listeners: bool) -> Self {
        self.request.skip_custom_listeners = skip_custom_listeners;
        self
    }

    /// Skip input/output mappings; only valid with start instructions.
    pub fn with_skip_io_mappings(mut self, skip_io_mappings: bool) -> Self {
        self.request.skip_io_mappings = skip_io_mappings;
        self
    }

    /// Return the variables of the instance after it reached its first wait state.
    pub fn with_variables_in_return(mut self, with_variables_in_return: bool) -> Self {
        self.request.with_variables_in_return = with_variables_in_return;
        self
    }

    /// Submit this process instance to the engine.
    #[tracing::instrument(skip(self), name = "start_process_instance", err)]
    pub async fn send(self) -> Result<ProcessInstanceWithVariables> {
        debug!(definition = ?self.definition, business_key = ?self.request.business_key, "starting process instance");
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, self.definition.operation(RESOURCE, "start"))
            .json(&self.request)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitFormRequest {
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_key: Option<String>,
}

/// Starts a process instance by submitting the start form.
#[derive(Debug)]
pub struct SubmitStartFormBuilder {
    client: Client,
    definition: DefinitionRef,
    request: SubmitFormRequest,
}

impl SubmitStartFormBuilder {
    /// Create a new submit start form builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        SubmitStartFormBuilder {
            client,
            definition,
            request: SubmitFormRequest::default(),
        }
    }

    /// Set a form field.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Set form fields.
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.request.variables.extend(variables);
        self
    }

    /// Set the business key of the new instance.
    pub fn with_business_key<T: Into<String>>(mut self, business_key: T) -> Self {
        self.request.business_key = Some(business_key.into());
        self
    }

    /// Submit the start form.
    #[tracing::instrument(skip(self), name = "submit_start_form", err)]
    pub async fn send(self) -> Result<ProcessInstance> {
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, self.definition.operation(RESOURCE, "submit-form"))
            .json(&self.request)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FormVariablesQuery {
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    pub(crate) variable_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) deserialize_values: Option<bool>,
}

/// Retrieves the variables of a start form.
#[derive(Debug)]
pub struct GetStartFormVariablesBuilder {
    client: Client,
    definition: DefinitionRef,
    query: FormVariablesQuery,
}

impl GetStartFormVariablesBuilder {
    /// Create a new get start form variables builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        GetStartFormVariablesBuilder {
            client,
            definition,
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

    /// Submit the get start form variables request.
    #[tracing::instrument(skip(self), name = "get_start_form_variables", err)]
    pub async fn send(self) -> Result<Variables> {
        self.client
            .request(
                Method::GET,
                self.definition.operation(RESOURCE, "form-variables"),
            )
            .query(&self.query)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuspensionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_key: Option<String>,
    suspended: bool,
    #[serde(skip_serializing_if = "is_false")]
    include_process_instances: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    execution_date: Option<DateTime<Utc>>,
}

/// Activates or suspends a process definition.
#[derive(Debug)]
pub struct ProcessDefinitionSuspensionBuilder {
    client: Client,
    definition: DefinitionRef,
    request: SuspensionRequest,
}

impl ProcessDefinitionSuspensionBuilder {
    /// Create a new suspension builder; `suspended` selects the target state.
    pub fn new(client: Client, definition: DefinitionRef, suspended: bool) -> Self {
        ProcessDefinitionSuspensionBuilder {
            client,
            definition,
            request: SuspensionRequest {
                suspended,
                ..Default::default()
            },
        }
    }

    /// Also activate or suspend the instances of the definition.
    pub fn with_include_process_instances(mut self, include_process_instances: bool) -> Self {
        self.request.include_process_instances = include_process_instances;
        self
    }

    /// Apply the change at the given time instead of immediately.
    pub fn with_execution_date(mut self, execution_date: DateTime<Utc>) -> Self {
        self.request.execution_date = Some(execution_date);
        self
    }

    /// Submit the suspension request.
    #[tracing::instrument(skip(self), name = "update_process_definition_suspension", err)]
    pub async fn send(self) -> Result<()> {
        debug!(definition = ?self.definition, suspended = self.request.suspended, "updating suspension state");
        self.client
            .request(Method::PUT, self.definition.operation(RESOURCE, "suspended"))
            .json(&self.request)
            .send_empty()
            .await
    }
}

/// Activates or suspends all process definitions with a key.
#[derive(Debug)]
pub struct ProcessDefinitionSuspensionByKeyBuilder {
    client: Client,
    request: SuspensionRequest,
}

impl ProcessDefinitionSuspensionByKeyBuilder {
    /// Create a new suspension builder; `suspended` selects the target state.
    pub fn new<T: Into<String>>(client: Client, key: T, suspended: bool) -> Self {
        ProcessDefinitionSuspensionByKeyBuilder {
            client,
            request: SuspensionRequest {
                process_definition_key: Some(key.into()),
                suspended,
                ..Default::default()
            },
        }
    }

    /// Also activate or suspend the instances of the definitions.
    pub fn with_include_process_instances(mut self, include_process_instances: bool) -> Self {
        self.request.include_process_instances = include_process_instances;
        self
    }

    /// Apply the change at the given time instead of immediately.
    pub fn with_execution_date(mut self, execution_date: DateTime<Utc>) -> Self {
        self.request.execution_date = Some(execution_date);
        self
    }

    /// Submit the suspension request.
    #[tracing::instrument(skip(self), name = "update_process_definitions_suspension", err)]
    pub async fn send(self) -> Result<()> {
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::PUT, [RESOURCE, "suspended"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteDefinitionQuery {
    #[serde(skip_serializing_if = "is_false")]
    cascade: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_custom_listeners: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_io_mappings: bool,
}

/// Deletes a process definition.
///
/// Deleting by key deletes all versions with that key.
#[derive(Debug)]
pub struct DeleteProcessDefinitionBuilder {
    client: Client,
    definition: DefinitionRef,
    query: DeleteDefinitionQuery,
}

impl DeleteProcessDefinitionBuilder {
    /// Create a new delete process definition builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        DeleteProcessDefinitionBuilder {
            client,
            definition,
            query: DeleteDefinitionQuery::default(),
        }
    }

    /// Also delete running and historic instances.
    pub fn with_cascade(mut self, cascade: bool) -> Self {
        self.query.cascade = cascade;
        self
    }

    /// Skip custom listeners of deleted instances.
    pub fn with_skip_custom_listeners(mut self, skip_custom_listeners: bool) -> Self {
        self.query.skip_custom_listeners = skip_custom_listeners;
        self
    }

    /// Skip input/output mappings of deleted instances.
    pub fn with_skip_io_mappings(mut self, skip_io_mappings: bool) -> Self {
        self.query.skip_io_mappings = skip_io_mappings;
        self
    }

    /// Submit the delete process definition request.
    #[tracing::instrument(skip(self), name = "delete_process_definition", err)]
    pub async fn send(self) -> Result<()> {
        let segments = match &self.definition {
            DefinitionRef::Id(_) => self.definition.segments(RESOURCE),
            _ => self.definition.operation(RESOURCE, "delete"),
        };
        debug!(definition = ?self.definition, query = ?self.query, "deleting process definition");
        self.client
            .request(Method::DELETE, segments)
            .query(&self.query)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryTimeToLiveRequest {
    history_time_to_live: Option<u32>,
}

/// Updates the history time to live of a process definition.
#[derive(Debug)]
pub struct UpdateProcessDefinitionHistoryTimeToLiveBuilder {
    client: Client,
    definition: DefinitionRef,
    request: HistoryTimeToLiveRequest,
}

impl UpdateProcessDefinitionHistoryTimeToLiveBuilder {
    /// Create a new update history time to live builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        UpdateProcessDefinitionHistoryTimeToLiveBuilder {
            client,
            definition,
            request: HistoryTimeToLiveRequest::default(),
        }
    }

    /// Set the history time to live in days; unset to keep history forever.
    pub fn with_history_time_to_live(mut self, days: u32) -> Self {
        self.request.history_time_to_live = Some(days);
        self
    }

    /// Submit the update history time to live request.
    #[tracing::instrument(skip(self), name = "update_process_definition_history_time_to_live", err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(
                Method::PUT,
                self.definition.operation(RESOURCE, "history-time-to-live"),
            )
            .json(&self.request)
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsQuery {
    #[serde(skip_serializing_if = "is_false")]
    failed_jobs: bool,
    #[serde(skip_serializing_if = "is_false")]
    incidents: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    incidents_for_type: Option<String>,
}

impl StatisticsQuery {
    fn validate(&self) -> Result<()> {
        if self.incidents && self.incidents_for_type.is_some() {
            return Err(crate::Error::InvalidParameters(
                "`incidents` and `incidents_for_type` are mutually exclusive",
            ));
        }
        Ok(())
    }
}

/// Retrieves runtime statistics of the activities of one process definition.
#[derive(Debug)]
pub struct GetActivityInstanceStatisticsBuilder {
    client: Client,
    definition: DefinitionRef,
    query: StatisticsQuery,
}

impl GetActivityInstanceStatisticsBuilder {
    /// Create a new activity statistics builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        GetActivityInstanceStatisticsBuilder {
            client,
            definition,
            query: StatisticsQuery::default(),
        }
    }

    /// Include the number of failed jobs.
    pub fn with_failed_jobs(mut self, failed_jobs: bool) -> Self {
        self.query.failed_jobs = failed_jobs;
        self
    }

    /// Include incident counts of all types. Mutually exclusive with
    /// [`with_incidents_for_type`](Self::with_incidents_for_type).
    pub fn with_incidents(mut self, incidents: bool) -> Self {
        self.query.incidents = incidents;
        self
    }

    /// Include incident counts of the given type only.
    pub fn with_incidents_for_type<T: Into<String>>(mut self, incident_type: T) -> Self {
        self.query.incidents_for_type = Some(incident_type.into());
        self
    }

    /// Submit the activity statistics request.
    #[tracing::instrument(skip(self), name = "get_activity_instance_statistics", err)]
    pub async fn send(self) -> Result<Vec<ActivityStatistics>> {
        self.query.validate()?;
        self.client
            .request(Method::GET, self.definition.operation(RESOURCE, "statistics"))
            .query(&self.query)
            .send()
            .await
    }
}

/// Retrieves runtime statistics of all process definitions, grouped by
/// definition.
#[derive(Debug)]
pub struct GetProcessDefinitionStatisticsBuilder {
    client: Client,
    query: StatisticsQuery,
}

impl GetProcessDefinitionStatisticsBuilder {
    /// Create a new process definition statistics builder.
    pub fn new(client: Client) -> Self {
        GetProcessDefinitionStatisticsBuilder {
            client,
            query: StatisticsQuery::default(),
        }
    }

    /// Include the number of failed jobs.
    pub fn with_failed_jobs(mut self, failed_jobs: bool) -> Self {
        self.query.failed_jobs = failed_jobs;
        self
    }

    /// Include incident counts of all types.
    pub fn with_incidents(mut self, incidents: bool) -> Self {
        self.query.incidents = incidents;
        self
    }

    /// Include incident counts of the given type only.
    pub fn with_incidents_for_type<T: Into<String>>(mut self, incident_type: T) -> Self {
        self.query.incidents_for_type = Some(incident_type.into());
        self
    }

    /// Submit the process definition statistics request.
    #[tracing::instrument(skip(self), name = "get_process_definition_statistics", err)]
    pub async fn send(self) -> Result<Vec<ProcessDefinitionStatistics>> {
        self.query.validate()?;
        self.client
            .request(Method::GET, [RESOURCE, "statistics"])
            .query(&self.query)
            .send()
            .await
    }
}
