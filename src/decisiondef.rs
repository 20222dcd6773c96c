use crate::{
    client::Client,
    request::{comma_separated, is_false, CountBuilder, DefinitionRef, ListBuilder, ListQuery},
    variable::{Variable, Variables},
    Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const RESOURCE: &str = "decision-definition";

/// A deployed DMN decision definition.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionDefinition {
    /// the id of the decision definition
    pub id: String,
    /// the key of the decision definition, i.e. the id of the DMN decision
    pub key: String,
    /// the category of the decision definition
    pub category: Option<String>,
    /// the name of the decision definition
    pub name: Option<String>,
    /// the version of the decision definition
    pub version: i32,
    /// the file name of the decision definition
    pub resource: Option<String>,
    /// the deployment the decision definition belongs to
    pub deployment_id: Option<String>,
    /// the tenant of the decision definition
    pub tenant_id: Option<String>,
    /// the decision requirements definition the decision belongs to
    pub decision_requirements_definition_id: Option<String>,
    /// the key of the decision requirements definition
    pub decision_requirements_definition_key: Option<String>,
    /// history time to live in days
    pub history_time_to_live: Option<u32>,
    /// the version tag of the decision definition
    pub version_tag: Option<String>,
}

/// The DMN XML of a decision definition.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionDefinitionXml {
    /// the id of the decision definition
    pub id: String,
    /// the XML document
    pub dmn_xml: String,
}

/// Keys decision definitions can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DecisionDefinitionSortKey {
    /// category
    Category,
    /// decision requirements definition key
    DecisionRequirementsDefinitionKey,
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

/// Filter for decision definition queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionDefinitionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    decision_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    decision_definition_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
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
    decision_requirements_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision_requirements_definition_key: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_decision_requirements_definition: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
    #[serde(skip_serializing_if = "is_false")]
    include_decision_definitions_without_tenant_id: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_tag_like: Option<String>,
}

impl ListQuery for DecisionDefinitionQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = DecisionDefinitionSortKey;
    type Item = DecisionDefinition;
}

impl DecisionDefinitionQuery {
    /// An empty filter matching all decision definitions.
    pub fn new() -> Self {
        DecisionDefinitionQuery::default()
    }

    /// Filter by decision definition id.
    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.decision_definition_id = Some(id.into());
        self
    }

    /// Filter by a list of decision definition ids.
    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.decision_definition_id_in = ids;
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

    /// Filter by decision requirements definition id.
    pub fn with_decision_requirements_definition_id<T: Into<String>>(mut self, id: T) -> Self {
        self.decision_requirements_definition_id = Some(id.into());
        self
    }

    /// Filter by decision requirements definition key.
    pub fn with_decision_requirements_definition_key<T: Into<String>>(mut self, key: T) -> Self {
        self.decision_requirements_definition_key = Some(key.into());
        self
    }

    /// Only include definitions not belonging to a decision requirements
    /// definition.
    pub fn without_decision_requirements_definition(mut self) -> Self {
        self.without_decision_requirements_definition = true;
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
        self.include_decision_definitions_without_tenant_id = true;
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
}

/// Queries decision definitions.
pub type GetDecisionDefinitionListBuilder = ListBuilder<DecisionDefinitionQuery>;
/// Counts decision definitions.
pub type CountDecisionDefinitionsBuilder = CountBuilder<DecisionDefinitionQuery>;

impl Client {
    /// Queries decision definitions matching a filter.
    pub fn get_decision_definition_list(
        &self,
        query: DecisionDefinitionQuery,
    ) -> GetDecisionDefinitionListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts decision definitions matching a filter.
    pub fn count_decision_definitions(
        &self,
        query: DecisionDefinitionQuery,
    ) -> CountDecisionDefinitionsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single decision definition.
    pub fn get_decision_definition(&self, definition: DefinitionRef) -> GetDecisionDefinitionBuilder {
        GetDecisionDefinitionBuilder::new(self.clone(), definition)
    }

    /// Retrieves the DMN XML of a decision definition.
    pub fn get_decision_definition_xml(
        &self,
        definition: DefinitionRef,
    ) -> GetDecisionDefinitionXmlBuilder {
        GetDecisionDefinitionXmlBuilder::new(self.clone(), definition)
    }

    /// Evaluates a decision.
    pub fn evaluate_decision(&self, definition: DefinitionRef) -> EvaluateDecisionBuilder {
        EvaluateDecisionBuilder::new(self.clone(), definition)
    }

    /// Updates the history time to live of a decision definition.
    pub fn update_decision_definition_history_time_to_live(
        &self,
        definition: DefinitionRef,
    ) -> UpdateDecisionDefinitionHistoryTimeToLiveBuilder {
        UpdateDecisionDefinitionHistoryTimeToLiveBuilder::new(self.clone(), definition)
    }
}

/// Retrieves a single decision definition.
#[derive(Debug)]
pub struct GetDecisionDefinitionBuilder {
    client: Client,
    definition: DefinitionRef,
}

impl GetDecisionDefinitionBuilder {
    /// Create a new get decision definition builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        GetDecisionDefinitionBuilder { client, definition }
    }

    /// Submit the get decision definition request.
    #[tracing::instrument(skip(self), name = "get_decision_definition", err)]
    pub async fn send(self) -> Result<DecisionDefinition> {
        self.client
            .request(Method::GET, self.definition.segments(RESOURCE))
            .send()
            .await
    }
}

/// Retrieves the DMN XML of a decision definition.
#[derive(Debug)]
pub struct GetDecisionDefinitionXmlBuilder {
    client: Client,
    definition: DefinitionRef,
}

impl GetDecisionDefinitionXmlBuilder {
    /// Create a new get decision definition XML builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        GetDecisionDefinitionXmlBuilder { client, definition }
    }

    /// Submit the get decision definition XML request.
    #[tracing::instrument(skip(self), name = "get_decision_definition_xml", err)]
    pub async fn send(self) -> Result<DecisionDefinitionXml> {
        self.client
            .request(Method::GET, self.definition.operation(RESOURCE, "xml"))
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
struct EvaluateRequest {
    variables: Variables,
}

/// Evaluates a decision; every matched rule yields one row of output
/// variables.
#[derive(Debug)]
pub struct EvaluateDecisionBuilder {
    client: Client,
    definition: DefinitionRef,
    request: EvaluateRequest,
}

impl EvaluateDecisionBuilder {
    /// Create a new evaluate decision builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        EvaluateDecisionBuilder {
            client,
            definition,
            request: EvaluateRequest::default(),
        }
    }

    /// Set an input variable.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Set input variables.
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.request.variables.extend(variables);
        self
    }

    /// Submit the evaluation.
    #[tracing::instrument(skip(self), name = "evaluate_decision", err)]
    pub async fn send(self) -> Result<Vec<Variables>> {
        debug!(definition = ?self.definition, "evaluating decision");
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, self.definition.operation(RESOURCE, "evaluate"))
            .json(&self.request)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryTimeToLiveRequest {
    history_time_to_live: Option<u32>,
}

/// Updates the history time to live of a decision definition.
#[derive(Debug)]
pub struct UpdateDecisionDefinitionHistoryTimeToLiveBuilder {
    client: Client,
    definition: DefinitionRef,
    request: HistoryTimeToLiveRequest,
}

impl UpdateDecisionDefinitionHistoryTimeToLiveBuilder {
    /// Create a new update history time to live builder.
    pub fn new(client: Client, definition: DefinitionRef) -> Self {
        UpdateDecisionDefinitionHistoryTimeToLiveBuilder {
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
    #[tracing::instrument(skip(self), name = "update_decision_definition_history_time_to_live", err)]
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
