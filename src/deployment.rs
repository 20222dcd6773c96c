use crate::{
    client::Client,
    decisiondef::DecisionDefinition,
    processdef::ProcessDefinition,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery},
    util, Error, Result,
};
use chrono::{DateTime, Utc};
use reqwest::{multipart, Method};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, trace};

/// A deployment of process, decision and form resources.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// the id of the deployment
    pub id: String,
    /// the name of the deployment
    pub name: Option<String>,
    /// the source of the deployment, e.g. `process application`
    pub source: Option<String>,
    /// the tenant of the deployment
    pub tenant_id: Option<String>,
    /// when the deployment was created
    #[serde(default, with = "util::timestamp::option")]
    pub deployment_time: Option<DateTime<Utc>>,
}

/// A deployment together with the definitions it created.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentWithDefinitions {
    /// the deployment itself
    #[serde(flatten)]
    pub deployment: Deployment,
    /// deployed process definitions, keyed by id
    #[serde(default)]
    pub deployed_process_definitions: Option<HashMap<String, ProcessDefinition>>,
    /// deployed decision definitions, keyed by id
    #[serde(default)]
    pub deployed_decision_definitions: Option<HashMap<String, DecisionDefinition>>,
}

impl DeploymentWithDefinitions {
    /// The deployed process definitions, in no particular order.
    pub fn process_definitions(&self) -> Vec<&ProcessDefinition> {
        self.deployed_process_definitions
            .iter()
            .flat_map(|definitions| definitions.values())
            .collect()
    }
}

/// A single resource of a deployment.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResource {
    /// the id of the resource
    pub id: String,
    /// the name of the resource, e.g. `invoice.bpmn`
    pub name: String,
    /// the id of the deployment the resource belongs to
    pub deployment_id: String,
}

/// Keys deployments can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeploymentSortKey {
    /// deployment id
    Id,
    /// deployment name
    Name,
    /// deployment time
    DeploymentTime,
    /// tenant id
    TenantId,
}

/// Filter for deployment queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_source: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
    #[serde(skip_serializing_if = "is_false")]
    include_deployments_without_tenant_id: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    after: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    before: Option<DateTime<Utc>>,
}

impl ListQuery for DeploymentQuery {
    const PATH: &'static [&'static str] = &["deployment"];
    type SortKey = DeploymentSortKey;
    type Item = Deployment;
}

impl DeploymentQuery {
    /// An empty filter matching all deployments.
    pub fn new() -> Self {
        DeploymentQuery::default()
    }

    /// Filter by deployment id.
    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Filter by deployment name.
    pub fn with_name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by a `LIKE` pattern on the deployment name.
    pub fn with_name_like<T: Into<String>>(mut self, name_like: T) -> Self {
        self.name_like = Some(name_like.into());
        self
    }

    /// Filter by deployment source.
    pub fn with_source<T: Into<String>>(mut self, source: T) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Only include deployments without a source.
    pub fn without_source(mut self) -> Self {
        self.without_source = true;
        self
    }

    /// Only include deployments of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include deployments without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.without_tenant_id = true;
        self
    }

    /// Include deployments without a tenant in a tenant filtered query.
    pub fn include_deployments_without_tenant_id(mut self) -> Self {
        self.include_deployments_without_tenant_id = true;
        self
    }

    /// Only include deployments created after the given time.
    pub fn with_after(mut self, after: DateTime<Utc>) -> Self {
        self.after = Some(after);
        self
    }

    /// Only include deployments created before the given time.
    pub fn with_before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }
}

/// Queries deployments.
pub type GetDeploymentListBuilder = ListBuilder<DeploymentQuery>;
/// Counts deployments.
pub type CountDeploymentsBuilder = CountBuilder<DeploymentQuery>;

impl Client {
    /// Queries deployments matching a filter.
    pub fn get_deployment_list(&self, query: DeploymentQuery) -> GetDeploymentListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts deployments matching a filter.
    pub fn count_deployments(&self, query: DeploymentQuery) -> CountDeploymentsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single deployment.
    pub fn get_deployment<T: Into<String>>(&self, id: T) -> GetDeploymentBuilder {
        GetDeploymentBuilder::new(self.clone(), id)
    }

    /// Creates a deployment from one or more resources.
    ///
    /// Note that this is an atomic call, i.e. either all resources are
    /// deployed, or none of them are.
    pub fn create_deployment<T: Into<String>>(&self, name: T) -> CreateDeploymentBuilder {
        CreateDeploymentBuilder::new(self.clone(), name)
    }

    /// Re-deploys the resources of an existing deployment.
    pub fn redeploy<T: Into<String>>(&self, id: T) -> RedeployBuilder {
        RedeployBuilder::new(self.clone(), id)
    }

    /// Lists the resources of a deployment.
    pub fn get_deployment_resources<T: Into<String>>(
        &self,
        id: T,
    ) -> GetDeploymentResourcesBuilder {
        GetDeploymentResourcesBuilder::new(self.clone(), id)
    }

    /// Retrieves a single resource of a deployment.
    pub fn get_deployment_resource<T: Into<String>, R: Into<String>>(
        &self,
        id: T,
        resource_id: R,
    ) -> GetDeploymentResourceBuilder {
        GetDeploymentResourceBuilder::new(self.clone(), id, resource_id)
    }

    /// Retrieves the binary content of a deployment resource.
    pub fn get_deployment_resource_data<T: Into<String>, R: Into<String>>(
        &self,
        id: T,
        resource_id: R,
    ) -> GetDeploymentResourceDataBuilder {
        GetDeploymentResourceDataBuilder::new(self.clone(), id, resource_id)
    }

    /// Deletes a deployment.
    pub fn delete_deployment<T: Into<String>>(&self, id: T) -> DeleteDeploymentBuilder {
        DeleteDeploymentBuilder::new(self.clone(), id)
    }
}

/// Retrieves a single deployment.
#[derive(Debug)]
pub struct GetDeploymentBuilder {
    client: Client,
    id: String,
}

impl GetDeploymentBuilder {
    /// Create a new get deployment builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetDeploymentBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get deployment request.
    #[tracing::instrument(skip(self), name = "get_deployment", err)]
    pub async fn send(self) -> Result<Deployment> {
        debug!(id = %self.id, "fetching deployment");
        self.client
            .request(Method::GET, ["deployment", self.id.as_str()])
            .send()
            .await
    }
}

#[derive(Debug)]
enum ResourceSource {
    File(String),
    Bytes { name: String, content: Vec<u8> },
}

/// Creates a deployment.
#[derive(Debug)]
pub struct CreateDeploymentBuilder {
    client: Client,
    name: String,
    enable_duplicate_filtering: bool,
    deploy_changed_only: bool,
    source: Option<String>,
    tenant_id: Option<String>,
    activation_time: Option<DateTime<Utc>>,
    resources: Vec<ResourceSource>,
}

impl CreateDeploymentBuilder {
    /// Create a new create deployment builder.
    pub fn new<T: Into<String>>(client: Client, name: T) -> Self {
        CreateDeploymentBuilder {
            client,
            name: name.into(),
            enable_duplicate_filtering: false,
            deploy_changed_only: false,
            source: None,
            tenant_id: None,
            activation_time: None,
            resources: Vec::new(),
        }
    }

    /// Skip the deployment if no resource changed compared to the last
    /// deployment with the same name and source.
    pub fn with_duplicate_filtering(self, enable_duplicate_filtering: bool) -> Self {
        CreateDeploymentBuilder {
            enable_duplicate_filtering,
            ..self
        }
    }

    /// Only deploy the resources that changed. Implies duplicate filtering.
    pub fn with_deploy_changed_only(self, deploy_changed_only: bool) -> Self {
        CreateDeploymentBuilder {
            deploy_changed_only,
            ..self
        }
    }

    /// Set the source of the deployment.
    pub fn with_source<T: Into<String>>(self, source: T) -> Self {
        CreateDeploymentBuilder {
            source: Some(source.into()),
            ..self
        }
    }

    /// Set the tenant of the deployment.
    pub fn with_tenant_id<T: Into<String>>(self, tenant_id: T) -> Self {
        CreateDeploymentBuilder {
            tenant_id: Some(tenant_id.into()),
            ..self
        }
    }

    /// Activate the deployed process definitions at the given time only.
    pub fn with_activation_time(self, activation_time: DateTime<Utc>) -> Self {
        CreateDeploymentBuilder {
            activation_time: Some(activation_time),
            ..self
        }
    }

    /// Add a resource file to upload; it is read when the request is sent.
    pub fn with_resource_file<T: Into<String>>(mut self, resource_file: T) -> Self {
        self.resources.push(ResourceSource::File(resource_file.into()));
        self
    }

    /// Add a list of resource files to upload.
    pub fn with_resource_files(mut self, resource_files: Vec<String>) -> Self {
        self.resources
            .extend(resource_files.into_iter().map(ResourceSource::File));
        self
    }

    /// Add an in-memory resource; the name decides how the engine parses it,
    /// e.g. `order.bpmn` or `discount.dmn`.
    pub fn with_resource<N: Into<String>, C: Into<Vec<u8>>>(mut self, name: N, content: C) -> Self {
        self.resources.push(ResourceSource::Bytes {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    async fn read_resources(resources: Vec<ResourceSource>) -> Result<Vec<(String, Vec<u8>)>> {
        let mut read = Vec::with_capacity(resources.len());
        for resource in resources {
            match resource {
                ResourceSource::Bytes { name, content } => read.push((name, content)),
                ResourceSource::File(path) => {
                    trace!(file = %path, "reading resource file");
                    let mut file = File::open(&path).await.map_err(|e| Error::FileIo {
                        resource_file: path.clone(),
                        source: e,
                    })?;
                    let mut content = vec![];
                    file.read_to_end(&mut content)
                        .await
                        .map_err(|e| Error::FileIo {
                            resource_file: path.clone(),
                            source: e,
                        })?;
                    let name = Path::new(&path)
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.clone());
                    read.push((name, content));
                }
            }
        }
        Ok(read)
    }

    /// Submit the deployment to the engine.
    #[tracing::instrument(skip(self), name = "create_deployment", err)]
    pub async fn send(self) -> Result<DeploymentWithDefinitions> {
        if self.resources.is_empty() {
            return Err(Error::InvalidParameters("at least one resource must be set"));
        }
        let resources = Self::read_resources(self.resources).await?;

        let mut form = multipart::Form::new().text("deployment-name", self.name.clone());
        if self.enable_duplicate_filtering {
            form = form.text("enable-duplicate-filtering", "true");
        }
        if self.deploy_changed_only {
            form = form.text("deploy-changed-only", "true");
        }
        if let Some(source) = self.source {
            form = form.text("deployment-source", source);
        }
        if let Some(tenant_id) = self.tenant_id {
            form = form.text("tenant-id", tenant_id);
        }
        if let Some(activation_time) = self.activation_time {
            form = form.text(
                "deployment-activation-time",
                util::format_timestamp(&activation_time),
            );
        }

        debug!(
            name = %self.name,
            resources = ?resources.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            "sending request"
        );
        for (name, content) in resources {
            form = form.part(name.clone(), multipart::Part::bytes(content).file_name(name));
        }

        self.client
            .request(Method::POST, ["deployment", "create"])
            .multipart(form)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct RedeployRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resource_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resource_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

/// Re-deploys an existing deployment.
///
/// Without resource ids or names all resources of the deployment are deployed
/// again.
#[derive(Debug)]
pub struct RedeployBuilder {
    client: Client,
    id: String,
    request: RedeployRequest,
}

impl RedeployBuilder {
    /// Create a new redeploy builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        RedeployBuilder {
            client,
            id: id.into(),
            request: RedeployRequest::default(),
        }
    }

    /// Only redeploy the resources with the given ids.
    pub fn with_resource_ids(mut self, resource_ids: Vec<String>) -> Self {
        self.request.resource_ids = resource_ids;
        self
    }

    /// Only redeploy the resources with the given names.
    pub fn with_resource_names(mut self, resource_names: Vec<String>) -> Self {
        self.request.resource_names = resource_names;
        self
    }

    /// Set the source of the new deployment.
    pub fn with_source<T: Into<String>>(mut self, source: T) -> Self {
        self.request.source = Some(source.into());
        self
    }

    /// Submit the redeploy request.
    #[tracing::instrument(skip(self), name = "redeploy", err)]
    pub async fn send(self) -> Result<DeploymentWithDefinitions> {
        debug!(id = %self.id, "redeploying");
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, ["deployment", self.id.as_str(), "redeploy"])
            .json(&self.request)
            .send()
            .await
    }
}

/// Lists the resources of a deployment.
#[derive(Debug)]
pub struct GetDeploymentResourcesBuilder {
    client: Client,
    id: String,
}

impl GetDeploymentResourcesBuilder {
    /// Create a new get deployment resources builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetDeploymentResourcesBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get deployment resources request.
    #[tracing::instrument(skip(self), name = "get_deployment_resources", err)]
    pub async fn send(self) -> Result<Vec<DeploymentResource>> {
        self.client
            .request(Method::GET, ["deployment", self.id.as_str(), "resources"])
            .send()
            .await
    }
}

/// Retrieves a single resource of a deployment.
#[derive(Debug)]
pub struct GetDeploymentResourceBuilder {
    client: Client,
    id: String,
    resource_id: String,
}

impl GetDeploymentResourceBuilder {
    /// Create a new get deployment resource builder.
    pub fn new<T: Into<String>, R: Into<String>>(client: Client, id: T, resource_id: R) -> Self {
        GetDeploymentResourceBuilder {
            client,
            id: id.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Submit the get deployment resource request.
    #[tracing::instrument(skip(self), name = "get_deployment_resource", err)]
    pub async fn send(self) -> Result<DeploymentResource> {
        self.client
            .request(
                Method::GET,
                [
                    "deployment",
                    self.id.as_str(),
                    "resources",
                    self.resource_id.as_str(),
                ],
            )
            .send()
            .await
    }
}

/// Retrieves the binary content of a deployment resource.
#[derive(Debug)]
pub struct GetDeploymentResourceDataBuilder {
    client: Client,
    id: String,
    resource_id: String,
}

impl GetDeploymentResourceDataBuilder {
    /// Create a new get deployment resource data builder.
    pub fn new<T: Into<String>, R: Into<String>>(client: Client, id: T, resource_id: R) -> Self {
        GetDeploymentResourceDataBuilder {
            client,
            id: id.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Submit the get deployment resource data request.
    #[tracing::instrument(skip(self), name = "get_deployment_resource_data", err)]
    pub async fn send(self) -> Result<Vec<u8>> {
        self.client
            .request(
                Method::GET,
                [
                    "deployment",
                    self.id.as_str(),
                    "resources",
                    self.resource_id.as_str(),
                    "data",
                ],
            )
            .send_bytes()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteDeploymentQuery {
    #[serde(skip_serializing_if = "is_false")]
    cascade: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_custom_listeners: bool,
    #[serde(skip_serializing_if = "is_false")]
    skip_io_mappings: bool,
}

/// Deletes a deployment.
#[derive(Debug)]
pub struct DeleteDeploymentBuilder {
    client: Client,
    id: String,
    query: DeleteDeploymentQuery,
}

impl DeleteDeploymentBuilder {
    /// Create a new delete deployment builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteDeploymentBuilder {
            client,
            id: id.into(),
            query: DeleteDeploymentQuery::default(),
        }
    }

    /// Also delete the process instances, history and jobs of the deployment.
    pub fn with_cascade(mut self, cascade: bool) -> Self {
        self.query.cascade = cascade;
        self
    }

    /// Skip custom listeners when deleting running instances.
    pub fn with_skip_custom_listeners(mut self, skip_custom_listeners: bool) -> Self {
        self.query.skip_custom_listeners = skip_custom_listeners;
        self
    }

    /// Skip input/output mappings when deleting running instances.
    pub fn with_skip_io_mappings(mut self, skip_io_mappings: bool) -> Self {
        self.query.skip_io_mappings = skip_io_mappings;
        self
    }

    /// Submit the delete deployment request.
    #[tracing::instrument(skip(self), name = "delete_deployment", err)]
    pub async fn send(self) -> Result<()> {
        debug!(id = %self.id, query = ?self.query, "deleting deployment");
        self.client
            .request(Method::DELETE, ["deployment", self.id.as_str()])
            .query(&self.query)
            .send_empty()
            .await
    }
}
