use crate::{
    client::Client,
    processinst::ProcessInstance,
    request::is_false,
    variable::{Variable, Variables},
    Result,
};
use reqwest::Method;
use serde::Serialize;
use tracing::trace;

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateConditionRequest {
    variables: Variables,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
}

impl Client {
    /// Evaluates the conditional start events of deployed process definitions.
    pub fn evaluate_condition(&self) -> EvaluateConditionBuilder {
        EvaluateConditionBuilder::new(self.clone())
    }
}

/// Evaluates conditional start events against a set of variables, starting a
/// process instance for every condition that holds.
#[derive(Debug)]
pub struct EvaluateConditionBuilder {
    client: Client,
    request: EvaluateConditionRequest,
}

impl EvaluateConditionBuilder {
    /// Create a new evaluate condition builder.
    pub fn new(client: Client) -> Self {
        EvaluateConditionBuilder {
            client,
            request: EvaluateConditionRequest::default(),
        }
    }

    /// Set a variable the conditions are evaluated against; it is also set on
    /// started instances.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Set the business key of started instances.
    pub fn with_business_key<T: Into<String>>(mut self, business_key: T) -> Self {
        self.request.business_key = Some(business_key.into());
        self
    }

    /// Only evaluate conditions of definitions of the tenant.
    pub fn with_tenant_id<T: Into<String>>(mut self, tenant_id: T) -> Self {
        self.request.tenant_id = Some(tenant_id.into());
        self
    }

    /// Only evaluate conditions of definitions without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.request.without_tenant_id = true;
        self
    }

    /// Only evaluate conditions of the process definition.
    pub fn with_process_definition_id<T: Into<String>>(mut self, id: T) -> Self {
        self.request.process_definition_id = Some(id.into());
        self
    }

    /// Submit the evaluation; returns the started process instances.
    #[tracing::instrument(skip(self), name = "evaluate_condition", err)]
    pub async fn send(self) -> Result<Vec<ProcessInstance>> {
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, ["condition"])
            .json(&self.request)
            .send()
            .await
    }
}
