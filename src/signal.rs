use crate::{
    client::Client,
    request::is_false,
    variable::{Variable, Variables},
    Error, Result,
};
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, trace};

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThrowSignalRequest {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_id: Option<String>,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
}

impl Client {
    /// Delivers a signal to all matching subscriptions, or to a single
    /// execution.
    pub fn throw_signal(&self) -> ThrowSignalBuilder {
        ThrowSignalBuilder::new(self.clone())
    }
}

/// Configuration to throw a signal.
#[derive(Debug)]
pub struct ThrowSignalBuilder {
    client: Client,
    name: Option<String>,
    request: ThrowSignalRequest,
}

impl ThrowSignalBuilder {
    /// Create a new throw signal builder.
    pub fn new(client: Client) -> Self {
        ThrowSignalBuilder {
            client,
            name: None,
            request: ThrowSignalRequest::default(),
        }
    }

    /// Set the name of the signal.
    pub fn with_name<T: Into<String>>(self, name: T) -> Self {
        ThrowSignalBuilder {
            name: Some(name.into()),
            ..self
        }
    }

    /// Only deliver the signal to the execution.
    pub fn with_execution_id<T: Into<String>>(mut self, execution_id: T) -> Self {
        self.request.execution_id = Some(execution_id.into());
        self
    }

    /// Set a variable passed to the receivers.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Only deliver the signal to subscriptions of the tenant.
    pub fn with_tenant_id<T: Into<String>>(mut self, tenant_id: T) -> Self {
        self.request.tenant_id = Some(tenant_id.into());
        self
    }

    /// Only deliver the signal to subscriptions without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.request.without_tenant_id = true;
        self
    }

    /// Submit the throw signal request.
    #[tracing::instrument(skip(self), name = "throw_signal", err)]
    pub async fn send(mut self) -> Result<()> {
        self.request.name = self
            .name
            .take()
            .ok_or(Error::InvalidParameters("`name` must be set"))?;
        if self.request.tenant_id.is_some() && self.request.without_tenant_id {
            return Err(Error::InvalidParameters(
                "`tenant_id` and `without_tenant_id` are mutually exclusive",
            ));
        }

        debug!(name = %self.request.name, "throwing signal");
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, ["signal"])
            .json(&self.request)
            .send_empty()
            .await
    }
}
