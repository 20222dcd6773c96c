use crate::{
    client::Client,
    processinst::ProcessInstance,
    request::is_false,
    variable::{Variable, Variables},
    Error, Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// What a message was correlated to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ResultType {
    /// a waiting execution received the message
    Execution,
    /// a message start event started a new process instance
    ProcessDefinition,
}

/// The execution a message was correlated to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelatedExecution {
    /// the id of the execution
    pub id: String,
    /// the process instance of the execution
    pub process_instance_id: String,
    /// whether the execution has ended
    #[serde(default)]
    pub ended: bool,
    /// the tenant of the execution
    pub tenant_id: Option<String>,
}

/// The outcome of correlating a message.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCorrelationResult {
    /// what the message was correlated to
    pub result_type: ResultType,
    /// the execution, for [`ResultType::Execution`]
    pub execution: Option<CorrelatedExecution>,
    /// the started process instance, for [`ResultType::ProcessDefinition`]
    pub process_instance: Option<ProcessInstance>,
    /// the process variables after correlation, if requested
    #[serde(default)]
    pub variables: Option<Variables>,
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CorrelateMessageRequest {
    message_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    business_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    without_tenant_id: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    correlation_keys: Variables,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    local_correlation_keys: Variables,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    process_variables: Variables,
    #[serde(skip_serializing_if = "Variables::is_empty")]
    process_variables_local: Variables,
    #[serde(skip_serializing_if = "is_false")]
    all: bool,
    #[serde(skip_serializing_if = "is_false")]
    result_enabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    variables_in_result_enabled: bool,
}

impl Client {
    /// Correlates a message to exactly one waiting execution or message start
    /// event.
    pub fn correlate_message(&self) -> CorrelateMessageBuilder {
        CorrelateMessageBuilder::new(self.clone(), false)
    }

    /// Correlates a message to all matching executions and message start
    /// events.
    pub fn correlate_all_messages(&self) -> CorrelateMessageBuilder {
        CorrelateMessageBuilder::new(self.clone(), true)
    }
}

/// Configuration to correlate a message.
#[derive(Debug)]
pub struct CorrelateMessageBuilder {
    client: Client,
    name: Option<String>,
    request: CorrelateMessageRequest,
}

impl CorrelateMessageBuilder {
    /// Create a new correlate message builder; `all` correlates to every match.
    pub fn new(client: Client, all: bool) -> Self {
        CorrelateMessageBuilder {
            client,
            name: None,
            request: CorrelateMessageRequest {
                all,
                ..Default::default()
            },
        }
    }

    /// Set the name of the message.
    pub fn with_name<T: Into<String>>(self, name: T) -> Self {
        CorrelateMessageBuilder {
            name: Some(name.into()),
            ..self
        }
    }

    /// Only correlate to process instances with the business key.
    pub fn with_business_key<T: Into<String>>(mut self, business_key: T) -> Self {
        self.request.business_key = Some(business_key.into());
        self
    }

    /// Only correlate to subscriptions of the tenant.
    pub fn with_tenant_id<T: Into<String>>(mut self, tenant_id: T) -> Self {
        self.request.tenant_id = Some(tenant_id.into());
        self
    }

    /// Only correlate to subscriptions without a tenant.
    pub fn without_tenant_id(mut self) -> Self {
        self.request.without_tenant_id = true;
        self
    }

    /// Only correlate to the process instance.
    pub fn with_process_instance_id<T: Into<String>>(mut self, process_instance_id: T) -> Self {
        self.request.process_instance_id = Some(process_instance_id.into());
        self
    }

    /// Only correlate to process instances with a matching variable.
    pub fn with_correlation_key<T: Into<String>>(mut self, name: T, value: Variable) -> Self {
        self.request.correlation_keys.insert(name.into(), value);
        self
    }

    /// Only correlate to executions with a matching local variable.
    pub fn with_local_correlation_key<T: Into<String>>(mut self, name: T, value: Variable) -> Self {
        self.request.local_correlation_keys.insert(name.into(), value);
        self
    }

    /// Set a variable on the process instance receiving the message.
    pub fn with_process_variable<T: Into<String>>(mut self, name: T, value: Variable) -> Self {
        self.request.process_variables.insert(name.into(), value);
        self
    }

    /// Set a variable local to the execution receiving the message.
    pub fn with_process_variable_local<T: Into<String>>(mut self, name: T, value: Variable) -> Self {
        self.request.process_variables_local.insert(name.into(), value);
        self
    }

    /// Return the correlation results.
    pub fn with_result_enabled(mut self, result_enabled: bool) -> Self {
        self.request.result_enabled = result_enabled;
        self
    }

    /// Return the process variables with the correlation results.
    pub fn with_variables_in_result_enabled(mut self, variables_in_result_enabled: bool) -> Self {
        self.request.variables_in_result_enabled = variables_in_result_enabled;
        self
    }

    /// Submit the correlate message request.
    ///
    /// The results are empty unless results are enabled.
    #[tracing::instrument(skip(self), name = "correlate_message", err)]
    pub async fn send(mut self) -> Result<Vec<MessageCorrelationResult>> {
        self.request.message_name = self
            .name
            .take()
            .ok_or(Error::InvalidParameters("`name` must be set"))?;
        if self.request.variables_in_result_enabled {
            self.request.result_enabled = true;
        }

        debug!(name = %self.request.message_name, all = self.request.all, "correlating message");
        trace!(req = ?self.request, "request:");
        let results = self
            .client
            .request(Method::POST, ["message"])
            .json(&self.request)
            .send_optional()
            .await?;
        Ok(results.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn correlation_results_parse() {
        let results: Vec<MessageCorrelationResult> = serde_json::from_value(json!([
            {
                "resultType": "Execution",
                "execution": {"id": "ex-1", "processInstanceId": "pi-1", "ended": false, "tenantId": null},
                "processInstance": null
            },
            {
                "resultType": "ProcessDefinition",
                "execution": null,
                "processInstance": {
                    "id": "pi-2", "definitionId": "invoice:1:7", "businessKey": null,
                    "caseInstanceId": null, "ended": false, "suspended": false, "tenantId": null
                },
                "variables": {"amount": {"type": "Integer", "value": 5, "valueInfo": {}}}
            }
        ]))
        .unwrap();

        assert_eq!(results[0].result_type, ResultType::Execution);
        assert_eq!(results[0].execution.as_ref().unwrap().process_instance_id, "pi-1");
        assert_eq!(results[1].process_instance.as_ref().unwrap().id, "pi-2");
        assert!(results[1].variables.as_ref().unwrap().contains_key("amount"));
    }
}
