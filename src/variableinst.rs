use crate::{
    client::Client,
    request::{comma_separated, CountBuilder, ListBuilder, ListQuery},
    variable::{Variable, VariableFilter},
    Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};

const RESOURCE: &str = "variable-instance";

/// A variable stored in the runtime database, with its scope.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableInstance {
    /// the id of the variable instance
    pub id: String,
    /// the name of the variable
    pub name: String,
    /// the value and type of the variable
    #[serde(flatten)]
    pub variable: Variable,
    /// the process definition of the variable
    pub process_definition_id: Option<String>,
    /// the process instance of the variable
    pub process_instance_id: Option<String>,
    /// the execution the variable belongs to
    pub execution_id: Option<String>,
    /// the case instance of the variable
    pub case_instance_id: Option<String>,
    /// the case execution of the variable
    pub case_execution_id: Option<String>,
    /// the task the variable belongs to
    pub task_id: Option<String>,
    /// the batch the variable belongs to
    pub batch_id: Option<String>,
    /// the activity instance the variable belongs to
    pub activity_instance_id: Option<String>,
    /// the tenant of the variable
    pub tenant_id: Option<String>,
    /// why the value could not be deserialized, if it could not
    pub error_message: Option<String>,
}

/// Keys variable instances can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableInstanceSortKey {
    /// variable name
    VariableName,
    /// variable type
    VariableType,
    /// activity instance id
    ActivityInstanceId,
    /// tenant id
    TenantId,
}

/// Filter for variable instance queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableInstanceQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    variable_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    variable_name_like: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_instance_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    execution_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    task_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    activity_instance_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    variable_values: Vec<VariableFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deserialize_values: Option<bool>,
}

impl ListQuery for VariableInstanceQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = VariableInstanceSortKey;
    type Item = VariableInstance;
}

impl VariableInstanceQuery {
    /// An empty filter matching all variable instances.
    pub fn new() -> Self {
        VariableInstanceQuery::default()
    }

    /// Filter by variable name.
    pub fn with_variable_name<T: Into<String>>(mut self, name: T) -> Self {
        self.variable_name = Some(name.into());
        self
    }

    /// Filter by a `LIKE` pattern on the variable name.
    pub fn with_variable_name_like<T: Into<String>>(mut self, name_like: T) -> Self {
        self.variable_name_like = Some(name_like.into());
        self
    }

    /// Only include variables of the given process instances.
    pub fn with_process_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.process_instance_id_in = ids;
        self
    }

    /// Only include variables of the given executions.
    pub fn with_execution_ids(mut self, ids: Vec<String>) -> Self {
        self.execution_id_in = ids;
        self
    }

    /// Only include variables of the given tasks.
    pub fn with_task_ids(mut self, ids: Vec<String>) -> Self {
        self.task_id_in = ids;
        self
    }

    /// Only include variables of the given activity instances.
    pub fn with_activity_instance_ids(mut self, ids: Vec<String>) -> Self {
        self.activity_instance_id_in = ids;
        self
    }

    /// Only include variables of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include variables with a matching value.
    pub fn with_variable_value(mut self, filter: VariableFilter) -> Self {
        self.variable_values.push(filter);
        self
    }

    /// Whether `Object` values are deserialized on the server.
    pub fn with_deserialize_values(mut self, deserialize_values: bool) -> Self {
        self.deserialize_values = (!deserialize_values).then_some(false);
        self
    }
}

/// Queries variable instances.
pub type GetVariableInstanceListBuilder = ListBuilder<VariableInstanceQuery>;
/// Counts variable instances.
pub type CountVariableInstancesBuilder = CountBuilder<VariableInstanceQuery>;

impl Client {
    /// Queries variable instances matching a filter.
    pub fn get_variable_instance_list(
        &self,
        query: VariableInstanceQuery,
    ) -> GetVariableInstanceListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts variable instances matching a filter.
    pub fn count_variable_instances(
        &self,
        query: VariableInstanceQuery,
    ) -> CountVariableInstancesBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single variable instance.
    pub fn get_variable_instance<T: Into<String>>(&self, id: T) -> GetVariableInstanceBuilder {
        GetVariableInstanceBuilder::new(self.clone(), id)
    }

    /// Retrieves the binary content of a variable instance.
    pub fn get_variable_instance_data<T: Into<String>>(
        &self,
        id: T,
    ) -> GetVariableInstanceDataBuilder {
        GetVariableInstanceDataBuilder::new(self.clone(), id)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeserializeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    deserialize_value: Option<bool>,
}

/// Retrieves a single variable instance.
#[derive(Debug)]
pub struct GetVariableInstanceBuilder {
    client: Client,
    id: String,
    query: DeserializeQuery,
}

impl GetVariableInstanceBuilder {
    /// Create a new get variable instance builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetVariableInstanceBuilder {
            client,
            id: id.into(),
            query: DeserializeQuery::default(),
        }
    }

    /// Whether an `Object` value is deserialized on the server.
    pub fn with_deserialize_value(mut self, deserialize_value: bool) -> Self {
        self.query.deserialize_value = (!deserialize_value).then_some(false);
        self
    }

    /// Submit the get variable instance request.
    #[tracing::instrument(skip(self), name = "get_variable_instance", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<VariableInstance> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .query(&self.query)
            .send()
            .await
    }
}

/// Retrieves the binary content of a variable instance.
#[derive(Debug)]
pub struct GetVariableInstanceDataBuilder {
    client: Client,
    id: String,
}

impl GetVariableInstanceDataBuilder {
    /// Create a new get variable instance data builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetVariableInstanceDataBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get variable instance data request.
    #[tracing::instrument(skip(self), name = "get_variable_instance_data", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Vec<u8>> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "data"])
            .send_bytes()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variable_instance_carries_typed_value() {
        let instance: VariableInstance = serde_json::from_value(json!({
            "id": "v-1",
            "name": "amount",
            "type": "Integer",
            "value": 30,
            "valueInfo": {},
            "processDefinitionId": "invoice:1:7",
            "processInstanceId": "pi-1",
            "executionId": "pi-1",
            "caseInstanceId": null,
            "caseExecutionId": null,
            "taskId": null,
            "batchId": null,
            "activityInstanceId": "pi-1",
            "tenantId": null,
            "errorMessage": null
        }))
        .unwrap();

        assert_eq!(instance.variable.value_type.as_deref(), Some("Integer"));
        assert_eq!(instance.variable.value_as::<i64>().unwrap(), 30);
    }
}
