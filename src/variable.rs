use crate::{client::Client, util, Error, Result};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

/// Variables keyed by name.
pub type Variables = BTreeMap<String, Variable>;

/// A typed process variable as exchanged with the engine.
///
/// The `type` names the engine value type (`String`, `Integer`, `Long`,
/// `Double`, `Boolean`, `Date`, `Json`, `Object`, `Null`, …). Untyped variables
/// let the engine infer the type from the JSON value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// the variable value
    #[serde(default)]
    pub value: Value,
    /// the engine value type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// type specific details, e.g. `objectTypeName` and `serializationDataFormat`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_info: Option<Map<String, Value>>,
}

impl Variable {
    /// An untyped variable; the engine infers the type.
    pub fn new<T: Into<Value>>(value: T) -> Self {
        Variable {
            value: value.into(),
            ..Default::default()
        }
    }

    /// A variable of an explicit engine type.
    pub fn typed<T: Into<Value>, N: Into<String>>(value: T, value_type: N) -> Self {
        Variable {
            value: value.into(),
            value_type: Some(value_type.into()),
            value_info: None,
        }
    }

    /// A `String` variable.
    pub fn string<T: Into<String>>(value: T) -> Self {
        Variable::typed(value.into(), "String")
    }

    /// An `Integer` variable.
    pub fn integer(value: i32) -> Self {
        Variable::typed(value, "Integer")
    }

    /// A `Long` variable.
    pub fn long(value: i64) -> Self {
        Variable::typed(value, "Long")
    }

    /// A `Double` variable.
    pub fn double(value: f64) -> Self {
        Variable::typed(value, "Double")
    }

    /// A `Boolean` variable.
    pub fn boolean(value: bool) -> Self {
        Variable::typed(value, "Boolean")
    }

    /// A `Date` variable.
    pub fn date(value: DateTime<Utc>) -> Self {
        Variable::typed(util::format_timestamp(&value), "Date")
    }

    /// A `Null` variable.
    pub fn null() -> Self {
        Variable::typed(Value::Null, "Null")
    }

    /// A `Json` variable; the value is sent as a serialized JSON document.
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Variable::typed(serde_json::to_string(value)?, "Json"))
    }

    /// Add a value info entry, e.g. `objectTypeName` for `Object` variables.
    pub fn with_value_info<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.value_info
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Deserialize the value as a given type.
    ///
    /// `Json` variables and serialized `Object` variables carry their payload
    /// as a string and are parsed from it.
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T> {
        match (&self.value, self.value_type.as_deref()) {
            (Value::String(document), Some("Json") | Some("Object")) => {
                Ok(serde_json::from_str(document)?)
            }
            (value, _) => Ok(serde_json::from_value(value.clone())?),
        }
    }

    /// The value as a timestamp, for `Date` variables.
    pub fn value_as_date(&self) -> Result<DateTime<Utc>> {
        match &self.value {
            Value::String(value) => util::parse_timestamp(value),
            other => Err(Error::InvalidTimestamp(other.to_string())),
        }
    }
}

/// Convert a serializable struct or map into variables, one per field.
///
/// Scalars become untyped variables; nested objects and arrays become `Json`
/// variables.
pub fn to_variables<T: Serialize>(value: &T) -> Result<Variables> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => fields
            .into_iter()
            .map(|(name, value)| {
                let variable = match value {
                    Value::Object(_) | Value::Array(_) => Variable::json(&value)?,
                    Value::Null => Variable::null(),
                    scalar => Variable::new(scalar),
                };
                Ok((name, variable))
            })
            .collect(),
        Value::Null => Ok(Variables::new()),
        _ => Err(Error::InvalidParameters(
            "only structs and maps convert to variables",
        )),
    }
}

/// Deserialize variables into a struct or map, field by variable name.
pub fn from_variables<T: DeserializeOwned>(variables: &Variables) -> Result<T> {
    let fields = variables
        .iter()
        .map(|(name, variable)| Ok((name.clone(), variable.value_as::<Value>()?)))
        .collect::<Result<Map<String, Value>>>()?;
    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Comparison used by a variable filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// equal
    Eq,
    /// not equal
    Neq,
    /// greater than
    Gt,
    /// greater than or equal
    Gteq,
    /// lower than
    Lt,
    /// lower than or equal
    Lteq,
    /// SQL `LIKE`, only valid for string values
    Like,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gteq => "gteq",
            Operator::Lt => "lt",
            Operator::Lteq => "lteq",
            Operator::Like => "like",
        }
    }
}

/// Filters list results by a variable value, rendered as `name_operator_value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableFilter {
    name: String,
    operator: Operator,
    value: String,
}

impl VariableFilter {
    /// Create a new variable filter.
    pub fn new<N: Into<String>, V: fmt::Display>(name: N, operator: Operator, value: V) -> Self {
        VariableFilter {
            name: name.into(),
            operator,
            value: value.to_string(),
        }
    }

    /// Filter for variables equal to `value`.
    pub fn eq<N: Into<String>, V: fmt::Display>(name: N, value: V) -> Self {
        VariableFilter::new(name, Operator::Eq, value)
    }
}

impl fmt::Display for VariableFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.name, self.operator.as_str(), self.value)
    }
}

/// The owner of a set of variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableScope {
    resource: &'static str,
    id: String,
    collection: &'static str,
}

impl VariableScope {
    /// Variables of a process instance.
    pub fn process_instance<T: Into<String>>(id: T) -> Self {
        VariableScope::new("process-instance", id, "variables")
    }

    /// Variables visible from a task.
    pub fn task<T: Into<String>>(id: T) -> Self {
        VariableScope::new("task", id, "variables")
    }

    /// Variables local to a task.
    pub fn task_local<T: Into<String>>(id: T) -> Self {
        VariableScope::new("task", id, "localVariables")
    }

    /// Variables local to an execution.
    pub fn execution_local<T: Into<String>>(id: T) -> Self {
        VariableScope::new("execution", id, "localVariables")
    }

    fn new<T: Into<String>>(resource: &'static str, id: T, collection: &'static str) -> Self {
        VariableScope {
            resource,
            id: id.into(),
            collection,
        }
    }

    fn segments(&self) -> [&str; 3] {
        [self.resource, self.id.as_str(), self.collection]
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeserializeQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    deserialize_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deserialize_value: Option<bool>,
}

impl Client {
    /// Retrieves all variables of a scope.
    pub fn get_variables(&self, scope: VariableScope) -> GetVariablesBuilder {
        GetVariablesBuilder::new(self.clone(), scope)
    }

    /// Retrieves a single variable of a scope.
    pub fn get_variable<T: Into<String>>(&self, scope: VariableScope, name: T) -> GetVariableBuilder {
        GetVariableBuilder::new(self.clone(), scope, name)
    }

    /// Retrieves the serialized content of a binary or file variable.
    pub fn get_variable_data<T: Into<String>>(
        &self,
        scope: VariableScope,
        name: T,
    ) -> GetVariableDataBuilder {
        GetVariableDataBuilder::new(self.clone(), scope, name)
    }

    /// Sets a single variable of a scope, creating it if it does not exist.
    pub fn update_variable<T: Into<String>>(
        &self,
        scope: VariableScope,
        name: T,
        variable: Variable,
    ) -> UpdateVariableBuilder {
        UpdateVariableBuilder::new(self.clone(), scope, name, variable)
    }

    /// Deletes a single variable of a scope.
    pub fn delete_variable<T: Into<String>>(
        &self,
        scope: VariableScope,
        name: T,
    ) -> DeleteVariableBuilder {
        DeleteVariableBuilder::new(self.clone(), scope, name)
    }

    /// Updates and deletes variables of a scope in one atomic call.
    ///
    /// Deletions are applied before modifications.
    pub fn modify_variables(&self, scope: VariableScope) -> ModifyVariablesBuilder {
        ModifyVariablesBuilder::new(self.clone(), scope)
    }
}

/// Retrieves all variables of a scope.
#[derive(Debug)]
pub struct GetVariablesBuilder {
    client: Client,
    scope: VariableScope,
    deserialize_values: bool,
}

impl GetVariablesBuilder {
    /// Create a new get variables builder.
    pub fn new(client: Client, scope: VariableScope) -> Self {
        GetVariablesBuilder {
            client,
            scope,
            deserialize_values: true,
        }
    }

    /// Whether `Object` values are deserialized on the server; if not, their
    /// serialized form is returned.
    pub fn with_deserialize_values(self, deserialize_values: bool) -> Self {
        GetVariablesBuilder {
            deserialize_values,
            ..self
        }
    }

    /// Submit the get variables request.
    #[tracing::instrument(skip(self), name = "get_variables", err)]
    pub async fn send(self) -> Result<Variables> {
        debug!(scope = ?self.scope, "fetching variables");
        let query = DeserializeQuery {
            deserialize_values: (!self.deserialize_values).then_some(false),
            ..Default::default()
        };
        self.client
            .request(Method::GET, self.scope.segments())
            .query(&query)
            .send()
            .await
    }
}

/// Retrieves a single variable of a scope.
#[derive(Debug)]
pub struct GetVariableBuilder {
    client: Client,
    scope: VariableScope,
    name: String,
    deserialize_value: bool,
}

impl GetVariableBuilder {
    /// Create a new get variable builder.
    pub fn new<T: Into<String>>(client: Client, scope: VariableScope, name: T) -> Self {
        GetVariableBuilder {
            client,
            scope,
            name: name.into(),
            deserialize_value: true,
        }
    }

    /// Whether an `Object` value is deserialized on the server.
    pub fn with_deserialize_value(self, deserialize_value: bool) -> Self {
        GetVariableBuilder {
            deserialize_value,
            ..self
        }
    }

    /// Submit the get variable request.
    #[tracing::instrument(skip(self), name = "get_variable", err)]
    pub async fn send(self) -> Result<Variable> {
        debug!(scope = ?self.scope, name = %self.name, "fetching variable");
        let query = DeserializeQuery {
            deserialize_value: (!self.deserialize_value).then_some(false),
            ..Default::default()
        };
        let [resource, id, collection] = self.scope.segments();
        self.client
            .request(Method::GET, [resource, id, collection, self.name.as_str()])
            .query(&query)
            .send()
            .await
    }
}

/// Retrieves the content of a binary or file variable.
#[derive(Debug)]
pub struct GetVariableDataBuilder {
    client: Client,
    scope: VariableScope,
    name: String,
}

impl GetVariableDataBuilder {
    /// Create a new get variable data builder.
    pub fn new<T: Into<String>>(client: Client, scope: VariableScope, name: T) -> Self {
        GetVariableDataBuilder {
            client,
            scope,
            name: name.into(),
        }
    }

    /// Submit the get variable data request.
    #[tracing::instrument(skip(self), name = "get_variable_data", err)]
    pub async fn send(self) -> Result<Vec<u8>> {
        let [resource, id, collection] = self.scope.segments();
        self.client
            .request(Method::GET, [resource, id, collection, self.name.as_str(), "data"])
            .send_bytes()
            .await
    }
}

/// Sets a single variable of a scope.
#[derive(Debug)]
pub struct UpdateVariableBuilder {
    client: Client,
    scope: VariableScope,
    name: String,
    variable: Variable,
}

impl UpdateVariableBuilder {
    /// Create a new update variable builder.
    pub fn new<T: Into<String>>(
        client: Client,
        scope: VariableScope,
        name: T,
        variable: Variable,
    ) -> Self {
        UpdateVariableBuilder {
            client,
            scope,
            name: name.into(),
            variable,
        }
    }

    /// Submit the update variable request.
    #[tracing::instrument(skip(self), name = "update_variable", err)]
    pub async fn send(self) -> Result<()> {
        debug!(scope = ?self.scope, name = %self.name, "updating variable");
        trace!(variable = ?self.variable, "request:");
        let [resource, id, collection] = self.scope.segments();
        self.client
            .request(Method::PUT, [resource, id, collection, self.name.as_str()])
            .json(&self.variable)
            .send_empty()
            .await
    }
}

/// Deletes a single variable of a scope.
#[derive(Debug)]
pub struct DeleteVariableBuilder {
    client: Client,
    scope: VariableScope,
    name: String,
}

impl DeleteVariableBuilder {
    /// Create a new delete variable builder.
    pub fn new<T: Into<String>>(client: Client, scope: VariableScope, name: T) -> Self {
        DeleteVariableBuilder {
            client,
            scope,
            name: name.into(),
        }
    }

    /// Submit the delete variable request.
    #[tracing::instrument(skip(self), name = "delete_variable", err)]
    pub async fn send(self) -> Result<()> {
        debug!(scope = ?self.scope, name = %self.name, "deleting variable");
        let [resource, id, collection] = self.scope.segments();
        self.client
            .request(Method::DELETE, [resource, id, collection, self.name.as_str()])
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyVariablesRequest {
    #[serde(skip_serializing_if = "Variables::is_empty")]
    modifications: Variables,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    deletions: Vec<String>,
}

/// Updates and deletes variables of a scope.
#[derive(Debug)]
pub struct ModifyVariablesBuilder {
    client: Client,
    scope: VariableScope,
    request: ModifyVariablesRequest,
}

impl ModifyVariablesBuilder {
    /// Create a new modify variables builder.
    pub fn new(client: Client, scope: VariableScope) -> Self {
        ModifyVariablesBuilder {
            client,
            scope,
            request: ModifyVariablesRequest::default(),
        }
    }

    /// Set or update a variable.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.modifications.insert(name.into(), variable);
        self
    }

    /// Set or update several variables.
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.request.modifications.extend(variables);
        self
    }

    /// Delete a variable.
    pub fn with_deletion<T: Into<String>>(mut self, name: T) -> Self {
        self.request.deletions.push(name.into());
        self
    }

    /// Submit the modify variables request.
    #[tracing::instrument(skip(self), name = "modify_variables", err)]
    pub async fn send(self) -> Result<()> {
        if self.request.modifications.is_empty() && self.request.deletions.is_empty() {
            return Err(Error::InvalidParameters(
                "at least one modification or deletion must be set",
            ));
        }
        debug!(scope = ?self.scope, "modifying variables");
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, self.scope.segments())
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
    fn typed_variables_serialize_in_engine_format() {
        let variable = Variable::json(&json!({"orderId": 7})).unwrap();
        assert_eq!(
            serde_json::to_value(&variable).unwrap(),
            json!({"value": "{\"orderId\":7}", "type": "Json"})
        );

        let variable = Variable::string("x").with_value_info("transient", true);
        assert_eq!(
            serde_json::to_value(&variable).unwrap(),
            json!({"value": "x", "type": "String", "valueInfo": {"transient": true}})
        );
    }

    #[test]
    fn values_are_read_back_by_type() {
        let variable: Variable = serde_json::from_value(json!({
            "value": "{\"amount\":12}",
            "type": "Json",
            "valueInfo": null
        }))
        .unwrap();

        #[derive(Deserialize)]
        struct Order {
            amount: u32,
        }
        assert_eq!(variable.value_as::<Order>().unwrap().amount, 12);

        let variable: Variable =
            serde_json::from_value(json!({"value": 3, "type": "Integer", "valueInfo": {}})).unwrap();
        assert_eq!(variable.value_as::<i32>().unwrap(), 3);
        assert!(variable.value_as_date().is_err());
    }

    #[test]
    fn structs_convert_to_and_from_variables() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Invoice {
            amount: u32,
            approved: bool,
            lines: Vec<String>,
        }

        let invoice = Invoice {
            amount: 30,
            approved: true,
            lines: vec!["paper".to_owned()],
        };
        let variables = to_variables(&invoice).unwrap();
        assert_eq!(variables["amount"], Variable::new(30));
        assert_eq!(variables["lines"].value_type.as_deref(), Some("Json"));

        let decoded: Invoice = from_variables(&variables).unwrap();
        assert_eq!(decoded, invoice);
        assert!(to_variables(&42).is_err());
    }

    #[test]
    fn variable_filters_render_name_operator_value() {
        let filter = VariableFilter::new("amount", Operator::Gteq, 100);
        assert_eq!(filter.to_string(), "amount_gteq_100");
        assert_eq!(VariableFilter::eq("approved", true).to_string(), "approved_eq_true");
    }
}
