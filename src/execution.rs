use crate::{
    client::Client,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery},
    util,
    variable::{Variable, VariableFilter, Variables},
    Result,
};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::trace;

const RESOURCE: &str = "execution";

/// A path of execution within a process instance.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
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

/// A subscription of an execution to an event, e.g. a message.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSubscription {
    /// the id of the subscription
    pub id: String,
    /// the type of event, e.g. `message`
    pub event_type: String,
    /// the name of the event
    pub event_name: String,
    /// the subscribed execution
    pub execution_id: Option<String>,
    /// the process instance of the subscription
    pub process_instance_id: Option<String>,
    /// the activity of the subscription
    pub activity_id: Option<String>,
    /// when the subscription was created
    #[serde(default, with = "util::timestamp::option")]
    pub created_date: Option<DateTime<Utc>>,
    /// the tenant of the subscription
    pub tenant_id: Option<String>,
}

/// Keys executions can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExecutionSortKey {
    /// process instance id
    InstanceId,
    /// process definition key
    DefinitionKey,
    /// process definition id
    DefinitionId,
    /// tenant id
    TenantId,
}

/// Filter for execution queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    business_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal_event_subscription_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_event_subscription_name: Option<String>,
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
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    variables: Vec<VariableFilter>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_variables: Vec<VariableFilter>,
}

impl ListQuery for ExecutionQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = ExecutionSortKey;
    type Item = Execution;
}

impl ExecutionQuery {
    /// An empty filter matching all executions.
    pub fn new() -> Self {
        ExecutionQuery::default()
    }

    /// Filter by business key of the process instance.
    pub fn with_business_key<T: Into<String>>(mut self, business_key: T) -> Self {
        self.business_key = Some(business_key.into());
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

    /// Filter by process instance id.
    pub fn with_process_instance_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_instance_id = Some(id.into());
        self
    }

    /// Filter by the activity the execution waits in.
    pub fn with_activity_id<T: Into<String>>(mut self, activity_id: T) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    /// Only include executions waiting for the signal.
    pub fn with_signal_event_subscription_name<T: Into<String>>(mut self, name: T) -> Self {
        self.signal_event_subscription_name = Some(name.into());
        self
    }

    /// Only include executions waiting for the message.
    pub fn with_message_event_subscription_name<T: Into<String>>(mut self, name: T) -> Self {
        self.message_event_subscription_name = Some(name.into());
        self
    }

    /// Only include active executions.
    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    /// Only include suspended executions.
    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Only include executions with the given incident.
    pub fn with_incident_id<T: Into<String>>(mut self, incident_id: T) -> Self {
        self.incident_id = Some(incident_id.into());
        self
    }

    /// Only include executions with incidents of the given type.
    pub fn with_incident_type<T: Into<String>>(mut self, incident_type: T) -> Self {
        self.incident_type = Some(incident_type.into());
        self
    }

    /// Only include executions with incidents with the given message.
    pub fn with_incident_message<T: Into<String>>(mut self, incident_message: T) -> Self {
        self.incident_message = Some(incident_message.into());
        self
    }

    /// Only include executions with incidents matching a `LIKE` pattern.
    pub fn with_incident_message_like<T: Into<String>>(mut self, incident_message_like: T) -> Self {
        self.incident_message_like = Some(incident_message_like.into());
        self
    }

    /// Only include executions of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include executions with a matching local variable.
    pub fn with_variable(mut self, filter: VariableFilter) -> Self {
        self.variables.push(filter);
        self
    }

    /// Only include executions whose process instance has a matching variable.
    pub fn with_process_variable(mut self, filter: VariableFilter) -> Self {
        self.process_variables.push(filter);
        self
    }
}

/// Queries executions.
pub type GetExecutionListBuilder = ListBuilder<ExecutionQuery>;
/// Counts executions.
pub type CountExecutionsBuilder = CountBuilder<ExecutionQuery>;

impl Client {
    /// Queries executions matching a filter.
    pub fn get_execution_list(&self, query: ExecutionQuery) -> GetExecutionListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts executions matching a filter.
    pub fn count_executions(&self, query: ExecutionQuery) -> CountExecutionsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single execution.
    pub fn get_execution<T: Into<String>>(&self, id: T) -> GetExecutionBuilder {
        GetExecutionBuilder::new(self.clone(), id)
    }

    /// Signals an execution waiting in a receive task or signal event.
    pub fn trigger_execution<T: Into<String>>(&self, id: T) -> TriggerExecutionBuilder {
        TriggerExecutionBuilder::new(self.clone(), id, None)
    }

    /// Retrieves the message subscription of an execution.
    pub fn get_message_subscription<T: Into<String>, M: Into<String>>(
        &self,
        id: T,
        message_name: M,
    ) -> GetMessageSubscriptionBuilder {
        GetMessageSubscriptionBuilder::new(self.clone(), id, message_name)
    }

    /// Delivers a message to the message subscription of an execution.
    pub fn trigger_message_subscription<T: Into<String>, M: Into<String>>(
        &self,
        id: T,
        message_name: M,
    ) -> TriggerExecutionBuilder {
        TriggerExecutionBuilder::new(self.clone(), id, Some(message_name.into()))
    }
}

/// Retrieves a single execution.
#[derive(Debug)]
pub struct GetExecutionBuilder {
    client: Client,
    id: String,
}

impl GetExecutionBuilder {
    /// Create a new get execution builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetExecutionBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get execution request.
    #[tracing::instrument(skip(self), name = "get_execution", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Execution> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

#[derive(Clone, Debug, Default, Serialize)]
struct TriggerRequest {
    #[serde(skip_serializing_if = "Variables::is_empty")]
    variables: Variables,
}

/// Signals an execution, or delivers a message to one of its message
/// subscriptions.
#[derive(Debug)]
pub struct TriggerExecutionBuilder {
    client: Client,
    id: String,
    message_name: Option<String>,
    request: TriggerRequest,
}

impl TriggerExecutionBuilder {
    /// Create a new trigger builder; with a message name the message
    /// subscription is triggered.
    pub fn new<T: Into<String>>(client: Client, id: T, message_name: Option<String>) -> Self {
        TriggerExecutionBuilder {
            client,
            id: id.into(),
            message_name,
            request: TriggerRequest::default(),
        }
    }

    /// Set a variable on the execution.
    pub fn with_variable<T: Into<String>>(mut self, name: T, variable: Variable) -> Self {
        self.request.variables.insert(name.into(), variable);
        self
    }

    /// Submit the trigger request.
    #[tracing::instrument(skip(self), name = "trigger_execution", fields(id = %self.id, message = ?self.message_name), err)]
    pub async fn send(self) -> Result<()> {
        let segments = match &self.message_name {
            Some(message_name) => vec![
                RESOURCE,
                self.id.as_str(),
                "messageSubscriptions",
                message_name.as_str(),
                "trigger",
            ],
            None => vec![RESOURCE, self.id.as_str(), "signal"],
        };
        trace!(req = ?self.request, "request:");
        self.client
            .request(Method::POST, segments)
            .json(&self.request)
            .send_empty()
            .await
    }
}

/// Retrieves the message subscription of an execution.
#[derive(Debug)]
pub struct GetMessageSubscriptionBuilder {
    client: Client,
    id: String,
    message_name: String,
}

impl GetMessageSubscriptionBuilder {
    /// Create a new get message subscription builder.
    pub fn new<T: Into<String>, M: Into<String>>(client: Client, id: T, message_name: M) -> Self {
        GetMessageSubscriptionBuilder {
            client,
            id: id.into(),
            message_name: message_name.into(),
        }
    }

    /// Submit the get message subscription request.
    #[tracing::instrument(skip(self), name = "get_message_subscription", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<EventSubscription> {
        self.client
            .request(
                Method::GET,
                [
                    RESOURCE,
                    self.id.as_str(),
                    "messageSubscriptions",
                    self.message_name.as_str(),
                ],
            )
            .send()
            .await
    }
}
