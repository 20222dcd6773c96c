use crate::{
    client::Client,
    request::{comma_separated, CountBuilder, ListBuilder, ListQuery},
    util, Result,
};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

const RESOURCE: &str = "incident";

/// The type of an incident.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncidentType {
    /// a job failed without retries left
    FailedJob,
    /// an external task was failed without retries left
    FailedExternalTask,
    /// a custom incident type raised by application code
    Custom(String),
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentType::FailedJob => f.write_str("failedJob"),
            IncidentType::FailedExternalTask => f.write_str("failedExternalTask"),
            IncidentType::Custom(kind) => f.write_str(kind),
        }
    }
}

impl From<String> for IncidentType {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "failedJob" => IncidentType::FailedJob,
            "failedExternalTask" => IncidentType::FailedExternalTask,
            _ => IncidentType::Custom(kind),
        }
    }
}

impl From<IncidentType> for String {
    fn from(kind: IncidentType) -> Self {
        kind.to_string()
    }
}

/// Number of open incidents of one type.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentStatistics {
    /// the incident type
    pub incident_type: IncidentType,
    /// the number of incidents of that type
    pub incident_count: u64,
}

/// An incident, i.e. a problem that stops a process instance from progressing.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// the id of the incident
    pub id: String,
    /// the process definition of the incident
    pub process_definition_id: Option<String>,
    /// the process instance of the incident
    pub process_instance_id: Option<String>,
    /// the execution of the incident
    pub execution_id: Option<String>,
    /// when the incident was created
    #[serde(with = "util::timestamp")]
    pub incident_timestamp: DateTime<Utc>,
    /// the incident type
    pub incident_type: IncidentType,
    /// the activity the incident occurred in
    pub activity_id: Option<String>,
    /// the activity that failed, for incidents of asynchronous continuations
    pub failed_activity_id: Option<String>,
    /// the incident this incident was caused by
    pub cause_incident_id: Option<String>,
    /// the incident at the root of the cause chain
    pub root_cause_incident_id: Option<String>,
    /// payload of the incident, e.g. the id of the failed job
    pub configuration: Option<String>,
    /// the message of the incident
    pub incident_message: Option<String>,
    /// the tenant of the incident
    pub tenant_id: Option<String>,
    /// the job definition of a failed job incident
    pub job_definition_id: Option<String>,
    /// an annotation set by an operator
    pub annotation: Option<String>,
}

/// Keys incidents can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IncidentSortKey {
    /// incident id
    IncidentId,
    /// incident message
    IncidentMessage,
    /// creation time
    IncidentTimestamp,
    /// incident type
    IncidentType,
    /// execution id
    ExecutionId,
    /// activity id
    ActivityId,
    /// process instance id
    ProcessInstanceId,
    /// process definition id
    ProcessDefinitionId,
    /// cause incident id
    CauseIncidentId,
    /// root cause incident id
    RootCauseIncidentId,
    /// configuration
    Configuration,
    /// tenant id
    TenantId,
}

/// Filter for incident queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_type: Option<IncidentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_message_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_definition_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    process_definition_key_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    incident_timestamp_before: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "util::timestamp::option"
    )]
    incident_timestamp_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_activity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause_incident_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    root_cause_incident_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    configuration: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    tenant_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    job_definition_id_in: Vec<String>,
}

impl ListQuery for IncidentQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = IncidentSortKey;
    type Item = Incident;
}

impl IncidentQuery {
    /// An empty filter matching all incidents.
    pub fn new() -> Self {
        IncidentQuery::default()
    }

    /// Filter by incident id.
    pub fn with_incident_id<T: Into<String>>(mut self, incident_id: T) -> Self {
        self.incident_id = Some(incident_id.into());
        self
    }

    /// Filter by incident type.
    pub fn with_incident_type(mut self, incident_type: IncidentType) -> Self {
        self.incident_type = Some(incident_type);
        self
    }

    /// Filter by incident message.
    pub fn with_incident_message<T: Into<String>>(mut self, incident_message: T) -> Self {
        self.incident_message = Some(incident_message.into());
        self
    }

    /// Filter by a `LIKE` pattern on the incident message.
    pub fn with_incident_message_like<T: Into<String>>(mut self, incident_message_like: T) -> Self {
        self.incident_message_like = Some(incident_message_like.into());
        self
    }

    /// Filter by process definition id.
    pub fn with_process_definition_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_definition_id = Some(id.into());
        self
    }

    /// Only include incidents of definitions with one of the keys.
    pub fn with_process_definition_keys(mut self, keys: Vec<String>) -> Self {
        self.process_definition_key_in = keys;
        self
    }

    /// Filter by process instance id.
    pub fn with_process_instance_id<T: Into<String>>(mut self, id: T) -> Self {
        self.process_instance_id = Some(id.into());
        self
    }

    /// Filter by execution id.
    pub fn with_execution_id<T: Into<String>>(mut self, id: T) -> Self {
        self.execution_id = Some(id.into());
        self
    }

    /// Only include incidents created before the given time.
    pub fn with_incident_timestamp_before(mut self, before: DateTime<Utc>) -> Self {
        self.incident_timestamp_before = Some(before);
        self
    }

    /// Only include incidents created after the given time.
    pub fn with_incident_timestamp_after(mut self, after: DateTime<Utc>) -> Self {
        self.incident_timestamp_after = Some(after);
        self
    }

    /// Filter by activity id.
    pub fn with_activity_id<T: Into<String>>(mut self, activity_id: T) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    /// Filter by failed activity id.
    pub fn with_failed_activity_id<T: Into<String>>(mut self, activity_id: T) -> Self {
        self.failed_activity_id = Some(activity_id.into());
        self
    }

    /// Filter by cause incident id.
    pub fn with_cause_incident_id<T: Into<String>>(mut self, id: T) -> Self {
        self.cause_incident_id = Some(id.into());
        self
    }

    /// Filter by root cause incident id.
    pub fn with_root_cause_incident_id<T: Into<String>>(mut self, id: T) -> Self {
        self.root_cause_incident_id = Some(id.into());
        self
    }

    /// Filter by configuration.
    pub fn with_configuration<T: Into<String>>(mut self, configuration: T) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    /// Only include incidents of the given tenants.
    pub fn with_tenant_ids(mut self, tenant_ids: Vec<String>) -> Self {
        self.tenant_id_in = tenant_ids;
        self
    }

    /// Only include incidents of the given job definitions.
    pub fn with_job_definition_ids(mut self, job_definition_ids: Vec<String>) -> Self {
        self.job_definition_id_in = job_definition_ids;
        self
    }
}

/// Queries incidents.
pub type GetIncidentListBuilder = ListBuilder<IncidentQuery>;
/// Counts incidents.
pub type CountIncidentsBuilder = CountBuilder<IncidentQuery>;

impl Client {
    /// Queries incidents matching a filter.
    pub fn get_incident_list(&self, query: IncidentQuery) -> GetIncidentListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts incidents matching a filter.
    pub fn count_incidents(&self, query: IncidentQuery) -> CountIncidentsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single incident.
    pub fn get_incident<T: Into<String>>(&self, id: T) -> GetIncidentBuilder {
        GetIncidentBuilder::new(self.clone(), id)
    }

    /// Resolves an incident. Incidents of failed jobs and external tasks are
    /// resolved by setting retries instead.
    pub fn resolve_incident<T: Into<String>>(&self, id: T) -> ResolveIncidentBuilder {
        ResolveIncidentBuilder::new(self.clone(), id)
    }

    /// Sets the annotation of an incident.
    pub fn set_incident_annotation<T: Into<String>, A: Into<String>>(
        &self,
        id: T,
        annotation: A,
    ) -> SetIncidentAnnotationBuilder {
        SetIncidentAnnotationBuilder::new(self.clone(), id, annotation)
    }

    /// Clears the annotation of an incident.
    pub fn clear_incident_annotation<T: Into<String>>(
        &self,
        id: T,
    ) -> ClearIncidentAnnotationBuilder {
        ClearIncidentAnnotationBuilder::new(self.clone(), id)
    }
}

/// Retrieves a single incident.
#[derive(Debug)]
pub struct GetIncidentBuilder {
    client: Client,
    id: String,
}

impl GetIncidentBuilder {
    /// Create a new get incident builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetIncidentBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get incident request.
    #[tracing::instrument(skip(self), name = "get_incident", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Incident> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

/// Resolves an incident.
#[derive(Debug)]
pub struct ResolveIncidentBuilder {
    client: Client,
    id: String,
}

impl ResolveIncidentBuilder {
    /// Create a new resolve incident builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        ResolveIncidentBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the resolve incident request.
    #[tracing::instrument(skip(self), name = "resolve_incident", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .send_empty()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
struct AnnotationRequest {
    annotation: String,
}

/// Sets the annotation of an incident.
#[derive(Debug)]
pub struct SetIncidentAnnotationBuilder {
    client: Client,
    id: String,
    request: AnnotationRequest,
}

impl SetIncidentAnnotationBuilder {
    /// Create a new set annotation builder.
    pub fn new<T: Into<String>, A: Into<String>>(client: Client, id: T, annotation: A) -> Self {
        SetIncidentAnnotationBuilder {
            client,
            id: id.into(),
            request: AnnotationRequest {
                annotation: annotation.into(),
            },
        }
    }

    /// Submit the set annotation request.
    #[tracing::instrument(skip(self), name = "set_incident_annotation", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "annotation"])
            .json(&self.request)
            .send_empty()
            .await
    }
}

/// Clears the annotation of an incident.
#[derive(Debug)]
pub struct ClearIncidentAnnotationBuilder {
    client: Client,
    id: String,
}

impl ClearIncidentAnnotationBuilder {
    /// Create a new clear annotation builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        ClearIncidentAnnotationBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the clear annotation request.
    #[tracing::instrument(skip(self), name = "clear_incident_annotation", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str(), "annotation"])
            .send_empty()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_types_round_trip_through_strings() {
        let kinds: Vec<IncidentType> =
            serde_json::from_str(r#"["failedJob", "failedExternalTask", "myIncident"]"#).unwrap();
        assert_eq!(
            kinds,
            [
                IncidentType::FailedJob,
                IncidentType::FailedExternalTask,
                IncidentType::Custom("myIncident".to_owned()),
            ]
        );
        assert_eq!(IncidentType::FailedExternalTask.to_string(), "failedExternalTask");
    }
}
