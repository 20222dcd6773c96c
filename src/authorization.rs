//! Authorizations grant or revoke permissions on engine resources to users
//! and groups.
//!
//! Authorization and resource types are numeric on the wire and mapped to
//! [`AuthorizationType`] and [`ResourceType`].

use crate::{
    client::Client,
    request::{comma_separated, CountBuilder, ListBuilder, ListQuery, OptionsBuilder},
    util, Error, Result,
};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use tracing::trace;

const RESOURCE: &str = "authorization";

/// Whether an authorization grants or revokes permissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum AuthorizationType {
    /// grants permissions to all users
    Global,
    /// grants permissions to a user or group
    Grant,
    /// revokes permissions from a user or group
    Revoke,
}

impl From<AuthorizationType> for i32 {
    fn from(value: AuthorizationType) -> Self {
        match value {
            AuthorizationType::Global => 0,
            AuthorizationType::Grant => 1,
            AuthorizationType::Revoke => 2,
        }
    }
}

impl TryFrom<i32> for AuthorizationType {
    type Error = String;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(AuthorizationType::Global),
            1 => Ok(AuthorizationType::Grant),
            2 => Ok(AuthorizationType::Revoke),
            other => Err(format!("unknown authorization type {}", other)),
        }
    }
}

/// The kind of resource an authorization applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ResourceType {
    /// web applications
    Application,
    /// users
    User,
    /// groups
    Group,
    /// group memberships
    GroupMembership,
    /// authorizations
    Authorization,
    /// filters
    Filter,
    /// process definitions
    ProcessDefinition,
    /// tasks
    Task,
    /// process instances
    ProcessInstance,
    /// deployments
    Deployment,
    /// decision definitions
    DecisionDefinition,
    /// tenants
    Tenant,
    /// tenant memberships
    TenantMembership,
    /// batches
    Batch,
    /// decision requirements definitions
    DecisionRequirementsDefinition,
    /// any other resource type known to the engine
    Other(i32),
}

impl From<ResourceType> for i32 {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::Application => 0,
            ResourceType::User => 1,
            ResourceType::Group => 2,
            ResourceType::GroupMembership => 3,
            ResourceType::Authorization => 4,
            ResourceType::Filter => 5,
            ResourceType::ProcessDefinition => 6,
            ResourceType::Task => 7,
            ResourceType::ProcessInstance => 8,
            ResourceType::Deployment => 9,
            ResourceType::DecisionDefinition => 10,
            ResourceType::Tenant => 11,
            ResourceType::TenantMembership => 12,
            ResourceType::Batch => 13,
            ResourceType::DecisionRequirementsDefinition => 14,
            ResourceType::Other(code) => code,
        }
    }
}

impl From<i32> for ResourceType {
    fn from(value: i32) -> Self {
        match value {
            0 => ResourceType::Application,
            1 => ResourceType::User,
            2 => ResourceType::Group,
            3 => ResourceType::GroupMembership,
            4 => ResourceType::Authorization,
            5 => ResourceType::Filter,
            6 => ResourceType::ProcessDefinition,
            7 => ResourceType::Task,
            8 => ResourceType::ProcessInstance,
            9 => ResourceType::Deployment,
            10 => ResourceType::DecisionDefinition,
            11 => ResourceType::Tenant,
            12 => ResourceType::TenantMembership,
            13 => ResourceType::Batch,
            14 => ResourceType::DecisionRequirementsDefinition,
            other => ResourceType::Other(other),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", i32::from(*self))
    }
}

/// An authorization.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    /// the id of the authorization
    pub id: String,
    /// whether the authorization grants or revokes
    #[serde(rename = "type")]
    pub authorization_type: AuthorizationType,
    /// granted or revoked permissions, e.g. `READ` or `ALL`
    #[serde(default)]
    pub permissions: Vec<String>,
    /// the user the authorization applies to, `*` for all users
    pub user_id: Option<String>,
    /// the group the authorization applies to
    pub group_id: Option<String>,
    /// the kind of resource
    pub resource_type: ResourceType,
    /// the resource, `*` for all resources of the type
    pub resource_id: Option<String>,
    /// when the authorization is removed by history cleanup
    #[serde(default, with = "util::timestamp::option")]
    pub removal_time: Option<DateTime<Utc>>,
    /// the root process instance of the authorization
    pub root_process_instance_id: Option<String>,
}

/// Keys authorizations can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthorizationSortKey {
    /// resource type
    ResourceType,
    /// resource id
    ResourceId,
}

/// Filter for authorization queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    authorization_type: Option<AuthorizationType>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    user_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    group_id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_id: Option<String>,
}

impl ListQuery for AuthorizationQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = AuthorizationSortKey;
    type Item = Authorization;
}

impl AuthorizationQuery {
    /// An empty filter matching all authorizations.
    pub fn new() -> Self {
        AuthorizationQuery::default()
    }

    /// Filter by id.
    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Filter by authorization type.
    pub fn with_type(mut self, authorization_type: AuthorizationType) -> Self {
        self.authorization_type = Some(authorization_type);
        self
    }

    /// Only include authorizations of the given users.
    pub fn with_user_ids(mut self, user_ids: Vec<String>) -> Self {
        self.user_id_in = user_ids;
        self
    }

    /// Only include authorizations of the given groups.
    pub fn with_group_ids(mut self, group_ids: Vec<String>) -> Self {
        self.group_id_in = group_ids;
        self
    }

    /// Filter by resource type.
    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.resource_type = Some(resource_type);
        self
    }

    /// Filter by resource id.
    pub fn with_resource_id<T: Into<String>>(mut self, resource_id: T) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }
}

/// Queries authorizations.
pub type GetAuthorizationListBuilder = ListBuilder<AuthorizationQuery>;
/// Counts authorizations.
pub type CountAuthorizationsBuilder = CountBuilder<AuthorizationQuery>;

/// Result of an authorization check.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCheckResult {
    /// the checked permission
    pub permission_name: String,
    /// the checked resource type name
    pub resource_name: String,
    /// the checked resource
    pub resource_id: Option<String>,
    /// whether the authenticated user holds the permission
    pub is_authorized: bool,
}

impl Client {
    /// Queries authorizations.
    pub fn get_authorization_list(&self, query: AuthorizationQuery) -> GetAuthorizationListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts authorizations.
    pub fn count_authorizations(&self, query: AuthorizationQuery) -> CountAuthorizationsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single authorization.
    pub fn get_authorization<T: Into<String>>(&self, id: T) -> GetAuthorizationBuilder {
        GetAuthorizationBuilder::new(self.clone(), id)
    }

    /// Checks whether the authenticated user holds a permission.
    pub fn check_authorization<P: Into<String>, N: Into<String>>(
        &self,
        permission_name: P,
        resource_name: N,
        resource_type: ResourceType,
    ) -> CheckAuthorizationBuilder {
        CheckAuthorizationBuilder::new(self.clone(), permission_name, resource_name, resource_type)
    }

    /// Creates an authorization.
    pub fn create_authorization(
        &self,
        authorization_type: AuthorizationType,
        resource_type: ResourceType,
    ) -> SaveAuthorizationBuilder {
        SaveAuthorizationBuilder::new(self.clone(), None, Some(authorization_type), resource_type)
    }

    /// Replaces the permissions, owner and resource of an authorization.
    pub fn update_authorization<T: Into<String>>(
        &self,
        id: T,
        resource_type: ResourceType,
    ) -> SaveAuthorizationBuilder {
        SaveAuthorizationBuilder::new(self.clone(), Some(id.into()), None, resource_type)
    }

    /// Deletes an authorization.
    pub fn delete_authorization<T: Into<String>>(&self, id: T) -> DeleteAuthorizationBuilder {
        DeleteAuthorizationBuilder::new(self.clone(), id)
    }

    /// Retrieves the operations available on authorizations, or on a single
    /// authorization.
    pub fn authorization_options(&self, id: Option<String>) -> OptionsBuilder {
        OptionsBuilder::new(self.clone(), RESOURCE, id)
    }
}

/// Retrieves a single authorization.
#[derive(Debug)]
pub struct GetAuthorizationBuilder {
    client: Client,
    id: String,
}

impl GetAuthorizationBuilder {
    /// Create a new get authorization builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetAuthorizationBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get authorization request.
    #[tracing::instrument(skip(self), name = "get_authorization", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Authorization> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckAuthorizationQuery {
    permission_name: String,
    resource_name: String,
    resource_type: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    group_ids: Vec<String>,
}

/// Checks a permission of the authenticated user, or of another user when
/// the authenticated user is allowed to.
#[derive(Debug)]
pub struct CheckAuthorizationBuilder {
    client: Client,
    query: CheckAuthorizationQuery,
}

impl CheckAuthorizationBuilder {
    /// Create a new check authorization builder.
    pub fn new<P: Into<String>, N: Into<String>>(
        client: Client,
        permission_name: P,
        resource_name: N,
        resource_type: ResourceType,
    ) -> Self {
        CheckAuthorizationBuilder {
            client,
            query: CheckAuthorizationQuery {
                permission_name: permission_name.into(),
                resource_name: resource_name.into(),
                resource_type,
                resource_id: None,
                user_id: None,
                group_ids: Vec::new(),
            },
        }
    }

    /// Check the permission on a single resource.
    pub fn with_resource_id<T: Into<String>>(mut self, resource_id: T) -> Self {
        self.query.resource_id = Some(resource_id.into());
        self
    }

    /// Check the permission of another user.
    pub fn with_user_id<T: Into<String>>(mut self, user_id: T) -> Self {
        self.query.user_id = Some(user_id.into());
        self
    }

    /// Check the permission of the groups of another user.
    pub fn with_group_ids(mut self, group_ids: Vec<String>) -> Self {
        self.query.group_ids = group_ids;
        self
    }

    /// Submit the check authorization request.
    #[tracing::instrument(skip(self), name = "check_authorization", fields(permission = %self.query.permission_name), err)]
    pub async fn send(self) -> Result<AuthorizationCheckResult> {
        trace!(query = ?self.query, "request:");
        self.client
            .request(Method::GET, [RESOURCE, "check"])
            .query(&self.query)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveAuthorizationRequest {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    authorization_type: Option<AuthorizationType>,
    permissions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id: Option<String>,
    resource_type: ResourceType,
    resource_id: String,
}

/// Creates or updates an authorization.
#[derive(Debug)]
pub struct SaveAuthorizationBuilder {
    client: Client,
    id: Option<String>,
    request: SaveAuthorizationRequest,
}

impl SaveAuthorizationBuilder {
    /// Create a new save authorization builder; without an id an
    /// authorization is created.
    pub fn new(
        client: Client,
        id: Option<String>,
        authorization_type: Option<AuthorizationType>,
        resource_type: ResourceType,
    ) -> Self {
        SaveAuthorizationBuilder {
            client,
            id,
            request: SaveAuthorizationRequest {
                authorization_type,
                permissions: Vec::new(),
                user_id: None,
                group_id: None,
                resource_type,
                resource_id: "*".to_owned(),
            },
        }
    }

    /// Add a permission, e.g. `READ`, or `ALL`.
    pub fn with_permission<T: Into<String>>(mut self, permission: T) -> Self {
        self.request.permissions.push(permission.into());
        self
    }

    /// Apply the authorization to a user; `*` applies it to all users.
    pub fn with_user_id<T: Into<String>>(mut self, user_id: T) -> Self {
        self.request.user_id = Some(user_id.into());
        self
    }

    /// Apply the authorization to a group.
    pub fn with_group_id<T: Into<String>>(mut self, group_id: T) -> Self {
        self.request.group_id = Some(group_id.into());
        self
    }

    /// Restrict the authorization to a single resource; defaults to `*`.
    pub fn with_resource_id<T: Into<String>>(mut self, resource_id: T) -> Self {
        self.request.resource_id = resource_id.into();
        self
    }

    /// Submit the save authorization request; returns the created
    /// authorization, or `None` for updates.
    #[tracing::instrument(skip(self), name = "save_authorization", fields(id = ?self.id), err)]
    pub async fn send(self) -> Result<Option<Authorization>> {
        if self.request.user_id.is_some() == self.request.group_id.is_some() {
            return Err(Error::InvalidParameters(
                "exactly one of `user_id` and `group_id` must be set",
            ));
        }
        trace!(req = ?self.request, "request:");

        match &self.id {
            Some(id) => {
                self.client
                    .request(Method::PUT, [RESOURCE, id.as_str()])
                    .json(&self.request)
                    .send_empty()
                    .await?;
                Ok(None)
            }
            None => self
                .client
                .request(Method::POST, [RESOURCE, "create"])
                .json(&self.request)
                .send()
                .await
                .map(Some),
        }
    }
}

/// Deletes an authorization.
#[derive(Debug)]
pub struct DeleteAuthorizationBuilder {
    client: Client,
    id: String,
}

impl DeleteAuthorizationBuilder {
    /// Create a new delete authorization builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteAuthorizationBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the delete authorization request.
    #[tracing::instrument(skip(self), name = "delete_authorization", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .send_empty()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn types_are_numeric_on_the_wire() {
        let authorization: Authorization = serde_json::from_value(json!({
            "id": "a-1",
            "type": 1,
            "permissions": ["READ", "UPDATE"],
            "userId": "demo",
            "groupId": null,
            "resourceType": 6,
            "resourceId": "invoice",
            "removalTime": null,
            "rootProcessInstanceId": null
        }))
        .unwrap();

        assert_eq!(authorization.authorization_type, AuthorizationType::Grant);
        assert_eq!(authorization.resource_type, ResourceType::ProcessDefinition);
        assert_eq!(ResourceType::from(42), ResourceType::Other(42));
        assert_eq!(serde_json::to_value(ResourceType::Other(42)).unwrap(), json!(42));
    }

    #[test]
    fn unknown_authorization_type_is_rejected() {
        assert!(serde_json::from_value::<AuthorizationType>(json!(7)).is_err());
    }
}
