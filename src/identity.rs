use crate::{client::Client, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const RESOURCE: &str = "identity";

/// A group of a user, as returned by [`Client::get_identity_groups`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct IdentityGroup {
    /// the id of the group
    pub id: String,
    /// the name of the group
    pub name: Option<String>,
}

/// A user sharing a group with the queried user.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUser {
    /// the id of the user
    pub id: String,
    /// the first and last name of the user
    pub display_name: Option<String>,
}

/// The groups of a user and the other members of those groups.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityGroups {
    /// groups the user is a member of
    #[serde(default)]
    pub groups: Vec<IdentityGroup>,
    /// members of those groups
    #[serde(default)]
    pub group_users: Vec<GroupUser>,
}

/// Result of verifying user credentials.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResult {
    /// the user that was verified
    pub authenticated_user: String,
    /// whether the password is correct
    pub authenticated: bool,
}

impl Client {
    /// Retrieves the groups of a user and their co-members.
    pub fn get_identity_groups<T: Into<String>>(&self, user_id: T) -> GetIdentityGroupsBuilder {
        GetIdentityGroupsBuilder::new(self.clone(), user_id)
    }

    /// Checks a user's password.
    pub fn verify_user<U: Into<String>, P: Into<String>>(
        &self,
        username: U,
        password: P,
    ) -> VerifyUserBuilder {
        VerifyUserBuilder::new(self.clone(), username, password)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserIdQuery {
    user_id: String,
}

/// Retrieves the groups of a user.
#[derive(Debug)]
pub struct GetIdentityGroupsBuilder {
    client: Client,
    query: UserIdQuery,
}

impl GetIdentityGroupsBuilder {
    /// Create a new get identity groups builder.
    pub fn new<T: Into<String>>(client: Client, user_id: T) -> Self {
        GetIdentityGroupsBuilder {
            client,
            query: UserIdQuery {
                user_id: user_id.into(),
            },
        }
    }

    /// Submit the get identity groups request.
    #[tracing::instrument(skip(self), name = "get_identity_groups", fields(user_id = %self.query.user_id), err)]
    pub async fn send(self) -> Result<IdentityGroups> {
        self.client
            .request(Method::GET, [RESOURCE, "groups"])
            .query(&self.query)
            .send()
            .await
    }
}

#[derive(Clone, Serialize)]
struct VerifyUserRequest {
    username: String,
    password: String,
}

impl fmt::Debug for VerifyUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyUserRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Checks a user's password.
#[derive(Debug)]
pub struct VerifyUserBuilder {
    client: Client,
    request: VerifyUserRequest,
}

impl VerifyUserBuilder {
    /// Create a new verify user builder.
    pub fn new<U: Into<String>, P: Into<String>>(client: Client, username: U, password: P) -> Self {
        VerifyUserBuilder {
            client,
            request: VerifyUserRequest {
                username: username.into(),
                password: password.into(),
            },
        }
    }

    /// Submit the verify user request.
    #[tracing::instrument(skip(self), name = "verify_user", fields(username = %self.request.username), err)]
    pub async fn send(self) -> Result<AuthenticationResult> {
        debug!("verifying credentials");
        self.client
            .request(Method::POST, [RESOURCE, "verify"])
            .json(&self.request)
            .send()
            .await
    }
}
