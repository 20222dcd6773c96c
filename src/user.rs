use crate::{
    client::Client,
    request::{comma_separated, CountBuilder, ListBuilder, ListQuery, OptionsBuilder},
    Error, Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

const RESOURCE: &str = "user";

/// The profile of a user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// the id of the user
    pub id: String,
    /// the first name of the user
    pub first_name: Option<String>,
    /// the last name of the user
    pub last_name: Option<String>,
    /// the email of the user
    pub email: Option<String>,
}

impl UserProfile {
    /// A profile with only an id.
    pub fn new<T: Into<String>>(id: T) -> Self {
        UserProfile {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the first name.
    pub fn with_first_name<T: Into<String>>(self, first_name: T) -> Self {
        UserProfile {
            first_name: Some(first_name.into()),
            ..self
        }
    }

    /// Set the last name.
    pub fn with_last_name<T: Into<String>>(self, last_name: T) -> Self {
        UserProfile {
            last_name: Some(last_name.into()),
            ..self
        }
    }

    /// Set the email.
    pub fn with_email<T: Into<String>>(self, email: T) -> Self {
        UserProfile {
            email: Some(email.into()),
            ..self
        }
    }
}

/// Keys users can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UserSortKey {
    /// user id
    UserId,
    /// first name
    FirstName,
    /// last name
    LastName,
    /// email
    Email,
}

/// Filter for user queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    member_of_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    member_of_tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    potential_starter: Option<String>,
}

impl ListQuery for UserQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = UserSortKey;
    type Item = UserProfile;
}

impl UserQuery {
    /// An empty filter matching all users.
    pub fn new() -> Self {
        UserQuery::default()
    }

    /// Filter by id.
    pub fn with_id<T: Into<String>>(mut self, id: T) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Filter by a list of ids.
    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.id_in = ids;
        self
    }

    /// Filter by first name.
    pub fn with_first_name<T: Into<String>>(mut self, first_name: T) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Filter by a `LIKE` pattern on the first name.
    pub fn with_first_name_like<T: Into<String>>(mut self, first_name_like: T) -> Self {
        self.first_name_like = Some(first_name_like.into());
        self
    }

    /// Filter by last name.
    pub fn with_last_name<T: Into<String>>(mut self, last_name: T) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Filter by a `LIKE` pattern on the last name.
    pub fn with_last_name_like<T: Into<String>>(mut self, last_name_like: T) -> Self {
        self.last_name_like = Some(last_name_like.into());
        self
    }

    /// Filter by email.
    pub fn with_email<T: Into<String>>(mut self, email: T) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Filter by a `LIKE` pattern on the email.
    pub fn with_email_like<T: Into<String>>(mut self, email_like: T) -> Self {
        self.email_like = Some(email_like.into());
        self
    }

    /// Only include members of the group.
    pub fn with_member_of_group<T: Into<String>>(mut self, group_id: T) -> Self {
        self.member_of_group = Some(group_id.into());
        self
    }

    /// Only include members of the tenant.
    pub fn with_member_of_tenant<T: Into<String>>(mut self, tenant_id: T) -> Self {
        self.member_of_tenant = Some(tenant_id.into());
        self
    }

    /// Only include users allowed to start the process definition.
    pub fn with_potential_starter<T: Into<String>>(mut self, process_definition_id: T) -> Self {
        self.potential_starter = Some(process_definition_id.into());
        self
    }
}

/// Queries users.
pub type GetUserListBuilder = ListBuilder<UserQuery>;
/// Counts users.
pub type CountUsersBuilder = CountBuilder<UserQuery>;

impl Client {
    /// Queries users.
    pub fn get_user_list(&self, query: UserQuery) -> GetUserListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts users.
    pub fn count_users(&self, query: UserQuery) -> CountUsersBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves the profile of a user.
    pub fn get_user_profile<T: Into<String>>(&self, id: T) -> GetUserProfileBuilder {
        GetUserProfileBuilder::new(self.clone(), id)
    }

    /// Creates a user.
    pub fn create_user(&self, profile: UserProfile) -> CreateUserBuilder {
        CreateUserBuilder::new(self.clone(), profile)
    }

    /// Replaces the profile of a user.
    pub fn update_user_profile<T: Into<String>>(
        &self,
        id: T,
        profile: UserProfile,
    ) -> UpdateUserProfileBuilder {
        UpdateUserProfileBuilder::new(self.clone(), id, profile)
    }

    /// Changes the password of a user.
    pub fn update_user_credentials<T: Into<String>>(&self, id: T) -> UpdateUserCredentialsBuilder {
        UpdateUserCredentialsBuilder::new(self.clone(), id)
    }

    /// Deletes a user.
    pub fn delete_user<T: Into<String>>(&self, id: T) -> UserActionBuilder {
        UserActionBuilder::new(self.clone(), id, UserAction::Delete)
    }

    /// Unlocks a user locked after too many failed logins.
    pub fn unlock_user<T: Into<String>>(&self, id: T) -> UserActionBuilder {
        UserActionBuilder::new(self.clone(), id, UserAction::Unlock)
    }

    /// Retrieves the operations available on users, or on a single user.
    pub fn user_options(&self, id: Option<String>) -> OptionsBuilder {
        OptionsBuilder::new(self.clone(), RESOURCE, id)
    }
}

/// Retrieves the profile of a user.
#[derive(Debug)]
pub struct GetUserProfileBuilder {
    client: Client,
    id: String,
}

impl GetUserProfileBuilder {
    /// Create a new get user profile builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetUserProfileBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get user profile request.
    #[tracing::instrument(skip(self), name = "get_user_profile", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<UserProfile> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "profile"])
            .send()
            .await
    }
}

#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials {
    password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    authenticated_user_password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, Serialize)]
struct CreateUserRequest {
    profile: UserProfile,
    credentials: Credentials,
}

/// Creates a user.
#[derive(Debug)]
pub struct CreateUserBuilder {
    client: Client,
    profile: UserProfile,
    password: Option<String>,
}

impl CreateUserBuilder {
    /// Create a new create user builder.
    pub fn new(client: Client, profile: UserProfile) -> Self {
        CreateUserBuilder {
            client,
            profile,
            password: None,
        }
    }

    /// Set the initial password of the user.
    pub fn with_password<T: Into<String>>(self, password: T) -> Self {
        CreateUserBuilder {
            password: Some(password.into()),
            ..self
        }
    }

    /// Submit the create user request.
    #[tracing::instrument(skip(self), name = "create_user", fields(id = %self.profile.id), err)]
    pub async fn send(mut self) -> Result<()> {
        let password = self
            .password
            .take()
            .ok_or(Error::InvalidParameters("`password` must be set"))?;
        let request = CreateUserRequest {
            profile: self.profile,
            credentials: Credentials {
                password,
                authenticated_user_password: None,
            },
        };
        trace!(req = ?request, "request:");
        self.client
            .request(Method::POST, [RESOURCE, "create"])
            .json(&request)
            .send_empty()
            .await
    }
}

/// Replaces the profile of a user.
#[derive(Debug)]
pub struct UpdateUserProfileBuilder {
    client: Client,
    id: String,
    profile: UserProfile,
}

impl UpdateUserProfileBuilder {
    /// Create a new update user profile builder.
    pub fn new<T: Into<String>>(client: Client, id: T, profile: UserProfile) -> Self {
        UpdateUserProfileBuilder {
            client,
            id: id.into(),
            profile,
        }
    }

    /// Submit the update user profile request.
    #[tracing::instrument(skip(self), name = "update_user_profile", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        trace!(req = ?self.profile, "request:");
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "profile"])
            .json(&self.profile)
            .send_empty()
            .await
    }
}

/// Changes the password of a user.
#[derive(Debug)]
pub struct UpdateUserCredentialsBuilder {
    client: Client,
    id: String,
    credentials: Credentials,
}

impl UpdateUserCredentialsBuilder {
    /// Create a new update user credentials builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        UpdateUserCredentialsBuilder {
            client,
            id: id.into(),
            credentials: Credentials::default(),
        }
    }

    /// Set the new password.
    pub fn with_password<T: Into<String>>(mut self, password: T) -> Self {
        self.credentials.password = password.into();
        self
    }

    /// Set the password of the authenticated user, confirming the change.
    pub fn with_authenticated_user_password<T: Into<String>>(mut self, password: T) -> Self {
        self.credentials.authenticated_user_password = Some(password.into());
        self
    }

    /// Submit the update user credentials request.
    #[tracing::instrument(skip(self), name = "update_user_credentials", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        if self.credentials.password.is_empty() {
            return Err(Error::InvalidParameters("`password` must be set"));
        }
        self.client
            .request(Method::PUT, [RESOURCE, self.id.as_str(), "credentials"])
            .json(&self.credentials)
            .send_empty()
            .await
    }
}

/// Actions on a user without parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserAction {
    /// delete the user
    Delete,
    /// unlock the user
    Unlock,
}

/// Deletes or unlocks a user.
#[derive(Debug)]
pub struct UserActionBuilder {
    client: Client,
    id: String,
    action: UserAction,
}

impl UserActionBuilder {
    /// Create a new user action builder.
    pub fn new<T: Into<String>>(client: Client, id: T, action: UserAction) -> Self {
        UserActionBuilder {
            client,
            id: id.into(),
            action,
        }
    }

    /// Submit the user action request.
    #[tracing::instrument(skip(self), name = "user_action", fields(id = %self.id, action = ?self.action), err)]
    pub async fn send(self) -> Result<()> {
        debug!("applying user action");
        let request = match self.action {
            UserAction::Delete => self.client.request(Method::DELETE, [RESOURCE, self.id.as_str()]),
            UserAction::Unlock => self
                .client
                .request(Method::POST, [RESOURCE, self.id.as_str(), "unlock"]),
        };
        request.send_empty().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_user_body_nests_profile_and_credentials() {
        let request = CreateUserRequest {
            profile: UserProfile::new("jonny1").with_first_name("John"),
            credentials: Credentials {
                password: "s3cret".to_owned(),
                authenticated_user_password: None,
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "profile": {"id": "jonny1", "firstName": "John", "lastName": null, "email": null},
                "credentials": {"password": "s3cret"}
            })
        );
        assert!(!format!("{:?}", request).contains("s3cret"));
    }
}
