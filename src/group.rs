use crate::{
    client::Client,
    request::{comma_separated, CountBuilder, ListBuilder, ListQuery, OptionsBuilder},
    Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const RESOURCE: &str = "group";

/// A group of users.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// the id of the group
    pub id: String,
    /// the name of the group
    pub name: Option<String>,
    /// the type of the group, e.g. `WORKFLOW` or `SYSTEM`
    #[serde(rename = "type")]
    pub group_type: Option<String>,
}

impl Group {
    /// A group with only an id.
    pub fn new<T: Into<String>>(id: T) -> Self {
        Group {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the name.
    pub fn with_name<T: Into<String>>(self, name: T) -> Self {
        Group {
            name: Some(name.into()),
            ..self
        }
    }

    /// Set the type.
    pub fn with_type<T: Into<String>>(self, group_type: T) -> Self {
        Group {
            group_type: Some(group_type.into()),
            ..self
        }
    }
}

/// Keys groups can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupSortKey {
    /// group id
    Id,
    /// name
    Name,
    /// type
    Type,
}

/// Filter for group queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_like: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    group_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    member: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    member_of_tenant: Option<String>,
}

impl ListQuery for GroupQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = GroupSortKey;
    type Item = Group;
}

impl GroupQuery {
    /// An empty filter matching all groups.
    pub fn new() -> Self {
        GroupQuery::default()
    }

    /// Filter by id.
    pub fn with_id<T: Into<String>>(self, id: T) -> Self {
        GroupQuery {
            id: Some(id.into()),
            ..self
        }
    }

    /// Filter by a list of ids.
    pub fn with_ids(self, ids: Vec<String>) -> Self {
        GroupQuery { id_in: ids, ..self }
    }

    /// Filter by name.
    pub fn with_name<T: Into<String>>(self, name: T) -> Self {
        GroupQuery {
            name: Some(name.into()),
            ..self
        }
    }

    /// Filter by a `LIKE` pattern on the name.
    pub fn with_name_like<T: Into<String>>(self, name_like: T) -> Self {
        GroupQuery {
            name_like: Some(name_like.into()),
            ..self
        }
    }

    /// Filter by type.
    pub fn with_type<T: Into<String>>(self, group_type: T) -> Self {
        GroupQuery {
            group_type: Some(group_type.into()),
            ..self
        }
    }

    /// Only include groups the user is a member of.
    pub fn with_member<T: Into<String>>(self, user_id: T) -> Self {
        GroupQuery {
            member: Some(user_id.into()),
            ..self
        }
    }

    /// Only include groups that are members of the tenant.
    pub fn with_member_of_tenant<T: Into<String>>(self, tenant_id: T) -> Self {
        GroupQuery {
            member_of_tenant: Some(tenant_id.into()),
            ..self
        }
    }
}

/// Queries groups.
pub type GetGroupListBuilder = ListBuilder<GroupQuery>;
/// Counts groups.
pub type CountGroupsBuilder = CountBuilder<GroupQuery>;

impl Client {
    /// Queries groups.
    pub fn get_group_list(&self, query: GroupQuery) -> GetGroupListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts groups.
    pub fn count_groups(&self, query: GroupQuery) -> CountGroupsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single group.
    pub fn get_group<T: Into<String>>(&self, id: T) -> GetGroupBuilder {
        GetGroupBuilder::new(self.clone(), id)
    }

    /// Creates a group.
    pub fn create_group(&self, group: Group) -> SaveGroupBuilder {
        SaveGroupBuilder::new(self.clone(), group, true)
    }

    /// Replaces the name and type of a group.
    pub fn update_group(&self, group: Group) -> SaveGroupBuilder {
        SaveGroupBuilder::new(self.clone(), group, false)
    }

    /// Deletes a group.
    pub fn delete_group<T: Into<String>>(&self, id: T) -> DeleteGroupBuilder {
        DeleteGroupBuilder::new(self.clone(), id)
    }

    /// Retrieves the operations available on groups, or on a single group.
    pub fn group_options(&self, id: Option<String>) -> OptionsBuilder {
        OptionsBuilder::new(self.clone(), RESOURCE, id)
    }

    /// Retrieves the operations available on the members of a group.
    pub fn group_member_options<T: Into<String>>(&self, id: T) -> OptionsBuilder {
        OptionsBuilder::new(self.clone(), RESOURCE, Some(id.into())).with_segment("members")
    }

    /// Adds a user to a group.
    pub fn add_group_member<T: Into<String>, U: Into<String>>(
        &self,
        id: T,
        user_id: U,
    ) -> GroupMemberBuilder {
        GroupMemberBuilder::new(self.clone(), id, user_id, true)
    }

    /// Removes a user from a group.
    pub fn remove_group_member<T: Into<String>, U: Into<String>>(
        &self,
        id: T,
        user_id: U,
    ) -> GroupMemberBuilder {
        GroupMemberBuilder::new(self.clone(), id, user_id, false)
    }
}

/// Retrieves a single group.
#[derive(Debug)]
pub struct GetGroupBuilder {
    client: Client,
    id: String,
}

impl GetGroupBuilder {
    /// Create a new get group builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetGroupBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get group request.
    #[tracing::instrument(skip(self), name = "get_group", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Group> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

/// Creates or updates a group.
#[derive(Debug)]
pub struct SaveGroupBuilder {
    client: Client,
    group: Group,
    create: bool,
}

impl SaveGroupBuilder {
    /// Create a new save group builder.
    pub fn new(client: Client, group: Group, create: bool) -> Self {
        SaveGroupBuilder {
            client,
            group,
            create,
        }
    }

    /// Submit the save group request.
    #[tracing::instrument(skip(self), name = "save_group", fields(id = %self.group.id, create = self.create), err)]
    pub async fn send(self) -> Result<()> {
        trace!(req = ?self.group, "request:");
        let request = if self.create {
            self.client.request(Method::POST, [RESOURCE, "create"])
        } else {
            self.client
                .request(Method::PUT, [RESOURCE, self.group.id.as_str()])
        };
        request.json(&self.group).send_empty().await
    }
}

/// Deletes a group.
#[derive(Debug)]
pub struct DeleteGroupBuilder {
    client: Client,
    id: String,
}

impl DeleteGroupBuilder {
    /// Create a new delete group builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteGroupBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the delete group request.
    #[tracing::instrument(skip(self), name = "delete_group", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .send_empty()
            .await
    }
}

/// Adds a user to, or removes a user from, a group.
#[derive(Debug)]
pub struct GroupMemberBuilder {
    client: Client,
    id: String,
    user_id: String,
    add: bool,
}

impl GroupMemberBuilder {
    /// Create a new group member builder; `add` adds the user, otherwise it
    /// is removed.
    pub fn new<T: Into<String>, U: Into<String>>(client: Client, id: T, user_id: U, add: bool) -> Self {
        GroupMemberBuilder {
            client,
            id: id.into(),
            user_id: user_id.into(),
            add,
        }
    }

    /// Submit the group member request.
    #[tracing::instrument(skip(self), name = "group_member", fields(id = %self.id, user_id = %self.user_id), err)]
    pub async fn send(self) -> Result<()> {
        let method = if self.add { Method::PUT } else { Method::DELETE };
        debug!(add = self.add, "updating group membership");
        self.client
            .request(
                method,
                [RESOURCE, self.id.as_str(), "members", self.user_id.as_str()],
            )
            .send_empty()
            .await
    }
}
