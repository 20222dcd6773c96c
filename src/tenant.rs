use crate::{
    client::Client,
    request::{comma_separated, is_false, CountBuilder, ListBuilder, ListQuery, OptionsBuilder},
    Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const RESOURCE: &str = "tenant";

/// A tenant isolating definitions and data of one organization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// the id of the tenant
    pub id: String,
    /// the name of the tenant
    pub name: Option<String>,
}

impl Tenant {
    /// Create a tenant description.
    pub fn new<T: Into<String>>(id: T) -> Self {
        Tenant {
            id: id.into(),
            name: None,
        }
    }

    /// Set the name.
    pub fn with_name<T: Into<String>>(self, name: T) -> Self {
        Tenant {
            name: Some(name.into()),
            ..self
        }
    }
}

/// Keys tenants can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TenantSortKey {
    /// tenant id
    Id,
    /// name
    Name,
}

/// Filter for tenant queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
    id_in: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_member: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_member: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    including_groups_of_user: bool,
}

impl ListQuery for TenantQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = TenantSortKey;
    type Item = Tenant;
}

impl TenantQuery {
    /// An empty filter matching all tenants.
    pub fn new() -> Self {
        TenantQuery::default()
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

    /// Filter by name.
    pub fn with_name<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by a `LIKE` pattern on the name.
    pub fn with_name_like<T: Into<String>>(mut self, name_like: T) -> Self {
        self.name_like = Some(name_like.into());
        self
    }

    /// Only include tenants the user is a member of.
    pub fn with_user_member<T: Into<String>>(mut self, user_id: T) -> Self {
        self.user_member = Some(user_id.into());
        self
    }

    /// Only include tenants the group is a member of.
    pub fn with_group_member<T: Into<String>>(mut self, group_id: T) -> Self {
        self.group_member = Some(group_id.into());
        self
    }

    /// With a user member filter, also include tenants of the user's groups.
    pub fn including_groups_of_user(mut self) -> Self {
        self.including_groups_of_user = true;
        self
    }
}

/// Queries tenants.
pub type GetTenantListBuilder = ListBuilder<TenantQuery>;
/// Counts tenants.
pub type CountTenantsBuilder = CountBuilder<TenantQuery>;

/// A user or group belonging to a tenant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TenantMember {
    /// a user, by id
    User(String),
    /// a group, by id
    Group(String),
}

impl TenantMember {
    fn segments(&self) -> [&str; 2] {
        match self {
            TenantMember::User(id) => ["user-members", id.as_str()],
            TenantMember::Group(id) => ["group-members", id.as_str()],
        }
    }
}

impl Client {
    /// Queries tenants.
    pub fn get_tenant_list(&self, query: TenantQuery) -> GetTenantListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts tenants.
    pub fn count_tenants(&self, query: TenantQuery) -> CountTenantsBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single tenant.
    pub fn get_tenant<T: Into<String>>(&self, id: T) -> GetTenantBuilder {
        GetTenantBuilder::new(self.clone(), id)
    }

    /// Creates a tenant.
    pub fn create_tenant(&self, tenant: Tenant) -> SaveTenantBuilder {
        SaveTenantBuilder::new(self.clone(), tenant, true)
    }

    /// Replaces the name of a tenant.
    pub fn update_tenant(&self, tenant: Tenant) -> SaveTenantBuilder {
        SaveTenantBuilder::new(self.clone(), tenant, false)
    }

    /// Deletes a tenant.
    pub fn delete_tenant<T: Into<String>>(&self, id: T) -> DeleteTenantBuilder {
        DeleteTenantBuilder::new(self.clone(), id)
    }

    /// Retrieves the operations available on tenants, or on a single tenant.
    pub fn tenant_options(&self, id: Option<String>) -> OptionsBuilder {
        OptionsBuilder::new(self.clone(), RESOURCE, id)
    }

    /// Adds a user or group to a tenant.
    pub fn add_tenant_member<T: Into<String>>(&self, id: T, member: TenantMember) -> TenantMemberBuilder {
        TenantMemberBuilder::new(self.clone(), id, member, true)
    }

    /// Removes a user or group from a tenant.
    pub fn remove_tenant_member<T: Into<String>>(
        &self,
        id: T,
        member: TenantMember,
    ) -> TenantMemberBuilder {
        TenantMemberBuilder::new(self.clone(), id, member, false)
    }
}

/// Retrieves a single tenant.
#[derive(Debug)]
pub struct GetTenantBuilder {
    client: Client,
    id: String,
}

impl GetTenantBuilder {
    /// Create a new get tenant builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetTenantBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the get tenant request.
    #[tracing::instrument(skip(self), name = "get_tenant", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Tenant> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .send()
            .await
    }
}

/// Creates or updates a tenant.
#[derive(Debug)]
pub struct SaveTenantBuilder {
    client: Client,
    tenant: Tenant,
    create: bool,
}

impl SaveTenantBuilder {
    /// Create a new save tenant builder.
    pub fn new(client: Client, tenant: Tenant, create: bool) -> Self {
        SaveTenantBuilder {
            client,
            tenant,
            create,
        }
    }

    /// Submit the save tenant request.
    #[tracing::instrument(skip(self), name = "save_tenant", fields(id = %self.tenant.id, create = self.create), err)]
    pub async fn send(self) -> Result<()> {
        trace!(req = ?self.tenant, "request:");
        let request = if self.create {
            self.client.request(Method::POST, [RESOURCE, "create"])
        } else {
            self.client
                .request(Method::PUT, [RESOURCE, self.tenant.id.as_str()])
        };
        request.json(&self.tenant).send_empty().await
    }
}

/// Deletes a tenant.
#[derive(Debug)]
pub struct DeleteTenantBuilder {
    client: Client,
    id: String,
}

impl DeleteTenantBuilder {
    /// Create a new delete tenant builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteTenantBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the delete tenant request.
    #[tracing::instrument(skip(self), name = "delete_tenant", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .send_empty()
            .await
    }
}

/// Adds a member to, or removes a member from, a tenant.
#[derive(Debug)]
pub struct TenantMemberBuilder {
    client: Client,
    id: String,
    member: TenantMember,
    add: bool,
}

impl TenantMemberBuilder {
    /// Create a new tenant member builder; `add` adds the member, otherwise
    /// it is removed.
    pub fn new<T: Into<String>>(client: Client, id: T, member: TenantMember, add: bool) -> Self {
        TenantMemberBuilder {
            client,
            id: id.into(),
            member,
            add,
        }
    }

    /// Submit the tenant member request.
    #[tracing::instrument(skip(self), name = "tenant_member", fields(id = %self.id, member = ?self.member), err)]
    pub async fn send(self) -> Result<()> {
        let method = if self.add { Method::PUT } else { Method::DELETE };
        let [collection, member_id] = self.member.segments();
        debug!(add = self.add, "updating tenant membership");
        self.client
            .request(method, [RESOURCE, self.id.as_str(), collection, member_id])
            .send_empty()
            .await
    }
}
