//! Saved task queries.
//!
//! A filter stores a task query on the engine, so that clients such as task
//! lists can execute it by id.

use crate::{
    client::Client,
    request::{Count, CountBuilder, ListBuilder, ListQuery, Paging},
    task::Task,
    Error, Result,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

const RESOURCE: &str = "filter";

/// A saved query.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// the id of the filter
    pub id: String,
    /// the resource the filter queries; the engine supports `Task`
    pub resource_type: String,
    /// the name of the filter
    pub name: String,
    /// the user owning the filter
    pub owner: Option<String>,
    /// the saved query, in task query JSON form
    #[serde(default)]
    pub query: Map<String, Value>,
    /// display properties, e.g. `color` or `priority`
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// the number of results, if requested
    pub item_count: Option<u64>,
}

/// Keys filters can be sorted by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterSortKey {
    /// filter id
    FilterId,
    /// resource type
    ResourceType,
    /// name
    Name,
    /// owner
    Owner,
}

/// Filter for filter queries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name_like: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_count: Option<bool>,
}

impl ListQuery for FilterQuery {
    const PATH: &'static [&'static str] = &[RESOURCE];
    type SortKey = FilterSortKey;
    type Item = Filter;
}

impl FilterQuery {
    /// An empty query matching all filters.
    pub fn new() -> Self {
        FilterQuery::default()
    }

    /// Filter by id.
    pub fn with_filter_id<T: Into<String>>(self, filter_id: T) -> Self {
        FilterQuery {
            filter_id: Some(filter_id.into()),
            ..self
        }
    }

    /// Filter by resource type.
    pub fn with_resource_type<T: Into<String>>(self, resource_type: T) -> Self {
        FilterQuery {
            resource_type: Some(resource_type.into()),
            ..self
        }
    }

    /// Filter by name.
    pub fn with_name<T: Into<String>>(self, name: T) -> Self {
        FilterQuery {
            name: Some(name.into()),
            ..self
        }
    }

    /// Filter by a `LIKE` pattern on the name.
    pub fn with_name_like<T: Into<String>>(self, name_like: T) -> Self {
        FilterQuery {
            name_like: Some(name_like.into()),
            ..self
        }
    }

    /// Filter by owner.
    pub fn with_owner<T: Into<String>>(self, owner: T) -> Self {
        FilterQuery {
            owner: Some(owner.into()),
            ..self
        }
    }

    /// Include the number of results of each filter.
    pub fn with_item_count(self, item_count: bool) -> Self {
        FilterQuery {
            item_count: item_count.then_some(true),
            ..self
        }
    }
}

/// Queries filters.
pub type GetFilterListBuilder = ListBuilder<FilterQuery>;
/// Counts filters.
pub type CountFiltersBuilder = CountBuilder<FilterQuery>;

impl Client {
    /// Queries filters.
    pub fn get_filter_list(&self, query: FilterQuery) -> GetFilterListBuilder {
        ListBuilder::new(self.clone(), query)
    }

    /// Counts filters.
    pub fn count_filters(&self, query: FilterQuery) -> CountFiltersBuilder {
        CountBuilder::new(self.clone(), query)
    }

    /// Retrieves a single filter.
    pub fn get_filter<T: Into<String>>(&self, id: T) -> GetFilterBuilder {
        GetFilterBuilder::new(self.clone(), id)
    }

    /// Creates a new task filter.
    pub fn create_filter(&self) -> SaveFilterBuilder {
        SaveFilterBuilder::new(self.clone(), None)
    }

    /// Replaces an existing filter.
    pub fn update_filter<T: Into<String>>(&self, id: T) -> SaveFilterBuilder {
        SaveFilterBuilder::new(self.clone(), Some(id.into()))
    }

    /// Deletes a filter.
    pub fn delete_filter<T: Into<String>>(&self, id: T) -> DeleteFilterBuilder {
        DeleteFilterBuilder::new(self.clone(), id)
    }

    /// Executes a saved filter.
    pub fn execute_filter<T: Into<String>>(&self, id: T) -> ExecuteFilterBuilder {
        ExecuteFilterBuilder::new(self.clone(), id)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemCountQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    item_count: Option<bool>,
}

/// Retrieves a single filter.
#[derive(Debug)]
pub struct GetFilterBuilder {
    client: Client,
    id: String,
    query: ItemCountQuery,
}

impl GetFilterBuilder {
    /// Create a new get filter builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        GetFilterBuilder {
            client,
            id: id.into(),
            query: ItemCountQuery::default(),
        }
    }

    /// Include the number of results of the filter.
    pub fn with_item_count(mut self, item_count: bool) -> Self {
        self.query.item_count = item_count.then_some(true);
        self
    }

    /// Submit the get filter request.
    #[tracing::instrument(skip(self), name = "get_filter", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Filter> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str()])
            .query(&self.query)
            .send()
            .await
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveFilterRequest {
    resource_type: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    query: Map<String, Value>,
    properties: Map<String, Value>,
}

/// Creates or replaces a task filter.
#[derive(Debug)]
pub struct SaveFilterBuilder {
    client: Client,
    id: Option<String>,
    name: Option<String>,
    owner: Option<String>,
    query: Map<String, Value>,
    properties: Map<String, Value>,
}

impl SaveFilterBuilder {
    /// Create a new save filter builder; without an id a filter is created.
    pub fn new(client: Client, id: Option<String>) -> Self {
        SaveFilterBuilder {
            client,
            id,
            name: None,
            owner: None,
            query: Map::new(),
            properties: Map::new(),
        }
    }

    /// Set the name of the filter.
    pub fn with_name<T: Into<String>>(self, name: T) -> Self {
        SaveFilterBuilder {
            name: Some(name.into()),
            ..self
        }
    }

    /// Set the owner of the filter.
    pub fn with_owner<T: Into<String>>(self, owner: T) -> Self {
        SaveFilterBuilder {
            owner: Some(owner.into()),
            ..self
        }
    }

    /// Set a task query parameter of the filter, e.g. `assignee`.
    pub fn with_query_parameter<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set a display property of the filter.
    pub fn with_property<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Submit the save filter request; returns the created filter, or `None`
    /// for updates.
    #[tracing::instrument(skip(self), name = "save_filter", fields(id = ?self.id), err)]
    pub async fn send(mut self) -> Result<Option<Filter>> {
        let request = SaveFilterRequest {
            resource_type: "Task".to_owned(),
            name: self
                .name
                .take()
                .ok_or(Error::InvalidParameters("`name` must be set"))?,
            owner: self.owner,
            query: self.query,
            properties: self.properties,
        };
        trace!(req = ?request, "request:");

        match self.id {
            Some(id) => {
                debug!(%id, "updating filter");
                self.client
                    .request(Method::PUT, [RESOURCE, id.as_str()])
                    .json(&request)
                    .send_empty()
                    .await?;
                Ok(None)
            }
            None => {
                debug!(name = %request.name, "creating filter");
                self.client
                    .request(Method::POST, [RESOURCE, "create"])
                    .json(&request)
                    .send()
                    .await
                    .map(Some)
            }
        }
    }
}

/// Deletes a filter.
#[derive(Debug)]
pub struct DeleteFilterBuilder {
    client: Client,
    id: String,
}

impl DeleteFilterBuilder {
    /// Create a new delete filter builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        DeleteFilterBuilder {
            client,
            id: id.into(),
        }
    }

    /// Submit the delete filter request.
    #[tracing::instrument(skip(self), name = "delete_filter", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<()> {
        self.client
            .request(Method::DELETE, [RESOURCE, self.id.as_str()])
            .send_empty()
            .await
    }
}

/// Executes a saved filter, returning the matching tasks.
#[derive(Debug)]
pub struct ExecuteFilterBuilder {
    client: Client,
    id: String,
    paging: Paging,
}

impl ExecuteFilterBuilder {
    /// Create a new execute filter builder.
    pub fn new<T: Into<String>>(client: Client, id: T) -> Self {
        ExecuteFilterBuilder {
            client,
            id: id.into(),
            paging: Paging::default(),
        }
    }

    /// Set the index of the first result to return.
    pub fn with_first_result(mut self, first_result: u32) -> Self {
        self.paging.first_result = Some(first_result);
        self
    }

    /// Set the maximum number of results to return.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.paging.max_results = Some(max_results);
        self
    }

    /// Execute the filter and return the matching tasks.
    #[tracing::instrument(skip(self), name = "execute_filter", fields(id = %self.id), err)]
    pub async fn send(self) -> Result<Vec<Task>> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "list"])
            .query(&self.paging)
            .send()
            .await
    }

    /// Execute the filter and return its single result, if any.
    ///
    /// Fails if the filter matches more than one task.
    #[tracing::instrument(skip(self), name = "execute_filter_single", fields(id = %self.id), err)]
    pub async fn send_single(self) -> Result<Option<Task>> {
        self.client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "singleResult"])
            .send_optional()
            .await
    }

    /// Execute the filter and return the number of matching tasks.
    #[tracing::instrument(skip(self), name = "execute_filter_count", fields(id = %self.id), err)]
    pub async fn send_count(self) -> Result<u64> {
        let count: Count = self
            .client
            .request(Method::GET, [RESOURCE, self.id.as_str(), "count"])
            .send()
            .await?;
        Ok(count.count)
    }
}
