//! Request dispatch and declarative parameter binding.
//!
//! Every operation binds its parameters through `serde`: query parameter sets
//! and JSON bodies are plain `Serialize` structs whose field attributes state
//! the wire name and how absent values are skipped. Path parameters are passed
//! as URL segments and percent-encoded by [`Client::request`].

use crate::{
    client::Client,
    error::{ApiError, Error, Result},
};
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// A single HTTP call against the engine REST API.
pub(crate) struct Request {
    method: Method,
    url: Url,
    builder: reqwest::RequestBuilder,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl Client {
    /// Start a request for the resource addressed by `segments`, relative to the
    /// engine REST root (and the named engine, if configured).
    pub(crate) fn request<I>(&self, method: Method, segments: I) -> Request
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.build_request(method, segments, true)
    }

    /// Start a request for a server-wide resource, which is never scoped to a
    /// named engine.
    pub(crate) fn root_request<I>(&self, method: Method, segments: I) -> Request
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.build_request(method, segments, false)
    }

    fn build_request<I>(&self, method: Method, segments: I, engine_scoped: bool) -> Request
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            if let Some(engine) = self.inner.engine.as_ref().filter(|_| engine_scoped) {
                path.push("engine").push(engine);
            }
            path.extend(segments);
        }

        let mut builder = self.http.request(method.clone(), url.clone());
        if let Some(credentials) = &self.inner.credentials {
            builder = credentials.apply(builder);
        }

        Request {
            method,
            url,
            builder,
        }
    }
}

impl Request {
    /// Bind a query parameter set.
    pub(crate) fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.builder = self.builder.query(query);
        self
    }

    /// Bind paging and sorting of a list request.
    pub(crate) fn list<K: Serialize>(self, paging: &Paging, sorting: Option<&Sorting<K>>) -> Self {
        let request = self.query(paging);
        match sorting {
            Some(sorting) => request.query(sorting),
            None => request,
        }
    }

    /// Bind a JSON body.
    pub(crate) fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    /// Bind a multipart form body.
    pub(crate) fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Override the client-wide timeout for this request.
    pub(crate) fn timeout(mut self, timeout: Duration) -> Self {
        self.builder = self.builder.timeout(timeout);
        self
    }

    async fn dispatch(self) -> Result<reqwest::Response> {
        debug!(method = %self.method, url = %self.url, "sending request");
        let response = self.builder.send().await?;
        let status = response.status();
        trace!(%status, "received response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::from_status(ApiError::from_body(status, &body)))
    }

    /// Send the request and decode the JSON response body.
    pub(crate) async fn send<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.dispatch().await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send the request and decode the JSON response body, if there is one.
    pub(crate) async fn send_optional<T: DeserializeOwned>(self) -> Result<Option<T>> {
        let response = self.dispatch().await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// Send the request, discarding any response body.
    pub(crate) async fn send_empty(self) -> Result<()> {
        self.dispatch().await?;
        Ok(())
    }

    /// Send the request and return the response body as text.
    pub(crate) async fn send_text(self) -> Result<String> {
        Ok(self.dispatch().await?.text().await?)
    }

    /// Send the request and return the raw response body.
    pub(crate) async fn send_bytes(self) -> Result<Vec<u8>> {
        Ok(self.dispatch().await?.bytes().await?.to_vec())
    }
}

/// A filter parameter set of a list resource.
///
/// Implementors declare their filters as serializable fields; the list and
/// count endpoints of the resource share them.
pub trait ListQuery: Serialize + Clone + fmt::Debug {
    /// Path segments of the list endpoint; the count endpoint appends `count`.
    const PATH: &'static [&'static str];
    /// Keys the resource can be sorted by.
    type SortKey: Serialize + Clone + fmt::Debug;
    /// The entries returned by the list endpoint.
    type Item: DeserializeOwned;
}

/// Queries a list of resources matching a filter.
#[derive(Debug)]
pub struct ListBuilder<Q: ListQuery> {
    client: Client,
    query: Q,
    paging: Paging,
    sorting: Option<Sorting<Q::SortKey>>,
}

impl<Q: ListQuery> ListBuilder<Q> {
    /// Create a new list builder.
    pub fn new(client: Client, query: Q) -> Self {
        ListBuilder {
            client,
            query,
            paging: Paging::default(),
            sorting: None,
        }
    }

    /// Replace the filter of this request.
    pub fn with_query(self, query: Q) -> Self {
        ListBuilder { query, ..self }
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

    /// Sort the results by the given key.
    pub fn with_sort_by(self, sort_by: Q::SortKey, sort_order: SortOrder) -> Self {
        ListBuilder {
            sorting: Some(Sorting {
                sort_by,
                sort_order,
            }),
            ..self
        }
    }

    /// Submit the list request.
    #[tracing::instrument(skip(self), name = "get_list", fields(resource = ?Q::PATH), err)]
    pub async fn send(self) -> Result<Vec<Q::Item>> {
        trace!(query = ?self.query, paging = ?self.paging, sorting = ?self.sorting, "request:");
        self.client
            .request(Method::GET, Q::PATH)
            .query(&self.query)
            .list(&self.paging, self.sorting.as_ref())
            .send()
            .await
    }
}

/// Counts the resources matching a filter.
#[derive(Debug)]
pub struct CountBuilder<Q: ListQuery> {
    client: Client,
    query: Q,
}

impl<Q: ListQuery> CountBuilder<Q> {
    /// Create a new count builder.
    pub fn new(client: Client, query: Q) -> Self {
        CountBuilder { client, query }
    }

    /// Replace the filter of this request.
    pub fn with_query(self, query: Q) -> Self {
        CountBuilder { query, ..self }
    }

    /// Submit the count request.
    #[tracing::instrument(skip(self), name = "count", fields(resource = ?Q::PATH), err)]
    pub async fn send(self) -> Result<u64> {
        trace!(query = ?self.query, "request:");
        let count: Count = self
            .client
            .request(Method::GET, Q::PATH.iter().chain(&["count"]))
            .query(&self.query)
            .send()
            .await?;
        Ok(count.count)
    }
}

/// Pagination of list results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Paging {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) first_result: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) max_results: Option<u32>,
}

/// Sort criterion of list results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting<K> {
    /// The key to sort by
    pub sort_by: K,
    /// The direction to sort in
    pub sort_order: SortOrder,
}

/// Direction of a sort.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// ascending
    #[default]
    Asc,
    /// descending
    Desc,
}

/// Result of a count request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Count {
    /// number of matching resources
    pub count: u64,
}

/// Operations available on a resource, as returned by `OPTIONS` requests.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ResourceOptions {
    /// One link per operation the authenticated user may perform.
    pub links: Vec<Link>,
}

impl ResourceOptions {
    /// Whether the link relation (e.g. `create`, `update`, `delete`) is available.
    pub fn allows(&self, rel: &str) -> bool {
        self.links.iter().any(|link| link.rel == rel)
    }
}

/// Retrieves the operations the authenticated user may perform on a resource
/// collection or a single resource.
#[derive(Debug)]
pub struct OptionsBuilder {
    client: Client,
    segments: Vec<String>,
}

impl OptionsBuilder {
    pub(crate) fn new(client: Client, resource: &'static str, id: Option<String>) -> Self {
        let mut segments = vec![resource.to_owned()];
        segments.extend(id);
        OptionsBuilder { client, segments }
    }

    pub(crate) fn with_segment(mut self, segment: &str) -> Self {
        self.segments.push(segment.to_owned());
        self
    }

    /// Submit the options request.
    #[tracing::instrument(skip(self), name = "options", fields(resource = ?self.segments), err)]
    pub async fn send(self) -> Result<ResourceOptions> {
        self.client
            .request(Method::OPTIONS, &self.segments)
            .send()
            .await
    }
}

/// A single available operation on a resource.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Link {
    /// HTTP method of the operation
    pub method: String,
    /// URL of the operation
    pub href: String,
    /// Relation name, e.g. `self`, `update`, `delete`
    pub rel: String,
}

/// Addresses a process or decision definition.
///
/// Definitions are addressed by id, or by key, in which case the latest
/// version of the definition is used, optionally of a given tenant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionRef {
    /// the definition id
    Id(String),
    /// the latest version with the key, without tenant
    Key(String),
    /// the latest version with the key of a tenant
    TenantKey {
        /// the definition key
        key: String,
        /// the tenant id
        tenant_id: String,
    },
}

impl DefinitionRef {
    /// Address a definition by id.
    pub fn id<T: Into<String>>(id: T) -> Self {
        DefinitionRef::Id(id.into())
    }

    /// Address the latest definition with the given key.
    pub fn key<T: Into<String>>(key: T) -> Self {
        DefinitionRef::Key(key.into())
    }

    /// Address the latest definition with the given key of a tenant.
    pub fn tenant_key<T: Into<String>, U: Into<String>>(key: T, tenant_id: U) -> Self {
        DefinitionRef::TenantKey {
            key: key.into(),
            tenant_id: tenant_id.into(),
        }
    }

    pub(crate) fn segments(&self, resource: &'static str) -> Vec<String> {
        match self {
            DefinitionRef::Id(id) => vec![resource.to_owned(), id.clone()],
            DefinitionRef::Key(key) => vec![resource.to_owned(), "key".to_owned(), key.clone()],
            DefinitionRef::TenantKey { key, tenant_id } => vec![
                resource.to_owned(),
                "key".to_owned(),
                key.clone(),
                "tenant-id".to_owned(),
                tenant_id.clone(),
            ],
        }
    }

    pub(crate) fn operation(&self, resource: &'static str, operation: &str) -> Vec<String> {
        let mut segments = self.segments(resource);
        segments.push(operation.to_owned());
        segments
    }
}

/// Render a list parameter as a single comma separated value.
pub(crate) fn comma_separated<T, S>(values: &[T], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    let joined = values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    serializer.serialize_str(&joined)
}

/// Flags are only sent when set.
pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientConfig;

    #[derive(Clone, Debug, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Filter {
        #[serde(skip_serializing_if = "Option::is_none")]
        name_like: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_separated")]
        tenant_id_in: Vec<String>,
        #[serde(skip_serializing_if = "is_false")]
        active: bool,
    }

    fn client(config: ClientConfig) -> Client {
        Client::from_config(config).unwrap()
    }

    fn url_of(request: Request) -> String {
        request.builder.build().unwrap().url().to_string()
    }

    #[test]
    fn path_segments_are_encoded() {
        let client = client(ClientConfig::with_base_url("http://localhost:8080/engine-rest"));
        let request = client.request(Method::GET, ["task", "a b/c", "comment"]);
        assert_eq!(
            url_of(request),
            "http://localhost:8080/engine-rest/task/a%20b%2Fc/comment"
        );
    }

    #[test]
    fn named_engine_prefixes_path() {
        let client = client(
            ClientConfig::with_base_url("http://localhost:8080/engine-rest/").with_engine("other"),
        );
        let request = client.request(Method::GET, ["process-definition"]);
        assert_eq!(
            url_of(request),
            "http://localhost:8080/engine-rest/engine/other/process-definition"
        );
    }

    #[test]
    fn definitions_are_addressed_by_id_or_key() {
        assert_eq!(
            DefinitionRef::id("invoice:1:7").segments("process-definition"),
            ["process-definition", "invoice:1:7"]
        );
        assert_eq!(
            DefinitionRef::tenant_key("invoice", "t1").operation("process-definition", "start"),
            ["process-definition", "key", "invoice", "tenant-id", "t1", "start"]
        );
    }

    #[test]
    fn root_requests_ignore_named_engine() {
        let client = client(ClientConfig::default().with_engine("other"));
        let request = client.root_request(Method::GET, ["version"]);
        assert_eq!(url_of(request), "http://localhost:8080/engine-rest/version");
    }

    #[test]
    fn absent_parameters_and_unset_flags_are_skipped() {
        let client = client(ClientConfig::default());
        let request = client.request(Method::GET, ["task"]).query(&Filter::default());
        assert_eq!(url_of(request), "http://localhost:8080/engine-rest/task");
    }

    #[test]
    fn lists_flags_and_sorting_are_rendered() {
        let client = client(ClientConfig::default());
        let filter = Filter {
            name_like: Some("%review%".to_owned()),
            tenant_id_in: vec!["a".to_owned(), "b".to_owned()],
            active: true,
        };
        let paging = Paging {
            first_result: Some(10),
            max_results: Some(5),
        };
        let sorting = Sorting {
            sort_by: "name",
            sort_order: SortOrder::Desc,
        };
        let request = client
            .request(Method::GET, ["task"])
            .query(&filter)
            .list(&paging, Some(&sorting));

        assert_eq!(
            url_of(request),
            "http://localhost:8080/engine-rest/task?nameLike=%25review%25&tenantIdIn=a%2Cb&active=true\
             &firstResult=10&maxResults=5&sortBy=name&sortOrder=desc"
        );
    }
}
