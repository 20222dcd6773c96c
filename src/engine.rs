use crate::{client::Client, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

impl Client {
    /// Lists the names of all process engines available on the server.
    pub fn get_engine_names(&self) -> GetEngineNamesBuilder {
        GetEngineNamesBuilder::new(self.clone())
    }

    /// Obtains the version of the REST API.
    pub fn get_version(&self) -> GetVersionBuilder {
        GetVersionBuilder::new(self.clone())
    }
}

/// Request to list the process engines of the server.
#[derive(Debug)]
pub struct GetEngineNamesBuilder(Client);

impl GetEngineNamesBuilder {
    /// Create a new engine names request builder.
    pub fn new(client: Client) -> Self {
        GetEngineNamesBuilder(client)
    }

    /// Send an engine names request to the configured server.
    #[tracing::instrument(skip(self), name = "get_engine_names", err)]
    pub async fn send(self) -> Result<Vec<String>> {
        debug!("sending request");
        let engines: Vec<ProcessEngine> = self.0.root_request(Method::GET, ["engine"]).send().await?;
        Ok(engines.into_iter().map(|engine| engine.name).collect())
    }
}

#[derive(Deserialize)]
struct ProcessEngine {
    name: String,
}

/// Request to obtain the version of the REST API.
#[derive(Debug)]
pub struct GetVersionBuilder(Client);

impl GetVersionBuilder {
    /// Create a new version request builder.
    pub fn new(client: Client) -> Self {
        GetVersionBuilder(client)
    }

    /// Send a version request to the configured server.
    #[tracing::instrument(skip(self), name = "get_version", err)]
    pub async fn send(self) -> Result<Version> {
        debug!("sending request");
        self.0.root_request(Method::GET, ["version"]).send().await
    }
}

/// The version of the REST API.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Version {
    /// e.g. `7.20.0`
    pub version: String,
}
