use crate::{
    auth::Credentials,
    error::{Error, Result},
};
use std::env;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const BASE_URL_VAR: &str = "CAMUNDA_BASE_URL";
const ENGINE_VAR: &str = "CAMUNDA_ENGINE";
const REQUEST_TIMEOUT_VAR: &str = "CAMUNDA_REQUEST_TIMEOUT";

/// The default engine REST endpoint of a local Camunda distribution.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/engine-rest";

/// The default timeout for a single REST call.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client used to communicate with the Camunda engine REST API.
///
/// Cloning is cheap: all clones share one pooled HTTP session.
#[derive(Clone, Debug)]
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) inner: Arc<ClientInner>,
}

#[derive(Debug)]
pub(crate) struct ClientInner {
    pub(crate) base_url: Url,
    pub(crate) engine: Option<String>,
    pub(crate) credentials: Option<Credentials>,
}

impl Default for Client {
    fn default() -> Self {
        Client::from_config(ClientConfig::default()).expect("default client config is valid")
    }
}

impl Client {
    /// Create a new client with default config.
    pub fn new() -> Self {
        Client::default()
    }

    /// Build a new Camunda client from a given configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let ClientConfig {
            base_url,
            engine,
            credentials,
            request_timeout,
        } = config;

        let base_url = Url::parse(&base_url).map_err(|err| Error::InvalidBaseUrl {
            message: err.to_string(),
            url: base_url.clone(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                message: "url cannot carry path segments".to_owned(),
                url: base_url.to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Client {
            http,
            inner: Arc::new(ClientInner {
                base_url,
                engine,
                credentials,
            }),
        })
    }

    /// Build a new Camunda client from the `CAMUNDA_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Client::from_config(ClientConfig::from_env()?)
    }

    /// The engine REST root all requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The named process engine addressed by this client, if not the default one.
    pub fn engine(&self) -> Option<&str> {
        self.inner.engine.as_deref()
    }
}

/// Config for establishing a camunda client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// The engine REST root, e.g. `http://localhost:8080/engine-rest`
    pub base_url: String,
    /// Name of the process engine to address; `None` for the default engine
    pub engine: Option<String>,
    /// HTTP basic auth credentials
    pub credentials: Option<Credentials>,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Set the engine REST root the client should connect to.
    pub fn with_base_url<T: Into<String>>(base_url: T) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Address a named process engine instead of the default one.
    pub fn with_engine<T: Into<String>>(self, engine: T) -> Self {
        ClientConfig {
            engine: Some(engine.into()),
            ..self
        }
    }

    /// Authenticate every request with HTTP basic auth.
    pub fn with_credentials(self, credentials: Credentials) -> Self {
        ClientConfig {
            credentials: Some(credentials),
            ..self
        }
    }

    /// Set the timeout applied to every request.
    pub fn with_request_timeout(self, request_timeout: Duration) -> Self {
        ClientConfig {
            request_timeout,
            ..self
        }
    }

    /// Read the configuration from the environment.
    ///
    /// * `CAMUNDA_BASE_URL` – engine REST root (default `http://localhost:8080/engine-rest`)
    /// * `CAMUNDA_ENGINE` – named process engine
    /// * `CAMUNDA_USERNAME` / `CAMUNDA_PASSWORD` – basic auth credentials
    /// * `CAMUNDA_REQUEST_TIMEOUT` – request timeout in milliseconds, rejected if not a
    ///   whole number
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let engine = env::var(ENGINE_VAR).ok().filter(|engine| !engine.is_empty());
        let credentials = if Credentials::should_use_env_config() {
            Some(Credentials::from_env()?)
        } else {
            None
        };
        let request_timeout = parse_request_timeout(env::var(REQUEST_TIMEOUT_VAR).ok())?;

        Ok(ClientConfig {
            base_url,
            engine,
            credentials,
            request_timeout,
        })
    }
}

fn parse_request_timeout(timeout: Option<String>) -> Result<Duration> {
    match timeout.as_deref().map(str::trim) {
        None | Some("") => Ok(DEFAULT_REQUEST_TIMEOUT),
        Some(millis) => millis.parse().map(Duration::from_millis).map_err(|_| {
            Error::InvalidParameters("CAMUNDA_REQUEST_TIMEOUT must be milliseconds")
        }),
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            engine: None,
            credentials: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_base_url() {
        let err = Client::from_config(ClientConfig::with_base_url("not a url")).unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }));
    }

    #[test]
    fn rejects_base_url_without_path() {
        let err =
            Client::from_config(ClientConfig::with_base_url("mailto:demo@example.com")).unwrap_err();
        assert!(matches!(err, Error::InvalidBaseUrl { .. }));
    }

    #[test]
    fn config_builder_sets_engine_and_credentials() {
        let client = Client::from_config(
            ClientConfig::with_base_url("http://camunda:8080/engine-rest/")
                .with_engine("tenant-one")
                .with_credentials(Credentials::new("demo", "demo")),
        )
        .unwrap();

        assert_eq!(client.engine(), Some("tenant-one"));
        assert_eq!(client.base_url().as_str(), "http://camunda:8080/engine-rest/");
    }

    #[test]
    fn request_timeout_is_read_as_milliseconds() {
        assert_eq!(
            parse_request_timeout(Some("2500".to_owned())).unwrap(),
            Duration::from_millis(2500)
        );
        assert_eq!(parse_request_timeout(None).unwrap(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(
            parse_request_timeout(Some(String::new())).unwrap(),
            DEFAULT_REQUEST_TIMEOUT
        );
    }

    #[test]
    fn rejects_unparseable_request_timeout() {
        for value in ["30s", "-1", "1.5"] {
            let err = parse_request_timeout(Some(value.to_owned())).unwrap_err();
            assert!(matches!(err, Error::InvalidParameters(_)), "{}", value);
        }
    }
}
