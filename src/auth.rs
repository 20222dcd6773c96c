use std::env;
use std::fmt;

use crate::{Error, Result};

const USERNAME_VAR: &str = "CAMUNDA_USERNAME";
const PASSWORD_VAR: &str = "CAMUNDA_PASSWORD";

/// HTTP basic auth credentials for engines running with authentication enabled.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create credentials from a username and password.
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check if auth env vars set
    pub fn should_use_env_config() -> bool {
        env::var(USERNAME_VAR).is_ok() || env::var(PASSWORD_VAR).is_ok()
    }

    /// Read credentials from `CAMUNDA_USERNAME` and `CAMUNDA_PASSWORD`.
    ///
    /// Both variables must be set if either is.
    pub fn from_env() -> Result<Self> {
        let username = env::var(USERNAME_VAR)
            .map_err(|_error| Error::InvalidParameters("CAMUNDA_USERNAME not set"))?;
        let password = env::var(PASSWORD_VAR)
            .map_err(|_error| Error::InvalidParameters("CAMUNDA_PASSWORD not set"))?;

        Ok(Credentials::new(username, password))
    }

    /// The user name sent with every request.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_masks_password() {
        let credentials = Credentials::new("demo", "s3cr3t");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("demo"));
        assert!(!debug.contains("s3cr3t"));
    }
}
