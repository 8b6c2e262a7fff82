//! Service endpoint URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Default production GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.phoenix.wudder.tech/graphql/";

/// A validated GraphQL endpoint URL.
///
/// This type ensures the URL is absolute, uses HTTPS (or HTTP for localhost),
/// and has a host. The path is kept verbatim; some deployments require the
/// trailing slash.
///
/// # Example
///
/// ```
/// use wudder::EndpointUrl;
///
/// let endpoint = EndpointUrl::new("https://api.phoenix.wudder.tech/graphql/").unwrap();
/// assert_eq!(endpoint.host(), Some("api.phoenix.wudder.tech"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EndpointUrl(Url);

impl EndpointUrl {
    /// Create a new endpoint URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::Endpoint {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;
        Ok(Self(url))
    }

    /// Returns the URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::Endpoint {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        match url.scheme() {
            "https" => {}
            "http" if is_localhost => {}
            _ => return Err(invalid("must use HTTPS (HTTP allowed only for localhost)")),
        }

        if url.host_str().is_none() {
            return Err(invalid("must have a host"));
        }

        Ok(())
    }
}

impl Default for EndpointUrl {
    fn default() -> Self {
        // The constant is a well-formed HTTPS URL
        Self(Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is valid"))
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EndpointUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for EndpointUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for EndpointUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EndpointUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for EndpointUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
