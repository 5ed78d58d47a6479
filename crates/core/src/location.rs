//! Page location to producer socket URL.

use thiserror::Error;
use url::Url;

/// Appended to the page path to reach the producer socket.
pub const SOCKET_PATH_SUFFIX: &str = "ws";

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("invalid page url `{href}`: {source}")]
    Parse {
        href: String,
        #[source]
        source: url::ParseError,
    },
    #[error("page url `{0}` has no host")]
    MissingHost(String),
}

/// The parts of `window.location` the socket URL is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// Scheme without the trailing `:`.
    pub protocol: String,
    /// Host name plus `:port` when one is set.
    pub host: String,
    pub pathname: String,
}

impl PageLocation {
    /// From `location.protocol` / `location.host` / `location.pathname`.
    pub fn from_parts(protocol: &str, host: &str, pathname: &str) -> Self {
        Self {
            protocol: protocol.trim_end_matches(':').to_ascii_lowercase(),
            host: host.to_string(),
            pathname: pathname.to_string(),
        }
    }

    pub fn parse(href: &str) -> Result<Self, LocationError> {
        let url = Url::parse(href).map_err(|source| LocationError::Parse {
            href: href.to_string(),
            source,
        })?;
        let host = url
            .host_str()
            .ok_or_else(|| LocationError::MissingHost(href.to_string()))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self {
            protocol: url.scheme().to_string(),
            host,
            pathname: url.path().to_string(),
        })
    }

    pub fn is_secure(&self) -> bool {
        self.protocol == "https"
    }

    /// `wss` for `https` pages, `ws` otherwise; host and path kept, suffix appended.
    pub fn socket_url(&self, suffix: &str) -> String {
        let scheme = if self.is_secure() { "wss" } else { "ws" };
        format!("{scheme}://{}{}{suffix}", self.host, self.pathname)
    }
}
