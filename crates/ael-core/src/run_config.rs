//! Run configurations and the connection endpoint derived from them

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// A named execution target for the remote (Spark) engine.
///
/// `schema` and `url` are concatenated to form the engine endpoint, e.g.
/// `schema = "http://"` and `url = "myhost:53000"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfiguration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RunConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Schema, or empty when unset
    pub fn schema(&self) -> &str {
        self.schema.as_deref().unwrap_or("")
    }

    /// URL, or empty when unset
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// The trimmed `schema + url` string the endpoint is parsed from
    pub fn endpoint_uri(&self) -> String {
        format!("{}{}", self.schema().trim(), self.url().trim())
    }

    /// Derive the engine endpoint from `schema + url`.
    pub fn endpoint(&self) -> Result<ConnectionEndpoint, EndpointError> {
        ConnectionEndpoint::parse(&self.endpoint_uri())
    }
}

/// Errors raised while deriving an endpoint
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("malformed endpoint URI '{input}': {source}")]
    Malformed {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// Protocol, host and port parsed from a run configuration.
///
/// Every part is optional: a URI without a scheme, host or explicit port
/// leaves the matching field empty and the resolver substitutes defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionEndpoint {
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
}

impl ConnectionEndpoint {
    /// Parse an absolute URI into its parts.
    ///
    /// An empty string or a relative reference (no scheme) yields an empty
    /// endpoint rather than an error.
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        if raw.is_empty() {
            return Ok(Self::default());
        }

        let parsed = match Url::parse(raw) {
            Ok(parsed) => parsed,
            Err(url::ParseError::RelativeUrlWithoutBase) => return Ok(Self::default()),
            Err(source) => {
                return Err(EndpointError::Malformed {
                    input: raw.to_string(),
                    source,
                });
            }
        };

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .map(str::to_string);
        let port = parsed
            .port()
            .or_else(|| parsed.has_host().then(|| authority_port(raw)).flatten())
            .map(|p| p.to_string());

        Ok(Self {
            protocol: Some(parsed.scheme().to_string()),
            host,
            port,
        })
    }
}

/// Port spelled out in the authority of `raw`.
///
/// `Url` drops a port equal to the scheme default (`http://h:80`), so the
/// authority is read from the input text: between `://` and the first path,
/// query or fragment delimiter, after any `userinfo@`, and after the closing
/// `]` of an IPv6 literal.
fn authority_port(raw: &str) -> Option<u16> {
    let (_, rest) = raw.split_once("://")?;
    let end = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let after_host = match host_port.rfind(']') {
        Some(i) => &host_port[i + 1..],
        None => host_port,
    };
    let (_, digits) = after_host.rsplit_once(':')?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(schema: &str, url: &str) -> ConnectionEndpoint {
        RunConfiguration::new("test")
            .with_schema(schema)
            .with_url(url)
            .endpoint()
            .unwrap()
    }

    #[test]
    fn test_full_endpoint() {
        let ep = endpoint("http://", "myhost:53000");
        assert_eq!(ep.protocol.as_deref(), Some("http"));
        assert_eq!(ep.host.as_deref(), Some("myhost"));
        assert_eq!(ep.port.as_deref(), Some("53000"));
    }

    #[test]
    fn test_missing_port_is_none() {
        let ep = endpoint("https://", "engine.example.com");
        assert_eq!(ep.protocol.as_deref(), Some("https"));
        assert_eq!(ep.host.as_deref(), Some("engine.example.com"));
        assert_eq!(ep.port, None);
    }

    #[test]
    fn test_explicit_default_port_is_kept() {
        let ep = endpoint("http://", "myhost:80");
        assert_eq!(ep.port.as_deref(), Some("80"));
    }

    #[test]
    fn test_explicit_default_port_survives_host_normalization() {
        // Url rewrites "127.1" to "127.0.0.1" and drops the default port
        let ep = endpoint("http://", "127.1:80");
        assert_eq!(ep.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(ep.port.as_deref(), Some("80"));
    }

    #[test]
    fn test_port_in_query_is_ignored() {
        let ep = endpoint("http://", "myhost/?next=myhost:80");
        assert_eq!(ep.host.as_deref(), Some("myhost"));
        assert_eq!(ep.port, None);
    }

    #[test]
    fn test_port_in_path_or_fragment_is_ignored() {
        assert_eq!(endpoint("http://", "myhost/myhost:80").port, None);
        assert_eq!(endpoint("http://", "myhost#myhost:80").port, None);
    }

    #[test]
    fn test_userinfo_is_not_a_port() {
        let ep = endpoint("http://", "user:80@myhost");
        assert_eq!(ep.host.as_deref(), Some("myhost"));
        assert_eq!(ep.port, None);

        let ep = endpoint("http://", "user:secret@myhost:80");
        assert_eq!(ep.port.as_deref(), Some("80"));
    }

    #[test]
    fn test_ipv6_default_port() {
        assert_eq!(endpoint("http://", "[::1]:80").port.as_deref(), Some("80"));
        assert_eq!(endpoint("http://", "[::1]").port, None);
    }

    #[test]
    fn test_authority_port() {
        assert_eq!(authority_port("http://h:80"), Some(80));
        assert_eq!(authority_port("http://h:"), None);
        assert_eq!(authority_port("http://h"), None);
        assert_eq!(authority_port("myhost:53000"), None);
    }

    #[test]
    fn test_parts_are_trimmed() {
        let ep = endpoint("  http://  ", "  myhost:9000 ");
        assert_eq!(ep.host.as_deref(), Some("myhost"));
        assert_eq!(ep.port.as_deref(), Some("9000"));
    }

    #[test]
    fn test_unset_schema_and_url_give_empty_endpoint() {
        let ep = RunConfiguration::new("empty").endpoint().unwrap();
        assert_eq!(ep, ConnectionEndpoint::default());
    }

    #[test]
    fn test_relative_reference_gives_empty_endpoint() {
        let ep = endpoint("", "localhost");
        assert_eq!(ep, ConnectionEndpoint::default());
    }

    #[test]
    fn test_opaque_uri_has_scheme_only() {
        // No schema: "myhost:53000" reads as scheme "myhost" with an opaque path
        let ep = endpoint("", "myhost:53000");
        assert_eq!(ep.protocol.as_deref(), Some("myhost"));
        assert_eq!(ep.host, None);
        assert_eq!(ep.port, None);
    }

    #[test]
    fn test_ipv6_host() {
        let ep = endpoint("http://", "[::1]:53000");
        assert_eq!(ep.host.as_deref(), Some("[::1]"));
        assert_eq!(ep.port.as_deref(), Some("53000"));
    }

    #[test]
    fn test_malformed_uri_is_error() {
        let err = RunConfiguration::new("bad")
            .with_schema("http://")
            .with_url("myhost:99999")
            .endpoint()
            .unwrap_err();
        assert!(matches!(err, EndpointError::Malformed { .. }));
        assert!(err.to_string().contains("http://myhost:99999"));
    }

    #[test]
    fn test_empty_authority_is_error() {
        let result = RunConfiguration::new("bad").with_schema("http://").endpoint();
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let run: RunConfiguration = toml::from_str(
            r#"
name = "spark-cluster"
description = "Shared cluster"
schema = "http://"
url = "spark.internal:53000"
"#,
        )
        .unwrap();
        assert_eq!(run.name, "spark-cluster");
        assert_eq!(run.schema(), "http://");
        assert_eq!(run.endpoint_uri(), "http://spark.internal:53000");
    }
}
