const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat";

/// Builder for [`HttpTransportConfig`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpTransportConfigBuilder {
    endpoint: Option<String>,
    health_url: Option<String>,
}

impl HttpTransportConfigBuilder {
    /// Creates a builder with default settings.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL that queries are posted to.
    #[inline]
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the URL of the health probe. By default it is the endpoint
    /// with its last path segment replaced by `health`.
    #[inline]
    pub fn with_health_url<S: Into<String>>(mut self, health_url: S) -> Self {
        self.health_url = Some(health_url.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> HttpTransportConfig {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        let health_url = self
            .health_url
            .unwrap_or_else(|| sibling_url(&endpoint, "health"));
        HttpTransportConfig {
            endpoint,
            health_url,
        }
    }
}

/// Configuration for the HTTP transport.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HttpTransportConfig {
    pub(crate) endpoint: String,
    pub(crate) health_url: String,
}

impl HttpTransportConfig {
    /// Returns the URL that queries are posted to.
    #[inline]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the URL of the health probe.
    #[inline]
    pub fn health_url(&self) -> &str {
        &self.health_url
    }
}

fn sibling_url(url: &str, segment: &str) -> String {
    let url = url.trim_end_matches('/');
    match url.rsplit_once('/') {
        // Don't cut into the scheme separator, e.g. `http://host`.
        Some((base, _)) if !base.ends_with('/') && !base.ends_with(':') => {
            format!("{base}/{segment}")
        }
        _ => format!("{url}/{segment}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HttpTransportConfigBuilder::new().build();
        assert_eq!(config.endpoint(), "http://localhost:8000/chat");
        assert_eq!(config.health_url(), "http://localhost:8000/health");
    }

    #[test]
    fn test_derived_health_url() {
        let config = HttpTransportConfigBuilder::new()
            .with_endpoint("https://perfume.example/api/v1/chat/")
            .build();
        assert_eq!(
            config.health_url(),
            "https://perfume.example/api/v1/health"
        );

        let config = HttpTransportConfigBuilder::new()
            .with_endpoint("http://localhost:8000")
            .build();
        assert_eq!(config.health_url(), "http://localhost:8000/health");

        let config = HttpTransportConfigBuilder::new()
            .with_health_url("http://probe.local/ok")
            .build();
        assert_eq!(config.health_url(), "http://probe.local/ok");
    }
}
