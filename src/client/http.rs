//! HTTP client module
//!
//! Provides `HttpClient` for retrieving a document body as text.

use crate::error::EtlError;

use eyre::Result;
use reqwest::Client;
use url::{Host, Url};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client bound to a single source document URL.
///
/// # Example
/// ```no_run
/// use gdp_etl::client::HttpClient;
///
/// # async fn example() -> eyre::Result<()> {
/// let client = HttpClient::try_new("https://example.org/gdp.html")?;
/// let html = client.fetch_text().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    url: Url,
}

impl HttpClient {
    /// Create a client for `url`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The URL cannot be parsed
    /// - The HTTP client cannot be built
    pub fn try_new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| EtlError::Config(format!("invalid url {:?}: {}", url, e)))?;
        let mut builder = Client::builder().user_agent(USER_AGENT);
        // Local fixtures must not be routed through a system proxy
        if is_loopback(&url) {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self { client, url })
    }

    /// Get the document URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// GET the document and return its body as text.
    ///
    /// No retry is attempted.
    ///
    /// # Errors
    /// Returns [`EtlError::Fetch`] on a transport failure or a non-2xx status.
    pub async fn fetch_text(&self) -> Result<String> {
        log::debug!("GET {}", self.url);

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.fetch_error("request failed", Some(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.fetch_error(&format!("HTTP status {}", status), None).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.fetch_error("failed to read response body", Some(e)))?;

        log::debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body)
    }

    fn fetch_error(&self, message: &str, source: Option<reqwest::Error>) -> EtlError {
        EtlError::Fetch {
            url: self.url.to_string(),
            message: message.to_string(),
            source,
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::try_new("http://localhost:8080/gdp.html").unwrap();
        assert_eq!(client.url().path(), "/gdp.html");
    }

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback(&Url::parse("http://localhost:80/").unwrap()));
        assert!(is_loopback(&Url::parse("http://127.0.0.1:9000/").unwrap()));
        assert!(is_loopback(&Url::parse("http://[::1]/").unwrap()));
        assert!(!is_loopback(&Url::parse("https://en.wikipedia.org/").unwrap()));
    }

    #[test]
    fn test_invalid_url() {
        let err = HttpClient::try_new("::not a url::").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = HttpClient::try_new(&format!("http://127.0.0.1:{}/", port)).unwrap();
        let err = client.fetch_text().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EtlError>(),
            Some(EtlError::Fetch { .. })
        ));
    }
}
