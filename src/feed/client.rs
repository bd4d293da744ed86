use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Public queue-times feed for Universal Studios Florida.
pub const DEFAULT_FEED_URL: &str = "https://queue-times.com/parks/65/queue_times.json";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(7000);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(7000);

const MAX_FEED_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Transport-level failures of a feed fetch.
///
/// None of these are retried; the caller decides how to present them.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection refused/reset, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Connect, response or body read exceeded its timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the 5MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err)
        }
    }
}

/// HTTP client bound to a single feed endpoint.
#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    endpoint: Url,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl FeedClient {
    /// Build a client for `endpoint`.
    ///
    /// `connect_timeout` bounds connection establishment; `read_timeout`
    /// bounds the wait for response headers and for each body chunk.
    pub fn new(
        endpoint: Url,
        connect_timeout: Duration,
        read_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            http,
            endpoint,
            connect_timeout,
            read_timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Issue one GET against the endpoint and return the raw body.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Timeout`] - connect, headers or a body chunk took too long
    /// - [`FetchError::HttpStatus`] - non-2xx response
    /// - [`FetchError::Network`] - DNS, refused/reset connection, TLS
    /// - [`FetchError::ResponseTooLarge`] - body over 5MB
    pub async fn fetch_feed(&self) -> Result<Vec<u8>, FetchError> {
        tracing::debug!(url = %self.endpoint, "Fetching ride feed");

        let response = tokio::time::timeout(
            self.connect_timeout + self.read_timeout,
            self.http.get(self.endpoint.clone()).send(),
        )
        .await
        .map_err(|_| FetchError::Timeout)??;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_FEED_SIZE, self.read_timeout).await?;
        tracing::debug!(url = %self.endpoint, bytes = bytes.len(), "Ride feed received");
        Ok(bytes)
    }
}

/// Read a response body with a size cap and a per-chunk timeout.
///
/// Dropping the response on any early return releases the connection.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
    chunk_timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    loop {
        let next = tokio::time::timeout(chunk_timeout, stream.next())
            .await
            .map_err(|_| FetchError::Timeout)?;
        let Some(chunk) = next else { break };
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UA: &str = "ridewait-test/1.0";

    fn client_for(server: &MockServer, read_timeout: Duration) -> FeedClient {
        let url = Url::parse(&format!("{}/parks/65/queue_times.json", server.uri())).unwrap();
        FeedClient::new(url, Duration::from_millis(500), read_timeout, UA).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/parks/65/queue_times.json"))
            .and(header("user-agent", UA))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"lands":[]}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Duration::from_secs(2));
        let body = client.fetch_feed().await.unwrap();
        assert_eq!(body, br#"{"lands":[]}"#);
    }

    #[tokio::test]
    async fn test_fetch_404_is_http_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Duration::from_secs(2));
        match client.fetch_feed().await {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other.map(|b| b.len())),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Duration::from_secs(2));
        assert!(matches!(
            client.fetch_feed().await,
            Err(FetchError::HttpStatus(503))
        ));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, Duration::from_millis(200));
        assert!(matches!(client.fetch_feed().await, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Port 9 (discard) is not listening on test machines
        let url = Url::parse("http://127.0.0.1:9/queue_times.json").unwrap();
        let client =
            FeedClient::new(url, Duration::from_millis(500), Duration::from_millis(500), UA)
                .unwrap();
        assert!(matches!(
            client.fetch_feed().await,
            Err(FetchError::Network(_)) | Err(FetchError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_body_over_limit_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&mock_server)
            .await;

        let response = reqwest::get(mock_server.uri()).await.unwrap();
        let result = read_limited_bytes(response, 16, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(FetchError::ResponseTooLarge)));
    }
}
