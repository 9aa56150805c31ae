//! HTTP(S) transport on top of `ureq`
//!
//! Redirects, TLS, gzip and connection reuse are left to `ureq`. This module
//! only maps statuses and headers onto the [`Transport`] contract.
//!
//! ## Timeouts
//!
//! Connect and read timeouts default to `FETCH_HTTP_TIMEOUT` seconds
//! (30 if unset, clamped to 5-300). A per-task timeout takes precedence.

use super::{Download, Probe, Transport};
use crate::core::error::{FetchError, Result};
use crate::core::options::TransportOptions;
use crate::core::source::Location;
use crate::internal::http_date;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::sync::OnceLock;
use std::time::{Duration, SystemTime};

/// Default HTTP timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("levitate-fetch/", env!("CARGO_PKG_VERSION"));

/// Get HTTP timeout from environment variable or use default.
/// Only reads the env var once.
fn http_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let secs = std::env::var("FETCH_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Duration::from_secs(secs.clamp(5, 300))
    })
}

pub struct HttpTransport {
    agent: ureq::Agent,
    headers: Vec<(String, String)>,
    authorization: Option<String>,
}

impl HttpTransport {
    pub fn new(options: &TransportOptions) -> Self {
        let timeout = options.timeout.unwrap_or_else(http_timeout);
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .user_agent(options.user_agent.as_deref().unwrap_or(USER_AGENT))
            .build();

        let authorization = options.username.as_ref().map(|user| {
            let password = options.password.as_deref().unwrap_or("");
            format!("Basic {}", BASE64.encode(format!("{}:{}", user, password)))
        });

        Self {
            agent,
            headers: options.headers.clone(),
            authorization,
        }
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let mut request = self.agent.request(method, url);
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }
        if let Some(auth) = &self.authorization {
            request = request.set("Authorization", auth);
        }
        request
    }

    /// HEAD first; servers that refuse HEAD get a GET whose body is dropped unread.
    fn metadata_request(&self, url: &str, since: Option<SystemTime>) -> Result<ureq::Response> {
        let conditional = |request: ureq::Request| match since {
            Some(time) => request.set("If-Modified-Since", &http_date::format(time)),
            None => request,
        };

        match conditional(self.request("HEAD", url)).call() {
            Err(ureq::Error::Status(405 | 501, _)) => conditional(self.request("GET", url))
                .call()
                .map_err(|e| map_error(url, e)),
            other => other.map_err(|e| map_error(url, e)),
        }
    }
}

fn remote_url(location: &Location) -> Result<&str> {
    match location {
        Location::Remote(url) => Ok(url),
        Location::Local(path) => Err(FetchError::config(format!(
            "{} is not an HTTP URL",
            path.display()
        ))),
    }
}

fn map_error(url: &str, err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(code, _) => FetchError::Status {
            location: url.to_string(),
            code,
        },
        ureq::Error::Transport(transport) => FetchError::Transport {
            location: url.to_string(),
            message: transport.to_string(),
        },
    }
}

fn last_modified(response: &ureq::Response) -> Option<SystemTime> {
    response.header("last-modified").and_then(http_date::parse)
}

impl Transport for HttpTransport {
    fn supports(&self, location: &Location) -> bool {
        location.is_remote()
    }

    fn open(&self, location: &Location) -> Result<Download> {
        let url = remote_url(location)?;
        let response = self.request("GET", url).call().map_err(|e| map_error(url, e))?;

        // ureq hands back 3xx responses it did not follow
        if response.status() >= 300 {
            return Err(FetchError::Status {
                location: url.to_string(),
                code: response.status(),
            });
        }

        // Content-Length counts encoded bytes; ureq hands us decoded ones
        let content_length = match response.header("content-encoding") {
            Some(encoding) if !encoding.eq_ignore_ascii_case("identity") => None,
            _ => response
                .header("content-length")
                .and_then(|s| s.parse().ok()),
        };
        let last_modified = last_modified(&response);

        Ok(Download {
            reader: response.into_reader(),
            content_length,
            last_modified,
        })
    }

    fn probe(&self, location: &Location, since: Option<SystemTime>) -> Result<Probe> {
        let url = remote_url(location)?;
        let response = self.metadata_request(url, since)?;

        match response.status() {
            304 => Ok(Probe::NotModified),
            status if status >= 300 => Err(FetchError::Status {
                location: url.to_string(),
                code: status,
            }),
            _ => Ok(Probe::Modified(last_modified(&response))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_timeout_in_range() {
        let timeout = http_timeout();
        assert!(timeout.as_secs() >= 5);
        assert!(timeout.as_secs() <= 300);
    }

    #[test]
    fn test_basic_auth_header() {
        let options = TransportOptions::default().basic_auth("user", "secret");
        let transport = HttpTransport::new(&options);
        assert_eq!(
            transport.authorization.as_deref(),
            Some("Basic dXNlcjpzZWNyZXQ=")
        );
    }

    #[test]
    fn test_local_location_rejected() {
        let transport = HttpTransport::new(&TransportOptions::default());
        let local: Location = "/srv/file".parse().unwrap();
        assert!(!transport.supports(&local));
        assert!(matches!(transport.open(&local), Err(FetchError::Config(_))));
    }

    // ==================== Mocked HTTP tests ====================

    mod mock_tests {
        use super::*;
        use std::io::Read;
        use wiremock::matchers::{header, header_exists, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const STAMP: &str = "Wed, 21 Oct 2015 07:28:00 GMT";

        fn stamp() -> SystemTime {
            http_date::parse(STAMP).unwrap()
        }

        fn location(server: &MockServer, p: &str) -> Location {
            Location::Remote(format!("{}{}", server.uri(), p))
        }

        #[tokio::test]
        async fn test_open_streams_body_and_metadata() {
            let mock_server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/file.bin"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("Last-Modified", STAMP)
                        .set_body_bytes(b"payload".to_vec()),
                )
                .mount(&mock_server)
                .await;

            let transport = HttpTransport::new(&TransportOptions::default());
            let mut download = transport.open(&location(&mock_server, "/file.bin")).unwrap();
            let mut body = Vec::new();
            download.reader.read_to_end(&mut body).unwrap();

            assert_eq!(body, b"payload");
            assert_eq!(download.content_length, Some(7));
            assert_eq!(download.last_modified, Some(stamp()));
        }

        #[tokio::test]
        async fn test_open_404_is_status_error() {
            let mock_server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/missing"))
                .respond_with(ResponseTemplate::new(404))
                .mount(&mock_server)
                .await;

            let transport = HttpTransport::new(&TransportOptions::default());
            let err = transport
                .open(&location(&mock_server, "/missing"))
                .err()
                .unwrap();

            assert!(matches!(err, FetchError::Status { code: 404, .. }));
            assert!(err.is_retryable());
        }

        #[test]
        fn test_open_connection_refused_is_transport_error() {
            let transport = HttpTransport::new(&TransportOptions::default());
            let err = transport
                .open(&Location::Remote("http://127.0.0.1:1/file".into()))
                .err()
                .unwrap();
            assert!(matches!(err, FetchError::Transport { .. }));
        }

        #[tokio::test]
        async fn test_headers_and_auth_are_sent() {
            let mock_server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/private"))
                .and(header("X-Token", "abc"))
                .and(header("Authorization", "Basic dXNlcjpzZWNyZXQ="))
                .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
                .expect(1)
                .mount(&mock_server)
                .await;

            let options = TransportOptions::default()
                .header("X-Token", "abc")
                .basic_auth("user", "secret");
            let transport = HttpTransport::new(&options);

            assert!(transport.open(&location(&mock_server, "/private")).is_ok());
        }

        #[tokio::test]
        async fn test_probe_reads_last_modified_from_head() {
            let mock_server = MockServer::start().await;

            Mock::given(method("HEAD"))
                .and(path("/file.bin"))
                .respond_with(ResponseTemplate::new(200).insert_header("Last-Modified", STAMP))
                .expect(1)
                .mount(&mock_server)
                .await;

            let transport = HttpTransport::new(&TransportOptions::default());
            let probe = transport
                .probe(&location(&mock_server, "/file.bin"), None)
                .unwrap();

            assert_eq!(probe, Probe::Modified(Some(stamp())));
        }

        #[tokio::test]
        async fn test_probe_304_is_not_modified() {
            let mock_server = MockServer::start().await;

            Mock::given(method("HEAD"))
                .and(path("/file.bin"))
                .and(header_exists("If-Modified-Since"))
                .respond_with(ResponseTemplate::new(304))
                .mount(&mock_server)
                .await;

            let transport = HttpTransport::new(&TransportOptions::default());
            let probe = transport
                .probe(&location(&mock_server, "/file.bin"), Some(stamp()))
                .unwrap();

            assert_eq!(probe, Probe::NotModified);
        }

        #[tokio::test]
        async fn test_probe_falls_back_to_get_when_head_refused() {
            let mock_server = MockServer::start().await;

            Mock::given(method("HEAD"))
                .and(path("/file.bin"))
                .respond_with(ResponseTemplate::new(405))
                .mount(&mock_server)
                .await;
            Mock::given(method("GET"))
                .and(path("/file.bin"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("Last-Modified", STAMP)
                        .set_body_string("body"),
                )
                .expect(1)
                .mount(&mock_server)
                .await;

            let transport = HttpTransport::new(&TransportOptions::default());
            let probe = transport
                .probe(&location(&mock_server, "/file.bin"), None)
                .unwrap();

            assert_eq!(probe, Probe::Modified(Some(stamp())));
        }

        #[tokio::test]
        async fn test_probe_without_last_modified() {
            let mock_server = MockServer::start().await;

            Mock::given(method("HEAD"))
                .and(path("/file.bin"))
                .respond_with(ResponseTemplate::new(200))
                .mount(&mock_server)
                .await;

            let transport = HttpTransport::new(&TransportOptions::default());
            let probe = transport
                .probe(&location(&mock_server, "/file.bin"), None)
                .unwrap();

            assert_eq!(probe, Probe::Modified(None));
        }
    }
}
