//! HTTP transports for webhook delivery.
//!
//! The transport is picked once at startup from `HERALD_TRANSPORT`:
//! - [`ReqwestTransport`]: the default, full HTTP client
//! - [`RawHttpTransport`]: HTTP/1.1 written by hand over a tokio `TcpStream`,
//!   for environments where the webhook relay is a plain-HTTP sidecar

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use herald_common::config::TransportKind;
use herald_common::error::{HeraldError, HeraldResult};

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// POSTs a JSON document and returns the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &serde_json::Value)
    -> HeraldResult<TransportResponse>;
}

/// Build the transport selected by configuration.
pub fn build_transport(kind: TransportKind, timeout: Duration) -> HeraldResult<Box<dyn Transport>> {
    Ok(match kind {
        TransportKind::Reqwest => Box::new(ReqwestTransport::new(timeout)?),
        TransportKind::Raw => Box::new(RawHttpTransport::new(timeout)),
    })
}

/// Transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> HeraldResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> HeraldResult<TransportResponse> {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}

/// Minimal HTTP/1.1 client over a TCP socket. Only `http://` URLs are supported.
#[derive(Debug, Clone)]
pub struct RawHttpTransport {
    timeout: Duration,
}

impl RawHttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn exchange(&self, url: &Url, payload: &[u8]) -> HeraldResult<TransportResponse> {
        let host = url
            .host_str()
            .ok_or_else(|| HeraldError::Transport(format!("URL has no host: {url}")))?;
        let port = url.port_or_known_default().unwrap_or(80);
        let host_header = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        let mut stream = TcpStream::connect((host, port)).await?;

        let head = format!(
            "POST {target} HTTP/1.1\r\n\
             Host: {host_header}\r\n\
             User-Agent: agent-herald/{}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n",
            env!("CARGO_PKG_VERSION"),
            payload.len()
        );
        stream.write_all(head.as_bytes()).await?;
        stream.write_all(payload).await?;
        stream.flush().await?;

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await?;
        parse_response(&raw)
    }
}

#[async_trait]
impl Transport for RawHttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> HeraldResult<TransportResponse> {
        let url = Url::parse(url)
            .map_err(|e| HeraldError::Transport(format!("invalid URL `{url}`: {e}")))?;
        if url.scheme() != "http" {
            return Err(HeraldError::Transport(format!(
                "raw transport only supports http:// URLs, got {}://",
                url.scheme()
            )));
        }

        let payload = serde_json::to_vec(body)?;
        tokio::time::timeout(self.timeout, self.exchange(&url, &payload))
            .await
            .map_err(|_| {
                HeraldError::Transport(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
    }
}

/// Parse a complete HTTP/1.x response. Chunked bodies are returned undecoded.
pub fn parse_response(raw: &[u8]) -> HeraldResult<TransportResponse> {
    let text = String::from_utf8_lossy(raw);
    let (head, body) = text.split_once("\r\n\r\n").unwrap_or((text.as_ref(), ""));

    let status_line = head.lines().next().unwrap_or_default();
    let mut parts = status_line.split_whitespace();
    let status = match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse::<u16>()
            .map_err(|_| HeraldError::Transport(format!("bad status line: {status_line}")))?,
        _ => {
            return Err(HeraldError::Transport(format!(
                "bad status line: {status_line:?}"
            )));
        }
    };

    Ok(TransportResponse {
        status,
        body: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_response_no_content() {
        let response = parse_response(b"HTTP/1.1 204 No Content\r\nServer: test\r\n\r\n").unwrap();
        assert_eq!(response.status, 204);
        assert_eq!(response.body, "");
    }

    #[test]
    fn test_parse_response_with_body() {
        let raw = b"HTTP/1.1 404 Not Found\r\nContent-Length: 29\r\n\r\n{\"message\":\"Unknown Webhook\"}";
        let response = parse_response(raw).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.body, "{\"message\":\"Unknown Webhook\"}");
    }

    #[test]
    fn test_parse_response_garbage() {
        assert!(parse_response(b"").is_err());
        assert!(parse_response(b"hello world\r\n\r\n").is_err());
        assert!(parse_response(b"HTTP/1.1 abc OK\r\n\r\n").is_err());
    }

    #[tokio::test]
    async fn test_raw_transport_rejects_https() {
        let transport = RawHttpTransport::new(Duration::from_secs(1));
        let err = transport
            .post_json("https://discord.com/api/webhooks/1/x", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[tokio::test]
    async fn test_raw_transport_posts_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/webhooks/1/token"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"content": "hi"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let transport = RawHttpTransport::new(Duration::from_secs(5));
        let response = transport
            .post_json(
                &format!("{}/api/webhooks/1/token", server.uri()),
                &serde_json::json!({"content": "hi"}),
            )
            .await
            .unwrap();
        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_reqwest_transport_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad embed"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .post_json(&server.uri(), &serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(response.status, 400);
        assert_eq!(response.body, "bad embed");
    }

    #[test]
    fn test_build_transport_for_each_kind() {
        assert!(build_transport(TransportKind::Reqwest, Duration::from_secs(1)).is_ok());
        assert!(build_transport(TransportKind::Raw, Duration::from_secs(1)).is_ok());
    }
}
