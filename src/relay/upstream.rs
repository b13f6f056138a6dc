//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Rewrite the inbound URI onto the upstream scheme and host
//! - Forward method, whitelisted headers and the streamed body
//! - Bound the wait for response headers
//!
//! # Design Decisions
//! - The inbound scheme, host and port are never used
//! - Bodies are streamed in both directions, never buffered
//! - The deadline starts once the request body is sent and stops at
//!   response headers, so slow uploads and long streams are not cut

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{Request, Response, Uri};
use hyper::body::{Body as HttpBody, Frame, Incoming, SizeHint};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::oneshot;
use url::Url;

use crate::config::UpstreamConfig;
use crate::relay::error::{RelayError, RelayResult};
use crate::security::headers::HeaderWhitelist;

/// Client bound to a single upstream origin.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    base_url: Url,
    response_timeout: Duration,
}

impl UpstreamClient {
    /// Create a new upstream client.
    pub fn new(config: &UpstreamConfig) -> RelayResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|source| RelayError::UpstreamUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let https = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())
            .map_err(RelayError::Tls)?
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build(https),
            base_url,
            response_timeout: Duration::from_secs(config.response_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Upstream URL for an inbound URI: same path and query, upstream origin.
    pub fn target_url(&self, uri: &Uri) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(uri.path());
        url.set_query(uri.query().filter(|query| !query.is_empty()));
        url
    }

    /// Send `request` upstream and wait for the response headers.
    pub async fn forward(
        &self,
        request: Request<Body>,
        whitelist: &HeaderWhitelist,
    ) -> RelayResult<Response<Incoming>> {
        let (parts, body) = request.into_parts();
        let url = self.target_url(&parts.uri);
        let uri: Uri = url.as_str().parse()?;

        tracing::debug!(
            method = %parts.method,
            upstream = %url,
            "Forwarding request"
        );

        let (sent_tx, sent_rx) = oneshot::channel();
        let mut outbound = Request::new(Body::new(UploadBody::new(body, sent_tx)));
        *outbound.method_mut() = parts.method;
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = whitelist.filter(&parts.headers);

        let response = self.client.request(outbound);
        tokio::pin!(response);

        // A dropped sender means the connection is done with the body.
        tokio::select! {
            result = &mut response => return result.map_err(RelayError::Upstream),
            _ = sent_rx => {}
        }

        match tokio::time::timeout(self.response_timeout, response).await {
            Ok(result) => result.map_err(RelayError::Upstream),
            Err(_) => Err(RelayError::UpstreamTimeout(self.response_timeout)),
        }
    }
}

/// Request body that reports when it has been fully sent.
struct UploadBody {
    inner: Body,
    sent: Option<oneshot::Sender<()>>,
}

impl UploadBody {
    fn new(inner: Body, sent: oneshot::Sender<()>) -> Self {
        Self {
            inner,
            sent: Some(sent),
        }
    }
}

impl HttpBody for UploadBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let frame = Pin::new(&mut self.inner).poll_frame(cx);
        if let Poll::Ready(None | Some(Err(_))) = frame {
            if let Some(sent) = self.sent.take() {
                let _ = sent.send(());
            }
        }
        frame
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    use axum::http::StatusCode;
    use tokio::sync::mpsc;

    fn client(base_url: &str) -> UpstreamClient {
        UpstreamClient::new(&UpstreamConfig {
            base_url: base_url.to_string(),
            ..UpstreamConfig::default()
        })
        .unwrap()
    }

    /// Body fed chunk by chunk from a channel.
    struct ChannelBody(mpsc::Receiver<Bytes>);

    impl HttpBody for ChannelBody {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            self.0.poll_recv(cx).map(|chunk| chunk.map(|data| Ok(Frame::data(data))))
        }
    }

    /// Upstream that answers with the size of the fully read request body.
    async fn start_counting_upstream() -> String {
        let app = axum::Router::new().fallback(|body: Bytes| async move { body.len().to_string() });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_keeps_path_and_query() {
        let upstream = client("https://api.openai.com");
        let uri: Uri = "/v1/models?x=1".parse().unwrap();

        let url = upstream.target_url(&uri);
        assert_eq!(url.as_str(), "https://api.openai.com/v1/models?x=1");
    }

    #[test]
    fn test_discards_inbound_origin() {
        let upstream = client("https://api.openai.com");
        let uri: Uri = "http://localhost:8080/v1/chat/completions".parse().unwrap();

        let url = upstream.target_url(&uri);
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("api.openai.com"));
        assert_eq!(url.path(), "/v1/chat/completions");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_double_slash_cannot_change_host() {
        let upstream = client("https://api.openai.com");
        let uri: Uri = "//evil.example/v1/models".parse().unwrap();

        let url = upstream.target_url(&uri);
        assert_eq!(url.host_str(), Some("api.openai.com"));
        assert_eq!(url.path(), "//evil.example/v1/models");

        let target: Uri = url.as_str().parse().unwrap();
        assert_eq!(target.host(), Some("api.openai.com"));
    }

    #[test]
    fn test_preserves_encoded_path_and_port() {
        let upstream = client("http://127.0.0.1:9000");
        let uri: Uri = "/v1/files/a%20b?purpose=fine-tune&limit=2".parse().unwrap();

        let url = upstream.target_url(&uri);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9000/v1/files/a%20b?purpose=fine-tune&limit=2"
        );
    }

    #[test]
    fn test_empty_query_is_dropped() {
        let upstream = client("https://api.openai.com");
        let uri: Uri = "/v1/models?".parse().unwrap();
        assert_eq!(upstream.target_url(&uri).as_str(), "https://api.openai.com/v1/models");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = UpstreamClient::new(&UpstreamConfig {
            base_url: "not a url".into(),
            ..UpstreamConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, RelayError::UpstreamUrl { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_upstream_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let upstream = client(&format!("http://{addr}"));
        let request = Request::builder()
            .uri("/v1/models")
            .body(Body::empty())
            .unwrap();

        let err = upstream
            .forward(request, &HeaderWhitelist::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_upload_body_signals_when_sent() {
        let (sent_tx, sent_rx) = oneshot::channel();
        let body = Body::new(UploadBody::new(Body::from("abc"), sent_tx));

        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"abc");
        assert!(sent_rx.await.is_ok());
    }

    #[tokio::test]
    async fn test_slow_upload_does_not_count_against_response_timeout() {
        let upstream = UpstreamClient::new(&UpstreamConfig {
            base_url: start_counting_upstream().await,
            response_timeout_secs: 1,
            ..UpstreamConfig::default()
        })
        .unwrap();

        let (chunks, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            chunks.send(Bytes::from_static(b"first ")).await.unwrap();
            tokio::time::sleep(Duration::from_millis(1500)).await;
            chunks.send(Bytes::from_static(b"second")).await.unwrap();
        });

        let request = Request::builder()
            .method("POST")
            .uri("/v1/files")
            .body(Body::new(ChannelBody(rx)))
            .unwrap();

        let response = upstream
            .forward(request, &HeaderWhitelist::default())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"12");
    }
}
