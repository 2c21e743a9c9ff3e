// Remote HTTP collaborator - page fetches for the scraper, media fetches for images

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::debug;

use super::errors::RelayError;
use super::models::ByteStream;

/// Desktop Chrome identity used for media fetches and yt-dlp
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Search-engine crawler identity; X and Instagram serve meta tags to it
/// without a login wall
pub const CRAWLER_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";

pub const CRAWLER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Chunk size for image bodies
pub const IMAGE_CHUNK_SIZE: usize = 8 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Plain HTTP GETs against third-party hosts
#[async_trait]
pub trait RemoteHttp: Send + Sync {
    /// Fetch page HTML with the crawler identity
    async fn fetch_page(&self, url: &str) -> Result<String, RelayError>;

    /// Open a media URL with the browser identity.
    ///
    /// Fails before yielding anything if the status is not a success.
    async fn open_media(&self, url: &str) -> Result<ByteStream, RelayError>;
}

pub struct ReqwestHttp {
    crawler: Client,
    browser: Client,
}

impl ReqwestHttp {
    pub fn new(scrape_timeout: Duration) -> Result<Self, RelayError> {
        let mut crawler_headers = HeaderMap::new();
        crawler_headers.insert(ACCEPT, HeaderValue::from_static(CRAWLER_ACCEPT));

        let crawler = Client::builder()
            .user_agent(CRAWLER_USER_AGENT)
            .default_headers(crawler_headers)
            .timeout(scrape_timeout)
            .no_proxy()
            .build()
            .map_err(|e| RelayError::Upstream(format!("Failed to build crawler client: {}", e)))?;

        // No overall timeout: media bodies can take as long as the client keeps reading
        let browser = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(|e| RelayError::Upstream(format!("Failed to build browser client: {}", e)))?;

        Ok(Self { crawler, browser })
    }
}

#[async_trait]
impl RemoteHttp for ReqwestHttp {
    async fn fetch_page(&self, url: &str) -> Result<String, RelayError> {
        let response = self
            .crawler
            .get(url)
            .send()
            .await
            .map_err(|e| RelayError::Upstream(format!("Failed to fetch page: {}", e)))?;

        // Login walls often answer non-200 but still carry the meta tags
        debug!(status = %response.status(), url, "page fetched");

        response
            .text()
            .await
            .map_err(|e| RelayError::Upstream(format!("Failed to read page: {}", e)))
    }

    async fn open_media(&self, url: &str) -> Result<ByteStream, RelayError> {
        let response = self
            .browser
            .get(url)
            .send()
            .await
            .map_err(|e| RelayError::Upstream(format!("Failed to fetch media: {}", e)))?;

        if !response.status().is_success() {
            return Err(RelayError::Upstream(format!(
                "HTTP error: {} for {}",
                response.status(),
                url
            )));
        }

        let body = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        let reader = StreamReader::new(body);
        Ok(Box::pin(
            ReaderStream::with_capacity(reader, IMAGE_CHUNK_SIZE).map_err(RelayError::Transport),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::testing::collect;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned response on loopback; the task yields the raw request head
    async fn serve_once(status: &str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let status = status.to_string();

        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response_head = format!(
                "HTTP/1.1 {}\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                status,
                body.len()
            );
            // The client may hang up early on error statuses
            let _ = socket.write_all(response_head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&head).to_lowercase()
        });

        (base, task)
    }

    fn client() -> ReqwestHttp {
        ReqwestHttp::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_page_fetch_uses_crawler_identity() {
        let (base, server) = serve_once("200 OK", b"<html>ok</html>".to_vec()).await;

        let html = client().fetch_page(&format!("{}/user/status/1", base)).await.unwrap();
        let head = server.await.unwrap();

        assert_eq!(html, "<html>ok</html>");
        assert!(head.starts_with("get /user/status/1 "));
        assert!(head.contains("user-agent: mozilla/5.0 (compatible; googlebot/2.1"));
        assert!(head.contains("accept: text/html,application/xhtml+xml"));
    }

    #[tokio::test]
    async fn test_page_with_error_status_is_still_read() {
        let page = r#"<meta property="og:image" content="https://cdn.example.com/a.jpg">"#;
        let (base, server) = serve_once("403 Forbidden", page.as_bytes().to_vec()).await;

        let html = client().fetch_page(&format!("{}/p/abc/", base)).await.unwrap();
        server.await.unwrap();

        assert_eq!(html, page);
    }

    #[tokio::test]
    async fn test_media_error_status_fails_before_bytes() {
        let (base, server) = serve_once("404 Not Found", b"missing".to_vec()).await;

        let err = client()
            .open_media(&format!("{}/media/gone.jpg", base))
            .await
            .err()
            .unwrap();
        server.await.unwrap();

        match err {
            RelayError::Upstream(msg) => assert!(msg.contains("404")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_media_uses_browser_identity_and_streams_body() {
        let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let (base, server) = serve_once("200 OK", payload.clone()).await;

        let body = client()
            .open_media(&format!("{}/media/big.jpg", base))
            .await
            .unwrap();
        let received = collect(body).await.unwrap();
        let head = server.await.unwrap();

        assert_eq!(received, payload);
        assert!(head.contains("chrome/120"));
        assert!(!head.contains("googlebot"));
    }
}
