// In-crate fakes for the external collaborators

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use super::errors::RelayError;
use super::extractors::MediaExtractor;
use super::http::RemoteHttp;
use super::models::{ByteStream, ExtractionResult};

fn stream_of(payload: &[u8], breaks: bool) -> ByteStream {
    let mut chunks: Vec<Result<Bytes, RelayError>> = payload
        .chunks(4)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    if breaks {
        chunks.push(Err(RelayError::Transport(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "source went away",
        ))));
    }
    Box::pin(futures::stream::iter(chunks))
}

pub async fn collect(mut stream: ByteStream) -> Result<Vec<u8>, RelayError> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk?);
    }
    Ok(out)
}

/// Extractor with a canned `describe` answer and a canned media payload
pub struct FakeExtractor {
    result: ExtractionResult,
    payload: Vec<u8>,
    breaks: bool,
    describe_calls: AtomicUsize,
    stream_calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn new(result: ExtractionResult) -> Self {
        Self {
            result,
            payload: Vec::new(),
            breaks: false,
            describe_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Stream the payload, then fail with a transport error
    pub fn breaking_after(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self.breaks = true;
        self
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn stream_calls(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaExtractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn describe(&self, _url: &str) -> ExtractionResult {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }

    async fn open_stream(&self, _url: &str) -> Result<ByteStream, RelayError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        Ok(stream_of(&self.payload, self.breaks))
    }
}

/// Remote HTTP with a canned page and a canned media body.
///
/// Whatever is left unset fails: no page means an upstream error on
/// `fetch_page`, no media means a 404 from `open_media`.
#[derive(Default)]
pub struct FakeHttp {
    page: Option<String>,
    media: Option<Vec<u8>>,
    page_calls: AtomicUsize,
    media_calls: AtomicUsize,
    last_media_url: Mutex<Option<String>>,
}

impl FakeHttp {
    pub fn with_page(html: impl Into<String>) -> Self {
        Self {
            page: Some(html.into()),
            ..Self::default()
        }
    }

    pub fn with_media(body: Vec<u8>) -> Self {
        Self {
            media: Some(body),
            ..Self::default()
        }
    }

    pub fn and_media(mut self, body: Vec<u8>) -> Self {
        self.media = Some(body);
        self
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn media_calls(&self) -> usize {
        self.media_calls.load(Ordering::SeqCst)
    }

    pub fn last_media_url(&self) -> Option<String> {
        self.last_media_url.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteHttp for FakeHttp {
    async fn fetch_page(&self, _url: &str) -> Result<String, RelayError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.page
            .clone()
            .ok_or_else(|| RelayError::Upstream("connection refused".to_string()))
    }

    async fn open_media(&self, url: &str) -> Result<ByteStream, RelayError> {
        self.media_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_media_url.lock().unwrap() = Some(url.to_string());
        match &self.media {
            Some(body) => Ok(stream_of(body, false)),
            None => Err(RelayError::Upstream(format!("HTTP error: 404 Not Found for {}", url))),
        }
    }
}
