//! Flyer loading: the fetch collaborator seam and the load state machine.
//!
//! The core never fetches anything itself. `set_flyer_id` hands a
//! `FetchRequest` and a `FetchReply` to the host's `ContentFetcher`; the
//! reply may be completed from any thread and only posts into a channel.
//! The owner thread drains that channel in `FlyerLoader::take_completion`,
//! where completions for superseded requests are discarded.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::geometry::{Rect, Size};

/// Everything a fetch collaborator needs to retrieve one flyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub flyer_id: i64,
    pub root_url: String,
    pub version: String,
    pub access_token: Option<String>,
}

impl FetchRequest {
    /// URL of a publication resource, e.g. `resource_url("manifest.json")`.
    ///
    /// Produces `{root}flyerkit/{version}/publication/{id}/{resource}`, with
    /// `?access_token=...` appended when a token is present. The token is
    /// percent-encoded.
    pub fn resource_url(&self, resource: &str) -> String {
        let separator = if self.root_url.ends_with('/') { "" } else { "/" };
        let mut url = format!(
            "{}{}flyerkit/{}/publication/{}/{}",
            self.root_url, separator, self.version, self.flyer_id, resource
        );
        if let Some(token) = &self.access_token {
            url.push_str("?access_token=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }
}

/// What the fetch collaborator delivers on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    /// Bounds of the content coordinate space
    pub content_size: Size,
    /// Page rectangles in content coordinates, in reading order
    #[serde(default)]
    pub pages: Vec<Rect>,
    /// Opaque reference the renderer uses to draw the content
    #[serde(default)]
    pub source: Option<String>,
}

impl ContentDescriptor {
    pub fn new(content_size: Size) -> Self {
        Self {
            content_size,
            pages: Vec::new(),
            source: None,
        }
    }

    pub fn with_pages(mut self, pages: Vec<Rect>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        let descriptor: Self = serde_json::from_str(json)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Reject content the view could not lay out.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.content_size.is_empty() {
            return Err(FetchError::invalid_content(format!(
                "content size {}x{} is empty",
                self.content_size.width, self.content_size.height
            )));
        }
        if let Some(i) = self.pages.iter().position(Rect::is_degenerate) {
            return Err(FetchError::invalid_content(format!("page {i} is degenerate")));
        }
        Ok(())
    }
}

/// Host-supplied collaborator that retrieves flyer content.
///
/// `fetch` must not block; it should start the work and complete `reply`
/// later, from any thread. Dropping `reply` without sending completes the
/// request as `FetchError::Abandoned`.
pub trait ContentFetcher {
    fn fetch(&self, request: FetchRequest, reply: FetchReply);
}

/// Identity of one `set_flyer_id` call. Tokens only increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// A finished fetch travelling back to the owner thread.
#[derive(Debug)]
pub(crate) struct Completion {
    token: RequestToken,
    result: Result<ContentDescriptor, FetchError>,
}

/// One-shot completion handle given to the fetch collaborator.
#[derive(Debug)]
pub struct FetchReply {
    token: RequestToken,
    tx: Option<Sender<Completion>>,
}

impl FetchReply {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Complete the request. Safe to call from any thread.
    pub fn send(mut self, result: Result<ContentDescriptor, FetchError>) {
        self.post(result);
    }

    fn post(&mut self, result: Result<ContentDescriptor, FetchError>) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        if tx
            .send(Completion {
                token: self.token,
                result,
            })
            .is_err()
        {
            // The view is gone; nobody is waiting
            log::debug!("Fetch {:?} completed after its view was dropped", self.token);
        }
    }
}

impl Drop for FetchReply {
    fn drop(&mut self) {
        if self.tx.is_some() {
            log::warn!("Fetch {:?} dropped without a result", self.token);
            self.post(Err(FetchError::Abandoned));
        }
    }
}

/// Load progress of the current flyer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(FetchError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded)
    }
}

/// Request tokens, the completion channel and the resulting `LoadState`.
#[derive(Debug)]
pub struct FlyerLoader {
    next_token: u64,
    current: Option<RequestToken>,
    state: LoadState,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl FlyerLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            next_token: 1,
            current: None,
            state: LoadState::Idle,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Token of the request still awaiting completion, if any.
    pub fn pending_token(&self) -> Option<RequestToken> {
        self.current
    }

    /// Start a new request, superseding any in flight.
    pub fn begin(&mut self) -> FetchReply {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        if let Some(previous) = self.current.replace(token) {
            log::debug!("Request {previous:?} superseded by {token:?}");
        }
        self.state = LoadState::Loading;
        FetchReply {
            token,
            tx: Some(self.tx.clone()),
        }
    }

    /// Take the completion of the current request, if it has arrived.
    ///
    /// Stale completions are discarded on the way. The returned descriptor
    /// has been validated; `state()` already reflects the outcome.
    /// Non-blocking.
    pub fn take_completion(&mut self) -> Option<Result<ContentDescriptor, FetchError>> {
        loop {
            let completion = match self.rx.try_recv() {
                Ok(completion) => completion,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("Completion channel disconnected");
                    return None;
                }
            };

            if self.current != Some(completion.token) {
                log::debug!("Dropping stale completion for {:?}", completion.token);
                continue;
            }
            self.current = None;

            let result = completion
                .result
                .and_then(|descriptor| descriptor.validate().map(|()| descriptor));
            self.state = match &result {
                Ok(_) => LoadState::Loaded,
                Err(err) => LoadState::Failed(err.clone()),
            };
            return Some(result);
        }
    }
}

impl Default for FlyerLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn descriptor() -> ContentDescriptor {
        ContentDescriptor::new(Size::new(1000.0, 800.0))
    }

    fn request(token: Option<&str>) -> FetchRequest {
        FetchRequest {
            flyer_id: 42,
            root_url: "https://api.example.com/".to_string(),
            version: "v2".to_string(),
            access_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_resource_url() {
        assert_eq!(
            request(Some("abc")).resource_url("manifest.json"),
            "https://api.example.com/flyerkit/v2/publication/42/manifest.json?access_token=abc"
        );

        let mut bare = request(None);
        bare.root_url = "https://api.example.com".to_string();
        assert_eq!(
            bare.resource_url("pages"),
            "https://api.example.com/flyerkit/v2/publication/42/pages"
        );
    }

    #[test]
    fn test_resource_url_encodes_token() {
        let url = request(Some("a&b=c#d e/+")).resource_url("manifest.json");
        assert_eq!(
            url,
            "https://api.example.com/flyerkit/v2/publication/42/manifest.json\
             ?access_token=a%26b%3Dc%23d%20e%2F%2B"
        );
        // Unreserved characters pass through
        assert!(
            request(Some("AZaz09-._~"))
                .resource_url("pages")
                .ends_with("?access_token=AZaz09-._~")
        );
    }

    #[test]
    fn test_descriptor_from_json() {
        let json = r#"{
            "content_size": {"width": 1200.0, "height": 900.0},
            "pages": [{"x": 0.0, "y": 0.0, "width": 600.0, "height": 900.0}]
        }"#;
        let descriptor = ContentDescriptor::from_json(json).unwrap();
        assert_eq!(descriptor.content_size, Size::new(1200.0, 900.0));
        assert_eq!(descriptor.pages.len(), 1);
        assert_eq!(descriptor.source, None);

        assert!(matches!(
            ContentDescriptor::from_json("{not json"),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            ContentDescriptor::from_json(r#"{"content_size": {"width": 0.0, "height": 10.0}}"#),
            Err(FetchError::InvalidContent { .. })
        ));
    }

    #[test]
    fn test_completion_applied() {
        let mut loader = FlyerLoader::new();
        assert_eq!(loader.state(), &LoadState::Idle);

        let reply = loader.begin();
        assert!(loader.state().is_loading());
        assert!(loader.take_completion().is_none());

        reply.send(Ok(descriptor()));
        assert_eq!(loader.take_completion(), Some(Ok(descriptor())));
        assert!(loader.state().is_loaded());
        assert_eq!(loader.pending_token(), None);
    }

    #[test]
    fn test_stale_completion_dropped() {
        let mut loader = FlyerLoader::new();
        let first = loader.begin();
        let second = loader.begin();
        assert!(first.token() < second.token());

        first.send(Ok(descriptor()));
        assert!(loader.take_completion().is_none());
        assert!(loader.state().is_loading());

        second.send(Err(FetchError::Http { status: 404 }));
        assert_eq!(
            loader.take_completion(),
            Some(Err(FetchError::Http { status: 404 }))
        );
        assert_eq!(
            loader.state(),
            &LoadState::Failed(FetchError::Http { status: 404 })
        );
    }

    #[test]
    fn test_dropped_reply_is_abandoned() {
        let mut loader = FlyerLoader::new();
        drop(loader.begin());
        assert_eq!(loader.take_completion(), Some(Err(FetchError::Abandoned)));
        assert_eq!(loader.state(), &LoadState::Failed(FetchError::Abandoned));
    }

    #[test]
    fn test_invalid_descriptor_fails() {
        let mut loader = FlyerLoader::new();
        loader
            .begin()
            .send(Ok(ContentDescriptor::new(Size::new(100.0, f64::NAN))));
        assert!(matches!(
            loader.take_completion(),
            Some(Err(FetchError::InvalidContent { .. }))
        ));
    }

    #[test]
    fn test_reply_from_another_thread() {
        let mut loader = FlyerLoader::new();
        let reply = loader.begin();
        thread::spawn(move || reply.send(Ok(descriptor())))
            .join()
            .unwrap();
        assert_eq!(loader.take_completion(), Some(Ok(descriptor())));
    }

    #[test]
    fn test_reply_outliving_loader() {
        let mut loader = FlyerLoader::new();
        let reply = loader.begin();
        drop(loader);
        // Must not panic
        reply.send(Ok(descriptor()));
    }
}
