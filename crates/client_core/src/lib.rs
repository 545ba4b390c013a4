//! Frontend core for the PayLens greeting view.
//!
//! The view renders a fixed heading and a single display string. On mount it
//! performs one greeting fetch; the result settles the display string exactly
//! once — the backend message on success, a fixed fallback on any failure.

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{GreetingResponse, HELLO_PATH};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Heading shown above the greeting; invariant across fetch outcomes.
pub const VIEW_TITLE: &str = "PayLens";

/// Shown in place of the greeting when the fetch fails in any way.
pub const FALLBACK_GREETING: &str = "Backend unreachable";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid server url: {0}")]
    InvalidServerUrl(#[from] url::ParseError),
    #[error("greeting request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Seam between the view and the transport, mockable in tests.
#[async_trait]
pub trait GreetingApi: Send + Sync {
    async fn fetch_greeting(&self) -> Result<GreetingResponse, FetchError>;
}

/// HTTP implementation used by the real frontends.
#[derive(Debug)]
pub struct HttpGreetingApi {
    http: Client,
    hello_url: Url,
}

impl HttpGreetingApi {
    pub fn new(server_url: &str) -> Result<Self, FetchError> {
        let hello_url = Url::parse(server_url)?.join(HELLO_PATH)?;
        Ok(Self {
            http: Client::new(),
            hello_url,
        })
    }
}

#[async_trait]
impl GreetingApi for HttpGreetingApi {
    async fn fetch_greeting(&self) -> Result<GreetingResponse, FetchError> {
        let response = self
            .http
            .get(self.hello_url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Terminal outcome of the single greeting fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx response; `None` when the payload lacked the `message` field.
    Greeting(Option<String>),
    /// Any request failure: connect error, non-2xx status, or a body that did
    /// not decode as the expected JSON shape. The branches are not
    /// distinguished beyond logging.
    Failed,
}

impl FetchOutcome {
    /// Runs the fetch and collapses every error into [`FetchOutcome::Failed`].
    pub async fn settle(api: &dyn GreetingApi) -> Self {
        match api.fetch_greeting().await {
            Ok(response) => Self::Greeting(response.message),
            Err(err) => {
                debug!(%err, "greeting fetch failed; falling back");
                Self::Failed
            }
        }
    }
}

/// State behind the greeting view.
///
/// The display string starts empty and is overwritten at most once, and only
/// while the view is still active.
#[derive(Debug, Clone)]
pub struct GreetingView {
    display: String,
    settled: bool,
    active: bool,
}

impl Default for GreetingView {
    fn default() -> Self {
        Self::new()
    }
}

impl GreetingView {
    pub fn new() -> Self {
        Self {
            display: String::new(),
            settled: false,
            active: true,
        }
    }

    /// Fixed heading; present regardless of the fetch outcome.
    pub fn title(&self) -> &'static str {
        VIEW_TITLE
    }

    /// Current display string: empty until the fetch settles.
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Applies the fetch outcome and reports whether the state changed.
    /// Repeat outcomes, and outcomes arriving after [`GreetingView::dismiss`],
    /// are ignored.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if self.settled || !self.active {
            return false;
        }
        self.display = match outcome {
            FetchOutcome::Greeting(message) => message.unwrap_or_default(),
            FetchOutcome::Failed => FALLBACK_GREETING.to_string(),
        };
        self.settled = true;
        true
    }

    /// Marks the view inactive; late outcomes no longer apply.
    pub fn dismiss(&mut self) {
        self.active = false;
    }
}

/// Mount-time cycle: exactly one fetch, settled into the view at most once.
pub async fn mount(api: &dyn GreetingApi, view: &mut GreetingView) {
    let outcome = FetchOutcome::settle(api).await;
    view.apply(outcome);
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
