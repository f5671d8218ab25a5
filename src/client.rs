use crate::error::{BoxError, StreamError};
use crate::stream::{self, FinalResult, Framing, StreamEvent, StreamEventReader};
use crate::trip::TripForm;
use anyhow::Context;
use futures_core::stream::BoxStream;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_stream::StreamExt;

/// Streaming endpoints of the travel backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    PlanTravel,
    SendMessage,
    AttractionGuide,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::PlanTravel => "plan_travel",
            Endpoint::SendMessage => "send_message",
            Endpoint::AttractionGuide => "attraction_guide",
        }
    }

    /// The plan endpoint separates events with blank lines; the chat-style
    /// endpoints send one `data: ` line per event.
    pub fn framing(self) -> Framing {
        match self {
            Endpoint::PlanTravel => Framing::BlankLine,
            Endpoint::SendMessage | Endpoint::AttractionGuide => Framing::DataLine,
        }
    }
}

/// Agent selector for `/send_message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    General,
    #[default]
    Travel,
    PdfGenerator,
}

#[derive(Debug, Clone, Serialize)]
struct SendMessageRequest<'a> {
    message: &'a str,
    agent_type: AgentType,
}

/// Body of `POST /attraction_guide`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideRequest {
    pub message: String,
    pub generate_image: bool,
}

impl GuideRequest {
    pub fn new(attraction: &str, style: &str, generate_image: bool) -> Self {
        Self {
            message: format!(
                "Please give a detailed introduction to {attraction} in a {style} style, \
                 covering its history, cultural significance, architecture and tips for visiting."
            ),
            generate_image,
        }
    }

    /// Markdown shown as the user's side of a guide turn.
    pub fn summary(attraction: &str, style: &str, generate_image: bool) -> String {
        let image = if generate_image { "✅ enabled" } else { "❌ disabled" };
        format!(
            "🏛️ **Attraction guide request**\n\n\
             **Attraction**: {attraction}\n\
             **Style**: {style}\n\
             **Image generation**: {image}"
        )
    }
}

/// A response body waiting to be read.
pub struct EventStream {
    endpoint: Endpoint,
    body: BoxStream<'static, Result<bytes::Bytes, BoxError>>,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl EventStream {
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Read the whole body, calling `on_event` for each event.
    pub async fn pump<F>(self, on_event: F) -> Result<FinalResult, StreamError>
    where
        F: FnMut(StreamEvent),
    {
        let reader = StreamEventReader::new(self.endpoint.framing());
        stream::pump(self.body, reader, on_event).await
    }
}

/// HTTP client for the travel page's streaming calls.
#[derive(Debug, Clone)]
pub struct TravelClient {
    http: reqwest::Client,
    base_url: String,
    idle_timeout: Option<Duration>,
}

impl TravelClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> anyhow::Result<Self> {
        let mut url = Url::parse(base_url)
            .with_context(|| format!("invalid backend URL: {base_url}"))?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url: url.to_string(),
            idle_timeout: None,
        })
    }

    /// Fail a stream when no bytes arrive for `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn plan_travel(&self, form: &TripForm) -> Result<EventStream, StreamError> {
        self.open(Endpoint::PlanTravel, form).await
    }

    pub async fn send_message(
        &self,
        message: &str,
        agent_type: AgentType,
    ) -> Result<EventStream, StreamError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(StreamError::Rejected("message is empty".to_string()));
        }
        self.open(
            Endpoint::SendMessage,
            &SendMessageRequest { message, agent_type },
        )
        .await
    }

    pub async fn attraction_guide(&self, req: &GuideRequest) -> Result<EventStream, StreamError> {
        self.open(Endpoint::AttractionGuide, req).await
    }

    async fn open<T: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &T,
    ) -> Result<EventStream, StreamError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        tracing::debug!(%url, "opening event stream");

        let resp = self
            .http
            .post(&url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .json(body)
            .send()
            .await
            .map_err(|source| StreamError::Request {
                endpoint: endpoint.path(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StreamError::Status {
                endpoint: endpoint.path(),
                status,
                body,
            });
        }

        let chunks = resp.bytes_stream().map(|r| r.map_err(BoxError::from));
        let body: BoxStream<'static, Result<bytes::Bytes, BoxError>> = match self.idle_timeout {
            Some(idle) => Box::pin(chunks.timeout(idle).map(|r| match r {
                Ok(item) => item,
                Err(elapsed) => Err(BoxError::from(elapsed)),
            })),
            None => Box::pin(chunks),
        };

        Ok(EventStream { endpoint, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_framing() {
        assert_eq!(Endpoint::PlanTravel.framing(), Framing::BlankLine);
        assert_eq!(Endpoint::SendMessage.framing(), Framing::DataLine);
        assert_eq!(Endpoint::AttractionGuide.framing(), Framing::DataLine);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let c = TravelClient::new(reqwest::Client::new(), "http://127.0.0.1:5000/app").unwrap();
        assert_eq!(c.base_url(), "http://127.0.0.1:5000/app/");

        let c = TravelClient::new(reqwest::Client::new(), "http://127.0.0.1:5000").unwrap();
        assert_eq!(c.base_url(), "http://127.0.0.1:5000/");

        assert!(TravelClient::new(reqwest::Client::new(), "not a url").is_err());
    }

    #[test]
    fn test_agent_type_wire_names() {
        assert_eq!(
            serde_json::to_value(AgentType::PdfGenerator).unwrap(),
            "pdf_generator"
        );
        let body = serde_json::to_value(SendMessageRequest {
            message: "hi",
            agent_type: AgentType::Travel,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"message": "hi", "agent_type": "travel"}));
    }

    #[test]
    fn test_guide_request() {
        let req = GuideRequest::new("the Forbidden City", "humorous", true);
        assert!(req.message.contains("the Forbidden City in a humorous style"));
        assert!(req.generate_image);
        assert!(GuideRequest::summary("Leshan Buddha", "academic", false).contains("❌ disabled"));
    }
}
