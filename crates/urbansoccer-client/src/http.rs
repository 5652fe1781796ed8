//! reqwest implementation of the campaign backend and speech synthesis.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use urbansoccer_core::backend::{AudioClip, CampaignBackend, SpeechSynthesizer};
use urbansoccer_core::error::ClientError;
use urbansoccer_core::identity::IdentityProvider;
use urbansoccer_core::turn::TurnPayload;
use uuid::Uuid;

use crate::classify::{self, Operation};
use crate::config::ClientConfig;
use crate::error::SetupError;

/// Header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayRequest<'a> {
    action_id: &'a str,
}

#[derive(Serialize)]
struct SpeakRequest<'a> {
    text: &'a str,
}

/// Campaign backend over HTTP.
#[derive(Clone)]
pub struct HttpCampaignClient {
    http: Client,
    base_url: Url,
    config: ClientConfig,
    identity: Arc<dyn IdentityProvider>,
}

impl HttpCampaignClient {
    /// Creates a client for `config`, authenticating with `identity`.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::InvalidUrl` if the base URL cannot be parsed or
    /// cannot carry a path, and `SetupError::Http` if the HTTP client fails
    /// to build.
    pub fn new(
        config: ClientConfig,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, SetupError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| SetupError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SetupError::InvalidUrl {
                url: config.base_url.clone(),
                reason: "not a base url".to_owned(),
            });
        }
        let http = Client::builder().timeout(config.api_timeout).build()?;
        Ok(Self {
            http,
            base_url,
            config,
            identity,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> (Uuid, RequestBuilder) {
        let request_id = Uuid::new_v4();
        let mut builder = self
            .http
            .request(method, self.endpoint(segments))
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = self.identity.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        (request_id, builder)
    }

    async fn send(
        &self,
        operation: Operation,
        request_id: Uuid,
        builder: RequestBuilder,
    ) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(|e| {
            warn!(%request_id, error = %e, "request failed before a response arrived");
            classify::from_transport(&e)
        })?;
        let status = response.status();
        if status.is_success() {
            debug!(%request_id, status = status.as_u16(), "request succeeded");
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let error = classify::from_status(operation, status.as_u16(), &body);
        warn!(%request_id, status = status.as_u16(), error = %error, "request rejected");
        Err(error)
    }

    async fn turn(
        &self,
        operation: Operation,
        request_id: Uuid,
        builder: RequestBuilder,
    ) -> Result<TurnPayload, ClientError> {
        let response = self.send(operation, request_id, builder).await?;
        response
            .json::<TurnPayload>()
            .await
            .map_err(|e| classify::from_transport(&e))
    }
}

#[async_trait]
impl CampaignBackend for HttpCampaignClient {
    #[instrument(skip(self))]
    async fn start_session(&self, campaign_id: &str) -> Result<TurnPayload, ClientError> {
        let (request_id, builder) =
            self.request(Method::GET, &["campaigns", campaign_id, "start"]);
        self.turn(Operation::Other, request_id, builder).await
    }

    #[instrument(skip(self))]
    async fn resume_session(&self, campaign_id: &str) -> Result<TurnPayload, ClientError> {
        let (request_id, builder) =
            self.request(Method::GET, &["campaigns", campaign_id, "resume"]);
        self.turn(Operation::Other, request_id, builder).await
    }

    #[instrument(skip(self))]
    async fn submit_action(
        &self,
        campaign_id: &str,
        action_id: &str,
    ) -> Result<TurnPayload, ClientError> {
        let (request_id, builder) =
            self.request(Method::POST, &["campaigns", campaign_id, "play"]);
        let builder = builder.json(&PlayRequest { action_id });
        self.turn(Operation::Submit, request_id, builder).await
    }

    #[instrument(skip(self))]
    async fn reset_session(&self, campaign_id: &str) -> Result<(), ClientError> {
        let (request_id, builder) =
            self.request(Method::POST, &["campaigns", campaign_id, "reset"]);
        self.send(Operation::Other, request_id, builder)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpCampaignClient {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn synthesize_speech(&self, text: &str) -> Result<AudioClip, ClientError> {
        let (request_id, builder) = self.request(Method::POST, &["narration", "speak"]);
        let builder = builder
            .timeout(self.config.speech_timeout)
            .json(&SpeakRequest { text });
        let response = self.send(Operation::Other, request_id, builder).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let data = response
            .bytes()
            .await
            .map_err(|e| classify::from_transport(&e))?;
        debug!(%request_id, bytes = data.len(), "speech synthesized");
        Ok(AudioClip::new(data, content_type))
    }
}

impl std::fmt::Debug for HttpCampaignClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCampaignClient")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
