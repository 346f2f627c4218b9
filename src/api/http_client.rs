use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::api::{ToggleApi, ToggleResponse};
use crate::app::{Result, SessionContext, UttarError};
use crate::config::ApiConfig;
use crate::domain::{TargetKey, ToggleAck};

pub struct HttpToggleApi {
    client: Client,
    base_url: Url,
    session: Arc<SessionContext>,
}

impl HttpToggleApi {
    pub fn new(config: &ApiConfig, session: Arc<SessionContext>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: Self::normalize_base(&config.base_url)?,
            session,
        })
    }

    /// Ensures relative endpoint paths join under the base path, not beside it.
    fn normalize_base(base: &str) -> Result<Url> {
        let mut url = Url::parse(base)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    pub fn endpoint(&self, key: &TargetKey) -> Result<Url> {
        Ok(self.base_url.join(&key.kind.endpoint(&key.id))?)
    }
}

#[async_trait]
impl ToggleApi for HttpToggleApi {
    async fn send(&self, key: &TargetKey) -> Result<ToggleAck> {
        let token = self.session.bearer_token()?;
        let url = self.endpoint(key)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| UttarError::Other("Session token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.session.invalidate();
            return Err(UttarError::Unauthorized(status.as_u16()));
        }

        let body = response.bytes().await?;
        if !status.is_success() {
            // Error pages are rarely JSON; use the server's message when there is one
            return match ToggleResponse::parse(&body).ok().and_then(|r| r.message) {
                Some(message) => Err(UttarError::Rejected(message)),
                None => Err(UttarError::Status(status.as_u16())),
            };
        }

        ToggleResponse::parse(&body)?.into_ack(key.kind)
    }
}
