use crate::config::ProviderSettings;
use crate::error::{ProviderError, Result};
use reqwest::Client;
use serde::Serialize;

/// Authenticated JSON POST client for one provider endpoint
#[derive(Debug, Clone)]
pub(crate) struct JsonEndpoint {
    client: Client,
    url: String,
    api_key: String,
}

impl JsonEndpoint {
    pub(crate) fn new(settings: &ProviderSettings, path: &str) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            url: settings.endpoint(path),
            api_key: settings.api_key.clone(),
        })
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    /// POST `body` and return the response text of a 2xx reply
    pub(crate) async fn post<B: Serialize + ?Sized>(&self, body: &B) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}
