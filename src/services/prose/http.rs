/// HTTP prose generator
///
/// POSTs the [`ProseInput`] as JSON to a configured endpoint and expects a
/// [`ProseOutput`] back. Authentication is an optional bearer token.
use crate::error::{AppError, AppResult};
use reqwest::Client as HttpClient;

use super::{ProseGenerator, ProseInput, ProseOutput};

#[derive(Clone)]
pub struct HttpProseGenerator {
    http_client: HttpClient,
    api_url: String,
    api_key: Option<String>,
}

impl HttpProseGenerator {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl ProseGenerator for HttpProseGenerator {
    async fn generate(&self, input: &ProseInput) -> AppResult<ProseOutput> {
        tracing::debug!(
            url = %self.api_url,
            tier = u8::from(input.tier.tier),
            "Requesting rotation prose"
        );

        let mut request = self.http_client.post(&self.api_url).json(input);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Prose API returned status {}: {}",
                status, body
            )));
        }

        let output: ProseOutput = response.json().await?;
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
