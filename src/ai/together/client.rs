use crate::models::{ChatCompletionRequest, ChatCompletionResponse};
use crate::{Error, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Authenticated JSON transport shared by the chat and image clients.
pub struct TogetherHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl TogetherHttpClient {
    pub fn new_with_client(api_key: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Together: {}", e);
                e
            })?;

        let response = Self::check_status(response).await?;

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Together response: {}\nBody: {}", e, body);
            Error::MalformedResponse(format!("Failed to parse Together response: {}", e))
        })
    }

    /// Plain unauthenticated GET, used for hosted image URLs.
    ///
    /// The API key is never sent here, so a rejected download is reported as
    /// an unavailable URL rather than as an authentication failure.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Failed to download {}: {}", url, e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Image download failed (status {}): {}", status, error_text);
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("image URL unavailable: {}", error_text),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.post("/v1/chat/completions", &request).await
    }

    async fn check_status(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await?;
        tracing::error!("Together API error (status {}): {}", status, error_text);
        Err(Error::from_status(status, error_text))
    }
}
