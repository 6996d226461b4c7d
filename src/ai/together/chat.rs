use super::client::TogetherHttpClient;
use crate::ai::CompletionService;
use crate::models::{ChatCompletionRequest, ChatMessage};
use crate::{Error, Result};
use async_trait::async_trait;

pub struct TogetherChatClient {
    http: TogetherHttpClient,
    model: String,
}

impl TogetherChatClient {
    pub fn new_with_client(
        api_key: String,
        model: String,
        base_url: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: TogetherHttpClient::new_with_client(api_key, base_url, client),
            model,
        }
    }
}

#[async_trait]
impl CompletionService for TogetherChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!(
            "Sending chat completion request ({} chars) to {}",
            prompt.len(),
            self.model
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
        };

        let response = self.http.chat_completion(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                Error::MalformedResponse("No response from Together chat API".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TogetherChatClient {
        TogetherChatClient::new_with_client(
            "test-key".to_string(),
            "meta-llama/Meta-Llama-3-8B-Instruct-Lite".to_string(),
            server.uri(),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_complete_sends_single_user_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_json(serde_json::json!({
                "model": "meta-llama/Meta-Llama-3-8B-Instruct-Lite",
                "messages": [{ "role": "user", "content": "describe a cat" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "  A cat, mid-lick.\n" },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).complete("describe a cat").await.unwrap();
        assert_eq!(text, "  A cat, mid-lick.\n");
    }

    #[tokio::test]
    async fn test_empty_choices_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).complete("hi").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_unparsable_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("hi").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_status_codes_are_classified() {
        for (status, kind) in [
            (401, ErrorKind::Authentication),
            (429, ErrorKind::Quota),
            (500, ErrorKind::Api),
        ] {
            let server = MockServer::start().await;

            Mock::given(method("POST"))
                .and(path("/v1/chat/completions"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;

            let err = client_for(&server).complete("hi").await.unwrap_err();
            assert_eq!(err.kind(), kind, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = TogetherChatClient::new_with_client(
            "k".to_string(),
            "m".to_string(),
            uri,
            reqwest::Client::new(),
        );

        let err = client.complete("hi").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
