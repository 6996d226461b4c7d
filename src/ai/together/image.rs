use super::client::TogetherHttpClient;
use crate::ai::mime::detect_image_mime;
use crate::ai::ImageGenerationService;
use crate::models::{ImageGenerationRequest, ImageGenerationResponse, DEFAULT_IMAGE_STEPS};
use crate::{Error, Result};
use async_trait::async_trait;

pub struct TogetherImageClient {
    http: TogetherHttpClient,
    model: String,
    steps: u32,
}

impl TogetherImageClient {
    pub fn new_with_client(
        api_key: String,
        model: String,
        base_url: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: TogetherHttpClient::new_with_client(api_key, base_url, client),
            model,
            steps: DEFAULT_IMAGE_STEPS,
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }
}

#[async_trait]
impl ImageGenerationService for TogetherImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        tracing::debug!(
            "Sending image generation request to {} ({} steps)",
            self.model,
            self.steps
        );

        let request = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            steps: self.steps,
            n: 1,
        };

        let response: ImageGenerationResponse =
            self.http.post("/v1/images/generations", &request).await?;

        let image_data = response.data.first().ok_or_else(|| {
            Error::MalformedResponse("No image data in Together response".to_string())
        })?;

        let image_bytes = if let Some(url) = &image_data.url {
            tracing::info!("Downloading generated image from {}", url);
            self.http.download(url).await?
        } else if let Some(b64_json) = &image_data.b64_json {
            use base64::Engine as _;
            base64::engine::general_purpose::STANDARD
                .decode(b64_json)
                .map_err(|e| {
                    Error::MalformedResponse(format!("Failed to decode base64 image: {}", e))
                })?
        } else {
            return Err(Error::MalformedResponse(
                "No image data (neither URL nor base64) in response".to_string(),
            ));
        };

        let mime = detect_image_mime(&image_bytes).ok_or_else(|| {
            Error::MalformedResponse(format!(
                "Downloaded body ({} bytes) is not an image",
                image_bytes.len()
            ))
        })?;
        tracing::debug!("Received {} bytes of {}", image_bytes.len(), mime);

        Ok(image_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 128, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn client_for(server: &MockServer) -> TogetherImageClient {
        TogetherImageClient::new_with_client(
            "key".to_string(),
            "black-forest-labs/FLUX.1-schnell-Free".to_string(),
            server.uri(),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn test_generate_image_downloads_url() {
        let server = MockServer::start().await;
        let png = png_bytes();

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(body_partial_json(serde_json::json!({
                "model": "black-forest-labs/FLUX.1-schnell-Free",
                "prompt": "a cat in armor",
                "steps": 2,
                "n": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "url": format!("{}/files/cat.png", server.uri()) }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let bytes = client_for(&server)
            .generate_image("a cat in armor")
            .await
            .unwrap();
        assert_eq!(bytes, png);
    }

    #[tokio::test]
    async fn test_generate_image_handles_b64_response() {
        let server = MockServer::start().await;

        use base64::Engine as _;
        let png = png_bytes();
        let b64 = base64::engine::general_purpose::STANDARD.encode(&png);

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "b64_json": b64 }]
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).generate_image("a dream").await.unwrap();
        assert_eq!(result, png);
    }

    #[tokio::test]
    async fn test_invalid_b64_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "b64_json": "not base64 at all!" }]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_configured_steps_are_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(body_partial_json(serde_json::json!({ "steps": 4 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "url": format!("{}/files/a.png", server.uri()) }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
            .mount(&server)
            .await;

        client_for(&server)
            .with_steps(4)
            .generate_image("x")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_data_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_non_image_download_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "url": format!("{}/files/gone.png", server.uri()) }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/gone.png"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>expired</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_expired_download_url_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "url": format!("{}/files/expired.png", server.uri()) }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/expired.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("x").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_forbidden_download_is_not_an_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{ "url": format!("{}/files/signed.png", server.uri()) }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/files/signed.png"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                "<Error><Code>AccessDenied</Code><Message>Request has expired</Message></Error>",
            ))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(matches!(
            err,
            Error::Api { status: 403, ref message } if message.contains("image URL unavailable")
        ));
    }

    #[tokio::test]
    async fn test_rate_limit_is_quota_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate_image("x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Quota);
    }
}
