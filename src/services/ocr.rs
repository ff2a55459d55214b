use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

/// Client for the external OCR pipeline (Cloudflare Workers AI LLaVA).
///
/// The verification engine treats OCR as a black box that turns a label
/// image into a single text blob; everything image-related stays behind
/// this client.
pub struct OcrClient {
    http: Client,
    account_id: String,
    api_token: String,
}

#[derive(Deserialize)]
struct OcrResponse {
    result: OcrResult,
}

#[derive(Deserialize)]
struct OcrResult {
    description: String,
}

impl OcrClient {
    pub fn new(account_id: &str, api_token: &str) -> Self {
        Self {
            http: Client::new(),
            account_id: account_id.to_string(),
            api_token: api_token.to_string(),
        }
    }

    /// Send a label image and get back the raw transcribed text.
    ///
    /// The text may contain line-wrap artifacts, repeated spaces, and
    /// per-glyph misreads; the engine's normalizer handles those. An empty
    /// transcription is passed through as-is — the engine rejects it.
    pub async fn extract_text(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        let url = format!(
            "https://api.cloudflare.com/client/v4/accounts/{}/ai/run/@cf/llava-hf/llava-1.5-7b-hf",
            self.account_id
        );

        let prompt = concat!(
            "Transcribe every piece of text visible on this beverage label image. ",
            "Preserve numbers, percent signs, and punctuation exactly as printed. ",
            "Return only the transcribed text."
        );

        let request_body = serde_json::json!({
            "image": base64::engine::general_purpose::STANDARD.encode(image_bytes),
            "prompt": prompt,
            "max_tokens": 512
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&request_body)
            .send()
            .await
            .map_err(OcrError::Http)?;

        if !response.status().is_success() {
            return Err(OcrError::Api(response.status().as_u16()));
        }

        let body: OcrResponse = response.json().await.map_err(OcrError::Http)?;
        Ok(body.result.description)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OCR service returned status {0}")]
    Api(u16),
}
