use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;

use crate::error::GalleryError;

const SYSTEM_PROMPT: &str = r#"
You are an expert planetary geologist and remote-sensing analyst.
The user is looking at a region of an orbital satellite image in a zoomable viewer
and has captured the visible area. Answer the user's question about that image.

Guidelines:
- Describe only what is visible in the supplied image; say so when something is ambiguous.
- Mention landforms, textures, shadows and scale cues when they are relevant.
- Keep the answer concise (a few short paragraphs at most) and in plain text.
"#;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Forwards a captured image region and a question to the Gemini API.
#[derive(Debug, Clone)]
pub struct VisualQueryGateway {
    config: GeminiConfig,
    client: reqwest::Client,
}

/// Decoded image payload ready for an `inline_data` part.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize, Debug)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Deserialize, Debug)]
struct GeminiPart {
    text: Option<String>,
}

impl VisualQueryGateway {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn ask(&self, question: &str, image: &ImagePayload) -> Result<String, GalleryError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let request_body = serde_json::json!({
            "system_instruction": {
                "parts": [{ "text": SYSTEM_PROMPT }]
            },
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": question },
                    {
                        "inline_data": {
                            "mime_type": image.mime_type,
                            "data": BASE64.encode(&image.bytes)
                        }
                    }
                ]
            }]
        });

        tracing::info!(
            "sending visual query model={} image_bytes={} mime={}",
            self.config.model,
            image.bytes.len(),
            image.mime_type
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GalleryError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GalleryError::Upstream(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(GalleryError::Upstream(format!(
                "status {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| GalleryError::Upstream(format!("unparseable response: {}", e)))?;

        extract_answer(parsed)
            .ok_or_else(|| GalleryError::Upstream("response contained no text".to_string()))
    }
}

fn extract_answer(response: GeminiResponse) -> Option<String> {
    let parts = response
        .candidates?
        .into_iter()
        .next()?
        .content?
        .parts?;

    let answer: String = parts.into_iter().filter_map(|p| p.text).collect();
    if answer.trim().is_empty() {
        None
    } else {
        Some(answer)
    }
}

/// Decodes base64 image data, with or without a `data:<mime>;base64,`
/// header.
pub fn decode_image(raw: &str) -> Result<ImagePayload, GalleryError> {
    let raw = raw.trim();
    let (declared_mime, data) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, data) = rest.split_once(',').ok_or_else(|| {
                GalleryError::InvalidInput("Malformed data URI in image".to_string())
            })?;
            let mime = header.split(';').next().unwrap_or("").trim();
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            (mime, data)
        }
        None => (None, raw),
    };

    let bytes = BASE64
        .decode(data.trim())
        .map_err(|e| GalleryError::InvalidInput(format!("Image is not valid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(GalleryError::InvalidInput("Image is empty".to_string()));
    }

    let mime_type = declared_mime.unwrap_or_else(|| sniff_mime(&bytes).to_string());
    Ok(ImagePayload { bytes, mime_type })
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/png"
    }
}
