use std::time::Duration;

use base64::{engine::general_purpose, Engine};
use image::GenericImageView;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::{AnalysisProvider, ProviderError};
use crate::models::MealImage;

const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const CLOUD_TIMEOUT_SECS: u64 = 60;
const MAX_LONG_EDGE: u32 = 1024;
const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// Remote multimodal vision provider (OpenRouter-compatible chat API).
///
/// Sends the photo once with a fixed instruction and digs the JSON object
/// out of whatever free text the model wraps around it.
pub struct CloudVisionService {
    api_key: Option<String>,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

impl CloudVisionService {
    pub fn new(api_key: Option<String>, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(CLOUD_TIMEOUT_SECS))
            .build()
            .expect("failed to construct HTTP client");

        Self {
            api_key,
            model,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            client,
        }
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    fn instruction() -> String {
        "You are a nutrition analysis expert. Look at this meal photo carefully and \
         respond with a single JSON object, no other text, using exactly these keys:\n\
         {\n\
           \"name\": string - short descriptive meal name,\n\
           \"score\": integer 0-100 - overall healthiness,\n\
           \"carbs\": number - grams of carbohydrates,\n\
           \"protein\": number - grams of protein,\n\
           \"fats\": number - grams of fat,\n\
           \"calories\": integer - estimated kcal for the visible portion,\n\
           \"hydration\": integer 0-100 - how hydrating the meal is,\n\
           \"advice\": string - 1-2 sentences of guidance,\n\
           \"ingredients\": array of strings,\n\
           \"strengths\": array of strings - what is good about this meal,\n\
           \"improvements\": array of strings - what could be better\n\
         }"
            .to_string()
    }

    /// Shrink the photo before upload: long edge capped, re-encoded as JPEG.
    /// Bytes that do not decode as an image are passed through unchanged and
    /// left for the provider to judge.
    fn prepare_image(bytes: &[u8]) -> Vec<u8> {
        let img = match image::load_from_memory(bytes) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("⚠️ Could not decode image for resizing ({}), sending as-is", e);
                return bytes.to_vec();
            }
        };

        let (width, height) = img.dimensions();
        let img = if width.max(height) > MAX_LONG_EDGE {
            log::debug!("🖼️ Resizing image from {}x{} to fit {} px", width, height, MAX_LONG_EDGE);
            img.resize(MAX_LONG_EDGE, MAX_LONG_EDGE, image::imageops::FilterType::Triangle)
        } else {
            img
        };

        let rgb = img.to_rgb8();
        let mut out = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
        match encoder.encode_image(&rgb) {
            Ok(()) => out,
            Err(e) => {
                log::warn!("⚠️ JPEG re-encode failed ({}), sending original bytes", e);
                bytes.to_vec()
            }
        }
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for CloudVisionService {
    fn name(&self) -> &str {
        "cloud"
    }

    async fn attempt(&self, image: &MealImage) -> Result<Value, ProviderError> {
        // Fail fast with zero network cost when no credential is configured.
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                log::warn!("🔑 Cloud provider skipped: no API key configured");
                return Err(ProviderError::ConfigurationMissing);
            }
        };

        let prepared = Self::prepare_image(&image.bytes);
        let base64_image = general_purpose::STANDARD.encode(&prepared);
        log::debug!(
            "📊 Image prepared for upload: {} bytes raw, {} bytes base64",
            prepared.len(),
            base64_image.len()
        );

        let data_url = format!("data:image/jpeg;base64,{}", base64_image);

        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    content_type: "text".to_string(),
                    text: Self::instruction(),
                },
                ContentPart::ImageUrl {
                    content_type: "image_url".to_string(),
                    image_url: ImageData { url: data_url },
                },
            ],
        }];

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: 1000,
        };

        log::info!("🤖 Sending meal photo to cloud model: {}", self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://github.com/meal-photo-analyzer")
            .header("X-Title", "Meal Photo Analyzer")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        log::debug!("📥 Cloud response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Cloud API error ({}): {}", status, error_text);
            return Err(ProviderError::Transport(format!("{}: {}", status, error_text)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::UnparseableResponse(e.to_string()))?;

        let content = chat_response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| {
                ProviderError::UnparseableResponse("response contained no choices".to_string())
            })?;

        log::info!("💬 Cloud model replied with {} chars", content.len());
        log::debug!("📄 Raw cloud reply: {}", content);

        let json_text = extract_json_object(content).ok_or_else(|| {
            ProviderError::UnparseableResponse("no JSON object found in response text".to_string())
        })?;

        let payload: Value = serde_json::from_str(json_text)
            .map_err(|e| ProviderError::UnparseableResponse(e.to_string()))?;

        if !payload.is_object() {
            return Err(ProviderError::UnparseableResponse(
                "extracted JSON is not an object".to_string(),
            ));
        }

        Ok(payload)
    }
}

/// Find the first balanced `{...}` substring in free text.
///
/// Models wrap the JSON in prose, markdown fences or both, so a plain
/// find/rfind pair is not enough. This walks candidate `{` positions and
/// tracks brace depth, skipping braces inside string literals.
fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();

    for (start, _) in text.char_indices().filter(|(_, c)| *c == '{') {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, byte) in bytes[start..].iter().enumerate() {
            match byte {
                _ if escaped => escaped = false,
                b'\\' if in_string => escaped = true,
                b'"' => in_string = !in_string,
                b'{' if !in_string => depth += 1,
                b'}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=start + offset]);
                    }
                }
                _ => {}
            }
        }
    }

    None
}
