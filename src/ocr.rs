use std::io::Cursor;
use std::process::Stdio;

use async_trait::async_trait;
use base64::Engine;
use image::ImageFormat;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::config::{AppConfig, OcrEngine};

pub const DEMO_KEY: &str = "DEMO_KEY";

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("could not decode thumbnail: {0}")] Decode(String),
    #[error("HTTP error: {0}")] Http(String),
    #[error("tesseract failed: {0}")] Process(String),
    #[error("Other: {0}")] Other(String),
}

/// External image-to-text capability. Receives PNG bytes.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &'static str;
    async fn recognize(&self, png: &[u8]) -> Result<String, OcrError>;
}

pub fn recognizer_from_config(config: &AppConfig) -> Box<dyn TextRecognizer> {
    match config.ocr_engine {
        OcrEngine::Gemini => Box::new(GeminiOcr::new(config.gemini_api_key.clone(), config.gemini_api_base.clone())),
        OcrEngine::Tesseract => Box::new(TesseractOcr::new(config.tesseract_bin.clone())),
        OcrEngine::Disabled => Box::new(DisabledOcr),
    }
}

/// Decodes an uploaded png/jpeg and re-encodes it as PNG so every engine sees
/// one format. The decoded buffer is dropped before returning.
pub fn normalize_thumbnail(bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| OcrError::Decode(e.to_string()))?;
    info!("🖼️ Thumbnail decoded: {}x{}", decoded.width(), decoded.height());
    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| OcrError::Decode(e.to_string()))?;
    Ok(png)
}

/// Runs OCR over an uploaded thumbnail. Any failure becomes empty text plus
/// a warning so the generation pass can continue without it.
pub async fn thumbnail_text(recognizer: &dyn TextRecognizer, bytes: &[u8]) -> (String, Option<String>) {
    let png = match normalize_thumbnail(bytes) {
        Ok(png) => png,
        Err(e) => {
            error!("❌ Thumbnail rejected: {}", e);
            return (String::new(), Some(format!("Thumbnail ignored: {e}")));
        }
    };
    match recognizer.recognize(&png).await {
        Ok(text) => {
            let text = text.trim().to_string();
            info!("✅ {} OCR extracted {} chars", recognizer.name(), text.len());
            (text, None)
        }
        Err(e) => {
            error!("❌ {} OCR failed: {}", recognizer.name(), e);
            (String::new(), Some(format!("Thumbnail text unavailable: {e}")))
        }
    }
}

pub struct DisabledOcr;

#[async_trait]
impl TextRecognizer for DisabledOcr {
    fn name(&self) -> &'static str { "disabled" }

    async fn recognize(&self, _png: &[u8]) -> Result<String, OcrError> {
        info!("OCR disabled - skipping thumbnail text");
        Ok(String::new())
    }
}

/// Shells out to `tesseract stdin stdout`.
pub struct TesseractOcr {
    bin: String,
}

impl TesseractOcr {
    pub fn new(bin: String) -> Self { Self { bin } }
}

#[async_trait]
impl TextRecognizer for TesseractOcr {
    fn name(&self) -> &'static str { "tesseract" }

    async fn recognize(&self, png: &[u8]) -> Result<String, OcrError> {
        let mut child = Command::new(&self.bin)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OcrError::Process(format!("{}: {}", self.bin, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(png).await.map_err(|e| OcrError::Process(e.to_string()))?;
        }

        let output = child.wait_with_output().await.map_err(|e| OcrError::Process(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Process(format!("status={} stderr={}", output.status, stderr.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Gemini vision transcription through the `generateContent` REST call.
pub struct GeminiOcr {
    client: Client,
    api_key: String,
    base_url: String,
}

const TRANSCRIBE_PROMPT: &str = "Transcribe every piece of legible text printed on this product thumbnail. \
    Return plain text only, one line per text block, with no commentary.";

impl GeminiOcr {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self { client: Client::new(), api_key, base_url }
    }

    fn request_body(png: &[u8]) -> serde_json::Value {
        json!({
            "contents": [{
                "parts": [
                    {"text": TRANSCRIBE_PROMPT},
                    {"inlineData": {
                        "mimeType": "image/png",
                        "data": base64::engine::general_purpose::STANDARD.encode(png)
                    }}
                ]
            }],
            "generationConfig": {
                "temperature": 0.0,
                "maxOutputTokens": 512
            }
        })
    }
}

#[async_trait]
impl TextRecognizer for GeminiOcr {
    fn name(&self) -> &'static str { "gemini" }

    async fn recognize(&self, png: &[u8]) -> Result<String, OcrError> {
        if self.api_key == DEMO_KEY {
            info!("Using demo mode - no thumbnail text extracted");
            return Ok(String::new());
        }

        let url = format!("{}/models/gemini-1.5-flash:generateContent?key={}", self.base_url, self.api_key);
        info!("🔗 Making OCR request to: {}", url.replace(&self.api_key, "***"));

        let response = self.client
            .post(&url)
            .json(&Self::request_body(png))
            .send()
            .await
            .map_err(|e| OcrError::Http(e.to_string()))?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| OcrError::Http(e.to_string()))?;
        if !status.is_success() {
            error!("❌ Gemini OCR failed with status {}: {}", status, response_text);
            return Err(OcrError::Http(format!("HTTP {}: {}", status, response_text)));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| OcrError::Other(format!("Failed to parse response: {}", e)))?;
        extract_text(&parsed).ok_or_else(|| {
            warn!("⚠️ No text part in Gemini OCR response");
            OcrError::Other("No text content found in response".to_string())
        })
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    #[allow(dead_code)]
    Other(serde_json::Value),
}

fn extract_text(resp: &GeminiResponse) -> Option<String> {
    let texts: Vec<&str> = resp
        .candidates
        .iter()
        .flat_map(|c| &c.content.parts)
        .filter_map(|p| match p {
            Part::Text { text } => Some(text.trim()),
            Part::Other(_) => None,
        })
        .collect();
    if texts.is_empty() { None } else { Some(texts.join("\n")) }
}
