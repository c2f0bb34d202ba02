use std::env;
use std::str::FromStr;

use crate::ocr::DEMO_KEY;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrEngine {
    Gemini,
    Tesseract,
    Disabled,
}

impl FromStr for OcrEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(OcrEngine::Gemini),
            "tesseract" => Ok(OcrEngine::Tesseract),
            "none" | "off" | "disabled" => Ok(OcrEngine::Disabled),
            other => Err(format!("unknown OCR engine '{other}' (expected gemini, tesseract or none)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub ocr_engine: OcrEngine,
    pub tesseract_bin: String,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            gemini_api_key: DEMO_KEY.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            ocr_engine: OcrEngine::Gemini,
            tesseract_bin: "tesseract".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unparsable values fall back to
    /// their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parsed = |key: &str, fallback: usize| -> usize {
            match lookup(key).map(|v| v.trim().parse::<usize>()) {
                Some(Ok(v)) => v,
                Some(Err(e)) => {
                    tracing::warn!("Ignoring {}: {}", key, e);
                    fallback
                }
                None => fallback,
            }
        };

        let port = u16::try_from(parsed("PORT", defaults.port as usize)).unwrap_or(defaults.port);
        let ocr_engine = match lookup("OCR_ENGINE").map(|v| v.parse::<OcrEngine>()) {
            Some(Ok(engine)) => engine,
            Some(Err(e)) => {
                tracing::warn!("Ignoring OCR_ENGINE: {}", e);
                defaults.ocr_engine
            }
            None => defaults.ocr_engine,
        };

        Self {
            port,
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|v| !v.is_empty()).unwrap_or(defaults.gemini_api_key),
            gemini_api_base: lookup("GEMINI_API_BASE").filter(|v| !v.is_empty()).unwrap_or(defaults.gemini_api_base),
            ocr_engine,
            tesseract_bin: lookup("TESSERACT_BIN").filter(|v| !v.is_empty()).unwrap_or(defaults.tesseract_bin),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }
}
