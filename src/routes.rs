use axum::{Json, extract::{Multipart, State}, http::{StatusCode, header}, response::{IntoResponse, Response}};
use bytes::Bytes;
use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    export::{batch_to_csv, export_filename},
    models::{GenerationBatch, GenerationRequest, InputOptions},
    ocr::{TextRecognizer, thumbnail_text},
    pipeline::generate_batch,
};

#[derive(Clone)]
pub struct AppState {
    pub recognizer: Arc<dyn TextRecognizer>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")] Validation(String),
    #[error("bad multipart upload: {0}")] Multipart(String),
    #[error("export failed: {0}")] Export(#[from] csv::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("❌ Request failed ({}): {}", status, self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn get_options() -> Json<InputOptions> {
    Json(InputOptions::default())
}

pub async fn generate(State(state): State<AppState>, Json(body): Json<GenerationRequest>) -> Result<Json<GenerationBatch>, ApiError> {
    run_generation(&state, body, None).await.map(Json)
}

/// Multipart form: a `request` field holding the JSON request and an
/// optional `thumbnail` field with png/jpeg bytes.
pub async fn generate_with_thumbnail(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<GenerationBatch>, ApiError> {
    let mut request: Option<GenerationRequest> = None;
    let mut thumbnail: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::Multipart(e.to_string()))? {
        let name = field.name().unwrap_or("unknown").to_string();
        let data = field.bytes().await.map_err(|e| ApiError::Multipart(e.to_string()))?;
        tracing::info!("📥 Received field '{}' ({} bytes)", name, data.len());
        match name.as_str() {
            "request" => {
                let parsed = serde_json::from_slice(&data).map_err(|e| ApiError::Validation(format!("invalid request JSON: {e}")))?;
                request = Some(parsed);
            }
            "thumbnail" if !data.is_empty() => thumbnail = Some(data),
            _ => tracing::warn!("Ignoring unexpected field '{}'", name),
        }
    }

    let request = request.ok_or_else(|| ApiError::Multipart("missing 'request' field".to_string()))?;
    run_generation(&state, request, thumbnail).await.map(Json)
}

pub async fn export_csv(Json(batch): Json<GenerationBatch>) -> Result<Response, ApiError> {
    let csv_bytes = batch_to_csv(&batch)?;
    let filename = export_filename(Utc::now().date_naive());
    tracing::info!("📄 Exporting {} row(s) as {}", batch.variations.len(), filename);
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];
    Ok((StatusCode::OK, headers, csv_bytes).into_response())
}

async fn run_generation(state: &AppState, request: GenerationRequest, thumbnail: Option<Bytes>) -> Result<GenerationBatch, ApiError> {
    request.validate().map_err(ApiError::Validation)?;

    let mut warnings = Vec::new();
    let ocr_text = match thumbnail {
        Some(bytes) => {
            let (text, warning) = thumbnail_text(state.recognizer.as_ref(), &bytes).await;
            warnings.extend(warning);
            Some(text)
        }
        None => None,
    };

    let mut rng = StdRng::from_entropy();
    let mut batch = generate_batch(&mut rng, &request, ocr_text.as_deref());
    warnings.append(&mut batch.warnings);
    batch.warnings = warnings;
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{DisabledOcr, OcrError};
    use async_trait::async_trait;
    use axum::{body::{Body, to_bytes}, http::Request};
    use image::{ImageBuffer, ImageFormat, Rgb};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tower::ServiceExt;

    struct FailingOcr;

    #[async_trait]
    impl TextRecognizer for FailingOcr {
        fn name(&self) -> &'static str { "failing" }

        async fn recognize(&self, _png: &[u8]) -> Result<String, OcrError> {
            Err(OcrError::Http("status=503".into()))
        }
    }

    fn app(recognizer: Arc<dyn TextRecognizer>) -> axum::Router {
        crate::app(AppState { recognizer }, 1024 * 1024)
    }

    fn request_json() -> serde_json::Value {
        json!({
            "subject": "Math",
            "grades": ["Grade 3"],
            "resource_type": "Worksheet",
            "focus": "Fractions",
            "formats": ["Printable", "Digital"],
            "standards": "CCSS",
            "tone": "neutral",
            "word_goal": 280,
            "variation_count": 3
        })
    }

    fn tiny_png() -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(2, 2, Rgb([0, 0, 0]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png).unwrap();
        out
    }

    fn multipart_body(boundary: &str, request: &serde_json::Value, thumbnail: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\nContent-Disposition: form-data; name=\"request\"\r\n\r\n{request}\r\n").as_bytes());
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Disposition: form-data; name=\"thumbnail\"; filename=\"thumb.png\"\r\nContent-Type: image/png\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(thumbnail);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn generate_returns_requested_variations() {
        let response = app(Arc::new(DisabledOcr)).oneshot(post_json("/api/generate", &request_json())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let batch: GenerationBatch = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(batch.variations.len(), 3);
        assert_eq!(batch.topics.len(), 1);
        assert!(batch.warnings.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_word_goal_is_rejected() {
        let mut body = request_json();
        body["word_goal"] = json!(5000);
        let response = app(Arc::new(DisabledOcr)).oneshot(post_json("/api/generate", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["error"].as_str().unwrap().contains("word_goal"));
    }

    #[tokio::test]
    async fn ocr_failure_is_a_warning_not_an_error() {
        let boundary = "X-BOUNDARY";
        let request = Request::post("/api/generate/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(multipart_body(boundary, &request_json(), &tiny_png())))
            .unwrap();
        let response = app(Arc::new(FailingOcr)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let batch: GenerationBatch = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(batch.variations.len(), 3);
        assert_eq!(batch.thumbnail_text, None);
        assert_eq!(batch.warnings.len(), 1);
        assert!(batch.warnings[0].contains("503"));
    }

    #[tokio::test]
    async fn upload_without_request_field_is_bad_request() {
        let boundary = "X-BOUNDARY";
        let body = format!("--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{boundary}--\r\n");
        let request = Request::post("/api/generate/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let response = app(Arc::new(DisabledOcr)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_returns_dated_csv_attachment() {
        let router = app(Arc::new(DisabledOcr));
        let generated = router.clone().oneshot(post_json("/api/generate", &request_json())).await.unwrap();
        let batch = body_json(generated).await;

        let response = router.oneshot(post_json("/api/export", &batch)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert_eq!(disposition, format!("attachment; filename=\"{}\"", export_filename(Utc::now().date_naive())));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_ref());
        assert_eq!(reader.headers().unwrap().get(0), Some("title"));
        assert_eq!(reader.records().count(), 3);
    }

    #[tokio::test]
    async fn options_list_enumerations() {
        let response = app(Arc::new(DisabledOcr))
            .oneshot(Request::get("/api/options").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let options = body_json(response).await;
        assert_eq!(options["tones"], json!(["neutral", "professional", "enthusiastic"]));
        assert_eq!(options["word_goal"], json!([120, 600]));
        assert!(options["grades"].as_array().unwrap().contains(&json!("Grade 3")));
    }
}
