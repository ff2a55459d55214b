use std::io::Cursor;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;
use serde_json::json;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::models::label::LabelData;
use crate::models::verification::{ImageInfo, VerificationResult};
use crate::services::ocr::OcrError;
use crate::services::verification::{self, VerifyError};

/// Maximum accepted image upload size (5 MB).
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field: {0}")]
    InvalidField(&'static str),

    #[error("Invalid file type. Only JPEG and PNG images are allowed.")]
    UnsupportedImageType,

    #[error("File size exceeds maximum limit of 5MB")]
    ImageTooLarge,

    #[error("{0}")]
    BadRequest(String),

    #[error("OCR service error: {0}")]
    Ocr(#[from] OcrError),

    #[error("An unexpected error occurred while processing the image")]
    Internal,
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            // Empty OCR text is a caller-visible input condition.
            VerifyError::NoTextDetected => ApiError::BadRequest(err.to_string()),
            // Anything else from the engine is a defect on our side.
            VerifyError::Pattern(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingField(_)
            | ApiError::InvalidField(_)
            | ApiError::ImageTooLarge
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedImageType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Ocr(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// POST /api/verify — verify claimed label fields against an uploaded image.
///
/// Multipart form: `image` (JPEG/PNG file), `brand_name`, `product_type`,
/// `alcohol_content`, optional `net_contents`, optional booleans
/// `fuzzy_match` and `check_government_warning`.
pub async fn verify_label_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VerificationResult>, ApiError> {
    let mut image_data: Option<Vec<u8>> = None;
    let mut brand_name: Option<String> = None;
    let mut product_type: Option<String> = None;
    let mut alcohol_content: Option<f64> = None;
    let mut net_contents: Option<String> = None;
    let mut fuzzy_match = false;
    let mut check_government_warning = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?
    {
        match field.name() {
            Some("image") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read image upload".to_string()))?;
                image_data = Some(data.to_vec());
            }
            Some("brand_name") => brand_name = Some(text_field(field, "brand_name").await?),
            Some("product_type") => product_type = Some(text_field(field, "product_type").await?),
            Some("alcohol_content") => {
                let raw = text_field(field, "alcohol_content").await?;
                alcohol_content = Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| ApiError::InvalidField("alcohol_content"))?,
                );
            }
            Some("net_contents") => net_contents = Some(text_field(field, "net_contents").await?),
            Some("fuzzy_match") => fuzzy_match = bool_field(field, "fuzzy_match").await?,
            Some("check_government_warning") => {
                check_government_warning = bool_field(field, "check_government_warning").await?;
            }
            _ => {}
        }
    }

    let image_data = image_data.ok_or(ApiError::MissingField("image"))?;
    if image_data.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::ImageTooLarge);
    }

    let format = image::guess_format(&image_data).map_err(|_| ApiError::UnsupportedImageType)?;
    if !matches!(format, image::ImageFormat::Jpeg | image::ImageFormat::Png) {
        return Err(ApiError::UnsupportedImageType);
    }
    let (width, height) = image::ImageReader::with_format(Cursor::new(&image_data[..]), format)
        .into_dimensions()
        .map_err(|_| ApiError::UnsupportedImageType)?;

    let label = LabelData {
        brand_name: brand_name.ok_or(ApiError::MissingField("brand_name"))?,
        product_type: product_type.ok_or(ApiError::MissingField("product_type"))?,
        alcohol_content: alcohol_content.ok_or(ApiError::MissingField("alcohol_content"))?,
        net_contents,
    };
    label
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    metrics::counter!("verification_requests_total").increment(1);
    let start = std::time::Instant::now();

    let ocr_text = state.ocr.extract_text(&image_data).await.map_err(|e| {
        warn!(error = %e, "OCR extraction failed");
        e
    })?;
    info!(
        image_bytes = image_data.len(),
        ocr_chars = ocr_text.len(),
        "label image transcribed"
    );

    let mut result =
        verification::verify_label(&label, &ocr_text, fuzzy_match, check_government_warning)?;
    result.image_info = Some(ImageInfo {
        width,
        height,
        format: format!("{format:?}").to_lowercase(),
        size_bytes: image_data.len(),
    });

    metrics::histogram!("verification_processing_seconds").record(start.elapsed().as_secs_f64());
    if !result.success {
        metrics::counter!("verification_mismatches_total").increment(1);
    }

    Ok(Json(result))
}

async fn text_field(field: Field<'_>, name: &'static str) -> Result<String, ApiError> {
    field.text().await.map_err(|_| ApiError::InvalidField(name))
}

async fn bool_field(field: Field<'_>, name: &'static str) -> Result<bool, ApiError> {
    let raw = text_field(field, name).await?;
    match raw.trim() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" | "" => Ok(false),
        _ => Err(ApiError::InvalidField(name)),
    }
}
