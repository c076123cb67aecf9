use crate::config::Config;
use crate::engine::OcrEngine;
use crate::engines::TesseractEngine;
use crate::error::OcrError;
use crate::guidance::generate_guidance;
use crate::preprocessing::{DenoiseMethod, Pipeline, PreprocessConfig, StepTiming};
use crate::recognition::{default_segmentation_modes, recognize_text};
use crate::translate::{GoogleTranslator, Translator};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn OcrEngine>,
    pub translator: Arc<dyn Translator>,
    pub config: Arc<Config>,
}

/// Signboard interpretation response
#[derive(Serialize)]
pub struct InterpretResponse {
    pub text: String,
    pub translated_text: Option<String>,
    pub guidance: String,
    pub engine: String,
    pub preprocessing: Vec<StepTiming>,
    pub processing_time_ms: u64,
    pub warnings: Vec<String>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub engine_description: String,
    pub ocr_language: String,
    pub segmentation_modes: Vec<String>,
    pub supported_formats: Vec<String>,
    pub max_file_size_bytes: usize,
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let engine = TesseractEngine::new(&config)?;
    let addr = format!("{}:{}", config.host, config.port);
    let max_file_size = config.max_file_size;

    let state = AppState {
        engine: Arc::new(engine),
        translator: Arc::new(GoogleTranslator::new()),
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/interpret", post(handle_interpret))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle signboard interpretation requests
async fn handle_interpret(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<InterpretResponse>, OcrError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut content_type: Option<String> = None;
    let mut target_lang: Option<String> = None;
    let mut denoise: Option<String> = None;
    let mut sharpen: Option<String> = None;
    let mut binarize: Option<String> = None;
    let mut upscale: Option<String> = None;
    let mut contrast: Option<String> = None;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        let read_text = |name: &str| {
            OcrError::InvalidRequest(format!("Invalid value for field '{}'", name))
        };

        match name.as_str() {
            "file" => {
                content_type = field.content_type().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    OcrError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            "lang" => target_lang = Some(field.text().await.map_err(|_| read_text("lang"))?),
            "denoise" => denoise = Some(field.text().await.map_err(|_| read_text("denoise"))?),
            "sharpen" => sharpen = Some(field.text().await.map_err(|_| read_text("sharpen"))?),
            "binarize" => binarize = Some(field.text().await.map_err(|_| read_text("binarize"))?),
            "upscale" => upscale = Some(field.text().await.map_err(|_| read_text("upscale"))?),
            "contrast" => contrast = Some(field.text().await.map_err(|_| read_text("contrast"))?),
            _ => {
                // Ignore unknown fields
            }
        }
    }

    // Validate file was provided
    let data = file_data.ok_or(OcrError::MissingFile)?;

    // Check file size
    if data.len() > state.config.max_file_size {
        return Err(OcrError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    if let Some(mime) = &content_type {
        if !mime.starts_with("image/") {
            tracing::warn!("Received file with content type: {}", mime);
        }
    }

    let preprocess_config = build_preprocess_config(
        denoise.as_deref(),
        sharpen.as_deref(),
        binarize.as_deref(),
        upscale.as_deref(),
        contrast.as_deref(),
    )?;

    // Decode the upload into the in-memory pixel grid
    let original = image::load_from_memory(&data)
        .map_err(|e| OcrError::ImageDecode(e.to_string()))?;

    let preprocessed = Pipeline::new(preprocess_config)?.process(original)?;

    // Try segmentation modes in priority order; empty text is a valid result
    let text = recognize_text(
        state.engine.as_ref(),
        &preprocessed.image,
        &default_segmentation_modes(),
    )?;

    let mut warnings = Vec::new();

    // Translation degrades gracefully: on failure, keep the recognized text
    let translated_text = match (&target_lang, text.is_empty()) {
        (Some(lang), false) => match state.translator.translate(&text, lang) {
            Ok(translated) => Some(translated),
            Err(e) => {
                tracing::warn!("Translation to '{}' failed: {}", lang, e);
                warnings.push(format!("Translation failed: {}", e));
                Some(text.clone())
            }
        },
        _ => None,
    };

    let guidance = generate_guidance(&text);

    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        "Interpretation completed in {}ms (preprocess: {}ms, text length: {})",
        processing_time_ms,
        preprocessed.total_time_ms,
        text.len()
    );

    Ok(Json(InterpretResponse {
        text,
        translated_text,
        guidance,
        engine: state.engine.name().to_string(),
        preprocessing: preprocessed.steps,
        processing_time_ms,
        warnings,
    }))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.engine.name().to_string(),
        engine_description: state.engine.description().to_string(),
        ocr_language: state.config.language.clone(),
        segmentation_modes: default_segmentation_modes(),
        supported_formats: state.engine.supported_formats(),
        max_file_size_bytes: state.config.max_file_size,
    })
}

/// Build a preprocessing configuration from optional form fields; fields left
/// out keep their defaults.
fn build_preprocess_config(
    denoise: Option<&str>,
    sharpen: Option<&str>,
    binarize: Option<&str>,
    upscale: Option<&str>,
    contrast: Option<&str>,
) -> Result<PreprocessConfig, OcrError> {
    let mut config = PreprocessConfig::default();

    if let Some(value) = denoise {
        config.denoise = DenoiseMethod::from_str(value).ok_or_else(|| {
            OcrError::InvalidConfig(format!("unknown denoise method: {}", value))
        })?;
    }
    if let Some(value) = sharpen {
        config.sharpen = parse_bool("sharpen", value)?;
    }
    if let Some(value) = binarize {
        config.binarize = parse_bool("binarize", value)?;
    }
    if let Some(value) = upscale {
        config.upscale_factor = value.trim().parse().map_err(|_| {
            OcrError::InvalidConfig(format!("invalid upscale factor: {}", value))
        })?;
    }
    if let Some(value) = contrast {
        config.contrast_factor = value.trim().parse().map_err(|_| {
            OcrError::InvalidConfig(format!("invalid contrast factor: {}", value))
        })?;
    }

    Ok(config)
}

fn parse_bool(name: &str, value: &str) -> Result<bool, OcrError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(OcrError::InvalidConfig(format!(
            "invalid boolean for {}: {}",
            name, value
        ))),
    }
}
