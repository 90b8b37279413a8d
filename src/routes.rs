use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Multipart, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::json;
use tracing::{info, warn};

use crate::archive::build_zip;
use crate::config::Config;
use crate::content::screen_file_set;
use crate::error::ApiError;
use crate::models::{split_pages, DesignHints, GenerateRequest, HealthResponse};
use crate::ollama::OllamaClient;
use crate::parse::parse_file_set;
use crate::prompt::{build_site_prompt, pages_for, SYSTEM_PROMPT};
use crate::ratelimit::RateLimiter;
use crate::theme::Theme;
use crate::vision;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ollama: Arc<OllamaClient>,
    pub limiter: Arc<RateLimiter>,
}

#[derive(Default)]
struct RawForm {
    company_name: String,
    description: String,
    theme_hint: Option<String>,
    pages: Option<String>,
    require_dark_mode: bool,
    images: Vec<Bytes>,
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "on" | "yes")
}

async fn read_form(multipart: &mut Multipart) -> Result<RawForm, ApiError> {
    let mut form = RawForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "company_name" => form.company_name = read_text(field).await?,
            "description" => form.description = read_text(field).await?,
            "theme_hint" => form.theme_hint = Some(read_text(field).await?),
            "pages" => form.pages = Some(read_text(field).await?),
            "require_dark_mode" => form.require_dark_mode = parse_bool(&read_text(field).await?),
            "images" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("Failed to read image: {e}")))?;
                form.images.push(data);
            }
            other => {
                warn!("Ignoring unknown form field: {other}");
            }
        }
    }
    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read form field: {e}")))
}

fn check_api_key(config: &Config, headers: &HeaderMap) -> Result<(), ApiError> {
    if config.api_keys.is_empty() {
        return Ok(());
    }
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(key) if config.api_keys.contains(key) => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

fn attachment_header(company_name: &str) -> HeaderValue {
    let filename = format!("{}_website.zip", company_name.replace(' ', "_"));
    HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"website.zip\""))
}

/// POST /generate — the full pipeline: validate, analyze images, resolve
/// theme, build prompt, call the backend, parse/repair, screen, package.
pub async fn generate_website(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    check_api_key(&state.config, &headers)?;
    if !state.limiter.check(addr.ip()) {
        return Err(ApiError::RateLimited);
    }

    let form = read_form(&mut multipart).await?;
    if form.images.len() > state.config.max_images {
        return Err(ApiError::Validation(format!(
            "Maximum {} images allowed",
            state.config.max_images
        )));
    }

    let request = GenerateRequest {
        company_name: form.company_name,
        description: form.description,
        theme_hint: form.theme_hint,
        pages: form
            .pages
            .as_deref()
            .map(|raw| split_pages(raw, state.config.max_pages)),
        require_dark_mode: form.require_dark_mode,
    }
    .sanitized();
    request.validate(&state.config)?;

    info!("🚀 Generating website for: {}", request.company_name);

    let valid_images: Vec<Bytes> = form
        .images
        .into_iter()
        .filter(|bytes| {
            let ok = vision::validate_image(bytes, &state.config);
            if !ok {
                warn!("Dropping invalid image ({} bytes)", bytes.len());
            }
            ok
        })
        .collect();

    let hints = if valid_images.is_empty() {
        DesignHints::new()
    } else {
        info!("Analyzing {} images", valid_images.len());
        vision::analyze_images(&state.ollama, &valid_images).await
    };

    let theme = Theme::resolve(request.theme_hint.as_deref());
    let pages = pages_for(&request, &state.config);
    let prompt = build_site_prompt(&request, theme, &pages, &hints);

    let raw = state.ollama.generate_site(SYSTEM_PROMPT, &prompt).await?;
    info!("Received response from Ollama, length: {}", raw.len());

    let files = parse_file_set(&raw)?;
    screen_file_set(&files)?;

    let archive = build_zip(&files)?;
    info!(
        "✅ Website generated: {} files, {} byte archive",
        files.len(),
        archive.len()
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/zip"));
    headers.insert(header::CONTENT_DISPOSITION, attachment_header(&request.company_name));
    Ok((StatusCode::OK, headers, archive).into_response())
}

/// GET /health — reachability of the backend via its model-listing endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = state.ollama.health().await;
    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        ollama_connected: connected,
    })
}

/// GET / — service banner.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "AI Website Generator",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health",
            "generate": "/generate (POST)"
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_bool_accepts_common_truthy_forms() {
        for v in ["true", "TRUE", "1", "on", "yes", " True "] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["false", "0", "off", "", "no", "maybe"] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn api_key_check_disabled_without_configured_keys() {
        let config = Config::default();
        assert!(check_api_key(&config, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn api_key_check_enforced_when_configured() {
        let mut config = Config::default();
        config.api_keys.insert("secret".to_string());

        assert!(matches!(
            check_api_key(&config, &HeaderMap::new()),
            Err(ApiError::Unauthorized)
        ));

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("wrong"));
        assert!(check_api_key(&config, &headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));
        assert!(check_api_key(&config, &headers).is_ok());
    }

    #[test]
    fn attachment_filename_replaces_spaces() {
        let value = attachment_header("Acme Bakery");
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"Acme_Bakery_website.zip\""
        );
    }

    #[test]
    fn attachment_filename_falls_back_for_non_ascii() {
        let value = attachment_header("日本語株式会社");
        assert_eq!(value.to_str().unwrap(), "attachment; filename=\"website.zip\"");
    }

    /// The post-backend half of the pipeline on the canonical scenario:
    /// parse, screen, package, and read the archive back.
    #[test]
    fn pipeline_produces_archive_with_exactly_the_returned_files() {
        let backend_reply = r#"{
            "index.html": "<!DOCTYPE html><html><body>Acme</body></html>",
            "about.html": "<!DOCTYPE html><html><body>About</body></html>",
            "styles.css": "body { background: #111827; }",
            "script.js": "console.log('Acme');"
        }"#;

        let files = parse_file_set(backend_reply).unwrap();
        screen_file_set(&files).unwrap();
        let bytes = build_zip(&files).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["about.html", "index.html", "script.js", "styles.css"]);
    }
}
