use base64::Engine;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::DesignHints;
use crate::ollama::OllamaClient;
use crate::parse::extract_json_object;

const SAMPLE_SIZE: u32 = 50;

/// Size, format and structural checks for an uploaded reference image.
/// Four raster formats are recognized; anything else is dropped.
pub fn validate_image(bytes: &[u8], config: &Config) -> bool {
    if bytes.is_empty() || bytes.len() > config.max_image_size_bytes() {
        return false;
    }
    let format = match image::guess_format(bytes) {
        Ok(format) => format,
        Err(_) => return false,
    };
    if !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif | ImageFormat::WebP
    ) {
        return false;
    }
    image::load_from_memory_with_format(bytes, format).is_ok()
}

/// Downsamples to a small grid and averages channels into one hex color.
pub fn dominant_color(img: &DynamicImage) -> String {
    let small = img.thumbnail_exact(SAMPLE_SIZE, SAMPLE_SIZE).to_rgb8();
    let pixels = u64::from(small.width() * small.height()).max(1);
    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for pixel in small.pixels() {
        r += pixel.0[0] as u64;
        g += pixel.0[1] as u64;
        b += pixel.0[2] as u64;
    }
    format!("#{:02x}{:02x}{:02x}", r / pixels, g / pixels, b / pixels)
}

fn hint_prompt(primary_color: &str) -> String {
    format!(
        "Analyze this image and suggest:\n\
        1. A complementary color palette (3-5 colors)\n\
        2. Font style suggestions (modern, classic, playful, professional)\n\
        3. Overall design mood\n\
        \n\
        Image has a dominant color of {primary_color}. Provide suggestions in JSON format."
    )
}

fn fallback_hints(primary_color: &str) -> DesignHints {
    let mut hints = DesignHints::new();
    hints.insert(
        "primary_color".to_string(),
        serde_json::Value::String(primary_color.to_string()),
    );
    hints
}

/// Derives design hints from at most the first image. Best-effort: every
/// failure (decode, network, parse) degrades to empty hints and never blocks
/// the main generation path. Remaining images are ignored by design.
pub async fn analyze_images(client: &OllamaClient, images: &[Bytes]) -> DesignHints {
    let Some(bytes) = images.first() else {
        return DesignHints::new();
    };

    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!("Image decode failed during analysis: {e}");
            return DesignHints::new();
        }
    };

    let primary_color = dominant_color(&img);
    info!("🎨 Dominant color of reference image: {primary_color}");

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes[..]);
    match client.analyze_image(&hint_prompt(&primary_color), encoded).await {
        Ok(reply) => {
            if let Some(span) = extract_json_object(&reply) {
                if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(span) {
                    info!("✅ Extracted {} design hints from vision model", map.len());
                    return map;
                }
            }
            fallback_hints(&primary_color)
        }
        Err(e) => {
            warn!("Image analysis failed: {e}");
            DesignHints::new()
        }
    }
}
