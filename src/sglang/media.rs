use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::transport::Transport;
use crate::error::{MediaError, Result};
use crate::logger;
use crate::models::{GenerationRequest, GenerationResponse, MediaKind};

/// Accepts payloads with or without trailing `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Returns the base64 part of a payload, dropping a `data:...,` prefix if present.
pub fn strip_data_url(payload: &str) -> Result<&str> {
    if !payload.starts_with("data:") {
        return Ok(payload);
    }

    payload
        .split_once(',')
        .map(|(_, data)| data)
        .ok_or_else(|| MediaError::UnexpectedResponse("data URL without a ',' separator".into()))
}

pub fn decode_media(payload: &str) -> Result<Vec<u8>> {
    let data = strip_data_url(payload)?;
    Ok(LENIENT.decode(data.trim())?)
}

pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// `.png` (any case) is sent as PNG, everything else as JPEG.
pub fn image_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// Posts one generation request and writes the first returned item to `output_path`.
///
/// Nothing is written unless the server answers 200 with a decodable payload.
pub(crate) async fn generate_to_file(
    transport: &Arc<dyn Transport>,
    kind: MediaKind,
    request: &GenerationRequest,
    output_path: &Path,
    timeout: Duration,
) -> Result<PathBuf> {
    let body = serde_json::to_value(request)
        .map_err(|e| MediaError::RequestError(format!("Failed to serialize request: {}", e)))?;

    log::info!("Generating {:?} with model: {}", kind, request.model);
    let _timer = logger::timer(kind.endpoint());

    let reply = transport
        .post_json(kind.endpoint(), &body, timeout)
        .await?;
    let response: GenerationResponse = reply.into_json()?;

    let bytes = decode_media(response.first_payload(kind)?)?;
    tokio::fs::write(output_path, &bytes).await?;

    log::info!(
        "💾 Saved {} bytes to {}",
        bytes.len(),
        output_path.display()
    );
    Ok(output_path.to_path_buf())
}
