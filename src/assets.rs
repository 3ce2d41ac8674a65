use anyhow::{Context, Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::fs;
use std::path::Path;

/// MIME type for an image file, chosen by extension.
fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Encode raw bytes as a base64 `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Read an image file and return it as an embeddable data URI.
///
/// The error message is meant to be shown to the user as-is.
pub fn load_data_uri(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("이미지를 찾을 수 없습니다: {}", path.display());
    }

    let bytes =
        fs::read(path).with_context(|| format!("이미지 로딩 중 오류 발생: {}", path.display()))?;

    Ok(data_uri(mime_type(path), &bytes))
}
