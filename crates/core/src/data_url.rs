//! `data:` URL handling for photos that have not been uploaded yet.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// MIME type assumed when a data URL does not declare one.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("not a data URL")]
    NotDataUrl,

    #[error("data URL has no payload")]
    MissingPayload,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

pub fn is_data_url(url: &str) -> bool {
    url.starts_with("data:")
}

/// Decode a base64 data URL.
pub fn decode(url: &str) -> Result<DataUrl, DataUrlError> {
    let rest = url.strip_prefix("data:").ok_or(DataUrlError::NotDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;

    let mime_type = header
        .split(';')
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_string();

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| DataUrlError::InvalidBase64(e.to_string()))?;

    Ok(DataUrl { mime_type, bytes })
}

/// Encode raw bytes as a base64 data URL.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_payload() {
        let decoded = decode("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.bytes, b"hello");
    }

    #[test]
    fn missing_mime_defaults_to_jpeg() {
        let decoded = decode("data:;base64,aGk=").unwrap();
        assert_eq!(decoded.mime_type, DEFAULT_IMAGE_MIME);
    }

    #[test]
    fn rejects_remote_urls_and_garbage() {
        assert_eq!(decode("https://cdn/x.jpg"), Err(DataUrlError::NotDataUrl));
        assert_eq!(decode("data:image/png;base64"), Err(DataUrlError::MissingPayload));
        assert!(matches!(
            decode("data:image/png;base64,@@@"),
            Err(DataUrlError::InvalidBase64(_))
        ));
    }

    #[test]
    fn encode_then_decode_preserves_bytes() {
        let url = encode("image/webp", &[0, 1, 2, 250]);
        assert!(is_data_url(&url));
        assert_eq!(decode(&url).unwrap().bytes, vec![0, 1, 2, 250]);
    }
}
