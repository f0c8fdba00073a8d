//! File intake: encoding the uploaded waste image
//!
//! Pure byte-level helpers shared by the image endpoint and the
//! classifier: data-URL previews for immediate display, and bare
//! base64 payloads for transmission to the classification service.

use base64::{engine::general_purpose, Engine as _};
use greenloop_common::{Error, Result};

/// Fallback MIME type when neither the client nor content sniffing
/// can identify the image
const FALLBACK_MIME: &str = "application/octet-stream";

/// Encode raw bytes as a `data:` URL for preview display
pub fn to_data_url(bytes: &[u8], mime_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Encode raw bytes as bare base64 for transmission
pub fn encode_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode a base64 payload, tolerating a `data:...;base64,` prefix
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let stripped = strip_data_url_prefix(payload);
    general_purpose::STANDARD
        .decode(stripped.trim())
        .map_err(|e| Error::InvalidInput(format!("invalid base64 image payload: {}", e)))
}

/// Drop the metadata prefix of a data URL, leaving the raw base64.
/// Returns the input unchanged when it is not a data URL.
pub fn strip_data_url_prefix(payload: &str) -> &str {
    if payload.starts_with("data:") {
        match payload.split_once(',') {
            Some((_, rest)) => rest,
            None => payload,
        }
    } else {
        payload
    }
}

/// Extract the MIME type from a data URL, e.g. "image/png" from
/// `data:image/png;base64,...`
pub fn data_url_mime(payload: &str) -> Option<&str> {
    let rest = payload.strip_prefix("data:")?;
    let header = rest.split(',').next()?;
    let mime = header.split(';').next()?;
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

/// Resolve the MIME type for an uploaded image: the declared type
/// wins, then content sniffing, then a generic fallback.
pub fn resolve_mime(bytes: &[u8], declared: Option<&str>) -> String {
    if let Some(mime) = declared {
        if !mime.trim().is_empty() {
            return mime.trim().to_string();
        }
    }

    infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal PNG header, enough for content sniffing
    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ];

    #[test]
    fn test_data_url_round_trip() {
        let url = to_data_url(b"hello", "image/png");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_base64(&url).unwrap(), b"hello");
    }

    #[test]
    fn test_strip_prefix_on_plain_base64() {
        assert_eq!(strip_data_url_prefix("aGVsbG8="), "aGVsbG8=");
    }

    #[test]
    fn test_strip_prefix_on_data_url() {
        assert_eq!(
            strip_data_url_prefix("data:image/jpeg;base64,aGVsbG8="),
            "aGVsbG8="
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base64("not base64 at all!!!").is_err());
    }

    #[test]
    fn test_data_url_mime() {
        assert_eq!(
            data_url_mime("data:image/jpeg;base64,xyz"),
            Some("image/jpeg")
        );
        assert_eq!(data_url_mime("aGVsbG8="), None);
    }

    #[test]
    fn test_resolve_mime_prefers_declared() {
        assert_eq!(resolve_mime(PNG_BYTES, Some("image/webp")), "image/webp");
    }

    #[test]
    fn test_resolve_mime_sniffs_content() {
        assert_eq!(resolve_mime(PNG_BYTES, None), "image/png");
        assert_eq!(resolve_mime(PNG_BYTES, Some("  ")), "image/png");
    }

    #[test]
    fn test_resolve_mime_fallback() {
        assert_eq!(resolve_mime(b"????", None), FALLBACK_MIME);
    }
}
