//! Image ingestion: upload validation and transport encoding.

use base64::Engine;

use super::error::PipelineError;

/// Fallback MIME type when the caller declared none and sniffing fails.
const DEFAULT_MIME: &str = "image/jpeg";

/// A validated uploaded image, normalized for the extraction strategies.
#[derive(Debug, Clone)]
pub struct InlineImage {
    bytes: Vec<u8>,
    mime: String,
}

impl InlineImage {
    /// Validate an upload and resolve its MIME type.
    ///
    /// Zero-length uploads are rejected before any remote call happens.
    /// A missing or empty declared MIME type is resolved by sniffing the
    /// bytes, falling back to a generic image type.
    pub fn from_upload(bytes: Vec<u8>, declared_mime: Option<&str>) -> Result<Self, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::EmptyImage);
        }

        let mime = match declared_mime {
            Some(mime) if !mime.is_empty() => mime.to_string(),
            _ => infer::get(&bytes)
                .map(|kind| kind.mime_type().to_string())
                .unwrap_or_else(|| DEFAULT_MIME.to_string()),
        };

        Ok(Self { bytes, mime })
    }

    /// Raw image bytes, as uploaded.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Resolved MIME type.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Encode as a base64 data URL for inline embedding in a user message.
    pub fn to_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0];

    #[test]
    fn test_empty_upload_rejected() {
        let err = InlineImage::from_upload(Vec::new(), Some("image/png")).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyImage));
    }

    #[test]
    fn test_declared_mime_wins() {
        let image = InlineImage::from_upload(PNG_MAGIC.to_vec(), Some("image/webp")).unwrap();
        assert_eq!(image.mime(), "image/webp");
    }

    #[test]
    fn test_missing_mime_is_sniffed() {
        let image = InlineImage::from_upload(PNG_MAGIC.to_vec(), None).unwrap();
        assert_eq!(image.mime(), "image/png");

        let image = InlineImage::from_upload(JPEG_MAGIC.to_vec(), Some("")).unwrap();
        assert_eq!(image.mime(), "image/jpeg");
    }

    #[test]
    fn test_unrecognizable_bytes_fall_back_to_jpeg() {
        let image = InlineImage::from_upload(vec![1, 2, 3, 4], None).unwrap();
        assert_eq!(image.mime(), DEFAULT_MIME);
    }

    #[test]
    fn test_data_url_encoding() {
        let image = InlineImage::from_upload(vec![0xFF, 0x00, 0xAB], Some("image/png")).unwrap();
        let url = image.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        assert_eq!(decoded, vec![0xFF, 0x00, 0xAB]);
    }
}
