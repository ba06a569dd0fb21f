//! Upload validation: proves a byte blob is a well-formed JPEG or PNG.

use image::ImageFormat;

use crate::error::RecognitionError;

/// The two image formats the recognition pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    /// MIME type used in the data URL sent upstream.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Normalized lowercase format tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }
}

/// Validate an uploaded byte blob.
///
/// The bytes are sniffed for a known image signature and then fully
/// decoded to prove readability; the caller's buffer is untouched. Formats
/// other than JPEG/PNG are rejected even when they decode cleanly.
pub fn validate(bytes: &[u8]) -> Result<ImageKind, RecognitionError> {
    if bytes.is_empty() {
        return Err(RecognitionError::InvalidUpload {
            reason: "empty upload".to_string(),
        });
    }

    let format = image::guess_format(bytes).map_err(|e| {
        tracing::debug!(error = %e, "Image signature not recognized");
        RecognitionError::UnreadableImage {
            reason: e.to_string(),
        }
    })?;

    let kind = match format {
        ImageFormat::Jpeg => ImageKind::Jpeg,
        ImageFormat::Png => ImageKind::Png,
        other => {
            return Err(RecognitionError::UnsupportedFormat {
                detected: format!("{other:?}").to_lowercase(),
            });
        }
    };

    // Signature alone is not proof; a truncated or corrupt body must fail.
    image::load_from_memory_with_format(bytes, format).map_err(|e| {
        tracing::debug!(format = kind.tag(), error = %e, "Image failed to decode");
        RecognitionError::UnreadableImage {
            reason: e.to_string(),
        }
    })?;

    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(4, 4);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn accepts_png() {
        let bytes = encode(ImageFormat::Png);
        assert_eq!(validate(&bytes).unwrap(), ImageKind::Png);
    }

    #[test]
    fn accepts_jpeg() {
        let bytes = encode(ImageFormat::Jpeg);
        assert_eq!(validate(&bytes).unwrap(), ImageKind::Jpeg);
    }

    #[test]
    fn rejects_empty_buffer() {
        let err = validate(&[]).unwrap_err();
        assert!(matches!(err, RecognitionError::InvalidUpload { .. }));
    }

    #[test]
    fn rejects_gif() {
        let bytes = encode(ImageFormat::Gif);
        let err = validate(&bytes).unwrap_err();
        assert!(matches!(err, RecognitionError::UnsupportedFormat { .. }));
    }

    #[test]
    fn rejects_garbage_bytes() {
        let err = validate(b"definitely not an image").unwrap_err();
        assert!(matches!(err, RecognitionError::UnreadableImage { .. }));
    }

    #[test]
    fn rejects_truncated_png() {
        let mut bytes = encode(ImageFormat::Png);
        bytes.truncate(16); // keep the signature, drop the body
        let err = validate(&bytes).unwrap_err();
        assert!(matches!(err, RecognitionError::UnreadableImage { .. }));
    }

    #[test]
    fn validation_does_not_consume_input() {
        let bytes = encode(ImageFormat::Png);
        let before = bytes.clone();
        let _ = validate(&bytes).unwrap();
        assert_eq!(bytes, before);
    }

    #[test]
    fn mime_and_tag_are_normalized() {
        assert_eq!(ImageKind::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageKind::Png.mime_type(), "image/png");
        assert_eq!(ImageKind::Jpeg.tag(), "jpeg");
        assert_eq!(ImageKind::Png.tag(), "png");
    }
}
