use axum::body::{Body, Bytes};
use graphics_image::Image;
use graphics_io::jpeg::decode_image_jpeg_rgb8;

use crate::{dispatch::run_blocking, error::PipelineError};

/// The only media type accepted as input.
pub const ACCEPTED_CONTENT_TYPE: &str = "image/jpeg";

/// Pixels of a decoded request image.
pub type DecodedImage = Image<u8, 3>;

/// Encoded bytes of a request together with their declared content type.
#[derive(Debug, Clone)]
pub struct RawPayload {
    /// Content type the client declared for the body.
    pub content_type: String,
    /// The body as received.
    pub bytes: Bytes,
}

/// Whether `content_type` names the accepted media type, ignoring case and parameters.
pub fn is_accepted_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|media_type| media_type.eq_ignore_ascii_case(ACCEPTED_CONTENT_TYPE))
}

/// Check the declared content type and read the whole body, up to `limit` bytes.
///
/// The body is never touched when the content type is rejected.
pub async fn read_payload(
    content_type: Option<&str>,
    body: Body,
    limit: usize,
) -> Result<RawPayload, PipelineError> {
    let content_type = match content_type {
        Some(ct) if is_accepted_content_type(ct) => ct,
        Some(ct) => return Err(PipelineError::UnsupportedContentType(ct.to_owned())),
        None => return Err(PipelineError::UnsupportedContentType(String::from("<none>"))),
    };

    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| PipelineError::Read(e.to_string()))?;

    Ok(RawPayload {
        content_type: content_type.to_owned(),
        bytes,
    })
}

/// Decode JPEG bytes into RGB pixels with the dimensions of the source image.
pub fn decode_payload(bytes: &[u8]) -> Result<DecodedImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::Decode(String::from("empty body")));
    }

    decode_image_jpeg_rgb8(bytes).map_err(|e| PipelineError::Decode(e.to_string()))
}

/// Validate, read and decode a request body.
///
/// The body is read on the async runtime and decoded on the blocking pool.
///
/// # Errors
///
/// In order of checking: [`PipelineError::UnsupportedContentType`],
/// [`PipelineError::Read`] and [`PipelineError::Decode`].
pub async fn validate_and_decode(
    content_type: Option<&str>,
    body: Body,
    limit: usize,
) -> Result<DecodedImage, PipelineError> {
    let payload = read_payload(content_type, body, limit).await?;
    log::debug!(
        "read {} bytes declared as {}",
        payload.bytes.len(),
        payload.content_type
    );

    run_blocking(move || decode_payload(&payload.bytes)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphics_io::jpeg::encode_image_jpeg_rgb8;

    const LIMIT: usize = 1 << 20;

    fn jpeg_bytes(width: usize, height: usize) -> Vec<u8> {
        let image = DecodedImage::from_size_val([width, height].into(), 90)
            .expect("valid image size");
        encode_image_jpeg_rgb8(&image, 75).expect("encodable image")
    }

    #[test]
    fn accepted_content_types() {
        assert!(is_accepted_content_type("image/jpeg"));
        assert!(is_accepted_content_type("IMAGE/JPEG"));
        assert!(is_accepted_content_type("image/jpeg; charset=binary"));
        assert!(is_accepted_content_type(" image/jpeg "));

        assert!(!is_accepted_content_type("image/png"));
        assert!(!is_accepted_content_type("image/jpg"));
        assert!(!is_accepted_content_type("multipart/form-data; boundary=x"));
        assert!(!is_accepted_content_type(""));
    }

    #[tokio::test]
    async fn decodes_jpeg_body() -> Result<(), PipelineError> {
        let body = Body::from(jpeg_bytes(40, 30));
        let image = validate_and_decode(Some("image/jpeg"), body, LIMIT).await?;
        assert_eq!(image.width(), 40);
        assert_eq!(image.height(), 30);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_content_type_before_decoding() {
        let body = Body::from(jpeg_bytes(8, 8));
        let res = validate_and_decode(Some("image/png"), body, LIMIT).await;
        assert!(matches!(res, Err(PipelineError::UnsupportedContentType(ct)) if ct == "image/png"));

        let res = validate_and_decode(None, Body::from("garbage"), LIMIT).await;
        assert!(matches!(res, Err(PipelineError::UnsupportedContentType(_))));
    }

    #[tokio::test]
    async fn body_over_limit_is_a_read_error() {
        let body = Body::from(jpeg_bytes(64, 64));
        let res = validate_and_decode(Some("image/jpeg"), body, 16).await;
        assert!(matches!(res, Err(PipelineError::Read(_))));
    }

    #[tokio::test]
    async fn keeps_declared_content_type() -> Result<(), PipelineError> {
        let payload = read_payload(Some("image/JPEG"), Body::from("abc"), LIMIT).await?;
        assert_eq!(payload.content_type, "image/JPEG");
        assert_eq!(&payload.bytes[..], b"abc");
        Ok(())
    }

    #[tokio::test]
    async fn truncated_scan_is_a_decode_error() {
        let mut state = 0x9e37_79b9_u32;
        let data = (0..128 * 128 * 3)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        let image = DecodedImage::new([128, 128].into(), data).expect("valid image size");
        let bytes = encode_image_jpeg_rgb8(&image, 90).expect("encodable image");

        for cut in [bytes.len() / 2, bytes.len() - 2] {
            let body = Body::from(bytes[..cut].to_vec());
            let res = validate_and_decode(Some("image/jpeg"), body, LIMIT).await;
            assert!(matches!(res, Err(PipelineError::Decode(_))), "cut at {cut}");
        }
    }

    #[test]
    fn invalid_bytes_are_decode_errors() {
        let truncated = jpeg_bytes(16, 16);
        for bytes in [
            &[][..],
            &b"definitely not a jpeg"[..],
            &[0xFF, 0xD8, 0xFF][..],
            &truncated[..truncated.len() / 8],
        ] {
            assert!(matches!(
                decode_payload(bytes),
                Err(PipelineError::Decode(_))
            ));
        }
    }
}
