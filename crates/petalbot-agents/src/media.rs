use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use petalbot_common::{Error, Result};

/// An image validated for inline transport to the model provider.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Sniffed MIME type, e.g. `image/jpeg`.
    pub media_type: String,
    /// Base64 of the original bytes.
    pub data: String,
}

/// Sniff and fully decode `bytes`, then package them for inline transport.
/// Fails on unrecognized or malformed image data; the caller decides
/// whether that is fatal (the chat engine downgrades to text-only).
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage> {
    let format = image::guess_format(bytes)
        .map_err(|e| Error::Media(format!("unrecognized image format: {e}")))?;

    // A full decode catches truncated or corrupt payloads that the
    // magic-byte sniff accepts.
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| Error::Media(format!("image decode failed: {e}")))?;

    Ok(DecodedImage {
        media_type: format.to_mime_type().to_string(),
        data: BASE64.encode(bytes),
    })
}
