//! Data URLs, MIME lookup and image decoding.
//!
//! These are the synchronous helpers and the image-decode collaborator the
//! cloner uses to turn canvas exports and fetched posters into `<img>` nodes.

use async_trait::async_trait;
use base64::Engine;

use crate::error::DecodeError;
use crate::output::ClonedNode;

const DATA_URL_PREFIX: &str = "data:";
const DEFAULT_MEDIA_TYPE: &str = "text/plain";

/// Known resource extensions and their MIME types.
const MIME_TABLE: &[(&str, &str)] = &[
    ("woff", "application/font-woff"),
    ("woff2", "application/font-woff"),
    ("ttf", "application/font-truetype"),
    ("eot", "application/vnd.ms-fontobject"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("tiff", "image/tiff"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
];

/// MIME type implied by the extension of a URL's path, if it is a known one.
pub fn mime_type_for_url(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    MIME_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Build a base64 data URL for `bytes`.
pub fn make_data_url(bytes: &[u8], mime: &str) -> String {
    format!(
        "{}{};base64,{}",
        DATA_URL_PREFIX,
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

pub fn is_data_url(url: &str) -> bool {
    url.get(..DATA_URL_PREFIX.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(DATA_URL_PREFIX))
}

/// Decoded payload of a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Decode a `data:` URL (RFC 2397).
pub fn parse_data_url(url: &str) -> Result<DataUrl, DecodeError> {
    if !is_data_url(url) {
        return Err(DecodeError::invalid("URL does not start with 'data:'"));
    }

    let rest = &url[DATA_URL_PREFIX.len()..];
    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::invalid("missing comma"))?;

    let mut params = metadata.split(';');
    let media_type = params.next().unwrap_or("").trim();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let mime = if media_type.is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        media_type.to_ascii_lowercase()
    };

    let bytes = if is_base64 {
        let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD.decode(cleaned)?
    } else {
        percent_decode(data)?
    };

    Ok(DataUrl { mime, bytes })
}

fn percent_decode(input: &str) -> Result<Vec<u8>, DecodeError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| DecodeError::invalid("invalid percent-escape"))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Turns a data URL into a loaded image node.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, data_url: &str) -> Result<ClonedNode, DecodeError>;
}

/// Decoder that validates the payload and wraps it in an `<img>`.
///
/// It does not rasterize; the image bytes stay inside the data URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataUrlImageDecoder;

#[async_trait]
impl ImageDecoder for DataUrlImageDecoder {
    async fn decode(&self, data_url: &str) -> Result<ClonedNode, DecodeError> {
        let decoded = parse_data_url(data_url)?;
        if decoded.bytes.is_empty() {
            return Err(DecodeError::EmptyImage { mime: decoded.mime });
        }
        tracing::trace!(mime = %decoded.mime, bytes = decoded.bytes.len(), "decoded image");
        Ok(ClonedNode::image(data_url))
    }
}
