//! Shareable links: the whole diagram packed into a URL fragment.
//!
//! The fragment is URL-safe base64 (no padding) of the JSON document
//! `{shapes, arrows, drawingPaths}`. Unlike local storage, all three fields
//! are required when decoding.

use crate::error::ShareError;
use crate::model::{Arrow, DiagramData, DrawingPath, Shape};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SharedRef<'a> {
    shapes: &'a [Shape],
    arrows: &'a [Arrow],
    drawing_paths: &'a [DrawingPath],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Shared {
    shapes: Vec<Shape>,
    arrows: Vec<Arrow>,
    drawing_paths: Vec<DrawingPath>,
}

/// Encode a diagram as a bare fragment (without the leading `#`).
pub fn encode_fragment(data: &DiagramData) -> Result<String, ShareError> {
    let json = serde_json::to_string(&SharedRef {
        shapes: &data.shapes,
        arrows: &data.arrows,
        drawing_paths: &data.drawing_paths,
    })?;
    Ok(URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

/// Build a shareable URL: `base_url` with any old fragment replaced.
pub fn encode(data: &DiagramData, base_url: &str) -> Result<String, ShareError> {
    let fragment = encode_fragment(data)?;
    Ok(format!("{}#{fragment}", strip_fragment(base_url)))
}

/// Decode a bare fragment. Any malformed input yields `None`.
pub fn decode_fragment(fragment: &str) -> Option<DiagramData> {
    if fragment.is_empty() {
        return None;
    }
    let bytes = match URL_SAFE_NO_PAD.decode(fragment.trim_end_matches('=')) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("share link fragment is not valid base64: {e}");
            return None;
        }
    };
    match serde_json::from_slice::<Shared>(&bytes) {
        Ok(s) => Some(DiagramData {
            shapes: s.shapes,
            arrows: s.arrows,
            drawing_paths: s.drawing_paths,
        }),
        Err(e) => {
            log::warn!("failed to decode diagram from share link: {e}");
            None
        }
    }
}

/// Decode the diagram carried in a URL's fragment, if any.
pub fn decode(url: &str) -> Option<DiagramData> {
    let (_, fragment) = url.split_once('#')?;
    decode_fragment(fragment)
}

/// The URL without its fragment.
pub fn strip_fragment(url: &str) -> &str {
    url.split_once('#').map_or(url, |(base, _)| base)
}
