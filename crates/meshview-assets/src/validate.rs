//! Content-type validation
//!
//! Optional pre-flight check run against the declared content type before a
//! model is downloaded.

use crate::transport::ResourceInfo;
use crate::{AssetError, AssetResult};

/// Declared types accepted for OBJ payloads
pub const ALLOWED_CONTENT_TYPES: [&str; 4] = [
    "model/obj",
    "text/plain",
    "application/octet-stream",
    "application/x-tgif",
];

/// Substring match, so parameters like `; charset=utf-8` pass.
/// A missing content type is rejected.
pub fn is_allowed_content_type(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let lowered = content_type.to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES
        .iter()
        .any(|allowed| lowered.contains(allowed))
}

pub fn validate_content_type(info: &ResourceInfo) -> AssetResult<()> {
    if is_allowed_content_type(info.content_type.as_deref()) {
        log::debug!("Content type {:?} accepted", info.content_type);
        Ok(())
    } else {
        log::warn!("Rejected content type {:?}", info.content_type);
        Err(AssetError::InvalidContentType {
            content_type: info.content_type.clone(),
        })
    }
}
