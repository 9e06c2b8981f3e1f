//! MIME resolution and preview classification

use crate::DEFAULT_MIME;

/// How a decrypted file should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// Render inline as an image
    Image,
    /// Render inline as a video
    Video,
    /// Hand to an external viewer or save to disk
    External,
}

impl PreviewKind {
    pub fn for_mime(mime_type: &str) -> Self {
        let top = mime_type.split('/').next().unwrap_or("").trim();
        if top.eq_ignore_ascii_case("image") {
            PreviewKind::Image
        } else if top.eq_ignore_ascii_case("video") {
            PreviewKind::Video
        } else {
            PreviewKind::External
        }
    }

    pub fn is_inline(&self) -> bool {
        !matches!(self, PreviewKind::External)
    }
}

/// Use the caller's MIME type if given, otherwise sniff the content
pub fn resolve(declared: Option<&str>, data: &[u8]) -> String {
    match declared.map(str::trim) {
        Some(mime) if !mime.is_empty() => mime.to_string(),
        _ => detect(data).to_string(),
    }
}

/// Detect MIME type from magic bytes
pub fn detect(data: &[u8]) -> &'static str {
    if data.len() < 4 {
        return DEFAULT_MIME;
    }

    match data {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x25, 0x50, 0x44, 0x46, ..] => "application/pdf",
        [0x1A, 0x45, 0xDF, 0xA3, ..] => "video/webm",
        [0x50, 0x4B, 0x03, 0x04, ..] => "application/zip",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [_, _, _, _, b'f', b't', b'y', b'p', brand @ ..] if brand.len() >= 4 => {
            match &brand[..4] {
                b"heic" | b"heix" => "image/heic",
                b"mif1" => "image/heif",
                b"isom" | b"iso2" | b"mp41" | b"mp42" | b"avc1" => "video/mp4",
                b"qt  " => "video/quicktime",
                _ => DEFAULT_MIME,
            }
        }
        _ => DEFAULT_MIME,
    }
}
