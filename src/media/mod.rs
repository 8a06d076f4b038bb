//! Image ingestion.
//!
//! Clients send images inline as `data:` URLs inside JSON, projects send them
//! as multipart file fields. Both arrive as an [`ImageInput`], are decoded and
//! sniffed into a [`DecodedImage`], and are then written through a single
//! [`MediaStorage`] which hands back the public URL.

pub mod storage;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

pub use storage::{LocalDiskStorage, MediaStorage, MemoryStorage, StorageError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("image is empty")]
    Empty,
    #[error("image is {size} bytes, limit is {max}")]
    TooLarge { size: usize, max: usize },
    #[error("unsupported image type, expected PNG, JPEG, GIF or WebP")]
    UnsupportedType,
    #[error("invalid inline image: {0}")]
    InvalidInline(String),
}

/// Image formats accepted for storage, identified by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageKind {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::WebP)
        } else {
            None
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::WebP => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::WebP => "webp",
        }
    }
}

/// An image as supplied by a caller, before validation
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// `data:<mime>;base64,<payload>` string from a JSON body
    Inline(String),
    /// File field bytes from a multipart body
    Upload(Vec<u8>),
}

/// Validated image bytes ready for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    /// Inline images treat an empty string as "no image supplied"
    pub fn inline(value: Option<String>) -> Option<Self> {
        value
            .filter(|v| !v.trim().is_empty())
            .map(ImageInput::Inline)
    }

    /// Decode and validate against the size limit. The stored type always
    /// comes from the bytes themselves, never from a declared MIME type.
    pub fn decode(self, max_bytes: usize) -> Result<DecodedImage, MediaError> {
        let bytes = match self {
            ImageInput::Inline(data_url) => decode_data_url(&data_url)?,
            ImageInput::Upload(bytes) => bytes,
        };

        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(MediaError::TooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }

        let kind = ImageKind::sniff(&bytes).ok_or(MediaError::UnsupportedType)?;
        Ok(DecodedImage { kind, bytes })
    }
}

fn decode_data_url(data_url: &str) -> Result<Vec<u8>, MediaError> {
    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| MediaError::InvalidInline("expected a data: URL".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| MediaError::InvalidInline("missing ',' separator".into()))?;

    let mut parts = meta.split(';');
    let mime = parts.next().unwrap_or_default();
    if !mime.is_empty() && !mime.starts_with("image/") {
        return Err(MediaError::InvalidInline(format!("'{}' is not an image type", mime)));
    }
    if !parts.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(MediaError::InvalidInline("only base64 data URLs are accepted".into()));
    }

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| MediaError::InvalidInline(format!("bad base64 payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(len: usize) -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(len.max(8), 0);
        bytes
    }

    #[test]
    fn sniffs_known_formats() {
        assert_eq!(ImageKind::sniff(&png_bytes(16)), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(b"GIF89a...."), Some(ImageKind::Gif));
        assert_eq!(ImageKind::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageKind::WebP));
        assert_eq!(ImageKind::sniff(b"<svg></svg>"), None);
    }

    #[test]
    fn decodes_inline_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(64)));
        let image = ImageInput::Inline(url).decode(1024).unwrap();
        assert_eq!(image.kind, ImageKind::Png);
        assert_eq!(image.bytes.len(), 64);
    }

    #[test]
    fn rejects_malformed_inline_images() {
        let cases = [
            "not a data url",
            "data:image/png;base64",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,rawbytes",
            "data:image/png;base64,!!!",
        ];
        for case in cases {
            let err = ImageInput::Inline(case.to_string()).decode(1024).unwrap_err();
            assert!(matches!(err, MediaError::InvalidInline(_)), "{}: {:?}", case, err);
        }
    }

    #[test]
    fn uploads_are_sniffed_not_trusted() {
        let upload = ImageInput::Upload(b"#!/bin/sh\necho hi".to_vec());
        assert_eq!(upload.decode(1024).unwrap_err(), MediaError::UnsupportedType);
    }

    #[test]
    fn enforces_size_limit() {
        let upload = ImageInput::Upload(png_bytes(2048));
        assert_eq!(
            upload.decode(1024).unwrap_err(),
            MediaError::TooLarge { size: 2048, max: 1024 }
        );

        let empty = ImageInput::Upload(vec![]);
        assert_eq!(empty.decode(1024).unwrap_err(), MediaError::Empty);
    }

    #[test]
    fn blank_inline_value_means_no_image() {
        assert!(ImageInput::inline(None).is_none());
        assert!(ImageInput::inline(Some("  ".into())).is_none());
        assert!(ImageInput::inline(Some("data:x".into())).is_some());
    }
}
