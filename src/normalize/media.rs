//! Media type detection for in-memory images.

/// Detect an image media type from the leading bytes of the payload.
pub fn detect_image_media_type(bytes: &[u8]) -> Option<String> {
    let mt = match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => "image/tiff",
        [_, _, _, _, b'f', b't', b'y', b'p', rest @ ..] if rest.len() >= 4 => {
            match &rest[..4] {
                b"heic" | b"heix" | b"hevc" | b"hevx" => "image/heic",
                b"mif1" | b"msf1" => "image/heif",
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(mt.to_string())
}

/// Media type for a format name such as `"PNG"` or `"jpg"`.
pub fn media_type_from_format(format: &str) -> Option<String> {
    let format = format.trim().to_lowercase();
    let mt = match format.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => return None,
    };
    Some(mt.to_string())
}
