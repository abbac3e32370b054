use time::OffsetDateTime;
use uuid::Uuid;

pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

/// Extension for common image MIME types; used when the upload carries no
/// usable filename.
pub fn ext_from_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

fn ext_from_filename(name: &str) -> Option<&str> {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
}

/// Collision-resistant object key preserving the original extension: epoch
/// millis for rough ordering on disk plus a UUID for uniqueness.
pub fn make_object_key(file_name: Option<&str>, content_type: &str) -> String {
    let ext = file_name
        .and_then(ext_from_filename)
        .or_else(|| ext_from_mime(content_type))
        .unwrap_or("bin");
    let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    format!("{}-{}.{}", now_ms, Uuid::new_v4(), ext)
}

/// Basename of an image URL, refusing anything that could point outside the
/// uploads directory.
pub fn object_key_from_url(image_url: &str) -> Option<String> {
    let name = image_url.rsplit('/').next()?;
    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return None;
    }
    Some(name.to_string())
}
