/// Fallback for extensions the provider has no specific type for.
pub const GENERIC_BINARY: &str = "application/octet-stream";

/// MIME type declared to the extraction provider, inferred from the file
/// extension (case-insensitive).
pub fn infer_mime_type(file_name: &str) -> &'static str {
    let extension = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return GENERIC_BINARY,
    };

    match extension.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => GENERIC_BINARY,
    }
}
