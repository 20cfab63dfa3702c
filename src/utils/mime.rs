//! MIME type detection for audio uploads

const FALLBACK: &str = "application/octet-stream";

/// Detect the MIME type from magic numbers.
pub fn guess_mime_from_bytes(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}

/// Detect the MIME type from a file name extension.
pub fn guess_mime_from_file_name(file_name: &str) -> Option<String> {
    mime_guess::from_path(file_name)
        .first_raw()
        .map(str::to_string)
}

/// Content sniffing first, then the extension, then `application/octet-stream`.
///
/// A sniffed type that is neither audio nor video is ignored in favour of
/// the extension, since containers like `.webm` and `.mp4` sniff as video.
pub fn guess_mime(bytes: Option<&[u8]>, file_name: Option<&str>) -> String {
    let sniffed = bytes.and_then(guess_mime_from_bytes);
    if let Some(m) = &sniffed
        && (m.starts_with("audio/") || m.starts_with("video/"))
    {
        return m.clone();
    }
    file_name
        .and_then(guess_mime_from_file_name)
        .or(sniffed)
        .unwrap_or_else(|| FALLBACK.to_string())
}
