#![forbid(unsafe_code)]

//! Naming and acceptance rules for client attachments.

use crate::ids::ClientId;

/// The single accepted set of attachment extensions (compared lowercase).
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "pdf", "png", "jpg", "jpeg", "gif", "docx"];

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_ATTACHMENT_TYPE: &str = "general";

pub fn extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_allowed_file(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduces a user supplied name to a flat ASCII filename that is safe to
/// join onto the upload directory. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let flattened: String = name
        .chars()
        .map(|ch| if matches!(ch, '/' | '\\') { ' ' } else { ch })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
        .collect();
    filtered.trim_matches(|ch| ch == '.' || ch == '_').to_string()
}

/// `{client}_{tag}_{timestamp}_{digest}_{name}`; `timestamp` is expected as
/// `YYYYMMDD_HHMMSS` and `digest` as a short hex string.
pub fn stored_filename(
    client_id: ClientId,
    attachment_type: &str,
    timestamp: &str,
    digest: &str,
    safe_name: &str,
) -> String {
    let tag = match secure_filename(attachment_type) {
        tag if tag.is_empty() => DEFAULT_ATTACHMENT_TYPE.to_string(),
        tag => tag,
    };
    format!("{client_id}_{tag}_{timestamp}_{digest}_{safe_name}")
}
