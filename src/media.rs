//! Media type tables for served segment files.
//!
//! Two read-only tables drive the video handler:
//!
//! - [`ALLOWED_EXTENSIONS`]: the allow-list. Requests for any other extension
//!   are rejected with `400 Bad Request`, whether or not the file exists.
//! - [`CONTENT_TYPES`]: extension to `Content-Type` mapping.
//!
//! Both are consulted independently. Today their key sets are identical, but
//! the allow-list is the gate and the MIME table is only used for headers.
//!
//! Extensions include the leading dot and are matched case-sensitively.

use std::path::Path;

/// Extensions the server is willing to serve.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".mp4", ".m4s", ".mpd", ".webm", ".m3u8", ".ts"];

/// Extension to MIME type mapping.
pub const CONTENT_TYPES: &[(&str, &str)] = &[
    (".mp4", "video/mp4"),
    (".m4s", "video/mp4"),
    (".mpd", "application/dash+xml"),
    (".webm", "video/webm"),
    (".m3u8", "application/vnd.apple.mpegurl"),
    (".ts", "video/mp2t"),
];

/// Whether `extension` (with its leading dot) is on the allow-list.
pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension)
}

/// Look up the MIME type for an extension.
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Extract the extension of the final path segment.
///
/// Returns the substring from the last `.` to the end of the file name, so
/// `"a/b/seg.m4s"` yields `".m4s"`, `"archive.tar.ts"` yields `".ts"` and
/// `".hidden"` yields `".hidden"`. A file name without a dot, or a path with
/// no file name at all, has no extension.
pub fn extension_of(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.rfind('.').map(|idx| &name[idx..])
}
