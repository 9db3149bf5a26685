//! Resolution of request sub-paths against the serving root.
//!
//! The sub-path comes straight from the URL (after the `/video/` prefix is
//! stripped and percent-decoding is applied), so it may contain `.` and `..`
//! segments, repeated separators or a leading `/`. [`resolve_under_root`]
//! normalizes it lexically as if it were rooted at `/`: a `..` at the top
//! is dropped instead of climbing out. The result is always `root` or a
//! descendant of it.
//!
//! ```
//! use std::path::Path;
//! use video_server::server::resolve::resolve_under_root;
//!
//! let root = Path::new("/app/output");
//! assert_eq!(
//!     resolve_under_root(root, "../../etc/passwd"),
//!     Path::new("/app/output/etc/passwd")
//! );
//! ```

use std::path::{Component, Path, PathBuf};

/// Join `sub_path` onto `root` without ever leaving `root`.
///
/// The filesystem is not consulted: symlinks inside the root are followed
/// later by the file server like any other entry.
pub fn resolve_under_root(root: &Path, sub_path: &str) -> PathBuf {
    let mut segments: Vec<&std::ffi::OsStr> = Vec::new();

    for component in Path::new(sub_path).components() {
        match component {
            Component::Normal(segment) => segments.push(segment),
            Component::ParentDir => {
                segments.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let mut resolved = root.to_path_buf();
    resolved.extend(segments);
    resolved
}
