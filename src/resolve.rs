use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// What a request path maps to under the current source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// The control page: listing of the root plus the settings form.
    RootPage,
    ServeFile(PathBuf),
    ListDirectory(String),
}

/// Turns a request path into a root-relative, `/`-separated path.
///
/// The leading separator is stripped, `.` segments dropped and `..` clamped at
/// the root, so the result never climbs above the directory it is joined to.
/// An empty result becomes `"."`.
pub fn normalize_request_path(request_path: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for component in Path::new(request_path).components() {
        match component {
            Component::Normal(comp) => parts.push(comp.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Decides whether `request_path` is the root page, a file to serve, or a
/// directory to list. Missing paths fall through to `ListDirectory` so the
/// lister reports them.
pub async fn resolve_target(source_dir: &Path, request_path: &str) -> ResolvedTarget {
    let rel = normalize_request_path(request_path);
    let absolute = source_dir.join(&rel);

    match fs::metadata(&absolute).await {
        Ok(meta) if !meta.is_dir() => ResolvedTarget::ServeFile(absolute),
        _ if rel == "." => ResolvedTarget::RootPage,
        _ => ResolvedTarget::ListDirectory(rel),
    }
}
