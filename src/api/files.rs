use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Root of the `/app` file server plus the store files it must never serve.
///
/// Hidden files are compared by resolved path, so a store that lives inside
/// the static root (or is reached through a symlink) stays private.
#[derive(Clone)]
pub struct StaticFiles {
    root: PathBuf,
    hidden: Arc<[PathBuf]>,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, hidden: &[PathBuf]) -> Self {
        Self {
            root: root.into(),
            hidden: hidden.iter().map(|p| resolve_parent(p)).collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `request_path`, relative to the mount point, lands on a hidden file.
    pub async fn is_hidden(&self, request_path: &str) -> bool {
        // Anything the file server could not decode either is refused here.
        let Ok(decoded) = urlencoding::decode(request_path) else {
            return true;
        };

        let mut candidate = self.root.clone();
        for component in Path::new(decoded.as_ref()).components() {
            match component {
                Component::Normal(part) => candidate.push(part),
                Component::RootDir | Component::CurDir => {}
                // `..` never reaches the disk: the file server rejects it.
                Component::ParentDir | Component::Prefix(_) => return false,
            }
        }

        if self.hidden.contains(&resolve_parent(&candidate)) {
            return true;
        }
        match tokio::fs::canonicalize(&candidate).await {
            Ok(resolved) => self.hidden.contains(&resolved),
            Err(_) => false,
        }
    }
}

/// Canonical parent directory joined with the file name. Works for files that
/// do not exist yet, such as the store's temp sibling between writes.
fn resolve_parent(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (std::fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Answers 404 for requests that would reach the document store through `/app`.
pub async fn hide_store_files(
    State(files): State<StaticFiles>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let relative = path.strip_prefix("/app").unwrap_or(path);

    if files.is_hidden(relative).await {
        tracing::warn!(path, "refused to serve a store file");
        return StatusCode::NOT_FOUND.into_response();
    }

    next.run(request).await
}
