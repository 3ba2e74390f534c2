// PulseFlow asset server
// Serves the built front-end bundle to the webview. Requests that do not match
// a bundled file fall through to the `/localroot` file loader.

use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use tracing::{debug, info};

use crate::services::file_loader::{FileLoader, LOCAL_ROOT_PREFIX, NOT_FOUND_PATH};

/// Environment variable that points at the front-end bundle.
pub const FRONTEND_DIR_ENV: &str = "PULSEFLOW_FRONTEND_DIR";

/// Bundle location relative to the working directory or executable.
const DEFAULT_FRONTEND_DIR: &str = "frontend/build";

const PLACEHOLDER_INDEX: &str = include_str!("../../resources/ui/index.html");
const PLACEHOLDER_404: &str = include_str!("../../resources/ui/404.html");

/// Front-end asset server with a file-loader fallback.
pub struct AssetServer {
    root: Option<PathBuf>,
    loader: FileLoader,
}

impl AssetServer {
    /// Creates a server for the bundle at `root` (`None` serves only the placeholder pages).
    pub fn new(root: Option<PathBuf>) -> Self {
        if let Some(dir) = &root {
            info!(dir = %dir.display(), "serving front-end bundle");
        } else {
            info!("no front-end bundle found, serving placeholder");
        }
        Self {
            root,
            loader: FileLoader::new(),
        }
    }

    /// Finds the bundle: explicit override, `PULSEFLOW_FRONTEND_DIR`, then
    /// `frontend/build` under the working directory or next to the executable.
    pub fn locate_bundle(explicit: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(dir) = explicit {
            return Some(dir);
        }
        if let Some(dir) = env::var_os(FRONTEND_DIR_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(dir));
        }
        let cwd_candidate = PathBuf::from(DEFAULT_FRONTEND_DIR);
        if cwd_candidate.is_dir() {
            return Some(cwd_candidate);
        }
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join(DEFAULT_FRONTEND_DIR)))
            .filter(|p| p.is_dir())
    }

    /// Handles one webview request.
    pub fn handle(&self, request: &Request<Vec<u8>>) -> Response<Vec<u8>> {
        let path = request.uri().path();
        let is_read = request.method() == Method::GET || request.method() == Method::HEAD;

        if is_read && !path.starts_with(LOCAL_ROOT_PREFIX) {
            if let Some(response) = self.serve_bundled(path) {
                return response;
            }
            if let Some(response) = serve_placeholder(path) {
                return response;
            }
        }

        self.loader.handle(request)
    }

    fn serve_bundled(&self, path: &str) -> Option<Response<Vec<u8>>> {
        let root = self.root.as_ref()?;
        let decoded = percent_decode_str(path).decode_utf8().ok()?;
        let relative = bundle_relative(&decoded)?;
        let file = root.join(&relative);

        let file = if file.is_dir() {
            file.join("index.html")
        } else {
            file
        };
        let data = fs::read(&file).ok()?;
        let mime = mime_guess::from_path(&file).first_or_octet_stream();
        debug!(path, file = %file.display(), "bundled asset");
        Some(with_body(StatusCode::OK, mime.essence_str(), data))
    }
}

/// Maps a URL path to a path inside the bundle. Returns `None` for paths that
/// would leave the bundle root.
fn bundle_relative(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Some(PathBuf::from("index.html"));
    }
    let candidate = Path::new(trimmed);
    let safe = candidate
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    safe.then(|| candidate.to_path_buf())
}

fn serve_placeholder(path: &str) -> Option<Response<Vec<u8>>> {
    match path {
        "/" | "/index.html" => Some(with_body(
            StatusCode::OK,
            "text/html; charset=utf-8",
            PLACEHOLDER_INDEX.as_bytes().to_vec(),
        )),
        // The loader redirects here; answering directly stops a redirect loop.
        p if p == NOT_FOUND_PATH => Some(with_body(
            StatusCode::NOT_FOUND,
            "text/html; charset=utf-8",
            PLACEHOLDER_404.as_bytes().to_vec(),
        )),
        _ => None,
    }
}

fn with_body(status: StatusCode, mime: &str, body: Vec<u8>) -> Response<Vec<u8>> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Ok(value) = mime.parse() {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
}
