//! `/localroot` file handler.
//!
//! Maps request paths under `/localroot` onto the local filesystem so the
//! front-end can stream audio, load cover art and write small files:
//!
//! - `GET /localroot/home/me/a.flac` reads `/home/me/a.flac` and returns it with a
//!   sniffed `Content-Type` (single `Range` requests get a `206`).
//! - `POST /localroot/home/me/cover.jpg` writes the request body to that path.
//! - Any other prefix is redirected to `/404`.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use http::header::{
    ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
    LOCATION, RANGE,
};
use http::response::Builder;
use http::{Method, Request, Response, StatusCode};
use http_range::HttpRange;
use percent_encoding::percent_decode_str;
use tracing::{debug, error, warn};

use crate::types::errors::LoaderError;

/// URL prefix that maps onto the filesystem root.
pub const LOCAL_ROOT_PREFIX: &str = "/localroot";

/// Redirect target for anything outside [`LOCAL_ROOT_PREFIX`].
pub const NOT_FOUND_PATH: &str = "/404";

/// Bytes inspected when sniffing the type of a partial response.
const SNIFF_LEN: u64 = 8192;

/// Serves and writes local files for the embedded front-end.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Handles one request. Never panics: a panic while building the response
    /// is logged and turned into a `500`.
    pub fn handle(&self, request: &Request<Vec<u8>>) -> Response<Vec<u8>> {
        recover(request.uri().path(), || self.respond(request))
    }

    fn respond(&self, request: &Request<Vec<u8>>) -> Response<Vec<u8>> {
        let requested = decode_path(request.uri().path());

        let Some(file_path) = requested.strip_prefix(LOCAL_ROOT_PREFIX) else {
            debug!(path = %requested, "outside local root, redirecting");
            return finish(
                Response::builder()
                    .status(StatusCode::SEE_OTHER)
                    .header(LOCATION, NOT_FOUND_PATH),
                Vec::new(),
            );
        };
        let file_path = to_fs_path(file_path);

        let result = if request.method() == Method::POST {
            write_file(&file_path, request.body())
        } else {
            let range = request.headers().get(RANGE).and_then(|v| v.to_str().ok());
            read_file(&file_path, range)
        };

        result.unwrap_or_else(|e| error_response(&e, &requested))
    }
}

/// Runs `build`, turning a panic into a logged `500`.
fn recover<F>(path: &str, build: F) -> Response<Vec<u8>>
where
    F: FnOnce() -> Response<Vec<u8>>,
{
    match panic::catch_unwind(AssertUnwindSafe(build)) {
        Ok(response) => response,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(path, %reason, "recovered from panic while serving file");
            status_only(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Outcome of interpreting a `Range` header against a file length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable range: send the whole file.
    Full,
    /// Inclusive byte range `start..=end`.
    Partial { start: u64, end: u64 },
    /// The range cannot be served for this length.
    Unsatisfiable,
}

/// Largest body sent for one range request. Players ask for the rest as they go.
pub const MAX_RANGE_LEN: u64 = 1000 * 1024;

/// Interprets a `Range` header. Only single ranges are honoured; a list of
/// ranges falls back to the full body. A satisfiable range is cut down to
/// [`MAX_RANGE_LEN`] bytes.
pub fn resolve_range(header: Option<&str>, len: u64) -> RangeRequest {
    let Some(header) = header.map(str::trim).filter(|h| !h.is_empty()) else {
        return RangeRequest::Full;
    };
    let Ok(ranges) = HttpRange::parse(header, len) else {
        return RangeRequest::Unsatisfiable;
    };

    match ranges.as_slice() {
        [] => RangeRequest::Unsatisfiable,
        [range] => {
            if range.length == 0 || range.start >= len {
                return RangeRequest::Unsatisfiable;
            }
            let start = range.start;
            let end = start + (range.length - 1).min(MAX_RANGE_LEN - 1);
            RangeRequest::Partial {
                start,
                end: end.min(len - 1),
            }
        }
        _ => RangeRequest::Full,
    }
}

/// Picks the `Content-Type` for a file body.
///
/// Content sniffing wins; the extension and a UTF-8 check are fallbacks.
/// M4A audio is reported as `video/mp4` so webviews agree to play it.
pub fn detect_content_type(data: &[u8], path: &Path) -> String {
    let mime = infer::get(data)
        .map(|kind| kind.mime_type().to_string())
        .or_else(|| {
            mime_guess::from_path(path)
                .first()
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| {
            if looks_like_text(data) {
                "text/plain; charset=utf-8".to_string()
            } else {
                "application/octet-stream".to_string()
            }
        });

    match mime.as_str() {
        "audio/x-m4a" | "audio/m4a" => "video/mp4".to_string(),
        _ => mime,
    }
}

fn looks_like_text(data: &[u8]) -> bool {
    match std::str::from_utf8(data) {
        Ok(_) => true,
        // A multi-byte character cut off at the end of a sniff window is fine.
        Err(e) => e.error_len().is_none(),
    }
}

fn decode_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Turns the part after `/localroot` into a filesystem path.
fn to_fs_path(stripped: &str) -> PathBuf {
    // `/C:/Users/...` must lose its leading slash on Windows.
    #[cfg(windows)]
    {
        let bytes = stripped.as_bytes();
        if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' {
            return PathBuf::from(&stripped[1..]);
        }
    }
    PathBuf::from(stripped)
}

fn write_file(path: &Path, body: &[u8]) -> Result<Response<Vec<u8>>, LoaderError> {
    fs::write(path, body).map_err(|source| LoaderError::WriteFailed {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), bytes = body.len(), "wrote file");
    Ok(status_only(StatusCode::CREATED))
}

fn read_file(path: &Path, range: Option<&str>) -> Result<Response<Vec<u8>>, LoaderError> {
    let not_found = || LoaderError::NotFound(path.display().to_string());

    let metadata = fs::metadata(path).map_err(|_| not_found())?;
    if metadata.is_dir() {
        return Err(not_found());
    }
    let len = metadata.len();

    match resolve_range(range, len) {
        RangeRequest::Full => {
            let data = fs::read(path).map_err(|_| not_found())?;
            let mime = detect_content_type(&data, path);
            Ok(finish(
                file_headers(Response::builder().status(StatusCode::OK), &mime)
                    .header(CONTENT_LENGTH, data.len()),
                data,
            ))
        }
        RangeRequest::Partial { start, end } => {
            let mut file = File::open(path).map_err(|_| not_found())?;

            let mut head = Vec::new();
            (&mut file)
                .take(SNIFF_LEN.min(len))
                .read_to_end(&mut head)
                .map_err(|_| not_found())?;
            let mime = detect_content_type(&head, path);

            let wanted = end - start + 1;
            let mut buf = Vec::with_capacity(usize::try_from(wanted).unwrap_or(0));
            file.seek(SeekFrom::Start(start)).map_err(|_| not_found())?;
            file.take(wanted)
                .read_to_end(&mut buf)
                .map_err(|_| not_found())?;

            Ok(finish(
                file_headers(Response::builder().status(StatusCode::PARTIAL_CONTENT), &mime)
                    .header(CONTENT_RANGE, format!("bytes {start}-{end}/{len}"))
                    .header(CONTENT_LENGTH, buf.len()),
                buf,
            ))
        }
        RangeRequest::Unsatisfiable => Err(LoaderError::RangeNotSatisfiable(len)),
    }
}

fn file_headers(builder: Builder, mime: &str) -> Builder {
    builder
        .header(CONTENT_TYPE, mime)
        .header(ACCEPT_RANGES, "bytes")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*")
}

fn error_response(err: &LoaderError, requested: &str) -> Response<Vec<u8>> {
    match err {
        LoaderError::NotFound(_) => {
            debug!(path = requested, "file not found");
            status_only(StatusCode::NOT_FOUND)
        }
        LoaderError::WriteFailed { .. } => {
            warn!(path = requested, error = %err, "write rejected");
            finish(
                Response::builder().status(StatusCode::BAD_REQUEST),
                requested.as_bytes().to_vec(),
            )
        }
        LoaderError::RangeNotSatisfiable(len) => finish(
            Response::builder()
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(CONTENT_RANGE, format!("bytes */{len}")),
            Vec::new(),
        ),
    }
}

fn status_only(status: StatusCode) -> Response<Vec<u8>> {
    let mut response = Response::new(Vec::new());
    *response.status_mut() = status;
    response
}

fn finish(builder: Builder, body: Vec<u8>) -> Response<Vec<u8>> {
    builder.body(body).unwrap_or_else(|e| {
        error!(error = %e, "invalid response headers");
        status_only(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// Converts a response for hosts that want a borrowed-or-owned body (wry).
pub fn into_cow_response(response: Response<Vec<u8>>) -> Response<Cow<'static, [u8]>> {
    response.map(Cow::Owned)
}
