//! Method dispatcher for the PulseFlow front-end bridge.
//!
//! Shared by the webview IPC handler and the stdio RPC server. `handle_method`
//! maps a method name plus JSON params onto an [`App`] call and returns the
//! JSON result, or the error's display string for the caller to reject with.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use http::header::{CONTENT_TYPE, RANGE};
use http::{Method, Request};
use serde_json::{json, Value};

use crate::app::App;
use crate::services::file_loader::{FileLoader, LOCAL_ROOT_PREFIX};
use crate::types::config::Config;

/// Encode bytes to base64 string.
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

/// Decode base64 string to bytes.
pub fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    BASE64
        .decode(input)
        .map_err(|e| format!("base64 decode error: {}", e))
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

/// Dispatch a bridge method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
/// Calls share `app` by reference and may run concurrently.
pub fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        "app.greet" => {
            let name = str_param(params, "name")?;
            Ok(json!(app.greet(name)))
        }

        // ─── Config ───
        "config.get" => {
            let config = app.get_or_create_config().map_err(|e| e.to_string())?;
            serde_json::to_value(config).map_err(|e| e.to_string())
        }
        "config.save" => {
            let raw = params.get("config").cloned().ok_or("missing config")?;
            let config: Config =
                serde_json::from_value(raw).map_err(|e| format!("invalid config: {}", e))?;
            app.save_config(&config).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "config.reset" => {
            let config = app.reset_config().map_err(|e| e.to_string())?;
            serde_json::to_value(config).map_err(|e| e.to_string())
        }

        // ─── Filesystem ───
        "fs.walk_dir" => {
            let path = str_param(params, "path")?;
            let files = app.walk_dir(path).map_err(|e| e.to_string())?;
            Ok(json!(files))
        }
        "fs.list_audio_files" => {
            let path = str_param(params, "path")?;
            let files = app.list_audio_files(path).map_err(|e| e.to_string())?;
            Ok(json!(files))
        }
        "fs.home_dir" => {
            Ok(json!(app.get_home_dir().map_err(|e| e.to_string())?))
        }
        "fs.pick_directory" => {
            let title = params.get("title").and_then(|v| v.as_str()).unwrap_or("");
            Ok(json!(app.pick_directory(title).map_err(|e| e.to_string())?))
        }
        "fs.split_path" => {
            let path = str_param(params, "path")?;
            Ok(json!(app.split_path(path)))
        }
        "fs.join_path" => {
            let paths = params
                .get("paths")
                .and_then(|v| v.as_array())
                .ok_or("missing paths")?;
            let segments = paths
                .iter()
                .map(|v| v.as_str().ok_or("paths must be strings"))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(json!(app.join_path(segments.as_slice())))
        }
        "fs.cache_dir" => {
            Ok(json!(app.get_or_create_cache_dir().map_err(|e| e.to_string())?))
        }
        "fs.show_in_folder" => {
            let path = str_param(params, "path")?;
            app.show_in_folder(path).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Local files (for hosts without the custom protocol) ───
        "localroot.get" => {
            let path = str_param(params, "path")?;
            let mut builder = Request::builder()
                .method(Method::GET)
                .uri(localroot_uri(path));
            if let Some(range) = params.get("range").and_then(|v| v.as_str()) {
                builder = builder.header(RANGE, range);
            }
            let request = builder.body(Vec::new()).map_err(|e| e.to_string())?;
            let response = FileLoader::new().handle(&request);
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            Ok(json!({
                "status": response.status().as_u16(),
                "content_type": content_type,
                "body": base64_encode(response.body()),
            }))
        }
        "localroot.post" => {
            let path = str_param(params, "path")?;
            let body = base64_decode(str_param(params, "body")?)?;
            let request = Request::builder()
                .method(Method::POST)
                .uri(localroot_uri(path))
                .body(body)
                .map_err(|e| e.to_string())?;
            let response = FileLoader::new().handle(&request);
            Ok(json!({"status": response.status().as_u16()}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

/// Builds the request URI for a filesystem path, percent-encoding what a URI cannot hold.
fn localroot_uri(path: &str) -> String {
    use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

    const PATH_SET: &AsciiSet = &CONTROLS
        .add(b' ')
        .add(b'"')
        .add(b'#')
        .add(b'%')
        .add(b'<')
        .add(b'>')
        .add(b'?')
        .add(b'[')
        .add(b'\\')
        .add(b']')
        .add(b'^')
        .add(b'`')
        .add(b'{')
        .add(b'|')
        .add(b'}');

    let sep = if path.starts_with('/') { "" } else { "/" };
    format!(
        "{}{}{}",
        LOCAL_ROOT_PREFIX,
        sep,
        utf8_percent_encode(path, PATH_SET)
    )
}
