//! Desktop shell using `wry` + `tao`.
//!
//! Architecture:
//! - The front-end bundle and `/localroot` files are served through the
//!   `pulseflow://` custom protocol (`AssetServer`, falling back to `FileLoader`).
//! - `with_initialization_script(BRIDGE_JS)` installs `window.go.main.App`,
//!   whose methods post `{id, method, params}` via `window.ipc.postMessage()`.
//! - Results come back as `window.__pf_resolve(id, value)` or
//!   `window.__pf_reject(id, message)` evaluated on the event-loop thread.
//! - Bound calls run on worker threads; the directory dialog runs on the
//!   event-loop thread.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use serde_json::Value;
use tao::dpi::LogicalSize;
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::WindowBuilder;
use tracing::{debug, info, warn};
use wry::WebViewBuilder;

use crate::app::App;
use crate::bridge::handle_method;
use crate::platform::CONFIG_FILE_NAME;
use crate::services::asset_server::AssetServer;
use crate::services::config_store::ConfigStore;
use crate::services::dialog;
use crate::services::file_loader::into_cow_response;

const BRIDGE_JS: &str = include_str!("../../resources/ui/bridge.js");

const PROTOCOL: &str = "pulseflow";

#[cfg(not(target_os = "windows"))]
const START_URL: &str = "pulseflow://localhost/";
// WebView2 exposes custom protocols as http://<scheme>.localhost
#[cfg(target_os = "windows")]
const START_URL: &str = "http://pulseflow.localhost/";

const BACKGROUND: (u8, u8, u8, u8) = (18, 18, 18, 255);

/// Options for the desktop shell.
#[derive(Debug, Default, Clone)]
pub struct ShellOptions {
    /// Front-end bundle directory; located automatically when `None`.
    pub frontend_dir: Option<PathBuf>,
    /// Directory holding `config.json`; platform default when `None`.
    pub config_dir: Option<PathBuf>,
    /// Enable webview developer tools.
    pub devtools: bool,
}

#[derive(Debug)]
enum UserEvent {
    /// Settle a pending front-end promise.
    Settle { id: u64, result: Result<Value, String> },
    /// Open the directory dialog for call `id`.
    PickDirectory { id: u64, title: String },
}

/// One bound call posted by the front-end.
#[derive(Debug)]
struct BridgeCall {
    id: u64,
    method: String,
    params: Value,
}

fn parse_call(message: &str) -> Option<BridgeCall> {
    let msg: Value = serde_json::from_str(message).ok()?;
    Some(BridgeCall {
        id: msg.get("id")?.as_u64()?,
        method: msg.get("method")?.as_str()?.to_string(),
        params: msg.get("params").cloned().unwrap_or(Value::Null),
    })
}

/// Builds the script that resolves or rejects promise `id`.
fn settle_script(id: u64, result: &Result<Value, String>) -> String {
    match result {
        Ok(value) => format!("window.__pf_resolve({}, {})", id, value),
        Err(message) => format!(
            "window.__pf_reject({}, {})",
            id,
            Value::String(message.clone())
        ),
    }
}

// ─── IPC handler ───

fn handle_ipc(state: &Arc<App>, proxy: &EventLoopProxy<UserEvent>, message: &str) {
    let Some(call) = parse_call(message) else {
        warn!("malformed bridge message");
        return;
    };
    debug!(id = call.id, method = %call.method, "bridge call");

    if call.method == "fs.pick_directory" {
        let title = call
            .params
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let _ = proxy.send_event(UserEvent::PickDirectory { id: call.id, title });
        return;
    }

    let state = state.clone();
    let proxy = proxy.clone();
    thread::spawn(move || {
        let result = handle_method(&state, &call.method, &call.params);
        if let Err(e) = &result {
            debug!(method = %call.method, error = %e, "bridge call rejected");
        }
        let _ = proxy.send_event(UserEvent::Settle { id: call.id, result });
    });
}

fn open_app(options: &ShellOptions) -> anyhow::Result<App> {
    let store = match &options.config_dir {
        Some(dir) => ConfigStore::with_path(dir.join(CONFIG_FILE_NAME)),
        None => ConfigStore::new().context("Failed to locate the config directory")?,
    };
    Ok(App::with_parts(store, dialog::default_picker()))
}

// ─── Main entry point ───

pub fn run(options: ShellOptions) -> anyhow::Result<()> {
    let app = open_app(&options)?;
    let state = Arc::new(app);
    let assets = AssetServer::new(AssetServer::locate_bundle(options.frontend_dir.clone()));

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window_builder = WindowBuilder::new()
        .with_title("PulseFlow")
        .with_inner_size(LogicalSize::new(1024.0, 768.0));

    #[cfg(target_os = "macos")]
    let window_builder = {
        use tao::platform::macos::WindowBuilderExtMacOS;
        window_builder
            .with_titlebar_transparent(true)
            .with_title_hidden(true)
            .with_fullsize_content_view(true)
    };

    let window = window_builder
        .build(&event_loop)
        .context("Failed to create window")?;

    let ipc_state = state.clone();
    let ipc_proxy = proxy.clone();

    let builder = WebViewBuilder::new()
        .with_custom_protocol(PROTOCOL.into(), move |_wv_id, request| {
            into_cow_response(assets.handle(&request))
        })
        .with_initialization_script(BRIDGE_JS)
        .with_url(START_URL)
        .with_background_color(BACKGROUND)
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            handle_ipc(&ipc_state, &ipc_proxy, msg.body());
        })
        .with_devtools(options.devtools || cfg!(debug_assertions));

    #[cfg(target_os = "linux")]
    let webview = {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window
            .default_vbox()
            .context("Failed to get GTK vbox")?;
        builder.build_gtk(vbox).context("Failed to create WebView")?
    };

    #[cfg(not(target_os = "linux"))]
    let webview = builder.build(&window).context("Failed to create WebView")?;

    info!(url = START_URL, "window ready");

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("window closed");
                *control_flow = ControlFlow::Exit;
            }

            Event::UserEvent(UserEvent::Settle { id, result }) => {
                if let Err(e) = webview.evaluate_script(&settle_script(id, &result)) {
                    warn!(id, error = %e, "failed to deliver bridge result");
                }
            }

            Event::UserEvent(UserEvent::PickDirectory { id, title }) => {
                let result = state
                    .pick_directory(&title)
                    .map(Value::String)
                    .map_err(|e| e.to_string());
                if let Err(e) = webview.evaluate_script(&settle_script(id, &result)) {
                    warn!(id, error = %e, "failed to deliver bridge result");
                }
            }

            _ => {}
        }
    });
}
