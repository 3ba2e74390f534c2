//! PulseFlow desktop shell.
//!
//! Uses `wry` for cross-platform WebView rendering:
//! - Windows: WebView2
//! - Linux: WebKitGTK
//! - macOS: WKWebView
//!
//! The media-library UI is a web front-end rendered inside the WebView.
//! Bound methods travel over wry IPC; files and assets over a custom protocol.

pub mod webview_app;
