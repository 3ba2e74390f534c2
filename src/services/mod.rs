// PulseFlow services
// Config persistence, filesystem helpers, the directory dialog and the
// webview-facing asset/file handlers.

pub mod asset_server;
pub mod config_store;
pub mod dialog;
pub mod file_loader;
pub mod file_system;
