//! Unit tests for the bridge dispatcher, covering every method handled by `handle_method`.
//!
//! These go through the same code path as the webview IPC handler and the
//! `pulseflow-rpc` binary, with the config file in a temporary directory.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use pulseflow::app::App;
use pulseflow::bridge::{base64_decode, base64_encode, handle_method};
use pulseflow::services::config_store::ConfigStore;
use pulseflow::services::dialog::{DirectoryPicker, HeadlessPicker};
use pulseflow::types::errors::FsError;
use serde_json::json;
use tempfile::TempDir;

/// Create a fresh App whose config lives in a temp directory.
fn setup() -> (App, TempDir) {
    setup_with(Box::new(HeadlessPicker))
}

fn setup_with(picker: Box<dyn DirectoryPicker>) -> (App, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let store = ConfigStore::with_path(tmp.path().join("cfg").join("config.json"));
    (App::with_parts(store, picker), tmp)
}

struct StubPicker(Option<&'static str>);

impl DirectoryPicker for StubPicker {
    fn pick_directory(&self, _title: &str) -> Result<Option<PathBuf>, FsError> {
        Ok(self.0.map(PathBuf::from))
    }
}

/// Blocks inside the dialog until released, like a user taking their time.
struct SlowPicker {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl DirectoryPicker for SlowPicker {
    fn pick_directory(&self, _title: &str) -> Result<Option<PathBuf>, FsError> {
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok(Some(PathBuf::from("/slow")))
    }
}

// ─── Ping / unknown ───

#[test]
fn test_ping() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "ping", &json!({})).unwrap();
    assert_eq!(res, json!({"pong": true}));
}

#[test]
fn test_unknown_method_returns_error() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "nonexistent.method", &json!({}));
    assert_eq!(res.unwrap_err(), "unknown method: nonexistent.method");
}

#[test]
fn test_greet() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "app.greet", &json!({"name": "Ada"})).unwrap();
    assert_eq!(res, json!("Hello Ada, It's show time!"));
    assert_eq!(
        handle_method(&app, "app.greet", &json!({})).unwrap_err(),
        "missing name"
    );
}

// ─── Config ───

#[test]
fn test_config_get_creates_defaults() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "config.get", &json!({})).unwrap();
    assert_eq!(
        res,
        json!({"setup_done": false, "version": 1, "music_directories": []})
    );
}

#[test]
fn test_config_save_then_get() {
    let (app, _tmp) = setup();
    let config = json!({"setup_done": true, "version": 1, "music_directories": ["/music"]});
    let res = handle_method(&app, "config.save", &json!({"config": config})).unwrap();
    assert_eq!(res, json!({"ok": true}));

    let loaded = handle_method(&app, "config.get", &json!({})).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_save_rejects_bad_shape() {
    let (app, _tmp) = setup();
    assert_eq!(
        handle_method(&app, "config.save", &json!({})).unwrap_err(),
        "missing config"
    );
    let err = handle_method(
        &app,
        "config.save",
        &json!({"config": {"setup_done": "nope"}}),
    )
    .unwrap_err();
    assert!(err.starts_with("invalid config"));
}

#[test]
fn test_config_reset() {
    let (app, _tmp) = setup();
    handle_method(
        &app,
        "config.save",
        &json!({"config": {"setup_done": true, "version": 5, "music_directories": ["/a"]}}),
    )
    .unwrap();

    let res = handle_method(&app, "config.reset", &json!({})).unwrap();
    assert_eq!(
        res,
        json!({"setup_done": false, "version": 1, "music_directories": []})
    );
    assert_eq!(handle_method(&app, "config.get", &json!({})).unwrap(), res);
}

// ─── Filesystem ───

#[test]
fn test_walk_dir_and_audio_files() {
    let (app, tmp) = setup();
    let music = tmp.path().join("music");
    std::fs::create_dir_all(&music).unwrap();
    std::fs::write(music.join("a.mp3"), b"a").unwrap();
    std::fs::write(music.join("notes.txt"), b"n").unwrap();

    let all = handle_method(&app, "fs.walk_dir", &json!({"path": music})).unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);

    let audio = handle_method(&app, "fs.list_audio_files", &json!({"path": music})).unwrap();
    let audio = audio.as_array().unwrap();
    assert_eq!(audio.len(), 1);
    assert!(audio[0].as_str().unwrap().ends_with("a.mp3"));
}

#[test]
fn test_walk_dir_errors_are_strings() {
    let (app, tmp) = setup();
    let res = handle_method(
        &app,
        "fs.walk_dir",
        &json!({"path": tmp.path().join("missing")}),
    );
    assert!(res.is_err());
    assert!(handle_method(&app, "fs.walk_dir", &json!({})).is_err());
}

#[test]
fn test_split_and_join() {
    let (app, _tmp) = setup();
    let parts = handle_method(&app, "fs.split_path", &json!({"path": "a/b/c"})).unwrap();
    assert_eq!(parts, json!(["a", "b", "c"]));

    let joined = handle_method(&app, "fs.join_path", &json!({"paths": ["a", "b"]})).unwrap();
    assert_eq!(
        joined,
        json!(format!("a{}b", std::path::MAIN_SEPARATOR))
    );

    assert!(handle_method(&app, "fs.join_path", &json!({"paths": [1, 2]})).is_err());
    assert!(handle_method(&app, "fs.join_path", &json!({})).is_err());
}

#[test]
fn test_pick_directory_headless_rejects() {
    let (app, _tmp) = setup();
    let err = handle_method(&app, "fs.pick_directory", &json!({"title": "Music"})).unwrap_err();
    assert!(err.contains("unavailable"));
}

#[test]
fn test_pick_directory_cancel_is_empty_string() {
    let (app, _tmp) = setup_with(Box::new(StubPicker(None)));
    let res = handle_method(&app, "fs.pick_directory", &json!({})).unwrap();
    assert_eq!(res, json!(""));
}

#[test]
fn test_pick_directory_returns_choice() {
    let (app, _tmp) = setup_with(Box::new(StubPicker(Some("/srv/music"))));
    let res = handle_method(&app, "fs.pick_directory", &json!({"title": "Pick"})).unwrap();
    assert_eq!(
        PathBuf::from(res.as_str().unwrap()),
        PathBuf::from("/srv/music")
    );
}

#[test]
fn test_show_in_folder_requires_path() {
    let (app, _tmp) = setup();
    assert_eq!(
        handle_method(&app, "fs.show_in_folder", &json!({})).unwrap_err(),
        "missing path"
    );
}

// ─── Local files ───

#[test]
fn test_localroot_post_then_get() {
    let (app, tmp) = setup();
    let file = tmp.path().join("saved lyrics.txt");

    let res = handle_method(
        &app,
        "localroot.post",
        &json!({"path": file, "body": base64_encode(b"la la la")}),
    )
    .unwrap();
    assert_eq!(res["status"], 201);

    let res = handle_method(&app, "localroot.get", &json!({"path": file})).unwrap();
    assert_eq!(res["status"], 200);
    assert_eq!(res["content_type"], "text/plain");
    let body = base64_decode(res["body"].as_str().unwrap()).unwrap();
    assert_eq!(body, b"la la la");
}

#[test]
fn test_localroot_get_range() {
    let (app, tmp) = setup();
    let file = tmp.path().join("digits");
    std::fs::write(&file, "0123456789").unwrap();

    let res = handle_method(
        &app,
        "localroot.get",
        &json!({"path": file, "range": "bytes=7-"}),
    )
    .unwrap();
    assert_eq!(res["status"], 206);
    assert_eq!(base64_decode(res["body"].as_str().unwrap()).unwrap(), b"789");
}

#[test]
fn test_localroot_get_missing() {
    let (app, tmp) = setup();
    let res = handle_method(
        &app,
        "localroot.get",
        &json!({"path": tmp.path().join("nope.mp3")}),
    )
    .unwrap();
    assert_eq!(res["status"], 404);
    assert_eq!(res["body"], "");
}

#[test]
fn test_localroot_post_bad_base64() {
    let (app, tmp) = setup();
    let res = handle_method(
        &app,
        "localroot.post",
        &json!({"path": tmp.path().join("x"), "body": "***"}),
    );
    assert!(res.unwrap_err().contains("base64"));
}

// ─── Concurrency ───

#[test]
fn test_calls_do_not_wait_on_a_slow_call() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let picker = SlowPicker {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let (app, _tmp) = setup_with(Box::new(picker));
    let app = Arc::new(app);

    let slow_app = Arc::clone(&app);
    let slow = thread::spawn(move || handle_method(&slow_app, "fs.pick_directory", &json!({})));
    entered_rx.recv().unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let fast_app = Arc::clone(&app);
    thread::spawn(move || {
        let res = handle_method(&fast_app, "fs.split_path", &json!({"path": "a/b"}));
        done_tx.send(res).unwrap();
    });
    let res = done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("split_path waited on the open dialog");
    assert_eq!(res.unwrap(), json!(["a", "b"]));

    release_tx.send(()).unwrap();
    let picked = slow.join().unwrap().unwrap();
    assert_eq!(PathBuf::from(picked.as_str().unwrap()), PathBuf::from("/slow"));
}
