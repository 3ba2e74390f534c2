// PulseFlow filesystem helpers
// Thin wrappers over directory walking, path splitting/joining and the
// platform home/cache directories, exposed to the front-end through the bridge.

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};
use std::process::Command;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::platform;
use crate::types::errors::FsError;

/// File extensions the player can decode.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "wave", "mp3", "m4a", "aac", "ogg", "flac", "webm", "caf",
];

/// Returns every non-directory entry below `root`, depth first, sorted by file name.
///
/// The first I/O error aborts the walk.
pub fn walk_dir(root: impl AsRef<Path>) -> Result<Vec<String>, FsError> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            files.push(entry.path().to_string_lossy().into_owned());
        }
    }
    debug!(root = %root.display(), count = files.len(), "walked directory");
    Ok(files)
}

/// Returns true if the path has one of [`AUDIO_EXTENSIONS`] (case-insensitive).
pub fn is_audio_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Like [`walk_dir`], keeping only audio files.
pub fn list_audio_files(root: impl AsRef<Path>) -> Result<Vec<String>, FsError> {
    Ok(walk_dir(root)?
        .into_iter()
        .filter(|f| is_audio_file(f))
        .collect())
}

/// Splits a path into its segments after normalising separators to `/`.
///
/// Empty segments are kept, so an absolute Unix path starts with `""`.
pub fn split_path(path: &str) -> Vec<String> {
    let slashed = if MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(MAIN_SEPARATOR, "/")
    };
    slashed.split('/').map(str::to_string).collect()
}

/// Joins segments with the platform separator. No normalisation is applied.
pub fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<&str>>()
        .join(MAIN_SEPARATOR_STR)
}

/// Returns the user's home directory.
pub fn home_dir() -> Result<PathBuf, FsError> {
    platform::get_home_dir().ok_or(FsError::NoHomeDir)
}

/// Returns `<cache dir>/pulseflow`, creating it if needed.
pub fn get_or_create_cache_dir() -> Result<PathBuf, FsError> {
    let dir = platform::get_cache_dir().ok_or(FsError::NoCacheDir)?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Creates `dir` and its parents if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), FsError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| FsError::io(dir, e))?;
        info!(dir = %dir.display(), "created directory");
    }
    Ok(())
}

/// Reveals `path` in the platform file manager.
pub fn show_in_folder(path: &str) -> Result<(), FsError> {
    let command = reveal_command(path);
    let mut iter = command.iter();
    let program = iter.next().ok_or_else(|| FsError::Launch("no file manager".into()))?;
    Command::new(program)
        .args(iter)
        .spawn()
        .map_err(|e| FsError::Launch(format!("{}: {}", program, e)))?;
    info!(path, "revealed in file manager");
    Ok(())
}

/// Builds the program and arguments used by [`show_in_folder`].
pub fn reveal_command(path: &str) -> Vec<String> {
    #[cfg(target_os = "windows")]
    {
        // The comma after /select is part of the switch.
        vec!["explorer".into(), "/select,".into(), path.into()]
    }
    #[cfg(target_os = "macos")]
    {
        if Path::new(path).is_dir() {
            vec!["open".into(), path.into()]
        } else {
            vec!["open".into(), "-R".into(), path.into()]
        }
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let target = Path::new(path);
        let dir = if target.is_dir() {
            target.to_path_buf()
        } else {
            target
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| target.to_path_buf())
        };
        vec!["xdg-open".into(), dir.to_string_lossy().into_owned()]
    }
}
