// Native directory picker.
// The native implementation needs a GUI build; headless builds (the stdio RPC
// server, tests) get a picker that reports the dialog as unavailable.

use std::path::PathBuf;

use crate::types::errors::FsError;

/// Opens a "choose directory" dialog.
pub trait DirectoryPicker: Send + Sync {
    /// Returns the chosen directory, or `None` if the user cancelled.
    fn pick_directory(&self, title: &str) -> Result<Option<PathBuf>, FsError>;
}

/// Picker used when no windowing system is available.
pub struct HeadlessPicker;

impl DirectoryPicker for HeadlessPicker {
    fn pick_directory(&self, _title: &str) -> Result<Option<PathBuf>, FsError> {
        Err(FsError::DialogUnavailable(
            "this build has no GUI support".to_string(),
        ))
    }
}

/// Native dialog via `rfd`. Must be called from the event-loop thread.
#[cfg(feature = "gui")]
pub struct NativePicker;

#[cfg(feature = "gui")]
impl DirectoryPicker for NativePicker {
    fn pick_directory(&self, title: &str) -> Result<Option<PathBuf>, FsError> {
        let mut dialog = rfd::FileDialog::new().set_can_create_directories(true);
        if !title.is_empty() {
            dialog = dialog.set_title(title);
        }
        Ok(dialog.pick_folder())
    }
}

/// Returns the best picker for this build.
pub fn default_picker() -> Box<dyn DirectoryPicker> {
    #[cfg(feature = "gui")]
    {
        Box::new(NativePicker)
    }
    #[cfg(not(feature = "gui"))]
    {
        Box::new(HeadlessPicker)
    }
}
