use crate::config::AppConfig;
use crate::console::Console;
use crate::error::MoveMisuse;
use crate::file_handle::FileHandle;
use std::path::{Path, PathBuf};

/// Renames the file to `new_name`. Filesystem errors are warned and
/// reported as `false`; nothing here stops the batch.
pub fn rename_file(handle: &mut FileHandle, new_name: &str, console: &mut dyn Console) -> bool {
    match handle.rename_to(new_name) {
        Ok(_) => true,
        Err(err) => {
            console.warn(&format!("Could not rename file: {err}"));
            false
        }
    }
}

/// Moves the file into `dest_dir`, or with `preview` only shows where it
/// would go. Returns the target path, `Ok(None)` when the move failed and
/// was warned about, and `Err` when moving is not configured at all.
pub fn move_file(
    handle: &mut FileHandle,
    dest_dir: &str,
    preview: bool,
    config: &AppConfig,
    console: &mut dyn Console,
) -> Result<Option<PathBuf>, MoveMisuse> {
    if !config.move_files_enable {
        return Err(MoveMisuse::Disabled);
    }
    if config.move_files_destination.is_none() {
        return Err(MoveMisuse::NoDestination);
    }

    let dest_dir = Path::new(dest_dir);
    if preview {
        let target = handle.target_in(dest_dir);
        console.say(&format!("New path: {}", target.display()));
        return Ok(Some(target));
    }

    match handle.move_to(dest_dir) {
        Ok(target) => Ok(Some(target)),
        Err(err) => {
            console.warn(&format!("Could not move file: {err}"));
            Ok(None)
        }
    }
}
