use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Tracks where one episode's file currently lives. A successful rename
/// updates the tracked path so a later move acts on the renamed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    current: PathBuf,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            current: path.into(),
        }
    }

    pub fn current_path(&self) -> &Path {
        &self.current
    }

    /// Renames the file inside its current directory.
    pub fn rename_to(&mut self, new_name: &str) -> io::Result<PathBuf> {
        let parent = self.current.parent().unwrap_or_else(|| Path::new(""));
        let target = parent.join(new_name);

        if target.exists() && !is_case_only_rename(&self.current, &target)? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file already exists: {}", target.display()),
            ));
        }

        fs::rename(&self.current, &target).map_err(|err| with_paths(err, &self.current, &target))?;
        log::info!(
            "renamed {} -> {}",
            self.current.display(),
            target.display()
        );
        self.current = target.clone();
        Ok(target)
    }

    /// Where the file would end up in `dest_dir`. Relative directories are
    /// taken relative to the file's current directory.
    pub fn target_in(&self, dest_dir: &Path) -> PathBuf {
        let dir = if dest_dir.is_absolute() {
            dest_dir.to_path_buf()
        } else {
            self.current
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(dest_dir)
        };
        match self.current.file_name() {
            Some(name) => dir.join(name),
            None => dir,
        }
    }

    /// Moves the file into `dest_dir`, creating it as needed. Falls back to
    /// copy and remove when the destination is on another filesystem.
    pub fn move_to(&mut self, dest_dir: &Path) -> io::Result<PathBuf> {
        let target = self.target_in(dest_dir);
        if target == self.current {
            return Ok(target);
        }
        if target.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file already exists: {}", target.display()),
            ));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("could not create {}: {err}", parent.display()),
                )
            })?;
        }

        match fs::rename(&self.current, &target) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
                log::debug!("rename across devices failed ({err}), copying instead");
                fs::copy(&self.current, &target)
                    .map_err(|err| with_paths(err, &self.current, &target))?;
                discard_copy_on_error(fs::remove_file(&self.current), &self.current, &target)?;
            }
            Err(err) => return Err(with_paths(err, &self.current, &target)),
        }

        log::info!("moved {} -> {}", self.current.display(), target.display());
        self.current = target.clone();
        Ok(target)
    }
}

/// After a cross-device copy, a source that cannot be removed means the
/// move failed. The copy is removed again so the file exists once.
fn discard_copy_on_error(removed: io::Result<()>, source: &Path, copy: &Path) -> io::Result<()> {
    removed.map_err(|err| {
        let discarded = fs::remove_file(copy).is_ok();
        let note = if discarded {
            "copy discarded"
        } else {
            "copy left in place"
        };
        io::Error::new(
            err.kind(),
            format!(
                "could not remove {} after copying to {} ({note}): {err}",
                source.display(),
                copy.display()
            ),
        )
    })
}

/// True when `target` differs from `current` only in letter case and both
/// names resolve to the same file, as on case-insensitive filesystems.
fn is_case_only_rename(current: &Path, target: &Path) -> io::Result<bool> {
    if current.to_string_lossy().to_lowercase() != target.to_string_lossy().to_lowercase() {
        return Ok(false);
    }
    is_same_file(current, target)
}

#[cfg(unix)]
fn is_same_file(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let (a, b) = (fs::metadata(a)?, fs::metadata(b)?);
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn is_same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

fn with_paths(err: io::Error, from: &Path, to: &Path) -> io::Error {
    io::Error::new(
        err.kind(),
        format!("{} -> {}: {err}", from.display(), to.display()),
    )
}
