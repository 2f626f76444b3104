//! Capability-scoped helpers for the file-backed adapters and the console.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};

/// Open the directory containing `path` and return it with the bare file name.
///
/// A path without a parent component resolves against the working directory.
///
/// # Errors
///
/// [`io::ErrorKind::InvalidInput`] when `path` has no file name, or any error
/// raised while opening the parent directory.
pub fn open_parent(path: &Path) -> io::Result<(Dir, PathBuf)> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        )
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, PathBuf::from(file_name)))
}

/// Write `contents` to a temporary sibling and rename it over `file_name`.
///
/// # Errors
///
/// Any error raised by the write or the rename.
pub fn write_replacing(dir: &Dir, file_name: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp_name = file_name.as_os_str().to_owned();
    tmp_name.push(format!(".tmp.{}", std::process::id()));
    let tmp_path = PathBuf::from(tmp_name);
    dir.write(&tmp_path, contents)?;
    dir.rename(&tmp_path, dir, file_name)
}
