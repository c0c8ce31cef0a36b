//! File helpers shared by the executors.
//!

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::standalone::WriteMode;

/// A destination file opened according to a [`WriteMode`].
///
/// In [`WriteMode::Append`] writes go straight to the destination, which is
/// created if absent and extended if present. In [`WriteMode::Replace`]
/// writes go to a uniquely named sibling file that [`OutputFile::commit`]
/// renames over the destination; dropping an uncommitted file removes it.
pub struct OutputFile {
    writer: BufWriter<File>,
    dest: PathBuf,
    staged: Option<PathBuf>,
}

impl OutputFile {
    pub fn open(dest: &Path, mode: WriteMode) -> io::Result<Self> {
        let (file, staged) = match mode {
            WriteMode::Append => {
                let file = OpenOptions::new().create(true).append(true).open(dest)?;
                (file, None)
            }
            WriteMode::Replace => {
                let staged = staging_path(dest);
                let file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&staged)?;
                (file, Some(staged))
            }
        };
        Ok(Self {
            writer: BufWriter::new(file),
            dest: dest.to_path_buf(),
            staged,
        })
    }

    pub fn path(&self) -> &Path {
        &self.dest
    }

    /// Flushes buffered records and, when staged, moves the file into place.
    ///
    /// Call [`Write::flush`] first to tell flush failures apart from
    /// rename failures; this method flushes again regardless.
    pub fn commit(mut self) -> io::Result<PathBuf> {
        self.writer.flush()?;
        if let Some(staged) = self.staged.take() {
            if let Err(e) = fs::rename(&staged, &self.dest) {
                let _ = fs::remove_file(&staged);
                return Err(e);
            }
        }
        Ok(self.dest.clone())
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Drop for OutputFile {
    fn drop(&mut self) {
        if let Some(staged) = self.staged.take() {
            let _ = fs::remove_file(staged);
        }
    }
}

/// `dir/.name.<uuid>.tmp`, next to `dest` so the rename stays on one
/// filesystem.
fn staging_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or_else(|| dest.as_os_str()));
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_line(path: &Path, mode: WriteMode, line: &str) -> PathBuf {
        let mut out = OutputFile::open(path, mode).unwrap();
        writeln!(out, "{line}").unwrap();
        out.commit().unwrap()
    }

    #[test]
    fn append_mode_extends_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        write_line(&path, WriteMode::Append, "one");
        write_line(&path, WriteMode::Append, "two");
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn replace_mode_overwrites_and_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        write_line(&path, WriteMode::Replace, "one");
        let committed = write_line(&path, WriteMode::Replace, "two");
        assert_eq!(committed, path);
        assert_eq!(fs::read_to_string(&path).unwrap(), "two\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn uncommitted_replace_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        write_line(&path, WriteMode::Replace, "kept");
        {
            let mut out = OutputFile::open(&path, WriteMode::Replace).unwrap();
            writeln!(out, "abandoned").unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn staging_path_is_a_hidden_sibling() {
        let staged = staging_path(Path::new("/data/mrtmp.wc-res-0"));
        assert_eq!(staged.parent(), Some(Path::new("/data")));
        let name = staged.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(".mrtmp.wc-res-0."));
        assert!(name.ends_with(".tmp"));
    }
}
