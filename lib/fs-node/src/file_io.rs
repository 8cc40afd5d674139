//! Whole-file reads and writes on an [`FsEntry`].
//!
//! Reads distinguish three failures: the file is missing or unreadable
//! ([`FsError::NotFound`] / [`FsError::PermissionDenied`]), the file is
//! empty ([`FsError::ZeroByteFile`]), or the stream itself failed
//! ([`FsError::IOError`]). An empty file is never a successful read.

use crate::node::FsEntry;
use crate::{FsError, Result};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use tracing::debug;

impl FsEntry {
    /// Reads up to `size` bytes (all of them when `size` is 0) into
    /// `buffer`, replacing its contents. Returns the number of bytes read.
    pub fn read(&self, buffer: &mut Vec<u8>, size: usize) -> Result<usize> {
        let mut file = self.open_for_read()?;
        let len = self.stream_len(&mut file)?;
        let amount = if size > 0 { len.min(size) } else { len };

        buffer.clear();
        buffer.resize(amount, 0);
        file.read_exact(buffer)
            .map_err(|err| self.stream_error("read", err))?;
        Ok(amount)
    }

    /// Reads the whole file as text and appends it to `buffer`.
    ///
    /// Returns the file length in bytes, before any line-ending translation.
    pub fn read_to_string(&self, buffer: &mut String) -> Result<usize> {
        let mut file = self.open_for_read()?;
        let len = self.stream_len(&mut file)?;

        let mut raw = Vec::with_capacity(len);
        file.read_to_end(&mut raw)
            .map_err(|err| self.stream_error("read", err))?;
        buffer.push_str(&from_text_mode(&String::from_utf8_lossy(&raw)));
        Ok(len)
    }

    /// Replaces the file's contents with `buffer`.
    ///
    /// Returns the stream position after writing, which is the file length.
    pub fn write(&self, buffer: &[u8]) -> Result<usize> {
        let mut file = fs::File::create(self.native_path())
            .map_err(|err| self.stream_error("open", err))?;
        file.write_all(buffer)
            .map_err(|err| self.stream_error("write", err))?;
        let end = file
            .seek(SeekFrom::End(0))
            .map_err(|err| self.stream_error("seek", err))?;
        usize::try_from(end).map_err(|_| FsError::IOError)
    }

    /// Replaces the file's contents with `text`, using the host's line
    /// endings.
    pub fn write_str(&self, text: &str) -> Result<usize> {
        self.write(to_text_mode(text).as_bytes())
    }

    fn open_for_read(&self) -> Result<fs::File> {
        if !self.exists() {
            return Err(FsError::NotFound);
        }
        if !self.is_readable() {
            return Err(FsError::PermissionDenied);
        }

        let file = fs::File::open(self.native_path())
            .map_err(|err| self.stream_error("open", err))?;
        // Some hosts let a directory be opened but not read.
        match file.metadata() {
            Ok(meta) if meta.is_dir() => {
                debug!(path = %self.path(), "cannot read a directory");
                Err(FsError::IOError)
            }
            Ok(_) => Ok(file),
            Err(err) => Err(self.stream_error("stat", err)),
        }
    }

    fn stream_len(&self, file: &mut fs::File) -> Result<usize> {
        let len = file
            .seek(SeekFrom::End(0))
            .and_then(|len| file.seek(SeekFrom::Start(0)).map(|_| len))
            .map_err(|err| self.stream_error("seek", err))?;
        if len == 0 {
            return Err(FsError::ZeroByteFile);
        }
        usize::try_from(len).map_err(|_| FsError::IOError)
    }

    fn stream_error(&self, op: &'static str, err: io::Error) -> FsError {
        debug!(path = %self.path(), op, %err, "file stream error");
        FsError::IOError
    }
}

#[cfg(windows)]
fn from_text_mode(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(not(windows))]
fn from_text_mode(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}

#[cfg(windows)]
fn to_text_mode(text: &str) -> Cow<'_, str> {
    if text.contains('\n') {
        Cow::Owned(text.replace('\n', "\r\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(not(windows))]
fn to_text_mode(text: &str) -> Cow<'_, str> {
    Cow::Borrowed(text)
}
