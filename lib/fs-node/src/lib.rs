//! Host filesystem nodes for browsing and loading files.
//!
//! An [`FsNode`] is either a real path on the host ([`FsEntry`]) or the
//! synthetic [`VolumeRoot`] whose children are the mounted volumes. Nodes
//! are cheap, owned values: walking the tree with [`FsNode::parent`] and
//! [`FsNode::children`] always builds fresh nodes.
//!
//! ```no_run
//! use fs_node::{FsNode, ListMode};
//!
//! let home = FsNode::new("~");
//! for child in home.children(ListMode::All)? {
//!     println!("{} ({} bytes)", child.short_path(), child.size());
//! }
//! # Ok::<(), fs_node::FsError>(())
//! ```

use std::io;
use thiserror::Error;

mod file_io;
pub mod home;
mod node;
pub mod path;
mod sys;

pub use home::{DirsResolver, FolderResolver, HomeFinder, SpecialFolder};
pub use node::{EntryKind, FsEntry, FsNode, ListMode, VolumeRoot};

/// Separator used when building child paths.
pub const PATH_SEPARATOR: char = std::path::MAIN_SEPARATOR;

/// Leading marker that stands for the user's home directory.
pub const HOME_MARKER: char = '~';

pub type Result<T> = std::result::Result<T, FsError>;

/// Error type for external users
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum FsError {
    /// The requested file or directory could not be found
    #[error("file not found")]
    NotFound,
    /// The entry exists but the caller may not access it
    #[error("permission denied")]
    PermissionDenied,
    /// The file exists but holds no data
    #[error("zero-byte file")]
    ZeroByteFile,
    /// Opening, reading or writing the underlying stream failed
    #[error("io error")]
    IOError,
}

impl FsError {
    /// True for the two conditions reported when a file cannot be read at all.
    pub fn is_not_found_or_unreadable(&self) -> bool {
        matches!(self, FsError::NotFound | FsError::PermissionDenied)
    }
}

impl From<io::Error> for FsError {
    fn from(io_error: io::Error) -> Self {
        match io_error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound,
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied,
            _ => FsError::IOError,
        }
    }
}
