use crate::home::HomeFinder;
use crate::path::{
    elide_home, expand_home, is_separator, is_volume_root, last_path_component, normalize_path,
    stem_path_component, with_extension,
};
use crate::sys::{self, Access};
use crate::{FsError, HOME_MARKER, PATH_SEPARATOR, Result};
use once_cell::sync::OnceCell;
#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Which kinds of entries [`FsNode::children`] returns.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum ListMode {
    FilesOnly,
    DirectoriesOnly,
    #[default]
    All,
}

impl ListMode {
    fn accepts(self, kind: EntryKind) -> bool {
        match self {
            ListMode::FilesOnly => kind == EntryKind::File,
            ListMode::DirectoriesOnly => kind == EntryKind::Directory,
            ListMode::All => kind != EntryKind::Missing,
        }
    }
}

/// What the host reported for a path the last time it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Missing,
    Directory,
    File,
}

/// A node in the host filesystem tree.
///
/// The volume root is a separate variant so that operations which only make
/// sense on a real path (reading, writing, renaming, creating) live on
/// [`FsEntry`] alone.
#[derive(Debug, Clone)]
pub enum FsNode {
    Entry(FsEntry),
    Volumes(VolumeRoot),
}

impl FsNode {
    /// A node for `path`; see [`FsEntry::new`].
    pub fn new(path: impl AsRef<str>) -> Self {
        FsNode::Entry(FsEntry::new(path))
    }

    /// The synthetic parent of every volume.
    pub fn volumes() -> Self {
        FsNode::Volumes(VolumeRoot::new())
    }

    pub fn is_pseudo_root(&self) -> bool {
        matches!(self, FsNode::Volumes(_))
    }

    pub fn as_entry(&self) -> Option<&FsEntry> {
        match self {
            FsNode::Entry(entry) => Some(entry),
            FsNode::Volumes(_) => None,
        }
    }

    pub fn as_entry_mut(&mut self) -> Option<&mut FsEntry> {
        match self {
            FsNode::Entry(entry) => Some(entry),
            FsNode::Volumes(_) => None,
        }
    }

    pub fn into_entry(self) -> Option<FsEntry> {
        match self {
            FsNode::Entry(entry) => Some(entry),
            FsNode::Volumes(_) => None,
        }
    }

    /// Normalized path; empty for the volume root.
    pub fn path(&self) -> &str {
        match self {
            FsNode::Entry(entry) => entry.path(),
            FsNode::Volumes(_) => "",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FsNode::Entry(entry) => entry.name(),
            FsNode::Volumes(_) => "",
        }
    }

    pub fn short_path(&self) -> String {
        match self {
            FsNode::Entry(entry) => entry.short_path(),
            FsNode::Volumes(_) => String::new(),
        }
    }

    pub fn is_directory(&self) -> bool {
        match self {
            FsNode::Entry(entry) => entry.is_directory(),
            FsNode::Volumes(_) => true,
        }
    }

    pub fn is_file(&self) -> bool {
        match self {
            FsNode::Entry(entry) => entry.is_file(),
            FsNode::Volumes(_) => false,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            FsNode::Entry(entry) => entry.size(),
            FsNode::Volumes(_) => 0,
        }
    }

    pub fn exists(&self) -> bool {
        match self {
            FsNode::Entry(entry) => entry.exists(),
            FsNode::Volumes(_) => true,
        }
    }

    pub fn is_readable(&self) -> bool {
        match self {
            FsNode::Entry(entry) => entry.is_readable(),
            FsNode::Volumes(_) => true,
        }
    }

    pub fn is_writable(&self) -> bool {
        match self {
            FsNode::Entry(entry) => entry.is_writable(),
            FsNode::Volumes(_) => false,
        }
    }

    pub fn has_parent(&self) -> bool {
        !self.is_pseudo_root()
    }

    pub fn parent(&self) -> Option<FsNode> {
        match self {
            FsNode::Entry(entry) => Some(entry.parent()),
            FsNode::Volumes(_) => None,
        }
    }

    pub fn children(&self, mode: ListMode) -> Result<Vec<FsNode>> {
        match self {
            FsNode::Entry(entry) => entry.children(mode),
            FsNode::Volumes(root) => Ok(root.children(mode)),
        }
    }
}

impl From<FsEntry> for FsNode {
    fn from(entry: FsEntry) -> Self {
        FsNode::Entry(entry)
    }
}

impl From<VolumeRoot> for FsNode {
    fn from(root: VolumeRoot) -> Self {
        FsNode::Volumes(root)
    }
}

/// The set of mounted volumes, presented as a directory.
#[derive(Debug, Clone)]
pub struct VolumeRoot {
    home: Arc<HomeFinder>,
}

impl VolumeRoot {
    pub fn new() -> Self {
        Self::with_home(HomeFinder::shared())
    }

    pub fn with_home(home: Arc<HomeFinder>) -> Self {
        Self { home }
    }

    /// One directory entry per mounted volume, named by its label.
    pub fn children(&self, mode: ListMode) -> Vec<FsNode> {
        if !mode.accepts(EntryKind::Directory) {
            return Vec::new();
        }
        sys::logical_volumes()
            .into_iter()
            .map(|volume| {
                FsNode::Entry(FsEntry {
                    path: volume.root,
                    name: volume.label,
                    kind: EntryKind::Directory,
                    size: OnceCell::new(),
                    home: self.home.clone(),
                })
            })
            .collect()
    }
}

impl Default for VolumeRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// A real path on the host together with its cached attributes.
#[derive(Debug, Clone)]
pub struct FsEntry {
    path: String,
    name: String,
    kind: EntryKind,
    size: OnceCell<u64>,
    home: Arc<HomeFinder>,
}

impl FsEntry {
    /// Resolves `path` using the process-wide [`HomeFinder`].
    ///
    /// An empty path means the home directory and a leading `~` is expanded.
    /// The result is absolute; directories end with a separator. A path that
    /// does not exist still yields an entry, with [`EntryKind::Missing`], so
    /// it can be created with [`FsEntry::make_dir`] or [`FsEntry::write`].
    pub fn new(path: impl AsRef<str>) -> Self {
        Self::with_home(path, HomeFinder::shared())
    }

    pub fn with_home(path: impl AsRef<str>, home: Arc<HomeFinder>) -> Self {
        let path = match path.as_ref() {
            "" => HOME_MARKER.to_string(),
            path => path.to_string(),
        };
        let mut entry = Self {
            path: expand_home(&path, home.home_path()),
            name: String::new(),
            kind: EntryKind::Missing,
            size: OnceCell::new(),
            home,
        };
        entry.refresh();
        entry
    }

    /// Re-normalizes the path and queries the host for its attributes.
    ///
    /// Returns `false` if the path does not exist.
    pub fn refresh(&mut self) -> bool {
        self.path = normalize_path(&self.path);
        self.name = last_path_component(&self.path).to_string();
        self.size = OnceCell::new();

        match sys::metadata(Path::new(&self.path)) {
            Ok(meta) if meta.is_dir() => {
                self.kind = EntryKind::Directory;
                if !self.path.ends_with(is_separator) {
                    self.path.push(PATH_SEPARATOR);
                }
                true
            }
            Ok(_) => {
                self.kind = EntryKind::File;
                true
            }
            Err(err) => {
                trace!(path = %self.path, %err, "path has no attributes");
                self.kind = EntryKind::Missing;
                false
            }
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path with the home directory shown as `~`.
    pub fn short_path(&self) -> String {
        elide_home(&self.path, self.home.home_path())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Overrides the display name; the path is unaffected.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The display name with its extension replaced by `ext` (e.g. `".sav"`).
    pub fn name_with_ext(&self, ext: &str) -> String {
        with_extension(&self.name, ext)
    }

    /// The path with its extension replaced by `ext` (e.g. `".sav"`).
    pub fn path_with_ext(&self, ext: &str) -> String {
        with_extension(&self.path, ext)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// File length in bytes, queried once and then cached. Directories and
    /// missing paths report 0.
    pub fn size(&self) -> u64 {
        if self.kind != EntryKind::File {
            return 0;
        }
        if let Some(size) = self.size.get() {
            return *size;
        }
        match sys::metadata(self.native_path()) {
            Ok(meta) => *self.size.get_or_init(|| meta.len()),
            Err(err) => {
                trace!(path = %self.path, %err, "size query failed");
                0
            }
        }
    }

    pub fn exists(&self) -> bool {
        sys::access(self.native_path(), Access::Exists)
    }

    pub fn is_readable(&self) -> bool {
        sys::access(self.native_path(), Access::Read)
    }

    pub fn is_writable(&self) -> bool {
        sys::access(self.native_path(), Access::Write)
    }

    /// The containing directory, or the volume root for a volume.
    ///
    /// The parent path is derived from this entry's path alone.
    pub fn parent(&self) -> FsNode {
        if is_volume_root(&self.path) {
            FsNode::Volumes(VolumeRoot::with_home(self.home.clone()))
        } else {
            FsNode::Entry(FsEntry::with_home(
                stem_path_component(&self.path),
                self.home.clone(),
            ))
        }
    }

    /// Lists the directory in the host's native order.
    ///
    /// Names starting with `.` are skipped. Each child's size comes from
    /// the listing itself.
    pub fn children(&self, mode: ListMode) -> Result<Vec<FsNode>> {
        let listing = fs::read_dir(self.native_path()).map_err(|err| {
            debug!(path = %self.path, %err, "cannot list directory");
            FsError::from(err)
        })?;

        let mut base = self.path.clone();
        if !base.ends_with(is_separator) {
            base.push(PATH_SEPARATOR);
        }

        let mut children = Vec::new();
        for dir_entry in listing {
            let dir_entry = match dir_entry {
                Ok(dir_entry) => dir_entry,
                Err(err) => {
                    trace!(path = %self.path, %err, "skipping unreadable entry");
                    continue;
                }
            };
            let Ok(name) = dir_entry.file_name().into_string() else {
                trace!(path = %self.path, name = ?dir_entry.file_name(), "skipping non UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            let meta = match dir_entry.metadata() {
                Ok(meta) if meta.file_type().is_symlink() => {
                    sys::metadata(&dir_entry.path()).unwrap_or(meta)
                }
                Ok(meta) => meta,
                Err(err) => {
                    trace!(path = %self.path, %name, %err, "skipping entry without attributes");
                    continue;
                }
            };
            let kind = if meta.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            if !mode.accepts(kind) {
                continue;
            }

            let mut path = format!("{base}{name}");
            let size = OnceCell::new();
            if kind == EntryKind::Directory {
                path.push(PATH_SEPARATOR);
            } else {
                let _ = size.set(meta.len());
            }

            children.push(FsNode::Entry(FsEntry {
                path,
                name,
                kind,
                size,
                home: self.home.clone(),
            }));
        }

        Ok(children)
    }

    /// Creates this path as a directory.
    pub fn make_dir(&mut self) -> Result<()> {
        fs::create_dir(self.native_path()).map_err(|err| {
            debug!(path = %self.path, %err, "cannot create directory");
            FsError::from(err)
        })?;
        self.refresh();
        Ok(())
    }

    /// Moves this entry to `new_path`, which may start with `~`.
    ///
    /// On failure the entry keeps its old path and attributes.
    pub fn rename(&mut self, new_path: impl AsRef<str>) -> Result<()> {
        let target = normalize_path(&expand_home(new_path.as_ref(), self.home.home_path()));
        fs::rename(self.native_path(), &target).map_err(|err| {
            debug!(from = %self.path, to = %target, %err, "cannot rename");
            FsError::from(err)
        })?;
        self.path = target;
        self.refresh();
        Ok(())
    }

    /// The path as handed to the host, without the directory separator.
    pub(crate) fn native_path(&self) -> &Path {
        let trimmed = self.path.trim_end_matches(is_separator);
        if trimmed.is_empty() || is_volume_root(&self.path) {
            Path::new(&self.path)
        } else {
            Path::new(trimmed)
        }
    }
}
