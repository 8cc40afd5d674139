//! Lookup of the user's well-known folders.

use once_cell::sync::{Lazy, OnceCell};
#[cfg(feature = "enable-serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A folder the operating system knows by name rather than by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(Serialize, Deserialize))]
pub enum SpecialFolder {
    Home,
    AppData,
    Desktop,
    Documents,
}

impl SpecialFolder {
    pub const ALL: [SpecialFolder; 4] = [
        SpecialFolder::Home,
        SpecialFolder::AppData,
        SpecialFolder::Desktop,
        SpecialFolder::Documents,
    ];

    const fn slot(self) -> usize {
        match self {
            SpecialFolder::Home => 0,
            SpecialFolder::AppData => 1,
            SpecialFolder::Desktop => 2,
            SpecialFolder::Documents => 3,
        }
    }
}

/// Native lookup of special folders.
pub trait FolderResolver: Send + Sync {
    /// Returns the absolute path of `folder`, or `None` if the platform
    /// cannot provide it.
    fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf>;
}

/// Resolves folders through the platform's known-folder API.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirsResolver;

impl FolderResolver for DirsResolver {
    fn resolve(&self, folder: SpecialFolder) -> Option<PathBuf> {
        match folder {
            SpecialFolder::Home => dirs::home_dir(),
            SpecialFolder::AppData => dirs::data_dir(),
            SpecialFolder::Desktop => dirs::desktop_dir(),
            SpecialFolder::Documents => dirs::document_dir(),
        }
    }
}

static SHARED: Lazy<Arc<HomeFinder>> = Lazy::new(|| Arc::new(HomeFinder::default()));

/// Memoizing front for a [`FolderResolver`].
///
/// Every folder is looked up at most once. A failed lookup is remembered as
/// unavailable and never retried.
pub struct HomeFinder {
    resolver: Box<dyn FolderResolver>,
    slots: [OnceCell<Option<String>>; 4],
}

impl HomeFinder {
    pub fn new(resolver: impl FolderResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            slots: Default::default(),
        }
    }

    /// The process-wide finder backed by [`DirsResolver`].
    pub fn shared() -> Arc<HomeFinder> {
        Arc::clone(&SHARED)
    }

    pub fn folder(&self, folder: SpecialFolder) -> Option<&str> {
        self.slots[folder.slot()]
            .get_or_init(|| {
                let resolved = self
                    .resolver
                    .resolve(folder)
                    .and_then(|path| path.into_os_string().into_string().ok())
                    .map(|path| trim_trailing_separators(&path).to_string())
                    .filter(|path| !path.is_empty());
                debug!(?folder, path = ?resolved, "resolved special folder");
                resolved
            })
            .as_deref()
    }

    pub fn home_path(&self) -> Option<&str> {
        self.folder(SpecialFolder::Home)
    }

    pub fn app_data_path(&self) -> Option<&str> {
        self.folder(SpecialFolder::AppData)
    }

    pub fn desktop_path(&self) -> Option<&str> {
        self.folder(SpecialFolder::Desktop)
    }

    pub fn documents_path(&self) -> Option<&str> {
        self.folder(SpecialFolder::Documents)
    }
}

impl Default for HomeFinder {
    fn default() -> Self {
        Self::new(DirsResolver)
    }
}

impl fmt::Debug for HomeFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("HomeFinder");
        for folder in SpecialFolder::ALL {
            s.field(
                &format!("{folder:?}"),
                &self.slots[folder.slot()].get(),
            );
        }
        s.finish()
    }
}

// Keeps a bare root such as `/` or `C:\` intact.
fn trim_trailing_separators(path: &str) -> &str {
    let mut trimmed = path;
    while trimmed.len() > 1
        && trimmed.ends_with(crate::path::is_separator)
        && Path::new(trimmed).parent().is_some()
    {
        trimmed = &trimmed[..trimmed.len() - 1];
    }
    trimmed
}
