//! String helpers for node paths.
//!
//! Node paths are plain strings in the host's native form. Directory paths
//! end with a separator so that a child path is `parent + name`.

use crate::{HOME_MARKER, PATH_SEPARATOR};
use path_clean::PathClean;
use std::path::{Path, PathBuf};

/// Whether `c` separates path components on this host.
pub fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// The final component of `path`, ignoring a trailing separator.
///
/// A bare root such as `/` is returned unchanged.
pub fn last_path_component(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    match trimmed.rfind(is_separator) {
        Some(pos) => &trimmed[pos + 1..],
        None if trimmed.is_empty() => path,
        None => trimmed,
    }
}

/// Everything up to and including the separator in front of the final
/// component; empty when there is no such separator.
pub fn stem_path_component(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    match trimmed.rfind(is_separator) {
        Some(pos) => &path[..=pos],
        None => "",
    }
}

/// Makes `path` absolute against the current directory and removes `.`,
/// `..` and duplicate separators. The filesystem is not consulted.
pub fn normalize_path(path: &str) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));
    into_string(absolute.clean())
}

pub(crate) fn into_string(path: PathBuf) -> String {
    path.into_os_string()
        .into_string()
        .unwrap_or_else(|os| os.to_string_lossy().into_owned())
}

/// Replaces a leading `~` with `home`.
///
/// Only `~` on its own or followed by a separator is expanded. Without a
/// home directory the path is returned as is.
pub fn expand_home(path: &str, home: Option<&str>) -> String {
    let Some(rest) = path.strip_prefix(HOME_MARKER) else {
        return path.to_string();
    };
    match home {
        Some(home) if rest.is_empty() || rest.starts_with(is_separator) => {
            format!("{home}{rest}")
        }
        _ => path.to_string(),
    }
}

/// Replaces a leading `home` with `~`.
pub fn elide_home(path: &str, home: Option<&str>) -> String {
    let Some(home) = home.filter(|home| !home.is_empty()) else {
        return path.to_string();
    };
    if !starts_with_ignore_case(path, home) {
        return path.to_string();
    }
    let Some(rest) = path.get(home.len()..) else {
        return path.to_string();
    };
    // `/home/user2` is not inside `/home/user`.
    let home_is_root = home.ends_with(is_separator);
    if !home_is_root && !rest.is_empty() && !rest.starts_with(is_separator) {
        return path.to_string();
    }

    let mut short = String::with_capacity(rest.len() + 2);
    short.push(HOME_MARKER);
    if !rest.starts_with(is_separator) {
        short.push(PATH_SEPARATOR);
    }
    short.push_str(rest);
    short
}

/// ASCII case-insensitive prefix test.
pub fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// True when `path` has no parent, e.g. `/` or `C:\`.
pub fn is_volume_root(path: &str) -> bool {
    Path::new(path).parent().is_none()
}

/// `name` with its extension replaced by `ext`, or `ext` appended when
/// there is none. `ext` includes the leading dot.
pub fn with_extension(name: &str, ext: &str) -> String {
    let start = name.rfind(is_separator).map_or(0, |pos| pos + 1);
    match name[start..].rfind('.') {
        Some(dot) => format!("{}{ext}", &name[..start + dot]),
        None => format!("{name}{ext}"),
    }
}
