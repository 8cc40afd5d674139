//! Native primitives used by the node layer.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Exists,
    Read,
    Write,
}

/// A mounted volume as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Volume {
    pub label: String,
    pub root: String,
}

/// Attribute query that follows symlinks.
pub(crate) fn metadata(path: &Path) -> io::Result<fs::Metadata> {
    fs::metadata(path)
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        pub(crate) fn access(path: &Path, access: Access) -> bool {
            use std::ffi::CString;
            use std::os::unix::ffi::OsStrExt;

            let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
                return false;
            };
            let mode = match access {
                Access::Exists => libc::F_OK,
                Access::Read => libc::R_OK,
                Access::Write => libc::W_OK,
            };
            // SAFETY: `c_path` is a valid NUL-terminated string for the duration of the call.
            unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
        }
    } else {
        pub(crate) fn access(path: &Path, access: Access) -> bool {
            match fs::metadata(path) {
                Ok(meta) => match access {
                    Access::Exists | Access::Read => true,
                    Access::Write => !meta.permissions().readonly(),
                },
                Err(_) => false,
            }
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        pub(crate) fn logical_volumes() -> Vec<Volume> {
            use windows_sys::Win32::Storage::FileSystem::GetLogicalDriveStringsW;

            let mut buffer = [0u16; 256];
            // SAFETY: the length passed matches the buffer, which outlives the call.
            let len = unsafe {
                GetLogicalDriveStringsW(buffer.len() as u32, buffer.as_mut_ptr())
            } as usize;
            if len == 0 || len > buffer.len() {
                tracing::debug!(len, "logical drive listing failed");
                return Vec::new();
            }

            buffer[..len]
                .split(|&c| c == 0)
                .filter(|drive| !drive.is_empty())
                .map(|drive| {
                    let root = String::from_utf16_lossy(drive);
                    let label = root.chars().take(1).collect();
                    Volume { label, root }
                })
                .collect()
        }
    } else {
        pub(crate) fn logical_volumes() -> Vec<Volume> {
            let mut volumes = vec![Volume {
                label: "/".to_string(),
                root: "/".to_string(),
            }];
            for root in mount_points() {
                if volumes.iter().any(|v| v.root == root) {
                    continue;
                }
                let label = crate::path::last_path_component(&root).to_string();
                volumes.push(Volume { label, root });
            }
            volumes
        }
    }
}

#[cfg(target_os = "linux")]
fn mount_points() -> Vec<String> {
    let Ok(table) = fs::read_to_string("/proc/self/mounts") else {
        return Vec::new();
    };
    table
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount_point = unescape_mount_field(fields.next()?);
            // Pseudo filesystems are not volumes a user would browse.
            if !device.starts_with("/dev/") || mount_point == "/" {
                return None;
            }
            // Bind-mounted files show up in the table too.
            if !Path::new(&mount_point).is_dir() {
                return None;
            }
            Some(format!("{mount_point}/"))
        })
        .collect()
}

#[cfg(target_os = "macos")]
fn mount_points() -> Vec<String> {
    let Ok(entries) = fs::read_dir("/Volumes") else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.path().into_os_string().into_string().ok())
        .map(|path| format!("{path}/"))
        .collect()
}

#[cfg(not(any(windows, target_os = "linux", target_os = "macos")))]
fn mount_points() -> Vec<String> {
    Vec::new()
}

/// Decodes the octal escapes (`\040` for a space) used in the mount table.
#[cfg(any(target_os = "linux", test))]
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 4 <= bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits.iter().fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if let Ok(value) = u8::try_from(value) {
                    out.push(value);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
