//! Test utilities for building source archives and inspecting output.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use crate::formats::cpio;

/// Creates an in-memory tar archive of regular files.
///
/// Each entry is a tuple of (path, content). Files are created with mode 0o644.
///
/// # Examples
///
/// ```
/// use metatar_core::test_utils::create_test_tar;
///
/// let tar_data = create_test_tar(vec![("file.txt", b"hello"), ("dir/nested.txt", b"world")]);
/// ```
#[must_use]
pub fn create_test_tar(entries: Vec<(&str, &[u8])>) -> Vec<u8> {
    entries
        .into_iter()
        .fold(TarTestBuilder::new(), |builder, (path, data)| {
            builder.add_file(path, data)
        })
        .build()
}

/// Builder for creating tar test archives with various entry types.
///
/// Members are owned by `root:root` unless added with
/// [`add_file_with_owner`](Self::add_file_with_owner).
///
/// # Examples
///
/// ```
/// use metatar_core::test_utils::TarTestBuilder;
///
/// let tar_data = TarTestBuilder::new()
///     .add_directory("etc/")
///     .add_file("etc/motd", b"hello")
///     .add_symlink("etc/issue", "motd")
///     .add_char_device("dev/console", 5, 1)
///     .build();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new tar test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    fn header(kind: tar::EntryType, mode: u32, size: u64) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(kind);
        header.set_mode(mode);
        header.set_size(size);
        header.set_uid(0);
        header.set_gid(0);
        header.set_username("root").unwrap();
        header.set_groupname("root").unwrap();
        header
    }

    fn push(mut self, mut header: tar::Header, path: &str, data: &[u8]) -> Self {
        header.set_cksum();
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file to the archive.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a regular file with custom mode.
    #[must_use]
    pub fn add_file_with_mode(self, path: &str, data: &[u8], mode: u32) -> Self {
        let header = Self::header(tar::EntryType::Regular, mode, data.len() as u64);
        self.push(header, path, data)
    }

    /// Adds a regular file with an explicit owner.
    #[must_use]
    pub fn add_file_with_owner(
        self,
        path: &str,
        data: &[u8],
        (uid, user): (u64, &str),
        (gid, group): (u64, &str),
    ) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, 0o644, data.len() as u64);
        header.set_uid(uid);
        header.set_gid(gid);
        header.set_username(user).unwrap();
        header.set_groupname(group).unwrap();
        self.push(header, path, data)
    }

    /// Adds a directory to the archive.
    #[must_use]
    pub fn add_directory(self, path: &str) -> Self {
        let header = Self::header(tar::EntryType::Directory, 0o755, 0);
        self.push(header, path, &[])
    }

    /// Adds a symlink to the archive.
    #[must_use]
    pub fn add_symlink(self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Symlink, 0o777, 0);
        header.set_link_name(target).unwrap();
        self.push(header, path, &[])
    }

    /// Adds a hardlink to the archive.
    #[must_use]
    pub fn add_hardlink(self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Link, 0o644, 0);
        header.set_link_name(target).unwrap();
        self.push(header, path, &[])
    }

    /// Adds a character device node.
    #[must_use]
    pub fn add_char_device(self, path: &str, major: u32, minor: u32) -> Self {
        let mut header = Self::header(tar::EntryType::Char, 0o600, 0);
        header.set_device_major(major).unwrap();
        header.set_device_minor(minor).unwrap();
        self.push(header, path, &[])
    }

    /// Adds a regular file carrying extended attributes.
    #[must_use]
    pub fn add_file_with_xattrs(mut self, path: &str, data: &[u8], xattrs: &[(&str, &str)]) -> Self {
        let keys: Vec<String> = xattrs
            .iter()
            .map(|(k, _)| format!("SCHILY.xattr.{k}"))
            .collect();
        self.builder
            .append_pax_extensions(
                keys.iter()
                    .map(String::as_str)
                    .zip(xattrs.iter().map(|(_, v)| v.as_bytes())),
            )
            .unwrap();
        self.add_file(path, data)
    }

    /// Builds and returns the tar archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the member names of a tar archive in stream order.
#[must_use]
pub fn tar_names(bytes: &[u8]) -> Vec<String> {
    crate::formats::tar::read_members(bytes)
        .unwrap()
        .into_iter()
        .map(|m| m.entry.path)
        .collect()
}

/// Returns the record names of a newc cpio archive in stream order.
#[must_use]
pub fn cpio_names(bytes: &[u8]) -> Vec<String> {
    cpio::read_all(bytes)
        .unwrap()
        .into_iter()
        .map(|(header, _)| header.name)
        .collect()
}

/// Returns the data of the named cpio record.
#[must_use]
pub fn cpio_body(bytes: &[u8], name: &str) -> Option<Vec<u8>> {
    cpio::read_all(bytes)
        .unwrap()
        .into_iter()
        .find(|(header, _)| header.name == name)
        .map(|(_, data)| data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_tar() {
        let tar_data = create_test_tar(vec![("file.txt", b"hello")]);
        assert_eq!(tar_names(&tar_data), ["file.txt"]);
    }

    #[test]
    fn test_tar_builder() {
        let tar_data = TarTestBuilder::new()
            .add_file("file.txt", b"content")
            .add_directory("dir/")
            .add_hardlink("again.txt", "file.txt")
            .build();
        assert_eq!(tar_names(&tar_data), ["file.txt", "dir/", "again.txt"]);
    }
}
