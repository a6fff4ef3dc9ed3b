//! Lexical handling of archive member names.
//!
//! Archive names always use `/` and are never resolved against a real
//! filesystem, so these helpers operate on strings rather than
//! `std::path::Path`.

/// Lexically normalizes an archive name.
///
/// Repeated slashes and `.` components are removed, `..` consumes the
/// preceding component where one exists, and a trailing slash is dropped.
/// An empty result becomes `"."`; a rooted name stays rooted.
///
/// # Examples
///
/// ```
/// use metatar_core::types::clean_path;
///
/// assert_eq!(clean_path("usr//lib/./x/../"), "usr/lib");
/// assert_eq!(clean_path("/../etc"), "/etc");
/// assert_eq!(clean_path("../a"), "../a");
/// assert_eq!(clean_path(""), ".");
/// ```
#[must_use]
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Returns the cleaned parent directory of an archive name.
///
/// # Examples
///
/// ```
/// use metatar_core::types::archive_path::parent_dir;
///
/// assert_eq!(parent_dir("etc/init.d/rc"), "etc/init.d");
/// assert_eq!(parent_dir("etc/"), ".");
/// assert_eq!(parent_dir("/dev/null"), "/dev");
/// ```
#[must_use]
pub fn parent_dir(path: &str) -> String {
    let cleaned = clean_path(path);
    match cleaned.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => cleaned[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Joins a relative name onto a directory and cleans the result.
#[must_use]
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() || dir == "." {
        clean_path(name)
    } else {
        clean_path(&format!("{dir}/{name}"))
    }
}

/// Returns `true` if a cleaned directory name lies inside the archive tree
/// and may therefore be synthesized.
///
/// The current directory, rooted names and names escaping upwards are
/// excluded.
#[must_use]
pub fn is_materializable(dir: &str) -> bool {
    !(dir.is_empty()
        || dir == "."
        || dir.starts_with('/')
        || dir == ".."
        || dir.starts_with("../"))
}

/// Appends the directory suffix if it is missing.
#[must_use]
pub fn with_dir_suffix(name: &str) -> String {
    if name.ends_with('/') {
        name.to_string()
    } else {
        format!("{name}/")
    }
}
