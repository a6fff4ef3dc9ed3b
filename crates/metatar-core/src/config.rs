//! Configuration for metadata operations.

/// Mode given to declared directories that carry no mode.
pub const DEFAULT_DIR_MODE: u32 = 0o770;

/// Mode given to declared non-directories that carry no mode.
pub const DEFAULT_FILE_MODE: u32 = 0o660;

/// Mode of directories synthesized for undeclared parents.
pub const MATERIALIZED_DIR_MODE: u32 = 0o555;

/// Output container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// GNU tar. Entry order is free.
    #[default]
    Tar,
    /// newc cpio. Parents and link targets must precede their dependents.
    Cpio,
}

impl OutputFormat {
    /// Returns the format name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Cpio => "cpio",
        }
    }
}

/// Configuration for applying metadata to an archive.
///
/// # Examples
///
/// ```
/// use metatar_core::ApplyConfig;
///
/// let config = ApplyConfig::default()
///     .with_body(true)
///     .with_root(true)
///     .with_mtime(Some(0));
/// assert!(config.skip_empty_files);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyConfig {
    /// Use inline `Body` fields of the metadata.
    ///
    /// Default: `false`.
    pub with_body: bool,

    /// Leave out regular files that end up with no body at all.
    ///
    /// Default: `true`.
    pub skip_empty_files: bool,

    /// Write every entry as owned by `root:root`.
    ///
    /// Default: `false`.
    pub root: bool,

    /// Log per-entry narration at `info` instead of `debug`.
    ///
    /// Default: `false`.
    pub verbose: bool,

    /// Modification time stamped on cpio records, in seconds since the
    /// epoch. `None` uses the current time. Tar members always get `0`
    /// unless this is set.
    ///
    /// Default: `None`.
    pub mtime: Option<u64>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            with_body: false,
            skip_empty_files: true,
            root: false,
            verbose: false,
            mtime: None,
        }
    }
}

impl ApplyConfig {
    /// Sets whether inline bodies are used.
    #[must_use]
    pub fn with_body(mut self, with_body: bool) -> Self {
        self.with_body = with_body;
        self
    }

    /// Sets whether empty regular files are left out.
    #[must_use]
    pub fn with_skip_empty_files(mut self, skip: bool) -> Self {
        self.skip_empty_files = skip;
        self
    }

    /// Sets whether all entries are owned by root.
    #[must_use]
    pub fn with_root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    /// Sets verbose narration.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the modification time for output records.
    #[must_use]
    pub fn with_mtime(mut self, mtime: Option<u64>) -> Self {
        self.mtime = mtime;
        self
    }
}

/// Configuration for extracting metadata from an archive.
///
/// # Examples
///
/// ```
/// use metatar_core::SaveConfig;
///
/// let config = SaveConfig::default().with_body(true).with_include_owner(false);
/// assert!(config.omit_defaults);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfig {
    /// Store member data as inline base64 `Body` fields.
    ///
    /// Default: `false`.
    pub with_body: bool,

    /// Leave out fields holding their default value.
    ///
    /// Default: `true`.
    pub omit_defaults: bool,

    /// Record every member as owned by `root:root`.
    ///
    /// Default: `false`.
    pub root: bool,

    /// Write `UID`, `GID`, `Username` and `Groupname`.
    ///
    /// Default: `true`.
    pub include_owner: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            with_body: false,
            omit_defaults: true,
            root: false,
            include_owner: true,
        }
    }
}

impl SaveConfig {
    /// Sets whether member data is stored inline.
    #[must_use]
    pub fn with_body(mut self, with_body: bool) -> Self {
        self.with_body = with_body;
        self
    }

    /// Sets whether default-valued fields are left out.
    #[must_use]
    pub fn with_omit_defaults(mut self, omit: bool) -> Self {
        self.omit_defaults = omit;
        self
    }

    /// Sets whether every member is recorded as owned by root.
    #[must_use]
    pub fn with_root(mut self, root: bool) -> Self {
        self.root = root;
        self
    }

    /// Sets whether owner fields are written.
    #[must_use]
    pub fn with_include_owner(mut self, include: bool) -> Self {
        self.include_owner = include;
        self
    }

    /// Returns the document emission policy this configuration implies.
    #[must_use]
    pub const fn emit_policy(&self) -> crate::metadata::EmitPolicy {
        crate::metadata::EmitPolicy {
            omit_defaults: self.omit_defaults,
            include_owner: self.include_owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_defaults() {
        let config = ApplyConfig::default();
        assert!(!config.with_body);
        assert!(config.skip_empty_files);
        assert!(!config.root);
        assert_eq!(config.mtime, None);
    }

    #[test]
    fn test_apply_builder() {
        let config = ApplyConfig::default()
            .with_skip_empty_files(false)
            .with_verbose(true)
            .with_mtime(Some(42));
        assert!(!config.skip_empty_files);
        assert!(config.verbose);
        assert_eq!(config.mtime, Some(42));
    }

    #[test]
    fn test_save_policy() {
        let policy = SaveConfig::default()
            .with_omit_defaults(false)
            .with_include_owner(false)
            .emit_policy();
        assert!(!policy.omit_defaults);
        assert!(!policy.include_owner);
    }

    #[test]
    fn test_default_modes() {
        assert_eq!(DEFAULT_DIR_MODE, 0o770);
        assert_eq!(DEFAULT_FILE_MODE, 0o660);
        assert_eq!(MATERIALIZED_DIR_MODE, 0o555);
        assert_eq!(OutputFormat::default().name(), "tar");
    }
}
