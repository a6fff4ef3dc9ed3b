//! Skip list matching.

use glob::Pattern;

use crate::MetatarError;
use crate::Result;

/// Decides whether a name is excluded by a skip list.
///
/// A name is excluded if it equals a list item or matches it as a shell
/// glob. Glob `*` also matches `/`, so `*.tmp` excludes `a/b.tmp`.
///
/// # Examples
///
/// ```
/// use metatar_core::apply::SkipResolver;
///
/// # fn main() -> Result<(), metatar_core::MetatarError> {
/// let skip = SkipResolver::new(&["README.md".to_string(), "*.tmp".to_string()])?;
/// assert!(skip.should_skip("README.md"));
/// assert!(skip.should_skip("build.tmp"));
/// assert!(!skip.should_skip("build.tmp.bak"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SkipResolver {
    exact: Vec<String>,
    patterns: Vec<Pattern>,
}

impl SkipResolver {
    /// Compiles a skip list.
    ///
    /// # Errors
    ///
    /// Returns [`MetatarError::InvalidPattern`] if an item is not a valid
    /// glob.
    pub fn new(list: &[String]) -> Result<Self> {
        let patterns = list
            .iter()
            .map(|item| {
                Pattern::new(item).map_err(|e| MetatarError::InvalidPattern {
                    pattern: item.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            exact: list.to_vec(),
            patterns,
        })
    }

    /// Returns `true` if `path` is excluded.
    #[must_use]
    pub fn should_skip(&self, path: &str) -> bool {
        self.exact.iter().any(|item| item == path) || self.patterns.iter().any(|p| p.matches(path))
    }
}
