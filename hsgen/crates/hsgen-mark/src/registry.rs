//! Mark Registry - bind-once table of host-supplied mark values
//!
//! One cell per [`Mark`]. A cell goes from unbound to bound exactly once; the
//! transition happens during single-threaded start-up and every later access
//! is a lock-free read. There is no way to clear or overwrite a cell.

use crate::error::{MarkError, Result};
use crate::mark::Mark;
use std::fmt;
use std::sync::OnceLock;

/// Registry of mark values supplied by the host runtime
///
/// # Thread Safety
///
/// `MarkRegistry` is `Send + Sync`. Binding should complete before the
/// registry is handed to compilation threads; reads never block.
///
/// # Examples
///
/// ```rust
/// use hsgen_mark::{Mark, MarkError, MarkRegistry};
///
/// let registry = MarkRegistry::new();
/// assert_eq!(registry.value(Mark::PollNear), Err(MarkError::Unavailable(Mark::PollNear)));
///
/// registry.bind(Mark::PollNear, 12)?;
/// assert_eq!(registry.value(Mark::PollNear)?, 12);
/// assert!(registry.bind(Mark::PollNear, 13).is_err());
/// # Ok::<(), MarkError>(())
/// ```
pub struct MarkRegistry {
    values: [OnceLock<i64>; Mark::COUNT],
}

impl MarkRegistry {
    /// Create a registry with every mark unbound
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Bind `mark` to `value`
    ///
    /// # Errors
    ///
    /// `MarkError::AlreadyBound` if the mark already holds a value. The
    /// existing value is kept.
    pub fn bind(&self, mark: Mark, value: i64) -> Result<()> {
        let cell = &self.values[mark.index()];
        match cell.set(value) {
            Ok(()) => {
                log::debug!("bound mark {} = {:#x}", mark, value);
                Ok(())
            }
            Err(attempted) => {
                // set only fails on an initialized cell
                let existing = cell.get().copied().unwrap_or(attempted);
                log::error!(
                    "attempt to rebind mark {} (bound to {:#x}) to {:#x}",
                    mark,
                    existing,
                    attempted
                );
                Err(MarkError::AlreadyBound {
                    mark,
                    existing,
                    attempted,
                })
            }
        }
    }

    /// The value bound to `mark`
    ///
    /// # Errors
    ///
    /// `MarkError::Unavailable` if the host never supplied the mark.
    #[inline]
    pub fn value(&self, mark: Mark) -> Result<i64> {
        self.values[mark.index()]
            .get()
            .copied()
            .ok_or(MarkError::Unavailable(mark))
    }

    /// Whether the host supplied `mark`
    #[inline]
    pub fn is_bound(&self, mark: Mark) -> bool {
        self.values[mark.index()].get().is_some()
    }

    /// Bind every mark from the host's exported constant table
    ///
    /// `lookup` receives keys of the form `CodeInstaller::<NAME>`. A missing
    /// optional mark is left unbound; a missing required mark fails with
    /// `MarkError::Unsupported`. Marks are bound in declaration order and
    /// binding stops at the first error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hsgen_mark::{Mark, MarkRegistry};
    /// use std::collections::HashMap;
    ///
    /// let constants: HashMap<String, i64> = Mark::ALL
    ///     .iter()
    ///     .filter(|m| !m.is_optional())
    ///     .map(|m| (m.constant_key(), m.index() as i64))
    ///     .collect();
    ///
    /// let registry = MarkRegistry::new();
    /// registry.populate(|key| constants.get(key).copied())?;
    /// assert!(!registry.is_bound(Mark::EntryBarrierPatch));
    /// # Ok::<(), hsgen_mark::MarkError>(())
    /// ```
    pub fn populate<F>(&self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<i64>,
    {
        for &mark in Mark::ALL {
            let key = mark.constant_key();
            match lookup(&key) {
                Some(value) => self.bind(mark, value)?,
                None if mark.is_optional() => {
                    log::debug!("host does not export optional mark {}", mark);
                }
                None => return Err(MarkError::Unsupported { mark, key }),
            }
        }
        Ok(())
    }

    /// Number of bound marks
    pub fn bound_count(&self) -> usize {
        self.values.iter().filter(|cell| cell.get().is_some()).count()
    }

    /// Every mark with its value, if bound
    pub fn snapshot(&self) -> Vec<(Mark, Option<i64>)> {
        Mark::ALL
            .iter()
            .map(|&mark| (mark, self.values[mark.index()].get().copied()))
            .collect()
    }

    /// Whether deoptimization of method-handle call sites can use a
    /// dedicated handler entry
    pub fn supports_method_handle_deopt(&self) -> bool {
        self.is_bound(Mark::DeoptMhHandlerEntry)
    }

    /// Whether the host expects an nmethod entry barrier to be emitted
    pub fn has_entry_barrier(&self) -> bool {
        self.is_bound(Mark::EntryBarrierPatch)
    }
}

impl Default for MarkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = Mark::ALL
            .iter()
            .filter_map(|&mark| self.values[mark.index()].get().map(|v| (mark, *v)));
        f.debug_map().entries(bound).finish()
    }
}
