//! Mark Recorder - per-compilation list of tagged code sites
//!
//! The emitter records one site per tagged instruction while it writes the
//! method body. The finished list travels with the code to the installer.

use crate::error::{MarkError, Result};
use crate::mark::Mark;
use crate::registry::MarkRegistry;
use hsgen_util::{define_idx, IndexVec};

define_idx!(
    /// Position of a site in a [`MarkRecorder`]
    SiteId
);

/// One tagged instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkSite {
    /// Code offset, placed according to [`Mark::placement`]
    pub offset: u32,
    pub mark: Mark,
    /// Host value the mark was bound to when the site was recorded
    pub value: i64,
}

/// Collects mark sites for one compilation
pub struct MarkRecorder<'r> {
    registry: &'r MarkRegistry,
    sites: IndexVec<SiteId, MarkSite>,
}

impl<'r> MarkRecorder<'r> {
    pub fn new(registry: &'r MarkRegistry) -> Self {
        Self {
            registry,
            sites: IndexVec::new(),
        }
    }

    /// Record `mark` at code `offset`
    ///
    /// # Errors
    ///
    /// - `MarkError::Unavailable` if the host never bound `mark`
    /// - `MarkError::OutOfOrder` if `offset` is below the last recorded site
    pub fn record(&mut self, offset: u32, mark: Mark) -> Result<SiteId> {
        let value = self.registry.value(mark)?;
        if let Some(last) = self.sites.as_slice().last() {
            if offset < last.offset {
                return Err(MarkError::OutOfOrder {
                    mark,
                    offset,
                    previous: last.offset,
                });
            }
        }
        log::trace!("mark {} at offset {}", mark, offset);
        Ok(self.sites.push(MarkSite {
            offset,
            mark,
            value,
        }))
    }

    /// Sites recorded for `mark`, in code order
    pub fn find(&self, mark: Mark) -> impl Iterator<Item = &MarkSite> + '_ {
        self.sites.iter().filter(move |site| site.mark == mark)
    }

    /// Registry the recorded values come from
    pub fn registry(&self) -> &'r MarkRegistry {
        self.registry
    }

    pub fn site(&self, id: SiteId) -> Option<&MarkSite> {
        self.sites.get(id)
    }

    pub fn sites(&self) -> &[MarkSite] {
        self.sites.as_slice()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Finish recording and hand the sites over
    pub fn into_sites(self) -> Vec<MarkSite> {
        self.sites.into_raw()
    }
}
