//! Dense tables addressed by typed indices.
//!
//! Every per-compilation table in the backend (lock records by nesting
//! depth, recorded mark sites) is append-only and addressed by a small
//! integer. [`IndexVec`] stores such a table in a plain `Vec` and makes the
//! key type part of the table's type, so a `LockDepth` cannot address the
//! mark-site table.
//!
//! Tables only grow. Growth either appends one entry ([`IndexVec::push`]) or
//! fills every position up to a target index with a fallible producer
//! ([`IndexVec::try_grow_to`]).
//!
//! ```
//! use hsgen_util::define_idx;
//! use hsgen_util::index_vec::IndexVec;
//!
//! define_idx!(Depth);
//!
//! let mut offsets: IndexVec<Depth, u32> = IndexVec::new();
//! offsets.try_grow_to(Depth(2), |d| Ok::<_, ()>(16 + d.0 * 8)).unwrap();
//! assert_eq!(offsets[Depth(2)], 32);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

/// Key of an [`IndexVec`]
///
/// Usually generated with [`define_idx!`](crate::define_idx).
pub trait Idx: Copy + Eq {
    /// Key for table position `idx`. May panic if `idx` does not fit.
    fn from_usize(idx: usize) -> Self;

    /// Table position of this key
    fn index(self) -> usize;
}

impl Idx for usize {
    #[inline]
    fn from_usize(idx: usize) -> Self {
        idx
    }

    #[inline]
    fn index(self) -> usize {
        self
    }
}

/// Append-only table keyed by `I`
#[derive(Clone)]
pub struct IndexVec<I, T> {
    raw: Vec<T>,
    _key: PhantomData<fn(&I)>,
}

impl<I, T> IndexVec<I, T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            raw: Vec::new(),
            _key: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Entries in key order
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.raw
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.raw.iter()
    }

    /// Give up the key type and hand the entries over
    #[inline]
    pub fn into_raw(self) -> Vec<T> {
        self.raw
    }
}

impl<I: Idx, T> IndexVec<I, T> {
    /// Append `value`, returning its key
    #[inline]
    pub fn push(&mut self, value: T) -> I {
        let key = I::from_usize(self.raw.len());
        self.raw.push(value);
        key
    }

    #[inline]
    pub fn get(&self, key: I) -> Option<&T> {
        self.raw.get(key.index())
    }

    /// `(key, entry)` pairs in key order
    pub fn iter_enumerated(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.raw
            .iter()
            .enumerate()
            .map(|(pos, value)| (I::from_usize(pos), value))
    }

    /// Make `key` valid, producing each missing entry with `fill`
    ///
    /// Missing positions are produced in ascending key order. The first
    /// error from `fill` stops growth and is returned as is; entries
    /// produced before it stay, so the table never has a hole. A key that
    /// is already valid leaves the table untouched and never calls `fill`.
    ///
    /// Storage grows one entry at a time, so a far-away key costs only
    /// what `fill` actually produced before failing.
    ///
    /// ```
    /// use hsgen_util::index_vec::IndexVec;
    ///
    /// let mut table: IndexVec<usize, char> = IndexVec::new();
    /// let err = table.try_grow_to(3, |pos| if pos < 2 { Ok('x') } else { Err(pos) });
    /// assert_eq!(err, Err(2));
    /// assert_eq!(table.as_slice(), &['x', 'x']);
    /// ```
    pub fn try_grow_to<E, F>(&mut self, key: I, mut fill: F) -> Result<(), E>
    where
        F: FnMut(I) -> Result<T, E>,
    {
        let wanted = key.index().saturating_add(1);
        while self.raw.len() < wanted {
            let value = fill(I::from_usize(self.raw.len()))?;
            self.raw.push(value);
        }
        Ok(())
    }
}

impl<I: Idx, T> Index<I> for IndexVec<I, T> {
    type Output = T;

    #[inline]
    fn index(&self, key: I) -> &T {
        &self.raw[key.index()]
    }
}

impl<I, T> Default for IndexVec<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, T: fmt::Debug> fmt::Debug for IndexVec<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.raw).finish()
    }
}

/// Declare a `u32` newtype usable as an [`Idx`]
///
/// ```
/// use hsgen_util::{define_idx, Idx};
///
/// define_idx!(
///     /// Position of a call site
///     CallSiteId
/// );
///
/// assert_eq!(CallSiteId::from_usize(4), CallSiteId(4));
/// assert_eq!(CallSiteId(4).index(), 4);
/// ```
#[macro_export]
macro_rules! define_idx {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $crate::index_vec::Idx for $name {
            fn from_usize(idx: usize) -> Self {
                match u32::try_from(idx) {
                    Ok(raw) => $name(raw),
                    Err(_) => panic!("{} index {} does not fit in u32", stringify!($name), idx),
                }
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        $crate::__static_assertions::assert_eq_size!($name, u32);
    };
}
