//! Barrier kinds and access descriptions

/// Kind of barrier a memory access needs
///
/// Shared by every collector: the generic policy only ever produces a
/// subset, and each barrier set maps the kinds it supports onto its own
/// runtime stubs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierType {
    /// No barrier
    None,
    /// Store into an object field
    Field,
    /// Store into an array element
    Array,
    /// Store whose target may be a field or an array element
    Unknown,
    /// Store into a freshly allocated object before it is published
    PostInitWrite,
    /// Store that must not keep the old value alive
    AsNoKeepaliveWrite,
    /// Ordinary reference load
    Read,
    /// Load of `Reference.referent` through `Reference.get()`
    ReferenceGet,
    /// Weak reachability check (`refersTo` on a weak reference)
    WeakRefersTo,
    /// Phantom reachability check (`refersTo` on a phantom reference)
    PhantomRefersTo,
}

impl BarrierType {
    pub const ALL: &'static [BarrierType] = &[
        BarrierType::None,
        BarrierType::Field,
        BarrierType::Array,
        BarrierType::Unknown,
        BarrierType::PostInitWrite,
        BarrierType::AsNoKeepaliveWrite,
        BarrierType::Read,
        BarrierType::ReferenceGet,
        BarrierType::WeakRefersTo,
        BarrierType::PhantomRefersTo,
    ];

    /// Whether this kind belongs to the load side
    pub fn is_read(self) -> bool {
        matches!(
            self,
            BarrierType::Read
                | BarrierType::ReferenceGet
                | BarrierType::WeakRefersTo
                | BarrierType::PhantomRefersTo
        )
    }
}

/// Semantics of a reference store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Ordinary store
    Plain,
    /// Compare-and-swap or atomic read-modify-write
    Atomic,
    /// Store into memory outside the managed heap
    Native,
}

impl StoreKind {
    pub const ALL: &'static [StoreKind] = &[StoreKind::Plain, StoreKind::Atomic, StoreKind::Native];
}

/// Classification of the memory location being accessed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationClass {
    /// Instance or static field
    Field,
    /// Array element
    Array,
    /// Thread-owned oop handle, reached only through an indirection table
    Handle,
    /// Field of an object still being initialized
    Init,
    /// `Reference.referent`
    ReferenceReferent,
    /// Any other location, including raw offsets into unknown objects
    Any,
}

/// One memory access the emitter is about to lower
///
/// Built on the stack for a single dispatch call and dropped right after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierRequest {
    Read {
        location: LocationClass,
        is_object: bool,
    },
    Write {
        location: LocationClass,
        is_object: bool,
        store: StoreKind,
    },
}

impl BarrierRequest {
    /// Reference load from `location`
    pub fn read(location: LocationClass) -> Self {
        BarrierRequest::Read {
            location,
            is_object: true,
        }
    }

    /// Reference store to `location`
    pub fn write(location: LocationClass, store: StoreKind) -> Self {
        BarrierRequest::Write {
            location,
            is_object: true,
            store,
        }
    }

    pub fn location(&self) -> LocationClass {
        match *self {
            BarrierRequest::Read { location, .. } | BarrierRequest::Write { location, .. } => {
                location
            }
        }
    }
}
