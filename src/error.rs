use std::alloc::Layout;
use std::fmt::{self, Display};

/// Failure to obtain a block of raw storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageError {
    /// Requested capacity does not fit in a valid allocation size.
    CapacityOverflow,
    /// The global allocator returned no memory for `layout`.
    AllocFailed { layout: Layout },
}

impl StorageError {
    /// Turns the error into the same abort the standard collections use.
    pub(crate) fn fail(self) -> ! {
        match self {
            StorageError::CapacityOverflow => panic!("capacity overflow"),
            StorageError::AllocFailed { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::CapacityOverflow => Display::fmt("requested capacity exceeds the maximum allocation size", f),
            StorageError::AllocFailed { layout } => write!(
                f,
                "memory allocation of {} bytes (align {}) failed",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl std::error::Error for StorageError {}

/// Failure of an operation that both allocates and constructs elements.
#[derive(Debug, PartialEq, Eq)]
pub enum ConstructError<E> {
    Storage(StorageError),
    /// The element constructor reported an error.
    Element(E),
}

impl<E> From<StorageError> for ConstructError<E> {
    fn from(e: StorageError) -> Self {
        ConstructError::Storage(e)
    }
}

impl<E: Display> Display for ConstructError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructError::Storage(e) => Display::fmt(e, f),
            ConstructError::Element(e) => write!(f, "element construction failed - {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ConstructError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConstructError::Storage(e) => Some(e),
            ConstructError::Element(e) => Some(e),
        }
    }
}
