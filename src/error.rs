use std::alloc::{self, Layout, LayoutError};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Failure to obtain the auxiliary buffer of an allocating sort.
///
/// When a sort returns this error the input has not been modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortError {
    /// The requested scratch length does not fit into the address space.
    CapacityOverflow,

    /// The allocator refused to provide the scratch memory.
    AllocFailed {
        /// Layout of the requested scratch buffer.
        layout: Layout,
    },
}

impl SortError {
    /// Escalates the error the way `Vec` does on allocation failure.
    pub(crate) fn handle(self) -> ! {
        match self {
            SortError::CapacityOverflow => panic!("capacity overflow"),
            SortError::AllocFailed { layout } => alloc::handle_alloc_error(layout),
        }
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SortError::CapacityOverflow => write!(f, "scratch buffer length overflows usize"),
            SortError::AllocFailed { layout } => write!(
                f,
                "failed to allocate a {} byte scratch buffer (align {})",
                layout.size(),
                layout.align()
            ),
        }
    }
}

impl Error for SortError {}

impl From<LayoutError> for SortError {
    fn from(_: LayoutError) -> Self {
        SortError::CapacityOverflow
    }
}

/// Reserves an empty buffer able to hold `len` elements without reallocating.
///
/// The returned `Vec` always has length zero, it only serves as scratch memory for shallow copies.
pub(crate) fn alloc_scratch<T>(len: usize) -> Result<Vec<T>, SortError> {
    let mut buf = Vec::new();
    grow_scratch(&mut buf, len)?;
    Ok(buf)
}

/// Makes sure the empty scratch buffer `buf` can hold `len` elements.
pub(crate) fn grow_scratch<T>(buf: &mut Vec<T>, len: usize) -> Result<(), SortError> {
    debug_assert!(buf.is_empty());

    if buf.capacity() >= len {
        return Ok(());
    }

    if buf.try_reserve_exact(len).is_err() {
        let layout = Layout::array::<T>(len)?;
        return Err(SortError::AllocFailed { layout });
    }
    Ok(())
}
