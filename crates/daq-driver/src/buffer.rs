//! Page-aligned, single-owner DMA transfer buffer.
//!
//! The XDMA engine requires host buffers aligned to [`DMA_ALIGNMENT`]. A
//! buffer of length `n` owns a block of `n + DMA_ALIGNMENT` bytes so the
//! driver may round the tail of a transfer up to a full page.
//!
//! Invariants:
//! - an allocated block's address is a multiple of [`DMA_ALIGNMENT`];
//! - `len() == 0` exactly when no block is held;
//! - the block is released on every exit path, including drop.
//!
//! The type is move-only. It is neither `Clone` nor `Copy`.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::fmt;
use std::path::Path;
use std::ptr::NonNull;

use bytemuck::Pod;
use daq_card::bus::DMA_ALIGNMENT;

use crate::device::{Access, DeviceNode};
use crate::error::{DaqError, Result};

/// Exclusively owned, 4096-aligned byte buffer.
pub struct AlignedDmaBuffer {
    block: Option<NonNull<u8>>,
    len: usize,
}

impl AlignedDmaBuffer {
    /// Unallocated buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block: None,
            len: 0,
        }
    }

    /// Buffer allocated to `n` zeroed bytes.
    ///
    /// # Errors
    ///
    /// See [`Self::allocate`].
    pub fn with_len(n: usize) -> Result<Self> {
        let mut buf = Self::new();
        buf.allocate(n)?;
        Ok(buf)
    }

    fn layout(len: usize) -> Result<Layout> {
        let bytes = len.checked_add(DMA_ALIGNMENT).ok_or(DaqError::Allocation {
            bytes: usize::MAX,
            align: DMA_ALIGNMENT,
        })?;
        Layout::from_size_align(bytes, DMA_ALIGNMENT).map_err(|_| DaqError::Allocation {
            bytes,
            align: DMA_ALIGNMENT,
        })
    }

    /// Release any held block, then allocate `n` zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::ZeroLength`] for `n == 0` and
    /// [`DaqError::Allocation`] if the allocator refuses the block. The
    /// buffer is unallocated after any error.
    pub fn allocate(&mut self, n: usize) -> Result<()> {
        self.release();
        if n == 0 {
            return Err(DaqError::ZeroLength {
                operation: "buffer allocation",
            });
        }
        let layout = Self::layout(n)?;

        // SAFETY: layout has non-zero size (n + 4096) and a power-of-two
        // alignment; the block is freed in `release` with the same layout.
        let ptr = unsafe { alloc_zeroed(layout) };
        let block = NonNull::new(ptr).ok_or(DaqError::Allocation {
            bytes: layout.size(),
            align: DMA_ALIGNMENT,
        })?;

        self.block = Some(block);
        self.len = n;
        tracing::trace!("allocated {} byte DMA buffer at {ptr:p}", layout.size());
        Ok(())
    }

    /// Free the block. Idempotent.
    pub fn release(&mut self) {
        if let Some(block) = self.block.take() {
            // The layout was valid when the block was allocated with this len.
            if let Ok(layout) = Self::layout(self.len) {
                // SAFETY: block came from alloc_zeroed with exactly this layout
                // and has not been freed; `take` cleared our only handle to it.
                unsafe { dealloc(block.as_ptr(), layout) };
            }
            tracing::trace!("released {} byte DMA buffer", self.len);
        }
        self.len = 0;
    }

    /// Usable length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// `true` when no block is held.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes held by the allocation, `len + 4096`, or 0 when unallocated.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        if self.block.is_some() {
            self.len + DMA_ALIGNMENT
        } else {
            0
        }
    }

    /// Start of the block, null when unallocated.
    #[must_use]
    pub fn as_ptr(&self) -> *const u8 {
        self.block
            .map_or(std::ptr::null(), |b| b.as_ptr().cast_const())
    }

    /// The `len` usable bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self.block {
            // SAFETY: block is valid for len + 4096 initialized (zeroed) bytes
            // and borrowed immutably through &self.
            Some(b) => unsafe { std::slice::from_raw_parts(b.as_ptr(), self.len) },
            None => &[],
        }
    }

    /// The `len` usable bytes, mutably.
    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self.block {
            // SAFETY: as above; &mut self guarantees exclusive access.
            Some(b) => unsafe { std::slice::from_raw_parts_mut(b.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    fn checked_bytes<T: Pod>(&self, count: usize) -> Result<usize> {
        let requested = count
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(DaqError::ViewOutOfBounds {
                requested: usize::MAX,
                available: self.len,
            })?;
        if requested > self.len {
            return Err(DaqError::ViewOutOfBounds {
                requested,
                available: self.len,
            });
        }
        Ok(requested)
    }

    /// First `count` elements viewed as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::ViewOutOfBounds`] if `count * size_of::<T>()`
    /// exceeds the length.
    pub fn view<T: Pod>(&self, count: usize) -> Result<&[T]> {
        let bytes = self.checked_bytes::<T>(count)?;
        bytemuck::try_cast_slice(&self.as_bytes()[..bytes]).map_err(|_| DaqError::ViewOutOfBounds {
            requested: bytes,
            available: self.len,
        })
    }

    /// First `count` elements viewed mutably as `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::view`].
    pub fn view_mut<T: Pod>(&mut self, count: usize) -> Result<&mut [T]> {
        let bytes = self.checked_bytes::<T>(count)?;
        let available = self.len;
        bytemuck::try_cast_slice_mut(&mut self.as_bytes_mut()[..bytes]).map_err(|_| {
            DaqError::ViewOutOfBounds {
                requested: bytes,
                available,
            }
        })
    }

    /// Copy of the first `count` elements.
    ///
    /// # Errors
    ///
    /// Same as [`Self::view`].
    pub fn to_vec<T: Pod>(&self, count: usize) -> Result<Vec<T>> {
        Ok(self.view::<T>(count)?.to_vec())
    }

    /// Copy of every whole `T` in the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::EmptyBuffer`] when unallocated.
    pub fn to_vec_all<T: Pod>(&self) -> Result<Vec<T>> {
        if self.is_empty() {
            return Err(DaqError::EmptyBuffer);
        }
        let count = self.len / std::mem::size_of::<T>().max(1);
        self.to_vec(count)
    }

    /// Replace the contents with `data`, reallocating if the length differs.
    ///
    /// # Errors
    ///
    /// Returns [`DaqError::EmptyBuffer`] for empty input, or an allocation
    /// error.
    pub fn from_slice<T: Pod>(&mut self, data: &[T]) -> Result<()> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        if bytes.is_empty() {
            return Err(DaqError::EmptyBuffer);
        }
        if self.len != bytes.len() || self.block.is_none() {
            self.allocate(bytes.len())?;
        }
        self.as_bytes_mut().copy_from_slice(bytes);
        Ok(())
    }

    /// Allocate `n` bytes and read them from `path` at `file_offset`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened, the seek misses, or fewer
    /// than `n` bytes are read. The buffer is released on any error.
    pub fn fill_from_file(&mut self, path: impl AsRef<Path>, file_offset: u64, n: usize) -> Result<()> {
        let path = path.as_ref();
        let result = self.allocate(n).and_then(|()| {
            let file = DeviceNode::open(path, Access::Read)?;
            file.seek_to(file_offset)?;
            file.read_full(self.as_bytes_mut())
        });
        if result.is_err() {
            self.release();
        }
        result
    }

    /// Write `min(n, len)` bytes to `path` at `file_offset`, creating it with
    /// mode 0666 if needed. Existing content outside the range is kept.
    ///
    /// # Errors
    ///
    /// Returns error if unallocated, if the file cannot be opened, the seek
    /// misses, or the write is short.
    pub fn drain_to_file(&self, path: impl AsRef<Path>, file_offset: u64, n: usize) -> Result<()> {
        if self.is_empty() {
            return Err(DaqError::EmptyBuffer);
        }
        let count = n.min(self.len);
        let file = DeviceNode::open(path.as_ref(), Access::Create)?;
        file.seek_to(file_offset)?;
        file.write_full(&self.as_bytes()[..count])
    }
}

impl Default for AlignedDmaBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AlignedDmaBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for AlignedDmaBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedDmaBuffer")
            .field("ptr", &self.as_ptr())
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}

// SAFETY: AlignedDmaBuffer owns its block exclusively; no aliasing handle
// exists outside the struct.
unsafe impl Send for AlignedDmaBuffer {}

// SAFETY: shared access only hands out &[u8]; mutation requires &mut self.
unsafe impl Sync for AlignedDmaBuffer {}
