use alloc::alloc::{Layout, alloc, dealloc, handle_alloc_error};
use core::{marker::PhantomData, ptr, ptr::NonNull};

use crate::{Error, utils::IsZST};

/// The raw buffer behind a [`FixedVec`](crate::FixedVec).
///
/// Owns `cap` uninitialized slots and the live length. Slots `[0, len)` hold
/// valid values, the rest are vacant. The buffer is released on drop, but
/// live elements are *not* dropped here; that is the owner's job.
///
/// Every slot primitive is `unsafe`: the caller tracks which slots are live
/// and keeps `len` in sync with that.
pub(crate) struct Storage<T> {
    ptr: NonNull<T>,
    cap: usize,
    len: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T> Send for Storage<T> where T: Send {}
unsafe impl<T> Sync for Storage<T> where T: Sync {}

impl<T> Drop for Storage<T> {
    fn drop(&mut self) {
        if let Some(layout) = self.layout() {
            // SAFETY: allocated in `try_allocate` with the same layout.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) }
        }
    }
}

impl<T> Storage<T> {
    /// Allocates room for exactly `capacity` elements.
    ///
    /// # Panics
    /// Panics if the byte size overflows `isize::MAX`; aborts through
    /// [`handle_alloc_error`] if the allocator fails.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        match Self::try_allocate(capacity) {
            Ok(storage) => storage,
            Err(Some(layout)) => handle_alloc_error(layout),
            Err(None) => capacity_overflow(),
        }
    }

    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::try_allocate(capacity).map_err(|_| Error::AllocFailed)
    }

    /// `Err(None)` for a layout overflow, `Err(Some(layout))` for an allocator failure.
    fn try_allocate(capacity: usize) -> Result<Self, Option<Layout>> {
        if T::IS_ZST || capacity == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                cap: capacity,
                len: 0,
                _marker: PhantomData,
            });
        }

        let layout = Layout::array::<T>(capacity).map_err(|_| None)?;
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc(layout) } as *mut T;
        match NonNull::new(raw) {
            Some(ptr) => Ok(Self {
                ptr,
                cap: capacity,
                len: 0,
                _marker: PhantomData,
            }),
            None => Err(Some(layout)),
        }
    }

    /// The layout the buffer was allocated with, or `None` if nothing was allocated.
    #[inline]
    fn layout(&self) -> Option<Layout> {
        if T::IS_ZST || self.cap == 0 {
            None
        } else {
            // SAFETY: the same computation succeeded at allocation time.
            Some(unsafe {
                Layout::from_size_align_unchecked(
                    core::mem::size_of::<T>() * self.cap,
                    core::mem::align_of::<T>(),
                )
            })
        }
    }

    #[inline(always)]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub(crate) const fn capacity(&self) -> usize {
        self.cap
    }

    /// # Safety
    /// `len <= capacity`, and exactly the slots `[0, len)` are live afterwards.
    #[inline(always)]
    pub(crate) const unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.cap);
        self.len = len;
    }

    #[inline(always)]
    pub(crate) const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline(always)]
    pub(crate) const fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Address of slot `index`. Valid for `index <= capacity` (one past the end included).
    #[inline(always)]
    pub(crate) fn slot(&mut self, index: usize) -> *mut T {
        debug_assert!(index <= self.cap, "slot {index} outside capacity {}", self.cap);
        // SAFETY: within (or one past) the allocation; a no-op offset for ZSTs.
        unsafe { self.as_mut_ptr().add(index) }
    }

    /// Constructs `value` in slot `index`.
    ///
    /// # Safety
    /// `index < capacity` and the slot is vacant.
    #[inline(always)]
    pub(crate) unsafe fn construct(&mut self, index: usize, value: T) {
        debug_assert!(index < self.cap);
        unsafe { ptr::write(self.slot(index), value) }
    }

    /// Runs the destructor of slot `index`, leaving it vacant.
    ///
    /// # Safety
    /// The slot is live.
    #[inline(always)]
    pub(crate) unsafe fn destroy(&mut self, index: usize) {
        debug_assert!(index < self.cap);
        unsafe { ptr::drop_in_place(self.slot(index)) }
    }

    /// Runs the destructors of slots `[start, end)`.
    ///
    /// A panicking destructor does not stop the rest of the range from being dropped.
    ///
    /// # Safety
    /// Every slot in the range is live.
    #[inline]
    pub(crate) unsafe fn destroy_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.cap);
        if start < end {
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.slot(start), end - start));
            }
        }
    }

    /// Moves the value out of slot `index`, leaving it vacant.
    ///
    /// # Safety
    /// The slot is live.
    #[inline(always)]
    pub(crate) unsafe fn take(&mut self, index: usize) -> T {
        debug_assert!(index < self.cap);
        unsafe { ptr::read(self.slot(index)) }
    }

    /// Relocates `count` slots from `src` to `dst`.
    ///
    /// Overlapping runs are handled, so the highest source slot of an upward
    /// shift is read before anything overwrites it. After the call the
    /// destination run is live and the part of the source run outside it is
    /// vacant.
    ///
    /// # Safety
    /// Both runs lie inside the capacity, the source run is live and the
    /// destination slots outside the source run are vacant.
    #[inline]
    pub(crate) unsafe fn relocate(&mut self, src: usize, dst: usize, count: usize) {
        debug_assert!(src + count <= self.cap && dst + count <= self.cap);
        if !T::IS_ZST && count > 0 && src != dst {
            let base = self.as_mut_ptr();
            unsafe { ptr::copy(base.add(src), base.add(dst), count) }
        }
    }
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}
