use alloc::{boxed::Box, vec::Vec};
use core::{
    fmt,
    iter::FusedIterator,
    mem::{self, ManuallyDrop, MaybeUninit},
    ops::RangeBounds,
    ptr, slice,
};

use crate::{
    Error, Iter, IterMut,
    storage::Storage,
    utils::{IsZST, cold_path, split_range_bound},
};

/// A vector whose capacity is fixed when it is created.
///
/// The buffer is allocated once, by the constructor, and is never grown,
/// shrunk or reallocated afterwards. Elements are only ever relocated inside
/// that buffer, by the operations that open or close a gap (`emplace`,
/// `insert_n`, `remove`, `erase`, ...).
///
/// Operations that would exceed the capacity, pop from an empty vector or
/// address a slot outside the live range return an [`Error`] and leave the
/// vector untouched.
///
/// # Examples
///
/// ```
/// use fixedvec::{Error, FixedVec};
///
/// let mut vec: FixedVec<String> = FixedVec::with_capacity(3);
/// assert_eq!(vec.capacity(), 3);
///
/// vec.push("a".to_string())?;
/// vec.emplace_back(|| "c".to_string())?;
/// vec.insert(1, "b".to_string())?;
/// assert_eq!(vec, ["a", "b", "c"]);
///
/// // The capacity never changes.
/// assert_eq!(vec.push("d".to_string()), Err(Error::Full));
/// assert_eq!(vec.capacity(), 3);
/// # Ok::<(), Error>(())
/// ```
///
/// # Panic safety
///
/// Element constructors, clones and destructors may panic in the middle of a
/// multi-element operation. The vector always stays consistent: elements the
/// failed operation created are dropped again, displaced elements are moved
/// back where possible, and [`len`](FixedVec::len) only counts live elements.
///
/// # ZST support
///
/// Zero-sized elements never allocate. The capacity is still enforced.
pub struct FixedVec<T> {
    buf: Storage<T>,
}

impl<T> Drop for FixedVec<T> {
    fn drop(&mut self) {
        let len = self.buf.len();
        // SAFETY: `[0, len)` is live; the length is cleared first so nothing is dropped twice.
        unsafe {
            self.buf.set_len(0);
            self.buf.destroy_range(0, len);
        }
    }
}

/// Creates a [`FixedVec`] containing the arguments.
///
/// The capacity equals the number of elements.
///
/// - `fixedvec![]` is an empty vector with capacity zero.
/// - `fixedvec![elem; n]` clones `elem` into `n` slots (see [`FixedVec::from_elem`]).
/// - `fixedvec![a, b, c]` moves each argument into its slot (see [`FixedVec::from_array`]).
///
/// # Examples
///
/// ```
/// # use fixedvec::{fixedvec, FixedVec};
/// let vec: FixedVec<String> = fixedvec![];
/// assert_eq!(vec.capacity(), 0);
///
/// let vec = fixedvec![0u8; 4];
/// assert_eq!(vec, [0, 0, 0, 0]);
///
/// let vec = fixedvec![1, 2, 3];
/// assert_eq!(vec.capacity(), 3);
/// ```
#[macro_export]
macro_rules! fixedvec {
    [] => { $crate::FixedVec::with_capacity(0) };
    [$elem:expr; $n:expr] => { $crate::FixedVec::from_elem($elem, $n) };
    [$($item:expr),+ $(,)?] => { $crate::FixedVec::from_array([ $($item),+ ]) };
}

impl<T> FixedVec<T> {
    /// Constructs an empty vector with room for exactly `capacity` elements.
    ///
    /// No element is constructed. Zero-sized types and a zero capacity do not allocate.
    ///
    /// # Panics
    /// Panics if the buffer size overflows `isize::MAX` bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fixedvec::FixedVec;
    /// let vec: FixedVec<i32> = FixedVec::with_capacity(10);
    /// assert_eq!(vec.len(), 0);
    /// assert_eq!(vec.capacity(), 10);
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Storage::with_capacity(capacity),
        }
    }

    /// Like [`with_capacity`](FixedVec::with_capacity), but reports
    /// [`Error::AllocFailed`] instead of panicking or aborting.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fixedvec::{Error, FixedVec};
    /// assert!(FixedVec::<u8>::try_with_capacity(64).is_ok());
    /// assert_eq!(
    ///     FixedVec::<u64>::try_with_capacity(usize::MAX).unwrap_err(),
    ///     Error::AllocFailed,
    /// );
    /// ```
    #[inline]
    pub fn try_with_capacity(capacity: usize) -> Result<Self, Error> {
        Ok(Self {
            buf: Storage::try_with_capacity(capacity)?,
        })
    }

    /// Creates a vector from an array, moving every element into its slot.
    ///
    /// Capacity and length both equal `P`.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::FixedVec;
    /// let vec = FixedVec::from_array(["a", "b"]);
    /// assert_eq!(vec.capacity(), 2);
    /// assert_eq!(vec, ["a", "b"]);
    /// ```
    #[inline]
    pub fn from_array<const P: usize>(arr: [T; P]) -> Self {
        let mut vec = Self::with_capacity(P);
        let arr = ManuallyDrop::new(arr);
        // SAFETY: `P` vacant slots are available; ownership moves out of `arr`.
        unsafe {
            if !T::IS_ZST {
                ptr::copy_nonoverlapping(arr.as_ptr(), vec.as_mut_ptr(), P);
            }
            vec.buf.set_len(P);
        }
        vec
    }

    /// Creates a vector holding exactly one element, built by `f` directly
    /// into its slot.
    ///
    /// This works for element types that are neither [`Clone`] nor meant to
    /// be moved around after they are built.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::FixedVec;
    /// struct Pinned { id: u32, weight: u32 }
    ///
    /// let vec = FixedVec::with_emplaced(|| Pinned { id: 10, weight: 2 });
    /// assert_eq!(vec.len(), 1);
    /// assert_eq!(vec.capacity(), 1);
    /// assert_eq!(vec[0].id, 10);
    /// ```
    #[inline]
    pub fn with_emplaced<F: FnOnce() -> T>(f: F) -> Self {
        let mut vec = Self::with_capacity(1);
        // SAFETY: slot 0 is vacant; a panic in `f` leaves the vector empty.
        unsafe {
            vec.buf.construct(0, f());
            vec.buf.set_len(1);
        }
        vec
    }

    /// Moves every element of a [`Vec`] into a new vector whose capacity is
    /// the `Vec`'s length. Elements are relocated, never cloned.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::FixedVec;
    /// let mut source = Vec::with_capacity(16);
    /// source.extend([1, 2, 3]);
    ///
    /// let vec = FixedVec::from_vec(source);
    /// assert_eq!(vec.capacity(), 3);
    /// ```
    pub fn from_vec(mut vec: Vec<T>) -> Self {
        let len = vec.len();
        let mut res = Self::with_capacity(len);
        // SAFETY: `len` vacant slots; `vec` gives up ownership via `set_len(0)`.
        unsafe {
            if !T::IS_ZST {
                ptr::copy_nonoverlapping(vec.as_ptr(), res.as_mut_ptr(), len);
            }
            vec.set_len(0);
            res.buf.set_len(len);
        }
        res
    }

    /// Moves every element into a new vector of the same capacity, leaving
    /// `self` empty.
    ///
    /// The source keeps its buffer and capacity, so it can be refilled.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::FixedVec;
    /// let mut src: FixedVec<String> = FixedVec::with_capacity(4);
    /// src.push("x".to_string()).unwrap();
    ///
    /// let dst = src.take();
    /// assert_eq!(dst, ["x"]);
    /// assert_eq!(dst.capacity(), 4);
    /// assert!(src.is_empty());
    /// assert_eq!(src.capacity(), 4);
    /// ```
    pub fn take(&mut self) -> Self {
        let len = self.buf.len();
        let mut dst = Self::with_capacity(self.buf.capacity());
        // SAFETY: both buffers hold `capacity` slots; ownership of `[0, len)` moves over.
        unsafe {
            if !T::IS_ZST {
                ptr::copy_nonoverlapping(self.as_ptr(), dst.as_mut_ptr(), len);
            }
            self.buf.set_len(0);
            dst.buf.set_len(len);
        }
        dst
    }

    /// Returns a raw pointer to the buffer, or a dangling pointer if nothing
    /// was allocated.
    ///
    /// The pointer stays valid for the lifetime of the vector: the buffer is never reallocated.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a raw mutable pointer to the buffer, or a dangling pointer if
    /// nothing was allocated.
    #[inline(always)]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Forces the length of the vector to `new_len`.
    ///
    /// # Safety
    /// - `new_len <= capacity`.
    /// - Slots `[old_len, new_len)` are initialized when growing.
    /// - Slots `[new_len, old_len)` are taken care of by the caller when shrinking.
    ///
    /// See [`Vec::set_len`].
    #[inline(always)]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        assert!(new_len <= self.buf.capacity(), "length should be <= capacity");
        unsafe { self.buf.set_len(new_len) }
    }

    /// Returns the number of live elements.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns the fixed number of elements the vector can hold.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns `true` if the vector contains no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.buf.len() == 0
    }

    /// Returns `true` if `len == capacity`.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::FixedVec;
    /// let mut v = FixedVec::with_capacity(1);
    /// assert!(!v.is_full());
    /// v.push(1).unwrap();
    /// assert!(v.is_full());
    /// ```
    #[inline(always)]
    pub const fn is_full(&self) -> bool {
        self.buf.len() >= self.buf.capacity()
    }

    /// Number of elements that can still be added.
    #[inline(always)]
    pub const fn remaining_capacity(&self) -> usize {
        self.buf.capacity() - self.buf.len()
    }

    /// Extracts a slice containing the entire vector.
    #[inline]
    pub const fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.buf.len()) }
    }

    /// Extracts a mutable slice containing the entire vector.
    #[inline]
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.buf.len();
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), len) }
    }

    /// Bounds-checked access to the element at `index`.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{fixedvec, Error};
    /// let vec = fixedvec![1, 2, 3];
    /// assert_eq!(vec.at(1), Ok(&2));
    /// assert_eq!(vec.at(3), Err(Error::OutOfBounds));
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, Error> {
        self.as_slice().get(index).ok_or(Error::OutOfBounds)
    }

    /// Bounds-checked mutable access to the element at `index`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        self.as_mut_slice().get_mut(index).ok_or(Error::OutOfBounds)
    }

    /// Returns an iterator over the live elements.
    ///
    /// The iterator borrows the vector, so it cannot outlive a mutation that
    /// would relocate elements.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_slice())
    }

    /// Returns an iterator that allows modifying each element.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.as_mut_slice())
    }

    /// Returns the vacant tail of the buffer as a slice of `MaybeUninit<T>`.
    ///
    /// Fill it, then publish the new elements with [`set_len`](FixedVec::set_len).
    ///
    /// # Examples
    ///
    /// ```
    /// # use fixedvec::FixedVec;
    /// let mut v = FixedVec::<i32>::with_capacity(4);
    ///
    /// let uninit = v.spare_capacity_mut();
    /// uninit[0].write(7);
    /// uninit[1].write(8);
    ///
    /// unsafe { v.set_len(2) };
    /// assert_eq!(v, [7, 8]);
    /// ```
    #[inline]
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<T>] {
        let len = self.buf.len();
        let spare = self.buf.capacity() - len;
        unsafe { slice::from_raw_parts_mut(self.buf.slot(len) as *mut MaybeUninit<T>, spare) }
    }

    /// Appends without checking the capacity.
    ///
    /// # Safety
    /// `len < capacity`.
    #[inline(always)]
    unsafe fn push_unchecked(&mut self, value: T) {
        let len = self.buf.len();
        unsafe {
            self.buf.construct(len, value);
            self.buf.set_len(len + 1);
        }
    }

    /// Constructs a new element at the back with the value returned by `f`.
    ///
    /// No existing element is touched. If the vector is full, `f` is not
    /// called and [`Error::Full`] is returned.
    ///
    /// # Time complexity
    /// O(1)
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{Error, FixedVec};
    /// let mut vec = FixedVec::with_capacity(1);
    /// let slot = vec.emplace_back(|| String::from("hi"))?;
    /// slot.push('!');
    /// assert_eq!(vec, ["hi!"]);
    ///
    /// assert_eq!(vec.emplace_back(|| unreachable!()), Err(Error::Full));
    /// # Ok::<(), Error>(())
    /// ```
    #[inline]
    pub fn emplace_back<F: FnOnce() -> T>(&mut self, f: F) -> Result<&mut T, Error> {
        let len = self.buf.len();
        if len >= self.buf.capacity() {
            cold_path();
            return Err(Error::Full);
        }

        // SAFETY: `len < capacity`, so the slot is vacant.
        unsafe {
            self.buf.construct(len, f());
            self.buf.set_len(len + 1);
            Ok(&mut *self.buf.slot(len))
        }
    }

    /// Appends an element to the back of the vector.
    ///
    /// On [`Error::Full`] the value is dropped.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{Error, FixedVec};
    /// let mut vec = FixedVec::with_capacity(2);
    /// vec.push(1)?;
    /// vec.push(2)?;
    /// assert!(vec.push(3).is_err());
    /// assert_eq!(vec, [1, 2]);
    /// # Ok::<(), Error>(())
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) -> Result<&mut T, Error> {
        self.emplace_back(|| value)
    }

    /// Removes the last element and returns it.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{fixedvec, Error};
    /// let mut vec = fixedvec![1];
    /// assert_eq!(vec.pop(), Ok(1));
    /// assert_eq!(vec.pop(), Err(Error::Empty));
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Result<T, Error> {
        let len = self.buf.len();
        if len == 0 {
            cold_path();
            return Err(Error::Empty);
        }

        // SAFETY: slot `len - 1` is live and leaves the live range here.
        unsafe {
            self.buf.set_len(len - 1);
            Ok(self.buf.take(len - 1))
        }
    }

    /// Replaces the element at `index` by destroying it and constructing the
    /// value returned by `f` in the same slot.
    ///
    /// This is never an assignment, so `T` does not need to support one.
    /// The length is unchanged.
    ///
    /// If `f` (or the old element's destructor) panics, the slot cannot be
    /// refilled: the tail is shifted down to close the hole and the length
    /// shrinks by one before the panic propagates.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{fixedvec, Error};
    /// let mut vec = fixedvec![0, 1, 2, 3];
    /// vec.emplace_at(1, || 100)?;
    /// assert_eq!(vec, [0, 100, 2, 3]);
    ///
    /// assert_eq!(vec.emplace_at(4, || 0), Err(Error::OutOfBounds));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn emplace_at<F: FnOnce() -> T>(&mut self, index: usize, f: F) -> Result<&mut T, Error> {
        let len = self.buf.len();
        if index >= len {
            cold_path();
            return Err(Error::OutOfBounds);
        }

        // SAFETY: `index` is live. While it is vacant the guard is armed to
        // close the hole on unwind.
        unsafe {
            let guard = CloseGap {
                buf: &mut self.buf,
                src: index + 1,
                dst: index,
                tail: len - index - 1,
            };
            guard.buf.destroy(index);
            let value = f();
            guard.buf.construct(index, value);
            mem::forget(guard);
            Ok(&mut *self.buf.slot(index))
        }
    }

    /// Opens a vacant gap of `count` slots at `index`, relocating the tail up.
    ///
    /// # Safety
    /// `index <= len` and `len + count <= capacity`.
    unsafe fn open_gap(&mut self, index: usize, count: usize) -> OpenGap<'_, T> {
        let len = self.buf.len();
        debug_assert!(index <= len && count <= self.buf.capacity() - len);
        // SAFETY: the tail `[index, len)` moves to `[index + count, len + count)`,
        // which fits in the capacity; until the gap is filled only `[0, index)` is owned.
        unsafe {
            self.buf.set_len(index);
            self.buf.relocate(index, index + count, len - index);
        }
        OpenGap {
            buf: &mut self.buf,
            start: index,
            count,
            filled: 0,
            len,
        }
    }

    /// Inserts the value returned by `f` before position `index`, shifting
    /// all elements after it one slot up.
    ///
    /// `index` may equal `len`, which appends. The displaced tail is relocated
    /// first, then the new element is constructed in the vacated slot. If `f`
    /// panics, the tail is moved back and the vector is unchanged.
    ///
    /// # Time complexity
    /// O(len - index)
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{FixedVec, Error};
    /// let mut vec = FixedVec::with_capacity(3);
    /// vec.push(1)?;
    /// vec.push(2)?;
    /// vec.emplace(0, || 0)?;
    /// assert_eq!(vec, [0, 1, 2]);
    ///
    /// assert_eq!(vec.emplace(0, || 9), Err(Error::Full));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn emplace<F: FnOnce() -> T>(&mut self, index: usize, f: F) -> Result<&mut T, Error> {
        let len = self.buf.len();
        if index > len {
            cold_path();
            return Err(Error::OutOfBounds);
        }
        if len >= self.buf.capacity() {
            cold_path();
            return Err(Error::Full);
        }

        // SAFETY: bounds checked above.
        unsafe {
            let mut gap = self.open_gap(index, 1);
            gap.fill(f());
            gap.finish();
            Ok(&mut *self.buf.slot(index))
        }
    }

    /// Inserts `element` before position `index`.
    ///
    /// See [`emplace`](FixedVec::emplace).
    #[inline]
    pub fn insert(&mut self, index: usize, element: T) -> Result<&mut T, Error> {
        self.emplace(index, || element)
    }

    /// Removes and returns the element at `index`, shifting the tail down.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{fixedvec, Error};
    /// let mut vec = fixedvec![1, 2, 3];
    /// assert_eq!(vec.remove(1), Ok(2));
    /// assert_eq!(vec, [1, 3]);
    /// assert_eq!(vec.remove(2), Err(Error::OutOfBounds));
    /// ```
    pub fn remove(&mut self, index: usize) -> Result<T, Error> {
        let len = self.buf.len();
        if index >= len {
            cold_path();
            return Err(Error::OutOfBounds);
        }

        unsafe {
            let value = self.buf.take(index);
            self.buf.relocate(index + 1, index, len - index - 1);
            self.buf.set_len(len - 1);
            Ok(value)
        }
    }

    /// Removes and returns the element at `index`, moving the last element into its slot.
    ///
    /// Does not preserve ordering, but is O(1).
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::fixedvec;
    /// let mut vec = fixedvec![1, 2, 3, 4];
    /// assert_eq!(vec.swap_remove(0), Ok(1));
    /// assert_eq!(vec, [4, 2, 3]);
    /// ```
    pub fn swap_remove(&mut self, index: usize) -> Result<T, Error> {
        let len = self.buf.len();
        if index >= len {
            cold_path();
            return Err(Error::OutOfBounds);
        }

        unsafe {
            let value = self.buf.take(index);
            self.buf.relocate(len - 1, index, 1);
            self.buf.set_len(len - 1);
            Ok(value)
        }
    }

    /// Drops the elements in `range` and shifts the tail down to close the gap.
    ///
    /// # Panics
    /// Panics if the range is inverted or ends past `len`, like slice indexing.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::fixedvec;
    /// let mut vec = fixedvec![0, 1, 2, 3, 4, 5];
    /// vec.erase(1..3);
    /// assert_eq!(vec, [0, 3, 4, 5]);
    /// vec.erase(2..);
    /// assert_eq!(vec, [0, 3]);
    /// assert_eq!(vec.capacity(), 6);
    /// ```
    pub fn erase<R: RangeBounds<usize>>(&mut self, range: R) {
        let len = self.buf.len();
        let (start, end) = split_range_bound(&range, len);
        if start == end {
            return;
        }

        // SAFETY: `[start, end)` is live; the guard moves the tail down even
        // if a destructor panics.
        unsafe {
            self.buf.set_len(start);
            let guard = CloseGap {
                buf: &mut self.buf,
                src: end,
                dst: start,
                tail: len - end,
            };
            guard.buf.destroy_range(start, end);
        }
    }

    /// Shortens the vector to `len` elements, dropping the rest.
    ///
    /// Has no effect if `len` is not smaller than the current length.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.buf.len();
        if len < old_len {
            // SAFETY: the length shrinks first, so a panicking destructor cannot cause a double drop.
            unsafe {
                self.buf.set_len(len);
                self.buf.destroy_range(len, old_len);
            }
        }
    }

    /// Drops every element. The capacity is unchanged.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::fixedvec;
    /// let mut v = fixedvec![1, 2, 3];
    /// v.clear();
    /// assert!(v.is_empty());
    /// assert_eq!(v.capacity(), 3);
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Retains only the elements for which `f` returns `true`, in their original order.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::fixedvec;
    /// let mut vec = fixedvec![1, 2, 3, 4];
    /// vec.retain(|v| *v % 2 == 0);
    /// assert_eq!(vec, [2, 4]);
    /// ```
    #[inline]
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut f: F) {
        self.retain_mut(|v| f(v));
    }

    /// Retains only the elements for which `f` returns `true`, passing a
    /// mutable reference to each.
    ///
    /// If `f` panics, the element being inspected and everything after it are kept.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::fixedvec;
    /// let mut vec = fixedvec![1, 2, 3, 4];
    /// vec.retain_mut(|v| {
    ///     *v += 10;
    ///     *v % 2 != 0
    /// });
    /// assert_eq!(vec, [11, 13]);
    /// ```
    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, mut f: F) {
        let len = self.buf.len();
        // SAFETY: the guard owns `[0, len)` until it compacts the survivors.
        unsafe { self.buf.set_len(0) };
        let mut guard = Compact {
            buf: &mut self.buf,
            processed: 0,
            deleted: 0,
            len,
        };

        while guard.processed < len {
            let index = guard.processed;
            let cur = guard.buf.slot(index);
            if f(unsafe { &mut *cur }) {
                if guard.deleted > 0 {
                    unsafe { guard.buf.relocate(index, index - guard.deleted, 1) };
                }
                guard.processed += 1;
            } else {
                guard.processed += 1;
                guard.deleted += 1;
                unsafe { guard.buf.destroy(index) };
            }
        }
    }

    /// Appends elements from an iterator until it ends.
    ///
    /// Returns [`Error::Full`] if the vector fills up first; the elements
    /// pushed so far stay, and the one element that did not fit is dropped.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{FixedVec, Error};
    /// let mut vec = FixedVec::with_capacity(3);
    /// vec.try_extend([1, 2])?;
    /// assert_eq!(vec.try_extend(3..), Err(Error::Full));
    /// assert_eq!(vec, [1, 2, 3]);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<(), Error> {
        for item in iter {
            self.push(item)?;
        }
        Ok(())
    }

    /// Converts into a [`Vec`] with exactly `len` capacity.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::FixedVec;
    /// let mut vec = FixedVec::with_capacity(8);
    /// vec.push(1).unwrap();
    /// let vec: Vec<i32> = vec.into_vec();
    /// assert_eq!(vec, [1]);
    /// ```
    pub fn into_vec(mut self) -> Vec<T> {
        let len = self.buf.len();
        let mut vec = Vec::with_capacity(len);
        // SAFETY: ownership of `[0, len)` moves into the `Vec`.
        unsafe {
            if !T::IS_ZST {
                ptr::copy_nonoverlapping(self.as_ptr(), vec.as_mut_ptr(), len);
            }
            self.buf.set_len(0);
            vec.set_len(len);
        }
        vec
    }

    /// Converts into a [`Box<[T]>`](Box).
    #[inline]
    pub fn into_boxed_slice(self) -> Box<[T]> {
        self.into_vec().into_boxed_slice()
    }
}

impl<T: Clone> FixedVec<T> {
    /// Creates a vector with `num` copies of `elem`; capacity equals `num`.
    ///
    /// `elem` itself fills the last slot, so only `num - 1` clones are made.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::FixedVec;
    /// let vec = FixedVec::from_elem(1, 4);
    /// assert_eq!(vec, [1, 1, 1, 1]);
    /// ```
    pub fn from_elem(elem: T, num: usize) -> Self {
        let mut vec = Self::with_capacity(num);
        if num != 0 {
            // SAFETY: exactly `num` slots are filled; the length tracks each one.
            unsafe {
                for _ in 1..num {
                    vec.push_unchecked(elem.clone());
                }
                vec.push_unchecked(elem);
            }
        }
        vec
    }

    /// Inserts `count` copies of `value` before position `index`.
    ///
    /// The tail is relocated `count` slots up, then `count - 1` clones are
    /// constructed in the gap and `value` itself is moved into the last new
    /// slot. If a clone panics, the new elements are dropped, the tail is
    /// moved back and the vector is unchanged.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{FixedVec, Error};
    /// let mut vec = FixedVec::with_capacity(6);
    /// vec.try_extend([1, 2, 3])?;
    ///
    /// vec.insert_n(1, 2, 0)?;
    /// assert_eq!(vec, [1, 0, 0, 2, 3]);
    ///
    /// assert_eq!(vec.insert_n(0, 2, 9), Err(Error::Full));
    /// assert_eq!(vec.insert_n(6, 1, 9), Err(Error::OutOfBounds));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn insert_n(&mut self, index: usize, count: usize, value: T) -> Result<(), Error> {
        let len = self.buf.len();
        if index > len {
            cold_path();
            return Err(Error::OutOfBounds);
        }
        if count > self.buf.capacity() - len {
            cold_path();
            return Err(Error::Full);
        }
        if count == 0 {
            return Ok(());
        }

        // SAFETY: bounds checked above.
        unsafe {
            let mut gap = self.open_gap(index, count);
            for _ in 1..count {
                gap.fill(value.clone());
            }
            gap.fill(value);
            gap.finish();
        }
        Ok(())
    }

    /// Clones every element of `other` onto the back.
    ///
    /// The capacity is checked up front: on [`Error::Full`] nothing is appended.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::{FixedVec, Error};
    /// let mut vec = FixedVec::with_capacity(4);
    /// vec.extend_from_slice(&[1, 2, 3])?;
    /// assert_eq!(vec.extend_from_slice(&[4, 5]), Err(Error::Full));
    /// assert_eq!(vec, [1, 2, 3]);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn extend_from_slice(&mut self, other: &[T]) -> Result<(), Error> {
        if other.len() > self.remaining_capacity() {
            cold_path();
            return Err(Error::Full);
        }
        for item in other {
            // SAFETY: room for every element was checked above.
            unsafe { self.push_unchecked(item.clone()) };
        }
        Ok(())
    }
}

/// A vacant run of slots opened inside the live range by [`FixedVec::open_gap`].
///
/// Dropping it without [`finish`](OpenGap::finish) (on unwind) drops the
/// elements filled so far and moves the tail back, restoring the original
/// contents.
struct OpenGap<'a, T> {
    buf: &'a mut Storage<T>,
    start: usize,
    count: usize,
    filled: usize,
    len: usize,
}

impl<T> OpenGap<'_, T> {
    #[inline(always)]
    fn fill(&mut self, value: T) {
        debug_assert!(self.filled < self.count);
        // SAFETY: slots `[start + filled, start + count)` are vacant.
        unsafe { self.buf.construct(self.start + self.filled, value) };
        self.filled += 1;
    }

    #[inline(always)]
    fn finish(self) {
        debug_assert_eq!(self.filled, self.count);
        let mut this = ManuallyDrop::new(self);
        let new_len = this.len + this.count;
        // SAFETY: the gap is completely filled, so `[0, len + count)` is live.
        unsafe { this.buf.set_len(new_len) };
    }
}

impl<T> Drop for OpenGap<'_, T> {
    fn drop(&mut self) {
        let tail = self.len - self.start;
        unsafe {
            self.buf.destroy_range(self.start, self.start + self.filled);
            self.buf.relocate(self.start + self.count, self.start, tail);
            self.buf.set_len(self.len);
        }
    }
}

/// Moves `tail` live slots from `src` down to `dst` when dropped, then marks
/// `[0, dst + tail)` live.
struct CloseGap<'a, T> {
    buf: &'a mut Storage<T>,
    src: usize,
    dst: usize,
    tail: usize,
}

impl<T> Drop for CloseGap<'_, T> {
    fn drop(&mut self) {
        unsafe {
            self.buf.relocate(self.src, self.dst, self.tail);
            self.buf.set_len(self.dst + self.tail);
        }
    }
}

/// In-place compaction state for [`FixedVec::retain_mut`].
///
/// On drop the unprocessed slots are shifted down over the deleted ones.
struct Compact<'a, T> {
    buf: &'a mut Storage<T>,
    processed: usize,
    deleted: usize,
    len: usize,
}

impl<T> Drop for Compact<'_, T> {
    fn drop(&mut self) {
        unsafe {
            if self.deleted > 0 {
                self.buf.relocate(
                    self.processed,
                    self.processed - self.deleted,
                    self.len - self.processed,
                );
            }
            self.buf.set_len(self.len - self.deleted);
        }
    }
}

impl<T> Default for FixedVec<T> {
    /// An empty vector with capacity zero.
    #[inline]
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<T: Clone> Clone for FixedVec<T> {
    /// Clones every element into a new buffer with the same capacity.
    ///
    /// # Examples
    /// ```
    /// # use fixedvec::FixedVec;
    /// let mut vec = FixedVec::with_capacity(5);
    /// vec.push(1).unwrap();
    ///
    /// let copy = vec.clone();
    /// assert_eq!(copy, vec);
    /// assert_eq!(copy.capacity(), 5);
    /// ```
    fn clone(&self) -> Self {
        let mut vec = Self::with_capacity(self.capacity());
        for item in self.as_slice() {
            // SAFETY: same capacity as `self`, which holds at most that many.
            unsafe { vec.push_unchecked(item.clone()) };
        }
        vec
    }

    /// Reuses the existing buffer when the capacities match.
    fn clone_from(&mut self, source: &Self) {
        if self.capacity() != source.capacity() {
            *self = source.clone();
            return;
        }
        self.clear();
        for item in source.as_slice() {
            unsafe { self.push_unchecked(item.clone()) };
        }
    }
}

crate::utils::impl_slice_traits!(FixedVec);

impl<'a, T> IntoIterator for &'a FixedVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut FixedVec<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, const P: usize> From<[T; P]> for FixedVec<T> {
    #[inline]
    fn from(value: [T; P]) -> Self {
        Self::from_array(value)
    }
}

impl<T> From<Vec<T>> for FixedVec<T> {
    #[inline]
    fn from(value: Vec<T>) -> Self {
        Self::from_vec(value)
    }
}

impl<T> From<Box<[T]>> for FixedVec<T> {
    #[inline]
    fn from(value: Box<[T]>) -> Self {
        Self::from_vec(value.into_vec())
    }
}

impl<T: Clone> From<&[T]> for FixedVec<T> {
    /// # Examples
    ///
    /// ```
    /// # use fixedvec::FixedVec;
    /// let vec = FixedVec::from([1, 2, 3].as_slice());
    /// assert_eq!(vec.capacity(), 3);
    /// ```
    fn from(value: &[T]) -> Self {
        let mut vec = Self::with_capacity(value.len());
        for item in value {
            unsafe { vec.push_unchecked(item.clone()) };
        }
        vec
    }
}

impl<T> From<FixedVec<T>> for Vec<T> {
    #[inline]
    fn from(value: FixedVec<T>) -> Self {
        value.into_vec()
    }
}

impl<T> FromIterator<T> for FixedVec<T> {
    /// Collects into a vector whose capacity equals the number of items.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fixedvec::FixedVec;
    /// let vec: FixedVec<_> = (1..=3).collect();
    /// assert_eq!(vec, [1, 2, 3]);
    /// assert_eq!(vec.capacity(), 3);
    /// ```
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

/// An iterator that consumes a [`FixedVec`] and yields its items by value.
///
/// Items not yielded are dropped with the iterator.
///
/// # Examples
///
/// ```
/// # use fixedvec::fixedvec;
/// let vec = fixedvec!["1", "2", "3"];
/// let mut iter = vec.into_iter();
///
/// assert_eq!(iter.next(), Some("1"));
/// assert_eq!(iter.as_slice(), ["2", "3"]);
/// ```
pub struct IntoIter<T> {
    buf: Storage<T>,
    front: usize,
    back: usize,
}

impl<T> IntoIterator for FixedVec<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        let vec = ManuallyDrop::new(self);
        // SAFETY: `vec` is never dropped, so the storage has exactly one owner.
        let mut buf = unsafe { ptr::read(&vec.buf) };
        let back = buf.len();
        // SAFETY: the iterator tracks the live range from here on.
        unsafe { buf.set_len(0) };
        IntoIter { buf, front: 0, back }
    }
}

impl<T> IntoIter<T> {
    /// The remaining items.
    pub fn as_slice(&self) -> &[T] {
        unsafe {
            slice::from_raw_parts(self.buf.as_ptr().add(self.front), self.back - self.front)
        }
    }

    /// The remaining items, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.back - self.front;
        unsafe { slice::from_raw_parts_mut(self.buf.slot(self.front), len) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.front < self.back {
            self.front += 1;
            Some(unsafe { self.buf.take(self.front - 1) })
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.front < self.back {
            self.back -= 1;
            Some(unsafe { self.buf.take(self.back) })
        } else {
            None
        }
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    #[inline]
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let (front, back) = (self.front, self.back);
        self.front = back;
        unsafe { self.buf.destroy_range(front, back) }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixedvec;
    use core::cell::Cell;
    use core::ops::Bound;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::string::{String, ToString};

    /// Counts clones and drops of every [`Tracked`] element pointing at it.
    struct Record {
        clones: Cell<usize>,
        drops: Cell<usize>,
        /// `clone` panics once this many clones have been made.
        fuse: Cell<usize>,
        /// `drop` panics for the element holding this value.
        drop_fuse: Cell<i32>,
    }

    impl Record {
        fn new() -> Self {
            Self {
                clones: Cell::new(0),
                drops: Cell::new(0),
                fuse: Cell::new(usize::MAX),
                drop_fuse: Cell::new(i32::MIN),
            }
        }

        #[track_caller]
        fn expect(&self, clones: usize, drops: usize) {
            assert_eq!(
                (self.clones.get(), self.drops.get()),
                (clones, drops),
                "(clones, drops)"
            );
            self.clones.set(0);
            self.drops.set(0);
        }
    }

    struct Tracked<'r> {
        i: i32,
        rec: &'r Record,
    }

    impl<'r> Tracked<'r> {
        fn new(i: i32, rec: &'r Record) -> Self {
            Self { i, rec }
        }

        fn with_offset(i: i32, offset: i32, rec: &'r Record) -> Self {
            Self { i: i + offset, rec }
        }
    }

    impl Clone for Tracked<'_> {
        fn clone(&self) -> Self {
            if self.rec.clones.get() == self.rec.fuse.get() {
                panic!("clone fuse blown");
            }
            self.rec.clones.set(self.rec.clones.get() + 1);
            Self {
                i: self.i,
                rec: self.rec,
            }
        }
    }

    impl Drop for Tracked<'_> {
        fn drop(&mut self) {
            self.rec.drops.set(self.rec.drops.get() + 1);
            if self.i == self.rec.drop_fuse.get() {
                panic!("drop fuse blown");
            }
        }
    }

    fn values(vec: &FixedVec<Tracked<'_>>) -> Vec<i32> {
        vec.iter().map(|t| t.i).collect()
    }

    #[test]
    fn element_lifetimes() {
        let rec = Record::new();
        let mut fv = FixedVec::with_capacity(10);

        for i in 0..5 {
            fv.emplace_back(|| Tracked::new(i, &rec)).unwrap();
        }
        assert_eq!(values(&fv), [0, 1, 2, 3, 4]);
        rec.expect(0, 0);

        drop(fv.pop().unwrap());
        assert_eq!(values(&fv), [0, 1, 2, 3]);
        rec.expect(0, 1);

        fv.emplace_at(1, || Tracked::new(100, &rec)).unwrap();
        assert_eq!(values(&fv), [0, 100, 2, 3]);
        rec.expect(0, 1);

        fv.emplace(0, || Tracked::new(200, &rec)).unwrap();
        assert_eq!(values(&fv), [200, 0, 100, 2, 3]);
        rec.expect(0, 0);

        fv.insert_n(0, 2, Tracked::new(400, &rec)).unwrap();
        assert_eq!(values(&fv), [400, 400, 200, 0, 100, 2, 3]);
        rec.expect(1, 0);

        fv.clear();
        assert!(values(&fv).is_empty());
        assert_eq!(fv.capacity(), 10);
        rec.expect(0, 7);

        fv.push(Tracked::new(20, &rec)).unwrap();
        assert_eq!(values(&fv), [20]);
        rec.expect(0, 0);

        let mut fv2 = fixedvec![
            Tracked::new(1, &rec),
            Tracked::new(2, &rec),
            Tracked::new(3, &rec),
            Tracked::new(4, &rec),
        ];
        assert_eq!(values(&fv2), [1, 2, 3, 4]);
        assert_eq!(fv2.capacity(), 4);
        rec.expect(0, 0);

        let fv3 = fv2.clone();
        assert_eq!(values(&fv3), [1, 2, 3, 4]);
        assert_eq!(values(&fv2), [1, 2, 3, 4]);
        rec.expect(4, 0);

        let fv4 = fv2.take();
        assert_eq!(values(&fv4), [1, 2, 3, 4]);
        assert!(fv2.is_empty());
        rec.expect(0, 0);

        let fv5 = FixedVec::with_emplaced(|| Tracked::with_offset(10, 2, &rec));
        assert_eq!(values(&fv5), [12]);
        rec.expect(0, 0);

        drop((fv, fv2, fv3, fv4, fv5));
        rec.expect(0, 10);
    }

    #[test]
    fn failed_preconditions_do_not_mutate() {
        let mut v = FixedVec::<i32>::with_capacity(2);
        assert_eq!(v.pop(), Err(Error::Empty));

        v.push(1).unwrap();
        v.push(2).unwrap();
        assert_eq!(v.push(3).unwrap_err(), Error::Full);
        assert_eq!(v.emplace_back(|| unreachable!()).unwrap_err(), Error::Full);
        assert_eq!(v.emplace(0, || unreachable!()).unwrap_err(), Error::Full);
        assert_eq!(v.insert_n(0, 1, 0), Err(Error::Full));
        assert_eq!(v.emplace_at(2, || unreachable!()).unwrap_err(), Error::OutOfBounds);
        assert_eq!(v.remove(2), Err(Error::OutOfBounds));
        assert_eq!(v.swap_remove(5), Err(Error::OutOfBounds));
        assert_eq!(v.at(2), Err(Error::OutOfBounds));
        assert_eq!(v, [1, 2]);

        v.clear();
        assert_eq!(v.emplace(1, || unreachable!()).unwrap_err(), Error::OutOfBounds);
        assert_eq!(v.insert_n(1, 1, 0), Err(Error::OutOfBounds));
        assert!(v.is_empty());
    }

    #[test]
    fn insert_n_zero_drops_value() {
        let rec = Record::new();
        let mut v = FixedVec::with_capacity(1);
        v.insert_n(0, 0, Tracked::new(1, &rec)).unwrap();
        assert!(v.is_empty());
        rec.expect(0, 1);
    }

    #[test]
    fn insert_n_appends_at_end() {
        let mut v = FixedVec::with_capacity(5);
        v.push("a".to_string()).unwrap();
        v.insert_n(1, 3, "b".to_string()).unwrap();
        assert_eq!(v, ["a", "b", "b", "b"]);
        v.insert(4, "c".to_string()).unwrap();
        assert_eq!(v, ["a", "b", "b", "b", "c"]);
        assert!(v.is_full());
    }

    #[test]
    fn panicking_clone_in_insert_n_restores_vector() {
        let rec = Record::new();
        let mut v = FixedVec::with_capacity(10);
        for i in 1..=3 {
            v.push(Tracked::new(i, &rec)).unwrap();
        }

        rec.fuse.set(1);
        let res = catch_unwind(AssertUnwindSafe(|| {
            v.insert_n(1, 3, Tracked::new(9, &rec)).unwrap();
        }));
        assert!(res.is_err());
        rec.fuse.set(usize::MAX);

        assert_eq!(values(&v), [1, 2, 3]);
        // the one successful clone and the source value
        rec.expect(1, 2);

        drop(v);
        rec.expect(0, 3);
    }

    #[test]
    fn panicking_constructor_in_emplace_restores_vector() {
        let rec = Record::new();
        let mut v = FixedVec::with_capacity(4);
        for i in 1..=3 {
            v.push(Tracked::new(i, &rec)).unwrap();
        }

        let res = catch_unwind(AssertUnwindSafe(|| {
            v.emplace(1, || panic!("constructor failed")).unwrap();
        }));
        assert!(res.is_err());
        assert_eq!(values(&v), [1, 2, 3]);
        rec.expect(0, 0);
    }

    #[test]
    fn panicking_constructor_in_emplace_at_closes_hole() {
        let rec = Record::new();
        let mut v = FixedVec::with_capacity(4);
        for i in 1..=3 {
            v.push(Tracked::new(i, &rec)).unwrap();
        }

        let res = catch_unwind(AssertUnwindSafe(|| {
            v.emplace_at(1, || panic!("constructor failed")).unwrap();
        }));
        assert!(res.is_err());
        assert_eq!(values(&v), [1, 3]);
        rec.expect(0, 1);

        drop(v);
        rec.expect(0, 2);
    }

    #[test]
    fn panicking_clone_in_bulk_construction() {
        let rec = Record::new();
        let v = fixedvec![
            Tracked::new(1, &rec),
            Tracked::new(2, &rec),
            Tracked::new(3, &rec),
            Tracked::new(4, &rec),
        ];

        rec.fuse.set(2);
        assert!(catch_unwind(AssertUnwindSafe(|| v.clone())).is_err());
        rec.fuse.set(usize::MAX);
        assert_eq!(values(&v), [1, 2, 3, 4]);
        rec.expect(2, 2);

        rec.fuse.set(1);
        let res = catch_unwind(AssertUnwindSafe(|| {
            FixedVec::from_elem(Tracked::new(7, &rec), 4)
        }));
        assert!(res.is_err());
        rec.fuse.set(usize::MAX);
        rec.expect(1, 2);
    }

    #[test]
    fn panicking_predicate_in_retain_keeps_rest() {
        let rec = Record::new();
        let mut v: FixedVec<_> = (0..5).map(|i| Tracked::new(i, &rec)).collect();

        let res = catch_unwind(AssertUnwindSafe(|| {
            v.retain(|t| {
                assert!(t.i != 3, "predicate failed");
                t.i % 2 == 0
            })
        }));
        assert!(res.is_err());
        assert_eq!(values(&v), [0, 2, 3, 4]);
        rec.expect(0, 1);
    }

    #[test]
    fn panicking_destructor_in_clear_drops_the_rest() {
        let rec = Record::new();
        let mut v: FixedVec<_> = (0..4).map(|i| Tracked::new(i, &rec)).collect();

        rec.drop_fuse.set(1);
        assert!(catch_unwind(AssertUnwindSafe(|| v.clear())).is_err());
        rec.drop_fuse.set(i32::MIN);

        assert!(v.is_empty());
        assert_eq!(v.capacity(), 4);
        rec.expect(0, 4);
    }

    #[test]
    fn panicking_destructor_in_erase_closes_gap() {
        let rec = Record::new();
        let mut v: FixedVec<_> = (0..5).map(|i| Tracked::new(i, &rec)).collect();

        rec.drop_fuse.set(2);
        assert!(catch_unwind(AssertUnwindSafe(|| v.erase(1..4))).is_err());
        rec.drop_fuse.set(i32::MIN);

        assert_eq!(values(&v), [0, 4]);
        rec.expect(0, 3);

        drop(v);
        rec.expect(0, 2);
    }

    #[test]
    fn panicking_destructor_in_emplace_at_closes_hole() {
        let rec = Record::new();
        let mut v: FixedVec<_> = (0..4).map(|i| Tracked::new(i, &rec)).collect();

        rec.drop_fuse.set(1);
        let res = catch_unwind(AssertUnwindSafe(|| {
            v.emplace_at(1, || Tracked::new(100, &rec)).unwrap();
        }));
        assert!(res.is_err());
        rec.drop_fuse.set(i32::MIN);

        assert_eq!(values(&v), [0, 2, 3]);
        rec.expect(0, 1);
    }

    #[test]
    fn removal() {
        let mut v: FixedVec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();

        assert_eq!(v.remove(0).unwrap(), "a");
        assert_eq!(v.swap_remove(0).unwrap(), "b");
        assert_eq!(v, ["e", "c", "d"]);

        v.erase(1..=1);
        assert_eq!(v, ["e", "d"]);
        v.erase(..);
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 5);

        v.try_extend(["x", "y", "z"].map(String::from)).unwrap();
        v.truncate(1);
        assert_eq!(v, ["x"]);
        v.truncate(3);
        assert_eq!(v, ["x"]);
    }

    #[test]
    #[should_panic(expected = "range end")]
    fn erase_out_of_range_panics() {
        let mut v = fixedvec![1, 2, 3];
        v.erase(1..4);
    }

    #[test]
    #[should_panic(expected = "range start overflows usize")]
    fn erase_excluded_start_at_max_panics() {
        let mut v = fixedvec![1, 2, 3];
        v.erase((Bound::Excluded(usize::MAX), Bound::Unbounded));
    }

    #[test]
    #[should_panic(expected = "range end overflows usize")]
    fn erase_inclusive_end_at_max_panics() {
        let mut v = fixedvec![1, 2, 3];
        v.erase(..=usize::MAX);
    }

    #[test]
    fn erase_drops_exactly_the_range() {
        let rec = Record::new();
        let mut v: FixedVec<_> = (0..6).map(|i| Tracked::new(i, &rec)).collect();
        v.erase(2..5);
        assert_eq!(values(&v), [0, 1, 5]);
        rec.expect(0, 3);
    }

    #[test]
    fn bounds_checked_access() {
        let mut v = fixedvec![1, 2, 3];
        *v.at_mut(0).unwrap() = 10;
        assert_eq!(v.at(0), Ok(&10));
        assert_eq!(v.at_mut(3), Err(Error::OutOfBounds));
        assert_eq!(v[2], 3);
        assert_eq!(v.first(), Some(&10));
        assert_eq!(v.last(), Some(&3));
    }

    #[test]
    #[should_panic]
    fn index_out_of_range_panics() {
        let v = fixedvec![1, 2, 3];
        let _ = v[3];
    }

    #[test]
    fn clone_from_reuses_or_replaces() {
        let mut dst: FixedVec<i32> = FixedVec::with_capacity(3);
        dst.push(9).unwrap();

        let mut src = FixedVec::with_capacity(3);
        src.try_extend([1, 2]).unwrap();
        dst.clone_from(&src);
        assert_eq!(dst, [1, 2]);
        assert_eq!(dst.capacity(), 3);

        let src = fixedvec![4, 5, 6, 7];
        dst.clone_from(&src);
        assert_eq!(dst, [4, 5, 6, 7]);
        assert_eq!(dst.capacity(), 4);
    }

    #[test]
    fn take_keeps_source_usable() {
        let mut src = FixedVec::with_capacity(2);
        src.push(1).unwrap();
        let dst = src.take();
        assert_eq!(dst, [1]);

        src.push(2).unwrap();
        src.push(3).unwrap();
        assert_eq!(src, [2, 3]);
        assert!(src.is_full());
    }

    #[test]
    fn into_iter_drops_remaining() {
        let rec = Record::new();
        let v: FixedVec<_> = (0..4).map(|i| Tracked::new(i, &rec)).collect();

        let mut iter = v.into_iter();
        assert_eq!(iter.len(), 4);
        let first = iter.next().unwrap();
        let last = iter.next_back().unwrap();
        assert_eq!((first.i, last.i), (0, 3));
        assert_eq!(iter.as_mut_slice().len(), 2);
        drop(iter);
        rec.expect(0, 2);

        drop((first, last));
        rec.expect(0, 2);
    }

    #[test]
    fn conversions() {
        let v = FixedVec::from(vec![1, 2, 3]);
        assert_eq!(v.capacity(), 3);

        let v = FixedVec::from(vec![4, 5].into_boxed_slice());
        assert_eq!(v, [4, 5]);

        let v: Vec<i32> = FixedVec::from([6, 7]).into();
        assert_eq!(v, [6, 7]);

        let b = fixedvec![8, 9].into_boxed_slice();
        assert_eq!(&*b, [8, 9]);

        let v = fixedvec![3, 1, 2];
        let mut sorted = v.clone();
        sorted.sort();
        assert_eq!(sorted, [1, 2, 3]);
        assert!(v > sorted);
    }

    #[test]
    fn zero_capacity_and_zero_sized() {
        let mut v: FixedVec<String> = FixedVec::default();
        assert_eq!(v.capacity(), 0);
        assert_eq!(v.push(String::new()).unwrap_err(), Error::Full);

        let mut z = FixedVec::with_capacity(2);
        z.push(()).unwrap();
        z.insert(0, ()).unwrap();
        assert_eq!(z.push(()), Err(Error::Full));
        assert_eq!(z.remove(1), Ok(()));
        assert_eq!(z.len(), 1);
        assert_eq!(z.into_vec().len(), 1);
    }

    #[test]
    fn spare_capacity() {
        let mut v = FixedVec::with_capacity(3);
        v.push(1u8).unwrap();
        assert_eq!(v.spare_capacity_mut().len(), 2);
        v.spare_capacity_mut()[0].write(2);
        unsafe { v.set_len(2) };
        assert_eq!(v, [1, 2]);
        assert_eq!(v.remaining_capacity(), 1);
    }
}
