//! Random-access iterators over the live range of a [`FixedVec`](crate::FixedVec).
//!
//! Both iterators are a base pointer plus a front and a back offset. They
//! borrow the vector, so any mutation that could relocate elements (insert,
//! erase, emplace, clear, ...) cannot happen while an iterator is alive.
//!
//! [`Iter`] supports full random access: it can be moved backwards and
//! forwards with `+`/`-`, compared with other iterators over the same vector
//! and measured with [`Iter::distance_to`]. [`IterMut`] only moves forward,
//! since stepping back would hand out a second `&mut` to the same slot.
use core::{
    cmp::Ordering,
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    ops::{Add, AddAssign, Sub, SubAssign},
    ptr::NonNull,
    slice,
};

/// Read-only iterator over a [`FixedVec`](crate::FixedVec).
///
/// Created by [`FixedVec::iter`](crate::FixedVec::iter).
///
/// # Examples
///
/// ```
/// # use fixedvec::fixedvec;
/// let vec = fixedvec![10, 20, 30, 40];
///
/// let begin = vec.iter();
/// let mut it = begin.clone() + 2;
/// assert_eq!(it.offset(), 2);
/// assert_eq!(it.get(1), Some(&40));
/// assert_eq!(begin.distance_to(&it), 2);
///
/// it -= 1;
/// assert_eq!(it.next(), Some(&20));
/// assert!(begin < it);
/// ```
pub struct Iter<'a, T> {
    base: NonNull<T>,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a T>,
}

unsafe impl<T> Send for Iter<'_, T> where T: Sync {}
unsafe impl<T> Sync for Iter<'_, T> where T: Sync {}

impl<'a, T> Iter<'a, T> {
    #[inline]
    pub(crate) fn new(slice: &'a [T]) -> Self {
        Self {
            base: NonNull::from(slice).cast(),
            front: 0,
            back: slice.len(),
            _marker: PhantomData,
        }
    }

    /// Position of the front of the iterator, counted from the first element of the vector.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.front
    }

    /// The elements not yet yielded.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        // SAFETY: `[front, back)` lies inside the borrowed live range.
        unsafe { slice::from_raw_parts(self.base.as_ptr().add(self.front), self.back - self.front) }
    }

    /// Returns the element `n` positions past the front without advancing.
    #[inline]
    pub fn get(&self, n: usize) -> Option<&'a T> {
        if n < self.back - self.front {
            // SAFETY: checked to be inside `[front, back)`.
            Some(unsafe { &*self.base.as_ptr().add(self.front + n) })
        } else {
            None
        }
    }

    /// Signed number of steps from `self` to `other`.
    ///
    /// Both iterators must come from the same vector.
    ///
    /// # Panics
    /// Panics if the distance does not fit in `isize`, which only a vector of
    /// zero-sized elements can reach.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> isize {
        debug_assert!(self.base == other.base, "iterators over different vectors");
        let (dist, backwards) = if other.front >= self.front {
            (other.front - self.front, false)
        } else {
            (self.front - other.front, true)
        };
        assert!(dist <= isize::MAX as usize, "iterator distance {dist} overflows isize");
        if backwards { -(dist as isize) } else { dist as isize }
    }
}

impl<T> Clone for Iter<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.as_slice()).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let item = self.get(0)?;
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a T> {
        let item = self.get(n);
        self.front = match item {
            Some(_) => self.front + n + 1,
            None => self.back,
        };
        item
    }

    #[inline]
    fn count(self) -> usize {
        self.back - self.front
    }

    #[inline]
    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            // SAFETY: `back` was inside `(front, old_back]`.
            Some(unsafe { &*self.base.as_ptr().add(self.back) })
        } else {
            None
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> AddAssign<usize> for Iter<'_, T> {
    /// # Panics
    /// Panics if the front would move past the back.
    #[inline]
    fn add_assign(&mut self, n: usize) {
        assert!(n <= self.back - self.front, "iterator advanced past the end");
        self.front += n;
    }
}

impl<T> SubAssign<usize> for Iter<'_, T> {
    /// # Panics
    /// Panics if the front would move before the first element.
    #[inline]
    fn sub_assign(&mut self, n: usize) {
        assert!(n <= self.front, "iterator moved before the start");
        self.front -= n;
    }
}

impl<T> Add<usize> for Iter<'_, T> {
    type Output = Self;

    #[inline]
    fn add(mut self, n: usize) -> Self {
        self += n;
        self
    }
}

impl<T> Sub<usize> for Iter<'_, T> {
    type Output = Self;

    #[inline]
    fn sub(mut self, n: usize) -> Self {
        self -= n;
        self
    }
}

impl<T> PartialEq for Iter<'_, T> {
    /// Two iterators are equal when they point at the same slot of the same vector.
    ///
    /// Vectors that never allocated (zero capacity or zero-sized `T`) share
    /// the same dangling base address, so iterators over two such vectors are
    /// indistinguishable and compare by position alone.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.front == other.front
    }
}

impl<T> Eq for Iter<'_, T> {}

impl<T> PartialOrd for Iter<'_, T> {
    /// Orders by position; iterators over different allocated vectors are
    /// unordered. Vectors without a buffer compare by position alone, as
    /// described on the `PartialEq` impl.
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.base == other.base {
            Some(self.front.cmp(&other.front))
        } else {
            None
        }
    }
}

impl<'a, T> From<IterMut<'a, T>> for Iter<'a, T> {
    #[inline]
    fn from(iter: IterMut<'a, T>) -> Self {
        Self {
            base: iter.base,
            front: iter.front,
            back: iter.back,
            _marker: PhantomData,
        }
    }
}

/// Mutable iterator over a [`FixedVec`](crate::FixedVec).
///
/// Created by [`FixedVec::iter_mut`](crate::FixedVec::iter_mut).
///
/// # Examples
///
/// ```
/// # use fixedvec::fixedvec;
/// let mut vec = fixedvec![1, 2, 3, 4, 5];
///
/// let mut it = vec.iter_mut();
/// it += 1;
/// for x in it.by_ref().take(2) {
///     *x *= 10;
/// }
/// assert_eq!(it.offset(), 3);
/// *it.peek_mut().unwrap() = 0;
///
/// assert_eq!(vec, [1, 20, 30, 0, 5]);
/// ```
pub struct IterMut<'a, T> {
    base: NonNull<T>,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut T>,
}

unsafe impl<T> Send for IterMut<'_, T> where T: Send {}
unsafe impl<T> Sync for IterMut<'_, T> where T: Sync {}

impl<'a, T> IterMut<'a, T> {
    #[inline]
    pub(crate) fn new(slice: &'a mut [T]) -> Self {
        let back = slice.len();
        Self {
            base: NonNull::from(slice).cast(),
            front: 0,
            back,
            _marker: PhantomData,
        }
    }

    /// Position of the front of the iterator, counted from the first element of the vector.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.front
    }

    /// Views the elements not yet yielded.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[front, back)` lies inside the borrowed live range and
        // nothing in it has been handed out yet.
        unsafe { slice::from_raw_parts(self.base.as_ptr().add(self.front), self.back - self.front) }
    }

    /// Converts into the slice of elements not yet yielded.
    #[inline]
    pub fn into_slice(self) -> &'a mut [T] {
        unsafe {
            slice::from_raw_parts_mut(self.base.as_ptr().add(self.front), self.back - self.front)
        }
    }

    /// Borrows the element at the front without advancing.
    #[inline]
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        if self.front < self.back {
            Some(unsafe { &mut *self.base.as_ptr().add(self.front) })
        } else {
            None
        }
    }

    /// Skips `n` elements.
    ///
    /// # Panics
    /// Panics if fewer than `n` elements remain.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        assert!(n <= self.back - self.front, "iterator advanced past the end");
        self.front += n;
    }
}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IterMut").field(&self.as_slice()).finish()
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        if self.front < self.back {
            self.front += 1;
            // SAFETY: each slot is yielded at most once and the front never moves back.
            Some(unsafe { &mut *self.base.as_ptr().add(self.front - 1) })
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a mut T> {
        if n < self.back - self.front {
            self.front += n;
            self.next()
        } else {
            self.front = self.back;
            None
        }
    }

    #[inline]
    fn count(self) -> usize {
        self.back - self.front
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            Some(unsafe { &mut *self.base.as_ptr().add(self.back) })
        } else {
            None
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {
    #[inline]
    fn len(&self) -> usize {
        self.back - self.front
    }
}

impl<T> FusedIterator for IterMut<'_, T> {}

impl<T> AddAssign<usize> for IterMut<'_, T> {
    #[inline]
    fn add_assign(&mut self, n: usize) {
        self.advance(n);
    }
}
