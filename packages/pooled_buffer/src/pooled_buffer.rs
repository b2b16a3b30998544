use std::fmt;
use std::ops::{Deref, DerefMut};
use std::slice;

use crate::{BufferPool, ClearMode, PooledBufferBuilder, Result, SharedPool, ingest};

const ERR_COUNT_EXCEEDS_BUFFER: &str =
    "logical count never exceeds the length of the rented buffer";

/// A buffer of exactly [`len()`](Self::len) elements, backed by memory rented from a pool.
///
/// The pool may hand out a buffer longer than requested. The extra slots are never visible:
/// every view, index and iteration covers only the logical elements.
///
/// When the `PooledBuffer` is dropped or [released](Self::release), the backing buffer goes back
/// to the pool it was rented from, exactly once. Depending on the [`ClearMode`] chosen when the
/// buffer was built, the pool resets the buffer before it can be rented again.
///
/// Create one via [`PooledBuffer::builder()`] or one of the shortcuts on this type. By default,
/// buffers are rented from the process-wide [`SharedPool`]; a different pool can be set on the
/// builder.
///
/// # Examples
///
/// ```
/// use pooled_buffer::PooledBuffer;
///
/// let mut buffer = PooledBuffer::from_slice(&[3_u32, 1, 2]);
/// buffer.sort_unstable();
///
/// assert_eq!(buffer.as_slice(), &[1, 2, 3]);
/// assert!(buffer.capacity() >= 3);
///
/// // Goes back to the pool here. Dropping the buffer has the same effect.
/// buffer.release();
/// ```
///
/// # Thread safety
///
/// The type is [`Send`] and [`Sync`] whenever `T` is. Share it between threads via `Arc` if
/// needed; the backing buffer is returned when the last clone of the `Arc` is dropped.
pub struct PooledBuffer<T, P = SharedPool>
where
    P: BufferPool<T>,
{
    /// `None` after release, and for empty buffers, which never rent anything.
    buffer: Option<Box<[T]>>,

    /// Number of logical elements at the front of `buffer`.
    count: usize,

    clear_on_return: bool,

    pool: P,
}

impl<T> PooledBuffer<T, SharedPool>
where
    SharedPool: BufferPool<T>,
{
    /// Creates a builder for configuring and populating a [`PooledBuffer`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_buffer::{ClearMode, PooledBuffer};
    ///
    /// let buffer = PooledBuffer::builder()
    ///     .clear_mode(ClearMode::Always)
    ///     .copy_from_slice(b"secret");
    ///
    /// assert_eq!(buffer.len(), 6);
    /// ```
    #[inline]
    pub fn builder() -> PooledBufferBuilder<T> {
        PooledBufferBuilder::new()
    }

    /// Creates an empty buffer. Nothing is rented.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::from_parts(
            None,
            0,
            ClearMode::default().should_clear::<T>(),
            SharedPool::new(),
        )
    }

    /// Rents a buffer of `count` elements from the process-wide pool without populating it.
    ///
    /// The elements may hold data left behind by a previous renter if that renter did not clear
    /// the buffer. See [`PooledBufferBuilder::with_count()`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if `count` exceeds the
    /// largest possible buffer of `T`.
    #[inline]
    pub fn with_count(count: usize) -> Result<Self> {
        Self::builder().with_count(count)
    }

    /// Rents a buffer from the process-wide pool and clones `source` into it.
    #[must_use]
    #[inline]
    pub fn from_slice(source: &[T]) -> Self
    where
        T: Clone,
    {
        Self::builder().copy_from_slice(source)
    }
}

impl<T, P> PooledBuffer<T, P>
where
    P: BufferPool<T>,
{
    pub(crate) fn from_parts(
        buffer: Option<Box<[T]>>,
        count: usize,
        clear_on_return: bool,
        pool: P,
    ) -> Self {
        debug_assert!(
            buffer.as_ref().map_or(0, |buffer| buffer.len()) >= count,
            "{ERR_COUNT_EXCEEDS_BUFFER}"
        );

        Self {
            buffer,
            count,
            clear_on_return,
            pool,
        }
    }

    /// The number of logical elements.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the buffer has no logical elements.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The length of the backing buffer rented from the pool. At least [`len()`](Self::len).
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().map_or(0, |buffer| buffer.len())
    }

    /// Whether the backing buffer is cleared when it goes back to the pool, as resolved for `T`
    /// when this buffer was built.
    ///
    /// This is always [`ClearMode::Always`] or [`ClearMode::Never`], never [`ClearMode::Auto`].
    #[must_use]
    #[inline]
    pub fn clear_mode(&self) -> ClearMode {
        ClearMode::from_decision(self.clear_on_return)
    }

    /// The logical elements as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match &self.buffer {
            Some(buffer) => buffer.get(..self.count).expect(ERR_COUNT_EXCEEDS_BUFFER),
            None => &[],
        }
    }

    /// The logical elements as a mutable slice.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.buffer {
            Some(buffer) => buffer
                .get_mut(..self.count)
                .expect(ERR_COUNT_EXCEEDS_BUFFER),
            None => &mut [],
        }
    }

    /// Iterates over the logical elements in order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates mutably over the logical elements in order.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Returns the backing buffer to its pool.
    ///
    /// This is the same as dropping the `PooledBuffer`, spelled out for readability at call
    /// sites where the moment of release matters.
    ///
    /// If the pool rejects the buffer, the rejection is logged and the buffer is dropped.
    #[inline]
    pub fn release(mut self) {
        self.return_to_pool();
    }

    fn return_to_pool(&mut self) {
        // Taking the buffer makes any later call a no-op.
        if let Some(buffer) = self.buffer.take() {
            self.count = 0;
            ingest::give_back(&self.pool, buffer, self.clear_on_return);
        }
    }
}

impl<T, P> Drop for PooledBuffer<T, P>
where
    P: BufferPool<T>,
{
    fn drop(&mut self) {
        self.return_to_pool();
    }
}

impl<T> Default for PooledBuffer<T, SharedPool>
where
    SharedPool: BufferPool<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> Deref for PooledBuffer<T, P>
where
    P: BufferPool<T>,
{
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, P> DerefMut for PooledBuffer<T, P>
where
    P: BufferPool<T>,
{
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, P> AsRef<[T]> for PooledBuffer<T, P>
where
    P: BufferPool<T>,
{
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, P> AsMut<[T]> for PooledBuffer<T, P>
where
    P: BufferPool<T>,
{
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T, P> IntoIterator for &'a PooledBuffer<T, P>
where
    P: BufferPool<T>,
{
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, P> IntoIterator for &'a mut PooledBuffer<T, P>
where
    P: BufferPool<T>,
{
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> FromIterator<T> for PooledBuffer<T, SharedPool>
where
    SharedPool: BufferPool<T>,
{
    /// Collects the items into a buffer rented from the process-wide pool.
    ///
    /// # Panics
    ///
    /// Panics if the items do not fit into the largest possible buffer of `T`.
    #[cfg_attr(test, mutants::skip)] // The size hint only changes how often the buffer grows.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items = iter.into_iter();
        let (lower_bound, _) = items.size_hint();

        let mut builder = Self::builder();

        if lower_bound > 0 {
            builder = builder.suggested_capacity(lower_bound.min(ingest::max_buffer_len::<T>()));
        }

        builder.collect_from(items).expect("capacity overflow")
    }
}

impl<T, P> PartialEq for PooledBuffer<T, P>
where
    T: PartialEq,
    P: BufferPool<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, P> Eq for PooledBuffer<T, P>
where
    T: Eq,
    P: BufferPool<T>,
{
}

impl<T, P> fmt::Debug for PooledBuffer<T, P>
where
    T: fmt::Debug,
    P: BufferPool<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("elements", &self.as_slice())
            .field("capacity", &self.capacity())
            .field("clear_mode", &self.clear_mode())
            .finish_non_exhaustive()
    }
}
